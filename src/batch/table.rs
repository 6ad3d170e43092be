//! Flat prospect table persisted as CSV

use crate::audit::{AuditRecord, AuditStatus};
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One prospect: identity, contact fields and the last audit outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProspectRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub population: Option<u64>,
    #[serde(default)]
    pub audit_status: String,
    #[serde(default)]
    pub audit_date: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub accessibility_score: Option<u8>,
    #[serde(default)]
    pub accessibility_status: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub privacy_score: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub performance_score: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub seo_score: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub priority: Option<u8>,
    /// Problem summaries joined with `; `
    #[serde(default)]
    pub problems: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub report_path: String,
}

impl ProspectRow {
    /// True once a completed audit has been recorded
    pub fn is_audited(&self) -> bool {
        self.audit_status == AuditStatus::Completed.as_str()
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Copies the computed columns of `record` into the row
    pub fn apply_audit(&mut self, record: &AuditRecord) {
        self.audit_status = record.status.as_str().to_string();
        self.audit_date = record.audited_at.format(DATE_FORMAT).to_string();
        self.accessibility_score = record.accessibility.score;
        self.accessibility_status = record
            .accessibility
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        self.privacy_score = record.privacy.score;
        self.performance_score = record.performance.performance.map(to_percent);
        self.seo_score = record.performance.seo.map(to_percent);
        self.priority = match record.status {
            AuditStatus::Completed => Some(record.priority),
            AuditStatus::AuditError => None,
        };
        self.problems = record.problems.join("; ");
        self.technologies = record.technology.summary();
        self.report_path = record.report_path.clone().unwrap_or_default();
    }

    /// Records an audit that could not produce a result
    ///
    /// Scores from an earlier run are cleared so the row never pairs the
    /// new status with stale results.
    pub fn mark_failed(&mut self, message: &str) {
        self.audit_status = AuditStatus::AuditError.as_str().to_string();
        self.audit_date = Utc::now().format(DATE_FORMAT).to_string();
        self.accessibility_score = None;
        self.accessibility_status.clear();
        self.privacy_score = None;
        self.performance_score = None;
        self.seo_score = None;
        self.priority = None;
        self.problems = message.to_string();
        self.technologies.clear();
        self.report_path.clear();
    }
}

fn to_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Where the table is checkpointed
pub trait TableSink: Send {
    /// Persists the full table, replacing the previous content
    fn flush(&mut self, rows: &[ProspectRow]) -> Result<()>;
}

/// Writes the table to a CSV file, atomically through a temp file
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    path: PathBuf,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for CsvTableSink {
    fn flush(&mut self, rows: &[ProspectRow]) -> Result<()> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!("Flushed {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

/// Reads all rows of a CSV prospect table
pub fn read_rows(path: &Path) -> Result<Vec<ProspectRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Prospect rows plus the sink they are checkpointed to
pub struct ProspectTable {
    pub rows: Vec<ProspectRow>,
    sink: Box<dyn TableSink>,
}

impl ProspectTable {
    pub fn new(rows: Vec<ProspectRow>, sink: Box<dyn TableSink>) -> Self {
        Self { rows, sink }
    }

    /// Loads a CSV table that is flushed back to the same file
    pub fn load_csv(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows = read_rows(&path)?;
        tracing::info!("Loaded {} prospects from {}", rows.len(), path.display());
        Ok(Self::new(rows, Box::new(CsvTableSink::new(path))))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush(&self.rows)
    }
}
