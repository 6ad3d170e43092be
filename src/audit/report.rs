//! Per-URL JSON audit reports

use crate::audit::AuditRecord;
use crate::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// `<hostname>_<timestamp>.json`, with the hostname reduced to safe characters
pub fn report_file_name(url: &str, at: DateTime<Utc>) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| "unknown".to_string());

    let host: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}_{}.json", host, at.format("%Y%m%dT%H%M%S"))
}

/// Writes `record` as pretty JSON under `dir` and returns the file path
pub fn write_report(dir: &Path, record: &AuditRecord) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(&record.url, record.audited_at));
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json)?;
    Ok(path)
}
