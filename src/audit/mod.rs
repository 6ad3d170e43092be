//! Multi-probe site audit
//!
//! [`Auditor`] runs four independent probes per URL concurrently and folds
//! their results through the scoring engine into one [`AuditRecord`]:
//!
//! - accessibility: an [`AccessibilityRuleEngine`] over the loaded page
//! - privacy: cookies, storage keys, trackers and consent banner before any
//!   consent interaction
//! - performance: an external [`PerformanceAuditEngine`]
//! - technology: CMS, frameworks, consent manager, analytics and plugins
//!
//! A failing probe degrades to an empty sub-result carrying its error message.
//! When no page-based probe could load the page, the record is marked
//! [`AuditStatus::AuditError`].

mod accessibility;
mod orchestrator;
mod performance;
mod privacy;
mod report;
mod technology;

pub use accessibility::{AccessibilityRuleEngine, BuiltinRuleEngine};
pub use orchestrator::{Auditor, SiteAuditor};
pub use performance::{PageSpeedEngine, PerformanceAuditEngine};
pub use privacy::analyze_privacy;
pub use report::{report_file_name, write_report};
pub use technology::{StaticSignatureDb, TechnologyInput, TechnologySignatureDb};

use crate::browser::{BrowserPage, NavigateResponse};
use crate::scoring::ComplianceStatus;
use crate::signatures::trackers::TrackerCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of an accessibility violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    /// Scoring weight: minor 1 through critical 4
    pub fn weight(self) -> u32 {
        match self {
            Impact::Minor => 1,
            Impact::Moderate => 2,
            Impact::Serious => 3,
            Impact::Critical => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub impact: Impact,
    pub description: String,
    /// Number of affected nodes
    pub nodes: usize,
    /// Standard tags, e.g. `wcag2a`, `wcag111`
    pub tags: Vec<String>,
    /// Compliance criteria this violation maps to; filled from `tags` when an engine leaves it empty
    pub criteria: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityResult {
    pub violations: Vec<Violation>,
    pub score: Option<u8>,
    pub status: Option<ComplianceStatus>,
    /// Criterion id to the rule ids violating it
    pub criteria: BTreeMap<String, Vec<String>>,
    pub error: Option<String>,
}

impl AccessibilityResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn count_impact(&self, impact: Impact) -> usize {
        self.violations.iter().filter(|v| v.impact == impact).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTracker {
    pub name: String,
    pub category: TrackerCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivacyResult {
    pub is_https: bool,
    /// Cookies present before any consent interaction
    pub cookies: Vec<String>,
    /// localStorage / sessionStorage keys present before consent
    pub storage_keys: Vec<String>,
    pub trackers: Vec<DetectedTracker>,
    pub consent_banner: bool,
    pub consent_manager: Option<String>,
    pub score: Option<u8>,
    pub error: Option<String>,
}

impl PrivacyResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn trackers_without_banner(&self) -> bool {
        self.error.is_none() && !self.trackers.is_empty() && !self.consent_banner
    }
}

/// Scores in [0, 1]; `None` when the engine did not produce them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScores {
    pub performance: Option<f64>,
    pub accessibility: Option<f64>,
    pub best_practices: Option<f64>,
    pub seo: Option<f64>,
    pub error: Option<String>,
}

impl PerformanceScores {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.performance.is_none()
            && self.accessibility.is_none()
            && self.best_practices.is_none()
            && self.seo.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnologyFingerprint {
    pub cms: Option<String>,
    pub cms_version: Option<String>,
    pub frameworks: Vec<String>,
    pub consent_manager: Option<String>,
    pub analytics: Vec<String>,
    pub plugins: Vec<String>,
    pub author: Option<String>,
    pub has_newsletter: bool,
    pub error: Option<String>,
}

impl TechnologyFingerprint {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// One-line summary used in the prospect table
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(cms) = &self.cms {
            match &self.cms_version {
                Some(version) => parts.push(format!("{} {}", cms, version)),
                None => parts.push(cms.clone()),
            }
        }
        parts.extend(self.frameworks.iter().cloned());
        if let Some(cmp) = &self.consent_manager {
            parts.push(cmp.clone());
        }
        parts.extend(self.analytics.iter().cloned());
        parts.join(", ")
    }
}

/// Outcome of an audit as exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    Completed,
    AuditError,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Completed => "completed",
            AuditStatus::AuditError => "audit-error",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite result of one audited URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub url: String,
    pub audited_at: DateTime<Utc>,
    pub status: AuditStatus,
    pub accessibility: AccessibilityResult,
    pub privacy: PrivacyResult,
    pub performance: PerformanceScores,
    pub technology: TechnologyFingerprint,
    /// 1 to 5, 5 the most urgent
    pub priority: u8,
    pub problems: Vec<String>,
    pub report_path: Option<String>,
}

/// A page loaded for one probe, released when dropped
pub struct LoadedPage {
    pub url: String,
    pub response: NavigateResponse,
    pub page: Box<dyn BrowserPage>,
}
