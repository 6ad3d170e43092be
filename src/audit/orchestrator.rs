use crate::audit::accessibility::{AccessibilityRuleEngine, BuiltinRuleEngine};
use crate::audit::performance::PerformanceAuditEngine;
use crate::audit::technology::{StaticSignatureDb, TechnologyInput, TechnologySignatureDb};
use crate::audit::{
    privacy, report, AccessibilityResult, AuditRecord, AuditStatus, Impact, LoadedPage,
    PerformanceScores, PrivacyResult, TechnologyFingerprint,
};
use crate::browser::BrowserService;
use crate::config::AuditConfig;
use crate::scoring::{
    accessibility_score, priority, problem_summaries, ComplianceStatus, PriorityInput,
    ProblemFacts,
};
use crate::signatures::criteria::criteria_for_tags;
use crate::{Result, UrlError, WardenError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Audits one prospect site
#[async_trait]
pub trait SiteAuditor: Send + Sync {
    /// Audits `url`; `population` feeds the priority rule
    async fn audit_prospect(&self, url: &str, population: Option<u64>) -> Result<AuditRecord>;
}

/// Runs the four probes for a URL and composes the record
pub struct Auditor {
    browser: Arc<BrowserService>,
    accessibility: Arc<dyn AccessibilityRuleEngine>,
    performance: Arc<dyn PerformanceAuditEngine>,
    technology: Arc<dyn TechnologySignatureDb>,
    config: AuditConfig,
    reports_dir: Option<PathBuf>,
}

impl Auditor {
    /// Creates an auditor using the built-in rule engine and signature tables
    pub fn new(
        browser: Arc<BrowserService>,
        performance: Arc<dyn PerformanceAuditEngine>,
        config: AuditConfig,
    ) -> Self {
        Self {
            browser,
            accessibility: Arc::new(BuiltinRuleEngine),
            performance,
            technology: Arc::new(StaticSignatureDb),
            config,
            reports_dir: None,
        }
    }

    pub fn with_accessibility_engine(mut self, engine: Arc<dyn AccessibilityRuleEngine>) -> Self {
        self.accessibility = engine;
        self
    }

    pub fn with_technology_db(mut self, db: Arc<dyn TechnologySignatureDb>) -> Self {
        self.technology = db;
        self
    }

    /// Writes a JSON report per audited URL into `dir`
    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = Some(dir.into());
        self
    }

    /// Audits `url` without population data
    pub async fn audit(&self, url: &str) -> Result<AuditRecord> {
        self.audit_prospect(url, None).await
    }

    async fn run(&self, url: &str, population: Option<u64>) -> Result<AuditRecord> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UrlError::InvalidScheme(parsed.scheme().to_string()).into());
        }
        let url = parsed.as_str();

        self.browser.start().await?;
        tracing::debug!("Auditing {}", url);

        let (accessibility, privacy, performance, technology) = tokio::join!(
            self.accessibility_probe(url),
            self.privacy_probe(url),
            self.performance.audit(url),
            self.technology_probe(url),
        );

        let page_unreachable = accessibility.is_err() && privacy.is_err() && technology.is_err();

        let accessibility = degrade("accessibility", url, accessibility, AccessibilityResult::failed);
        let privacy = degrade("privacy", url, privacy, PrivacyResult::failed);
        let performance = degrade("performance", url, performance, PerformanceScores::failed);
        let technology = degrade("technology", url, technology, TechnologyFingerprint::failed);

        let priority = priority(&PriorityInput {
            accessibility: accessibility.score.unwrap_or(100),
            privacy: privacy.score.unwrap_or(100),
            trackers_without_banner: privacy.trackers_without_banner(),
            population,
        });

        let mut problems = Vec::new();
        if page_unreachable {
            problems.push("page could not be loaded".to_string());
        }
        problems.extend(problem_summaries(&ProblemFacts {
            is_https: privacy.error.is_none().then_some(privacy.is_https),
            trackers_before_consent: privacy.trackers.len(),
            cookies_before_consent: privacy.cookies.len(),
            has_banner: privacy.error.is_none().then_some(privacy.consent_banner),
            critical_violations: accessibility.count_impact(Impact::Critical),
            serious_violations: accessibility.count_impact(Impact::Serious),
            accessibility_status: accessibility.status,
            performance: performance.performance,
        }));

        let mut record = AuditRecord {
            url: url.to_string(),
            audited_at: Utc::now(),
            status: if page_unreachable {
                AuditStatus::AuditError
            } else {
                AuditStatus::Completed
            },
            accessibility,
            privacy,
            performance,
            technology,
            priority,
            problems,
            report_path: None,
        };

        if let Some(dir) = &self.reports_dir {
            let path = dir.join(report::report_file_name(&record.url, record.audited_at));
            record.report_path = Some(path.display().to_string());
            if let Err(e) = report::write_report(dir, &record) {
                tracing::warn!("Failed to write report for {}: {}", url, e);
                record.report_path = None;
            }
        }

        tracing::info!(
            "Audited {}: status {}, priority {}",
            url,
            record.status,
            record.priority
        );
        Ok(record)
    }

    /// Opens a page of its own and loads `url`
    async fn load_page(&self, url: &str) -> Result<LoadedPage> {
        let mut page = self.browser.page().await?;
        let timeout = Duration::from_millis(self.config.page_timeout_ms);
        let response = page.navigate(url, timeout).await?;

        if response.status >= 400 {
            return Err(WardenError::Probe {
                probe: "page".to_string(),
                message: format!("HTTP {}", response.status),
            });
        }
        if !response.is_html() {
            return Err(WardenError::Probe {
                probe: "page".to_string(),
                message: format!(
                    "not an HTML document ({})",
                    response.content_type().unwrap_or("unknown type")
                ),
            });
        }

        Ok(LoadedPage {
            url: url.to_string(),
            response,
            page,
        })
    }

    async fn accessibility_probe(&self, url: &str) -> Result<AccessibilityResult> {
        let mut page = self.load_page(url).await?;
        let mut violations = self
            .accessibility
            .scan(&mut page, &self.config.rule_tags)
            .await?;
        for violation in violations.iter_mut().filter(|v| v.criteria.is_empty()) {
            violation.criteria = criteria_for_tags(&violation.tags)
                .into_iter()
                .map(String::from)
                .collect();
        }

        let score = accessibility_score(
            violations.iter().map(|v| v.impact),
            self.config.total_criteria,
        );

        let mut criteria: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for violation in &violations {
            for criterion in &violation.criteria {
                criteria
                    .entry(criterion.clone())
                    .or_default()
                    .push(violation.rule_id.clone());
            }
        }

        Ok(AccessibilityResult {
            violations,
            score: Some(score),
            status: Some(ComplianceStatus::from_score(score)),
            criteria,
            error: None,
        })
    }

    async fn privacy_probe(&self, url: &str) -> Result<PrivacyResult> {
        let mut page = self.load_page(url).await?;
        Ok(privacy::probe(&mut page).await)
    }

    async fn technology_probe(&self, url: &str) -> Result<TechnologyFingerprint> {
        let page = self.load_page(url).await?;
        let cookies = page.response.cookie_names();
        Ok(self.technology.detect(&TechnologyInput {
            html: &page.response.html,
            headers: &page.response.headers,
            cookies: &cookies,
        }))
    }
}

#[async_trait]
impl SiteAuditor for Auditor {
    async fn audit_prospect(&self, url: &str, population: Option<u64>) -> Result<AuditRecord> {
        self.run(url, population).await
    }
}

/// Replaces a failed probe result with its empty error form
fn degrade<T>(probe: &str, url: &str, result: Result<T>, failed: fn(String) -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{} probe failed for {}: {}", probe, url, e);
            failed(e.to_string())
        }
    }
}
