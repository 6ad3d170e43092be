//! Integration tests for the audit orchestrator
//!
//! Pages are served by the in-memory engine; the performance engine is a
//! fixed or failing fake.

mod common;

use async_trait::async_trait;
use common::{FailingPerformance, FixedPerformance, Resource, StaticSite, SITE};
use sitewarden::audit::{
    AccessibilityRuleEngine, AuditRecord, AuditStatus, Auditor, Impact, LoadedPage,
    PerformanceScores, SiteAuditor, TechnologyFingerprint, TechnologyInput,
    TechnologySignatureDb, Violation,
};
use sitewarden::config::AuditConfig;
use sitewarden::scoring::ComplianceStatus;
use std::sync::Arc;
use tempfile::TempDir;

const CLEAN_PAGE: &str = r#"<!doctype html>
<html lang="fr"><head><title>Mairie de Exemple</title></head>
<body>
  <h1>Bienvenue</h1>
  <a href="/contact">Contact</a>
  <div role="dialog"><p>Ce site utilise des cookies.</p><button>Accepter</button><button>Refuser</button></div>
</body></html>"#;

const TRACKED_PAGE: &str = r#"<!doctype html>
<html lang="fr"><head>
  <title>Commune</title>
  <meta name="generator" content="WordPress 6.4.2">
  <script async src="https://www.googletagmanager.com/gtag/js?id=G-XYZ"></script>
</head>
<body><h1>Commune</h1><img src="/blason.png"></body></html>"#;

fn good_performance() -> PerformanceScores {
    PerformanceScores {
        performance: Some(0.9),
        accessibility: Some(0.95),
        best_practices: Some(1.0),
        seo: Some(0.85),
        error: None,
    }
}

fn audit_config() -> AuditConfig {
    AuditConfig {
        page_timeout_ms: 2_000,
        ..Default::default()
    }
}

fn auditor_for(site: StaticSite) -> Auditor {
    let (browser, _) = site.into_service();
    Auditor::new(
        browser,
        Arc::new(FixedPerformance(good_performance())),
        audit_config(),
    )
}

fn home() -> String {
    format!("{}/", SITE)
}

#[tokio::test]
async fn test_clean_site_gets_lowest_priority() {
    let auditor = auditor_for(StaticSite::new().with("/", Resource::html(CLEAN_PAGE)));

    let record = auditor.audit(&home()).await.unwrap();

    assert_eq!(record.status, AuditStatus::Completed);
    assert_eq!(record.accessibility.score, Some(100));
    assert_eq!(record.accessibility.status, Some(ComplianceStatus::Compliant));
    assert!(record.accessibility.violations.is_empty());

    assert!(record.privacy.is_https);
    assert!(record.privacy.consent_banner);
    assert_eq!(record.privacy.score, Some(100));

    assert_eq!(record.performance.performance, Some(0.9));
    assert_eq!(record.priority, 1);
    assert!(record.problems.is_empty());
    assert!(record.report_path.is_none());
}

#[tokio::test]
async fn test_trackers_without_banner_are_most_urgent() {
    let auditor = auditor_for(StaticSite::new().with("/", Resource::html(TRACKED_PAGE)));

    let record = auditor.audit(&home()).await.unwrap();

    assert_eq!(record.status, AuditStatus::Completed);
    let trackers: Vec<&str> = record.privacy.trackers.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(trackers, vec!["Google Analytics"]);
    assert!(!record.privacy.consent_banner);
    // 100 - 15 (tracker) - 20 (no banner)
    assert_eq!(record.privacy.score, Some(65));
    assert_eq!(record.priority, 5);

    assert_eq!(record.technology.cms.as_deref(), Some("WordPress"));
    assert_eq!(record.technology.cms_version.as_deref(), Some("6.4.2"));
    assert_eq!(record.technology.analytics, vec!["Google Analytics"]);

    let a11y_rules: Vec<&str> = record
        .accessibility
        .violations
        .iter()
        .map(|v| v.rule_id.as_str())
        .collect();
    assert_eq!(a11y_rules, vec!["image-alt"]);
    assert!(record.accessibility.criteria.contains_key("1.1"));

    assert_eq!(record.problems[0], "1 tracker(s) before consent");
    assert!(record.problems.contains(&"no consent banner".to_string()));
    assert!(record
        .problems
        .contains(&"1 critical accessibility violation(s)".to_string()));
}

#[tokio::test]
async fn test_performance_failure_keeps_other_probes() {
    let (browser, _) = StaticSite::new()
        .with("/", Resource::html(CLEAN_PAGE))
        .into_service();
    let auditor = Auditor::new(browser, Arc::new(FailingPerformance), audit_config());

    let record = auditor.audit(&home()).await.unwrap();

    assert_eq!(record.status, AuditStatus::Completed);
    assert!(record.performance.performance.is_none());
    assert!(record.performance.seo.is_none());
    assert!(record
        .performance
        .error
        .as_deref()
        .unwrap()
        .contains("quota exceeded"));

    assert_eq!(record.accessibility.score, Some(100));
    assert_eq!(record.privacy.score, Some(100));
    assert!(record.technology.error.is_none());
    assert_eq!(record.priority, 1);
}

#[tokio::test]
async fn test_missing_page_is_an_audit_error() {
    let auditor = auditor_for(StaticSite::new());

    let record = auditor.audit(&home()).await.unwrap();

    assert_eq!(record.status, AuditStatus::AuditError);
    assert!(record.accessibility.score.is_none());
    assert!(record.accessibility.error.as_deref().unwrap().contains("HTTP 404"));
    assert!(record.privacy.score.is_none());
    assert!(record.technology.error.is_some());
    assert_eq!(record.problems[0], "page could not be loaded");
}

#[tokio::test]
async fn test_unreachable_page_is_an_audit_error() {
    let auditor = auditor_for(StaticSite::new().with_unreachable("/"));

    let record = auditor.audit_prospect(&home(), Some(12_000)).await.unwrap();

    assert_eq!(record.status, AuditStatus::AuditError);
    assert!(record
        .privacy
        .error
        .as_deref()
        .unwrap()
        .contains("Connection refused"));
    // the performance engine does not load the page itself
    assert_eq!(record.performance.performance, Some(0.9));
}

#[tokio::test]
async fn test_invalid_urls_are_rejected() {
    let auditor = auditor_for(StaticSite::new());

    assert!(auditor.audit("not a url").await.is_err());
    assert!(auditor.audit("ftp://site.test/").await.is_err());
}

#[tokio::test]
async fn test_report_is_written_per_url() {
    let dir = TempDir::new().unwrap();
    let reports = dir.path().join("reports");
    let auditor = auditor_for(StaticSite::new().with("/", Resource::html(TRACKED_PAGE)))
        .with_reports_dir(&reports);

    let record = auditor.audit(&home()).await.unwrap();

    let path = record.report_path.clone().unwrap();
    assert!(path.starts_with(reports.to_str().unwrap()));
    assert!(path.ends_with(".json"));
    assert!(path.contains("site.test_"));

    let loaded: AuditRecord =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded.url, record.url);
    assert_eq!(loaded.priority, 5);
    assert_eq!(loaded.report_path, record.report_path);
}

#[tokio::test]
async fn test_audits_share_one_browser_start() {
    let (browser, stats) = StaticSite::new()
        .with("/", Resource::html(CLEAN_PAGE))
        .with("/autre", Resource::html(CLEAN_PAGE))
        .into_service();
    let auditor = Auditor::new(
        browser.clone(),
        Arc::new(FixedPerformance(good_performance())),
        audit_config(),
    );

    auditor.audit(&home()).await.unwrap();
    auditor.audit(&format!("{}/autre", SITE)).await.unwrap();
    browser.close().await.unwrap();

    assert_eq!(stats.starts(), 1);
    assert_eq!(stats.closes(), 1);
    // three page-based probes per audit
    assert_eq!(stats.navigations().len(), 6);
}

struct TwoCriticalRules;

#[async_trait]
impl AccessibilityRuleEngine for TwoCriticalRules {
    async fn scan(
        &self,
        page: &mut LoadedPage,
        tags: &[String],
    ) -> sitewarden::Result<Vec<Violation>> {
        assert!(page.response.html.contains("Bienvenue"));
        assert_eq!(tags, ["wcag2a".to_string()]);
        let violation = Violation {
            rule_id: "custom-rule".to_string(),
            impact: Impact::Critical,
            description: "custom check".to_string(),
            nodes: 1,
            tags: vec!["wcag2a".to_string()],
            criteria: vec!["8.3".to_string()],
        };
        Ok(vec![violation.clone(), violation])
    }
}

struct FixedTechnology;

impl TechnologySignatureDb for FixedTechnology {
    fn detect(&self, input: &TechnologyInput<'_>) -> TechnologyFingerprint {
        TechnologyFingerprint {
            cms: Some("TYPO3".to_string()),
            has_newsletter: input.html.contains("newsletter"),
            ..Default::default()
        }
    }
}

#[tokio::test]
async fn test_custom_rule_engine_and_signature_db() {
    let (browser, _) = StaticSite::new()
        .with("/", Resource::html(CLEAN_PAGE))
        .into_service();
    let config = AuditConfig {
        rule_tags: vec!["wcag2a".to_string()],
        ..audit_config()
    };
    let auditor = Auditor::new(browser, Arc::new(FixedPerformance(good_performance())), config)
        .with_accessibility_engine(Arc::new(TwoCriticalRules))
        .with_technology_db(Arc::new(FixedTechnology));

    let record = auditor.audit(&home()).await.unwrap();

    // penalty 8 over 106 * 4
    assert_eq!(record.accessibility.score, Some(98));
    assert_eq!(record.accessibility.status, Some(ComplianceStatus::Partial));
    assert_eq!(
        record.accessibility.criteria.get("8.3"),
        Some(&vec!["custom-rule".to_string(), "custom-rule".to_string()])
    );
    assert!(record
        .problems
        .contains(&"2 critical accessibility violation(s)".to_string()));
    assert_eq!(record.technology.cms.as_deref(), Some("TYPO3"));
    assert!(!record.technology.has_newsletter);
    assert_eq!(record.priority, 1);
}

/// Reports rules without mapping them to criteria
struct TagOnlyRules;

#[async_trait]
impl AccessibilityRuleEngine for TagOnlyRules {
    async fn scan(&self, _: &mut LoadedPage, _: &[String]) -> sitewarden::Result<Vec<Violation>> {
        let violation = |rule_id: &str, impact, tags: &[&str]| Violation {
            rule_id: rule_id.to_string(),
            impact,
            description: String::new(),
            nodes: 1,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            criteria: Vec::new(),
        };
        Ok(vec![
            violation("image-alt", Impact::Critical, &["wcag2a", "wcag111"]),
            violation("region", Impact::Moderate, &["best-practice"]),
        ])
    }
}

#[tokio::test]
async fn test_engine_violations_are_mapped_to_criteria() {
    let (browser, _) = StaticSite::new()
        .with("/", Resource::html(CLEAN_PAGE))
        .into_service();
    let auditor = Auditor::new(browser, Arc::new(FixedPerformance(good_performance())), audit_config())
        .with_accessibility_engine(Arc::new(TagOnlyRules));

    let record = auditor.audit(&home()).await.unwrap();

    let keys: Vec<&str> = record
        .accessibility
        .criteria
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["1.1", "1.2", "1.3", "unmapped"]);
    assert_eq!(
        record.accessibility.criteria.get("unmapped"),
        Some(&vec!["region".to_string()])
    );
    assert_eq!(
        record.accessibility.violations[0].criteria,
        vec!["1.1", "1.2", "1.3"]
    );
}

const POLICY_LINKS_PAGE: &str = r#"<!doctype html>
<html lang="fr"><head>
  <title>Commune</title>
  <script async src="https://www.googletagmanager.com/gtag/js?id=G-XYZ"></script>
</head>
<body>
  <h1>Commune</h1>
  <footer><div class="cookie-links">
    <a href="/cookies">Politique cookies</a>
    <a href="/confidentialite">Vie privée et consentement</a>
  </div></footer>
</body></html>"#;

#[tokio::test]
async fn test_cookie_policy_footer_does_not_hide_trackers() {
    let auditor = auditor_for(StaticSite::new().with("/", Resource::html(POLICY_LINKS_PAGE)));

    let record = auditor.audit(&home()).await.unwrap();

    assert!(!record.privacy.consent_banner);
    assert_eq!(record.privacy.trackers.len(), 1);
    assert_eq!(record.priority, 5);
}
