//! Shared fixtures for the integration tests
//!
//! `StaticSite` is an in-memory browser engine serving a fixed link graph,
//! so crawls are deterministic and need no network.

#![allow(dead_code)]

use async_trait::async_trait;
use sitewarden::audit::{
    AccessibilityResult, AuditRecord, AuditStatus, PerformanceAuditEngine, PerformanceScores,
    PrivacyResult, SiteAuditor, TechnologyFingerprint,
};
use sitewarden::browser::{BrowserAutomation, BrowserPage, BrowserService, NavigateResponse};
use sitewarden::{BrowserError, BrowserResult, Result, WardenError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const SITE: &str = "https://site.test";

#[derive(Debug, Clone)]
pub struct Resource {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Resource {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_lowercase(), value.to_string()));
        self
    }
}

/// Builds a page whose body links to `links`
pub fn page_with_links(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    format!(
        "<!doctype html><html lang=\"fr\"><head><title>{}</title></head><body>\n{}</body></html>",
        title, anchors
    )
}

#[derive(Default)]
pub struct SiteStats {
    pub starts: AtomicUsize,
    pub closes: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl SiteStats {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

/// In-memory engine keyed by normalized URL
#[derive(Default)]
pub struct StaticSite {
    resources: HashMap<String, Resource>,
    unreachable: HashSet<String>,
    fail_start: bool,
    pub stats: Arc<SiteStats>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `resource` at `path` of [`SITE`]
    pub fn with(mut self, path: &str, resource: Resource) -> Self {
        self.resources.insert(key(&format!("{}{}", SITE, path)), resource);
        self
    }

    /// Serves an HTML page at `path` linking to `links`
    pub fn with_page(self, path: &str, links: &[&str]) -> Self {
        let title = format!("Page {}", path);
        self.with(path, Resource::html(page_with_links(&title, links)))
    }

    /// Navigation to `path` fails with a connection error
    pub fn with_unreachable(mut self, path: &str) -> Self {
        self.unreachable.insert(key(&format!("{}{}", SITE, path)));
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Wraps the site in a browser service; the stats handle stays shared
    pub fn into_service(self) -> (Arc<BrowserService>, Arc<SiteStats>) {
        let stats = self.stats.clone();
        (Arc::new(BrowserService::new(Arc::new(self))), stats)
    }
}

/// Lookup key: the URL as the parser serializes it, compared exactly
fn key(url: &str) -> String {
    Url::parse(url).map(String::from).unwrap_or_else(|_| url.to_string())
}

struct StaticPage {
    resources: HashMap<String, Resource>,
    unreachable: HashSet<String>,
    stats: Arc<SiteStats>,
}

#[async_trait]
impl BrowserPage for StaticPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> BrowserResult<NavigateResponse> {
        self.stats.navigations.lock().unwrap().push(url.to_string());
        let key = key(url);

        if self.unreachable.contains(&key) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "Connection refused".to_string(),
            });
        }

        let resource = self
            .resources
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Resource::html("<h1>Not found</h1>").with_status(404));

        let mut headers = vec![("content-type".to_string(), resource.content_type.clone())];
        headers.extend(resource.headers.clone());

        Ok(NavigateResponse {
            status: resource.status,
            final_url: url.to_string(),
            headers,
            html: resource.body,
        })
    }

    async fn evaluate(&mut self, _script: &str) -> BrowserResult<serde_json::Value> {
        Err(BrowserError::Unsupported("static pages run no scripts".to_string()))
    }

    async fn screenshot(&mut self) -> BrowserResult<Vec<u8>> {
        Ok(b"\x89PNG\r\n".to_vec())
    }
}

#[async_trait]
impl BrowserAutomation for StaticSite {
    async fn start(&self) -> BrowserResult<()> {
        if self.fail_start {
            return Err(BrowserError::Launch("no display available".to_string()));
        }
        self.stats.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> BrowserResult<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open_page(&self) -> BrowserResult<Box<dyn BrowserPage>> {
        Ok(Box::new(StaticPage {
            resources: self.resources.clone(),
            unreachable: self.unreachable.clone(),
            stats: self.stats.clone(),
        }))
    }
}

/// Performance engine returning fixed scores
pub struct FixedPerformance(pub PerformanceScores);

#[async_trait]
impl PerformanceAuditEngine for FixedPerformance {
    async fn audit(&self, _url: &str) -> Result<PerformanceScores> {
        Ok(self.0.clone())
    }
}

/// Performance engine that always fails
pub struct FailingPerformance;

#[async_trait]
impl PerformanceAuditEngine for FailingPerformance {
    async fn audit(&self, url: &str) -> Result<PerformanceScores> {
        Err(WardenError::Probe {
            probe: "performance".to_string(),
            message: format!("quota exceeded for {}", url),
        })
    }
}

/// Auditor returning canned records without touching a browser
#[derive(Default)]
pub struct ScriptedAuditor {
    /// URLs whose audit returns an error
    pub failing: HashSet<String>,
    /// URLs whose audit ends in `audit-error`
    pub unreachable: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedAuditor {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn completed_record(url: &str, accessibility: u8, privacy: u8) -> AuditRecord {
    AuditRecord {
        url: url.to_string(),
        audited_at: chrono::Utc::now(),
        status: AuditStatus::Completed,
        accessibility: AccessibilityResult {
            score: Some(accessibility),
            ..Default::default()
        },
        privacy: PrivacyResult {
            score: Some(privacy),
            is_https: true,
            ..Default::default()
        },
        performance: PerformanceScores {
            performance: Some(0.8),
            seo: Some(0.9),
            ..Default::default()
        },
        technology: TechnologyFingerprint::default(),
        priority: 4,
        problems: vec!["no consent banner".to_string()],
        report_path: None,
    }
}

#[async_trait]
impl SiteAuditor for ScriptedAuditor {
    async fn audit_prospect(&self, url: &str, _population: Option<u64>) -> Result<AuditRecord> {
        self.calls.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;

        if self.failing.contains(url) {
            return Err(WardenError::Probe {
                probe: "page".to_string(),
                message: "browser crashed".to_string(),
            });
        }

        let mut record = completed_record(url, 70, 60);
        if self.unreachable.contains(url) {
            record.status = AuditStatus::AuditError;
            record.accessibility = AccessibilityResult::failed("HTTP 500");
            record.privacy = PrivacyResult::failed("HTTP 500");
        }
        Ok(record)
    }
}
