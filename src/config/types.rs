use serde::Deserialize;

/// Main configuration structure for SiteWarden
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed URL (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages crawled in one job
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Politeness delay between two fetches (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Path patterns a URL must match to be crawled (empty = everything)
    #[serde(rename = "include-paths", default)]
    pub include_paths: Vec<String>,

    /// Path patterns that are never crawled
    #[serde(rename = "exclude-paths", default)]
    pub exclude_paths: Vec<String>,

    /// Page-load timeout (milliseconds)
    #[serde(rename = "page-timeout-ms", default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,

    /// Whether robots.txt rules are honored
    #[serde(rename = "respect-robots-txt", default = "default_true")]
    pub respect_robots_txt: bool,

    /// Whether a screenshot is captured and stored for each crawled page
    #[serde(rename = "take-screenshots", default)]
    pub take_screenshots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 100,
            delay_ms: default_delay_ms(),
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            page_timeout_ms: default_page_timeout_ms(),
            respect_robots_txt: true,
            take_screenshots: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file holding crawl jobs and pages
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown crawl summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Directory receiving one JSON report per audited URL
    #[serde(rename = "reports-dir", default = "default_reports_dir")]
    pub reports_dir: String,

    /// Directory receiving page screenshots
    #[serde(rename = "screenshots-dir", default = "default_screenshots_dir")]
    pub screenshots_dir: String,
}

/// Audit probe configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuditConfig {
    /// Number of compliance criteria used to normalize the accessibility penalty
    #[serde(default = "default_total_criteria")]
    pub total_criteria: u32,

    /// Standard tags the accessibility rule engine runs
    #[serde(default = "default_rule_tags")]
    pub rule_tags: Vec<String>,

    /// Performance engine endpoint (PageSpeed Insights v5 compatible)
    #[serde(default = "default_pagespeed_endpoint")]
    pub pagespeed_endpoint: String,

    /// Optional API key for the performance engine
    #[serde(default)]
    pub pagespeed_api_key: Option<String>,

    /// Device strategy passed to the performance engine
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Timeout for a full performance run (milliseconds)
    #[serde(default = "default_performance_timeout_ms")]
    pub performance_timeout_ms: u64,

    /// Page-load timeout for page-based probes (milliseconds)
    #[serde(default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            total_criteria: default_total_criteria(),
            rule_tags: default_rule_tags(),
            pagespeed_endpoint: default_pagespeed_endpoint(),
            pagespeed_api_key: None,
            strategy: default_strategy(),
            performance_timeout_ms: default_performance_timeout_ms(),
            page_timeout_ms: default_page_timeout_ms(),
        }
    }
}

/// Batch orchestration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BatchConfig {
    /// Number of audits launched together in one group
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Skip prospects whose last audit completed
    #[serde(default = "default_true")]
    pub skip_audited: bool,

    /// Only audit prospects whose current priority is in this list
    #[serde(default)]
    pub priority_filter: Vec<u8>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            skip_audited: true,
            priority_filter: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_page_timeout_ms() -> u64 {
    30_000
}

fn default_reports_dir() -> String {
    "./reports".to_string()
}

fn default_screenshots_dir() -> String {
    "./screenshots".to_string()
}

// RGAA 4.1 criterion count
fn default_total_criteria() -> u32 {
    106
}

fn default_rule_tags() -> Vec<String> {
    vec![
        "wcag2a".to_string(),
        "wcag2aa".to_string(),
        "wcag21a".to_string(),
        "wcag21aa".to_string(),
    ]
}

fn default_pagespeed_endpoint() -> String {
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string()
}

fn default_strategy() -> String {
    "mobile".to_string()
}

fn default_performance_timeout_ms() -> u64 {
    90_000
}

fn default_concurrency() -> usize {
    3
}
