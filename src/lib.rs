//! SiteWarden: a site crawler and compliance auditor for prospecting
//!
//! This crate crawls a single target website breadth-first, classifies its pages,
//! and audits URLs for accessibility, privacy/consent, performance and technology.
//! Audit results are folded into scores and an outreach priority, and batches of
//! prospects are processed with bounded concurrency and checkpointed to a CSV table.

pub mod audit;
pub mod batch;
pub mod browser;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod scoring;
pub mod signatures;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for SiteWarden operations
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlStatus,
        to: state::CrawlStatus,
    },

    #[error("Probe '{probe}' failed: {message}")]
    Probe { probe: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid path pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Browser engine errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser failed to start: {0}")]
    Launch(String),

    #[error("browser is not running")]
    NotStarted,

    #[error("browser has been closed")]
    Closed,

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("page load timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("operation not supported by this engine: {0}")]
    Unsupported(String),
}

/// Result type alias for SiteWarden operations
pub type Result<T> = std::result::Result<T, WardenError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

// Re-export commonly used types
pub use audit::{AuditRecord, AuditStatus, Auditor};
pub use batch::{run_batch, BatchOptions, BatchSummary, ProspectRow};
pub use browser::BrowserService;
pub use classify::{classify_page, Category};
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawledPage, Crawler};
pub use state::{CrawlJob, CrawlStatus};
pub use url::{extract_domain, is_same_origin, normalize_url};
