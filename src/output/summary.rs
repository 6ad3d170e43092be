//! Crawl summary data and output errors

use crate::classify::Category;
use crate::crawler::CrawlError;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary of one crawl job
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Job metadata
    pub job_id: i64,
    pub seed_url: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,
    pub error_message: Option<String>,

    // Overall statistics
    pub pages_crawled: u64,
    pub pages_discovered: u64,
    pub total_errors: u64,

    // Category breakdown (category -> count)
    pub category_breakdown: HashMap<Category, u64>,

    // Depth breakdown (depth -> count)
    pub depth_breakdown: HashMap<u32, u64>,

    /// Pages flagged for audit: (category, url, title)
    pub selected_pages: Vec<(Category, String, Option<String>)>,

    pub errors: Vec<CrawlError>,
}

impl CrawlSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of fetch attempts that produced a page, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempts = self.pages_crawled + self.total_errors;
        if attempts == 0 {
            return 0.0;
        }
        (self.pages_crawled as f64 / attempts as f64) * 100.0
    }
}
