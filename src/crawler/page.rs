use crate::classify::{Category, Characteristics};
use serde::{Deserialize, Serialize};

/// A page fetched and classified during a crawl
///
/// Immutable once recorded, except `category` and `selected_for_audit`,
/// which an operator may change later through storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Absolute URL as fetched, fragment removed
    pub url: String,
    /// Dedup key, unique within a job
    pub normalized_url: String,
    pub depth: u32,
    pub http_status: u16,
    pub title: Option<String>,
    pub category: Category,
    pub confidence: f32,
    pub characteristics: Characteristics,
    pub selected_for_audit: bool,
    /// Blob URL of the page screenshot
    pub screenshot_url: Option<String>,
}

/// A URL that could not be crawled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    pub url: String,
    pub depth: u32,
    pub message: String,
}

impl CrawlError {
    pub fn new(url: impl Into<String>, depth: u32, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            message: message.into(),
        }
    }
}
