//! Storage module for persisting crawl data
//!
//! This module handles all persistence for the crawler, including:
//! - SQLite database initialization and schema management
//! - Crawl job state, crawled pages and crawl errors
//! - Operator edits of page category and audit selection
//! - Blob storage for page screenshots

mod blob;
mod schema;
mod sqlite;
mod traits;

pub use blob::{BlobStorage, FsBlobStorage};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::CrawledPage;
use crate::state::CrawlStatus;

/// Represents a crawl job in the database
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: i64,
    pub seed_url: String,
    pub status: CrawlStatus,
    pub config_hash: String,
    pub max_depth: u32,
    pub max_pages: u32,
    pub delay_ms: u64,
    pub discovered: u32,
    pub crawled: u32,
    pub error_message: Option<String>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// Represents a crawled page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub job_id: i64,
    pub page: CrawledPage,
    pub crawled_at: String,
}
