//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::classify::Category;
use crate::crawler::{CrawlError, CrawledPage};
use crate::state::CrawlJob;
use crate::storage::{JobRecord, PageRecord};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Job not found: {0}")]
    JobNotFound(i64),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Job has not been persisted yet")]
    UnsavedJob,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler and the
/// reporting commands.
pub trait Storage {
    // ===== Job Management =====

    /// Inserts a new crawl job and returns its id
    fn create_job(&mut self, job: &CrawlJob, config_hash: &str) -> StorageResult<i64>;

    /// Writes the status, counters, error and timestamps of a persisted job
    fn update_job(&mut self, job: &CrawlJob) -> StorageResult<()>;

    fn get_job(&self, job_id: i64) -> StorageResult<JobRecord>;

    /// Gets the most recently created job
    fn get_latest_job(&self) -> StorageResult<Option<JobRecord>>;

    // ===== Page Management =====

    /// Records a crawled page
    ///
    /// A page whose normalized URL is already recorded for the job is kept
    /// as is; the existing id is returned.
    fn insert_page(&mut self, job_id: i64, page: &CrawledPage) -> StorageResult<i64>;

    /// Gets all pages of a job in crawl order
    fn get_pages(&self, job_id: i64) -> StorageResult<Vec<PageRecord>>;

    /// Gets the pages of a job flagged for audit
    fn get_pages_selected_for_audit(&self, job_id: i64) -> StorageResult<Vec<PageRecord>>;

    /// Operator edit: reassigns the category of a page
    fn update_page_category(&mut self, page_id: i64, category: Category) -> StorageResult<()>;

    /// Operator edit: flags or unflags a page for audit
    fn set_selected_for_audit(&mut self, page_id: i64, selected: bool) -> StorageResult<()>;

    // ===== Error Tracking =====

    fn insert_error(&mut self, job_id: i64, error: &CrawlError) -> StorageResult<()>;

    fn get_errors(&self, job_id: i64) -> StorageResult<Vec<CrawlError>>;

    // ===== Statistics =====

    fn count_pages(&self, job_id: i64) -> StorageResult<u64>;

    /// Gets page count breakdown by category
    fn get_category_breakdown(&self, job_id: i64) -> StorageResult<HashMap<Category, u64>>;

    /// Gets page count breakdown by depth
    ///
    /// Returns a map of depth -> number of pages at that depth
    fn get_depth_breakdown(&self, job_id: i64) -> StorageResult<HashMap<u32, u64>>;
}
