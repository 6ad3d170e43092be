//! Output module for generating crawl summaries and reports
//!
//! This module handles:
//! - Building a crawl summary from storage
//! - Generating markdown summaries of crawl results
//! - Printing crawl statistics

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use summary::{CrawlSummary, OutputError, OutputResult};

use crate::storage::Storage;
use crate::{Result, WardenError};
use chrono::{DateTime, Utc};

/// Generates the summary of a crawl job from storage
///
/// `job_id` defaults to the most recent job.
pub fn generate_summary(storage: &dyn Storage, job_id: Option<i64>) -> Result<CrawlSummary> {
    let job = match job_id {
        Some(id) => storage.get_job(id)?,
        None => storage
            .get_latest_job()?
            .ok_or_else(|| WardenError::Storage("No crawl jobs found in database".to_string()))?,
    };

    let duration_seconds = match (&job.started_at, &job.finished_at) {
        (Some(started), Some(finished)) => {
            match (
                started.parse::<DateTime<Utc>>(),
                finished.parse::<DateTime<Utc>>(),
            ) {
                (Ok(started), Ok(finished)) => Some((finished - started).num_seconds().max(0) as u64),
                _ => None,
            }
        }
        _ => None,
    };

    let stats = stats::load_statistics(storage, job.id)?;
    let selected_pages = storage
        .get_pages_selected_for_audit(job.id)?
        .into_iter()
        .map(|record| (record.page.category, record.page.url, record.page.title))
        .collect();

    Ok(CrawlSummary {
        job_id: job.id,
        seed_url: job.seed_url,
        started_at: job.started_at,
        finished_at: job.finished_at,
        duration_seconds,
        status: job.status.to_db_string().to_string(),
        config_hash: job.config_hash,
        error_message: job.error_message,
        pages_crawled: stats.total_pages,
        pages_discovered: job.discovered as u64,
        total_errors: stats.total_errors,
        category_breakdown: stats.pages_by_category,
        depth_breakdown: stats.pages_by_depth,
        selected_pages,
        errors: storage.get_errors(job.id)?,
    })
}
