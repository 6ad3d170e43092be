//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::classify::Category;
use crate::storage::Storage;
use crate::Result;
use std::collections::HashMap;

/// Crawl statistics of one job
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub job_id: i64,

    /// Number of pages recorded
    pub total_pages: u64,

    /// Count of pages by category
    pub pages_by_category: HashMap<Category, u64>,

    /// Count of pages by depth
    pub pages_by_depth: HashMap<u32, u64>,

    /// Number of URLs that could not be crawled
    pub total_errors: u64,

    /// Number of pages flagged for audit
    pub selected_for_audit: u64,
}

/// Loads statistics of `job_id` from storage
pub fn load_statistics(storage: &dyn Storage, job_id: i64) -> Result<CrawlStatistics> {
    Ok(CrawlStatistics {
        job_id,
        total_pages: storage.count_pages(job_id)?,
        pages_by_category: storage.get_category_breakdown(job_id)?,
        pages_by_depth: storage.get_depth_breakdown(job_id)?,
        total_errors: storage.get_errors(job_id)?.len() as u64,
        selected_for_audit: storage.get_pages_selected_for_audit(job_id)?.len() as u64,
    })
}

/// Categories sorted by count (descending), then by declaration order
pub fn sorted_categories(counts: &HashMap<Category, u64>) -> Vec<(Category, u64)> {
    let mut sorted: Vec<(Category, u64)> = Category::ALL
        .iter()
        .filter_map(|c| counts.get(c).map(|n| (*c, *n)))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics (job {}) ===\n", stats.job_id);

    println!("Overview:");
    println!("  Pages crawled: {}", stats.total_pages);
    println!("  Errors: {}", stats.total_errors);
    println!("  Selected for audit: {}", stats.selected_for_audit);
    println!();

    println!("Pages by Category:");
    for (category, count) in sorted_categories(&stats.pages_by_category) {
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", category, count, percentage);
    }
    println!();

    if !stats.pages_by_depth.is_empty() {
        println!("Pages by Depth:");
        let mut depths: Vec<_> = stats.pages_by_depth.iter().collect();
        depths.sort_by_key(|(d, _)| **d);
        for (depth, count) in depths {
            println!("  {}: {}", depth, count);
        }
    }
}
