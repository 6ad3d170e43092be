//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a crawl job:
//! job metadata, category and depth breakdowns, the pages selected for
//! audit and the URLs that could not be crawled.

use crate::output::stats::sorted_categories;
use crate::output::summary::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Errors listed in full before the table is truncated
const MAX_LISTED_ERRORS: usize = 50;

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# SiteWarden Crawl Summary\n\n");

    md.push_str("## Job Information\n\n");
    md.push_str(&format!("- **Job ID**: {}\n", summary.job_id));
    md.push_str(&format!("- **Seed URL**: {}\n", summary.seed_url));
    if let Some(started) = &summary.started_at {
        md.push_str(&format!("- **Started**: {}\n", started));
    }
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    if let Some(error) = &summary.error_message {
        md.push_str(&format!("- **Failure**: {}\n", error));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", summary.pages_crawled));
    md.push_str(&format!(
        "- **URLs Discovered**: {}\n",
        summary.pages_discovered
    ));
    md.push_str(&format!("- **Errors**: {}\n", summary.total_errors));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.category_breakdown.is_empty() {
        md.push_str("## Pages by Category\n\n");
        md.push_str("| Category | Pages |\n");
        md.push_str("|----------|-------|\n");
        for (category, count) in sorted_categories(&summary.category_breakdown) {
            md.push_str(&format!("| {} | {} |\n", category, count));
        }
        md.push('\n');
    }

    if !summary.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");

        let mut depths: Vec<_> = summary.depth_breakdown.iter().collect();
        depths.sort_by_key(|(d, _)| **d);

        for (depth, count) in depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !summary.selected_pages.is_empty() {
        md.push_str("## Pages Selected for Audit\n\n");
        md.push_str("| Category | URL | Title |\n");
        md.push_str("|----------|-----|-------|\n");
        for (category, url, title) in &summary.selected_pages {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                category,
                url,
                escape_cell(title.as_deref().unwrap_or("-"))
            ));
        }
        md.push('\n');
    }

    if !summary.errors.is_empty() {
        md.push_str("## Crawl Errors\n\n");
        md.push_str("| URL | Depth | Error |\n");
        md.push_str("|-----|-------|-------|\n");
        for error in summary.errors.iter().take(MAX_LISTED_ERRORS) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                error.url,
                error.depth,
                escape_cell(&error.message)
            ));
        }
        if summary.errors.len() > MAX_LISTED_ERRORS {
            md.push_str(&format!(
                "\n... and {} more\n",
                summary.errors.len() - MAX_LISTED_ERRORS
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
