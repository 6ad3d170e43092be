//! State module for tracking crawl job progress
//!
//! # Components
//!
//! - `CrawlStatus`: the job state machine (pending, running, completed, failed, cancelled)
//! - `CrawlJob`: one crawl of a target site with its counters and timestamps

mod crawl_job;
mod job_status;

pub use crawl_job::CrawlJob;
pub use job_status::CrawlStatus;
