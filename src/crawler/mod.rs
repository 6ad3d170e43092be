//! Crawler module: single-site breadth-first traversal
//!
//! This module contains the core crawling logic, including:
//! - The FIFO frontier with its normalized-URL dedup set
//! - HTML parsing, link extraction and inline page classification
//! - Overall crawl coordination and job lifecycle
//!
//! # Example
//!
//! ```no_run
//! use sitewarden::browser::{BrowserService, HttpBrowser};
//! use sitewarden::config::load_config;
//! use sitewarden::crawler::Crawler;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(Path::new("sitewarden.toml"))?;
//! let engine = Arc::new(HttpBrowser::new(&config.user_agent));
//! let browser = Arc::new(BrowserService::new(engine));
//!
//! let crawler = Crawler::new(config.crawler.clone(), &config.user_agent.crawler_name, browser);
//! let outcome = crawler.crawl("https://example.com/").await?;
//! println!("{} pages, {} errors", outcome.pages.len(), outcome.errors.len());
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod frontier;
mod page;
mod parser;

pub use coordinator::{CrawlOutcome, Crawler};
pub use frontier::{Frontier, QueueItem};
pub use page::{CrawlError, CrawledPage};
pub use parser::{parse_html, ParsedPage};
