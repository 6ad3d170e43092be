//! Configuration module for SiteWarden
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitewarden::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitewarden.toml")).unwrap();
//! println!("Crawler will stop after {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    AuditConfig, BatchConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_crawler_config;
