//! URL handling module for SiteWarden
//!
//! This module provides URL normalization (the crawl dedup key), same-site
//! checks, path pattern matching and the crawl skip rules.

mod domain;
mod filter;
mod matcher;
mod normalize;

pub use domain::{align_to_site, extract_domain, is_same_origin};
pub use filter::{skip_reason, static_asset_extension, SkipReason};
pub use matcher::matches_path_pattern;
pub use normalize::{normalize_url, normalized_key};
