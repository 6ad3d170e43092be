use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration from TOML text
///
/// # Example
///
/// ```
/// use sitewarden::config::parse_config;
///
/// let config = parse_config(r#"
/// [crawler]
/// max-depth = 2
/// max-pages = 20
///
/// [user-agent]
/// crawler-name = "SiteWarden"
/// crawler-version = "0.3"
/// contact-url = "https://example.com/bot"
/// contact-email = "bot@example.com"
///
/// [output]
/// database-path = "./crawl.db"
/// summary-path = "./summary.md"
/// "#).unwrap();
/// assert_eq!(config.crawler.max_pages, 20);
/// ```
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads, parses and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Hex-encoded SHA-256 of the configuration text
///
/// Stored on every crawl job so a job can be traced back to the settings it ran with.
pub fn compute_config_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and the hash of its file
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, compute_config_hash(&content)))
}
