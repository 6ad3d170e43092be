use crate::config::types::{
    AuditConfig, BatchConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_audit_config(&config.audit)?;
    validate_batch_config(&config.batch)?;
    Ok(())
}

/// Validates crawler configuration
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 || config.max_pages > 10_000 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 10000, got {}",
            config.max_pages
        )));
    }

    if config.delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "delay_ms must be <= 60000ms, got {}ms",
            config.delay_ms
        )));
    }

    if config.page_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "page_timeout_ms must be >= 1000ms, got {}ms",
            config.page_timeout_ms
        )));
    }

    for pattern in config.include_paths.iter().chain(&config.exclude_paths) {
        validate_path_pattern(pattern)?;
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("database_path", &config.database_path),
        ("summary_path", &config.summary_path),
        ("reports_dir", &config.reports_dir),
        ("screenshots_dir", &config.screenshots_dir),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates audit configuration
fn validate_audit_config(config: &AuditConfig) -> Result<(), ConfigError> {
    if config.total_criteria < 1 {
        return Err(ConfigError::Validation(
            "total_criteria must be >= 1".to_string(),
        ));
    }

    if config.rule_tags.is_empty() {
        return Err(ConfigError::Validation(
            "rule_tags must contain at least one tag".to_string(),
        ));
    }

    Url::parse(&config.pagespeed_endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid pagespeed_endpoint: {}", e)))?;

    if config.strategy != "mobile" && config.strategy != "desktop" {
        return Err(ConfigError::Validation(format!(
            "strategy must be 'mobile' or 'desktop', got '{}'",
            config.strategy
        )));
    }

    if config.page_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "audit page_timeout_ms must be >= 1000ms, got {}ms",
            config.page_timeout_ms
        )));
    }

    Ok(())
}

/// Validates batch configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 50 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 50, got {}",
            config.concurrency
        )));
    }

    if let Some(bad) = config
        .priority_filter
        .iter()
        .find(|p| !(1..=5).contains(*p))
    {
        return Err(ConfigError::Validation(format!(
            "priority_filter values must be between 1 and 5, got {}",
            bad
        )));
    }

    Ok(())
}

/// Validates an include/exclude path pattern
///
/// Patterns are either path prefixes (`/blog`) or wildcard patterns (`*/print`).
fn validate_path_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Path pattern cannot be empty".to_string(),
        ));
    }

    if !pattern.starts_with('/') && !pattern.starts_with('*') {
        return Err(ConfigError::InvalidPattern(format!(
            "Path pattern '{}' must start with '/' or '*'",
            pattern
        )));
    }

    if pattern.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidPattern(format!(
            "Path pattern '{}' cannot contain whitespace",
            pattern
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
