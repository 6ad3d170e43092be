//! Robots.txt politeness for a single crawl job
//!
//! The file is fetched once per job through the browser service. A missing
//! file, a non-200 answer or any fetch error yields an allow-all policy.

use crate::browser::BrowserService;
use robotstxt::DefaultMatcher;
use std::time::Duration;
use url::Url;

/// Robots.txt rules of one site
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    /// Raw file content; empty means allow all
    content: String,
}

impl RobotsPolicy {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks a full URL against the rules for `user_agent`
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// `Crawl-delay` for `user_agent`, preferring a named group over `*`
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        let agent = user_agent.to_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut wildcard = None;
        let mut named = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if in_rules {
                        group.clear();
                        in_rules = false;
                    }
                    group.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_rules = true;
                    let Ok(seconds) = value.parse::<f64>() else {
                        continue;
                    };
                    if !seconds.is_finite() || seconds < 0.0 {
                        continue;
                    }
                    if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                        named = Some(seconds);
                    } else if group.iter().any(|ua| ua == "*") {
                        wildcard = Some(seconds);
                    }
                }
                _ => in_rules = true,
            }
        }

        named.or(wildcard).map(Duration::from_secs_f64)
    }
}

/// Fetches `/robots.txt` of `site` through a scoped browser page
pub async fn fetch_robots(browser: &BrowserService, site: &Url, timeout: Duration) -> RobotsPolicy {
    let robots_url = match site.join("/robots.txt") {
        Ok(url) => url,
        Err(_) => return RobotsPolicy::allow_all(),
    };

    let mut page = match browser.page().await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!("No page available for robots.txt: {}", e);
            return RobotsPolicy::allow_all();
        }
    };

    match page.navigate(robots_url.as_str(), timeout).await {
        Ok(response) if response.status == 200 => {
            tracing::debug!("Loaded robots.txt from {}", robots_url);
            RobotsPolicy::from_content(&response.html)
        }
        Ok(response) => {
            tracing::debug!(
                "robots.txt returned HTTP {}, allowing all",
                response.status
            );
            RobotsPolicy::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}, allowing all", robots_url, e);
            RobotsPolicy::allow_all()
        }
    }
}
