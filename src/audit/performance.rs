use crate::audit::PerformanceScores;
use crate::config::AuditConfig;
use crate::{Result, WardenError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// External performance and best-practices scoring
#[async_trait]
pub trait PerformanceAuditEngine: Send + Sync {
    async fn audit(&self, url: &str) -> Result<PerformanceScores>;
}

const CATEGORIES: &[&str] = &["performance", "accessibility", "best-practices", "seo"];

/// PageSpeed Insights v5 client
pub struct PageSpeedEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    strategy: String,
}

impl PageSpeedEngine {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.performance_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.pagespeed_endpoint.clone(),
            api_key: config.pagespeed_api_key.clone(),
            strategy: config.strategy.clone(),
        })
    }
}

#[async_trait]
impl PerformanceAuditEngine for PageSpeedEngine {
    async fn audit(&self, url: &str) -> Result<PerformanceScores> {
        let mut query: Vec<(&str, &str)> = vec![("url", url), ("strategy", self.strategy.as_str())];
        query.extend(CATEGORIES.iter().map(|c| ("category", *c)));
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WardenError::Probe {
                probe: "performance".to_string(),
                message: format!("PageSpeed returned HTTP {}", status.as_u16()),
            });
        }

        let json: Value = serde_json::from_str(&body)?;
        let scores = scores_from_report(&json);
        if scores.is_empty() {
            return Err(WardenError::Probe {
                probe: "performance".to_string(),
                message: "report has no category scores".to_string(),
            });
        }
        Ok(scores)
    }
}

/// Extracts `lighthouseResult.categories.*.score`, each in [0, 1]
fn scores_from_report(report: &Value) -> PerformanceScores {
    let categories = &report["lighthouseResult"]["categories"];
    let score = |name: &str| {
        categories[name]["score"]
            .as_f64()
            .map(|s| s.clamp(0.0, 1.0))
    };

    PerformanceScores {
        performance: score("performance"),
        accessibility: score("accessibility"),
        best_practices: score("best-practices"),
        seo: score("seo"),
        error: None,
    }
}
