//! HTTP-only browser engine
//!
//! Fetches documents with reqwest instead of driving a real browser:
//! - One shared client per engine, built on `start()` and dropped on `close()`
//! - Redirects followed (max 10 hops), final URL reported
//! - Timeouts and connection failures mapped to browser errors
//! - Script evaluation and screenshots are not supported

use crate::browser::{BrowserAutomation, BrowserPage, NavigateResponse};
use crate::config::UserAgentConfig;
use crate::{BrowserError, BrowserResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::sync::RwLock;

/// Browser engine backed by a plain HTTP client
pub struct HttpBrowser {
    user_agent: String,
    client: RwLock<Option<Client>>,
}

impl HttpBrowser {
    pub fn new(user_agent: &UserAgentConfig) -> Self {
        Self::with_user_agent(user_agent.header_value())
    }

    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            client: RwLock::new(None),
        }
    }
}

/// Builds the shared HTTP client
///
/// Format of the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`.
fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl BrowserAutomation for HttpBrowser {
    async fn start(&self) -> BrowserResult<()> {
        let mut slot = self.client.write().await;
        if slot.is_none() {
            let client = build_http_client(&self.user_agent)
                .map_err(|e| BrowserError::Launch(e.to_string()))?;
            *slot = Some(client);
        }
        Ok(())
    }

    async fn close(&self) -> BrowserResult<()> {
        self.client.write().await.take();
        Ok(())
    }

    async fn open_page(&self) -> BrowserResult<Box<dyn BrowserPage>> {
        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotStarted)?;
        Ok(Box::new(HttpPage { client }))
    }
}

/// A "tab" of the HTTP engine: a client handle
struct HttpPage {
    client: Client,
}

#[async_trait]
impl BrowserPage for HttpPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> BrowserResult<NavigateResponse> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(url, timeout, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        let html = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, timeout, e))?;

        Ok(NavigateResponse {
            status,
            final_url,
            headers,
            html,
        })
    }

    async fn evaluate(&mut self, _script: &str) -> BrowserResult<serde_json::Value> {
        Err(BrowserError::Unsupported(
            "script evaluation requires a rendering engine".to_string(),
        ))
    }

    async fn screenshot(&mut self) -> BrowserResult<Vec<u8>> {
        Err(BrowserError::Unsupported(
            "screenshots require a rendering engine".to_string(),
        ))
    }
}

fn classify_request_error(url: &str, timeout: Duration, error: reqwest::Error) -> BrowserError {
    if error.is_timeout() {
        BrowserError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else if error.is_connect() {
        BrowserError::Navigation {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else if error.is_redirect() {
        BrowserError::Navigation {
            url: url.to_string(),
            message: "Too many redirects".to_string(),
        }
    } else {
        BrowserError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
