//! Browser automation seam
//!
//! The crawler and the page-based audit probes never talk to an engine
//! directly. They go through [`BrowserService`], an explicitly owned service
//! object with an idempotent `start()`/`close()` lifecycle that hands out one
//! page per fetch. Pages are released when dropped.
//!
//! [`HttpBrowser`] is the default engine: it fetches raw HTML over reqwest and
//! does not execute scripts. Engines that render pages can be plugged in by
//! implementing [`BrowserAutomation`].

mod http;
mod service;

pub use http::HttpBrowser;
pub use service::BrowserService;

use crate::BrowserResult;
use async_trait::async_trait;
use std::time::Duration;

/// What a page navigation returned
#[derive(Debug, Clone, Default)]
pub struct NavigateResponse {
    /// HTTP status of the final response
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    /// Response headers, names lowercased, in arrival order
    pub headers: Vec<(String, String)>,
    /// Document markup
    pub html: String,
}

impl NavigateResponse {
    /// All values of a header (names are matched case-insensitively)
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First value of a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// True when the response is an HTML document
    ///
    /// A missing Content-Type is accepted when the body looks like markup.
    pub fn is_html(&self) -> bool {
        match self.content_type() {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
            None => self.html.trim_start().starts_with('<'),
        }
    }

    /// Names of cookies set by the response
    pub fn cookie_names(&self) -> Vec<String> {
        self.header_values("set-cookie")
            .filter_map(|value| value.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, _)| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// One page (tab) owned by a single caller
#[async_trait]
pub trait BrowserPage: Send {
    /// Loads `url`, failing with [`crate::BrowserError::Timeout`] past `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> BrowserResult<NavigateResponse>;

    /// Evaluates a script in the loaded page and returns its JSON value
    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Captures the loaded page as PNG bytes
    async fn screenshot(&mut self) -> BrowserResult<Vec<u8>>;
}

/// A browser engine
#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    /// Launches the engine
    async fn start(&self) -> BrowserResult<()>;

    /// Shuts the engine down and releases its process
    async fn close(&self) -> BrowserResult<()>;

    /// Opens a fresh page; the page is released when dropped
    async fn open_page(&self) -> BrowserResult<Box<dyn BrowserPage>>;
}
