//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, which:
//! - Drives the job state machine (pending -> running -> terminal)
//! - Manages the breadth-first frontier
//! - Fetches pages through the browser service, parses and classifies them
//! - Persists pages and errors as they are produced
//! - Closes the browser service exactly once, whatever the outcome

use crate::browser::{BrowserService, NavigateResponse};
use crate::classify::Category;
use crate::config::CrawlerConfig;
use crate::crawler::frontier::{Frontier, QueueItem};
use crate::crawler::page::{CrawlError, CrawledPage};
use crate::crawler::parser::parse_html;
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::state::{CrawlJob, CrawlStatus};
use crate::storage::{BlobStorage, SqliteStorage, Storage, StorageResult};
use crate::url::{align_to_site, normalize_url, skip_reason};
use crate::{Result, WardenError};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

/// Everything a crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub job: CrawlJob,
    pub pages: Vec<CrawledPage>,
    pub errors: Vec<CrawlError>,
}

impl CrawlOutcome {
    /// Pages flagged for audit, in crawl order
    pub fn selected_pages(&self) -> impl Iterator<Item = &CrawledPage> {
        self.pages.iter().filter(|page| page.selected_for_audit)
    }
}

/// Accumulated results of the job in progress
#[derive(Default)]
struct CrawlRun {
    pages: Vec<CrawledPage>,
    errors: Vec<CrawlError>,
    /// Categories that already have a page selected for audit
    selected: HashSet<Category>,
}

enum FetchOutcome {
    Page {
        response: NavigateResponse,
        screenshot: Option<Vec<u8>>,
    },
    Failed(String),
}

/// Single-site breadth-first crawler
pub struct Crawler {
    config: CrawlerConfig,
    user_agent: String,
    browser: Arc<BrowserService>,
    storage: Option<Arc<Mutex<SqliteStorage>>>,
    blobs: Option<Arc<dyn BlobStorage>>,
    config_hash: String,
}

impl Crawler {
    /// Creates a crawler; `user_agent` is the name matched against robots.txt groups
    pub fn new(
        config: CrawlerConfig,
        user_agent: impl Into<String>,
        browser: Arc<BrowserService>,
    ) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
            browser,
            storage: None,
            blobs: None,
            config_hash: String::new(),
        }
    }

    /// Persists jobs, pages and errors to `storage` while crawling
    pub fn with_storage(mut self, storage: Arc<Mutex<SqliteStorage>>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Stores page screenshots in `blobs` (only when screenshots are enabled)
    pub fn with_blob_storage(mut self, blobs: Arc<dyn BlobStorage>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Hash of the configuration file, stored on the job
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Crawls the site of `seed_url`
    ///
    /// Per-page failures are collected in the outcome's `errors`. A fatal
    /// failure (invalid seed, engine that cannot start, storage failure) ends
    /// the job with status `failed`; pages recorded before it are kept. The
    /// browser service is closed before this returns.
    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlOutcome> {
        let mut job = CrawlJob::new(seed_url, self.config.clone());
        let mut run = CrawlRun::default();

        let result = self.run(&mut job, &mut run).await;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }

        match result {
            Ok(()) => job.transition(CrawlStatus::Completed)?,
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", job.seed_url, e);
                job.fail(e.to_string())?;
            }
        }

        if job.id.is_some() {
            if let Err(e) = self.storage_op(|s| s.update_job(&job)) {
                tracing::error!("Failed to persist final state of job: {}", e);
            }
        }

        tracing::info!(
            "Crawl {}: {} pages crawled, {} discovered, {} errors",
            job.status,
            job.crawled,
            job.discovered,
            run.errors.len()
        );

        Ok(CrawlOutcome {
            job,
            pages: run.pages,
            errors: run.errors,
        })
    }

    /// Main crawl loop; any error returned here is fatal for the job
    async fn run(&self, job: &mut CrawlJob, run: &mut CrawlRun) -> Result<()> {
        let seed = normalize_url(&job.seed_url)?;

        let snapshot: &CrawlJob = job;
        let job_id = self.storage_op(|s| s.create_job(snapshot, &self.config_hash))?;
        job.id = job_id;

        job.transition(CrawlStatus::Running)?;
        self.persist_job(job)?;
        tracing::info!("Starting crawl of {}", seed);

        self.browser.start().await?;

        let timeout = Duration::from_millis(self.config.page_timeout_ms);
        let robots = if self.config.respect_robots_txt {
            fetch_robots(&self.browser, &seed, timeout).await
        } else {
            RobotsPolicy::allow_all()
        };

        let mut delay = Duration::from_millis(self.config.delay_ms);
        if let Some(robots_delay) = robots.crawl_delay(&self.user_agent) {
            if robots_delay > delay {
                tracing::info!("Using robots.txt crawl-delay of {:?}", robots_delay);
                delay = robots_delay;
            }
        }

        let mut frontier = Frontier::new();
        frontier.push(&job.seed_url, 0);
        job.discovered = frontier.seen_count() as u32;

        let start_time = Instant::now();

        while job.crawled < self.config.max_pages {
            let Some(item) = frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            if !self.should_fetch(&item, &robots) {
                continue;
            }

            tracing::debug!("Processing URL: {} (depth {})", item.url, item.depth);

            match self.fetch(&item, timeout).await? {
                FetchOutcome::Failed(message) => {
                    self.record_error(job, run, CrawlError::new(item.url.as_str(), item.depth, message))?;
                }
                FetchOutcome::Page {
                    response,
                    screenshot,
                } => {
                    let links = self
                        .record_page(job, run, &item, &response, screenshot)
                        .await?;

                    if item.depth < self.config.max_depth {
                        for link in links {
                            let Some(link) = Url::parse(&link)
                                .ok()
                                .and_then(|url| align_to_site(&url, &seed))
                            else {
                                continue;
                            };
                            if frontier.push(link.as_str(), item.depth + 1) {
                                job.discovered += 1;
                            }
                        }
                    }

                    if job.crawled % 10 == 0 {
                        let rate = job.crawled as f64 / start_time.elapsed().as_secs_f64().max(0.001);
                        tracing::info!(
                            "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                            job.crawled,
                            frontier.len(),
                            rate
                        );
                        self.persist_job(job)?;
                    }
                }
            }

            if !delay.is_zero() && !frontier.is_empty() {
                tokio::time::sleep(delay).await;
            }
        }

        if job.crawled >= self.config.max_pages && !frontier.is_empty() {
            tracing::info!(
                "Page limit of {} reached, {} URLs left in frontier",
                self.config.max_pages,
                frontier.len()
            );
        }

        Ok(())
    }

    /// Depth limit, skip rules and robots.txt
    fn should_fetch(&self, item: &QueueItem, robots: &RobotsPolicy) -> bool {
        if item.depth > self.config.max_depth {
            return false;
        }

        if let Some(reason) = skip_reason(
            &item.url,
            &self.config.include_paths,
            &self.config.exclude_paths,
        ) {
            tracing::debug!("Skipping {}: {}", item.url, reason);
            return false;
        }

        if self.config.respect_robots_txt && !robots.is_allowed(item.url.as_str(), &self.user_agent) {
            tracing::debug!("Blocked by robots.txt: {}", item.url);
            return false;
        }

        true
    }

    /// Loads one URL in a fresh page
    ///
    /// Navigation problems are per-page failures; failing to obtain a page
    /// at all is fatal.
    async fn fetch(&self, item: &QueueItem, timeout: Duration) -> Result<FetchOutcome> {
        let mut page = self.browser.page().await?;

        let response = match page.navigate(item.url.as_str(), timeout).await {
            Ok(response) => response,
            Err(e) => return Ok(FetchOutcome::Failed(e.to_string())),
        };

        if response.status >= 400 {
            return Ok(FetchOutcome::Failed(format!("HTTP {}", response.status)));
        }

        if !response.is_html() {
            return Ok(FetchOutcome::Failed(format!(
                "not an HTML document ({})",
                response.content_type().unwrap_or("unknown content type")
            )));
        }

        let screenshot = if self.config.take_screenshots && self.blobs.is_some() {
            match page.screenshot().await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::debug!("No screenshot for {}: {}", item.url, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(FetchOutcome::Page {
            response,
            screenshot,
        })
    }

    /// Classifies and records a fetched page, returning its outbound links
    async fn record_page(
        &self,
        job: &mut CrawlJob,
        run: &mut CrawlRun,
        item: &QueueItem,
        response: &NavigateResponse,
        screenshot: Option<Vec<u8>>,
    ) -> Result<Vec<String>> {
        let base = Url::parse(&response.final_url).unwrap_or_else(|_| item.url.clone());
        let parsed = parse_html(&response.html, &base);

        let screenshot_url = match screenshot {
            Some(bytes) => self.store_screenshot(job, item, &bytes).await,
            None => None,
        };

        let category = parsed.classification.category;
        let selected_for_audit = category != Category::Other && run.selected.insert(category);

        let page = CrawledPage {
            url: item.url.to_string(),
            normalized_url: item.normalized_url.clone(),
            depth: item.depth,
            http_status: response.status,
            title: parsed.title,
            category,
            confidence: parsed.classification.confidence,
            characteristics: parsed.classification.characteristics,
            selected_for_audit,
            screenshot_url,
        };

        if let Some(job_id) = job.id {
            self.storage_op(|s| s.insert_page(job_id, &page))?;
        }

        tracing::debug!(
            "Crawled {} as {} ({:.1})",
            page.url,
            page.category,
            page.confidence
        );

        run.pages.push(page);
        job.crawled += 1;

        Ok(parsed.links)
    }

    async fn store_screenshot(&self, job: &CrawlJob, item: &QueueItem, bytes: &[u8]) -> Option<String> {
        let blobs = self.blobs.as_ref()?;
        let digest = hex::encode(Sha256::digest(item.url.as_str().as_bytes()));
        let folder = job
            .id
            .map(|id| format!("job-{}", id))
            .unwrap_or_else(|| "unsaved".to_string());
        let path = format!("{}/{}.png", folder, &digest[..16]);

        match blobs.put(&path, bytes).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Failed to store screenshot of {}: {}", item.url, e);
                None
            }
        }
    }

    fn record_error(&self, job: &CrawlJob, run: &mut CrawlRun, error: CrawlError) -> Result<()> {
        tracing::warn!("Failed to crawl {}: {}", error.url, error.message);
        if let Some(job_id) = job.id {
            self.storage_op(|s| s.insert_error(job_id, &error))?;
        }
        run.errors.push(error);
        Ok(())
    }

    fn persist_job(&self, job: &CrawlJob) -> Result<()> {
        if job.id.is_some() {
            self.storage_op(|s| s.update_job(job))?;
        }
        Ok(())
    }

    /// Runs `op` against the storage, if one is attached
    fn storage_op<T>(
        &self,
        op: impl FnOnce(&mut SqliteStorage) -> StorageResult<T>,
    ) -> Result<Option<T>> {
        let Some(storage) = &self.storage else {
            return Ok(None);
        };
        let mut storage = storage
            .lock()
            .map_err(|_| WardenError::Storage("storage lock poisoned".to_string()))?;
        Ok(Some(op(&mut storage)?))
    }
}
