use crate::config::CrawlerConfig;
use crate::state::CrawlStatus;
use crate::WardenError;
use chrono::{DateTime, Utc};

/// A crawl of one target site
///
/// Created pending at job start and mutated only by the crawler. Once the
/// status is terminal, [`CrawlJob::transition`] rejects every change.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Storage id, assigned when the job is persisted
    pub id: Option<i64>,
    pub seed_url: String,
    pub config: CrawlerConfig,
    pub status: CrawlStatus,
    /// Unique normalized URLs ever queued
    pub discovered: u32,
    /// Pages fetched and recorded
    pub crawled: u32,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlJob {
    pub fn new(seed_url: impl Into<String>, config: CrawlerConfig) -> Self {
        Self {
            id: None,
            seed_url: seed_url.into(),
            config,
            status: CrawlStatus::Pending,
            discovered: 0,
            crawled: 0,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Moves the job to `next`, stamping start/finish times
    pub fn transition(&mut self, next: CrawlStatus) -> Result<(), WardenError> {
        if !self.status.can_transition_to(next) {
            return Err(WardenError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        match next {
            CrawlStatus::Running => self.started_at = Some(Utc::now()),
            s if s.is_terminal() => self.finished_at = Some(Utc::now()),
            _ => {}
        }

        self.status = next;
        Ok(())
    }

    /// Marks the job failed with a message
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), WardenError> {
        self.transition(CrawlStatus::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
