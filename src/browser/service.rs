use crate::browser::{BrowserAutomation, BrowserPage};
use crate::{BrowserError, BrowserResult};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Closed,
}

/// Owned browser service with an explicit lifecycle
///
/// `start()` and `close()` are idempotent: starting a running service and
/// closing a closed one are no-ops, so the engine is launched at most once and
/// released exactly once. A closed service cannot be restarted.
pub struct BrowserService {
    engine: Arc<dyn BrowserAutomation>,
    lifecycle: Mutex<Lifecycle>,
}

impl BrowserService {
    pub fn new(engine: Arc<dyn BrowserAutomation>) -> Self {
        Self {
            engine,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Launches the engine if it is not running yet
    pub async fn start(&self) -> BrowserResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match *lifecycle {
            Lifecycle::Running => Ok(()),
            Lifecycle::Closed => Err(BrowserError::Closed),
            Lifecycle::Idle => {
                self.engine.start().await?;
                *lifecycle = Lifecycle::Running;
                tracing::debug!("Browser engine started");
                Ok(())
            }
        }
    }

    /// Releases the engine; later calls do nothing
    pub async fn close(&self) -> BrowserResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        let previous = *lifecycle;
        *lifecycle = Lifecycle::Closed;

        if previous == Lifecycle::Running {
            self.engine.close().await?;
            tracing::debug!("Browser engine closed");
        }
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        *self.lifecycle.lock().await == Lifecycle::Running
    }

    /// Acquires a page; it is released when the returned box is dropped
    pub async fn page(&self) -> BrowserResult<Box<dyn BrowserPage>> {
        match *self.lifecycle.lock().await {
            Lifecycle::Running => {}
            Lifecycle::Idle => return Err(BrowserError::NotStarted),
            Lifecycle::Closed => return Err(BrowserError::Closed),
        }
        self.engine.open_page().await
    }
}
