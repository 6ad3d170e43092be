//! Breadth-first crawl frontier
//!
//! A FIFO queue paired with the set of every normalized key ever queued.
//! A URL is accepted once per job, so each page is dequeued at most once and
//! a crawl over a cyclic link graph terminates.
//!
//! Only the key is normalized. The queued URL keeps the path and query case
//! of the link it came from, since servers are free to treat them as
//! case-sensitive.

use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Frontier entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Absolute URL to fetch, fragment removed
    pub url: Url,
    /// Dedup key
    pub normalized_url: String,
    pub depth: u32,
}

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<QueueItem>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` at `depth` unless its normalized key was already seen
    ///
    /// Returns true when the URL was accepted. Unparseable and non-HTTP(S)
    /// URLs are rejected.
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        let Ok(key) = normalize_url(url) else {
            return false;
        };
        let Ok(mut target) = Url::parse(url.trim()) else {
            return false;
        };
        target.set_fragment(None);

        let key = String::from(key);
        if !self.seen.insert(key.clone()) {
            return false;
        }

        self.queue.push_back(QueueItem {
            url: target,
            normalized_url: key,
            depth,
        });
        true
    }

    pub fn pop(&mut self) -> Option<QueueItem> {
        self.queue.pop_front()
    }

    /// Returns true if the normalized key of `url` was ever queued
    pub fn has_seen(&self, url: &str) -> bool {
        normalize_url(url)
            .map(|u| self.seen.contains(u.as_str()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of unique URLs ever accepted
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
