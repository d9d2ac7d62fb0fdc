//! Feed ingestion: one feed per cycle, driven by a fixed-rate scheduler.
//!
//! A cycle claims the least-recently-fetched feed (marking it fetched before
//! any network I/O), fetches and parses it, and stores items whose URL has
//! not been seen before.

pub mod interval;
pub mod report;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use chrono::Utc;

use crate::app::Result;
use crate::domain::{FetchCandidate, NewPost};
use crate::fetcher::Fetcher;
use crate::parser::{FeedParser, ParsedItem};
use crate::store::Store;

pub use interval::{format_interval, parse_interval};
pub use report::Reporter;
pub use scheduler::{shutdown_signal, LoopState, Scheduler};

/// Outcome of a single successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// No feeds are registered.
    NothingToFetch,
    Ingested { feed: FetchCandidate, saved: usize },
}

pub struct Aggregator<S> {
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    parser: FeedParser,
    reporter: Reporter,
}

impl<S> Clone for Aggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            fetcher: self.fetcher.clone(),
            parser: self.parser.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

impl<S: Store> Aggregator<S> {
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        parser: FeedParser,
        reporter: Reporter,
    ) -> Self {
        Self {
            store,
            fetcher,
            parser,
            reporter,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Run one select → fetch → parse → persist cycle.
    ///
    /// The feed is marked fetched as part of selection, so a failed fetch or
    /// parse still moves it to the back of the rotation.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let feed = match self.store.claim_next_feed(Utc::now())? {
            Some(feed) => feed,
            None => {
                self.reporter.info("No feeds to fetch.");
                return Ok(CycleReport::NothingToFetch);
            }
        };

        self.reporter
            .info(&format!("Fetching: {} ({})", feed.name, feed.url));

        let body = self.fetcher.fetch(&feed.url).await.map_err(|e| {
            tracing::warn!("Fetch failed for {}: {}", feed.url, e);
            e
        })?;

        let channel = self.parser.parse(&body).map_err(|e| {
            tracing::warn!("Parse failed for {}: {}", feed.url, e);
            e
        })?;

        let saved = self.ingest(feed.id, &channel.items)?;
        self.reporter
            .info(&format!("Saved {} new posts from {}", saved, feed.name));

        Ok(CycleReport::Ingested { feed, saved })
    }

    /// Store each item as a post, returning how many were new.
    fn ingest(&self, feed_id: i64, items: &[ParsedItem]) -> Result<usize> {
        let mut saved = 0;

        for item in items {
            let outcome = self
                .store
                .insert_post_if_absent(&NewPost::from_item(feed_id, item))?;
            if outcome.inserted {
                saved += 1;
            } else {
                tracing::trace!("Skipping already stored post {}", item.link);
            }
        }

        Ok(saved)
    }
}
