use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{GatorError, Result};
use crate::domain::Feed;
use crate::fetcher::Fetcher;
use crate::store::{SqliteStore, Store};

/// Register a feed under a shared "owner" user.
pub fn seed_feed(store: &SqliteStore, url: &str) -> Feed {
    let user = match store.get_user_by_name("owner").unwrap() {
        Some(u) => u,
        None => store.create_user("owner").unwrap(),
    };
    store.create_feed(url, url, user.id).unwrap()
}

/// An RSS document with `n` well-formed items linking to
/// `https://example.com/posts/<i>`.
pub fn rss_document(n: usize) -> Vec<u8> {
    let items: String = (0..n)
        .map(|i| {
            format!(
                "<item><title>Post {i}</title><link>https://example.com/posts/{i}</link>\
                 <description>Body {i}</description><pubDate>{d:02} Jan 2024 00:00:00 GMT</pubDate></item>",
                i = i,
                d = i % 9 + 1
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Example</title><link>https://example.com/</link><description>Example feed</description>{}</channel></rss>"#,
        items
    )
    .into_bytes()
}

/// Returns the same body for every URL and records what was requested.
pub struct StaticFetcher {
    body: Vec<u8>,
    delay: Option<Duration>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            delay: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.body.clone())
    }
}

pub struct FailingFetcher;

#[async_trait]
impl Fetcher for FailingFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        Err(GatorError::Fetch {
            status: Some(503),
            message: "Service Unavailable".into(),
        })
    }
}
