use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub user_id: i64,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feed {
    pub fn never_fetched(&self) -> bool {
        self.last_fetched_at.is_none()
    }
}

/// The feed chosen for the next ingestion cycle.
///
/// Candidates are ordered by `last_fetched_at` with never-fetched feeds
/// first, ties broken by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchCandidate {
    pub id: i64,
    pub name: String,
    pub url: String,
}

impl From<&Feed> for FetchCandidate {
    fn from(feed: &Feed) -> Self {
        Self {
            id: feed.id,
            name: feed.name.clone(),
            url: feed.url.clone(),
        }
    }
}

/// A feed joined with the name of the user who registered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedWithOwner {
    pub feed_name: String,
    pub feed_url: String,
    pub user_name: String,
}
