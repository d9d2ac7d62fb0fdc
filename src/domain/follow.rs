use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A follow row joined with the user and feed names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFollow {
    pub id: i64,
    pub user_id: i64,
    pub feed_id: i64,
    pub user_name: String,
    pub feed_name: String,
    pub created_at: DateTime<Utc>,
}
