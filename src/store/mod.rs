pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{
    Feed, FeedFollow, FeedWithOwner, FetchCandidate, InsertOutcome, NewPost, Post, PostWithFeed,
    User,
};

pub use sqlite::SqliteStore;

pub trait Store {
    // User operations
    fn create_user(&self, name: &str) -> Result<User>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    fn get_users(&self) -> Result<Vec<User>>;
    fn delete_all_users(&self) -> Result<usize>;

    // Feed operations
    fn create_feed(&self, name: &str, url: &str, user_id: i64) -> Result<Feed>;
    /// Register a feed and make its owner follow it. Neither row is kept if
    /// either insert fails.
    fn create_feed_and_follow(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
    ) -> Result<(Feed, FeedFollow)>;
    fn get_feed(&self, id: i64) -> Result<Option<Feed>>;
    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>>;
    fn get_feeds_with_owner(&self) -> Result<Vec<FeedWithOwner>>;

    // Fetch scheduling
    fn next_fetch_candidate(&self) -> Result<Option<FetchCandidate>>;
    fn mark_feed_fetched(&self, feed_id: i64, at: DateTime<Utc>) -> Result<()>;
    /// Select the next candidate and mark it fetched at `at` in one atomic step.
    fn claim_next_feed(&self, at: DateTime<Utc>) -> Result<Option<FetchCandidate>>;

    // Follow operations
    fn create_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<FeedFollow>;
    fn get_feed_follows_for_user(&self, user_id: i64) -> Result<Vec<FeedFollow>>;
    fn delete_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<bool>;

    // Post operations
    /// Insert unless a post with the same URL exists. Duplicates are not an error.
    fn insert_post_if_absent(&self, post: &NewPost) -> Result<InsertOutcome>;
    fn get_post_by_url(&self, url: &str) -> Result<Option<Post>>;
    fn get_posts_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<PostWithFeed>>;
}
