pub mod feed;
pub mod follow;
pub mod post;
pub mod user;

pub use feed::{Feed, FeedWithOwner, FetchCandidate};
pub use follow::FeedFollow;
pub use post::{parse_published_at, InsertOutcome, NewPost, Post, PostWithFeed};
pub use user::User;
