use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum GatorError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Failed to fetch feed: {}", fetch_detail(*status, message))]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid RSS: {0}")]
    InvalidFeed(String),

    #[error("Invalid duration '{0}'. Use like 500ms, 10s, 5m, 1h")]
    InvalidDuration(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No current user. Please login first.")]
    NotLoggedIn,

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Feed already exists: {0}")]
    FeedExists(String),

    #[error("{user} already follows {feed}")]
    AlreadyFollowing { user: String, feed: String },

    #[error("{0}")]
    InvalidArgument(String),
}

fn fetch_detail(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{} {}", code, message),
        None => message.to_string(),
    }
}

impl From<reqwest::Error> for GatorError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            e.to_string()
        };

        GatorError::Fetch {
            status: e.status().map(|s| s.as_u16()),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatorError>;
