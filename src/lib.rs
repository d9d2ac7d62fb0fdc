//! # gator
//!
//! A multi-user RSS feed aggregator for the terminal.
//!
//! ## Architecture
//!
//! Ingestion is a single pipeline driven by a fixed-rate scheduler:
//!
//! ```text
//! Store (claim feed) → Fetcher → Parser → Store (insert posts)
//! ```
//!
//! - [`store`]: SQLite persistence; atomic fetch-candidate claims and
//!   URL-deduplicated post inserts
//! - [`fetcher`]: HTTP retrieval of feed documents
//! - [`parser`]: RSS 2.0 channel validation and lenient item filtering
//! - [`aggregator`]: the per-cycle pipeline and the scheduler loop
//!
//! ## Quick Start
//!
//! ```bash
//! gator register lane
//! gator addfeed "Boot.dev Blog" https://blog.boot.dev/index.xml
//! gator agg 30s
//! gator browse 10
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher, parser and configuration.
pub mod app;

/// Configuration file handling (`~/.config/gator/config.toml`).
pub mod config;

/// Command-line interface using clap.
///
/// - `register`, `login`, `users`, `reset` - user management
/// - `addfeed`, `feeds`, `follow`, `following`, `unfollow` - feeds
/// - `browse [limit]` - newest posts from followed feeds
/// - `agg <interval>` - run the aggregator until interrupted
pub mod cli;

/// Core domain models.
///
/// - [`User`](domain::User), [`Feed`](domain::Feed),
///   [`FeedFollow`](domain::FeedFollow), [`Post`](domain::Post)
/// - [`FetchCandidate`](domain::FetchCandidate): the feed picked for the next cycle
pub mod domain;

/// Feed retrieval.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for fetching feed documents
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// RSS 2.0 parsing into [`ParsedChannel`](parser::ParsedChannel).
pub mod parser;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Feed ingestion cycle and fixed-rate scheduler.
pub mod aggregator;
