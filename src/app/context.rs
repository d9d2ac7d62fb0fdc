use std::sync::Arc;

use crate::app::error::{GatorError, Result};
use crate::config::Config;
use crate::domain::User;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::parser::FeedParser;
use crate::store::{SqliteStore, Store};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parser: FeedParser,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.database_path()?;
        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);

        Ok(Self {
            config,
            store,
            fetcher,
            parser: FeedParser::new(),
        })
    }

    /// Resolve the logged-in user named in the config.
    pub fn current_user(&self) -> Result<User> {
        let name = self
            .config
            .current_user
            .as_deref()
            .ok_or(GatorError::NotLoggedIn)?;

        self.store
            .get_user_by_name(name)?
            .ok_or_else(|| GatorError::UserNotFound(name.to_string()))
    }
}
