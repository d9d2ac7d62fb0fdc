pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Retrieves a feed document.
///
/// Implementations return the raw body on a 2xx response and
/// [`GatorError::Fetch`](crate::app::GatorError::Fetch) otherwise. They do not
/// retry.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
