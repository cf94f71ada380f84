use crate::error::ExtractionError;
use async_trait::async_trait;

mod request;

pub use request::RequestFetcher;

/// Retrieves the raw HTML for a page.
///
/// Implementations fail on network errors, non-success statuses and
/// timeouts; they never retry.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ExtractionError>;
}
