use super::PageFetcher;
use crate::config::FetchConfig;
use crate::error::ExtractionError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

/// Fetches pages over HTTP with a bounded timeout.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn with_config(config: &FetchConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for RequestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractionError> {
        debug!("RequestFetcher: GET {}", url);
        let response = self.client.get(url).send().await.inspect_err(|e| {
            warn!("RequestFetcher: request to {} failed: {}", url, e);
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("RequestFetcher: {} answered {}", url, status);
            return Err(ExtractionError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        debug!("RequestFetcher: received {} bytes", html.len());
        Ok(html)
    }
}
