use tracing::debug;

use super::{decode, ImageSource, RawImage};
use crate::config::CompareConfig;
use crate::errors::{ArtmatchError, Result};
use crate::types::ImageLocator;

/// Fetches images with a single GET per locator.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build a client with the configured timeout and User-Agent.
    pub fn new(config: &CompareConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ArtmatchError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs: config.fetch_timeout_secs,
        })
    }

    fn transport_error(&self, locator: &ImageLocator, e: reqwest::Error) -> ArtmatchError {
        let reason = if e.is_timeout() {
            format!("timed out after {}s", self.timeout_secs)
        } else {
            e.to_string()
        };
        ArtmatchError::Fetch {
            url: locator.to_string(),
            reason,
        }
    }
}

impl ImageSource for HttpFetcher {
    async fn fetch(&self, locator: &ImageLocator) -> Result<RawImage> {
        debug!(url = %locator, "fetching image");

        let response = self
            .client
            .get(locator.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtmatchError::Fetch {
                url: locator.to_string(),
                reason: format!("server returned {status}"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(locator, e))?;
        debug!(url = %locator, bytes = bytes.len(), "image downloaded");

        decode(locator, &bytes)
    }
}
