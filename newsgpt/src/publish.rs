use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::error::{Error, Result};

/// Destination for composed posts
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, status: &str) -> Result<()>;
}

/// Posts statuses to a Mastodon `/api/v1/statuses` endpoint.
pub struct MastodonPublisher {
    api_url: String,
    access_token: String,
    visibility: String,
    client: reqwest::Client,
}

impl MastodonPublisher {
    /// Fails with [`Error::Configuration`] when the endpoint or the token is missing.
    pub fn new(
        api_url: Option<&str>,
        access_token: Option<&str>,
        visibility: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        let (api_url, access_token) = match (non_blank(api_url), non_blank(access_token)) {
            (Some(url), Some(token)) => (url, token),
            _ => {
                return Err(Error::Configuration(
                    "Mastodon API URL or API Key is not set".to_string(),
                ))
            }
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build Mastodon client: {e}")))?;

        Ok(Self {
            api_url: api_url.to_string(),
            access_token: access_token.to_string(),
            visibility: visibility.to_string(),
            client,
        })
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        let m = &config.mastodon;
        Self::new(
            m.api_url.as_deref(),
            m.api_key.as_deref(),
            &m.visibility,
            config.timeout_for(m.timeout_seconds),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Debug for MastodonPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MastodonPublisher")
            .field("api_url", &self.api_url)
            .field("access_token", &"<redacted>")
            .field("visibility", &self.visibility)
            .finish()
    }
}

#[async_trait::async_trait]
impl Publisher for MastodonPublisher {
    async fn publish(&self, status: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .form(&[("status", status), ("visibility", self.visibility.as_str())])
            .send()
            .await
            .map_err(|e| Error::Publish(format!("request to {} failed: {e}", self.api_url)))?;

        let code = response.status();
        info!("publish: mastodon answered {}", code);

        // Only a plain 200 counts as success
        if code != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("error code {}: {}", code.as_u16(), body)));
        }

        Ok(())
    }
}
