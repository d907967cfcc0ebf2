use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::Translator;
use crate::error::{Error, Result};

pub const DEEPL_FREE_URL: &str = "https://api-free.deepl.com/v2/translate";
pub const DEEPL_PRO_URL: &str = "https://api.deepl.com/v2/translate";

/// Translator backed by the DeepL v2 REST API
pub struct DeepLTranslator {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl DeepLTranslator {
    /// Build a translator. Fails when `api_key` is missing or blank.
    /// When `api_url` is `None` the endpoint follows the key type: keys ending in `:fx`
    /// belong to the free plan.
    pub fn new(api_key: Option<&str>, api_url: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("DeepL API key is not set".to_string()))?;

        let api_url = api_url
            .map(str::to_string)
            .unwrap_or_else(|| default_endpoint(api_key).to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build DeepL client: {e}")))?;

        Ok(Self {
            api_url,
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        Self::new(
            config.translation.api_key.as_deref(),
            config.translation.api_url.as_deref(),
            config.timeout_for(config.translation.timeout_seconds),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

fn default_endpoint(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        DEEPL_FREE_URL
    } else {
        DEEPL_PRO_URL
    }
}

impl fmt::Debug for DeepLTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepLTranslator")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait::async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&[("text", text), ("target_lang", target_lang)])
            .send()
            .await
            .map_err(|e| Error::Translation(format!("DeepL request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!("DeepL API error {status}: {body}")));
        }

        let body: DeepLResponse = response
            .json()
            .await
            .map_err(|e| Error::Translation(format!("failed to parse DeepL response: {e}")))?;

        let translation = body
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| Error::Translation("DeepL response has no translations".to_string()))?;

        debug!(
            "deepl: {} -> {} ({} chars)",
            translation.detected_source_language.as_deref().unwrap_or("?"),
            target_lang,
            translation.text.chars().count()
        );
        Ok(translation.text)
    }
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    #[serde(default)]
    detected_source_language: Option<String>,
    text: String,
}
