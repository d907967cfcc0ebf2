use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::{ChatMessage, LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use crate::error::{Error, Result};

/// Remote LLM provider using OpenAI-compatible HTTP API
pub struct RemoteLlmProvider {
    base_url: String,
    api_key: String,
    model: String,
    default_timeout: Duration,
    default_max_tokens: Option<usize>,
    default_temperature: Option<f32>,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    /// Fails with [`Error::Configuration`] when the API key is blank.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Configuration("OpenAI API key is not set".to_string()));
        }

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: None,
            default_temperature: None,
            client: reqwest::Client::new(),
        })
    }

    pub fn with_defaults(
        mut self,
        timeout_secs: u64,
        max_tokens: Option<usize>,
        temperature: Option<f32>,
    ) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        let llm = &config.llm;
        let api_key = llm
            .api_key
            .clone()
            .ok_or_else(|| Error::Configuration("OpenAI API key is not set".to_string()))?;

        Ok(Self::new(&llm.api_url, api_key, &llm.model)?.with_defaults(
            config.timeout_for(llm.timeout_seconds),
            llm.max_tokens,
            llm.temperature,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for RemoteLlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteLlmProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let timeout = request
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages: request.messages,
            max_tokens: request.max_tokens.or(self.default_max_tokens),
            temperature: request.temperature.or(self.default_temperature),
        };

        // Make HTTP request with timeout
        let response = tokio::time::timeout(
            timeout,
            self.client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .map_err(|_| Error::Summarization(format!("LLM request timed out after {timeout:?}")))?
        .map_err(|e| Error::Summarization(format!("LLM HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Summarization(format!("LLM API error {status}: {body}")));
        }

        let resp_body: OpenAiResponse = tokio::time::timeout(timeout, response.json())
            .await
            .map_err(|_| Error::Summarization(format!("LLM response timed out after {timeout:?}")))?
            .map_err(|e| Error::Summarization(format!("Failed to parse LLM response: {e}")))?;

        let choice = resp_body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Summarization("LLM response has no choices".to_string()))?;

        let usage = resp_body
            .usage
            .map(|u| UsageMetadata {
                prompt_tokens: u.prompt_tokens.unwrap_or(0),
                completion_tokens: u.completion_tokens.unwrap_or(0),
                total_tokens: u.total_tokens.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content: choice.message.content,
            usage,
            model: resp_body.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<usize>,
    #[serde(default)]
    completion_tokens: Option<usize>,
    #[serde(default)]
    total_tokens: Option<usize>,
}
