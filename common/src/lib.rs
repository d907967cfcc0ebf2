/*!
common/src/lib.rs

Shared configuration types for NewsGPT-ZH.

This file provides:
- Config data structures (deserialized from TOML, every section optional)
- An async loader merging a default file with an override file
- Credential resolution from environment variables into explicit config values
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Browser user agent sent when fetching article pages. Some news sites reject bot agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// HTTP server section for the web shell
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Outbound HTTP settings shared by every client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Applied to every outbound request unless a section overrides it
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// DeepL translation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Explicit endpoint. When unset the endpoint is derived from the key type.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub target_lang: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            api_key_env: "DEEPL_API_KEY".to_string(),
            target_lang: "ZH".to_string(),
            timeout_seconds: None,
        }
    }
}

/// Chat completion (summarization) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub model: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
        }
    }
}

/// Mastodon publishing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MastodonConfig {
    /// Full statuses endpoint, e.g. "https://mastodon.social/api/v1/statuses"
    pub api_url: Option<String>,
    pub api_url_env: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub visibility: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_url_env: "MASTODON_API_URL".to_string(),
            api_key: None,
            api_key_env: "MASTODON_API_KEY".to_string(),
            visibility: "public".to_string(),
            timeout_seconds: None,
        }
    }
}

/// Post composition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub max_length: usize,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self { max_length: 2000 }
    }
}

/// Where generated summaries are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub summary_dir: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            summary_dir: "logs".to_string(),
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub translation: TranslationConfig,
    pub llm: LlmConfig,
    pub mastodon: MastodonConfig,
    pub post: PostConfig,
    pub logs: LogsConfig,
}

impl Config {
    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence). Missing files are
    /// skipped, so with neither present the built-in defaults are returned.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Fill every unset credential and endpoint from the environment variable named in
    /// its section. Values already present in the file win.
    pub fn resolve_credentials(&mut self) {
        self.resolve_credentials_with(|name| std::env::var(name).ok());
    }

    /// Same as [`Config::resolve_credentials`] with a custom lookup, used by tests.
    pub fn resolve_credentials_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, env_name: &str| {
            if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
                *slot = lookup(env_name).filter(|v| !v.trim().is_empty());
            }
        };

        fill(&mut self.translation.api_key, &self.translation.api_key_env);
        fill(&mut self.llm.api_key, &self.llm.api_key_env);
        fill(&mut self.mastodon.api_url, &self.mastodon.api_url_env);
        fill(&mut self.mastodon.api_key, &self.mastodon.api_key_env);
    }

    /// Timeout for a section, falling back to the shared `[http]` value.
    pub fn timeout_for(&self, section_timeout: Option<u64>) -> u64 {
        section_timeout.unwrap_or(self.http.timeout_seconds)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
