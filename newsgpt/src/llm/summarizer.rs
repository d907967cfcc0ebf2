// Summarizer module
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ChatMessage, LlmProvider, LlmRequest, UsageMetadata};
use crate::article::{Article, GateVerdict};
use crate::error::Result;
use crate::storage::SummaryLog;

/// Content sent to the model is cut to this many characters.
pub const PROMPT_CONTENT_CHARS: usize = 1800;

pub const SYSTEM_PROMPT: &str = "你是一名记者，你要为一篇新闻报道写一份新闻简报。";

/// A generated news brief
#[derive(Debug, Clone)]
pub struct Summary {
    pub text: String,
    /// Where the brief was logged on disk
    pub log_path: PathBuf,
    pub usage: UsageMetadata,
}

/// Turns an article into a short Chinese news brief and logs every brief it produces.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    log: SummaryLog,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, log: SummaryLog) -> Self {
        Self { provider, log }
    }

    /// Summarize `article`. Returns `Ok(None)` without calling the model when the article
    /// fails the length gate.
    pub async fn summarize(&self, article: &Article) -> Result<Option<Summary>> {
        if article.gate() == GateVerdict::TooShort {
            warn!("summarizer: article '{}' is too short, skipping", article.title);
            return Ok(None);
        }

        info!("summarizer: summarizing news article titled {}", article.title);

        let request = LlmRequest {
            messages: build_messages(article),
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
        };

        let response = self.provider.generate(request).await?;
        debug!("summarizer: raw completion from {}: {:?}", response.model, response.content);
        info!(
            "summarizer: completion received, {} tokens",
            response.usage.total_tokens
        );

        let log_path = self.log.write(&response.content).await?;

        Ok(Some(Summary {
            text: response.content,
            log_path,
            usage: response.usage,
        }))
    }
}

/// System and user messages for the news brief request.
pub fn build_messages(article: &Article) -> Vec<ChatMessage> {
    let content: String = article.content.chars().take(PROMPT_CONTENT_CHARS).collect();

    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "用中文写一篇新闻简报，将以下新闻文章总结为1-2个正文段落。\n\n===\n原文标题: {}\n原文正文: {}",
            article.title, content
        )),
    ]
}
