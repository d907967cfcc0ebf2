//! The two user actions, each run to completion or first failure:
//! summarize (extract, translate, gate, summarize) and publish (compose, post).

use std::sync::Arc;
use tracing::{info, warn};

use crate::article::{Article, GateVerdict, TranslatedArticle};
use crate::error::{Error, Result};
use crate::llm::remote::RemoteLlmProvider;
use crate::llm::summarizer::{Summarizer, Summary};
use crate::post::Post;
use crate::publish::{MastodonPublisher, Publisher};
use crate::scraping::ArticleExtractor;
use crate::storage::SummaryLog;
use crate::translation::deepl::DeepLTranslator;
use crate::translation::{translate_article, Translator};

/// Accept only absolute http(s) URLs.
pub fn validate_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() || !trimmed.starts_with("http") {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(Error::InvalidUrl(url.to_string())),
    }
}

/// Which article failed the length gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStage {
    Source,
    Translated,
}

#[derive(Debug, Clone)]
pub enum SummarizeOutcome {
    Summarized {
        article: Article,
        translated: TranslatedArticle,
        summary: Summary,
    },
    TooShort(GateStage),
}

/// Extract -> translate title and content -> gate -> summarize.
pub struct SummarizePipeline {
    extractor: ArticleExtractor,
    translator: Arc<dyn Translator>,
    summarizer: Summarizer,
    target_lang: String,
}

impl SummarizePipeline {
    pub fn new(
        extractor: ArticleExtractor,
        translator: Arc<dyn Translator>,
        summarizer: Summarizer,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            translator,
            summarizer,
            target_lang: target_lang.into(),
        }
    }

    /// Build every collaborator from configuration. Missing credentials surface here as
    /// [`Error::Configuration`].
    pub fn from_config(config: &common::Config) -> Result<Self> {
        let extractor = ArticleExtractor::from_config(config)?;
        let translator = Arc::new(DeepLTranslator::from_config(config)?);
        let provider = Arc::new(RemoteLlmProvider::from_config(config)?);
        let summarizer = Summarizer::new(provider, SummaryLog::new(&config.logs.summary_dir));

        Ok(Self::new(
            extractor,
            translator,
            summarizer,
            &config.translation.target_lang,
        ))
    }

    pub async fn run(&self, url: &str) -> Result<SummarizeOutcome> {
        validate_url(url)?;
        let url = url.trim();

        let article = self.extractor.extract(url).await?;
        let translated = translate_article(self.translator.as_ref(), &article, &self.target_lang).await?;

        if translated.gate() == GateVerdict::TooShort {
            warn!("processing: translated article is too short, not summarizing {}", url);
            return Ok(SummarizeOutcome::TooShort(GateStage::Translated));
        }

        match self.summarizer.summarize(&article).await? {
            Some(summary) => {
                info!("processing: summary ready for {}", url);
                Ok(SummarizeOutcome::Summarized {
                    article,
                    translated,
                    summary,
                })
            }
            None => Ok(SummarizeOutcome::TooShort(GateStage::Source)),
        }
    }
}

/// Compose a bounded post and send it to the publisher.
pub struct PublishPipeline {
    publisher: Arc<dyn Publisher>,
    max_length: usize,
}

impl PublishPipeline {
    pub fn new(publisher: Arc<dyn Publisher>, max_length: usize) -> Self {
        Self {
            publisher,
            max_length,
        }
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        let publisher = Arc::new(MastodonPublisher::from_config(config)?);
        Ok(Self::new(publisher, config.post.max_length))
    }

    /// Returns the post that was published.
    pub async fn run(&self, summary: &str, url: &str) -> Result<Post> {
        validate_url(url)?;
        if summary.trim().is_empty() {
            return Err(Error::EmptySummary);
        }

        let post = Post::compose(summary, url.trim(), self.max_length);
        self.publisher.publish(&post.text()).await?;
        info!("processing: published post for {}", post.url);
        Ok(post)
    }
}

/// Summarize action as triggered from the shell. The URL is checked before any client is
/// built, so a bad URL is reported even when credentials are missing.
pub async fn summarize_article(config: &common::Config, url: &str) -> Result<SummarizeOutcome> {
    validate_url(url)?;
    SummarizePipeline::from_config(config)?.run(url).await
}

/// Publish action as triggered from the shell.
pub async fn publish_summary(config: &common::Config, summary: &str, url: &str) -> Result<Post> {
    validate_url(url)?;
    PublishPipeline::from_config(config)?.run(summary, url).await
}
