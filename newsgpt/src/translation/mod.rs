use tracing::info;

use crate::article::{Article, TranslatedArticle};
use crate::error::Result;

pub mod deepl;

/// Core trait for translation backends
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang` (DeepL style code, e.g. "ZH")
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

/// Translate the title, then the content, of an article.
pub async fn translate_article<T: Translator + ?Sized>(
    translator: &T,
    article: &Article,
    target_lang: &str,
) -> Result<TranslatedArticle> {
    let title = translator.translate(&article.title, target_lang).await?;
    info!("translated title to {}: {}", target_lang, title);

    let content = translator.translate(&article.content, target_lang).await?;
    info!(
        "translated content to {} ({} chars)",
        target_lang,
        content.chars().count()
    );

    Ok(TranslatedArticle { title, content })
}
