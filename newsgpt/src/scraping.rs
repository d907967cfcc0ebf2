use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::article::Article;
use crate::error::{Error, Result};
use crate::normalize::normalize;

/// Fetches news pages and pulls the title and body text out of them.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        Self::new(&config.http.user_agent, config.http.timeout_seconds)
    }

    /// Download `url` and extract its article.
    pub async fn extract(&self, url: &str) -> Result<Article> {
        info!("scraping: getting news article content from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{url} returned status {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("failed to read body of {url}: {e}")))?;

        let html = decode_html(&bytes, &content_type);

        let article = parse_article(&html)?;
        info!(
            "scraping: extracted '{}' ({} chars of content) from {}",
            article.title,
            article.content.chars().count(),
            url
        );
        Ok(article)
    }
}

/// Extract an [`Article`] from an HTML document.
///
/// Title is the trimmed text of the first `<h1>`. Content is the trimmed text of every
/// `<p>` inside the first `<article>`, concatenated without separator and normalized.
pub fn parse_article(html: &str) -> Result<Article> {
    let document = Html::parse_document(html);

    let h1 = selector("h1")?;
    let article_sel = selector("article")?;
    let paragraph = selector("p")?;

    let title = document
        .select(&h1)
        .next()
        .map(|el| element_text(&el).trim().to_string())
        .ok_or_else(|| Error::Parse("no <h1> element found".to_string()))?;

    let container = document
        .select(&article_sel)
        .next()
        .ok_or_else(|| Error::Parse("no <article> element found".to_string()))?;

    let raw_content: String = container
        .select(&paragraph)
        .map(|p| element_text(&p).trim().to_string())
        .collect();
    debug!("scraping: {} raw content chars before normalizing", raw_content.chars().count());

    Ok(Article {
        title,
        content: normalize(&raw_content),
    })
}

/// Decode a page body. The charset comes from the `Content-Type` header, then from a
/// `<meta charset>` or `http-equiv` declaration near the top of the page, else UTF-8.
pub fn decode_html(bytes: &[u8], content_type: &str) -> String {
    let encoding = charset_label(content_type)
        .or_else(|| meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("scraping: invalid {} sequences replaced while decoding", used.name());
    }
    text.into_owned()
}

/// Value of the first `charset=` in `text`, unquoted.
fn charset_label(text: &str) -> Option<String> {
    let start = text.to_ascii_lowercase().find("charset=")? + "charset=".len();
    let rest = text[start..].trim_start_matches(['"', '\'']);
    let label: String = rest
        .chars()
        .take_while(|c| !matches!(c, ';' | '"' | '\'' | '>' | '/') && !c.is_whitespace())
        .collect();
    (!label.is_empty()).then_some(label)
}

/// Charset declared in the first 1024 bytes of the document.
fn meta_charset(bytes: &[u8]) -> Option<String> {
    // Latin-1 view, only ASCII patterns are searched
    let head: String = bytes.iter().take(1024).map(|&b| b as char).collect();
    charset_label(&head)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("invalid selector '{css}': {e:?}")))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}
