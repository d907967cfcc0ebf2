use serde::{Deserialize, Serialize};

/// Titles shorter than this many characters are rejected.
pub const MIN_TITLE_CHARS: usize = 10;
/// Bodies shorter than this many characters are rejected.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Title and body text extracted from a news page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
}

/// An [`Article`] whose fields went through the translation client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedArticle {
    pub title: String,
    pub content: String,
}

/// Result of the minimum length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Accept,
    TooShort,
}

/// Reject when the title has fewer than [`MIN_TITLE_CHARS`] characters or the content fewer
/// than [`MIN_CONTENT_CHARS`].
pub fn length_gate(title: &str, content: &str) -> GateVerdict {
    if title.chars().count() < MIN_TITLE_CHARS || content.chars().count() < MIN_CONTENT_CHARS {
        GateVerdict::TooShort
    } else {
        GateVerdict::Accept
    }
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn gate(&self) -> GateVerdict {
        length_gate(&self.title, &self.content)
    }
}

impl TranslatedArticle {
    pub fn gate(&self) -> GateVerdict {
        length_gate(&self.title, &self.content)
    }
}
