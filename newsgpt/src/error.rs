use thiserror::Error;

/// Failures surfaced by the pipeline. None of them are fatal to the process; the shell
/// turns each one into a message for the user.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty credential / endpoint
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("summary is empty, nothing to publish")]
    EmptySummary,

    /// Network failure or non-success status while retrieving the article page
    #[error("failed to fetch article: {0}")]
    Fetch(String),

    /// Expected HTML structure absent
    #[error("failed to parse article: {0}")]
    Parse(String),

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("summarization failed: {0}")]
    Summarization(String),

    /// Non-success response from the publish endpoint
    #[error("publish failed: {0}")]
    Publish(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short stable name used in JSON responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::InvalidUrl(_) => "invalid_url",
            Error::EmptySummary => "empty_summary",
            Error::Fetch(_) => "fetch",
            Error::Parse(_) => "parse",
            Error::Translation(_) => "translation",
            Error::Summarization(_) => "summarization",
            Error::Publish(_) => "publish",
            Error::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
