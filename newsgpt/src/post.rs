use std::fmt;

/// Default upper bound for body + url, in characters.
pub const DEFAULT_MAX_POST_LENGTH: usize = 2000;

/// Appended to a body that had to be shortened.
pub const TRUNCATION_MARKER: &str = "...";

/// Text to publish: a body followed by the source URL on its own line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub body: String,
    pub url: String,
}

impl Post {
    /// Keep `body.len() + url.len()` (in characters) within `max_length`, never touching
    /// the URL. An overlong body is cut to `max_length - url.len() - 3` characters and
    /// ends with [`TRUNCATION_MARKER`].
    ///
    /// When the URL alone leaves no room (`url.len() + 3 > max_length`) the body is
    /// reduced to the marker only; the URL is still kept whole.
    pub fn compose(body: &str, url: &str, max_length: usize) -> Self {
        let body_chars = body.chars().count();
        let url_chars = url.chars().count();

        let body = if body_chars + url_chars <= max_length {
            body.to_string()
        } else {
            let keep = max_length
                .saturating_sub(url_chars)
                .saturating_sub(TRUNCATION_MARKER.len());
            let mut cut: String = body.chars().take(keep).collect();
            cut.push_str(TRUNCATION_MARKER);
            cut
        };

        Self {
            body,
            url: url.to_string(),
        }
    }

    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.body, self.url)
    }
}

/// Shorthand for `Post::compose(body, url, max_length).text()`.
pub fn compose(body: &str, url: &str, max_length: usize) -> String {
    Post::compose(body, url, max_length).text()
}
