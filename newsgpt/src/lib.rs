// Library interface for newsgpt modules
// Article extraction, DeepL translation, Chinese briefs and Mastodon posting, plus the Rocket shell

pub mod article;
pub mod error;
pub mod llm;
pub mod normalize;
pub mod post;
pub mod processing;
pub mod publish;
pub mod scraping;
pub mod server;
pub mod storage;
pub mod translation;

pub use error::{Error, Result};
