use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;

/// File name format for summary logs, one file per summary.
pub const LOG_FILE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes each generated summary to `<dir>/<timestamp>.txt`.
#[derive(Debug, Clone)]
pub struct SummaryLog {
    dir: PathBuf,
}

impl SummaryLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store `summary` under a file named after the current local time.
    /// The directory is created if needed. Two summaries in the same second overwrite each other.
    pub async fn write(&self, summary: &str) -> Result<PathBuf> {
        self.write_at(summary, Local::now()).await
    }

    pub async fn write_at(&self, summary: &str, at: DateTime<Local>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(format!("{}.txt", at.format(LOG_FILE_FORMAT)));
        tokio::fs::write(&path, summary).await?;

        info!("storage: summary written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn creates_directory_and_names_file_by_timestamp() {
        let root = tempfile::tempdir().unwrap();
        let log = SummaryLog::new(root.path().join("logs"));
        let at = Local.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap();

        let path = log.write_at("摘要内容", at).await.unwrap();

        assert_eq!(path, root.path().join("logs").join("2023-04-05_06-07-08.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "摘要内容");
    }

    #[tokio::test]
    async fn existing_directory_is_reused() {
        let root = tempfile::tempdir().unwrap();
        let log = SummaryLog::new(root.path());

        let first = log.write("one").await.unwrap();
        assert!(first.starts_with(root.path()));
        assert!(first.extension().is_some_and(|e| e == "txt"));
    }
}
