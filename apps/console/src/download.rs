//! # Download Sink
//!
//! Where a finished CSV export ends up.
//!
//! ```text
//! ReportState::export() ──► CsvExport { filename, bytes } ──► DownloadSink::save
//!                                                                  │
//!                                               <export_dir>/sales-report_<from>_<to>.csv
//! ```

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

/// Saves named bytes somewhere the operator can open them.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Returns the location written.
    async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes downloads into one directory, replacing a file of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        // A bare file name only; never write outside the directory
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid download file name: {filename:?}"),
            ));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes).await?;

        info!(path = ?path, bytes = bytes.len(), "Download saved");
        Ok(path)
    }
}
