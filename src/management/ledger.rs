use std::{io::ErrorKind, path::PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{info, types::PostRecord, utils};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed: {0}")]
    IoError(#[from] std::io::Error),
    #[error("ledger is corrupt: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Append-only record of posted tracks, stored as a JSON array.
///
/// Every call goes to disk, so a read or write failure always surfaces to
/// the caller instead of being answered from a stale in-memory copy.
/// `record` does not check for duplicates; callers check first. That is only
/// sound because a single process runs one check at a time.
pub struct PostLedger {
    path: PathBuf,
}

impl PostLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// All records, oldest first. A missing file is an empty ledger.
    pub async fn load(&self) -> Result<Vec<PostRecord>, LedgerError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(json) if json.trim().is_empty() => Ok(Vec::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(LedgerError::IoError(e)),
        }
    }

    pub async fn was_posted_today(&self, artist: &str, title: &str) -> Result<bool, LedgerError> {
        self.was_posted_on(artist, title, utils::today_utc()).await
    }

    /// Exact string match on artist and title; no case folding or trimming.
    pub async fn was_posted_on(
        &self,
        artist: &str,
        title: &str,
        date: NaiveDate,
    ) -> Result<bool, LedgerError> {
        let records = self.load().await?;
        Ok(records
            .iter()
            .any(|r| r.date == date && r.artist == artist && r.title == title))
    }

    pub async fn record(&self, artist: &str, title: &str) -> Result<PostRecord, LedgerError> {
        self.record_on(artist, title, utils::today_utc()).await
    }

    /// Appends a record. The file is replaced through a temp file so a crash
    /// mid-write leaves the previous ledger intact.
    pub async fn record_on(
        &self,
        artist: &str,
        title: &str,
        date: NaiveDate,
    ) -> Result<PostRecord, LedgerError> {
        let mut records = self.load().await?;
        let record = PostRecord {
            artist: artist.to_string(),
            title: title.to_string(),
            date,
        };
        records.push(record.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&records)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;

        info!("Recorded post in ledger.");
        Ok(record)
    }
}
