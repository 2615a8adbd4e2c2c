//! # Change Log
//!
//! Append-only record of every remote update attempt.
//!
//! Entries are written as JSON lines into one file per local calendar day
//! (`Log_YYYYMMDD.jsonl`) in the application data directory. Each append
//! also removes the file dated exactly one calendar month earlier, so the
//! directory holds roughly a month of history. Entry timestamps stay in UTC.

use crate::error::{Result, SyncError};
use bridge_traits::storage::FileSystemAccess;
use bridge_traits::time::Clock;
use bytes::Bytes;
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// One attempted remote update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub timestamp: DateTime<Utc>,

    /// Library the update was sent to
    pub library: String,

    /// "Dune 2021 updated" or "Fail to update Dune 2021, attempted to"
    pub message: String,

    /// What was changed, e.g. "Set to watched, Set resume pos to 1200"
    pub detail: String,

    pub success: bool,
}

impl ChangeLogEntry {
    pub fn updated(
        timestamp: DateTime<Utc>,
        library: impl Into<String>,
        item: &str,
        details: &[String],
    ) -> Self {
        Self {
            timestamp,
            library: library.into(),
            message: format!("{} updated", item),
            detail: details.join(", "),
            success: true,
        }
    }

    pub fn failed(
        timestamp: DateTime<Utc>,
        library: impl Into<String>,
        item: &str,
        details: &[String],
    ) -> Self {
        Self {
            timestamp,
            library: library.into(),
            message: format!("Fail to update {}, attempted to", item),
            detail: details.join(", "),
            success: false,
        }
    }
}

pub struct ChangeLog {
    fs: Arc<dyn FileSystemAccess>,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl ChangeLog {
    pub fn new(fs: Arc<dyn FileSystemAccess>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fs,
            clock,
            lock: Mutex::new(()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Log file name for a given day
    pub fn file_name(date: NaiveDate) -> String {
        format!("Log_{}.jsonl", date.format("%Y%m%d"))
    }

    /// Append entries to today's file, then purge the expired file.
    ///
    /// Returns the number of entries written.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn append(&self, entries: &[ChangeLogEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut payload = String::new();
        for entry in entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| SyncError::persistence("change log", e))?;
            payload.push_str(&line);
            payload.push('\n');
        }

        let today = self.clock.today();
        let dir = self.fs.get_data_directory().await?;
        let path = dir.join(Self::file_name(today));

        let _guard = self.lock.lock().await;

        self.fs
            .append_file(&path, Bytes::from(payload))
            .await
            .map_err(|e| SyncError::persistence(path.display().to_string(), e))?;
        info!(path = %path.display(), "Wrote change log entries");

        self.purge_expired(&dir, today).await;

        Ok(entries.len())
    }

    /// Read back the entries recorded on a given day
    pub async fn read_day(&self, date: NaiveDate) -> Result<Vec<ChangeLogEntry>> {
        let dir = self.fs.get_data_directory().await?;
        let path = dir.join(Self::file_name(date));

        let _guard = self.lock.lock().await;

        if !self.fs.exists(&path).await? {
            return Ok(Vec::new());
        }

        let data = self.fs.read_file(&path).await?;
        let text = String::from_utf8_lossy(&data);
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| SyncError::persistence(path.display().to_string(), e))
            })
            .collect()
    }

    async fn purge_expired(&self, dir: &Path, today: NaiveDate) {
        let Some(expired_day) = today.checked_sub_months(Months::new(1)) else {
            return;
        };
        let expired = dir.join(Self::file_name(expired_day));

        match self.fs.exists(&expired).await {
            Ok(true) => match self.fs.delete_file(&expired).await {
                Ok(()) => debug!(path = %expired.display(), "Removed expired change log"),
                Err(e) => {
                    warn!(path = %expired.display(), error = %e, "Could not remove expired change log")
                }
            },
            Ok(false) => {}
            Err(e) => warn!(path = %expired.display(), error = %e, "Could not check expired change log"),
        }
    }
}
