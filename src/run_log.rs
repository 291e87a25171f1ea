//! Append-only run log
//!
//! One [`RunRecord`] per line, serialized as JSON. The file is only ever appended
//! to, so it doubles as an audit trail that `grep` and `jq` can read.

use crate::error::Result;
use crate::types::RunRecord;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// JSON-lines log of completed and aborted runs
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Log stored at `path`; parent directories are created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush it to disk
    pub async fn append(&self, record: &RunRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.sync_data().await?;

        tracing::debug!(path = ?self.path, run_id = %record.run_id, "run record appended");
        Ok(())
    }

    /// The last `limit` records, oldest first
    ///
    /// A missing log reads as empty. Lines that do not parse are skipped with a
    /// warning so one damaged entry does not hide the rest of the history.
    pub fn read_history(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RunRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = ?self.path,
                    line = index + 1,
                    error = %e,
                    "skipping unreadable run record"
                ),
            }
        }

        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }
}
