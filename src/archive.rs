//! Post-run archiving
//!
//! The consumed dataset goes to history storage and every generated artifact goes
//! to a dated output folder. Each file is moved independently with
//! [`move_without_overwrite`], so one failed move never prevents the others and
//! nothing is ever overwritten or deleted.

use crate::config::Config;
use crate::error::Error;
use crate::types::{ArchiveItem, ArchiveItemKind, ArchiveOutcome, Category};
use crate::utils::move_without_overwrite;
use chrono::{DateTime, Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Moves run inputs and outputs into their long-term locations
#[derive(Debug, Clone)]
pub struct Archiver {
    history: PathBuf,
    reports: PathBuf,
}

impl Archiver {
    /// Create an archiver over the given history and report roots
    pub fn new(history: impl Into<PathBuf>, reports: impl Into<PathBuf>) -> Self {
        Self {
            history: history.into(),
            reports: reports.into(),
        }
    }

    /// Archiver over the configured roots
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.paths.history.clone(), config.paths.reports.clone())
    }

    /// Dated output folder for a run on `date`
    ///
    /// # Examples
    ///
    /// ```
    /// use review_orchestrator::archive::Archiver;
    /// use chrono::NaiveDate;
    /// use std::path::Path;
    ///
    /// let archiver = Archiver::new("data_bin", "reports");
    /// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    /// assert_eq!(
    ///     archiver.dated_dir(date),
    ///     Path::new("reports/2026-03-02_Annual_review_reports")
    /// );
    /// ```
    pub fn dated_dir(&self, date: NaiveDate) -> PathBuf {
        self.reports
            .join(format!("{}_Annual_review_reports", date.format("%Y-%m-%d")))
    }

    /// Move the dataset and artifacts, recording one item per file
    ///
    /// `now` supplies both the dated folder and the `HHMMSS` conflict suffix. The
    /// pass is never retried here; a failed item keeps its source in place.
    pub async fn archive(
        &self,
        dataset: Option<&Path>,
        artifacts: &[(Category, PathBuf)],
        now: DateTime<Local>,
    ) -> ArchiveOutcome {
        let stamp = now.format("%H%M%S").to_string();
        let dated = self.dated_dir(now.date_naive());

        let mut planned: Vec<(ArchiveItemKind, PathBuf, PathBuf)> = Vec::new();
        if let Some(dataset) = dataset {
            planned.push((
                ArchiveItemKind::Dataset,
                dataset.to_path_buf(),
                destination_in(&self.history, dataset),
            ));
        }
        for (category, artifact) in artifacts {
            planned.push((
                ArchiveItemKind::Artifact(*category),
                artifact.clone(),
                destination_in(&dated, artifact),
            ));
        }

        let mut items = Vec::with_capacity(planned.len());
        for (kind, source, destination) in planned {
            items.push(move_item(kind, source, destination, stamp.clone()).await);
        }

        let outcome = ArchiveOutcome::from_items(items);
        tracing::info!(
            status = ?outcome.status,
            items = outcome.items.len(),
            archived = outcome.items.iter().filter(|i| i.archived).count(),
            "archive pass finished"
        );
        outcome
    }
}

fn destination_in(dir: &Path, source: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    }
}

async fn move_item(
    kind: ArchiveItemKind,
    source: PathBuf,
    destination: PathBuf,
    stamp: String,
) -> ArchiveItem {
    let task_source = source.clone();
    let result = tokio::task::spawn_blocking(move || {
        move_without_overwrite(&task_source, &destination, &stamp)
    })
    .await
    .unwrap_or_else(|e| Err(Error::Internal(format!("archive task failed: {e}"))));

    match result {
        Ok(final_path) => {
            tracing::info!(?kind, source = ?source, destination = ?final_path, "archived");
            ArchiveItem {
                kind,
                source,
                destination: Some(final_path),
                archived: true,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(
                ?kind,
                source = ?source,
                error = %e,
                code = e.error_code(),
                "failed to archive"
            );
            ArchiveItem {
                kind,
                source,
                destination: None,
                archived: false,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Remove a run's staging directory if it is empty
///
/// Failures are logged and otherwise ignored; anything left in staging was not
/// archived and must not be deleted.
pub async fn remove_staging_dir(dir: &Path) {
    match tokio::fs::remove_dir(dir).await {
        Ok(()) => tracing::debug!(?dir, "removed staging directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(?dir, error = %e, "staging directory left in place"),
    }
}
