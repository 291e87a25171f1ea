//! The workflow run state machine
//!
//! A run moves through fixed phases: extraction under the retry policy, report
//! generation for both categories, scenario classification, one notification
//! dispatch, one archive pass, and finally a run-log entry. Every phase failure
//! is folded into the [`RunRecord`] and the run carries on; only a fatal error
//! (see [`Error::is_fatal`]) or an interrupt aborts it.
//!
//! Each phase ends with an `info` line carrying `phase` and `outcome` fields so a
//! run can be followed with `grep phase=`.

use crate::archive::{Archiver, remove_staging_dir};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extraction::{CommandGateway, Dataset, ExtractionGateway, load_dataset};
use crate::notify::templates::{self, ExtractionSummary, MessageContext};
use crate::notify::{Notification, Notifier, dispatch, notifier_from_config};
use crate::reports::{ReportProducer, generate_all, producer_from_config};
use crate::retry::{RetryError, acquire_with_retry};
use crate::run_log::RunLog;
use crate::scenario::classify;
use crate::types::{
    AttemptOutcome, Category, Event, NotificationOutcome, ReportResult, RunId, RunRecord,
    RunStatus,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::Instrument;

/// Abort cause recorded when a run is stopped by a shutdown signal
pub const INTERRUPTED: &str = "interrupted";

/// Cause recorded for both categories when no dataset was acquired
const SKIPPED_CAUSE: &str = "skipped: extraction failed";

/// Drives one workflow run at a time
///
/// Collaborators are injected as trait objects so each can be replaced in tests
/// or by an embedding application.
///
/// # Example
///
/// ```no_run
/// use review_orchestrator::{Config, Orchestrator};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let orchestrator = Orchestrator::from_config(Arc::new(Config::default()))?;
/// let mut events = orchestrator.subscribe();
/// tokio::spawn(async move {
///     while let Ok(event) = events.recv().await {
///         println!("{event:?}");
///     }
/// });
///
/// let record = orchestrator.run().await;
/// println!("{}", record.summary_line());
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    config: Arc<Config>,
    gateway: Arc<dyn ExtractionGateway>,
    producer: Arc<dyn ReportProducer>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    archiver: Archiver,
    run_log: RunLog,
    event_tx: broadcast::Sender<Event>,
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborators
    pub fn new(
        config: Arc<Config>,
        gateway: Arc<dyn ExtractionGateway>,
        producer: Arc<dyn ReportProducer>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(256);
        Self {
            archiver: Archiver::from_config(&config),
            run_log: RunLog::new(config.paths.run_log.clone()),
            config,
            gateway,
            producer,
            notifier,
            clock,
            event_tx,
        }
    }

    /// Create an orchestrator with the collaborators named in configuration
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let gateway = Arc::new(CommandGateway::from_config(&config));
        let producer = producer_from_config(&config);
        let notifier = notifier_from_config(&config.notifications)?;
        Ok(Self::new(
            config,
            gateway,
            producer,
            notifier,
            Arc::new(SystemClock),
        ))
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this orchestrator runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Execute one run to a terminal status
    pub async fn run(&self) -> RunRecord {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Execute one run, aborting it with cause [`INTERRUPTED`] if `shutdown`
    /// completes first
    ///
    /// The returned record holds whatever the run had recorded when it stopped.
    pub async fn run_until<F>(&self, shutdown: F) -> RunRecord
    where
        F: Future<Output = ()>,
    {
        let started_at = self.clock.now();
        let run_id = RunId::generate(started_at);
        let span = tracing::info_span!("run", run_id = %run_id);

        async {
            tracing::info!(started_at = %started_at.format("%Y-%m-%d %H:%M:%S"), "run started");
            self.emit(Event::RunStarted {
                run_id: run_id.clone(),
            });

            let mut record = RunRecord::begin(run_id, started_at);
            let result = {
                let work = self.execute(&mut record);
                tokio::select! {
                    result = work => Some(result),
                    () = shutdown => None,
                }
            };

            match result {
                Some(Ok(())) => {
                    record.status = RunStatus::Completed;
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, code = e.error_code(), "run aborted");
                    record.cause = Some(e.to_string());
                }
                None => {
                    tracing::warn!("shutdown requested, aborting run");
                    record.cause = Some(INTERRUPTED.to_string());
                }
            }
            self.finish(record).await
        }
        .instrument(span)
        .await
    }

    async fn finish(&self, mut record: RunRecord) -> RunRecord {
        record.ended_at = self.clock.now();

        if let Err(e) = self.run_log.append(&record).await {
            tracing::error!(
                error = %e,
                path = ?self.run_log.path(),
                "failed to write run log"
            );
            record.status = RunStatus::Aborted;
            record.cause = Some(format!("run log write failed: {e}"));
            if let Err(e) = self.run_log.append(&record).await {
                tracing::error!(error = %e, "aborted run could not be recorded either");
            }
        }

        let status = match record.status {
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
        };
        if record.status == RunStatus::Completed {
            tracing::info!(phase = "run", outcome = status, summary = %record.summary_line(), "phase finished");
        } else {
            tracing::error!(phase = "run", outcome = status, summary = %record.summary_line(), "phase finished");
        }

        self.emit(Event::RunFinished {
            run_id: record.run_id.clone(),
            status: record.status,
            scenario: record.scenario,
        });
        record
    }

    async fn execute(&self, record: &mut RunRecord) -> Result<()> {
        let staging = self.config.paths.staging.join(record.run_id.as_str());
        tokio::fs::create_dir_all(&staging).await.map_err(|e| {
            Error::Internal(format!(
                "cannot create staging directory {}: {e}",
                staging.display()
            ))
        })?;

        // Extraction
        let (dataset, extraction) = self.extract(record).await?;

        // Generation
        let reports = match &dataset {
            Some(dataset) => {
                generate_all(
                    self.producer.clone(),
                    &self.config,
                    dataset,
                    &staging,
                    self.clock.local_now(),
                )
                .await
            }
            None => Category::ALL
                .iter()
                .map(|&c| ReportResult::skipped(c, SKIPPED_CAUSE))
                .collect(),
        };
        let report_a = find_report(&reports, Category::A)?;
        let report_b = find_report(&reports, Category::B)?;
        for result in &reports {
            self.emit(Event::ReportFinished {
                result: result.clone(),
            });
        }
        let generation_outcome =
            if report_a.status.is_available() || report_b.status.is_available() {
                "available"
            } else {
                "unavailable"
            };
        tracing::info!(
            phase = "generation",
            outcome = generation_outcome,
            a = report_a.status.as_str(),
            b = report_b.status.as_str(),
            "phase finished"
        );

        // Scenario
        let scenario = classify(&report_a.status, &report_b.status);
        record.reports = reports.clone();
        record.scenario = Some(scenario);
        self.emit(Event::ScenarioClassified { scenario });
        tracing::info!(phase = "scenario", outcome = %scenario, "phase finished");

        // Notification
        let local_now = self.clock.local_now();
        let message = templates::render(&MessageContext {
            scenario,
            reports: &reports,
            extraction: extraction.as_ref(),
            settings: &self.config.reports,
            date: local_now.date_naive(),
            signature: &self.config.notifications.signature,
        });
        let template = message.template;
        let attachments = message.attachments.len();
        let outcome = match Notification::new(
            record.run_id.clone(),
            scenario,
            message,
            &self.config.notifications,
        )
        .await
        {
            Ok(notification) => dispatch(self.notifier.as_ref(), &notification).await,
            Err(e) => {
                tracing::error!(error = %e, code = e.error_code(), "notification not built");
                NotificationOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        };
        match &outcome {
            NotificationOutcome::Delivered { recipients } => self.emit(Event::NotificationSent {
                recipients: *recipients,
                attachments,
            }),
            NotificationOutcome::Failed { cause } => self.emit(Event::NotificationFailed {
                error: cause.clone(),
            }),
            NotificationOutcome::Disabled => {}
        }
        tracing::info!(
            phase = "notification",
            outcome = outcome.as_str(),
            template,
            attachments,
            "phase finished"
        );
        record.notification = Some(outcome);

        // Archive
        let artifacts: Vec<(Category, PathBuf)> = reports
            .iter()
            .filter_map(|r| r.artifact().map(|a| (r.category, a.clone())))
            .collect();
        let archive = self
            .archiver
            .archive(
                dataset.as_ref().map(Dataset::path),
                &artifacts,
                self.clock.local_now(),
            )
            .await;
        for item in &archive.items {
            match (&item.destination, &item.error) {
                (Some(destination), _) => self.emit(Event::ItemArchived {
                    kind: item.kind,
                    destination: destination.clone(),
                }),
                (None, error) => self.emit(Event::ArchiveItemFailed {
                    kind: item.kind,
                    error: error.clone().unwrap_or_default(),
                }),
            }
        }
        remove_staging_dir(&staging).await;
        tracing::info!(
            phase = "archive",
            outcome = ?archive.status,
            items = archive.items.len(),
            "phase finished"
        );
        record.archive = Some(archive);

        Ok(())
    }

    /// Acquire and validate a dataset under the retry policy
    ///
    /// Attempts are written into `record` as they are made, so an interrupted run
    /// still reports them. A fatal error from an attempt is returned as is and
    /// aborts the run.
    async fn extract(
        &self,
        record: &mut RunRecord,
    ) -> Result<(Option<Dataset>, Option<ExtractionSummary>)> {
        let delimiter = self.config.extraction.delimiter;
        let result = acquire_with_retry(
            &self.config.retry,
            self.clock.as_ref(),
            |attempt| async move {
                tracing::debug!(attempt, gateway = self.gateway.name(), "acquiring dataset");
                let path = self.gateway.acquire().await?;
                tokio::task::spawn_blocking(move || load_dataset(&path, delimiter))
                    .await
                    .map_err(|e| Error::Internal(format!("dataset load task failed: {e}")))?
            },
            Dataset::reference,
            |attempt, will_retry| {
                record.attempts.push(attempt.clone());
                match &attempt.outcome {
                    AttemptOutcome::Success { dataset } => self.emit(Event::DatasetAcquired {
                        dataset: dataset.clone(),
                        attempt: attempt.attempt_number,
                    }),
                    AttemptOutcome::Failure { cause } => self.emit(Event::AttemptFailed {
                        attempt: attempt.attempt_number,
                        cause: cause.clone(),
                        will_retry,
                    }),
                }
            },
        )
        .await;

        match result {
            Ok(acquired) => {
                let reference = acquired.value.reference();
                tracing::info!(
                    phase = "extraction",
                    outcome = "success",
                    attempts = record.attempts.len(),
                    path = ?reference.path,
                    rows = reference.row_count,
                    "phase finished"
                );
                record.dataset = Some(reference);
                Ok((Some(acquired.value), None))
            }
            Err(RetryError::Fatal { attempt, source }) => {
                tracing::error!(
                    phase = "extraction",
                    outcome = "aborted",
                    attempt,
                    error = %source,
                    "phase finished"
                );
                Err(source)
            }
            Err(RetryError::Exhausted(failure)) => {
                let attempts = failure.attempts.len();
                self.emit(Event::ExtractionExhausted {
                    attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
                });
                tracing::error!(
                    phase = "extraction",
                    outcome = "failed",
                    attempts,
                    cause = %failure.last_cause,
                    "phase finished"
                );
                Ok((
                    None,
                    Some(ExtractionSummary {
                        attempts,
                        last_cause: failure.last_cause,
                    }),
                ))
            }
        }
    }
}

fn find_report(reports: &[ReportResult], category: Category) -> Result<&ReportResult> {
    reports
        .iter()
        .find(|r| r.category == category)
        .ok_or_else(|| Error::Internal(format!("no report result for {category}")))
}

#[cfg(test)]
mod tests;
