//! Category report generation
//!
//! Each category's report is produced by a [`ReportProducer`] from the shared
//! read-only dataset. Generation is bounded: the producer runs in its own task under
//! the configured timeout, so a hang, error or panic in one category becomes a
//! `Failed` result for that category and never touches the other.
//!
//! Before a producer is called the dataset is checked for the required columns and
//! filtered; a category with no qualifying rows is `Empty` without producing
//! anything.

mod builtin;
mod command;
pub mod filter;

pub use builtin::BuiltinProducer;
pub use command::CommandProducer;

use crate::config::{ColumnContract, Config, ProducerKind};
use crate::error::Result;
use crate::extraction::Dataset;
use crate::types::{Category, ReportResult, ReportStatus};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a producer reports back on success
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerOutput {
    /// The artifact was written to the given path
    Generated(PathBuf),
    /// The producer found nothing to report
    Empty,
}

/// Everything a producer needs to build one category's report
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Category being generated
    pub category: Category,
    /// The validated dataset, shared with the other category
    pub dataset: Dataset,
    /// Product names that belong to the category
    pub products: Vec<String>,
    /// Column names the filter relies on
    pub columns: ColumnContract,
    /// Row indices that passed the filter, in dataset order
    pub qualifying: Vec<usize>,
    /// Where the artifact must be written
    pub output: PathBuf,
    /// Local time stamped into the report
    pub generated_at: DateTime<Local>,
}

/// Builds the report for one category
///
/// Implementations must write only to `request.output` and must not modify the
/// dataset file.
#[async_trait]
pub trait ReportProducer: Send + Sync {
    /// Produce the report described by `request`
    async fn generate(&self, request: &ReportRequest) -> Result<ProducerOutput>;

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}

/// Build the producer selected in configuration
pub fn producer_from_config(config: &Config) -> Arc<dyn ReportProducer> {
    match config.reports.producer {
        ProducerKind::Builtin => Arc::new(BuiltinProducer::new()),
        ProducerKind::Command => Arc::new(CommandProducer::from_config(config)),
    }
}

/// Generate one category's report with every failure folded into the result
///
/// Never returns an error: missing columns, producer errors, panics and timeouts
/// all become [`ReportStatus::Failed`].
pub async fn generate_report(
    producer: Arc<dyn ReportProducer>,
    config: &Config,
    dataset: &Dataset,
    category: Category,
    output: PathBuf,
    generated_at: DateTime<Local>,
) -> ReportResult {
    let started = Instant::now();
    let settings = config.reports.category(category);
    let columns = config.reports.columns.clone();

    let finish = |status: ReportStatus, qualifying_rows: Option<usize>| {
        let result = ReportResult {
            category,
            status,
            qualifying_rows,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        log_result(&result);
        result
    };

    let qualifying = match filter::qualifying_rows(dataset.table(), &columns, &settings.products) {
        Ok(rows) => rows,
        Err(missing) => {
            return finish(
                ReportStatus::Failed {
                    cause: missing.to_string(),
                },
                None,
            );
        }
    };

    let count = qualifying.len();
    if count == 0 {
        return finish(ReportStatus::Empty, Some(0));
    }

    let request = ReportRequest {
        category,
        dataset: dataset.clone(),
        products: settings.products.clone(),
        columns,
        qualifying,
        output,
        generated_at,
    };

    let status = run_bounded(producer, request, config.reports.generation_timeout).await;
    finish(status, Some(count))
}

/// Generate both categories concurrently
///
/// Artifacts are written into `staging_dir` under each category's configured
/// artifact name. Results come back in [`Category::ALL`] order.
pub async fn generate_all(
    producer: Arc<dyn ReportProducer>,
    config: &Config,
    dataset: &Dataset,
    staging_dir: &std::path::Path,
    generated_at: DateTime<Local>,
) -> Vec<ReportResult> {
    let output_for = |category: Category| {
        staging_dir.join(&config.reports.category(category).artifact_name)
    };

    let (a, b) = tokio::join!(
        generate_report(
            producer.clone(),
            config,
            dataset,
            Category::A,
            output_for(Category::A),
            generated_at,
        ),
        generate_report(
            producer,
            config,
            dataset,
            Category::B,
            output_for(Category::B),
            generated_at,
        ),
    );
    vec![a, b]
}

async fn run_bounded(
    producer: Arc<dyn ReportProducer>,
    request: ReportRequest,
    timeout: Duration,
) -> ReportStatus {
    let category = request.category;
    let producer_name = producer.name();
    tracing::debug!(%category, producer = producer_name, output = ?request.output, "generating report");

    let handle = tokio::spawn(async move { producer.generate(&request).await });
    let abort = handle.abort_handle();

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(ProducerOutput::Generated(artifact)))) => {
            if tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
                ReportStatus::Generated { artifact }
            } else {
                ReportStatus::Failed {
                    cause: format!(
                        "producer reported artifact {} but it does not exist",
                        artifact.display()
                    ),
                }
            }
        }
        Ok(Ok(Ok(ProducerOutput::Empty))) => ReportStatus::Empty,
        Ok(Ok(Err(e))) => ReportStatus::Failed {
            cause: e.to_string(),
        },
        Ok(Err(join_error)) => ReportStatus::Failed {
            cause: if join_error.is_panic() {
                format!("{producer_name} producer panicked")
            } else {
                format!("{producer_name} producer was cancelled")
            },
        },
        Err(_) => {
            abort.abort();
            ReportStatus::Failed {
                cause: format!("generation timed out after {}s", timeout.as_secs()),
            }
        }
    }
}

fn log_result(result: &ReportResult) {
    match &result.status {
        ReportStatus::Generated { artifact } => tracing::info!(
            category = %result.category,
            outcome = "generated",
            qualifying_rows = result.qualifying_rows,
            elapsed_ms = result.elapsed_ms,
            ?artifact,
            "report generated"
        ),
        ReportStatus::Empty => tracing::info!(
            category = %result.category,
            outcome = "empty",
            elapsed_ms = result.elapsed_ms,
            "no qualifying records"
        ),
        ReportStatus::Failed { cause } => tracing::error!(
            category = %result.category,
            outcome = "failed",
            elapsed_ms = result.elapsed_ms,
            cause = %cause,
            "report generation failed"
        ),
    }
}

#[cfg(test)]
mod tests;
