// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::Error;
use crate::extraction::Table;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const HEADER: &str = "REPORT_REVIEW_DATE,PRE_APPROVED_DATE,PRODUCT,PRE_APPROVED_USER";

fn dataset(rows: &[&str]) -> Dataset {
    let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
    let table = Table::from_reader(csv.as_bytes(), b',').unwrap();
    Dataset::new(PathBuf::from("data/export.csv"), table)
}

fn both_categories() -> Dataset {
    dataset(&[
        ",2026-01-01,TRACTOR LEASE,amal",
        ",2026-01-02,PLEDGE LOAN,kasun",
        ",2026-01-03,CASH IN HAND,amal",
    ])
}

/// Behaviour of the test producer, chosen per category
#[derive(Clone, Copy)]
enum Behaviour {
    Builtin,
    Fail,
    Panic,
    Hang,
    ClaimMissingArtifact,
}

struct ScriptedProducer {
    a: Behaviour,
    b: Behaviour,
    calls: AtomicUsize,
}

impl ScriptedProducer {
    fn new(a: Behaviour, b: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            a,
            b,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReportProducer for ScriptedProducer {
    async fn generate(&self, request: &ReportRequest) -> Result<ProducerOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behaviour = match request.category {
            Category::A => self.a,
            Category::B => self.b,
        };
        match behaviour {
            Behaviour::Builtin => BuiltinProducer::new().generate(request).await,
            Behaviour::Fail => Err(Error::Generation {
                category: request.category,
                reason: "template missing".into(),
            }),
            Behaviour::Panic => panic!("producer bug"),
            Behaviour::Hang => std::future::pending().await,
            Behaviour::ClaimMissingArtifact => {
                Ok(ProducerOutput::Generated(request.output.clone()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

async fn generate_one(
    producer: Arc<ScriptedProducer>,
    config: &Config,
    dataset: &Dataset,
    category: Category,
    dir: &std::path::Path,
) -> ReportResult {
    generate_report(
        producer,
        config,
        dataset,
        category,
        dir.join("report.txt"),
        Local::now(),
    )
    .await
}

#[tokio::test]
async fn both_categories_generate_concurrently() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::default();

    let results = generate_all(
        Arc::new(BuiltinProducer::new()),
        &config,
        &both_categories(),
        temp_dir.path(),
        Local::now(),
    )
    .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].category, Category::A);
    assert_eq!(results[0].qualifying_rows, Some(2));
    assert_eq!(
        results[0].artifact(),
        Some(&temp_dir.path().join("Auto_finance_annual_review_report.txt"))
    );
    assert_eq!(results[1].category, Category::B);
    assert_eq!(results[1].qualifying_rows, Some(1));
    assert_eq!(
        results[1].artifact(),
        Some(&temp_dir.path().join("ThreeWheeler_annual_review_report.txt"))
    );
}

#[tokio::test]
async fn no_qualifying_rows_is_empty_without_calling_the_producer() {
    let temp_dir = TempDir::new().unwrap();
    let producer = ScriptedProducer::new(Behaviour::Builtin, Behaviour::Builtin);
    // Reviewed already, or never pre-approved
    let dataset = dataset(&[
        "2026-02-01,2026-01-01,CASH IN HAND,amal",
        ",,IJARAH SMALL LEASE,amal",
    ]);

    let result = generate_one(
        producer.clone(),
        &Config::default(),
        &dataset,
        Category::B,
        temp_dir.path(),
    )
    .await;

    assert_eq!(result.status, ReportStatus::Empty);
    assert_eq!(result.qualifying_rows, Some(0));
    assert_eq!(producer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn header_only_dataset_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let table = Table::from_reader(format!("{HEADER}\n").as_bytes(), b',').unwrap();
    let dataset = Dataset::new(PathBuf::from("data/export.csv"), table);

    let results = generate_all(
        Arc::new(BuiltinProducer::new()),
        &Config::default(),
        &dataset,
        temp_dir.path(),
        Local::now(),
    )
    .await;

    assert!(results.iter().all(|r| r.status == ReportStatus::Empty));
}

#[tokio::test]
async fn missing_columns_fail_without_calling_the_producer() {
    let temp_dir = TempDir::new().unwrap();
    let producer = ScriptedProducer::new(Behaviour::Builtin, Behaviour::Builtin);
    let table = Table::from_reader("PRODUCT,STATUS\nTRACTOR LEASE,open\n".as_bytes(), b',')
        .unwrap();
    let dataset = Dataset::new(PathBuf::from("data/export.csv"), table);

    let result = generate_one(
        producer.clone(),
        &Config::default(),
        &dataset,
        Category::A,
        temp_dir.path(),
    )
    .await;

    match result.status {
        ReportStatus::Failed { cause } => {
            assert!(cause.contains("REPORT_REVIEW_DATE"), "{cause}");
            assert!(cause.contains("PRE_APPROVED_DATE"), "{cause}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(producer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn producer_error_becomes_failed() {
    let temp_dir = TempDir::new().unwrap();
    let producer = ScriptedProducer::new(Behaviour::Fail, Behaviour::Builtin);

    let result = generate_one(
        producer,
        &Config::default(),
        &both_categories(),
        Category::A,
        temp_dir.path(),
    )
    .await;

    assert_eq!(
        result.status,
        ReportStatus::Failed {
            cause: "report generation failed for Auto Finance: template missing".into()
        }
    );
    assert_eq!(result.qualifying_rows, Some(2));
}

#[tokio::test]
async fn panic_in_one_category_leaves_the_other_intact() {
    let temp_dir = TempDir::new().unwrap();
    let producer = ScriptedProducer::new(Behaviour::Panic, Behaviour::Builtin);

    let results = generate_all(
        producer,
        &Config::default(),
        &both_categories(),
        temp_dir.path(),
        Local::now(),
    )
    .await;

    assert!(matches!(
        &results[0].status,
        ReportStatus::Failed { cause } if cause.contains("panicked")
    ));
    assert!(results[1].status.is_available());
}

#[tokio::test(start_paused = true)]
async fn hung_producer_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let producer = ScriptedProducer::new(Behaviour::Fail, Behaviour::Hang);
    let mut config = Config::default();
    config.reports.generation_timeout = Duration::from_secs(600);

    let results = generate_all(
        producer,
        &config,
        &both_categories(),
        temp_dir.path(),
        Local::now(),
    )
    .await;

    assert!(matches!(
        &results[0].status,
        ReportStatus::Failed { cause } if cause.contains("template missing")
    ));
    assert_eq!(
        results[1].status,
        ReportStatus::Failed {
            cause: "generation timed out after 600s".into()
        }
    );
}

#[tokio::test]
async fn claimed_artifact_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let producer = ScriptedProducer::new(Behaviour::ClaimMissingArtifact, Behaviour::Builtin);

    let result = generate_one(
        producer,
        &Config::default(),
        &both_categories(),
        Category::A,
        temp_dir.path(),
    )
    .await;

    assert!(matches!(
        result.status,
        ReportStatus::Failed { ref cause } if cause.contains("does not exist")
    ));
}

#[test]
fn configured_producer_kind_is_honoured() {
    let mut config = Config::default();
    assert_eq!(producer_from_config(&config).name(), "builtin");
    config.reports.producer = ProducerKind::Command;
    assert_eq!(producer_from_config(&config).name(), "command");
}
