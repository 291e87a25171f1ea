// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::clock::ManualClock;
use crate::config::RecipientGroup;
use crate::reports::BuiltinProducer;
use crate::types::{ArchiveItemKind, ArchiveStatus, ReportStatus, Scenario};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

const HEADER: &str = "REPORT_REVIEW_DATE,PRE_APPROVED_DATE,PRODUCT,PRE_APPROVED_USER";

fn csv(rows: &[&str]) -> String {
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// What the gateway does on one call
enum Step {
    Fail(&'static str),
    Broken(&'static str),
    Write(String),
    Hang,
}

/// Gateway that plays back a fixed script, writing datasets into the incoming area
struct ScriptedGateway {
    incoming: PathBuf,
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<u32>,
}

impl ScriptedGateway {
    fn new(incoming: &Path, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            incoming: incoming.to_path_buf(),
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ExtractionGateway for ScriptedGateway {
    async fn acquire(&self) -> Result<PathBuf> {
        *self.calls.lock().unwrap() += 1;
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Write(content)) => {
                std::fs::create_dir_all(&self.incoming).unwrap();
                let path = self.incoming.join("Evaluation_Report.csv");
                std::fs::write(&path, content).unwrap();
                Ok(path)
            }
            Some(Step::Fail(cause)) => Err(Error::Extraction(cause.to_string())),
            Some(Step::Broken(cause)) => Err(Error::Internal(cause.to_string())),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(Error::Extraction("script exhausted".into())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            Err(Error::Notification("relay refused connection".into()))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct Harness {
    _temp_dir: TempDir,
    root: PathBuf,
    clock: Arc<ManualClock>,
    gateway: Arc<ScriptedGateway>,
    notifier: Arc<RecordingNotifier>,
    orchestrator: Orchestrator,
}

impl Harness {
    fn sent(&self) -> Vec<Notification> {
        self.notifier.sent.lock().unwrap().clone()
    }
}

fn config(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.incoming = root.join("data");
    config.paths.history = root.join("data_bin");
    config.paths.reports = root.join("reports");
    config.paths.staging = root.join("staging");
    config.paths.log_file = root.join("annual_review.log");
    config.paths.run_log = root.join("logs").join("runs.jsonl");
    config.logging.file = false;
    config.notifications.recipients.set(
        RecipientGroup::General,
        vec!["credit-ops@example.com".into()],
    );
    config
}

fn harness_with(
    steps: Vec<Step>,
    notifier: RecordingNotifier,
    adjust: impl FnOnce(&Path, &mut Config),
) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let mut config = config(&root);
    adjust(&root, &mut config);

    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
    ));
    let gateway = ScriptedGateway::new(&config.paths.incoming, steps);
    let notifier = Arc::new(notifier);
    let orchestrator = Orchestrator::new(
        Arc::new(config),
        gateway.clone(),
        Arc::new(BuiltinProducer::new()),
        notifier.clone(),
        clock.clone(),
    );

    Harness {
        _temp_dir: temp_dir,
        root,
        clock,
        gateway,
        notifier,
        orchestrator,
    }
}

fn harness(steps: Vec<Step>) -> Harness {
    harness_with(steps, RecordingNotifier::default(), |_, _| {})
}

fn both_categories() -> String {
    csv(&[
        ",2026-01-04,TRACTOR LEASE,amal",
        ",2026-01-05,CASH IN HAND,kasun",
        "2026-02-01,2026-01-06,PLEDGE LOAN,amal",
    ])
}

#[tokio::test]
async fn retries_until_a_dataset_arrives_then_completes() {
    let h = harness(vec![
        Step::Fail("login page timeout"),
        Step::Fail("download button missing"),
        Step::Write(both_categories()),
    ]);

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Completed);
    assert_eq!(record.cause, None);
    assert_eq!(record.attempts.len(), 3);
    assert!(!record.attempts[0].succeeded());
    assert!(record.attempts[2].succeeded());
    assert_eq!(
        h.clock.sleeps(),
        vec![Duration::from_secs(900), Duration::from_secs(900)]
    );
    assert_eq!(record.dataset.as_ref().unwrap().row_count, 3);
    assert_eq!(record.scenario, Some(Scenario::Both));
    assert_eq!(
        record.report(Category::A).unwrap().qualifying_rows,
        Some(1)
    );
    assert_eq!(
        record.notification,
        Some(NotificationOutcome::Delivered { recipients: 1 })
    );

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, "both_reports");
    assert_eq!(sent[0].attachments.len(), 2);

    let archive = record.archive.as_ref().unwrap();
    assert_eq!(archive.status, ArchiveStatus::Complete);
    assert_eq!(archive.items.len(), 3);
    for item in &archive.items {
        let destination = item.destination.as_ref().unwrap();
        assert!(destination.exists(), "{destination:?} missing");
        assert!(!item.source.exists());
    }
    assert!(h.root.join("data_bin/Evaluation_Report.csv").exists());
}

#[tokio::test]
async fn attachments_carry_the_reports_that_get_archived() {
    let h = harness(vec![Step::Write(both_categories())]);

    let record = h.orchestrator.run().await;

    let sent = h.sent();
    assert_eq!(sent[0].attachments.len(), 2);
    let archive = record.archive.as_ref().unwrap();
    for attachment in &sent[0].attachments {
        let archived = archive
            .items
            .iter()
            .filter_map(|item| item.destination.as_deref())
            .find(|d| {
                d.file_name().and_then(|n| n.to_str()) == Some(attachment.file_name.as_str())
            })
            .unwrap_or_else(|| panic!("{} was not archived", attachment.file_name));
        assert_eq!(std::fs::read(archived).unwrap(), attachment.content);
        assert!(!attachment.content.is_empty());
    }
    assert!(!h.root.join("staging").join(record.run_id.as_str()).exists());
}

#[tokio::test]
async fn internal_gateway_error_aborts_without_retrying() {
    let h = harness(vec![
        Step::Broken("dataset scan task failed: panicked"),
        Step::Write(both_categories()),
    ]);

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Aborted);
    let cause = record.cause.as_deref().unwrap();
    assert!(cause.starts_with("internal error"), "{cause}");
    assert_eq!(h.gateway.calls(), 1);
    assert_eq!(record.attempts.len(), 1);
    assert!(h.clock.sleeps().is_empty());
    assert_eq!(record.scenario, None);
    assert!(h.sent().is_empty());
    assert_eq!(
        RunLog::new(h.root.join("logs/runs.jsonl"))
            .read_history(10)
            .unwrap()[0]
            .cause
            .as_deref(),
        Some(cause)
    );
}

#[tokio::test]
async fn unusable_delimiter_aborts_on_the_first_attempt() {
    let h = harness_with(
        vec![
            Step::Write(both_categories()),
            Step::Write(both_categories()),
        ],
        RecordingNotifier::default(),
        |_, config| config.extraction.delimiter = '§',
    );

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Aborted);
    let cause = record.cause.as_deref().unwrap();
    assert!(cause.contains("delimiter"), "{cause}");
    assert_eq!(h.gateway.calls(), 1);
    assert!(h.clock.sleeps().is_empty());
    assert!(h.sent().is_empty());
}

#[tokio::test]
async fn exhausted_extraction_sends_no_data_notice() {
    let h = harness(vec![
        Step::Fail("login page timeout"),
        Step::Fail("login page timeout"),
        Step::Fail("login page timeout"),
        Step::Fail("login page timeout"),
        Step::Fail("portal returned 502"),
    ]);

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Completed);
    assert_eq!(h.gateway.calls(), 5);
    assert_eq!(record.attempts.len(), 5);
    // No wait after the final failure
    assert_eq!(h.clock.sleeps().len(), 4);
    assert_eq!(record.dataset, None);
    assert_eq!(record.scenario, Some(Scenario::None));
    for category in Category::ALL {
        assert_eq!(
            record.report(category).unwrap().status,
            ReportStatus::Failed {
                cause: SKIPPED_CAUSE.into()
            }
        );
    }

    let sent = h.sent();
    assert_eq!(sent[0].template, "no_data");
    assert!(sent[0].attachments.is_empty());
    assert!(sent[0].body.contains("extraction failed after 5 attempts"));
    assert!(sent[0].body.contains("portal returned 502"));

    assert_eq!(
        record.archive.as_ref().unwrap().status,
        ArchiveStatus::NothingToArchive
    );
}

#[tokio::test]
async fn ragged_dataset_consumes_a_retry_slot() {
    let h = harness(vec![
        Step::Write(format!("{HEADER}\n,2026-01-04,TRACTOR LEASE\n")),
        Step::Write(both_categories()),
    ]);

    let record = h.orchestrator.run().await;

    assert_eq!(record.attempts.len(), 2);
    match &record.attempts[0].outcome {
        AttemptOutcome::Failure { cause } => assert!(cause.contains("not parseable"), "{cause}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(900)]);
    assert_eq!(record.scenario, Some(Scenario::Both));
}

#[tokio::test]
async fn only_one_category_with_rows_sends_single_report() {
    let h = harness(vec![Step::Write(csv(&[
        ",2026-01-04,TRACTOR LEASE,amal",
        ",2026-01-05,VEHICLE LOAN-REGISTERED,amal",
    ]))]);

    let record = h.orchestrator.run().await;

    assert_eq!(record.scenario, Some(Scenario::OnlyA));
    assert_eq!(
        record.report(Category::B).unwrap().status,
        ReportStatus::Empty
    );
    let sent = h.sent();
    assert_eq!(sent[0].template, "only_auto_finance");
    assert_eq!(sent[0].attachments.len(), 1);
    assert!(sent[0].body.contains("no qualifying records"));
    assert_eq!(
        record.archive.as_ref().unwrap().items.len(),
        2,
        "dataset plus one artifact"
    );
}

#[tokio::test]
async fn notification_failure_does_not_stop_archiving() {
    let h = harness_with(
        vec![Step::Write(both_categories())],
        RecordingNotifier {
            fail: true,
            ..Default::default()
        },
        |_, _| {},
    );

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Completed);
    match record.notification.as_ref().unwrap() {
        NotificationOutcome::Failed { cause } => {
            assert!(cause.contains("relay refused connection"))
        }
        other => panic!("expected failed notification, got {other:?}"),
    }
    assert_eq!(
        record.archive.as_ref().unwrap().status,
        ArchiveStatus::Complete
    );
}

#[tokio::test]
async fn run_is_logged_and_staging_cleaned_up() {
    let h = harness(vec![Step::Write(both_categories())]);

    let record = h.orchestrator.run().await;

    let history = RunLog::new(h.root.join("logs/runs.jsonl"))
        .read_history(10)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], record);
    assert!(!h.root.join("staging").join(record.run_id.as_str()).exists());
}

#[tokio::test]
async fn unusable_staging_area_aborts_before_extraction() {
    let h = harness_with(
        vec![Step::Write(both_categories())],
        RecordingNotifier::default(),
        |root, _| std::fs::write(root.join("staging"), "not a directory").unwrap(),
    );

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Aborted);
    assert!(record.cause.as_deref().unwrap().contains("staging"));
    assert_eq!(h.gateway.calls(), 0);
    assert!(h.sent().is_empty());
    assert_eq!(
        RunLog::new(h.root.join("logs/runs.jsonl"))
            .read_history(10)
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn unwritable_run_log_aborts_the_run() {
    let h = harness_with(
        vec![Step::Write(both_categories())],
        RecordingNotifier::default(),
        |root, config| {
            std::fs::write(root.join("blocker"), "file").unwrap();
            config.paths.run_log = root.join("blocker").join("runs.jsonl");
        },
    );

    let record = h.orchestrator.run().await;

    assert_eq!(record.status, RunStatus::Aborted);
    assert!(
        record
            .cause
            .as_deref()
            .unwrap()
            .starts_with("run log write failed")
    );
    // Earlier phases still happened and are reported
    assert_eq!(record.scenario, Some(Scenario::Both));
    assert_eq!(h.sent().len(), 1);
}

#[tokio::test]
async fn shutdown_interrupts_a_hung_extraction() {
    let h = harness(vec![Step::Hang]);

    let record = h.orchestrator.run_until(async {}).await;

    assert_eq!(record.status, RunStatus::Aborted);
    assert_eq!(record.cause.as_deref(), Some(INTERRUPTED));
    assert!(h.sent().is_empty());
    let history = RunLog::new(h.root.join("logs/runs.jsonl"))
        .read_history(10)
        .unwrap();
    assert_eq!(history[0].cause.as_deref(), Some(INTERRUPTED));
}

#[tokio::test]
async fn events_bracket_the_run() {
    let h = harness(vec![
        Step::Fail("login page timeout"),
        Step::Write(both_categories()),
    ]);
    let mut events = h.orchestrator.subscribe();

    let record = h.orchestrator.run().await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen.first(), Some(Event::RunStarted { run_id }) if *run_id == record.run_id));
    assert!(matches!(
        seen.last(),
        Some(Event::RunFinished {
            status: RunStatus::Completed,
            scenario: Some(Scenario::Both),
            ..
        })
    ));
    assert!(seen.iter().any(|e| matches!(
        e,
        Event::AttemptFailed {
            attempt: 1,
            will_retry: true,
            ..
        }
    )));
    assert!(
        seen.iter()
            .any(|e| matches!(e, Event::DatasetAcquired { attempt: 2, .. }))
    );
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, Event::ItemArchived { .. }))
            .count(),
        3
    );
    assert!(seen.iter().any(|e| matches!(
        e,
        Event::ItemArchived {
            kind: ArchiveItemKind::Dataset,
            ..
        }
    )));
}
