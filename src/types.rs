//! Core types for review-orchestrator

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report category
///
/// Each category has its own fixed product-name filter set and produces at most one
/// artifact per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Auto Finance facilities
    A,
    /// Three Wheeler facilities
    B,
}

impl Category {
    /// Both categories in reporting order
    pub const ALL: [Category; 2] = [Category::A, Category::B];

    /// Human-readable label used in notifications and logs
    pub fn label(self) -> &'static str {
        match self {
            Category::A => "Auto Finance",
            Category::B => "Three Wheeler",
        }
    }

    /// The other category
    pub fn other(self) -> Category {
        match self {
            Category::A => Category::B,
            Category::B => Category::A,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "auto-finance" | "auto_finance" => Ok(Category::A),
            "b" | "three-wheeler" | "three_wheeler" => Ok(Category::B),
            other => Err(format!(
                "unknown category '{other}' (expected a/auto-finance or b/three-wheeler)"
            )),
        }
    }
}

/// Unique identifier for a workflow run
///
/// Formatted as `YYYYmmdd-HHMMSS-xxxx` so identifiers sort by start time and stay
/// distinct when two runs start within the same second.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a run identifier for a run starting at `started_at`
    pub fn generate(started_at: DateTime<Utc>) -> Self {
        let suffix: u16 = rand::thread_rng().r#gen();
        Self(format!("{}-{:04x}", started_at.format("%Y%m%d-%H%M%S"), suffix))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an acquired dataset, as recorded in attempts and run records
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Path of the dataset file in the incoming area
    pub path: PathBuf,
    /// Number of data rows (excluding the header)
    pub row_count: usize,
}

/// Outcome of a single extraction attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The gateway produced a structurally valid dataset
    Success {
        /// The acquired dataset
        dataset: DatasetRef,
    },
    /// The gateway failed or produced an invalid dataset
    Failure {
        /// Why the attempt failed
        cause: String,
    },
}

/// One extraction try, recorded whether or not the run succeeds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAttempt {
    /// 1-based attempt number
    pub attempt_number: u32,
    /// When the attempt started
    pub started_at: DateTime<Utc>,
    /// When the attempt outcome was recorded
    pub finished_at: DateTime<Utc>,
    /// What happened
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl RunAttempt {
    /// Whether this attempt acquired a dataset
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }
}

/// Status of one category's report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    /// An artifact was produced
    Generated {
        /// Path of the produced artifact (in staging until archived)
        artifact: PathBuf,
    },
    /// No record passed the category filter
    Empty,
    /// The producer errored, timed out, or was skipped
    Failed {
        /// Why generation failed
        cause: String,
    },
}

impl ReportStatus {
    /// Whether a deliverable artifact exists for this category
    pub fn is_available(&self) -> bool {
        matches!(self, ReportStatus::Generated { .. })
    }

    /// Short lowercase name used in summaries and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Generated { .. } => "generated",
            ReportStatus::Empty => "empty",
            ReportStatus::Failed { .. } => "failed",
        }
    }
}

/// Result of generating one category's report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResult {
    /// The category
    pub category: Category,
    /// Outcome of generation
    #[serde(flatten)]
    pub status: ReportStatus,
    /// Number of rows that passed the category filter, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifying_rows: Option<usize>,
    /// Wall-clock time spent generating, in milliseconds
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl ReportResult {
    /// Result for a category whose generation never ran
    pub fn skipped(category: Category, cause: impl Into<String>) -> Self {
        Self {
            category,
            status: ReportStatus::Failed {
                cause: cause.into(),
            },
            qualifying_rows: None,
            elapsed_ms: 0,
        }
    }

    /// The artifact path if one was generated
    pub fn artifact(&self) -> Option<&PathBuf> {
        match &self.status {
            ReportStatus::Generated { artifact } => Some(artifact),
            _ => None,
        }
    }
}

/// Which categories produced a deliverable report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scenario {
    /// Both reports available
    Both,
    /// Only the category A report is available
    OnlyA,
    /// Only the category B report is available
    OnlyB,
    /// No report available
    None,
}

impl Scenario {
    /// Name as it appears in logs and run records
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Both => "BOTH",
            Scenario::OnlyA => "ONLY_A",
            Scenario::OnlyB => "ONLY_B",
            Scenario::None => "NONE",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the single notification dispatch of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// The transport accepted the message
    Delivered {
        /// Number of distinct recipient addresses
        recipients: usize,
    },
    /// The transport failed; the run continued
    Failed {
        /// Why delivery failed
        cause: String,
    },
    /// Notifications are switched off in configuration
    Disabled,
}

impl NotificationOutcome {
    /// Short lowercase name used in summaries and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationOutcome::Delivered { .. } => "delivered",
            NotificationOutcome::Failed { .. } => "failed",
            NotificationOutcome::Disabled => "disabled",
        }
    }
}

/// What kind of file an archive item is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveItemKind {
    /// The consumed dataset, moved to history storage
    Dataset,
    /// A generated report, moved to the dated output folder
    Artifact(Category),
}

/// Per-item archive result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveItem {
    /// What was archived
    pub kind: ArchiveItemKind,
    /// Where the file was before archiving
    pub source: PathBuf,
    /// Where the file ended up, when the move succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    /// Whether the move succeeded
    pub archived: bool,
    /// Why the move failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate archive status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStatus {
    /// Every item was moved
    Complete,
    /// Some items moved, some failed
    Partial,
    /// No item could be moved
    Failed,
    /// There was nothing to move
    NothingToArchive,
}

/// Outcome of the single archive pass of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    /// Aggregate status derived from the items
    pub status: ArchiveStatus,
    /// One entry per file the archiver tried to move
    pub items: Vec<ArchiveItem>,
}

impl ArchiveOutcome {
    /// Build an outcome, deriving the aggregate status from per-item results
    pub fn from_items(items: Vec<ArchiveItem>) -> Self {
        let archived = items.iter().filter(|i| i.archived).count();
        let status = match (archived, items.len()) {
            (_, 0) => ArchiveStatus::NothingToArchive,
            (a, n) if a == n => ArchiveStatus::Complete,
            (0, _) => ArchiveStatus::Failed,
            _ => ArchiveStatus::Partial,
        };
        Self { status, items }
    }

    /// Whether archiving left nothing behind
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            ArchiveStatus::Complete | ArchiveStatus::NothingToArchive
        )
    }

    /// Find the item for a given kind
    pub fn item(&self, kind: ArchiveItemKind) -> Option<&ArchiveItem> {
        self.items.iter().find(|i| i.kind == kind)
    }
}

/// Terminal status of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run reached the end of the workflow (any scenario)
    Completed,
    /// An internal failure or interrupt stopped the run
    Aborted,
}

/// Durable audit entry for one end-to-end execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run identifier
    pub run_id: RunId,
    /// Terminal status
    pub status: RunStatus,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run reached its terminal status
    pub ended_at: DateTime<Utc>,
    /// Every extraction attempt in order
    pub attempts: Vec<RunAttempt>,
    /// The dataset the run worked on, if one was acquired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetRef>,
    /// Category results (A then B)
    pub reports: Vec<ReportResult>,
    /// Classified scenario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    /// Notification dispatch outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationOutcome>,
    /// Archive outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveOutcome>,
    /// Abort cause, present only for aborted runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl RunRecord {
    /// Empty record for a run that has just started
    ///
    /// The status stays `Aborted` until the run is marked completed, so a record
    /// cut short by an interrupt never claims to have finished.
    pub fn begin(run_id: RunId, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            status: RunStatus::Aborted,
            started_at,
            ended_at: started_at,
            attempts: Vec::new(),
            dataset: None,
            reports: Vec::new(),
            scenario: None,
            notification: None,
            archive: None,
            cause: None,
        }
    }

    /// The result for a category, if generation was reached
    pub fn report(&self, category: Category) -> Option<&ReportResult> {
        self.reports.iter().find(|r| r.category == category)
    }

    /// One-line `key=value` summary for logs and `history` output
    pub fn summary_line(&self) -> String {
        let report = |c: Category| self.report(c).map_or("-", |r| r.status.as_str());
        let status = match self.status {
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
        };
        let mut line = format!(
            "run={} status={} started={} attempts={} scenario={} a={} b={} notification={} archive={}",
            self.run_id,
            status,
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.attempts.len(),
            self.scenario.map_or("-", Scenario::as_str),
            report(Category::A),
            report(Category::B),
            self.notification.as_ref().map_or("-", NotificationOutcome::as_str),
            self.archive.as_ref().map_or("-", |a| match a.status {
                ArchiveStatus::Complete => "complete",
                ArchiveStatus::Partial => "partial",
                ArchiveStatus::Failed => "failed",
                ArchiveStatus::NothingToArchive => "nothing",
            }),
        );
        if let Some(cause) = &self.cause {
            line.push_str(&format!(" cause={cause:?}"));
        }
        line
    }
}

/// Event emitted during a workflow run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run started
    RunStarted {
        /// Run identifier
        run_id: RunId,
    },

    /// An extraction attempt failed
    AttemptFailed {
        /// 1-based attempt number
        attempt: u32,
        /// Failure cause
        cause: String,
        /// Whether another attempt will follow after the backoff
        will_retry: bool,
    },

    /// A dataset was acquired
    DatasetAcquired {
        /// The acquired dataset
        dataset: DatasetRef,
        /// Attempt that succeeded
        attempt: u32,
    },

    /// Every extraction attempt failed
    ExtractionExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    /// A category report finished (any status)
    ReportFinished {
        /// The result
        result: ReportResult,
    },

    /// The run's scenario was classified
    ScenarioClassified {
        /// The scenario
        scenario: Scenario,
    },

    /// The notification was delivered
    NotificationSent {
        /// Number of distinct recipients
        recipients: usize,
        /// Number of attachments
        attachments: usize,
    },

    /// The notification could not be delivered
    NotificationFailed {
        /// Error message
        error: String,
    },

    /// A file was archived
    ItemArchived {
        /// What was archived
        kind: ArchiveItemKind,
        /// Final location
        destination: PathBuf,
    },

    /// A file could not be archived
    ArchiveItemFailed {
        /// What failed to archive
        kind: ArchiveItemKind,
        /// Error message
        error: String,
    },

    /// The run reached a terminal status
    RunFinished {
        /// Run identifier
        run_id: RunId,
        /// Terminal status
        status: RunStatus,
        /// Scenario, if the run completed
        scenario: Option<Scenario>,
    },
}
