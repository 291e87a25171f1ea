//! Configuration types for review-orchestrator
//!
//! A [`Config`] is built once at startup and shared read-only (behind an `Arc`)
//! with every component. Load order, later sources winning:
//!
//! 1. built-in defaults
//! 2. TOML configuration file
//! 3. `credentials.env` (dotenv format, read into a map; the process environment
//!    is never modified)
//! 4. process environment

use crate::error::{Error, Result};
use crate::types::{Category, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the workflow
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Filesystem roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// Extraction gateway settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Extraction retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Report producer settings
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Notification transport and recipients
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem roots used by a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Incoming dataset area (default: "data")
    #[serde(default = "default_incoming_dir")]
    pub incoming: PathBuf,

    /// Historical dataset storage (default: "data_bin")
    #[serde(default = "default_history_dir")]
    pub history: PathBuf,

    /// Root of the dated report output folders (default: "reports")
    #[serde(default = "default_reports_dir")]
    pub reports: PathBuf,

    /// Root of the per-run staging directories (default: "staging")
    #[serde(default = "default_staging_dir")]
    pub staging: PathBuf,

    /// Appended human-readable log file (default: "annual_review.log")
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Appended JSON-lines run record log (default: "logs/runs.jsonl")
    #[serde(default = "default_run_log")]
    pub run_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            incoming: default_incoming_dir(),
            history: default_history_dir(),
            reports: default_reports_dir(),
            staging: default_staging_dir(),
            log_file: default_log_file(),
            run_log: default_run_log(),
        }
    }
}

/// Extraction gateway configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Extractor executable; when unset the gateway only scans the incoming area
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// Arguments passed to the extractor
    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout for one extractor invocation (default: 300 seconds)
    #[serde(default = "default_extraction_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// File extensions recognised as datasets in the incoming area (default: ["csv"])
    #[serde(default = "default_dataset_extensions")]
    pub dataset_extensions: Vec<String>,

    /// Field delimiter of dataset files (default: ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout: default_extraction_timeout(),
            dataset_extensions: default_dataset_extensions(),
            delimiter: default_delimiter(),
        }
    }
}

/// Fixed-interval retry policy for dataset extraction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of extraction attempts (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait between attempts (default: 900 seconds)
    ///
    /// The upstream system is rate limited, so the interval is fixed rather than
    /// exponential.
    #[serde(default = "default_backoff_interval", with = "duration_serde")]
    pub backoff_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_interval: default_backoff_interval(),
        }
    }
}

/// Which report producer implementation to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProducerKind {
    /// Filter in-process and write a text summary report
    #[default]
    Builtin,
    /// Run an external report command per category
    Command,
}

/// Columns a dataset must expose for report generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnContract {
    /// "Review completed" date column; a blank value means the review is pending
    #[serde(default = "default_review_completed_column")]
    pub review_completed: String,

    /// "Pre-approval" date column; must be non-blank for a record to be in scope
    #[serde(default = "default_pre_approval_column")]
    pub pre_approval: String,

    /// Product name column matched against each category's product set
    #[serde(default = "default_product_column")]
    pub product: String,

    /// Optional column summarised in builtin reports (default: "PRE_APPROVED_USER")
    #[serde(default = "default_summary_column")]
    pub summary: Option<String>,
}

impl Default for ColumnContract {
    fn default() -> Self {
        Self {
            review_completed: default_review_completed_column(),
            pre_approval: default_pre_approval_column(),
            product: default_product_column(),
            summary: default_summary_column(),
        }
    }
}

impl ColumnContract {
    /// The columns whose absence makes generation fail
    pub fn required(&self) -> [&str; 3] {
        [
            self.review_completed.as_str(),
            self.pre_approval.as_str(),
            self.product.as_str(),
        ]
    }
}

/// Per-category report settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Product names (exact, case-sensitive after trimming) that belong to the category
    pub products: Vec<String>,

    /// File name of the produced artifact
    pub artifact_name: String,

    /// Report command, used when `reports.producer = "command"`
    ///
    /// Invoked as `<command> <args...> <dataset> <output>`.
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// Extra arguments placed before the dataset and output paths
    #[serde(default)]
    pub args: Vec<String>,
}

/// Report generation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Producer implementation (default: builtin)
    #[serde(default)]
    pub producer: ProducerKind,

    /// Upper bound on one category's generation (default: 600 seconds)
    #[serde(default = "default_generation_timeout", with = "duration_serde")]
    pub generation_timeout: Duration,

    /// Required dataset columns
    #[serde(default)]
    pub columns: ColumnContract,

    /// Category A (Auto Finance)
    #[serde(default = "default_category_a")]
    pub category_a: CategoryConfig,

    /// Category B (Three Wheeler)
    #[serde(default = "default_category_b")]
    pub category_b: CategoryConfig,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            producer: ProducerKind::default(),
            generation_timeout: default_generation_timeout(),
            columns: ColumnContract::default(),
            category_a: default_category_a(),
            category_b: default_category_b(),
        }
    }
}

impl ReportsConfig {
    /// Settings for one category
    pub fn category(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::A => &self.category_a,
            Category::B => &self.category_b,
        }
    }
}

/// Named recipient group, resolved to addresses through configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientGroup {
    /// General distribution list
    General,
    /// Group 1
    Group1,
    /// Group 2
    Group2,
    /// Group 3
    Group3,
    /// Group 4
    Group4,
    /// Group 5
    Group5,
}

impl RecipientGroup {
    /// Every group, in routing order
    pub const ALL: [RecipientGroup; 6] = [
        RecipientGroup::General,
        RecipientGroup::Group1,
        RecipientGroup::Group2,
        RecipientGroup::Group3,
        RecipientGroup::Group4,
        RecipientGroup::Group5,
    ];

    /// Lowercase identifier used in configuration and payloads
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientGroup::General => "general",
            RecipientGroup::Group1 => "group1",
            RecipientGroup::Group2 => "group2",
            RecipientGroup::Group3 => "group3",
            RecipientGroup::Group4 => "group4",
            RecipientGroup::Group5 => "group5",
        }
    }

    /// Environment variable holding the comma-separated member list
    pub fn env_var(self) -> &'static str {
        match self {
            RecipientGroup::General => "GENERAL_EMAILS",
            RecipientGroup::Group1 => "GROUP1_EMAILS",
            RecipientGroup::Group2 => "GROUP2_EMAILS",
            RecipientGroup::Group3 => "GROUP3_EMAILS",
            RecipientGroup::Group4 => "GROUP4_EMAILS",
            RecipientGroup::Group5 => "GROUP5_EMAILS",
        }
    }
}

impl std::fmt::Display for RecipientGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which recipient groups receive each scenario's message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Groups for the BOTH scenario
    #[serde(default = "default_all_groups")]
    pub both: Vec<RecipientGroup>,
    /// Groups for the ONLY_A scenario
    #[serde(default = "default_all_groups")]
    pub only_a: Vec<RecipientGroup>,
    /// Groups for the ONLY_B scenario
    #[serde(default = "default_all_groups")]
    pub only_b: Vec<RecipientGroup>,
    /// Groups for the NONE scenario
    #[serde(default = "default_all_groups")]
    pub none: Vec<RecipientGroup>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            both: default_all_groups(),
            only_a: default_all_groups(),
            only_b: default_all_groups(),
            none: default_all_groups(),
        }
    }
}

impl RoutingConfig {
    /// Groups selected for a scenario
    pub fn groups_for(&self, scenario: Scenario) -> &[RecipientGroup] {
        match scenario {
            Scenario::Both => &self.both,
            Scenario::OnlyA => &self.only_a,
            Scenario::OnlyB => &self.only_b,
            Scenario::None => &self.none,
        }
    }
}

/// Addresses of each recipient group
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientsConfig {
    /// General distribution list
    #[serde(default)]
    pub general: Vec<String>,
    /// Group 1 members
    #[serde(default)]
    pub group1: Vec<String>,
    /// Group 2 members
    #[serde(default)]
    pub group2: Vec<String>,
    /// Group 3 members
    #[serde(default)]
    pub group3: Vec<String>,
    /// Group 4 members
    #[serde(default)]
    pub group4: Vec<String>,
    /// Group 5 members
    #[serde(default)]
    pub group5: Vec<String>,
}

impl RecipientsConfig {
    /// Members of one group
    pub fn members(&self, group: RecipientGroup) -> &[String] {
        match group {
            RecipientGroup::General => &self.general,
            RecipientGroup::Group1 => &self.group1,
            RecipientGroup::Group2 => &self.group2,
            RecipientGroup::Group3 => &self.group3,
            RecipientGroup::Group4 => &self.group4,
            RecipientGroup::Group5 => &self.group5,
        }
    }

    /// Replace the members of one group
    pub fn set(&mut self, group: RecipientGroup, members: Vec<String>) {
        let slot = match group {
            RecipientGroup::General => &mut self.general,
            RecipientGroup::Group1 => &mut self.group1,
            RecipientGroup::Group2 => &mut self.group2,
            RecipientGroup::Group3 => &mut self.group3,
            RecipientGroup::Group4 => &mut self.group4,
            RecipientGroup::Group5 => &mut self.group5,
        };
        *slot = members;
    }
}

/// Notification transport
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Record the dispatch as disabled without sending
    #[default]
    Disabled,
    /// POST the rendered message to a webhook
    Webhook,
}

/// Notification configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Transport (default: disabled)
    #[serde(default)]
    pub kind: NotifierKind,

    /// Webhook URL, required when `kind = "webhook"`
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Optional Authorization header value
    #[serde(default)]
    pub auth_header: Option<String>,

    /// Timeout for one delivery (default: 30 seconds)
    #[serde(default = "default_notification_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Signature line of every message (default: "Credit Evaluation Team")
    #[serde(default = "default_signature")]
    pub signature: String,

    /// Group membership
    #[serde(default)]
    pub recipients: RecipientsConfig,

    /// Group selection per scenario
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            webhook_url: None,
            auth_header: None,
            timeout: default_notification_timeout(),
            signature: default_signature(),
            recipients: RecipientsConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

impl NotificationConfig {
    /// Distinct addresses of the given groups, in first-seen order
    pub fn resolve_recipients(&self, groups: &[RecipientGroup]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        groups
            .iter()
            .flat_map(|g| self.recipients.members(*g))
            .filter(|address| seen.insert(address.to_ascii_lowercase()))
            .cloned()
            .collect()
    }
}

/// Log output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also append to `paths.log_file` (default: true)
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: true,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file and an optional dotenv file,
    /// then apply process environment overrides and validate
    pub fn load(config_file: Option<&Path>, env_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };

        let file_vars = match env_file {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };

        config.apply_overrides(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {e}", path.display()),
            key: None,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML configuration text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `REVIEW_*` and recipient-group overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("REVIEW_INCOMING_DIR") {
            self.paths.incoming = v.into();
        }
        if let Some(v) = get("REVIEW_HISTORY_DIR") {
            self.paths.history = v.into();
        }
        if let Some(v) = get("REVIEW_REPORTS_DIR") {
            self.paths.reports = v.into();
        }
        if let Some(v) = get("REVIEW_STAGING_DIR") {
            self.paths.staging = v.into();
        }
        if let Some(v) = get("REVIEW_LOG_FILE") {
            self.paths.log_file = v.into();
        }
        if let Some(v) = get("REVIEW_RUN_LOG") {
            self.paths.run_log = v.into();
        }
        if let Some(v) = get("REVIEW_EXTRACTOR_COMMAND") {
            self.extraction.command = Some(v.into());
        }
        if let Some(v) = get("REVIEW_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_number(&v, "REVIEW_MAX_ATTEMPTS")?;
        }
        if let Some(v) = get("REVIEW_BACKOFF_SECS") {
            self.retry.backoff_interval =
                Duration::from_secs(parse_number(&v, "REVIEW_BACKOFF_SECS")?);
        }
        if let Some(v) = get("REVIEW_GENERATION_TIMEOUT_SECS") {
            self.reports.generation_timeout =
                Duration::from_secs(parse_number(&v, "REVIEW_GENERATION_TIMEOUT_SECS")?);
        }
        if let Some(v) = get("REVIEW_WEBHOOK_URL") {
            self.notifications.webhook_url = Some(v);
            self.notifications.kind = NotifierKind::Webhook;
        }
        if let Some(v) = get("REVIEW_WEBHOOK_AUTH") {
            self.notifications.auth_header = Some(v);
        }
        if let Some(v) = get("REVIEW_LOG_LEVEL") {
            self.logging.level = v;
        }

        for group in RecipientGroup::ALL {
            if let Some(list) = get(group.env_var()) {
                self.notifications
                    .recipients
                    .set(group, parse_address_list(&list));
            }
        }

        Ok(())
    }

    /// Reject configurations the workflow cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "max_attempts must be at least 1",
                "retry.max_attempts",
            ));
        }
        if self.reports.generation_timeout.is_zero() {
            return Err(Error::config(
                "generation_timeout must be greater than zero",
                "reports.generation_timeout",
            ));
        }
        if self.extraction.timeout.is_zero() {
            return Err(Error::config(
                "timeout must be greater than zero",
                "extraction.timeout",
            ));
        }
        if self.notifications.timeout.is_zero() {
            return Err(Error::config(
                "timeout must be greater than zero",
                "notifications.timeout",
            ));
        }
        if !self.extraction.delimiter.is_ascii() {
            return Err(Error::config(
                format!("delimiter '{}' must be an ASCII character", self.extraction.delimiter),
                "extraction.delimiter",
            ));
        }
        if self.extraction.dataset_extensions.is_empty() {
            return Err(Error::config(
                "at least one dataset extension is required",
                "extraction.dataset_extensions",
            ));
        }

        let columns = self.reports.columns.required();
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::config(
                "column names must not be blank",
                "reports.columns",
            ));
        }
        if columns[0] == columns[1] || columns[0] == columns[2] || columns[1] == columns[2] {
            return Err(Error::config(
                "review_completed, pre_approval and product must be distinct columns",
                "reports.columns",
            ));
        }

        for category in Category::ALL {
            let settings = self.reports.category(category);
            let key = match category {
                Category::A => "reports.category_a",
                Category::B => "reports.category_b",
            };
            if settings.products.iter().all(|p| p.trim().is_empty()) {
                return Err(Error::config(
                    format!("{category} product set is empty"),
                    format!("{key}.products"),
                ));
            }
            if Path::new(&settings.artifact_name).file_name().is_none()
                || settings.artifact_name.contains(['/', '\\'])
            {
                return Err(Error::config(
                    format!("{category} artifact_name must be a plain file name"),
                    format!("{key}.artifact_name"),
                ));
            }
            if self.reports.producer == ProducerKind::Command && settings.command.is_none() {
                return Err(Error::config(
                    format!("{category} needs a command when producer = \"command\""),
                    format!("{key}.command"),
                ));
            }
        }
        if self.reports.category_a.artifact_name == self.reports.category_b.artifact_name {
            return Err(Error::config(
                "categories must use different artifact names",
                "reports.category_b.artifact_name",
            ));
        }

        if self.notifications.kind == NotifierKind::Webhook
            && self
                .notifications
                .webhook_url
                .as_deref()
                .is_none_or(|u| u.trim().is_empty())
        {
            return Err(Error::config(
                "webhook_url is required when kind = \"webhook\"",
                "notifications.webhook_url",
            ));
        }

        Ok(())
    }
}

/// Read a dotenv file into a map without touching the process environment
///
/// A missing file yields an empty map.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let iter = dotenvy::from_path_iter(path).map_err(|e| Error::Config {
        message: format!("cannot read {}: {e}", path.display()),
        key: None,
    })?;
    iter.map(|item| {
        item.map_err(|e| Error::Config {
            message: format!("invalid line in {}: {e}", path.display()),
            key: None,
        })
    })
    .collect()
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("'{value}' is not a valid number"), key))
}

fn parse_address_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn default_incoming_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("data_bin")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("staging")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("annual_review.log")
}

fn default_run_log() -> PathBuf {
    PathBuf::from("logs/runs.jsonl")
}

fn default_extraction_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_dataset_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_delimiter() -> char {
    ','
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_interval() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_generation_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_review_completed_column() -> String {
    "REPORT_REVIEW_DATE".to_string()
}

fn default_pre_approval_column() -> String {
    "PRE_APPROVED_DATE".to_string()
}

fn default_product_column() -> String {
    "PRODUCT".to_string()
}

fn default_summary_column() -> Option<String> {
    Some("PRE_APPROVED_USER".to_string())
}

fn default_category_a() -> CategoryConfig {
    CategoryConfig {
        products: [
            "VEHICLE LOAN-REGISTERED",
            "TRACTOR LEASE",
            "PLEDGE LOAN",
            "OTHER LEASE",
            "Murabaha",
            "MINI TRUCK LEASE",
            "IJARAH LEASE",
            "HIRE PURCHASE-UN-REGISTERED",
            "HIRE PURCHASE-REGISTERED",
            "VEHICLE LOAN-UN-REGISTERED",
        ]
        .map(String::from)
        .to_vec(),
        artifact_name: "Auto_finance_annual_review_report.txt".to_string(),
        command: None,
        args: Vec::new(),
    }
}

fn default_category_b() -> CategoryConfig {
    CategoryConfig {
        products: [
            "CASH IN HAND",
            "Three Wheeler-Lease-Registered",
            "Three Wheeler-Lease-Brand New",
            "IJARAH SMALL LEASE",
        ]
        .map(String::from)
        .to_vec(),
        artifact_name: "ThreeWheeler_annual_review_report.txt".to_string(),
        command: None,
        args: Vec::new(),
    }
}

fn default_all_groups() -> Vec<RecipientGroup> {
    RecipientGroup::ALL.to_vec()
}

fn default_notification_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_signature() -> String {
    "Credit Evaluation Team".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
