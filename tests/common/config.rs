//! Test configuration rooted in a temporary directory

use review_orchestrator::Config;
use review_orchestrator::config::RecipientGroup;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary workspace with every configured path inside it
pub struct TestEnv {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn incoming(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn history(&self) -> PathBuf {
        self.root.join("data_bin")
    }

    pub fn reports(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn staging(&self) -> PathBuf {
        self.root.join("staging")
    }

    pub fn run_log(&self) -> PathBuf {
        self.root.join("logs").join("runs.jsonl")
    }

    /// Library configuration with one recipient in the general group
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.paths.incoming = self.incoming();
        config.paths.history = self.history();
        config.paths.reports = self.reports();
        config.paths.staging = self.staging();
        config.paths.log_file = self.root.join("annual_review.log");
        config.paths.run_log = self.run_log();
        config.logging.file = false;
        config
            .notifications
            .recipients
            .set(RecipientGroup::General, vec!["credit-ops@example.com".into()]);
        config
    }

    /// Write a TOML file equivalent to [`TestEnv::config`] plus `extra`, for the binary
    pub fn write_config_toml(&self, extra: &str) -> PathBuf {
        let path = self.root.join("review.toml");
        let toml = format!(
            r#"[paths]
incoming = {incoming:?}
history = {history:?}
reports = {reports:?}
staging = {staging:?}
log_file = {log_file:?}
run_log = {run_log:?}

[logging]
level = "warn"
file = false

{extra}
"#,
            incoming = self.incoming().display().to_string(),
            history = self.history().display().to_string(),
            reports = self.reports().display().to_string(),
            staging = self.staging().display().to_string(),
            log_file = self.root.join("annual_review.log").display().to_string(),
            run_log = self.run_log().display().to_string(),
        );
        std::fs::write(&path, toml).expect("failed to write config");
        path
    }
}
