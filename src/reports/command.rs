//! Report producer that delegates to an external script per category

use super::{ProducerOutput, ReportProducer, ReportRequest};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::Category;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

#[derive(Debug, Clone)]
struct CategoryCommand {
    command: Option<PathBuf>,
    args: Vec<String>,
}

/// Runs `<command> <args...> <dataset> <output>` for each category
///
/// The output path must not exist beforehand, so an artifact present after a zero
/// exit status was written by this invocation and counts as generated. A zero exit
/// status without an artifact means the script found nothing to report.
/// Any other exit status is a failure carrying the script's stderr. The child is
/// killed when generation is cancelled by the timeout.
#[derive(Debug, Clone)]
pub struct CommandProducer {
    category_a: CategoryCommand,
    category_b: CategoryCommand,
}

impl CommandProducer {
    /// Build a producer from the per-category report commands
    pub fn from_config(config: &Config) -> Self {
        let command_for = |category: Category| {
            let settings = config.reports.category(category);
            CategoryCommand {
                command: settings.command.clone(),
                args: settings.args.clone(),
            }
        };
        Self {
            category_a: command_for(Category::A),
            category_b: command_for(Category::B),
        }
    }

    fn command(&self, category: Category) -> &CategoryCommand {
        match category {
            Category::A => &self.category_a,
            Category::B => &self.category_b,
        }
    }
}

#[async_trait]
impl ReportProducer for CommandProducer {
    async fn generate(&self, request: &ReportRequest) -> Result<ProducerOutput> {
        let category = request.category;
        let settings = self.command(category);
        let command = settings.command.as_ref().ok_or_else(|| Error::Generation {
            category,
            reason: "no report command configured".to_string(),
        })?;

        if let Some(parent) = request.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if tokio::fs::try_exists(&request.output).await? {
            return Err(Error::Generation {
                category,
                reason: format!("output {} already exists", request.output.display()),
            });
        }

        tracing::debug!(%category, ?command, "running report command");
        let output = Command::new(command)
            .args(&settings.args)
            .arg(request.dataset.path())
            .arg(&request.output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::ExternalTool(format!("failed to run {}: {e}", command.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Generation {
                category,
                reason: format!("report command exited with {}: {}", output.status, stderr.trim()),
            });
        }

        if tokio::fs::try_exists(&request.output).await.unwrap_or(false) {
            Ok(ProducerOutput::Generated(request.output.clone()))
        } else {
            tracing::info!(%category, "report command produced no artifact");
            Ok(ProducerOutput::Empty)
        }
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
