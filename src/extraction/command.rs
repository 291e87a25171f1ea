//! Extraction gateway that runs an external extractor command

use super::traits::ExtractionGateway;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::process::Command;

/// Runs the configured extractor, then picks up the newest dataset it left in the
/// incoming area
///
/// When no command is configured, only the incoming area is scanned. This suits
/// setups where another process drops the export into the folder.
///
/// # Examples
///
/// ```no_run
/// use review_orchestrator::extraction::{CommandGateway, ExtractionGateway};
/// use review_orchestrator::Config;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = CommandGateway::from_config(&Config::default());
/// let dataset_path = gateway.acquire().await?;
/// println!("downloaded {}", dataset_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CommandGateway {
    command: Option<PathBuf>,
    args: Vec<String>,
    timeout: Duration,
    incoming: PathBuf,
    extensions: Vec<String>,
}

impl CommandGateway {
    /// Build a gateway from the extraction and path settings
    pub fn from_config(config: &Config) -> Self {
        Self {
            command: config.extraction.command.clone(),
            args: config.extraction.args.clone(),
            timeout: config.extraction.timeout,
            incoming: config.paths.incoming.clone(),
            extensions: config.extraction.dataset_extensions.clone(),
        }
    }

    /// Locate the extractor executable
    ///
    /// Paths are used as given; bare names are searched on PATH with `which`.
    /// Returns `None` when no command is configured or it cannot be found.
    pub fn resolve_command(&self) -> Option<PathBuf> {
        let command = self.command.as_ref()?;
        if command.components().count() > 1 {
            command.is_file().then(|| command.clone())
        } else {
            which::which(command).ok()
        }
    }

    async fn run_extractor(&self, command: &Path) -> Result<()> {
        tracing::debug!(?command, args = ?self.args, "running extractor");

        let result = tokio::time::timeout(
            self.timeout,
            Command::new(command)
                .args(&self.args)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(Error::Extraction(format!(
                    "extractor exited with {}: {}",
                    output.status,
                    stderr.trim()
                )))
            }
            Ok(Err(e)) => Err(Error::Extraction(format!(
                "failed to run extractor {}: {e}",
                command.display()
            ))),
            Err(_) => Err(Error::Extraction(format!(
                "extractor timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl ExtractionGateway for CommandGateway {
    async fn acquire(&self) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.incoming).await?;

        if let Some(command) = &self.command {
            self.run_extractor(command).await?;
        }

        let incoming = self.incoming.clone();
        let extensions = self.extensions.clone();
        tokio::task::spawn_blocking(move || newest_dataset_file(&incoming, &extensions))
            .await
            .map_err(|e| Error::Internal(format!("dataset scan task failed: {e}")))?
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Most recently modified file in `dir` with one of `extensions` (case-insensitive)
///
/// Ties on modification time are broken by file name so the choice is stable.
pub fn newest_dataset_file(dir: &Path, extensions: &[String]) -> Result<PathBuf> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
        if !matches_extension {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let is_newer = match &newest {
            None => true,
            Some((time, existing)) => (modified, &path) > (*time, existing),
        };
        if is_newer {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path).ok_or_else(|| {
        Error::Extraction(format!(
            "no dataset file ({}) found in {}",
            extensions.join(", "),
            dir.display()
        ))
    })
}
