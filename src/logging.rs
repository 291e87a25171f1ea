//! Log output for the binary
//!
//! Diagnostics go to stderr and, unless switched off, to an append-mode log file
//! without ANSI colours; stdout is left to command output. `RUST_LOG` overrides
//! the configured level. Library code only emits `tracing` events; installing the
//! subscriber is left to the binary.

use crate::config::Config;
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter from `RUST_LOG` when set, else the configured level
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| Error::config(format!("invalid log level '{level}': {e}"), "logging.level")),
    }
}

/// Install the global subscriber
///
/// Fails if the log file cannot be opened or a subscriber is already installed.
pub fn init(config: &Config) -> Result<()> {
    let filter = env_filter(&config.logging.level)?;

    let file_layer = if config.logging.file {
        let path = &config.paths.log_file;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("failed to install log subscriber: {e}")))
}
