//! # review-orchestrator
//!
//! Unattended annual credit review workflow: acquire a dataset from an external
//! extractor under a fixed retry policy, produce one report per facility category,
//! notify the right recipients for whichever reports exist, and archive inputs and
//! outputs without ever overwriting earlier runs.
//!
//! ## Design Philosophy
//!
//! - **Every run is recorded** - a run either completes (in one of four scenarios)
//!   or aborts, and both end up in the append-only run log
//! - **Failures stay local** - a failed report, notification or file move is
//!   recorded and the run moves on
//! - **Replaceable edges** - extraction, report production, notification delivery
//!   and time are traits, so each can be swapped or faked
//! - **Event-driven** - consumers subscribe to run events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use review_orchestrator::{Config, Orchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None, None)?;
//!     let orchestrator = Orchestrator::from_config(Arc::new(config))?;
//!
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let record = orchestrator
//!         .run_until(review_orchestrator::shutdown_signal())
//!         .await;
//!     println!("{}", record.summary_line());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Moving datasets and reports into long-term storage
pub mod archive;
/// Time source and sleep
pub mod clock;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Dataset acquisition and validation
pub mod extraction;
/// Subscriber setup for the binary
pub mod logging;
/// Message rendering and delivery
pub mod notify;
/// Workflow run state machine
pub mod orchestrator;
/// Per-category report generation
pub mod reports;
/// Fixed-interval retry for extraction
pub mod retry;
/// Append-only record of runs
pub mod run_log;
/// Scenario classification
pub mod scenario;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
pub use types::{
    ArchiveOutcome, ArchiveStatus, Category, Event, NotificationOutcome, ReportResult,
    ReportStatus, RunId, RunRecord, RunStatus, Scenario,
};

/// Completes when the process receives a termination signal
///
/// Pass it to [`Orchestrator::run_until`] so an operator's Ctrl+C or a service
/// manager's stop request aborts the current run with a recorded cause.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn shutdown_signal() {
    wait_for_signal().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("received SIGINT");
            } else {
                tracing::error!("could not register any signal handler, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("received SIGTERM");
            } else {
                tracing::error!("could not register any signal handler, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("received Ctrl+C");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
    }
}
