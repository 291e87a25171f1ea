//! Error types for review-orchestrator
//!
//! This module provides the failure taxonomy of a workflow run:
//! - Phase errors (extraction, generation, notification, archive) that are folded
//!   into the run record and never abort a run
//! - Internal and configuration errors that abort a run and are surfaced with a
//!   non-zero exit code
//! - Machine-readable error codes for log lines and run records

use crate::types::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for review-orchestrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for review-orchestrator
///
/// Each variant includes contextual information to help diagnose issues. Whether an
/// error aborts a run is decided by [`Error::is_fatal`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "retry.max_attempts")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset extraction attempt failed (retryable)
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Report generation failed for one category
    #[error("report generation failed for {category}: {reason}")]
    Generation {
        /// The category whose producer failed
        category: Category,
        /// The reason generation failed
        reason: String,
    },

    /// Notification could not be delivered
    #[error("notification failed: {0}")]
    Notification(String),

    /// Archiving error
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Unexpected internal failure; aborts the run
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Dataset could not be parsed
    #[error("dataset parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// External tool execution failed (extractor, report script)
    #[error("external tool error: {0}")]
    ExternalTool(String),
}

/// Archive-related errors (moves into history and dated report storage)
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// File move/rename failed
    #[error("failed to move {source_path} to {dest_path}: {reason}")]
    MoveFailed {
        /// The source path of the file being moved
        source_path: PathBuf,
        /// The destination path where the file should be moved
        dest_path: PathBuf,
        /// The reason the move failed
        reason: String,
    },

    /// No free destination name could be reserved
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// The reason for the collision
        reason: String,
    },

    /// Invalid path encountered while archiving
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The invalid path that was encountered
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Whether this error aborts a run instead of consuming a retry
    ///
    /// Internal failures (including I/O on the run's own bookkeeping, which callers
    /// convert into [`Error::Internal`]) and configuration errors cannot be fixed by
    /// waiting, so they abort. Every other phase failure is recorded and the run
    /// moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Internal(_) | Error::Config { .. })
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Extraction(_) => "extraction_failed",
            Error::Generation { .. } => "generation_failed",
            Error::Notification(_) => "notification_failed",
            Error::Archive(ArchiveError::MoveFailed { .. }) => "archive_move_failed",
            Error::Archive(ArchiveError::FileCollision { .. }) => "archive_collision",
            Error::Archive(ArchiveError::InvalidPath { .. }) => "archive_invalid_path",
            Error::Internal(_) => "internal_error",
            Error::Serialization(_) => "serialization_error",
            Error::Csv(_) => "dataset_parse_error",
            Error::Toml(_) => "config_parse_error",
            Error::ExternalTool(_) => "external_tool_error",
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns every Error variant paired with its expected error code.
    fn all_error_variants() -> Vec<(Error, &'static str)> {
        let csv_error = csv::ReaderBuilder::new()
            .from_reader("a,b\n1,2,3\n".as_bytes())
            .records()
            .find_map(|r| r.err())
            .expect("ragged row must yield a csv error");
        let toml_error = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        vec![
            (Error::config("bad", "retry.max_attempts"), "config_error"),
            (Error::Io(std::io::Error::other("x")), "io_error"),
            (Error::Extraction("login page timeout".into()), "extraction_failed"),
            (
                Error::Generation {
                    category: Category::A,
                    reason: "script crashed".into(),
                },
                "generation_failed",
            ),
            (Error::Notification("502".into()), "notification_failed"),
            (
                Error::Archive(ArchiveError::MoveFailed {
                    source_path: "a".into(),
                    dest_path: "b".into(),
                    reason: "denied".into(),
                }),
                "archive_move_failed",
            ),
            (
                Error::Archive(ArchiveError::FileCollision {
                    path: "a".into(),
                    reason: "taken".into(),
                }),
                "archive_collision",
            ),
            (
                Error::Archive(ArchiveError::InvalidPath {
                    path: "/".into(),
                    reason: "no file name".into(),
                }),
                "archive_invalid_path",
            ),
            (Error::Internal("bug".into()), "internal_error"),
            (Error::Serialization(json_error), "serialization_error"),
            (Error::Csv(csv_error), "dataset_parse_error"),
            (Error::Toml(toml_error), "config_parse_error"),
            (Error::ExternalTool("exit 2".into()), "external_tool_error"),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_error_code() {
        for (error, expected_code) in all_error_variants() {
            assert_eq!(
                error.error_code(),
                expected_code,
                "wrong code for error: {error}"
            );
        }
    }

    #[test]
    fn only_internal_and_config_errors_are_fatal() {
        for (error, code) in all_error_variants() {
            assert_eq!(
                error.is_fatal(),
                matches!(code, "internal_error" | "config_error"),
                "fatality mismatch for {code}"
            );
        }
    }

    #[test]
    fn generation_error_names_the_category() {
        let error = Error::Generation {
            category: Category::B,
            reason: "missing column PRODUCT".into(),
        };
        let message = error.to_string();
        assert!(message.contains("Three Wheeler"), "got: {message}");
        assert!(message.contains("missing column PRODUCT"));
    }

    #[test]
    fn archive_error_converts_into_error() {
        let err: Error = ArchiveError::InvalidPath {
            path: PathBuf::from("/"),
            reason: "no file name".into(),
        }
        .into();
        assert!(matches!(err, Error::Archive(ArchiveError::InvalidPath { .. })));
    }
}
