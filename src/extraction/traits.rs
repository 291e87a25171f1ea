//! Trait for dataset extraction gateways

use async_trait::async_trait;
use std::path::PathBuf;

/// Retrieves a raw dataset snapshot from the source system
///
/// Implementations may fail transiently (login page timeouts, network errors,
/// portal maintenance). Every error consumes one retry slot; calling `acquire`
/// again after a failure must be safe.
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    /// Produce the path of a freshly downloaded dataset file
    ///
    /// # Errors
    ///
    /// Returns an error if the extractor fails, times out, or leaves no dataset
    /// file behind.
    async fn acquire(&self) -> crate::Result<PathBuf>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
