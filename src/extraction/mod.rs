//! Dataset extraction
//!
//! The extractor that signs in to the source system and downloads a snapshot is a
//! black box behind the [`ExtractionGateway`] trait. A gateway only has to leave a
//! file behind; this module then checks that the file is a structurally valid
//! dataset before any report sees it.
//!
//! - [`CommandGateway`]: runs an external extractor command, then picks the newest
//!   dataset file in the incoming area
//! - [`load_dataset`]: parses and validates a dataset file

mod command;
mod dataset;
mod traits;

pub use command::{CommandGateway, newest_dataset_file};
pub use dataset::{Dataset, Table, load_dataset};
pub use traits::ExtractionGateway;
