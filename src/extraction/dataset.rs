//! Dataset parsing and structural validation

use crate::error::{Error, Result};
use crate::types::DatasetRef;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parsed tabular content of a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse delimited text with a header row
    ///
    /// Every record must have as many fields as the header. Header names are
    /// trimmed; cell values are kept as-is.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(Error::Extraction("dataset has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows (header excluded)
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a column by exact (trimmed) name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    /// The subset of `required` that is not a column of this table
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.column(name).is_none())
            .collect()
    }
}

/// A structurally valid dataset acquired for one run
///
/// Cloning is cheap: the parsed table is shared read-only between the report
/// producers.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    table: Arc<Table>,
}

impl Dataset {
    /// Wrap an already parsed table
    pub fn new(path: PathBuf, table: Table) -> Self {
        Self {
            path,
            table: Arc::new(table),
        }
    }

    /// Location of the dataset file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows, possibly zero
    pub fn row_count(&self) -> usize {
        self.table.rows.len()
    }

    /// Parsed content
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Reference recorded in attempts and run records
    pub fn reference(&self) -> DatasetRef {
        DatasetRef {
            path: self.path.clone(),
            row_count: self.row_count(),
        }
    }
}

/// Load and validate a dataset file
///
/// A missing, unreadable, header-less or ragged file is an extraction error, so it
/// consumes a retry slot like any other failed attempt. A file with a header and
/// zero data rows is valid.
pub fn load_dataset(path: &Path, delimiter: char) -> Result<Dataset> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| Error::config("delimiter must be ASCII", "extraction.delimiter"))?;

    let file = std::fs::File::open(path).map_err(|e| {
        Error::Extraction(format!("cannot open dataset {}: {e}", path.display()))
    })?;

    let table = Table::from_reader(file, delimiter).map_err(|e| match e {
        Error::Csv(csv) => Error::Extraction(format!(
            "dataset {} is not parseable: {csv}",
            path.display()
        )),
        other => other,
    })?;

    Ok(Dataset::new(path.to_path_buf(), table))
}
