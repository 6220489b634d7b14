//! Error types for table ingestion.

use std::path::PathBuf;

use sheet_model::EntityType;
use thiserror::Error;

/// Headers and filename matched none of the known tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "could not determine table type: no ClientID, WorkerID or TaskID column{}",
    filename_hint(.filename)
)]
pub struct ClassificationFailure {
    pub headers: Vec<String>,
    pub filename: Option<String>,
}

fn filename_hint(filename: &Option<String>) -> String {
    match filename {
        Some(name) => format!(" and filename '{name}' names no table"),
        None => String::new(),
    }
}

/// Errors that can occur while loading a table file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File Errors ===
    /// File extension is not a supported tabular format.
    #[error("unsupported file type: {path} (expected .csv)")]
    UnsupportedFormat { path: PathBuf },

    /// CSV file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or parse the CSV file.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Table Errors ===
    /// The table could not be classified.
    #[error("{path}: {source}")]
    Classification {
        path: PathBuf,
        #[source]
        source: ClassificationFailure,
    },

    /// Classified table lacks columns its entity requires.
    #[error("{path}: missing required column(s) for {entity}: {}", .columns.join(", "))]
    MissingColumns {
        path: PathBuf,
        entity: EntityType,
        columns: Vec<String>,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
