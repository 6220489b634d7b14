//! Loading client, worker and task tables from CSV files.
//!
//! Each file is read into string rows, classified by its key column (or its
//! filename as a fallback), and checked for the columns its table requires.

pub mod assign;
pub mod classify;
pub mod csv_table;
pub mod error;

pub use assign::{Assignment, FileAssignment, FileOutcome, assign_files};
pub use classify::{classify, missing_columns, normalize_header, required_columns};
pub use csv_table::{CsvTable, LoadedTable, load_table, read_csv, read_csv_table};
pub use error::{ClassificationFailure, IngestError, Result};
