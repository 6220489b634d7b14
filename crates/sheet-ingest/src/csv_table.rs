use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use sheet_model::{EntityType, Row};

use crate::classify::{classify, missing_columns, normalize_header};
use crate::error::{IngestError, Result};

/// Raw CSV contents: one header line plus string records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl CsvTable {
    /// Pair every record with the headers.
    pub fn to_rows(&self) -> Vec<Row> {
        self.records
            .iter()
            .map(|record| Row::from_record(&self.headers, record))
            .collect()
    }
}

/// A classified table ready to be placed into a dataset.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub entity: EntityType,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Read CSV text. The first non-blank line is the header; fully blank
/// records are skipped. Cell values are kept verbatim.
pub fn read_csv<R: Read>(reader: R) -> std::result::Result<CsvTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut table = CsvTable::default();
    let mut saw_header = false;
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|value| value.is_empty()) {
            continue;
        }
        if saw_header {
            table.records.push(record.iter().map(str::to_string).collect());
        } else {
            table.headers = record.iter().map(normalize_header).collect();
            saw_header = true;
        }
    }
    Ok(table)
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let file = std::fs::File::open(path).map_err(|source| open_error(path, source))?;
    read_csv(file).map_err(|source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    })
}

fn open_error(path: &Path, source: io::Error) -> IngestError {
    let path = path.to_path_buf();
    if source.kind() == io::ErrorKind::NotFound {
        IngestError::FileNotFound { path }
    } else {
        IngestError::Open { path, source }
    }
}

/// Load, classify and check one table file.
///
/// The file is rejected as a whole when it is not CSV, cannot be
/// classified, or lacks a required column; no partial table is returned.
pub fn load_table(path: &Path) -> Result<LoadedTable> {
    if !is_csv(path) {
        return Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let table = read_csv_table(path)?;
    let filename = path.file_name().and_then(|name| name.to_str());
    let entity = classify(&table.headers, filename).map_err(|source| {
        IngestError::Classification {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let missing = missing_columns(entity, &table.headers);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            path: path.to_path_buf(),
            entity,
            columns: missing,
        });
    }

    tracing::info!(
        path = %path.display(),
        entity = %entity,
        rows = table.records.len(),
        "loaded table"
    );
    Ok(LoadedTable {
        path: path.to_path_buf(),
        entity,
        rows: table.to_rows(),
        headers: table.headers,
    })
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_skips_blank_lines() {
        let text = "\n\u{feff}TaskID, TaskName\nT1,Build\n,\n\nT2, Ship \n";
        let table = read_csv(text.as_bytes()).expect("read csv");
        assert_eq!(table.headers, vec!["TaskID", "TaskName"]);
        assert_eq!(table.records, vec![vec!["T1", "Build"], vec!["T2", " Ship "]]);
    }

    #[test]
    fn short_records_become_empty_cells() {
        let table = read_csv("A,B\n1\n".as_bytes()).expect("read csv");
        let rows = table.to_rows();
        assert_eq!(rows[0].text("B").as_deref(), Some(""));
    }

    #[test]
    fn only_csv_extension_is_supported() {
        assert!(is_csv(Path::new("clients.CSV")));
        assert!(!is_csv(Path::new("clients.xlsx")));
        assert!(!is_csv(Path::new("clients")));
    }

    #[test]
    fn open_failures_keep_their_cause() {
        let path = Path::new("clients.csv");
        let denied = open_error(path, io::Error::from(io::ErrorKind::PermissionDenied));
        match denied {
            IngestError::Open { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            open_error(path, io::Error::from(io::ErrorKind::NotFound)),
            IngestError::FileNotFound { .. }
        ));
    }
}
