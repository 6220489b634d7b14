//! Multi-file assignment: many uploaded files, one table per entity.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sheet_model::{Dataset, EntityType};

use crate::csv_table::{LoadedTable, load_table};
use crate::error::IngestError;

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file supplies the table for `entity`.
    Assigned { entity: EntityType, rows: usize },
    /// A later file for the same table took its place.
    Replaced {
        entity: EntityType,
        rows: usize,
        by: PathBuf,
    },
    Rejected { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAssignment {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Result of assigning a batch of files to the three tables.
#[derive(Debug, Default)]
pub struct Assignment {
    pub tables: BTreeMap<EntityType, LoadedTable>,
    pub rejected: Vec<(PathBuf, IngestError)>,
    /// One entry per input file, in input order.
    pub files: Vec<FileAssignment>,
}

impl Assignment {
    pub fn table(&self, entity: EntityType) -> Option<&LoadedTable> {
        self.tables.get(&entity)
    }

    /// Entities no file was assigned to.
    pub fn unassigned(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|entity| !self.tables.contains_key(entity))
            .collect()
    }

    /// Build a dataset from the assigned tables; unassigned tables stay empty.
    pub fn into_dataset(self) -> Dataset {
        let mut dataset = Dataset::new();
        for (entity, table) in self.tables {
            dataset.set_rows(entity, table.rows);
        }
        dataset
    }
}

/// Load every file and assign it to the table it classifies as.
///
/// Files are processed in the given order; a later file for the same
/// entity replaces the earlier one. Files that fail to load are collected
/// in `rejected` and never abort the batch.
pub fn assign_files<P: AsRef<Path>>(paths: &[P]) -> Assignment {
    let mut assignment = Assignment::default();
    let mut current: BTreeMap<EntityType, usize> = BTreeMap::new();
    for path in paths {
        let path = path.as_ref();
        let outcome = match load_table(path) {
            Ok(table) => {
                let entity = table.entity;
                if let Some(previous) = assignment.tables.get(&entity) {
                    tracing::warn!(
                        entity = %entity,
                        previous = %previous.path.display(),
                        replacement = %path.display(),
                        "replacing previously assigned table"
                    );
                }
                if let Some(&slot) = current.get(&entity)
                    && let Some(entry) = assignment.files.get_mut(slot)
                    && let FileOutcome::Assigned { rows, .. } = entry.outcome
                {
                    entry.outcome = FileOutcome::Replaced {
                        entity,
                        rows,
                        by: path.to_path_buf(),
                    };
                }
                current.insert(entity, assignment.files.len());
                let rows = table.rows.len();
                assignment.tables.insert(entity, table);
                FileOutcome::Assigned { entity, rows }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "file rejected");
                let message = error.to_string();
                assignment.rejected.push((path.to_path_buf(), error));
                FileOutcome::Rejected { message }
            }
        };
        assignment.files.push(FileAssignment {
            path: path.to_path_buf(),
            outcome,
        });
    }
    assignment
}
