//! File-based ingestion tests.

use std::fs;
use std::path::{Path, PathBuf};

use sheet_ingest::{FileOutcome, IngestError, assign_files, load_table};
use sheet_model::EntityType;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

const CLIENTS: &str = "ClientID,ClientName,PriorityLevel,RequestedTaskIDs\n\
C1,Acme,3,\"T1,T2\"\n\
\n\
C2,Globex,5,T1\n";

const WORKERS: &str = "WorkerID,WorkerName,Skills,AvailableSlots,MaxLoadPerPhase\n\
W1,Ada,\"rust,sql\",\"[1,2]\",2\n";

const TASKS: &str = "TaskID,TaskName,Duration,RequiredSkills,MaxConcurrent\n\
T1,Build,2,rust,1\n";

#[test]
fn loads_and_classifies_a_csv_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(dir.path(), "upload.csv", CLIENTS);

    let table = load_table(&path).expect("load clients");
    assert_eq!(table.entity, EntityType::Clients);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(
        table.rows[0].text("RequestedTaskIDs").as_deref(),
        Some("T1,T2")
    );
    assert_eq!(table.rows[1].text("ClientID").as_deref(), Some("C2"));
}

#[test]
fn rejects_missing_required_columns() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(dir.path(), "tasks.csv", "TaskID,TaskName\nT1,Build\n");

    let err = load_table(&path).unwrap_err();
    match err {
        IngestError::MissingColumns {
            entity, columns, ..
        } => {
            assert_eq!(entity, EntityType::Tasks);
            assert_eq!(columns, vec!["Duration", "RequiredSkills", "MaxConcurrent"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_unsupported_and_missing_files() {
    let dir = TempDir::new().expect("tempdir");
    let xlsx = write(dir.path(), "clients.xlsx", "not really a workbook");
    assert!(matches!(
        load_table(&xlsx),
        Err(IngestError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        load_table(&dir.path().join("absent.csv")),
        Err(IngestError::FileNotFound { .. })
    ));
}

#[test]
fn unclassifiable_files_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(dir.path(), "people.csv", "Name,Email\nAda,ada@example.com\n");
    assert!(matches!(
        load_table(&path),
        Err(IngestError::Classification { .. })
    ));
}

#[test]
fn assignment_keeps_the_last_file_per_entity() {
    let dir = TempDir::new().expect("tempdir");
    let first = write(dir.path(), "a.csv", TASKS);
    let workers = write(dir.path(), "b.csv", WORKERS);
    let second = write(
        dir.path(),
        "c.csv",
        "TaskID,TaskName,Duration,RequiredSkills,MaxConcurrent\nT7,Ship,1,,1\nT8,Test,1,,1\n",
    );
    let junk = write(dir.path(), "notes.csv", "Note\nhello\n");

    let assignment = assign_files(&[first, workers, second.clone(), junk.clone()]);

    let tasks = assignment.table(EntityType::Tasks).expect("tasks assigned");
    assert_eq!(tasks.path, second);
    assert_eq!(tasks.rows.len(), 2);
    assert!(assignment.table(EntityType::Workers).is_some());
    assert_eq!(assignment.unassigned(), vec![EntityType::Clients]);
    assert_eq!(assignment.rejected.len(), 1);
    assert_eq!(assignment.rejected[0].0, junk);

    let dataset = assignment.into_dataset();
    assert!(dataset.clients.is_empty());
    assert_eq!(dataset.workers.len(), 1);
    assert_eq!(dataset.tasks.len(), 2);
}

#[test]
fn assignment_reports_every_file_in_input_order() {
    let dir = TempDir::new().expect("tempdir");
    let junk = write(dir.path(), "notes.txt", "hello");
    let first = write(dir.path(), "tasks-old.csv", TASKS);
    let clients = write(dir.path(), "clients.csv", CLIENTS);
    let second = write(dir.path(), "tasks-new.csv", TASKS);

    let assignment = assign_files(&[&junk, &first, &clients, &second]);

    let paths: Vec<_> = assignment.files.iter().map(|file| file.path.clone()).collect();
    assert_eq!(paths, vec![junk, first, clients, second.clone()]);
    assert!(matches!(
        assignment.files[0].outcome,
        FileOutcome::Rejected { .. }
    ));
    assert_eq!(
        assignment.files[1].outcome,
        FileOutcome::Replaced {
            entity: EntityType::Tasks,
            rows: 1,
            by: second,
        }
    );
    assert_eq!(
        assignment.files[2].outcome,
        FileOutcome::Assigned {
            entity: EntityType::Clients,
            rows: 2,
        }
    );
    assert_eq!(
        assignment.files[3].outcome,
        FileOutcome::Assigned {
            entity: EntityType::Tasks,
            rows: 1,
        }
    );
}
