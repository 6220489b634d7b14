//! Command tests against CSV fixtures on disk.

use std::fs;
use std::path::{Path, PathBuf};

use sheet_cli::cli::{
    AddRuleArgs, FilesArgs, OutputFormatArg, PromptArgs, ReviewArgs, RulesCommand, TargetArgs,
    ValidateArgs,
};
use sheet_cli::commands::{
    ReviewOutcome, RulesOutcome, rule_book, run_classify, run_prompt, run_review, run_rules,
    run_validate,
};
use sheet_cli::summary::{files_table, rules_table, summary_table};
use sheet_model::{EntityType, ErrorCategory};
use sheet_repair::RuleBook;
use tempfile::TempDir;

const CLIENTS: &str = "ClientID,ClientName,PriorityLevel,RequestedTaskIDs\n\
C1,Acme,9,T1\n\
C2,Globex,2,T1\n";

const TASKS: &str = "TaskID,TaskName,Duration,RequiredSkills,MaxConcurrent\n\
T1,Build,2,rust,1\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn fixture(dir: &TempDir) -> Vec<PathBuf> {
    vec![
        write(dir.path(), "clients.csv", CLIENTS),
        write(dir.path(), "tasks.csv", TASKS),
    ]
}

fn target(entity: EntityType, row: Option<usize>) -> TargetArgs {
    TargetArgs { entity, row }
}

fn review_args(files: Vec<PathBuf>, response: PathBuf, row: Option<usize>) -> ReviewArgs {
    ReviewArgs {
        input: FilesArgs { files },
        target: target(EntityType::Clients, row),
        field: None,
        response,
        apply: false,
        select: Vec::new(),
        format: OutputFormatArg::Table,
    }
}

#[test]
fn validate_reports_files_and_errors() {
    let dir = TempDir::new().expect("tempdir");
    let mut files = fixture(&dir);
    files.push(write(dir.path(), "notes.txt", "hello"));

    let report = run_validate(&ValidateArgs {
        input: FilesArgs { files },
        format: OutputFormatArg::Json,
    });

    assert_eq!(report.files.len(), 3);
    assert_eq!(
        report.files.iter().filter(|file| file.error.is_some()).count(),
        1
    );
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "PriorityLevel");
    assert_eq!(report.summary.count_in(EntityType::Clients, ErrorCategory::Schema), 1);
    assert!(report.has_errors());

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["summary"]["total"], 1);
}

#[test]
fn clean_tables_pass_validation() {
    let dir = TempDir::new().expect("tempdir");
    let files = vec![
        write(
            dir.path(),
            "clients.csv",
            "ClientID,ClientName,PriorityLevel,RequestedTaskIDs\nC1,Acme,3,T1\n",
        ),
        write(dir.path(), "tasks.csv", TASKS),
    ];
    let report = run_validate(&ValidateArgs {
        input: FilesArgs { files },
        format: OutputFormatArg::Table,
    });
    assert!(!report.has_errors());
    assert!(report.summary.is_clean());
}

#[test]
fn classify_lists_each_file() {
    let dir = TempDir::new().expect("tempdir");
    let mut files = fixture(&dir);
    files.push(write(dir.path(), "mystery.csv", "A,B\n1,2\n"));

    let reports = run_classify(&FilesArgs { files });
    let tables: Vec<Option<EntityType>> = reports.iter().map(|report| report.table).collect();
    assert_eq!(
        tables,
        vec![Some(EntityType::Clients), Some(EntityType::Tasks), None]
    );

    let rendered = files_table(&reports).force_no_tty().to_string();
    assert!(rendered.contains("mystery.csv"));
    assert!(rendered.contains("Clients"));
}

#[test]
fn prompt_targets_table_row_and_cell() {
    let dir = TempDir::new().expect("tempdir");
    let files = fixture(&dir);
    let rules = RuleBook::empty();

    let table = run_prompt(
        &PromptArgs {
            input: FilesArgs {
                files: files.clone(),
            },
            target: target(EntityType::Clients, None),
            field: None,
            format: OutputFormatArg::Table,
        },
        &rules,
    )
    .expect("table prompt");
    assert!(table.prompt.contains("\"ClientID\": \"C2\""));

    let row = run_prompt(
        &PromptArgs {
            input: FilesArgs {
                files: files.clone(),
            },
            target: target(EntityType::Clients, Some(0)),
            field: None,
            format: OutputFormatArg::Table,
        },
        &rules,
    )
    .expect("row prompt");
    assert!(row.prompt.contains("row 1 of a clients table"));
    assert!(!row.prompt.contains("\"C2\""));

    let cell = run_prompt(
        &PromptArgs {
            input: FilesArgs {
                files: files.clone(),
            },
            target: target(EntityType::Clients, Some(0)),
            field: Some("PriorityLevel".to_string()),
            format: OutputFormatArg::Json,
        },
        &rules,
    )
    .expect("cell prompt");
    assert!(cell.prompt.contains("Current value: \"9\""));

    let missing = run_prompt(
        &PromptArgs {
            input: FilesArgs { files },
            target: target(EntityType::Clients, Some(7)),
            field: None,
            format: OutputFormatArg::Table,
        },
        &rules,
    );
    assert!(missing.is_err());
}

#[test]
fn review_applies_a_saved_table_fix() {
    let dir = TempDir::new().expect("tempdir");
    let files = fixture(&dir);
    let response = write(
        dir.path(),
        "response.json",
        r#"[
            {"ClientID": "C1", "ClientName": "Acme", "PriorityLevel": "3", "RequestedTaskIDs": "T1"},
            {"ClientID": "C2", "ClientName": "Globex", "PriorityLevel": "2", "RequestedTaskIDs": "T1"}
        ]"#,
    );

    let mut args = review_args(files, response, None);
    let preview = run_review(&args, &RuleBook::empty()).expect("preview");
    let ReviewOutcome::Rows { review, applied, .. } = &preview else {
        panic!("expected a rows review");
    };
    let review = review.as_ref().expect("usable review");
    assert_eq!(review.changes().len(), 1);
    assert_eq!(review.changes()[0].field, "PriorityLevel");
    assert_eq!(*applied, 0);
    assert!(preview.has_errors());

    args.apply = true;
    let outcome = run_review(&args, &RuleBook::empty()).expect("apply");
    let ReviewOutcome::Rows { applied, .. } = &outcome else {
        panic!("expected a rows review");
    };
    assert_eq!(*applied, 1);
    assert!(!outcome.has_errors());
}

#[test]
fn review_reads_fenced_model_text() {
    let dir = TempDir::new().expect("tempdir");
    let files = fixture(&dir);
    let response = write(
        dir.path(),
        "response.txt",
        "Here is the fixed row:\n```json\n[{\"ClientID\": \"C1\", \"ClientName\": \"Acme\", \"PriorityLevel\": \"4\", \"RequestedTaskIDs\": \"T1\"}]\n```",
    );

    let mut args = review_args(files, response, Some(0));
    args.select = vec![0];
    let outcome = run_review(&args, &RuleBook::empty()).expect("review row");
    let ReviewOutcome::Rows { review, applied, .. } = &outcome else {
        panic!("expected a rows review");
    };
    assert!(review.is_some());
    assert_eq!(*applied, 1);
    assert!(!outcome.has_errors());
}

#[test]
fn review_applies_one_cell_suggestion() {
    let dir = TempDir::new().expect("tempdir");
    let files = fixture(&dir);
    let response = write(
        dir.path(),
        "choices.json",
        r#"{"choices": [{"label": "Five", "value": "5"}, {"label": "Three", "value": "3"}]}"#,
    );

    let mut args = review_args(files, response, Some(0));
    args.field = Some("PriorityLevel".to_string());
    args.select = vec![1];
    let outcome = run_review(&args, &RuleBook::empty()).expect("cell review");
    let ReviewOutcome::Cell {
        suggestions,
        applied,
        remaining,
        ..
    } = &outcome
    else {
        panic!("expected a cell review");
    };
    assert_eq!(suggestions.len(), 2);
    assert_eq!(applied.as_ref().map(|s| s.value.as_str()), Some("3"));
    assert!(remaining.is_clean());

    args.select = vec![5];
    assert!(run_review(&args, &RuleBook::empty()).is_err());
}

#[test]
fn rules_commands_persist_changes() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("rules.toml");

    let added = run_rules(
        &RulesCommand::Add(AddRuleArgs {
            name: "Names".to_string(),
            rule: "Title-case client names.".to_string(),
            scope: "clients".to_string(),
            field: Some("ClientName".to_string()),
            description: String::new(),
            priority: 9,
            inactive: false,
        }),
        Some(&path),
    )
    .expect("add rule");
    assert!(
        matches!(added, RulesOutcome::Changed(ref message) if message.starts_with("Added rule"))
    );
    assert!(path.exists());

    let book = rule_book(Some(&path));
    assert_eq!(book.rules.len(), 4);
    assert_eq!(book.active_rules(Some(EntityType::Clients))[0].name, "Names");

    let toggled = run_rules(&RulesCommand::Toggle { id: "1".to_string() }, Some(&path))
        .expect("toggle rule");
    assert!(matches!(toggled, RulesOutcome::Changed(ref message) if message.ends_with("inactive")));
    run_rules(&RulesCommand::Delete { id: "2".to_string() }, Some(&path)).expect("delete rule");
    assert!(
        run_rules(&RulesCommand::Delete { id: "2".to_string() }, Some(&path)).is_err()
    );

    let RulesOutcome::Listed(book, entity) = run_rules(
        &RulesCommand::List {
            entity: Some(EntityType::Clients),
        },
        Some(&path),
    )
    .expect("list rules") else {
        panic!("expected a listing");
    };
    assert_eq!(book.rules.len(), 3);
    let rendered = rules_table(&book, entity).force_no_tty().to_string();
    assert!(rendered.contains("Names"));
    assert!(!rendered.contains("Client Priority Validation"));
}

#[test]
fn malformed_rule_books_block_mutations_but_not_prompts() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(dir.path(), "rules.toml", "rules = 3");

    assert!(run_rules(&RulesCommand::Toggle { id: "1".to_string() }, Some(&path)).is_err());
    assert_eq!(rule_book(Some(&path)).rules.len(), 3);
}

#[test]
fn summary_table_has_a_row_per_table() {
    let dir = TempDir::new().expect("tempdir");
    let report = run_validate(&ValidateArgs {
        input: FilesArgs {
            files: fixture(&dir),
        },
        format: OutputFormatArg::Table,
    });
    let rendered = summary_table(&report.summary).force_no_tty().to_string();
    for label in ["Clients", "Workers", "Tasks", "TOTAL"] {
        assert!(rendered.contains(label), "missing {label}");
    }
}

#[test]
fn replaced_files_stay_in_the_report() {
    let dir = TempDir::new().expect("tempdir");
    let tasks = write(dir.path(), "tasks.csv", TASKS);
    let old = write(dir.path(), "clients-old.csv", CLIENTS);
    let new = write(
        dir.path(),
        "clients-new.csv",
        "ClientID,ClientName,PriorityLevel,RequestedTaskIDs\nC1,Acme,3,T1\n",
    );

    let report = run_validate(&ValidateArgs {
        input: FilesArgs {
            files: vec![tasks.clone(), old.clone(), new.clone()],
        },
        format: OutputFormatArg::Table,
    });

    let paths: Vec<&PathBuf> = report.files.iter().map(|file| &file.path).collect();
    assert_eq!(paths, vec![&tasks, &old, &new]);
    assert_eq!(report.files[1].table, Some(EntityType::Clients));
    assert_eq!(report.files[1].rows, Some(2));
    assert!(
        report.files[1]
            .note
            .as_deref()
            .is_some_and(|note| note.starts_with("replaced by"))
    );
    assert!(report.files[2].note.is_none());
    assert!(!report.has_errors());
}
