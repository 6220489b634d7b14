use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info_span, warn};

use sheet_ingest::{FileOutcome, assign_files, load_table};
use sheet_model::{EntityType, ValidationError};
use sheet_repair::{
    NewRule, PromptBuilder, RepairPrompt, RepairReview, RepairService, ReplayOracle, RuleBook,
    RuleScope, Suggestion, apply_suggestion, default_rules_path, load_rule_book, read_rule_book,
    save_rule_book,
};
use sheet_validate::{ValidationSummary, Workspace};

use crate::cli::{AddRuleArgs, FilesArgs, PromptArgs, ReviewArgs, RulesCommand, ValidateArgs};
use crate::logging::redact_value;

/// Outcome of loading one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub table: Option<EntityType>,
    pub rows: Option<usize>,
    pub error: Option<String>,
    /// Set when the file loaded but a later file took its table.
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub files: Vec<FileReport>,
    pub summary: ValidationSummary,
    pub errors: Vec<ValidationError>,
}

impl ValidateReport {
    /// Validation errors or rejected files both fail the run.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.files.iter().any(|file| file.error.is_some())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReviewOutcome {
    Cell {
        entity: EntityType,
        row_index: usize,
        field: String,
        suggestions: Vec<Suggestion>,
        applied: Option<Suggestion>,
        remaining: ValidationSummary,
    },
    Rows {
        review: Option<RepairReview>,
        applied: usize,
        remaining: ValidationSummary,
    },
}

impl ReviewOutcome {
    pub fn has_errors(&self) -> bool {
        let remaining = match self {
            Self::Cell { remaining, .. } | Self::Rows { remaining, .. } => remaining,
        };
        !remaining.is_clean()
    }
}

pub enum RulesOutcome {
    Listed(RuleBook, Option<EntityType>),
    Changed(String),
}

/// Load every file into a fresh workspace; reports follow input order.
pub fn load_workspace(files: &[PathBuf]) -> (Workspace, Vec<FileReport>) {
    let assignment = assign_files(files);
    let reports = assignment
        .files
        .iter()
        .map(|file| {
            let (table, rows, error, note) = match &file.outcome {
                FileOutcome::Assigned { entity, rows } => (Some(*entity), Some(*rows), None, None),
                FileOutcome::Replaced { entity, rows, by } => (
                    Some(*entity),
                    Some(*rows),
                    None,
                    Some(format!("replaced by {}", by.display())),
                ),
                FileOutcome::Rejected { message } => (None, None, Some(message.clone()), None),
            };
            FileReport {
                path: file.path.clone(),
                table,
                rows,
                error,
                note,
            }
        })
        .collect();
    for entity in assignment.unassigned() {
        debug!(entity = %entity, "no file supplied, table left empty");
    }
    (Workspace::from_dataset(assignment.into_dataset()), reports)
}

pub fn run_validate(args: &ValidateArgs) -> ValidateReport {
    let span = info_span!("validate", files = args.input.files.len());
    let _guard = span.enter();
    let (workspace, files) = load_workspace(&args.input.files);
    ValidateReport {
        files,
        summary: workspace.summary(),
        errors: workspace.errors().to_vec(),
    }
}

/// Classify each file on its own; unlike `validate`, nothing is replaced.
pub fn run_classify(args: &FilesArgs) -> Vec<FileReport> {
    args.files
        .iter()
        .map(|path| match load_table(path) {
            Ok(table) => FileReport {
                path: path.clone(),
                table: Some(table.entity),
                rows: Some(table.rows.len()),
                error: None,
                note: None,
            },
            Err(error) => FileReport {
                path: path.clone(),
                table: None,
                rows: None,
                error: Some(error.to_string()),
                note: None,
            },
        })
        .collect()
}

pub fn run_prompt(args: &PromptArgs, rules: &RuleBook) -> Result<RepairPrompt> {
    let (workspace, files) = load_workspace(&args.input.files);
    warn_rejected(&files);
    let prompts = PromptBuilder::new(rules);
    let entity = args.target.entity;
    let prompt = match (args.target.row, args.field.as_deref()) {
        (Some(row), Some(field)) => prompts.cell(&workspace, entity, row, field),
        (Some(row), None) => prompts.row(&workspace, entity, row),
        (None, _) => prompts.table(&workspace, entity),
    };
    prompt.context("build repair prompt")
}

pub fn run_review(args: &ReviewArgs, rules: &RuleBook) -> Result<ReviewOutcome> {
    let (mut workspace, files) = load_workspace(&args.input.files);
    warn_rejected(&files);
    let response = read_response(&args.response)?;
    let service = RepairService::new(ReplayOracle::new(response), rules);
    let entity = args.target.entity;

    if let (Some(row), Some(field)) = (args.target.row, args.field.as_deref()) {
        let suggestions = service
            .suggest_cell(&workspace, entity, row, field)
            .context("request cell suggestions")?;
        let applied = match args.select.as_slice() {
            [] => None,
            [choice] => {
                let suggestion = suggestions
                    .get(*choice)
                    .ok_or_else(|| anyhow!("no suggestion number {choice}"))?;
                apply_suggestion(&mut workspace, entity, row, field, suggestion)?;
                tracing::trace!(value = redact_value(&suggestion.value), "applied suggestion");
                Some(suggestion.clone())
            }
            _ => bail!("select exactly one suggestion for a cell"),
        };
        return Ok(ReviewOutcome::Cell {
            entity,
            row_index: row,
            field: field.to_string(),
            suggestions,
            applied,
            remaining: workspace.summary(),
        });
    }

    let review = match args.target.row {
        Some(row) => service.fix_row(&workspace, entity, row),
        None => service.fix_table(&workspace, entity),
    }
    .context("request repair suggestion")?;

    let mut applied = 0;
    if let Some(review) = &review {
        for change in review.changes() {
            tracing::trace!(
                row = change.row_index,
                field = %change.field,
                value = redact_value(
                    &change
                        .suggested
                        .as_ref()
                        .map(|value| value.as_text().into_owned())
                        .unwrap_or_default()
                ),
                "suggested change"
            );
        }
        if args.apply {
            applied = review.apply_all(&mut workspace)?;
        } else if !args.select.is_empty() {
            applied = review.apply_selected(&mut workspace, &args.select)?;
        }
    }
    Ok(ReviewOutcome::Rows {
        review,
        applied,
        remaining: workspace.summary(),
    })
}

pub fn run_rules(command: &RulesCommand, rules_path: Option<&Path>) -> Result<RulesOutcome> {
    let path = resolve_rules_path(rules_path)?;
    match command {
        RulesCommand::List { entity } => Ok(RulesOutcome::Listed(load_rule_book(&path), *entity)),
        RulesCommand::Add(args) => {
            let mut book = read_rule_book(&path)?;
            let id = book.add_rule(new_rule(args)?)?.id.clone();
            save_rule_book(&book, &path)?;
            Ok(RulesOutcome::Changed(format!("Added rule {id}")))
        }
        RulesCommand::Toggle { id } => {
            let mut book = read_rule_book(&path)?;
            let active = book.toggle_rule(id)?;
            save_rule_book(&book, &path)?;
            let state = if active { "active" } else { "inactive" };
            Ok(RulesOutcome::Changed(format!("Rule {id} is now {state}")))
        }
        RulesCommand::Delete { id } => {
            let mut book = read_rule_book(&path)?;
            let removed = book.delete_rule(id)?;
            save_rule_book(&book, &path)?;
            Ok(RulesOutcome::Changed(format!(
                "Deleted rule {id} ({})",
                removed.name
            )))
        }
    }
}

/// Rule book for prompt-building commands; unreadable books fall back to defaults.
pub fn rule_book(rules_path: Option<&Path>) -> RuleBook {
    match resolve_rules_path(rules_path) {
        Ok(path) => load_rule_book(&path),
        Err(error) => {
            warn!("{error}, using default rules");
            RuleBook::default()
        }
    }
}

fn resolve_rules_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_rules_path().ok_or_else(|| anyhow!(sheet_repair::RepairError::NoConfigDir)),
    }
}

fn new_rule(args: &AddRuleArgs) -> Result<NewRule> {
    let scope: RuleScope = args.scope.parse()?;
    Ok(NewRule {
        name: args.name.clone(),
        description: args.description.clone(),
        scope,
        field: args.field.clone(),
        rule: args.rule.clone(),
        is_active: !args.inactive,
        priority: args.priority,
    })
}

/// Saved responses may be JSON or the model's raw text.
fn read_response(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read oracle response {}", path.display()))?;
    Ok(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
}

fn warn_rejected(files: &[FileReport]) {
    for file in files {
        if let Some(error) = &file.error {
            warn!("{error}");
        }
    }
}
