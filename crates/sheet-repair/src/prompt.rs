//! Prompt construction for the three repair flows.

use std::fmt::Write as _;

use serde::Serialize;
use sheet_model::{EntityType, ModelError, Row, ValidationError};
use sheet_validate::Workspace;

use crate::error::Result;
use crate::rules::{BusinessRule, RuleBook};

/// System instruction sent with single-cell suggestion requests.
pub const CELL_SYSTEM_INSTRUCTION: &str = "You are a helpful data cleaning assistant. When asked for suggestions, ALWAYS return a JSON object with a 'choices' key, whose value is an array of 1-3 objects. Each object must have a 'label' (string, for display) and a 'value' (string, to be used as the cell value). Example: { \"choices\": [ { \"label\": \"value1\", \"value\": \"value1\" }, { \"label\": \"value2\", \"value\": \"value2\" } ] }. Do not explain, do not return anything except this JSON object.\n\nSpecial rule: If the field is 'AttributesJSON' and the value is vague, plain text, or not a valid JSON object, return a suggestion where 'label' is a pretty-printed JSON object (e.g. {\"message\": \"the original value\"}) and 'value' is the stringified version of that object.";

/// System instruction sent with row and table fix requests.
pub const BULK_SYSTEM_INSTRUCTION: &str = "You are a helpful data cleaning assistant. When asked for a bulk fix, ALWAYS return a JSON array of rows, with the same number of rows and columns as the input. Do not explain, do not return anything except this JSON array.";

const FIXING_GUIDANCE: &str = "- If a value is missing, fill it with a plausible guess.
- If a value is malformed (e.g. not a number, invalid JSON), fix the format.
- If an ID is duplicated, make it unique by appending a suffix.
- If a reference is unknown, try to match it to the closest valid value or remove it.
- If a value is out of range, bring it into the valid range.
- If a JSON field is broken, repair the JSON.";

/// A prompt plus the system instruction it must be sent with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairPrompt {
    pub system_instruction: &'static str,
    pub prompt: String,
}

/// Builds prompts from workspace state and the active rules of a rule book.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder<'a> {
    rules: &'a RuleBook,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(rules: &'a RuleBook) -> Self {
        Self { rules }
    }

    pub fn table(&self, workspace: &Workspace, entity: EntityType) -> Result<RepairPrompt> {
        let errors: Vec<ValidationError> = workspace.errors_for(entity).cloned().collect();
        table_fix_prompt(
            entity,
            workspace.rows(entity),
            &errors,
            &self.rules.active_rules(Some(entity)),
        )
    }

    pub fn row(
        &self,
        workspace: &Workspace,
        entity: EntityType,
        row_index: usize,
    ) -> Result<RepairPrompt> {
        let row = lookup_row(workspace, entity, row_index)?;
        let errors: Vec<ValidationError> =
            workspace.errors_for_row(entity, row_index).cloned().collect();
        row_fix_prompt(
            entity,
            row_index,
            row,
            &errors,
            &self.rules.active_rules(Some(entity)),
        )
    }

    pub fn cell(
        &self,
        workspace: &Workspace,
        entity: EntityType,
        row_index: usize,
        field: &str,
    ) -> Result<RepairPrompt> {
        let row = lookup_row(workspace, entity, row_index)?;
        let errors: Vec<ValidationError> = workspace
            .errors_for_cell(entity, row_index, field)
            .cloned()
            .collect();
        cell_suggestion_prompt(
            entity,
            row,
            field,
            &errors,
            &self.rules.active_rules(Some(entity)),
        )
    }
}

pub(crate) fn lookup_row(workspace: &Workspace, entity: EntityType, index: usize) -> Result<&Row> {
    let rows = workspace.rows(entity);
    rows.get(index).ok_or_else(|| {
        ModelError::RowOutOfRange {
            entity,
            index,
            len: rows.len(),
        }
        .into()
    })
}

/// Prompt asking for a corrected copy of a whole table.
pub fn table_fix_prompt(
    entity: EntityType,
    rows: &[Row],
    errors: &[ValidationError],
    rules: &[&BusinessRule],
) -> Result<RepairPrompt> {
    let mut prompt = format!(
        "You are a data cleaning assistant. Your job is to fix errors in a {entity} table.\n\n\
         Here is the table data (as JSON array):\n{}\n\n\
         Here are the validation errors (with row numbers and fields):\n{}\n\n\
         For each row with errors, suggest a corrected version.\n{FIXING_GUIDANCE}\n\n\
         Return ONLY the corrected table as a JSON array, with the same number of rows and columns as the input.",
        serde_json::to_string_pretty(rows)?,
        serde_json::to_string_pretty(errors)?,
    );
    append_rules(&mut prompt, rules);
    Ok(RepairPrompt {
        system_instruction: BULK_SYSTEM_INSTRUCTION,
        prompt,
    })
}

/// Prompt asking for a corrected copy of one row.
pub fn row_fix_prompt(
    entity: EntityType,
    row_index: usize,
    row: &Row,
    errors: &[ValidationError],
    rules: &[&BusinessRule],
) -> Result<RepairPrompt> {
    let mut prompt = format!(
        "You are a data cleaning assistant. Your job is to fix errors in row {} of a {entity} table.\n\n\
         Here is the row (as a JSON array with one object):\n{}\n\n\
         Here are the validation errors for this row:\n{}\n\n\
         {FIXING_GUIDANCE}\n\n\
         Return ONLY the corrected row as a JSON array with one object, keeping the same columns.",
        row_index + 1,
        serde_json::to_string_pretty(std::slice::from_ref(row))?,
        serde_json::to_string_pretty(errors)?,
    );
    append_rules(&mut prompt, rules);
    Ok(RepairPrompt {
        system_instruction: BULK_SYSTEM_INSTRUCTION,
        prompt,
    })
}

/// Prompt asking for one to three replacement values for a cell.
pub fn cell_suggestion_prompt(
    entity: EntityType,
    row: &Row,
    field: &str,
    errors: &[ValidationError],
    rules: &[&BusinessRule],
) -> Result<RepairPrompt> {
    let current = row.text(field).unwrap_or_default();
    let problems = if errors.is_empty() {
        "none reported".to_string()
    } else {
        errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };
    let mut prompt = format!(
        "Suggest corrected values for the '{field}' field of a {entity} row.\n\n\
         Current value: {}\n\
         Problems: {problems}\n\n\
         Full row for context:\n{}",
        serde_json::to_string(current.as_ref())?,
        serde_json::to_string_pretty(row)?,
    );
    append_rules(&mut prompt, rules);
    Ok(RepairPrompt {
        system_instruction: CELL_SYSTEM_INSTRUCTION,
        prompt,
    })
}

/// Append the active business rules as a numbered list.
fn append_rules(prompt: &mut String, rules: &[&BusinessRule]) {
    if rules.is_empty() {
        return;
    }
    prompt.push_str("\n\nApply these business rules (highest priority first):");
    for (idx, rule) in rules.iter().enumerate() {
        let _ = write!(prompt, "\n{}. {}", idx + 1, rule.name);
        if let Some(field) = &rule.field {
            let _ = write!(prompt, " [{field}]");
        }
        let _ = write!(prompt, ": {}", rule.rule);
    }
}
