//! Field-level schema checks.
//!
//! Each entity has a fixed field list. Required text fields must be present
//! and non-empty; numeric fields are coerced and then checked for being a
//! whole number within range. Optional fields never produce errors.

use std::borrow::Cow;

use sheet_model::{EntityType, Row, ValidationError};

use crate::coerce::{Coerced, coerce_number};
use crate::issue::Issue;

/// Constraint applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Must be present and non-empty.
    RequiredText,
    /// May be absent; `default` stands in for downstream checks.
    OptionalText { default: Option<&'static str> },
    /// Coerced to a whole number within the inclusive bounds.
    Integer { min: Option<i64>, max: Option<i64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: FieldRule,
}

const fn required(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        rule: FieldRule::RequiredText,
    }
}

const fn optional(name: &'static str, default: Option<&'static str>) -> FieldSpec {
    FieldSpec {
        name,
        rule: FieldRule::OptionalText { default },
    }
}

const fn integer(name: &'static str, min: Option<i64>, max: Option<i64>) -> FieldSpec {
    FieldSpec {
        name,
        rule: FieldRule::Integer { min, max },
    }
}

const CLIENT_FIELDS: &[FieldSpec] = &[
    required("ClientID"),
    required("ClientName"),
    integer("PriorityLevel", Some(1), Some(5)),
    optional("RequestedTaskIDs", Some("")),
    optional("GroupTag", None),
    optional("AttributesJSON", None),
];

const WORKER_FIELDS: &[FieldSpec] = &[
    required("WorkerID"),
    required("WorkerName"),
    optional("Skills", Some("")),
    optional("AvailableSlots", Some("[]")),
    integer("MaxLoadPerPhase", Some(0), None),
    optional("WorkerGroup", None),
    optional("QualificationLevel", None),
];

const TASK_FIELDS: &[FieldSpec] = &[
    required("TaskID"),
    required("TaskName"),
    optional("Category", None),
    integer("Duration", Some(1), None),
    optional("RequiredSkills", Some("")),
    optional("PreferredPhases", None),
    integer("MaxConcurrent", Some(1), None),
];

/// Schema fields for an entity, in check order.
pub fn fields(entity: EntityType) -> &'static [FieldSpec] {
    match entity {
        EntityType::Clients => CLIENT_FIELDS,
        EntityType::Workers => WORKER_FIELDS,
        EntityType::Tasks => TASK_FIELDS,
    }
}

/// Text of a field, falling back to the schema default when absent.
pub fn text_or_default<'a>(
    row: &'a Row,
    entity: EntityType,
    field: &str,
) -> Option<Cow<'a, str>> {
    if let Some(text) = row.text(field) {
        return Some(text);
    }
    fields(entity)
        .iter()
        .find(|spec| spec.name == field)
        .and_then(|spec| match spec.rule {
            FieldRule::OptionalText { default } => default.map(Cow::Borrowed),
            _ => None,
        })
}

/// Check every row of every table.
pub fn check(dataset: &sheet_model::Dataset) -> Vec<ValidationError> {
    EntityType::ALL
        .iter()
        .flat_map(|entity| check_table(*entity, dataset.rows(*entity)))
        .collect()
}

/// Check the rows of a single table.
pub fn check_table(entity: EntityType, rows: &[Row]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        for issue in check_row(entity, row) {
            errors.push(issue.at(entity, idx));
        }
    }
    errors
}

/// Check one row, yielding at most one issue per field.
pub fn check_row(entity: EntityType, row: &Row) -> Vec<Issue> {
    fields(entity)
        .iter()
        .filter_map(|spec| check_field(spec, row))
        .collect()
}

fn check_field(spec: &FieldSpec, row: &Row) -> Option<Issue> {
    let field = spec.name;
    match spec.rule {
        FieldRule::OptionalText { .. } => None,
        FieldRule::RequiredText => match row.text(field) {
            None => Some(Issue::Required { field }),
            Some(text) if text.is_empty() => Some(Issue::EmptyText { field }),
            Some(_) => None,
        },
        FieldRule::Integer { min, max } => {
            let value = match coerce_number(row.get(field)) {
                Coerced::Number(value) => value,
                Coerced::Absent => return Some(Issue::Required { field }),
                Coerced::NotANumber => {
                    let value = row.text(field).unwrap_or_default().into_owned();
                    return Some(Issue::NotANumber { field, value });
                }
            };
            check_integer(field, value, min, max)
        }
    }
}

fn check_integer(
    field: &'static str,
    value: f64,
    min: Option<i64>,
    max: Option<i64>,
) -> Option<Issue> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Some(Issue::NotAnInteger { field, value });
    }
    if let Some(min) = min {
        if value < min as f64 {
            return Some(Issue::BelowMinimum { field, min, value });
        }
    }
    if let Some(max) = max {
        if value > max as f64 {
            return Some(Issue::AboveMaximum { field, max, value });
        }
    }
    None
}
