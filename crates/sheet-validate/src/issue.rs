//! Validation issue types.
//!
//! Each variant carries only the data its message needs. Checks produce
//! `Issue`s and attach them to a row with [`Issue::at`].

use sheet_model::{EntityType, ErrorCategory, ValidationError};

#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    // Schema checks
    /// Required field is absent from the row
    Required { field: &'static str },
    /// Required text field is present but empty
    EmptyText { field: &'static str },
    /// Numeric field does not read as a number
    NotANumber { field: &'static str, value: String },
    /// Numeric field is not a whole number
    NotAnInteger { field: &'static str, value: f64 },
    /// Numeric field below its lower bound
    BelowMinimum {
        field: &'static str,
        min: i64,
        value: f64,
    },
    /// Numeric field above its upper bound
    AboveMaximum {
        field: &'static str,
        max: i64,
        value: f64,
    },

    // Cross-reference checks
    /// Business key shared with another row of the same table
    DuplicateKey { field: &'static str },
    /// Referenced task does not exist
    UnknownTask { field: &'static str, task_id: String },

    // Structural checks
    /// Cell does not parse as JSON
    InvalidJson { field: &'static str },
    /// Embedded list is not a list of numbers
    MalformedList { field: &'static str },
    /// Max load per phase is larger than the number of available slots
    Overloaded {
        field: &'static str,
        slots: usize,
        max_load: f64,
    },
}

impl Issue {
    pub fn field(&self) -> &'static str {
        match self {
            Issue::Required { field }
            | Issue::EmptyText { field }
            | Issue::NotANumber { field, .. }
            | Issue::NotAnInteger { field, .. }
            | Issue::BelowMinimum { field, .. }
            | Issue::AboveMaximum { field, .. }
            | Issue::DuplicateKey { field }
            | Issue::UnknownTask { field, .. }
            | Issue::InvalidJson { field }
            | Issue::MalformedList { field }
            | Issue::Overloaded { field, .. } => *field,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Issue::Required { .. }
            | Issue::EmptyText { .. }
            | Issue::NotANumber { .. }
            | Issue::NotAnInteger { .. }
            | Issue::BelowMinimum { .. }
            | Issue::AboveMaximum { .. } => ErrorCategory::Schema,
            Issue::DuplicateKey { .. } => ErrorCategory::Duplicate,
            Issue::UnknownTask { .. } => ErrorCategory::Reference,
            Issue::InvalidJson { .. } => ErrorCategory::Json,
            Issue::MalformedList { .. } => ErrorCategory::List,
            Issue::Overloaded { .. } => ErrorCategory::Capacity,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::Required { field } => format!("{field} is required"),
            Issue::EmptyText { field } => format!("{field} must not be empty"),
            Issue::NotANumber { field, value } => {
                format!("{field} must be a number (got '{value}')")
            }
            Issue::NotAnInteger { field, value } => {
                format!("{field} must be a whole number (got {value})")
            }
            Issue::BelowMinimum { field, min, value } => {
                format!("{field} must be at least {min} (got {value})")
            }
            Issue::AboveMaximum { field, max, value } => {
                format!("{field} must be at most {max} (got {value})")
            }
            Issue::DuplicateKey { field } => format!("Duplicate {field}"),
            Issue::UnknownTask { task_id, .. } => format!("Unknown TaskID '{task_id}'"),
            Issue::InvalidJson { .. } => "Invalid JSON".to_string(),
            Issue::MalformedList { .. } => "Malformed list".to_string(),
            Issue::Overloaded {
                slots, max_load, ..
            } => format!(
                "Load exceeds available slots ({max_load} per phase, {slots} slots available)"
            ),
        }
    }

    /// Attach this issue to a row.
    pub fn at(&self, entity: EntityType, row_index: usize) -> ValidationError {
        ValidationError::new(
            entity,
            row_index,
            self.field(),
            self.message(),
            self.category(),
        )
    }
}
