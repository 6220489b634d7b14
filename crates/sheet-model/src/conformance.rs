use serde::{Deserialize, Serialize};

use crate::EntityType;

/// Which family of check produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Field-level schema violation (required, type, range).
    Schema,
    /// Business key shared by more than one row.
    Duplicate,
    /// Reference to a row that does not exist in another table.
    Reference,
    /// Cell that should hold JSON but does not parse.
    Json,
    /// Embedded list that does not parse as numbers.
    List,
    /// Capacity constraint violated.
    Capacity,
}

impl ErrorCategory {
    /// Categories in the order their checks run.
    pub const ALL: [ErrorCategory; 6] = [
        Self::Schema,
        Self::Duplicate,
        Self::Reference,
        Self::Json,
        Self::List,
        Self::Capacity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Schema => "Schema",
            Self::Duplicate => "Duplicate",
            Self::Reference => "Reference",
            Self::Json => "JSON",
            Self::List => "List",
            Self::Capacity => "Capacity",
        }
    }
}

/// A single rule violation tied to one entity, row and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub entity: EntityType,
    /// Zero-based row index within the entity's table.
    pub row_index: usize,
    pub field: String,
    pub message: String,
    pub category: ErrorCategory,
}

impl ValidationError {
    pub fn new(
        entity: EntityType,
        row_index: usize,
        field: impl Into<String>,
        message: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            entity,
            row_index,
            field: field.into(),
            message: message.into(),
            category,
        }
    }

    /// Whether this error is attached to the given cell.
    pub fn is_at(&self, entity: EntityType, row_index: usize, field: &str) -> bool {
        self.entity == entity && self.row_index == row_index && self.field == field
    }
}
