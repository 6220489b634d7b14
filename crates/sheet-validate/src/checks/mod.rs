//! Validation check modules.
//!
//! Each module performs one family of checks over the full dataset.

pub mod cross_reference;
pub mod schema;
pub mod structure;

use sheet_model::{Dataset, ValidationError};

/// Run all checks in their fixed order.
///
/// Output order is part of the contract: schema errors (clients, workers,
/// tasks), then cross-reference errors, then structural errors, each in
/// row order.
pub fn run_all(dataset: &Dataset) -> Vec<ValidationError> {
    // 1. Field schema (required, numeric coercion and ranges)
    let mut errors = schema::check(dataset);

    // 2. Duplicate business keys and unknown task references
    errors.extend(cross_reference::check(dataset));

    // 3. Embedded JSON, slot lists and worker capacity
    errors.extend(structure::check(dataset));

    errors
}
