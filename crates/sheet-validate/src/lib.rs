//! Validation engine for client, worker and task tables.
//!
//! - **Schema**: required fields, numeric coercion, integer ranges
//! - **Cross-reference**: duplicate business keys, unknown requested tasks
//! - **Structure**: AttributesJSON parsing, AvailableSlots lists, worker overload
//!
//! # Example
//!
//! ```ignore
//! use sheet_validate::{validate, Workspace};
//!
//! let errors = validate(&dataset);
//! for error in &errors {
//!     println!("{} row {}: {} - {}", error.entity, error.row_index + 1, error.field, error.message);
//! }
//! ```

pub mod checks;
pub mod coerce;
mod issue;
mod summary;
mod workspace;

use sheet_model::{Dataset, ValidationError};

pub use issue::Issue;
pub use summary::ValidationSummary;
pub use workspace::Workspace;

/// Recompute the full error list for a dataset.
///
/// Pure function of the dataset: calling it twice on unchanged data yields
/// the same errors in the same order.
pub fn validate(dataset: &Dataset) -> Vec<ValidationError> {
    let errors = checks::run_all(dataset);
    tracing::debug!(
        clients = dataset.clients.len(),
        workers = dataset.workers.len(),
        tasks = dataset.tasks.len(),
        errors = errors.len(),
        "validation pass complete"
    );
    errors
}
