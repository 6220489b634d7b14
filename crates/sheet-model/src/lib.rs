//! Data model for the clients/workers/tasks spreadsheet cleaner.

pub mod conformance;
pub mod entity;
pub mod error;
pub mod table;

pub use conformance::{ErrorCategory, ValidationError};
pub use entity::EntityType;
pub use error::{ModelError, Result};
pub use table::{CellValue, Dataset, Row};
