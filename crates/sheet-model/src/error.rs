use thiserror::Error;

use crate::EntityType;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("row {index} is out of range for {entity} ({len} rows)")]
    RowOutOfRange {
        entity: EntityType,
        index: usize,
        len: usize,
    },
    #[error("unknown entity type '{0}' (expected clients, workers or tasks)")]
    UnknownEntity(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
