//! Error types for the repair layer.

use std::path::PathBuf;

use sheet_model::ModelError;
use thiserror::Error;

/// The oracle could not produce a response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct OracleFailure(pub String);

#[derive(Debug, Error)]
pub enum RepairError {
    // === Rule Book ===
    #[error("no business rule with id '{0}'")]
    RuleNotFound(String),

    #[error("no rule category with id '{0}'")]
    CategoryNotFound(String),

    #[error("rule priority must be between 1 and 10 (got {0})")]
    InvalidPriority(u8),

    #[error("unknown rule scope '{0}' (expected all, clients, workers or tasks)")]
    InvalidScope(String),

    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to read rule book {path}: {source}")]
    ReadRules {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule book {path}: {source}")]
    ParseRules {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write rule book {path}: {source}")]
    WriteRules {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize rule book: {0}")]
    SerializeRules(#[from] toml::ser::Error),

    // === Oracle ===
    #[error("repair oracle failed: {0}")]
    Oracle(#[from] OracleFailure),

    #[error("failed to encode prompt payload: {0}")]
    Payload(#[from] serde_json::Error),

    // === Review ===
    #[error("suggested table has {actual} rows but the current table has {expected}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("no suggested change with index {0}")]
    UnknownChange(usize),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, RepairError>;
