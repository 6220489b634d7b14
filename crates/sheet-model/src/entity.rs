use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The three table kinds handled by the cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Clients,
    Workers,
    Tasks,
}

impl EntityType {
    /// All entity types in validation (and classification priority) order.
    pub const ALL: [EntityType; 3] = [Self::Clients, Self::Workers, Self::Tasks];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Workers => "workers",
            Self::Tasks => "tasks",
        }
    }

    /// Business-key column for this table.
    pub fn key_field(self) -> &'static str {
        match self {
            Self::Clients => "ClientID",
            Self::Workers => "WorkerID",
            Self::Tasks => "TaskID",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Clients => "Clients",
            Self::Workers => "Workers",
            Self::Tasks => "Tasks",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clients" | "client" => Ok(Self::Clients),
            "workers" | "worker" => Ok(Self::Workers),
            "tasks" | "task" => Ok(Self::Tasks),
            other => Err(ModelError::UnknownEntity(other.to_string())),
        }
    }
}
