//! Repair layer: business rules, oracle prompts and suggestion review.
//!
//! Nothing here feeds back into validation except through [`Workspace`]
//! mutations, which revalidate the whole dataset.
//!
//! [`Workspace`]: sheet_validate::Workspace

pub mod error;
pub mod oracle;
pub mod persistence;
pub mod prompt;
pub mod response;
pub mod review;
pub mod rules;

pub use error::{OracleFailure, RepairError, Result};
pub use oracle::{RepairOracle, RepairService, ReplayOracle};
pub use persistence::{default_rules_path, load_rule_book, read_rule_book, save_rule_book};
pub use prompt::{PromptBuilder, RepairPrompt};
pub use response::Suggestion;
pub use review::{CellChange, RepairReview, ReviewTarget, apply_suggestion};
pub use rules::{BusinessRule, NewRule, RuleBook, RuleCategory, RuleScope, RuleUpdate};
