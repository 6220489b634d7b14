//! CLI argument definitions for `sheet-clean`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sheet_model::EntityType;

#[derive(Parser)]
#[command(
    name = "sheet-clean",
    version,
    about = "Validate and repair client, worker and task spreadsheets",
    long_about = "Validate client, worker and task CSV tables.\n\n\
                  Checks required fields, numeric ranges, duplicate IDs, task references,\n\
                  embedded JSON and slot lists, and builds repair prompts for an AI oracle."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values to appear in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Rule book to use instead of the one in the config directory.
    #[arg(long = "rules", value_name = "PATH", global = true)]
    pub rules: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load tables and report validation errors.
    Validate(ValidateArgs),

    /// Show which table each file would be loaded as.
    Classify(FilesArgs),

    /// Print the repair prompt for a table, a row or a cell.
    Prompt(PromptArgs),

    /// Diff a saved oracle response against the current rows and optionally apply it.
    Review(ReviewArgs),

    /// Manage business rules forwarded into repair prompts.
    #[command(subcommand)]
    Rules(RulesCommand),
}

#[derive(Args)]
pub struct FilesArgs {
    /// CSV files; later files replace earlier ones of the same table.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: FilesArgs,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Table to repair.
    #[arg(long = "entity", value_parser = parse_entity)]
    pub entity: EntityType,

    /// Zero-based row index (whole table when omitted).
    #[arg(long = "row")]
    pub row: Option<usize>,
}

#[derive(Args)]
pub struct PromptArgs {
    #[command(flatten)]
    pub input: FilesArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Field for a single-cell suggestion prompt (requires --row).
    #[arg(long = "field", requires = "row")]
    pub field: Option<String>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub input: FilesArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Review cell suggestions for this field (requires --row).
    #[arg(long = "field", requires = "row")]
    pub field: Option<String>,

    /// File holding the oracle response (JSON, or raw model text).
    #[arg(long = "response", value_name = "PATH")]
    pub response: PathBuf,

    /// Apply every suggested change.
    #[arg(long = "apply", conflicts_with = "select")]
    pub apply: bool,

    /// Apply only the listed change numbers (one suggestion number with --field).
    #[arg(long = "select", value_delimiter = ',', value_name = "N,...")]
    pub select: Vec<usize>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Subcommand)]
pub enum RulesCommand {
    /// List all rules, or the active rules for one table.
    List {
        #[arg(long = "entity", value_parser = parse_entity)]
        entity: Option<EntityType>,
    },
    /// Add a rule.
    Add(AddRuleArgs),
    /// Flip a rule between active and inactive.
    Toggle { id: String },
    /// Delete a rule.
    Delete { id: String },
}

#[derive(Args)]
pub struct AddRuleArgs {
    #[arg(long = "name")]
    pub name: String,

    /// Instruction forwarded to the oracle.
    #[arg(long = "rule")]
    pub rule: String,

    /// all, clients, workers or tasks.
    #[arg(long = "scope", default_value = "all")]
    pub scope: String,

    #[arg(long = "field")]
    pub field: Option<String>,

    #[arg(long = "description", default_value = "")]
    pub description: String,

    #[arg(
        long = "priority",
        default_value_t = 5,
        value_parser = clap::value_parser!(u8).range(1..=10)
    )]
    pub priority: u8,

    /// Store the rule inactive.
    #[arg(long = "inactive")]
    pub inactive: bool,
}

fn parse_entity(value: &str) -> Result<EntityType, String> {
    value.parse().map_err(|error: sheet_model::ModelError| error.to_string())
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
