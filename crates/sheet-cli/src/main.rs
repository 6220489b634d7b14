//! Sheet Clean CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use sheet_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg};
use sheet_cli::commands::{
    RulesOutcome, rule_book, run_classify, run_prompt, run_review, run_rules, run_validate,
};
use sheet_cli::logging::{LogConfig, LogFormat, init_logging};
use sheet_cli::summary::{files_table, print_review_outcome, print_validate_report, rules_table};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let rules_path = cli.rules.as_deref();
    let exit_code = match &cli.command {
        Command::Validate(args) => {
            let report = run_validate(args);
            let printed = match args.format {
                OutputFormatArg::Table => {
                    print_validate_report(&report);
                    Ok(())
                }
                OutputFormatArg::Json => print_json(&report),
            };
            match printed {
                Ok(()) if report.has_errors() => 1,
                Ok(()) => 0,
                Err(error) => fail(&error),
            }
        }
        Command::Classify(args) => {
            let files = run_classify(args);
            println!("{}", files_table(&files));
            if files.iter().any(|file| file.error.is_some()) { 1 } else { 0 }
        }
        Command::Prompt(args) => {
            let rules = rule_book(rules_path);
            match run_prompt(args, &rules) {
                Ok(prompt) => match args.format {
                    OutputFormatArg::Table => {
                        println!("# System instruction\n{}\n", prompt.system_instruction);
                        println!("# Prompt\n{}", prompt.prompt);
                        0
                    }
                    OutputFormatArg::Json => match print_json(&prompt) {
                        Ok(()) => 0,
                        Err(error) => fail(&error),
                    },
                },
                Err(error) => fail(&error),
            }
        }
        Command::Review(args) => {
            let rules = rule_book(rules_path);
            match run_review(args, &rules) {
                Ok(outcome) => {
                    let printed = match args.format {
                        OutputFormatArg::Table => {
                            print_review_outcome(&outcome);
                            Ok(())
                        }
                        OutputFormatArg::Json => print_json(&outcome),
                    };
                    match printed {
                        Ok(()) if outcome.has_errors() => 1,
                        Ok(()) => 0,
                        Err(error) => fail(&error),
                    }
                }
                Err(error) => fail(&error),
            }
        }
        Command::Rules(command) => match run_rules(command, rules_path) {
            Ok(RulesOutcome::Listed(book, entity)) => {
                println!("{}", rules_table(&book, entity));
                0
            }
            Ok(RulesOutcome::Changed(message)) => {
                println!("{message}");
                0
            }
            Err(error) => fail(&error),
        },
    };
    std::process::exit(exit_code);
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
