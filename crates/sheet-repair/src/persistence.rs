//! Rule book persistence.
//!
//! The rule book is stored as `rules.toml` in the platform config folder:
//! - macOS: ~/Library/Application Support/com.sheet-clean.Sheet-Clean/
//! - Windows: %APPDATA%/sheet-clean/Sheet Clean/config/
//! - Linux: ~/.config/sheetclean/

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{RepairError, Result};
use crate::rules::RuleBook;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "sheet-clean";
const APP_NAME: &str = "Sheet Clean";
const RULES_FILENAME: &str = "rules.toml";

/// Default location of the rule book, `None` when the platform has no
/// config directory.
pub fn default_rules_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(RULES_FILENAME))
}

/// Read the rule book, failing on unreadable or malformed files.
///
/// A missing file is not an error: it yields the default rule book.
pub fn read_rule_book(path: &Path) -> Result<RuleBook> {
    match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|source| RepairError::ParseRules {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No rule book at {:?}, using defaults", path);
            Ok(RuleBook::default())
        }
        Err(source) => Err(RepairError::ReadRules {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the rule book, falling back to defaults on any failure.
pub fn load_rule_book(path: &Path) -> RuleBook {
    match read_rule_book(path) {
        Ok(book) => {
            tracing::debug!("Loaded {} rules from {:?}", book.rules.len(), path);
            book
        }
        Err(e) => {
            tracing::warn!("{}, using default rules", e);
            RuleBook::default()
        }
    }
}

/// Save the rule book, creating the parent directory if needed.
pub fn save_rule_book(book: &RuleBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RepairError::WriteRules {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(book)?;
    fs::write(path, content).map_err(|source| RepairError::WriteRules {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Saved rule book to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let book = read_rule_book(&dir.path().join("rules.toml")).unwrap();
        assert_eq!(book.rules.len(), 3);
    }

    #[test]
    fn rule_book_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("rules.toml");
        let mut book = RuleBook::default();
        book.toggle_rule("2").unwrap();
        save_rule_book(&book, &path).unwrap();

        let loaded = read_rule_book(&path).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn malformed_file_is_an_error_but_load_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.toml");
        fs::write(&path, "rules = 7").unwrap();
        assert!(matches!(
            read_rule_book(&path),
            Err(RepairError::ParseRules { .. })
        ));
        assert_eq!(load_rule_book(&path).rules.len(), 3);
    }
}
