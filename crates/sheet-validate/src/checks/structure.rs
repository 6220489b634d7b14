//! Structural checks on values embedded in string cells.
//!
//! - Client AttributesJSON must parse as JSON when non-blank
//! - Worker AvailableSlots must be a list of numbers
//! - A worker's MaxLoadPerPhase must not exceed its slot count

use serde::de::IgnoredAny;
use serde_json::value::RawValue;
use sheet_model::{Dataset, EntityType, Row, ValidationError};

use super::schema::text_or_default;
use crate::coerce::{coerce_number, parse_number};
use crate::issue::Issue;

const ATTRIBUTES_JSON: &str = "AttributesJSON";
const AVAILABLE_SLOTS: &str = "AvailableSlots";
const MAX_LOAD_PER_PHASE: &str = "MaxLoadPerPhase";

/// Client JSON checks, then worker slot and capacity checks.
pub fn check(dataset: &Dataset) -> Vec<ValidationError> {
    let mut errors = check_attributes_json(&dataset.clients);
    errors.extend(check_worker_slots(&dataset.workers));
    errors
}

pub fn check_attributes_json(clients: &[Row]) -> Vec<ValidationError> {
    clients
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let text = row.text(ATTRIBUTES_JSON)?;
            if text.trim().is_empty() || serde_json::from_str::<IgnoredAny>(&text).is_ok() {
                return None;
            }
            Some(Issue::InvalidJson {
                field: ATTRIBUTES_JSON,
            }
            .at(EntityType::Clients, idx))
        })
        .collect()
}

/// Slot list parsing and the overload check.
///
/// A malformed list yields one error and counts as empty, so it never also
/// triggers the overload check.
pub fn check_worker_slots(workers: &[Row]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (idx, row) in workers.iter().enumerate() {
        let slots = match text_or_default(row, EntityType::Workers, AVAILABLE_SLOTS) {
            Some(text) if !text.is_empty() => match parse_slot_list(&text) {
                Some(slots) => slots,
                None => {
                    let issue = Issue::MalformedList {
                        field: AVAILABLE_SLOTS,
                    };
                    errors.push(issue.at(EntityType::Workers, idx));
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        if let Some(issue) = check_overload(&slots, row) {
            errors.push(issue.at(EntityType::Workers, idx));
        }
    }
    errors
}

/// Compares slot count with MaxLoadPerPhase.
///
/// Only the number of slots is compared, not which phases they cover.
fn check_overload(slots: &[f64], row: &Row) -> Option<Issue> {
    if slots.is_empty() {
        return None;
    }
    let max_load = coerce_number(row.get(MAX_LOAD_PER_PHASE)).unwrap_or(0.0);
    ((slots.len() as f64) < max_load).then(|| Issue::Overloaded {
        field: MAX_LOAD_PER_PHASE,
        slots: slots.len(),
        max_load,
    })
}

/// Parse a slot list written either as a JSON array or as a comma/semicolon
/// delimited list. Returns `None` when the list is malformed.
///
/// Numbers too large for `f64` read as infinity.
pub fn parse_slot_list(text: &str) -> Option<Vec<f64>> {
    if text.trim_start().starts_with('[') {
        let items: Vec<&RawValue> = serde_json::from_str(text).ok()?;
        return items.iter().map(|item| json_number(item.get())).collect();
    }

    text.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_number)
        .collect()
}

/// A JSON number literal, or a string holding a number.
fn json_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.starts_with('"') {
        let text: String = serde_json::from_str(raw).ok()?;
        return parse_number(&text);
    }
    if raw.starts_with(|ch: char| ch == '-' || ch.is_ascii_digit()) {
        return raw.parse::<f64>().ok();
    }
    None
}
