//! Shape-sniffing of oracle responses.
//!
//! Oracle output is loosely structured and varies between providers and
//! prompt versions. Everything here degrades to "no usable suggestion"
//! instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheet_model::Row;

/// Greedy `{...}` span, across lines.
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object span regex"));
/// Greedy `[...]` span, across lines.
static ARRAY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid array span regex"));

/// One replacement value offered for a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub value: String,
}

impl Suggestion {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Decode model text into JSON.
///
/// Tries the whole text first, then the widest `{...}` or `[...]` span,
/// whichever opens earlier.
pub fn decode_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let mut spans: Vec<(usize, &str)> = [&*OBJECT_SPAN, &*ARRAY_SPAN]
        .into_iter()
        .filter_map(|pattern| pattern.find(trimmed))
        .map(|found| (found.start(), found.as_str()))
        .collect();
    spans.sort_by_key(|(start, _)| *start);
    let decoded = spans
        .into_iter()
        .find_map(|(_, span)| serde_json::from_str(span).ok());
    if decoded.is_none() {
        tracing::warn!(len = text.len(), "oracle text contained no JSON payload");
    }
    decoded
}

/// Strip a provider envelope, returning the payload inside it.
///
/// Recognizes `candidates[0].content.parts[0].text` and
/// `choices[0].message.content`. Anything else is already a payload.
pub fn unwrap_envelope(response: Value) -> Option<Value> {
    let text = response
        .pointer("/candidates/0/content/parts/0/text")
        .or_else(|| response.pointer("/choices/0/message/content"))
        .and_then(Value::as_str);
    match text {
        Some(text) => decode_text(text),
        None => Some(response),
    }
}

/// Normalize a raw oracle response into a JSON payload.
///
/// A string response is treated as model text and decoded first.
pub fn normalize_response(response: Value) -> Option<Value> {
    match response {
        Value::String(text) => decode_text(&text).and_then(unwrap_envelope),
        other => unwrap_envelope(other),
    }
}

/// Cell suggestions from a payload.
///
/// Accepts `{"choices": [...]}`, a bare array of entries, a single entry,
/// or a single scalar. Entries without a string `label` and string `value`
/// are dropped.
pub fn parse_suggestions(payload: &Value) -> Vec<Suggestion> {
    match payload {
        Value::Object(object) => match object.get("choices") {
            Some(Value::Array(entries)) => entries.iter().filter_map(suggestion_entry).collect(),
            Some(_) => Vec::new(),
            None => suggestion_entry(payload).into_iter().collect(),
        },
        Value::Array(entries) => entries.iter().filter_map(suggestion_entry).collect(),
        Value::String(text) => vec![Suggestion::new(text.as_str(), text.as_str())],
        Value::Number(number) => {
            let text = number.to_string();
            vec![Suggestion::new(text.clone(), text)]
        }
        Value::Null | Value::Bool(_) => Vec::new(),
    }
}

fn suggestion_entry(entry: &Value) -> Option<Suggestion> {
    let label = entry.get("label")?.as_str()?;
    let value = entry.get("value")?.as_str()?;
    Some(Suggestion::new(label, value))
}

/// Rows from a table fix payload. Only an array whose every element is an
/// object is usable.
pub fn parse_table_rows(payload: &Value) -> Option<Vec<Row>> {
    payload.as_array()?.iter().map(Row::from_json).collect()
}

/// One row from a row fix payload: an object, or an array holding exactly
/// one object.
pub fn parse_row(payload: &Value) -> Option<Row> {
    match payload {
        Value::Object(_) => Row::from_json(payload),
        Value::Array(items) if items.len() == 1 => Row::from_json(&items[0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn span_patterns_are_greedy_and_multiline() {
        assert_eq!(
            OBJECT_SPAN.find("x {\"a\": {}\n} y").map(|m| m.as_str()),
            Some("{\"a\": {}\n}")
        );
        assert_eq!(ARRAY_SPAN.find("[1]\n[2]").map(|m| m.as_str()), Some("[1]\n[2]"));
    }

    fn suggestions(response: Value) -> Vec<Suggestion> {
        normalize_response(response)
            .map(|payload| parse_suggestions(&payload))
            .unwrap_or_default()
    }

    #[test]
    fn unwraps_gemini_envelope() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"choices\":[{\"label\":\"3\",\"value\":\"3\"}]}"}]}}]
        });
        assert_eq!(suggestions(response), vec![Suggestion::new("3", "3")]);
    }

    #[test]
    fn unwraps_chat_completion_envelope() {
        let response = json!({
            "choices": [{"message": {"content": "[{\"label\":\"T1\",\"value\":\"T1\"}]"}}]
        });
        assert_eq!(suggestions(response), vec![Suggestion::new("T1", "T1")]);
    }

    #[test]
    fn drops_entries_without_string_label_and_value() {
        let response = json!({"choices": [
            {"label": "one", "value": "1"},
            {"label": "two", "value": 2},
            {"value": "3"},
            "four"
        ]});
        assert_eq!(suggestions(response), vec![Suggestion::new("one", "1")]);
    }

    #[test]
    fn single_values_become_one_suggestion() {
        assert_eq!(suggestions(json!("5")), vec![Suggestion::new("5", "5")]);
        assert_eq!(suggestions(json!("\"5\"")), vec![Suggestion::new("5", "5")]);
        assert_eq!(suggestions(json!(4)), vec![Suggestion::new("4", "4")]);
        assert_eq!(
            suggestions(json!({"label": "a", "value": "b"})),
            vec![Suggestion::new("a", "b")]
        );
    }

    #[test]
    fn falls_back_to_embedded_json() {
        let text = "Sure! Here you go:\n```json\n{\"choices\": [{\"label\": \"x\", \"value\": \"y\"}]}\n```";
        assert_eq!(suggestions(json!(text)), vec![Suggestion::new("x", "y")]);

        let rows = decode_text("rows: [{\"TaskID\": \"T1\"}] done").unwrap();
        assert_eq!(parse_table_rows(&rows).map(|rows| rows.len()), Some(1));
    }

    #[test]
    fn prose_is_not_a_suggestion() {
        assert!(suggestions(json!("I cannot help with that.")).is_empty());
        assert!(suggestions(json!({"choices": "none"})).is_empty());
        assert!(suggestions(Value::Null).is_empty());
    }

    #[test]
    fn table_rows_must_all_be_objects() {
        assert!(parse_table_rows(&json!([{"A": "1"}, 2])).is_none());
        assert!(parse_table_rows(&json!({"rows": []})).is_none());
        let rows = parse_table_rows(&json!([{"A": 1, "B": null}])).unwrap();
        assert_eq!(rows[0].text("A").as_deref(), Some("1"));
        assert!(!rows[0].contains("B"));
    }

    #[test]
    fn row_payload_accepts_object_or_singleton_array() {
        assert!(parse_row(&json!({"A": "1"})).is_some());
        assert!(parse_row(&json!([{"A": "1"}])).is_some());
        assert!(parse_row(&json!([{"A": "1"}, {"A": "2"}])).is_none());
    }
}
