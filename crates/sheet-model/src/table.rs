use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EntityType;
use crate::error::{ModelError, Result};

/// A scalar cell as received from the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text rendering used wherever a string field is expected.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(number) => Cow::Owned(format_number(*number)),
        }
    }

    /// Convert a loosely-typed JSON value into a cell.
    ///
    /// `null` has no cell representation and yields `None`; nested arrays and
    /// objects are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::Bool(flag) => Some(Self::Text(flag.to_string())),
            Value::Array(_) | Value::Object(_) => Some(Self::Text(value.to_string())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

fn format_number(number: f64) -> String {
    if number.is_infinite() {
        if number.is_sign_negative() {
            "-Infinity".to_string()
        } else {
            "Infinity".to_string()
        }
    } else {
        number.to_string()
    }
}

/// One table row: field name to cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from a header line and one record, pairing by position.
    ///
    /// Missing trailing values become empty text cells.
    pub fn from_record<H, V>(headers: &[H], values: &[V]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let mut row = Self::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = values.get(idx).map(AsRef::as_ref).unwrap_or("");
            row.set(header.as_ref(), CellValue::text(value));
        }
        row
    }

    /// Build a row from a JSON object. Non-object values yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut row = Self::new();
        for (field, cell) in object {
            if let Some(cell) = CellValue::from_json(cell) {
                row.set(field.as_str(), cell);
            }
        }
        Some(row)
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.get(field)
    }

    /// Text rendering of a field, `None` when the field is absent.
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        self.cells.get(field).map(CellValue::as_text)
    }

    pub fn set(
        &mut self,
        field: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        self.cells.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        self.cells.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.cells.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

/// The three tables of a cleaning session. Every table is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub clients: Vec<Row>,
    pub workers: Vec<Row>,
    pub tasks: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, entity: EntityType) -> &[Row] {
        match entity {
            EntityType::Clients => &self.clients,
            EntityType::Workers => &self.workers,
            EntityType::Tasks => &self.tasks,
        }
    }

    pub fn rows_mut(&mut self, entity: EntityType) -> &mut Vec<Row> {
        match entity {
            EntityType::Clients => &mut self.clients,
            EntityType::Workers => &mut self.workers,
            EntityType::Tasks => &mut self.tasks,
        }
    }

    pub fn row(&self, entity: EntityType, index: usize) -> Option<&Row> {
        self.rows(entity).get(index)
    }

    /// Replace one table wholesale, returning the previous rows.
    pub fn set_rows(&mut self, entity: EntityType, rows: Vec<Row>) -> Vec<Row> {
        std::mem::replace(self.rows_mut(entity), rows)
    }

    /// Replace a single cell. Returns the previous value of the cell.
    pub fn set_cell(
        &mut self,
        entity: EntityType,
        index: usize,
        field: &str,
        value: CellValue,
    ) -> Result<Option<CellValue>> {
        let rows = self.rows_mut(entity);
        let len = rows.len();
        let row = rows.get_mut(index).ok_or(ModelError::RowOutOfRange {
            entity,
            index,
            len,
        })?;
        Ok(row.set(field, value))
    }

    pub fn total_rows(&self) -> usize {
        EntityType::ALL
            .iter()
            .map(|entity| self.rows(*entity).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}
