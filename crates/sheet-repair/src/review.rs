//! Cell-level review of suggested rows before they touch the workspace.

use std::collections::BTreeSet;

use serde::Serialize;
use sheet_model::{CellValue, EntityType, ModelError, Row};
use sheet_validate::Workspace;

use crate::error::{RepairError, Result};
use crate::response::Suggestion;

/// One cell the suggestion would change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellChange {
    pub row_index: usize,
    pub field: String,
    pub current: Option<CellValue>,
    /// `None` when the suggestion drops the field.
    pub suggested: Option<CellValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "rowIndex")]
pub enum ReviewTarget {
    Table,
    Row(usize),
}

/// Suggested rows together with their diff against the current rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReview {
    pub entity: EntityType,
    pub target: ReviewTarget,
    pub current_rows: usize,
    suggested: Vec<Row>,
    changes: Vec<CellChange>,
}

impl RepairReview {
    pub fn for_table(entity: EntityType, current: &[Row], suggested: Vec<Row>) -> Self {
        let changes = suggested
            .iter()
            .enumerate()
            .flat_map(|(idx, row)| diff_row(idx, current.get(idx), row))
            .collect();
        Self {
            entity,
            target: ReviewTarget::Table,
            current_rows: current.len(),
            suggested,
            changes,
        }
    }

    pub fn for_row(entity: EntityType, row_index: usize, current: &Row, suggested: Row) -> Self {
        Self {
            entity,
            target: ReviewTarget::Row(row_index),
            current_rows: 1,
            changes: diff_row(row_index, Some(current), &suggested),
            suggested: vec![suggested],
        }
    }

    pub fn changes(&self) -> &[CellChange] {
        &self.changes
    }

    pub fn suggested_rows(&self) -> &[Row] {
        &self.suggested
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether the suggestion kept the table's row count.
    pub fn row_count_matches(&self) -> bool {
        self.suggested.len() == self.current_rows
    }

    /// Accept the whole suggestion.
    ///
    /// A table review replaces the table wholesale and refuses to run when
    /// the row count changed. A row review replaces that one row.
    pub fn apply_all(&self, workspace: &mut Workspace) -> Result<usize> {
        match self.target {
            ReviewTarget::Table => {
                let expected = workspace.rows(self.entity).len();
                if self.suggested.len() != expected {
                    return Err(RepairError::RowCountMismatch {
                        expected,
                        actual: self.suggested.len(),
                    });
                }
                workspace.replace_rows(self.entity, self.suggested.clone());
            }
            ReviewTarget::Row(index) => {
                check_row(workspace, self.entity, index)?;
                let row = self.suggested.first().cloned().unwrap_or_default();
                workspace.update_rows(self.entity, |rows| {
                    if let Some(slot) = rows.get_mut(index) {
                        *slot = row;
                    }
                });
            }
        }
        tracing::info!(
            entity = %self.entity,
            changes = self.changes.len(),
            "applied repair suggestion"
        );
        Ok(self.changes.len())
    }

    /// Apply only the changes at the given indices into [`Self::changes`].
    ///
    /// Every index and target row is checked before anything is written, so
    /// a bad selection leaves the workspace untouched.
    pub fn apply_selected(&self, workspace: &mut Workspace, selection: &[usize]) -> Result<usize> {
        let mut picked = Vec::with_capacity(selection.len());
        for &idx in selection {
            let change = self
                .changes
                .get(idx)
                .ok_or(RepairError::UnknownChange(idx))?;
            check_row(workspace, self.entity, change.row_index)?;
            picked.push(change);
        }
        workspace.update_rows(self.entity, |rows| {
            for change in &picked {
                let Some(row) = rows.get_mut(change.row_index) else {
                    continue;
                };
                match &change.suggested {
                    Some(value) => {
                        row.set(change.field.as_str(), value.clone());
                    }
                    None => {
                        row.remove(&change.field);
                    }
                }
            }
        });
        tracing::info!(
            entity = %self.entity,
            selected = picked.len(),
            of = self.changes.len(),
            "applied selected repair changes"
        );
        Ok(picked.len())
    }
}

/// Write an accepted cell suggestion.
pub fn apply_suggestion(
    workspace: &mut Workspace,
    entity: EntityType,
    row_index: usize,
    field: &str,
    suggestion: &Suggestion,
) -> Result<Option<CellValue>> {
    Ok(workspace.set_cell(entity, row_index, field, suggestion.value.as_str())?)
}

fn check_row(workspace: &Workspace, entity: EntityType, index: usize) -> Result<()> {
    let len = workspace.rows(entity).len();
    if index < len {
        Ok(())
    } else {
        Err(ModelError::RowOutOfRange { entity, index, len }.into())
    }
}

/// Cells that differ between `current` and `suggested`, compared by their
/// text rendering so `3` and `"3"` are equal.
fn diff_row(row_index: usize, current: Option<&Row>, suggested: &Row) -> Vec<CellChange> {
    let fields: BTreeSet<&str> = current
        .into_iter()
        .flat_map(Row::fields)
        .chain(suggested.fields())
        .collect();
    fields
        .into_iter()
        .filter_map(|field| {
            let before = current.and_then(|row| row.get(field));
            let after = suggested.get(field);
            let same = match (before, after) {
                (Some(a), Some(b)) => a.as_text() == b.as_text(),
                (None, None) => true,
                _ => false,
            };
            (!same).then(|| CellChange {
                row_index,
                field: field.to_string(),
                current: before.cloned(),
                suggested: after.cloned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn numbers_equal_to_text_are_not_changes() {
        let current = row(&[("A", "3"), ("B", "x")]);
        let mut suggested = Row::new();
        suggested.set("A", CellValue::Number(3.0));
        suggested.set("B", "y");
        suggested.set("C", "new");
        let changes = diff_row(0, Some(&current), &suggested);
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["B", "C"]);
        assert_eq!(changes[1].current, None);
    }

    #[test]
    fn dropped_fields_are_changes() {
        let changes = diff_row(2, Some(&row(&[("A", "1")])), &Row::new());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].row_index, 2);
        assert_eq!(changes[0].suggested, None);
    }

    #[test]
    fn extra_suggested_rows_are_flagged() {
        let review = RepairReview::for_table(
            EntityType::Tasks,
            &[row(&[("TaskID", "T1")])],
            vec![row(&[("TaskID", "T1")]), row(&[("TaskID", "T2")])],
        );
        assert!(!review.row_count_matches());
        assert_eq!(review.changes().len(), 1);
        assert_eq!(review.changes()[0].row_index, 1);
    }
}
