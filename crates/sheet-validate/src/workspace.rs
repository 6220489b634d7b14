//! Dataset plus its current error list.
//!
//! Every mutating method revalidates before returning, so `errors()` always
//! describes the current rows.

use sheet_model::{CellValue, Dataset, EntityType, Result, Row, ValidationError};

use crate::summary::ValidationSummary;
use crate::validate;

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    dataset: Dataset,
    errors: Vec<ValidationError>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let errors = validate(&dataset);
        Self { dataset, errors }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    pub fn rows(&self, entity: EntityType) -> &[Row] {
        self.dataset.rows(entity)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Load a freshly ingested table, replacing any previous rows.
    pub fn ingest(&mut self, entity: EntityType, rows: Vec<Row>) -> Vec<Row> {
        tracing::debug!(entity = %entity, rows = rows.len(), "ingesting table");
        self.replace_rows(entity, rows)
    }

    /// Replace one table wholesale (e.g. applying a bulk fix).
    pub fn replace_rows(&mut self, entity: EntityType, rows: Vec<Row>) -> Vec<Row> {
        let previous = self.dataset.set_rows(entity, rows);
        self.revalidate();
        previous
    }

    /// Edit a single cell.
    pub fn set_cell(
        &mut self,
        entity: EntityType,
        index: usize,
        field: &str,
        value: impl Into<CellValue>,
    ) -> Result<Option<CellValue>> {
        let previous = self
            .dataset
            .set_cell(entity, index, field, value.into())?;
        self.revalidate();
        Ok(previous)
    }

    /// Apply an arbitrary edit to one table's rows.
    pub fn update_rows<F>(&mut self, entity: EntityType, update: F)
    where
        F: FnOnce(&mut Vec<Row>),
    {
        update(self.dataset.rows_mut(entity));
        self.revalidate();
    }

    pub fn errors_for(&self, entity: EntityType) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |error| error.entity == entity)
    }

    pub fn errors_for_row(
        &self,
        entity: EntityType,
        row_index: usize,
    ) -> impl Iterator<Item = &ValidationError> {
        self.errors
            .iter()
            .filter(move |error| error.entity == entity && error.row_index == row_index)
    }

    pub fn errors_for_cell<'a>(
        &'a self,
        entity: EntityType,
        row_index: usize,
        field: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> {
        self.errors
            .iter()
            .filter(move |error| error.is_at(entity, row_index, field))
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary::from_errors(&self.errors)
    }

    fn revalidate(&mut self) {
        self.errors = validate(&self.dataset);
    }
}
