//! Aggregate counts over a validation error list.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sheet_model::{EntityType, ErrorCategory, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub by_entity: BTreeMap<EntityType, usize>,
    pub by_category: BTreeMap<ErrorCategory, usize>,
    pub by_entity_category: BTreeMap<EntityType, BTreeMap<ErrorCategory, usize>>,
    /// Number of distinct rows with at least one error, per entity.
    pub rows_with_errors: BTreeMap<EntityType, usize>,
}

impl ValidationSummary {
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        let mut summary = Self {
            total: errors.len(),
            ..Self::default()
        };
        let mut rows: BTreeSet<(EntityType, usize)> = BTreeSet::new();
        for error in errors {
            *summary.by_entity.entry(error.entity).or_default() += 1;
            *summary.by_category.entry(error.category).or_default() += 1;
            *summary
                .by_entity_category
                .entry(error.entity)
                .or_default()
                .entry(error.category)
                .or_default() += 1;
            rows.insert((error.entity, error.row_index));
        }
        for (entity, _) in rows {
            *summary.rows_with_errors.entry(entity).or_default() += 1;
        }
        summary
    }

    pub fn count_for(&self, entity: EntityType) -> usize {
        self.by_entity.get(&entity).copied().unwrap_or(0)
    }

    pub fn count_in(&self, entity: EntityType, category: ErrorCategory) -> usize {
        self.by_entity_category
            .get(&entity)
            .and_then(|counts| counts.get(&category))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_errors_and_distinct_rows() {
        let errors = vec![
            ValidationError::new(EntityType::Clients, 0, "A", "a", ErrorCategory::Schema),
            ValidationError::new(EntityType::Clients, 0, "B", "b", ErrorCategory::Schema),
            ValidationError::new(EntityType::Workers, 3, "C", "c", ErrorCategory::List),
        ];
        let summary = ValidationSummary::from_errors(&errors);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count_for(EntityType::Clients), 2);
        assert_eq!(summary.count_for(EntityType::Tasks), 0);
        assert_eq!(summary.rows_with_errors.get(&EntityType::Clients), Some(&1));
        assert_eq!(summary.by_category.get(&ErrorCategory::Schema), Some(&2));
        assert_eq!(summary.count_in(EntityType::Workers, ErrorCategory::List), 1);
        assert_eq!(summary.count_in(EntityType::Workers, ErrorCategory::Schema), 0);
        assert!(!summary.is_clean());
    }
}
