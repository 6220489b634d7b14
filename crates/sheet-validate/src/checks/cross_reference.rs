//! Cross-table reference validation.
//!
//! - Business keys (ClientID, WorkerID, TaskID) must be unique per table
//! - Every task listed in a client's RequestedTaskIDs must exist in tasks

use std::collections::{HashMap, HashSet};

use sheet_model::{Dataset, EntityType, Row, ValidationError};

use super::schema::text_or_default;
use crate::issue::Issue;

const REQUESTED_TASKS: &str = "RequestedTaskIDs";

/// Run duplicate-key checks for all tables, then client→task references.
pub fn check(dataset: &Dataset) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for entity in EntityType::ALL {
        errors.extend(check_duplicate_keys(entity, dataset.rows(entity)));
    }
    errors.extend(check_task_references(&dataset.clients, &dataset.tasks));
    errors
}

/// Flag every row whose business key is shared with another row.
///
/// Rows with an empty key are skipped; the schema check reports them.
/// Errors follow table row order.
pub fn check_duplicate_keys(entity: EntityType, rows: &[Row]) -> Vec<ValidationError> {
    let field = entity.key_field();

    let keys: Vec<Option<String>> = rows
        .iter()
        .map(|row| {
            row.text(field)
                .filter(|key| !key.is_empty())
                .map(|key| key.into_owned())
        })
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_default() += 1;
    }

    keys.iter()
        .enumerate()
        .filter_map(|(idx, key)| {
            let key = key.as_deref()?;
            (counts.get(key).copied().unwrap_or(0) > 1)
                .then(|| Issue::DuplicateKey { field }.at(entity, idx))
        })
        .collect()
}

/// Flag every requested task ID that is not a known TaskID.
pub fn check_task_references(clients: &[Row], tasks: &[Row]) -> Vec<ValidationError> {
    let task_ids: HashSet<String> = tasks
        .iter()
        .filter_map(|row| row.text(EntityType::Tasks.key_field()))
        .map(|id| id.into_owned())
        .collect();

    let mut errors = Vec::new();
    for (idx, row) in clients.iter().enumerate() {
        let Some(requested) = text_or_default(row, EntityType::Clients, REQUESTED_TASKS) else {
            continue;
        };
        for task_id in split_id_list(&requested) {
            if !task_ids.contains(task_id) {
                let issue = Issue::UnknownTask {
                    field: REQUESTED_TASKS,
                    task_id: task_id.to_string(),
                };
                errors.push(issue.at(EntityType::Clients, idx));
            }
        }
    }
    errors
}

/// Split a comma- or semicolon-delimited ID list, dropping empty entries.
pub fn split_id_list(list: &str) -> impl Iterator<Item = &str> {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(entity: EntityType, keys: &[&str]) -> Vec<Row> {
        keys.iter()
            .map(|key| [(entity.key_field(), *key)].into_iter().collect())
            .collect()
    }

    #[test]
    fn every_duplicate_row_is_reported() {
        let rows = keyed(EntityType::Workers, &["W1", "W2", "W1", "W1"]);
        let errors = check_duplicate_keys(EntityType::Workers, &rows);
        let indices: Vec<usize> = errors.iter().map(|e| e.row_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert!(errors.iter().all(|e| e.message == "Duplicate WorkerID"));
    }

    #[test]
    fn duplicates_follow_row_order_not_key_order() {
        let rows = keyed(EntityType::Tasks, &["B", "A", "B", "A"]);
        let errors = check_duplicate_keys(EntityType::Tasks, &rows);
        let indices: Vec<usize> = errors.iter().map(|e| e.row_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_keys_are_not_duplicates() {
        let rows = keyed(EntityType::Clients, &["", "", "C1"]);
        assert!(check_duplicate_keys(EntityType::Clients, &rows).is_empty());
    }

    #[test]
    fn splits_on_commas_and_semicolons() {
        let ids: Vec<&str> = split_id_list(" T1, T2;;T3 ,").collect();
        assert_eq!(ids, vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn each_unknown_token_is_reported() {
        let clients = vec![
            [("ClientID", "C1"), ("RequestedTaskIDs", "T1,T2,T9")]
                .into_iter()
                .collect::<Row>(),
        ];
        let tasks = keyed(EntityType::Tasks, &["T1"]);
        let errors = check_task_references(&clients, &tasks);
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Unknown TaskID 'T2'", "Unknown TaskID 'T9'"]
        );
    }

    #[test]
    fn missing_request_list_is_not_an_error() {
        let clients = keyed(EntityType::Clients, &["C1"]);
        assert!(check_task_references(&clients, &[]).is_empty());
    }
}
