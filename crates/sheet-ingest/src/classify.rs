//! Table classification by key column, with a filename fallback.

use sheet_model::EntityType;

use crate::error::ClassificationFailure;

const CLIENT_COLUMNS: &[&str] = &["ClientID", "ClientName", "PriorityLevel"];
const WORKER_COLUMNS: &[&str] = &[
    "WorkerID",
    "WorkerName",
    "Skills",
    "AvailableSlots",
    "MaxLoadPerPhase",
];
const TASK_COLUMNS: &[&str] = &[
    "TaskID",
    "TaskName",
    "Duration",
    "RequiredSkills",
    "MaxConcurrent",
];

/// Columns a file must carry to be admitted as the given table.
pub fn required_columns(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Clients => CLIENT_COLUMNS,
        EntityType::Workers => WORKER_COLUMNS,
        EntityType::Tasks => TASK_COLUMNS,
    }
}

/// Decide which table a set of headers represents.
///
/// A key column decides first, checked in the order ClientID, WorkerID,
/// TaskID; a file carrying several key columns resolves to the first one.
/// Without a key column the filename is searched (case-insensitively) for
/// "client", "worker" or "task" in the same order.
pub fn classify<S: AsRef<str>>(
    headers: &[S],
    filename: Option<&str>,
) -> Result<EntityType, ClassificationFailure> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|header| normalize_header(header.as_ref()))
        .collect();

    if let Some(entity) = classify_by_headers(&normalized) {
        return Ok(entity);
    }
    if let Some(entity) = filename.and_then(classify_by_filename) {
        tracing::debug!(filename, entity = %entity, "classified by filename");
        return Ok(entity);
    }
    Err(ClassificationFailure {
        headers: normalized,
        filename: filename.map(str::to_string),
    })
}

fn classify_by_headers(headers: &[String]) -> Option<EntityType> {
    EntityType::ALL
        .into_iter()
        .find(|entity| headers.iter().any(|header| header == entity.key_field()))
}

fn classify_by_filename(filename: &str) -> Option<EntityType> {
    let lower = filename.to_lowercase();
    EntityType::ALL.into_iter().find(|entity| {
        let stem = entity.as_str().trim_end_matches('s');
        lower.contains(stem)
    })
}

/// Trim whitespace and a leading byte-order mark from a header cell.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().trim_start_matches('\u{feff}').trim().to_string()
}

/// Required columns for `entity` missing from `headers`, in schema order.
pub fn missing_columns<S: AsRef<str>>(entity: EntityType, headers: &[S]) -> Vec<String> {
    required_columns(entity)
        .iter()
        .filter(|column| !headers.iter().any(|header| header.as_ref() == **column))
        .map(|column| (*column).to_string())
        .collect()
}
