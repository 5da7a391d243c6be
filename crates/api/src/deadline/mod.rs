pub mod create_deadline;
pub mod delete_deadline;
pub mod get_deadline;
pub mod get_deadlines;
pub mod scan_due_dates;
pub mod update_deadline;

use study_planner_domain::{
    normalize_document_inbound, DeadlineKind, Document, DocumentError, TimezoneRegistry, Value,
    ASSIGNMENT_STATUSES, CREATED_AT_FIELD, NOTIFICATION_SENT_FIELD, STATUS_FIELD,
    UPDATED_AT_FIELD, USER_ID_FIELD,
};

/// Fields only ever written by the service itself
const PROTECTED_FIELDS: [&str; 5] = [
    Document::ID_FIELD,
    USER_ID_FIELD,
    NOTIFICATION_SENT_FIELD,
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
];

/// Reads a user supplied payload for a record of `kind` and converts its
/// timestamps from the user's `timezone` to UTC. Fields set to `null` are
/// left out.
fn read_payload(
    kind: DeadlineKind,
    payload: serde_json::Value,
    registry: &TimezoneRegistry,
    timezone: &str,
) -> Result<Document, DocumentError> {
    let mut doc = Document::from_json(payload, kind.temporal_fields())?;
    for field in PROTECTED_FIELDS.iter() {
        doc.remove(field);
    }
    // A missing value never clears a stored field
    let nulls: Vec<String> = doc
        .iter()
        .filter(|(_, value)| matches!(value, Value::Null))
        .map(|(key, _)| key.clone())
        .collect();
    for key in nulls {
        doc.remove(&key);
    }
    normalize_document_inbound(registry, &mut doc, timezone);
    Ok(doc)
}

fn valid_status(kind: DeadlineKind, doc: &Document) -> bool {
    if !kind.tracks_completion() {
        return true;
    }
    match doc.get(STATUS_FIELD) {
        None => true,
        Some(status) => status
            .as_str()
            .map_or(false, |status| ASSIGNMENT_STATUSES.contains(&status)),
    }
}

/// An event may not end before it starts
fn valid_time_range(kind: DeadlineKind, doc: &Document) -> bool {
    if kind != DeadlineKind::Event {
        return true;
    }
    match (doc.get_timestamp("start_time"), doc.get_timestamp("end_time")) {
        (Some(start), Some(end)) => end.to_utc() >= start.to_utc(),
        _ => true,
    }
}
