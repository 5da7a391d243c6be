//! Applies timezone conversion to every timestamp held by a record.
//!
//! Records are walked recursively through nested documents and arrays.
//! Offsets are derived for each element on its own, so a result page
//! holding records of different shapes is still converted completely.

use crate::{
    date::{to_canonical, to_local},
    document::{Document, Timestamp, Value},
    timezone::TimezoneRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    Inbound,
    Outbound,
}

/// Replaces every canonical timestamp in `value` by its projection in `timezone`.
/// Used on records read from the store before they are handed to a user.
pub fn normalize_outbound(registry: &TimezoneRegistry, value: &mut Value, timezone: &str) {
    walk(registry, value, timezone, Direction::Outbound);
}

/// Replaces every timestamp in `value`, read as local time in `timezone`,
/// by its canonical UTC form. Used on user payloads before they are persisted.
pub fn normalize_inbound(registry: &TimezoneRegistry, value: &mut Value, timezone: &str) {
    walk(registry, value, timezone, Direction::Inbound);
}

pub fn normalize_document_outbound(registry: &TimezoneRegistry, doc: &mut Document, timezone: &str) {
    walk_document(registry, doc, timezone, Direction::Outbound);
}

pub fn normalize_document_inbound(registry: &TimezoneRegistry, doc: &mut Document, timezone: &str) {
    walk_document(registry, doc, timezone, Direction::Inbound);
}

/// Outbound normalization of a list of records
pub fn normalize_documents_outbound(
    registry: &TimezoneRegistry,
    docs: &mut [Document],
    timezone: &str,
) {
    for doc in docs.iter_mut() {
        walk_document(registry, doc, timezone, Direction::Outbound);
    }
}

fn walk(registry: &TimezoneRegistry, value: &mut Value, timezone: &str, direction: Direction) {
    match value {
        Value::Timestamp(ts) => {
            if let Some(converted) = convert(registry, ts, timezone, direction) {
                *ts = converted;
            }
        }
        Value::Document(doc) => walk_document(registry, doc, timezone, direction),
        Value::Array(items) => {
            for item in items.iter_mut() {
                walk(registry, item, timezone, direction);
            }
        }
        _ => {}
    }
}

fn walk_document(
    registry: &TimezoneRegistry,
    doc: &mut Document,
    timezone: &str,
    direction: Direction,
) {
    for (_, value) in doc.iter_mut() {
        walk(registry, value, timezone, direction);
    }
}

fn convert(
    registry: &TimezoneRegistry,
    ts: &Timestamp,
    timezone: &str,
    direction: Direction,
) -> Option<Timestamp> {
    match direction {
        Direction::Outbound => to_local(registry, Some(ts), timezone),
        Direction::Inbound => to_canonical(registry, Some(ts), timezone).map(Timestamp::Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{prelude::*, DateTime};
    use chrono_tz::Tz;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn zoned_hour(value: Option<&Value>) -> u32 {
        match value {
            Some(Value::Timestamp(Timestamp::Zoned(dt))) => dt.hour(),
            other => panic!("Expected zoned timestamp, got {:?}", other),
        }
    }

    #[test]
    fn it_projects_nested_timestamps() {
        let registry = TimezoneRegistry::new();
        let mut value = Value::Document(
            Document::new()
                .with("title", "Lab report")
                .with("due_date", utc("2024-01-10T15:00:00Z"))
                .with(
                    "milestones",
                    vec![Value::Document(
                        Document::new().with("at", utc("2024-01-05T15:00:00Z")),
                    )],
                )
                .with("meta", Document::new().with("created_at", utc("2024-01-01T00:00:00Z"))),
        );

        normalize_outbound(&registry, &mut value, "America/New_York");
        let doc = value.as_document().unwrap();

        assert_eq!(doc.get_str("title"), Some("Lab report"));
        assert_eq!(zoned_hour(doc.get("due_date")), 10);
        match doc.get("milestones") {
            Some(Value::Array(items)) => {
                assert_eq!(zoned_hour(items[0].as_document().unwrap().get("at")), 10)
            }
            other => panic!("Expected array, got {:?}", other),
        }
        assert_eq!(
            zoned_hour(doc.get("meta").and_then(Value::as_document).unwrap().get("created_at")),
            19
        );
    }

    #[test]
    fn it_converts_inbound_wall_clock_times() {
        let registry = TimezoneRegistry::new();
        let wall: NaiveDateTime = "2024-03-10T14:00:00".parse().unwrap();
        let mut doc = Document::new()
            .with("due_date", wall)
            .with("priority", "high")
            .with("count", 3i64);

        normalize_document_inbound(&registry, &mut doc, "America/New_York");

        assert_eq!(
            doc.get_timestamp("due_date"),
            Some(&Timestamp::Utc(utc("2024-03-10T18:00:00Z")))
        );
        assert_eq!(doc.get_str("priority"), Some("high"));
        assert_eq!(doc.get("count"), Some(&Value::Int(3)));
    }

    #[test]
    fn inbound_then_outbound_restores_the_wall_clock_time() {
        let registry = TimezoneRegistry::new();
        let wall: NaiveDateTime = "2024-03-10T14:00:00".parse().unwrap();
        let mut doc = Document::new().with("due_date", wall);

        normalize_document_inbound(&registry, &mut doc, "America/New_York");
        normalize_document_outbound(&registry, &mut doc, "America/New_York");

        match doc.get_timestamp("due_date") {
            Some(Timestamp::Zoned(local)) => {
                assert_eq!(local.naive_local(), wall);
                assert_eq!(local.timezone(), Tz::America__New_York);
            }
            other => panic!("Expected zoned timestamp, got {:?}", other),
        }
    }

    #[test]
    fn heterogeneous_lists_are_converted_per_element() {
        let registry = TimezoneRegistry::new();
        let mut docs = vec![
            Document::new().with("title", "first"),
            Document::new()
                .with("title", "second")
                .with("start_time", utc("2024-01-01T12:00:00Z")),
        ];

        normalize_documents_outbound(&registry, &mut docs, "Asia/Tokyo");

        assert_eq!(docs[0].len(), 1);
        assert_eq!(zoned_hour(docs[1].get("start_time")), 21);
    }

    #[test]
    fn invalid_timezones_leave_canonical_values_untouched() {
        let registry = TimezoneRegistry::new();
        let mut doc = Document::new()
            .with("due_date", utc("2024-01-01T12:00:00Z"))
            .with("missing", Value::Null);
        let before = doc.clone();

        normalize_document_outbound(&registry, &mut doc, "not-a-real-zone");
        assert_eq!(doc, before);

        normalize_document_inbound(&registry, &mut doc, "not-a-real-zone");
        assert_eq!(doc, before);
    }
}
