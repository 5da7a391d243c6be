use crate::{
    document::{Document, Value},
    notification::NotificationKind,
    shared::entity::{Entity, ID},
};
use chrono::{prelude::*, Duration};

pub const USER_ID_FIELD: &str = "user_id";
pub const TITLE_FIELD: &str = "title";
pub const STATUS_FIELD: &str = "status";
pub const NOTIFICATION_SENT_FIELD: &str = "notification_sent";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";
pub const COMPLETED_STATUS: &str = "completed";
pub const ASSIGNMENT_STATUSES: [&str; 3] = ["pending", "in_progress", COMPLETED_STATUS];
pub const PRIORITY_FIELD: &str = "priority";
pub const PRIORITIES: [&str; 3] = ["low", "medium", "high"];

/// The collections holding records with a deadline a user should be
/// reminded about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadlineKind {
    /// `assignments`, due at `due_date`
    Assignment,
    /// `events`, starting at `start_time`
    Event,
}

impl DeadlineKind {
    pub const ALL: [DeadlineKind; 2] = [DeadlineKind::Assignment, DeadlineKind::Event];

    pub fn collection(&self) -> &'static str {
        match self {
            Self::Assignment => "assignments",
            Self::Event => "events",
        }
    }

    pub fn deadline_field(&self) -> &'static str {
        match self {
            Self::Assignment => "due_date",
            Self::Event => "start_time",
        }
    }

    /// Fields of a user payload that hold timestamps
    pub fn temporal_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Assignment => &["due_date"],
            Self::Event => &["start_time", "end_time"],
        }
    }

    pub fn notification_kind(&self) -> NotificationKind {
        match self {
            Self::Assignment => NotificationKind::AssignmentDue,
            Self::Event => NotificationKind::EventStarting,
        }
    }

    /// Whether records of this kind carry a `status` that can be `completed`.
    /// Completed records are never reminded about.
    pub fn tracks_completion(&self) -> bool {
        matches!(self, Self::Assignment)
    }
}

/// Any record that has a deadline, seen through the fields the
/// due-date scanner needs
#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineRecord {
    pub id: ID,
    pub kind: DeadlineKind,
    pub owner_user_id: ID,
    pub deadline: DateTime<Utc>,
    pub title: String,
    pub notification_sent: bool,
}

impl DeadlineRecord {
    /// Returns `None` when the document lacks any of the required fields
    pub fn from_document(kind: DeadlineKind, doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.id()?,
            kind,
            owner_user_id: doc.get_str(USER_ID_FIELD)?.parse().ok()?,
            deadline: doc.get_timestamp(kind.deadline_field())?.to_utc(),
            title: doc.get_str(TITLE_FIELD)?.to_string(),
            notification_sent: doc.get_bool(NOTIFICATION_SENT_FIELD).unwrap_or(false),
        })
    }
}

impl Entity for DeadlineRecord {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// The open interval of time in which a deadline triggers a reminder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotificationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NotificationWindow {
    pub fn ahead_of(now: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start: now,
            end: now + length,
        }
    }

    /// Both bounds are exclusive
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant > self.start && *instant < self.end
    }
}

/// Prepares `changes` to an existing record of `kind` for persistence.
///
/// When the changes move the deadline or alter the completion state the
/// `notification_sent` flag is reset so the record can trigger again.
/// Returns whether the flag was reset.
pub fn apply_deadline_edit(kind: DeadlineKind, current: &Document, changes: &mut Document) -> bool {
    let field = kind.deadline_field();
    let deadline_moved = match (changes.get(field), current.get(field)) {
        (Some(new), Some(old)) => !new.matches(old),
        (Some(_), None) => true,
        _ => false,
    };

    let completion_changed = kind.tracks_completion()
        && match changes.get(STATUS_FIELD) {
            Some(new) => is_completed(Some(new)) != is_completed(current.get(STATUS_FIELD)),
            None => false,
        };

    if deadline_moved || completion_changed {
        changes.insert(NOTIFICATION_SENT_FIELD, Value::Bool(false));
        true
    } else {
        false
    }
}

fn is_completed(status: Option<&Value>) -> bool {
    status.and_then(Value::as_str) == Some(COMPLETED_STATUS)
}
