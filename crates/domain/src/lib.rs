mod date;
mod deadline;
mod document;
mod normalize;
mod notification;
mod reminder;
mod shared;
mod timezone;
mod user;

pub use date::{format_date, localize, to_canonical, to_local};
pub use deadline::{
    apply_deadline_edit, DeadlineKind, DeadlineRecord, NotificationWindow, ASSIGNMENT_STATUSES,
    COMPLETED_STATUS, CREATED_AT_FIELD, NOTIFICATION_SENT_FIELD, PRIORITIES, PRIORITY_FIELD,
    STATUS_FIELD, TITLE_FIELD, UPDATED_AT_FIELD, USER_ID_FIELD,
};
pub use document::{Document, DocumentError, Timestamp, Value};
pub use normalize::{
    normalize_document_inbound, normalize_document_outbound, normalize_documents_outbound,
    normalize_inbound, normalize_outbound,
};
pub use notification::{Notification, NotificationKind};
pub use reminder::{deadline_notification, Reminder};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use timezone::{valid_timezones, TimezoneError, TimezoneRegistry, DEFAULT_TIMEZONE};
pub use user::{User, UserTimeContext};
