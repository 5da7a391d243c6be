use crate::{
    date::format_date,
    deadline::{DeadlineKind, DeadlineRecord},
    notification::Notification,
    user::User,
};
use chrono::prelude::*;
use chrono_tz::Tz;

/// A `Reminder` is the message sent to a `User` when one of their
/// deadlines enters the notification window
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    /// Address of the user that should be reminded
    pub to: String,
    pub subject: String,
    pub html_body: String,
    /// The `DeadlineRecord` this `Reminder` is about. Only used for logging.
    pub reference: String,
}

impl Reminder {
    /// `local_deadline` is the deadline already projected to the user's timezone
    pub fn for_deadline(user: &User, record: &DeadlineRecord, local_deadline: &DateTime<Tz>) -> Self {
        let when = format_date(local_deadline);
        let title = escape_html(&record.title);
        let (subject, heading, sentence) = match record.kind {
            DeadlineKind::Assignment => (
                "Assignment Due Soon - Student Dashboard",
                "Assignment Due Reminder",
                format!(
                    "This is a reminder that your assignment <strong>{}</strong> is due on {}.",
                    title, when
                ),
            ),
            DeadlineKind::Event => (
                "Event Starting Soon - Student Dashboard",
                "Event Reminder",
                format!(
                    "This is a reminder that your event <strong>{}</strong> is starting on {}.",
                    title, when
                ),
            ),
        };

        let html_body = format!(
            "<html>\n  <body>\n    <h2>{}</h2>\n    <p>Hello {},</p>\n    <p>{}</p>\n    <p>Log in to your dashboard to view more details.</p>\n  </body>\n</html>\n",
            heading,
            escape_html(&user.name),
            sentence
        );

        Self {
            to: user.email.clone(),
            subject: subject.to_string(),
            html_body,
            reference: record.id.as_string(),
        }
    }
}

/// Escapes text taken from user records before it is placed in a mail body
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Builds the inbox entry announcing `record` to its owner
pub fn deadline_notification(
    record: &DeadlineRecord,
    local_deadline: &DateTime<Tz>,
    now: DateTime<Utc>,
) -> Notification {
    let when = format_date(local_deadline);
    let (title, message) = match record.kind {
        DeadlineKind::Assignment => (
            "Assignment Due Soon",
            format!("Your assignment '{}' is due on {}.", record.title, when),
        ),
        DeadlineKind::Event => (
            "Event Starting Soon",
            format!("Your event '{}' is starting on {}.", record.title, when),
        ),
    };

    Notification::new(
        record.owner_user_id.clone(),
        record.kind.notification_kind(),
        title.to_string(),
        message,
        Some(record.id.as_string()),
        now,
    )
}
