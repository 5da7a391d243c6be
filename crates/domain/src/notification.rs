use crate::shared::entity::{Entity, ID};
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AssignmentDue,
    EventStarting,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignmentDue => "assignment_due",
            Self::EventStarting => "event_starting",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assignment_due" => Ok(Self::AssignmentDue),
            "event_starting" => Ok(Self::EventStarting),
            _ => Err(format!("Unknown notification kind: {}", s)),
        }
    }
}

/// An entry in a user's notification inbox.
///
/// Created once by the due-date scanner when a deadline enters the
/// notification window. Afterwards only `read` ever changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: ID,
    pub user_id: ID,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Id of the record this notification is about
    pub reference_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: ID,
        kind: NotificationKind,
        title: String,
        message: String,
        reference_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            user_id,
            kind,
            title,
            message,
            reference_id,
            read: false,
            created_at,
        }
    }
}

impl Entity for Notification {
    fn id(&self) -> &ID {
        &self.id
    }
}
