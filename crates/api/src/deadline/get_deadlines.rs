use crate::shared::usecase::UseCase;
use chrono::{DateTime, Utc};
use study_planner_domain::{
    normalize_documents_outbound, to_canonical, DeadlineKind, Document, Timestamp,
    TimezoneRegistry, User, UserTimeContext, ASSIGNMENT_STATUSES, PRIORITIES,
};
use study_planner_infra::{DeadlineQuery, PlannerContext};
use thiserror::Error;

const DEFAULT_LIMIT: usize = 100;

/// Lists the user's assignments or events, earliest deadline first, with
/// every timestamp in the user's local time.
///
/// `due_after` and `due_before` are inclusive bounds on the deadline. Like
/// any other timestamp the user supplies, they are read in the user's local
/// time unless they carry an offset.
#[derive(Debug)]
pub struct GetDeadlinesUseCase {
    pub user: User,
    pub kind: DeadlineKind,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_after: Option<String>,
    pub due_before: Option<String>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl GetDeadlinesUseCase {
    pub fn new(user: User, kind: DeadlineKind) -> Self {
        Self {
            user,
            kind,
            status: None,
            priority: None,
            due_after: None,
            due_before: None,
            skip: 0,
            limit: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Invalid status value")]
    InvalidStatus,
    #[error("Invalid priority value")]
    InvalidPriority,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Reads a user supplied deadline bound in the user's `timezone`
fn canonical_bound(
    raw: Option<&String>,
    registry: &TimezoneRegistry,
    timezone: &str,
) -> Result<Option<DateTime<Utc>>, UseCaseErrors> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let local =
                Timestamp::parse(raw).ok_or_else(|| UseCaseErrors::InvalidDate(raw.clone()))?;
            Ok(to_canonical(registry, Some(&local), timezone))
        }
    }
}

#[async_trait::async_trait]
impl UseCase for GetDeadlinesUseCase {
    type Response = Vec<Document>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetDeadlines";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let time_ctx = UserTimeContext::for_user(&self.user, &ctx.timezones);

        if let Some(status) = &self.status {
            if !self.kind.tracks_completion() || !ASSIGNMENT_STATUSES.contains(&status.as_str()) {
                return Err(UseCaseErrors::InvalidStatus);
            }
        }
        if let Some(priority) = &self.priority {
            if !PRIORITIES.contains(&priority.as_str()) {
                return Err(UseCaseErrors::InvalidPriority);
            }
        }

        let query = DeadlineQuery {
            status: self.status.clone(),
            priority: self.priority.clone(),
            due_after: canonical_bound(self.due_after.as_ref(), &ctx.timezones, &time_ctx.timezone)?,
            due_before: canonical_bound(
                self.due_before.as_ref(),
                &ctx.timezones,
                &time_ctx.timezone,
            )?,
            skip: self.skip,
            limit: Some(self.limit.unwrap_or(DEFAULT_LIMIT).max(1)),
        };
        let mut records = ctx
            .repos
            .deadlines
            .find_by_user(self.kind, &self.user.id, &query)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;

        normalize_documents_outbound(&ctx.timezones, &mut records, &time_ctx.timezone);
        Ok(records)
    }
}
