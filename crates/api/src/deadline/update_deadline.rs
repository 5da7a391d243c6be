use super::{read_payload, valid_status, valid_time_range};
use crate::shared::usecase::UseCase;
use study_planner_domain::{
    apply_deadline_edit, normalize_document_outbound, DeadlineKind, Document, DocumentError,
    User, UserTimeContext, ID, UPDATED_AT_FIELD,
};
use study_planner_infra::PlannerContext;
use thiserror::Error;
use tracing::debug;

/// Applies a partial update, expressed in the user's local time, to one of
/// the user's assignments or events.
///
/// Moving the deadline or changing the completion state makes the record
/// eligible for a new reminder.
#[derive(Debug)]
pub struct UpdateDeadlineUseCase {
    pub user: User,
    pub kind: DeadlineKind,
    pub record_id: ID,
    pub payload: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] DocumentError),
    #[error("The record with id: {0}, was not found.")]
    NotFound(ID),
    #[error("Invalid status")]
    InvalidStatus,
    #[error("End time must be after start time")]
    InvalidTimeRange,
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for UpdateDeadlineUseCase {
    /// The updated record in the user's local time
    type Response = Document;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "UpdateDeadline";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let time_ctx = UserTimeContext::for_user(&self.user, &ctx.timezones);
        let kind = self.kind;
        let mut changes = read_payload(
            kind,
            self.payload.take(),
            &ctx.timezones,
            &time_ctx.timezone,
        )?;
        if !valid_status(kind, &changes) {
            return Err(UseCaseErrors::InvalidStatus);
        }

        let current = match ctx
            .repos
            .deadlines
            .find(kind, &self.user.id, &self.record_id)
            .await
        {
            Ok(Some(doc)) => doc,
            Ok(None) => return Err(UseCaseErrors::NotFound(self.record_id.clone())),
            Err(e) => return Err(UseCaseErrors::StorageError(e.to_string())),
        };

        let mut updated = current.clone();
        updated.merge(&changes);
        if !valid_time_range(kind, &updated) {
            return Err(UseCaseErrors::InvalidTimeRange);
        }

        if apply_deadline_edit(kind, &current, &mut changes) {
            debug!("Record {} can be reminded about again", self.record_id);
        }
        changes.insert(UPDATED_AT_FIELD, ctx.sys.now());

        let res = ctx
            .repos
            .deadlines
            .update(kind, &self.user.id, &self.record_id, changes.clone())
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;
        if res.matched_count == 0 {
            return Err(UseCaseErrors::NotFound(self.record_id.clone()));
        }

        updated.merge(&changes);
        normalize_document_outbound(&ctx.timezones, &mut updated, &time_ctx.timezone);
        Ok(updated)
    }
}
