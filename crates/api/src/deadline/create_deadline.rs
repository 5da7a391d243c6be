use super::{read_payload, valid_status, valid_time_range};
use crate::shared::usecase::UseCase;
use study_planner_domain::{
    normalize_document_outbound, DeadlineKind, Document, DocumentError, User, UserTimeContext,
    CREATED_AT_FIELD, NOTIFICATION_SENT_FIELD, STATUS_FIELD, TITLE_FIELD, UPDATED_AT_FIELD,
    USER_ID_FIELD,
};
use study_planner_infra::PlannerContext;
use thiserror::Error;

/// Creates an assignment or event from a payload expressed in the user's
/// local time
#[derive(Debug)]
pub struct CreateDeadlineUseCase {
    pub user: User,
    pub kind: DeadlineKind,
    pub payload: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] DocumentError),
    #[error("Missing required field: `{0}`")]
    MissingField(&'static str),
    #[error("Invalid status")]
    InvalidStatus,
    #[error("End time must be after start time")]
    InvalidTimeRange,
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for CreateDeadlineUseCase {
    /// The stored record in the user's local time
    type Response = Document;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateDeadline";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let time_ctx = UserTimeContext::for_user(&self.user, &ctx.timezones);
        let kind = self.kind;
        let mut doc = read_payload(
            kind,
            self.payload.take(),
            &ctx.timezones,
            &time_ctx.timezone,
        )?;

        if doc.get_str(TITLE_FIELD).is_none() {
            return Err(UseCaseErrors::MissingField(TITLE_FIELD));
        }
        for field in kind.temporal_fields().iter() {
            if doc.get_timestamp(field).is_none() {
                return Err(UseCaseErrors::MissingField(*field));
            }
        }
        if kind.tracks_completion() && !doc.contains_key(STATUS_FIELD) {
            doc.insert(STATUS_FIELD, "pending");
        }
        if !valid_status(kind, &doc) {
            return Err(UseCaseErrors::InvalidStatus);
        }
        if !valid_time_range(kind, &doc) {
            return Err(UseCaseErrors::InvalidTimeRange);
        }

        let now = ctx.sys.now();
        doc.insert(USER_ID_FIELD, &self.user.id);
        doc.insert(NOTIFICATION_SENT_FIELD, false);
        doc.insert(CREATED_AT_FIELD, now);
        doc.insert(UPDATED_AT_FIELD, now);

        let id = ctx
            .repos
            .deadlines
            .insert(kind, doc.clone())
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;
        doc.insert(Document::ID_FIELD, &id);

        normalize_document_outbound(&ctx.timezones, &mut doc, &time_ctx.timezone);
        Ok(doc)
    }
}
