use crate::shared::usecase::UseCase;
use study_planner_domain::{
    normalize_document_outbound, DeadlineKind, Document, User, UserTimeContext, ID,
};
use study_planner_infra::PlannerContext;
use thiserror::Error;

/// One of the user's assignments or events in the user's local time
#[derive(Debug)]
pub struct GetDeadlineUseCase {
    pub user: User,
    pub kind: DeadlineKind,
    pub record_id: ID,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("The record with id: {0}, was not found.")]
    NotFound(ID),
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for GetDeadlineUseCase {
    type Response = Document;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetDeadline";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let mut record = match ctx
            .repos
            .deadlines
            .find(self.kind, &self.user.id, &self.record_id)
            .await
        {
            Ok(Some(doc)) => doc,
            Ok(None) => return Err(UseCaseErrors::NotFound(self.record_id.clone())),
            Err(e) => return Err(UseCaseErrors::StorageError(e.to_string())),
        };

        let time_ctx = UserTimeContext::for_user(&self.user, &ctx.timezones);
        normalize_document_outbound(&ctx.timezones, &mut record, &time_ctx.timezone);
        Ok(record)
    }
}
