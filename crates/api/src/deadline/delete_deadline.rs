use crate::shared::usecase::UseCase;
use study_planner_domain::{DeadlineKind, User, ID};
use study_planner_infra::PlannerContext;
use thiserror::Error;
use tracing::warn;

/// Deletes one of the user's assignments or events together with the
/// notifications created for it
#[derive(Debug)]
pub struct DeleteDeadlineUseCase {
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
impl UseCase for DeleteDeadlineUseCase {
    type Response = ();

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DeleteDeadline";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let deleted = ctx
            .repos
            .deadlines
            .delete(self.kind, &self.user.id, &self.record_id)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;
        if !deleted {
            return Err(UseCaseErrors::NotFound(self.record_id.clone()));
        }

        // Best effort, the record itself is already gone
        if let Err(e) = ctx
            .repos
            .notifications
            .delete_for_reference(&self.user.id, self.kind.notification_kind(), &self.record_id)
            .await
        {
            warn!(
                "Unable to remove the notifications of deleted record {}: {:?}",
                self.record_id, e
            );
        }
        Ok(())
    }
}
