use crate::shared::usecase::UseCase;
use study_planner_domain::User;
use study_planner_infra::PlannerContext;
use thiserror::Error;

/// Marks the user's whole inbox as read and returns how many notifications
/// changed
#[derive(Debug)]
pub struct MarkAllNotificationsReadUseCase {
    pub user: User,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for MarkAllNotificationsReadUseCase {
    type Response = u64;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "MarkAllNotificationsRead";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .notifications
            .mark_all_read(&self.user.id)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))
    }
}
