use crate::shared::usecase::UseCase;
use study_planner_domain::User;
use study_planner_infra::PlannerContext;
use thiserror::Error;

#[derive(Debug)]
pub struct GetUnreadCountUseCase {
    pub user: User,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for GetUnreadCountUseCase {
    type Response = u64;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetUnreadCount";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .notifications
            .unread_count(&self.user.id)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))
    }
}
