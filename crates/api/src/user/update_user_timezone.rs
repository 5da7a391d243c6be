use crate::shared::usecase::UseCase;
use study_planner_domain::{TimezoneError, User, ID};
use study_planner_infra::PlannerContext;
use thiserror::Error;
use tracing::info;

/// Changes the timezone the user's records are interpreted and presented in.
///
/// Stored records are not touched, they are already in UTC.
#[derive(Debug)]
pub struct UpdateUserTimezoneUseCase {
    pub user_id: ID,
    pub timezone: String,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error(transparent)]
    InvalidTimezone(#[from] TimezoneError),
    #[error("A user with id: {0}, was not found.")]
    UserNotFound(ID),
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for UpdateUserTimezoneUseCase {
    type Response = User;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "UpdateUserTimezone";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let timezone = self.timezone.trim();
        ctx.timezones.resolve(timezone)?;

        let updated = ctx
            .repos
            .users
            .update_timezone(&self.user_id, timezone)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;
        if !updated {
            return Err(UseCaseErrors::UserNotFound(self.user_id.clone()));
        }

        let user = match ctx.repos.users.find(&self.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(UseCaseErrors::UserNotFound(self.user_id.clone())),
            Err(e) => return Err(UseCaseErrors::StorageError(e.to_string())),
        };
        info!("User {} now uses timezone {}", user.id, timezone);
        Ok(user)
    }
}
