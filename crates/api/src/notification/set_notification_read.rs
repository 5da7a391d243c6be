use crate::shared::usecase::UseCase;
use study_planner_domain::{User, ID};
use study_planner_infra::PlannerContext;
use thiserror::Error;

/// Marks one of the user's notifications as read or unread
#[derive(Debug)]
pub struct SetNotificationReadUseCase {
    pub user: User,
    pub notification_id: ID,
    pub read: bool,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("The notification with id: {0}, was not found.")]
    NotFound(ID),
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for SetNotificationReadUseCase {
    type Response = ();

    type Errors = UseCaseErrors;

    const NAME: &'static str = "SetNotificationRead";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let found = ctx
            .repos
            .notifications
            .set_read(&self.user.id, &self.notification_id, self.read)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;
        if !found {
            return Err(UseCaseErrors::NotFound(self.notification_id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notification::get_unread_count::GetUnreadCountUseCase, shared::test_utils::setup_context,
    };
    use chrono::prelude::*;
    use study_planner_domain::{Notification, NotificationKind};

    #[tokio::test]
    async fn only_the_owner_can_mark_a_notification() {
        let now = Utc::now();
        let (ctx, _) = setup_context(now);
        let user = User::new("ada@example.com", "Ada");
        let notification = Notification::new(
            user.id.clone(),
            NotificationKind::AssignmentDue,
            "Assignment Due Soon".into(),
            "Essay".into(),
            None,
            now,
        );
        ctx.repos.notifications.insert(&notification).await.unwrap();

        let mut usecase = SetNotificationReadUseCase {
            user: User::new("eve@example.com", "Eve"),
            notification_id: notification.id.clone(),
            read: true,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::NotFound(_))
        ));

        let mut usecase = SetNotificationReadUseCase {
            user: user.clone(),
            notification_id: notification.id.clone(),
            read: true,
        };
        assert!(usecase.execute(&ctx).await.is_ok());
        let mut count = GetUnreadCountUseCase { user: user.clone() };
        assert_eq!(count.execute(&ctx).await.unwrap(), 0);

        let mut usecase = SetNotificationReadUseCase {
            user: user.clone(),
            notification_id: notification.id,
            read: false,
        };
        assert!(usecase.execute(&ctx).await.is_ok());
        let mut count = GetUnreadCountUseCase { user };
        assert_eq!(count.execute(&ctx).await.unwrap(), 1);
    }
}
