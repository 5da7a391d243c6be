use crate::shared::usecase::UseCase;
use study_planner_domain::{normalize_documents_outbound, Document, User, UserTimeContext};
use study_planner_infra::{PlannerContext, RecordDocument};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 100;

/// Lists the user's notification inbox, newest first, with `created_at`
/// in the user's local time
#[derive(Debug)]
pub struct GetNotificationsUseCase {
    pub user: User,
    pub unread_only: bool,
    pub skip: usize,
    /// Defaults to `DEFAULT_PAGE_SIZE` and is capped at `MAX_PAGE_SIZE`
    pub limit: Option<usize>,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for GetNotificationsUseCase {
    type Response = Vec<Document>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetNotifications";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
            .max(1);
        let notifications = ctx
            .repos
            .notifications
            .find_by_user(&self.user.id, self.unread_only, self.skip, limit)
            .await
            .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;

        let time_ctx = UserTimeContext::for_user(&self.user, &ctx.timezones);
        let mut docs: Vec<_> = notifications.iter().map(|n| n.to_document()).collect();
        normalize_documents_outbound(&ctx.timezones, &mut docs, &time_ctx.timezone);
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::setup_context;
    use chrono::{prelude::*, Duration};
    use study_planner_domain::{Notification, NotificationKind, Timestamp, CREATED_AT_FIELD};

    fn now() -> DateTime<Utc> {
        "2024-01-15T12:00:00Z".parse().unwrap()
    }

    async fn fill_inbox(ctx: &PlannerContext, user: &User, count: i64) {
        for i in 0..count {
            let notification = Notification::new(
                user.id.clone(),
                NotificationKind::EventStarting,
                "Upcoming Event".into(),
                format!("Event {}", i),
                None,
                now() - Duration::minutes(i),
            );
            ctx.repos.notifications.insert(&notification).await.unwrap();
        }
    }

    #[tokio::test]
    async fn the_inbox_is_paged_and_localized() {
        let (ctx, _) = setup_context(now());
        let user = User::new("ada@example.com", "Ada").with_timezone("Europe/Oslo");
        fill_inbox(&ctx, &user, 120).await;

        let mut usecase = GetNotificationsUseCase {
            user: user.clone(),
            unread_only: false,
            skip: 0,
            limit: None,
        };
        let page = usecase.execute(&ctx).await.unwrap();
        assert_eq!(page.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(page[0].get_str("message"), Some("Event 0"));
        assert_eq!(
            page[0].get_timestamp(CREATED_AT_FIELD).map(Timestamp::to_rfc3339),
            Some("2024-01-15T13:00:00+01:00".to_string())
        );

        let mut usecase = GetNotificationsUseCase {
            user: user.clone(),
            unread_only: false,
            skip: 0,
            limit: Some(1000),
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().len(), MAX_PAGE_SIZE);

        let mut usecase = GetNotificationsUseCase {
            user,
            unread_only: false,
            skip: 110,
            limit: Some(20),
        };
        let last = usecase.execute(&ctx).await.unwrap();
        assert_eq!(last.len(), 10);
        assert_eq!(last[9].get_str("message"), Some("Event 119"));
    }
}
