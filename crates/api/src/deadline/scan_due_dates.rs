use crate::shared::usecase::UseCase;
use chrono::prelude::*;
use study_planner_domain::{
    deadline_notification, DeadlineKind, DeadlineRecord, NotificationWindow, Reminder, User,
    UserTimeContext,
};
use study_planner_infra::PlannerContext;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// One cycle of the due-date scanner.
///
/// Goes through every user page by page and, for each user, creates a
/// notification and queues a reminder for every assignment and event whose
/// deadline lies inside the notification window. Each record is claimed
/// through the `NotificationGate` first, so overlapping cycles never notify
/// about the same deadline twice. A failure for one user is logged and the
/// cycle moves on to the next user.
#[derive(Debug, Default)]
pub struct ScanDueDatesUseCase {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanReport {
    pub users_scanned: usize,
    pub notifications_created: usize,
    pub failed_users: usize,
}

#[derive(Error, Debug)]
pub enum UseCaseErrors {
    #[error("Unable to enumerate users: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for ScanDueDatesUseCase {
    type Response = ScanReport;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "ScanDueDates";

    async fn execute(&mut self, ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        let page_size = ctx.config.users_page_size;
        let mut report = ScanReport::default();
        let mut after = None;

        loop {
            let page = ctx
                .repos
                .users
                .find_page(after.as_ref(), page_size)
                .await
                .map_err(|e| UseCaseErrors::StorageError(e.to_string()))?;

            for user in &page.users {
                report.users_scanned += 1;
                match scan_user(ctx, user).await {
                    Ok(created) => report.notifications_created += created,
                    Err(e) => {
                        report.failed_users += 1;
                        error!("Unable to scan the deadlines of user {}: {:?}", user.id, e);
                    }
                }
            }

            if page.read < page_size {
                break;
            }
            after = page.last_key;
        }

        info!(
            "Due date scan done. Users: {}, notifications: {}, failed users: {}",
            report.users_scanned, report.notifications_created, report.failed_users
        );
        Ok(report)
    }
}

/// Returns the number of notifications created for `user`. The window is
/// anchored at the time the user is reached, not at the start of the cycle.
async fn scan_user(ctx: &PlannerContext, user: &User) -> anyhow::Result<usize> {
    let now = ctx.sys.now();
    let time_ctx = UserTimeContext::for_user(user, &ctx.timezones);
    let (_, tz) = ctx.timezones.resolve_or_default(Some(&time_ctx.timezone));
    let window = NotificationWindow::ahead_of(now, ctx.config.notification_window);
    let mut created = 0;

    for kind in DeadlineKind::ALL.iter() {
        let docs = ctx
            .repos
            .deadlines
            .find_due(*kind, &user.id, &window, ctx.config.deadlines_per_user_limit)
            .await?;

        for doc in &docs {
            let record = match DeadlineRecord::from_document(*kind, doc) {
                Some(record) => record,
                None => {
                    warn!(
                        "Skipping malformed {} record: {:?}",
                        kind.collection(),
                        doc.id()
                    );
                    continue;
                }
            };
            if record.owner_user_id != user.id || !window.contains(&record.deadline) {
                continue;
            }

            if !ctx.gate.claim(*kind, &record.id).await? {
                debug!("Record {} was already claimed", record.id);
                continue;
            }

            let local_deadline = record.deadline.with_timezone(&tz);
            let notification = deadline_notification(&record, &local_deadline, now);
            ctx.repos.notifications.insert(&notification).await?;
            created += 1;

            let reminder = Reminder::for_deadline(user, &record, &local_deadline);
            ctx.reminders.enqueue(reminder).await;
        }
    }

    Ok(created)
}
