mod helpers;

use helpers::setup::setup_context;
use serde_json::json;
use std::time::Duration;
use study_planner_api::{
    deadline::{
        create_deadline::CreateDeadlineUseCase, scan_due_dates::ScanDueDatesUseCase,
        update_deadline::UpdateDeadlineUseCase,
    },
    execute,
    notification::{
        get_notifications::GetNotificationsUseCase, get_unread_count::GetUnreadCountUseCase,
        mark_all_notifications_read::MarkAllNotificationsReadUseCase,
    },
    user::update_user_timezone::UpdateUserTimezoneUseCase,
    Application,
};
use study_planner_domain::{DeadlineKind, Timestamp, User, CREATED_AT_FIELD};

async fn unread(ctx: &study_planner_infra::PlannerContext, user: &User) -> u64 {
    execute(GetUnreadCountUseCase { user: user.clone() }, ctx)
        .await
        .unwrap()
}

#[tokio::test]
async fn a_local_deadline_is_reminded_about_once() {
    let test = setup_context("2024-03-10T00:00:00Z");
    let ctx = &test.ctx;

    let user = User::new("ada@example.com", "Ada");
    ctx.repos.users.insert(&user).await.unwrap();
    let user = execute(
        UpdateUserTimezoneUseCase {
            user_id: user.id.clone(),
            timezone: "America/New_York".into(),
        },
        ctx,
    )
    .await
    .unwrap();

    execute(
        CreateDeadlineUseCase {
            user: user.clone(),
            kind: DeadlineKind::Assignment,
            payload: json!({ "title": "Essay", "due_date": "2024-03-10T14:00" }),
        },
        ctx,
    )
    .await
    .unwrap();
    execute(
        CreateDeadlineUseCase {
            user: user.clone(),
            kind: DeadlineKind::Event,
            payload: json!({
                "title": "Seminar",
                "start_time": "2024-03-20T09:00",
                "end_time": "2024-03-20T10:00"
            }),
        },
        ctx,
    )
    .await
    .unwrap();

    let report = execute(ScanDueDatesUseCase::default(), ctx).await.unwrap();
    assert_eq!(report.users_scanned, 1);
    assert_eq!(report.notifications_created, 1);
    let report = execute(ScanDueDatesUseCase::default(), ctx).await.unwrap();
    assert_eq!(report.notifications_created, 0);

    let inbox = execute(
        GetNotificationsUseCase {
            user: user.clone(),
            unread_only: true,
            skip: 0,
            limit: None,
        },
        ctx,
    )
    .await
    .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(
        inbox[0].get_str("message"),
        Some("Your assignment 'Essay' is due on March 10, 2024 at 02:00 PM.")
    );
    assert_eq!(
        inbox[0]
            .get_timestamp(CREATED_AT_FIELD)
            .map(Timestamp::to_rfc3339),
        Some("2024-03-09T19:00:00-05:00".to_string())
    );

    // The seminar enters the window ten days later
    test.clock.set("2024-03-19T14:00:00Z");
    let report = execute(ScanDueDatesUseCase::default(), ctx).await.unwrap();
    assert_eq!(report.notifications_created, 1);
    assert_eq!(unread(ctx, &user).await, 2);

    let marked = execute(MarkAllNotificationsReadUseCase { user: user.clone() }, ctx)
        .await
        .unwrap();
    assert_eq!(marked, 2);
    assert_eq!(unread(ctx, &user).await, 0);

    ctx.reminders.shutdown().await;
    let sent = test.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|message| message.to == "ada@example.com"));
    assert!(sent
        .iter()
        .any(|message| message.html_body.contains("March 20, 2024 at 09:00 AM")));
}

#[tokio::test]
async fn moving_a_deadline_allows_another_reminder() {
    let test = setup_context("2024-06-01T00:00:00Z");
    let ctx = &test.ctx;

    let user = User::new("ada@example.com", "Ada").with_timezone("Asia/Tokyo");
    ctx.repos.users.insert(&user).await.unwrap();
    let created = execute(
        CreateDeadlineUseCase {
            user: user.clone(),
            kind: DeadlineKind::Assignment,
            payload: json!({ "title": "Report", "due_date": "2024-06-01T18:00" }),
        },
        ctx,
    )
    .await
    .unwrap();
    let id = created.id().unwrap();

    execute(ScanDueDatesUseCase::default(), ctx).await.unwrap();
    assert_eq!(unread(ctx, &user).await, 1);

    execute(
        UpdateDeadlineUseCase {
            user: user.clone(),
            kind: DeadlineKind::Assignment,
            record_id: id,
            payload: json!({ "due_date": "2024-06-01T20:00" }),
        },
        ctx,
    )
    .await
    .unwrap();
    execute(ScanDueDatesUseCase::default(), ctx).await.unwrap();
    assert_eq!(unread(ctx, &user).await, 2);

    ctx.reminders.shutdown().await;
    assert_eq!(test.notifier.sent().len(), 2);
}

#[tokio::test]
async fn the_application_scans_in_the_background() {
    let test = setup_context("2024-01-01T00:00:00Z");
    let user = User::new("ada@example.com", "Ada");
    test.ctx.repos.users.insert(&user).await.unwrap();
    execute(
        CreateDeadlineUseCase {
            user: user.clone(),
            kind: DeadlineKind::Event,
            payload: json!({
                "title": "Lab",
                "start_time": "2024-01-01T08:00",
                "end_time": "2024-01-01T09:00"
            }),
        },
        &test.ctx,
    )
    .await
    .unwrap();

    let app = Application::new(test.ctx.clone());
    let mut created = 0;
    for _ in 0..100 {
        created = unread(app.context(), &user).await;
        if created > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(created, 1);

    app.shutdown().await;
    assert_eq!(test.notifier.sent().len(), 1);
}
