mod telemetry;

use study_planner_api::Application;
use study_planner_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("study_planner_notifier".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await?;
    let app = Application::new(context);
    info!("Due-date scanner started");

    tokio::signal::ctrl_c().await?;
    app.shutdown().await;
    Ok(())
}
