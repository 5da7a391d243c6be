use crate::{deadline::scan_due_dates::ScanDueDatesUseCase, shared::usecase::execute};
use std::time::Duration;
use study_planner_infra::PlannerContext;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{info, info_span};
use tracing_futures::Instrument;

const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs a due-date scan right away and then once every `scan_interval`.
///
/// A cycle that overruns the interval swallows the ticks it missed instead of
/// being followed by a burst of catch-up cycles. A shutdown signal is only
/// acted upon between cycles, so a running cycle always completes.
pub fn start_due_date_scanner(
    ctx: PlannerContext,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(ctx.config.scan_interval.max(MIN_SCAN_INTERVAL));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let stopped = tokio::select! {
                _ = interval.tick() => false,
                // A dropped sender counts as a shutdown
                changed = shutdown.changed() => changed.is_err(),
            };
            if stopped || *shutdown.borrow() {
                break;
            }

            let usecase = ScanDueDatesUseCase::default();
            if let Ok(report) = execute(usecase, &ctx)
                .instrument(info_span!("due_date_scan"))
                .await
            {
                info!(
                    "Scanned {} users, created {} notifications, {} users failed",
                    report.users_scanned, report.notifications_created, report.failed_users
                );
            }
        }
        info!("Due-date scanner stopped");
    })
}
