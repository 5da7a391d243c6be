pub mod deadline;
mod job_schedulers;
pub mod notification;
mod shared;
pub mod user;

use job_schedulers::start_due_date_scanner;
pub use shared::usecase::{execute, UseCase};
use study_planner_infra::PlannerContext;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info};

pub struct Application {
    context: PlannerContext,
    shutdown: watch::Sender<bool>,
    scanner: JoinHandle<()>,
}

impl Application {
    /// Starts the background jobs, must be called within a tokio runtime
    pub fn new(context: PlannerContext) -> Self {
        let (shutdown, shutdown_receiver) = watch::channel(false);
        let scanner = Application::start_job_schedulers(context.clone(), shutdown_receiver);

        Self {
            context,
            shutdown,
            scanner,
        }
    }

    pub fn context(&self) -> &PlannerContext {
        &self.context
    }

    fn start_job_schedulers(
        context: PlannerContext,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        start_due_date_scanner(context, shutdown)
    }

    /// Stops the scanner after its current cycle and waits until every
    /// queued reminder has been handed to the notifier
    pub async fn shutdown(self) {
        info!("Shutting down");
        if self.shutdown.send(true).is_err() {
            error!("The due-date scanner stopped unexpectedly");
        }
        if let Err(e) = self.scanner.await {
            error!("The due-date scanner panicked: {:?}", e);
        }
        self.context.reminders.shutdown().await;
        info!("Shutdown complete");
    }
}
