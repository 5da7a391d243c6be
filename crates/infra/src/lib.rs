mod config;
mod gate;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use gate::NotificationGate;
pub use repos::*;
pub use services::*;
use std::sync::Arc;
use study_planner_domain::{TimezoneRegistry, DEFAULT_TIMEZONE};
pub use system::{ISys, RealSys};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct PlannerContext {
    pub repos: Repos,
    pub gate: NotificationGate,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub timezones: Arc<TimezoneRegistry>,
    pub reminders: ReminderDispatcher,
}

struct ContextParams {
    // (connection_string, db_name)
    pub mongodb: (String, String),
}

impl PlannerContext {
    /// Assembles a context around the given parts. Spawns the reminder
    /// workers, so it has to be called within a tokio runtime.
    pub fn new(
        repos: Repos,
        config: Config,
        sys: Arc<dyn ISys>,
        notifier: Arc<dyn INotifier>,
    ) -> Self {
        let reminders = ReminderDispatcher::start(notifier, DispatchPolicy::from(&config));
        let timezones = match TimezoneRegistry::with_default(&config.default_timezone) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("{} Falling back to {}.", e, DEFAULT_TIMEZONE);
                TimezoneRegistry::new()
            }
        };
        Self {
            gate: NotificationGate::new(repos.records.clone()),
            repos,
            config,
            sys,
            timezones: Arc::new(timezones),
            reminders,
        }
    }

    pub fn create_inmemory() -> Self {
        let config = Config::new();
        let notifier = create_notifier(&config);
        Self::new(
            Repos::create_inmemory(),
            config,
            Arc::new(RealSys {}),
            notifier,
        )
    }

    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_mongodb(&params.mongodb.0, &params.mongodb.1)
            .await
            .map_err(|e| anyhow::anyhow!("Unable to connect to MongoDB: {}", e))?;
        let config = Config::new();
        let notifier = create_notifier(&config);
        Ok(Self::new(repos, config, Arc::new(RealSys {}), notifier))
    }
}

fn create_notifier(config: &Config) -> Arc<dyn INotifier> {
    let url = match &config.mailer_url {
        Some(url) => url.clone(),
        None => return Arc::new(LogNotifier {}),
    };

    match WebhookNotifier::new(
        url,
        config.mailer_api_key.clone(),
        config.mailer_from.clone(),
        config.reminder_send_timeout,
    ) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            error!(
                "Unable to create the mail relay client, reminders will only be logged: {:?}",
                e
            );
            Arc::new(LogNotifier {})
        }
    }
}

/// Will setup the correct Infra Context given the environment
pub async fn setup_context() -> anyhow::Result<PlannerContext> {
    const MONGODB_CONNECTION_STRING: &str = "MONGODB_CONNECTION_STRING";
    const MONGODB_NAME: &str = "MONGODB_NAME";

    let args: Vec<_> = std::env::args().collect();

    // cargo run inmemory
    let inmemory_arg_set = args.len() > 1 && args[1].eq("inmemory");
    if inmemory_arg_set {
        info!("Inmemory argument provided. Going to use inmemory infra.");
        return Ok(PlannerContext::create_inmemory());
    }

    match (
        std::env::var(MONGODB_CONNECTION_STRING),
        std::env::var(MONGODB_NAME),
    ) {
        (Ok(connection_string), Ok(db_name)) => {
            info!(
                "{} and {} env vars was provided. Going to use mongodb.",
                MONGODB_CONNECTION_STRING, MONGODB_NAME
            );
            PlannerContext::create(ContextParams {
                mongodb: (connection_string, db_name),
            })
            .await
        }
        _ => {
            warn!(
                "{} and {} env vars was not provided. Going to use inmemory infra.",
                MONGODB_CONNECTION_STRING, MONGODB_NAME
            );
            Ok(PlannerContext::create_inmemory())
        }
    }
}
