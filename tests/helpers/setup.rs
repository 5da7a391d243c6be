use chrono::prelude::*;
use std::sync::{Arc, Mutex};
use study_planner_infra::{Config, ISys, InMemoryNotifier, PlannerContext, Repos};

/// A clock the test moves forward by hand
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: &str) -> Self {
        Self {
            now: Mutex::new(now.parse().expect("Valid UTC datetime")),
        }
    }

    pub fn set(&self, now: &str) {
        *self.now.lock().unwrap() = now.parse().expect("Valid UTC datetime");
    }
}

impl ISys for ManualClock {
    fn get_timestamp_millis(&self) -> i64 {
        self.now.lock().unwrap().timestamp_millis()
    }
}

pub struct TestContext {
    pub ctx: PlannerContext,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<InMemoryNotifier>,
}

pub fn setup_context(now: &str) -> TestContext {
    let clock = Arc::new(ManualClock::new(now));
    let notifier = Arc::new(InMemoryNotifier::new());
    let mut config = Config::new();
    config.default_timezone = "UTC".into();
    let ctx = PlannerContext::new(
        Repos::create_inmemory(),
        config,
        clock.clone(),
        notifier.clone(),
    );
    TestContext {
        ctx,
        clock,
        notifier,
    }
}
