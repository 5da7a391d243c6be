use chrono::prelude::*;
use std::sync::Arc;
use study_planner_infra::{
    Config, IRecordStore, ISys, InMemoryNotifier, InMemoryRecordStore, PlannerContext, Repos,
};

pub struct StaticTimeSys {
    pub now: DateTime<Utc>,
}

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.now.timestamp_millis()
    }
}

pub fn setup_context(now: DateTime<Utc>) -> (PlannerContext, Arc<InMemoryNotifier>) {
    setup_context_with_store(now, Arc::new(InMemoryRecordStore::new()))
}

pub fn setup_context_with_store(
    now: DateTime<Utc>,
    store: Arc<dyn IRecordStore>,
) -> (PlannerContext, Arc<InMemoryNotifier>) {
    let notifier = Arc::new(InMemoryNotifier::new());
    let ctx = PlannerContext::new(
        Repos::with_store(store),
        Config::new(),
        Arc::new(StaticTimeSys { now }),
        notifier.clone(),
    );
    (ctx, notifier)
}
