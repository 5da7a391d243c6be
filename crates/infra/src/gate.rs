use crate::repos::{Filter, IRecordStore, Update};
use std::sync::Arc;
use study_planner_domain::{DeadlineKind, ID, NOTIFICATION_SENT_FIELD};

/// Guards that a deadline is notified about at most once.
///
/// A claim flips `notification_sent` from not-true to true with a single
/// conditional update, so among any number of concurrent claims for the same
/// record exactly one observes the modification.
#[derive(Clone)]
pub struct NotificationGate {
    store: Arc<dyn IRecordStore>,
}

impl NotificationGate {
    pub fn new(store: Arc<dyn IRecordStore>) -> Self {
        Self { store }
    }

    /// Returns true only for the caller that set the flag
    pub async fn claim(&self, kind: DeadlineKind, record_id: &ID) -> anyhow::Result<bool> {
        let filter = Filter::by_id(record_id).ne(NOTIFICATION_SENT_FIELD, true);
        let update = Update::new().set(NOTIFICATION_SENT_FIELD, true);
        let res = self
            .store
            .update_one(kind.collection(), &filter, &update)
            .await?;
        Ok(res.modified_count == 1)
    }
}
