use super::{
    records::IRecordStore,
    shared::{
        query_structs::{Filter, FindOptions, SortOrder, Update},
        repo::UpdateResult,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use study_planner_domain::{
    DeadlineKind, Document, NotificationWindow, COMPLETED_STATUS, ID, NOTIFICATION_SENT_FIELD,
    PRIORITY_FIELD, STATUS_FIELD, USER_ID_FIELD,
};

/// Narrows down and pages a listing of a user's records.
/// The deadline bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeadlineQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_after: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
    pub skip: usize,
    pub limit: Option<usize>,
}

/// Assignments and events. These records are owned by the user facing
/// parts of the application and carry arbitrary fields, so they are kept
/// as `Document`s.
#[derive(Clone)]
pub struct DeadlineRepo {
    store: Arc<dyn IRecordStore>,
}

impl DeadlineRepo {
    pub fn new(store: Arc<dyn IRecordStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, kind: DeadlineKind, record: Document) -> anyhow::Result<ID> {
        self.store.insert_one(kind.collection(), record).await
    }

    pub async fn find(
        &self,
        kind: DeadlineKind,
        user_id: &ID,
        record_id: &ID,
    ) -> anyhow::Result<Option<Document>> {
        let filter = Filter::by_id(record_id).eq(USER_ID_FIELD, user_id);
        self.store.find_one(kind.collection(), &filter).await
    }

    /// Sorted by deadline
    pub async fn find_by_user(
        &self,
        kind: DeadlineKind,
        user_id: &ID,
        query: &DeadlineQuery,
    ) -> anyhow::Result<Vec<Document>> {
        let field = kind.deadline_field();
        let mut filter = Filter::new().eq(USER_ID_FIELD, user_id);
        if let Some(status) = &query.status {
            filter = filter.eq(STATUS_FIELD, status.as_str());
        }
        if let Some(priority) = &query.priority {
            filter = filter.eq(PRIORITY_FIELD, priority.as_str());
        }
        if let Some(after) = query.due_after {
            filter = filter.gte(field, after);
        }
        if let Some(before) = query.due_before {
            filter = filter.lte(field, before);
        }

        let mut options = FindOptions::new()
            .sort(field, SortOrder::Ascending)
            .skip(query.skip);
        if let Some(limit) = query.limit {
            options = options.limit(limit);
        }
        self.store.find(kind.collection(), &filter, &options).await
    }

    /// Returns false when the user has no such record
    pub async fn delete(
        &self,
        kind: DeadlineKind,
        user_id: &ID,
        record_id: &ID,
    ) -> anyhow::Result<bool> {
        let filter = Filter::by_id(record_id).eq(USER_ID_FIELD, user_id);
        let deleted = self.store.delete_one(kind.collection(), &filter).await?;
        Ok(deleted == 1)
    }

    pub async fn update(
        &self,
        kind: DeadlineKind,
        user_id: &ID,
        record_id: &ID,
        changes: Document,
    ) -> anyhow::Result<UpdateResult> {
        let filter = Filter::by_id(record_id).eq(USER_ID_FIELD, user_id);
        self.store
            .update_one(kind.collection(), &filter, &Update::set_all(changes))
            .await
    }

    /// Records of `user_id` whose deadline lies inside `window` and that have
    /// not been notified about yet. Completed records are left out.
    pub async fn find_due(
        &self,
        kind: DeadlineKind,
        user_id: &ID,
        window: &NotificationWindow,
        limit: usize,
    ) -> anyhow::Result<Vec<Document>> {
        let field = kind.deadline_field();
        let mut filter = Filter::new()
            .eq(USER_ID_FIELD, user_id)
            .gt(field, window.start)
            .lt(field, window.end)
            .ne(NOTIFICATION_SENT_FIELD, true);
        if kind.tracks_completion() {
            filter = filter.ne(STATUS_FIELD, COMPLETED_STATUS);
        }
        let options = FindOptions::new()
            .sort(field, SortOrder::Ascending)
            .limit(limit);

        self.store.find(kind.collection(), &filter, &options).await
    }
}
