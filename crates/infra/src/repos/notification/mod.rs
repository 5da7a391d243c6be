use super::{
    records::IRecordStore,
    shared::{
        query_structs::{Filter, FindOptions, SortOrder, Update},
        repo::RecordDocument,
    },
};
use std::sync::Arc;
use study_planner_domain::{
    Document, Notification, NotificationKind, CREATED_AT_FIELD, ID, TITLE_FIELD, USER_ID_FIELD,
};
use tracing::warn;

const TYPE_FIELD: &str = "type";
const MESSAGE_FIELD: &str = "message";
const REFERENCE_ID_FIELD: &str = "reference_id";
const READ_FIELD: &str = "read";

impl RecordDocument for Notification {
    const COLLECTION: &'static str = "notifications";

    fn to_document(&self) -> Document {
        Document::new()
            .with(Document::ID_FIELD, &self.id)
            .with(USER_ID_FIELD, &self.user_id)
            .with(TYPE_FIELD, self.kind.as_str())
            .with(TITLE_FIELD, self.title.as_str())
            .with(MESSAGE_FIELD, self.message.as_str())
            .with(REFERENCE_ID_FIELD, self.reference_id.clone())
            .with(READ_FIELD, self.read)
            .with(CREATED_AT_FIELD, self.created_at)
    }

    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.id()?,
            user_id: doc.get_str(USER_ID_FIELD)?.parse().ok()?,
            kind: doc.get_str(TYPE_FIELD)?.parse().ok()?,
            title: doc.get_str(TITLE_FIELD)?.to_string(),
            message: doc.get_str(MESSAGE_FIELD)?.to_string(),
            reference_id: doc.get_str(REFERENCE_ID_FIELD).map(String::from),
            read: doc.get_bool(READ_FIELD).unwrap_or(false),
            created_at: doc.get_timestamp(CREATED_AT_FIELD)?.to_utc(),
        })
    }
}

/// A user's notification inbox
#[derive(Clone)]
pub struct NotificationRepo {
    store: Arc<dyn IRecordStore>,
}

impl NotificationRepo {
    pub fn new(store: Arc<dyn IRecordStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        self.store
            .insert_one(Notification::COLLECTION, notification.to_document())
            .await
            .map(|_| ())
    }

    /// Newest first
    pub async fn find_by_user(
        &self,
        user_id: &ID,
        unread_only: bool,
        skip: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<Notification>> {
        let mut filter = Filter::new().eq(USER_ID_FIELD, user_id);
        if unread_only {
            filter = filter.eq(READ_FIELD, false);
        }
        let options = FindOptions::new()
            .sort(CREATED_AT_FIELD, SortOrder::Descending)
            .skip(skip)
            .limit(limit);

        let docs = self
            .store
            .find(Notification::COLLECTION, &filter, &options)
            .await?;
        Ok(docs
            .iter()
            .filter_map(|doc| {
                let notification = Notification::from_document(doc);
                if notification.is_none() {
                    warn!("Skipping malformed notification: {:?}", doc.id());
                }
                notification
            })
            .collect())
    }

    /// Returns false when the user has no such notification
    pub async fn set_read(
        &self,
        user_id: &ID,
        notification_id: &ID,
        read: bool,
    ) -> anyhow::Result<bool> {
        let filter = Filter::by_id(notification_id).eq(USER_ID_FIELD, user_id);
        let res = self
            .store
            .update_one(
                Notification::COLLECTION,
                &filter,
                &Update::new().set(READ_FIELD, read),
            )
            .await?;
        Ok(res.matched_count == 1)
    }

    /// Returns the number of notifications that were unread
    pub async fn mark_all_read(&self, user_id: &ID) -> anyhow::Result<u64> {
        let filter = Filter::new()
            .eq(USER_ID_FIELD, user_id)
            .eq(READ_FIELD, false);
        let res = self
            .store
            .update_many(
                Notification::COLLECTION,
                &filter,
                &Update::new().set(READ_FIELD, true),
            )
            .await?;
        Ok(res.modified_count)
    }

    pub async fn unread_count(&self, user_id: &ID) -> anyhow::Result<u64> {
        let filter = Filter::new()
            .eq(USER_ID_FIELD, user_id)
            .eq(READ_FIELD, false);
        self.store.count(Notification::COLLECTION, &filter).await
    }

    /// Removes the notifications of `kind` that point at the record `reference_id`
    pub async fn delete_for_reference(
        &self,
        user_id: &ID,
        kind: NotificationKind,
        reference_id: &ID,
    ) -> anyhow::Result<u64> {
        let filter = Filter::new()
            .eq(USER_ID_FIELD, user_id)
            .eq(TYPE_FIELD, kind.as_str())
            .eq(REFERENCE_ID_FIELD, reference_id);
        self.store
            .delete_many(Notification::COLLECTION, &filter)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::records::InMemoryRecordStore;
    use chrono::{prelude::*, Duration};
    use study_planner_domain::NotificationKind;

    fn notification(user_id: &ID, created_at: DateTime<Utc>) -> Notification {
        Notification::new(
            user_id.clone(),
            NotificationKind::AssignmentDue,
            "Assignment Due Soon".into(),
            "Your assignment 'Essay' is due on January 01, 2024 at 12:00 PM.".into(),
            Some(ID::new().as_string()),
            created_at,
        )
    }

    #[tokio::test]
    async fn inbox_is_listed_newest_first() {
        let repo = NotificationRepo::new(Arc::new(InMemoryRecordStore::new()));
        let user_id = ID::new();
        let now: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let older = notification(&user_id, now - Duration::hours(1));
        let newer = notification(&user_id, now);
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();
        repo.insert(&notification(&ID::new(), now)).await.unwrap();

        let inbox = repo.find_by_user(&user_id, false, 0, 50).await.unwrap();
        assert_eq!(inbox, vec![newer.clone(), older.clone()]);

        let second_page = repo.find_by_user(&user_id, false, 1, 50).await.unwrap();
        assert_eq!(second_page, vec![older]);
    }

    #[tokio::test]
    async fn read_flags_are_tracked() {
        let repo = NotificationRepo::new(Arc::new(InMemoryRecordStore::new()));
        let user_id = ID::new();
        let now = Utc::now();
        let first = notification(&user_id, now);
        let second = notification(&user_id, now);
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();
        assert_eq!(repo.unread_count(&user_id).await.unwrap(), 2);

        assert!(repo.set_read(&user_id, &first.id, true).await.unwrap());
        // Only the owner can change it
        assert!(!repo.set_read(&ID::new(), &second.id, true).await.unwrap());
        assert_eq!(repo.unread_count(&user_id).await.unwrap(), 1);

        let unread = repo.find_by_user(&user_id, true, 0, 50).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, second.id);

        assert_eq!(repo.mark_all_read(&user_id).await.unwrap(), 1);
        assert_eq!(repo.unread_count(&user_id).await.unwrap(), 0);
        assert_eq!(repo.mark_all_read(&user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn notifications_of_a_record_can_be_removed() {
        let repo = NotificationRepo::new(Arc::new(InMemoryRecordStore::new()));
        let user_id = ID::new();
        let record_id = ID::new();
        let now = Utc::now();
        for _ in 0..2 {
            let mut about_record = notification(&user_id, now);
            about_record.reference_id = Some(record_id.as_string());
            repo.insert(&about_record).await.unwrap();
        }
        repo.insert(&notification(&user_id, now)).await.unwrap();

        let removed = repo
            .delete_for_reference(&user_id, NotificationKind::EventStarting, &record_id)
            .await
            .unwrap();
        assert_eq!(removed, 0);
        let removed = repo
            .delete_for_reference(&user_id, NotificationKind::AssignmentDue, &record_id)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.unread_count(&user_id).await.unwrap(), 1);
    }
}
