use super::{
    records::IRecordStore,
    shared::{
        query_structs::{Filter, FindOptions, SortOrder, Update},
        repo::RecordDocument,
    },
};
use std::sync::Arc;
use study_planner_domain::{Document, User, Value, ID};
use tracing::warn;

const EMAIL_FIELD: &str = "email";
const NAME_FIELD: &str = "name";
const TIMEZONE_FIELD: &str = "timezone";

impl RecordDocument for User {
    const COLLECTION: &'static str = "users";

    fn to_document(&self) -> Document {
        let mut doc = Document::new()
            .with(Document::ID_FIELD, &self.id)
            .with(EMAIL_FIELD, self.email.as_str())
            .with(NAME_FIELD, self.name.as_str());
        if let Some(timezone) = &self.timezone {
            doc.insert(TIMEZONE_FIELD, timezone.as_str());
        }
        doc
    }

    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.id()?,
            email: doc.get_str(EMAIL_FIELD)?.to_string(),
            name: doc.get_str(NAME_FIELD).unwrap_or_default().to_string(),
            timezone: doc.get_str(TIMEZONE_FIELD).map(String::from),
        })
    }
}

#[derive(Debug)]
pub struct UsersPage {
    pub users: Vec<User>,
    /// Number of profiles read from the store, malformed ones included
    pub read: usize,
    /// `_id` of the last profile read, the next page starts after it
    pub last_key: Option<Value>,
}

/// User profiles, reduced to what reminders and timezone handling need
#[derive(Clone)]
pub struct UserRepo {
    store: Arc<dyn IRecordStore>,
}

impl UserRepo {
    pub fn new(store: Arc<dyn IRecordStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, user: &User) -> anyhow::Result<()> {
        self.store
            .insert_one(User::COLLECTION, user.to_document())
            .await
            .map(|_| ())
    }

    pub async fn find(&self, user_id: &ID) -> anyhow::Result<Option<User>> {
        let doc = self
            .store
            .find_one(User::COLLECTION, &Filter::by_id(user_id))
            .await?;
        Ok(doc.as_ref().and_then(User::from_document))
    }

    /// Users ordered by id, starting after the `_id` given in `after`.
    /// Pages are keyed on the last id read, so users created or removed
    /// while paging never cause another user to be skipped.
    /// Profiles that cannot be read are left out of the page.
    pub async fn find_page(
        &self,
        after: Option<&Value>,
        limit: usize,
    ) -> anyhow::Result<UsersPage> {
        let filter = match after {
            Some(last_key) => Filter::new().gt(Document::ID_FIELD, last_key.clone()),
            None => Filter::new(),
        };
        let options = FindOptions::new()
            .sort(Document::ID_FIELD, SortOrder::Ascending)
            .limit(limit)
            .projection(&[EMAIL_FIELD, NAME_FIELD, TIMEZONE_FIELD]);
        let docs = self.store.find(User::COLLECTION, &filter, &options).await?;

        let users = docs
            .iter()
            .filter_map(|doc| {
                let user = User::from_document(doc);
                if user.is_none() {
                    warn!("Skipping malformed user profile: {:?}", doc.id());
                }
                user
            })
            .collect();
        Ok(UsersPage {
            users,
            read: docs.len(),
            last_key: docs
                .last()
                .and_then(|doc| doc.get(Document::ID_FIELD))
                .cloned(),
        })
    }

    /// Returns false when the user does not exist
    pub async fn update_timezone(&self, user_id: &ID, timezone: &str) -> anyhow::Result<bool> {
        let res = self
            .store
            .update_one(
                User::COLLECTION,
                &Filter::by_id(user_id),
                &Update::new().set(TIMEZONE_FIELD, timezone),
            )
            .await?;
        Ok(res.matched_count == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::records::InMemoryRecordStore;

    fn repo() -> UserRepo {
        UserRepo::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn it_stores_and_finds_users() {
        let repo = repo();
        let user = User::new("ada@example.com", "Ada").with_timezone("Europe/Oslo");
        repo.insert(&user).await.unwrap();
        assert_eq!(repo.find(&user.id).await.unwrap(), Some(user));
        assert_eq!(repo.find(&ID::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn pages_cover_every_user_once() {
        let repo = repo();
        let mut ids = Vec::new();
        for i in 0..7 {
            let user = User::new(&format!("user{}@example.com", i), "User");
            ids.push(user.id.clone());
            repo.insert(&user).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut after = None;
        loop {
            let page = repo.find_page(after.as_ref(), 3).await.unwrap();
            if page.read == 0 {
                break;
            }
            after = page.last_key;
            seen.extend(page.users.into_iter().map(|u| u.id));
        }
        ids.sort_by_key(|id| id.as_string());
        assert_eq!(seen, ids);
    }

    fn user_with_id(n: u32) -> User {
        User {
            id: format!("00000000-0000-0000-0000-{:012}", n).parse().unwrap(),
            ..User::new(&format!("user{}@example.com", n), "User")
        }
    }

    #[tokio::test]
    async fn users_created_while_paging_do_not_shift_later_pages() {
        let repo = repo();
        for n in &[2, 4, 6, 8] {
            repo.insert(&user_with_id(*n)).await.unwrap();
        }

        let first = repo.find_page(None, 2).await.unwrap();
        let first_ids: Vec<_> = first.users.iter().map(|u| u.id.clone()).collect();
        assert_eq!(first_ids, vec![user_with_id(2).id, user_with_id(4).id]);

        // Sorts before the page that was just read
        repo.insert(&user_with_id(1)).await.unwrap();

        let second = repo.find_page(first.last_key.as_ref(), 2).await.unwrap();
        let second_ids: Vec<_> = second.users.iter().map(|u| u.id.clone()).collect();
        assert_eq!(second_ids, vec![user_with_id(6).id, user_with_id(8).id]);
    }

    #[tokio::test]
    async fn malformed_profiles_are_counted_but_skipped() {
        let store = Arc::new(InMemoryRecordStore::new());
        let repo = UserRepo::new(store.clone());
        store
            .insert_one(User::COLLECTION, Document::new().with(NAME_FIELD, "No email"))
            .await
            .unwrap();
        repo.insert(&User::new("ada@example.com", "Ada")).await.unwrap();

        let page = repo.find_page(None, 10).await.unwrap();
        assert_eq!(page.read, 2);
        assert_eq!(page.users.len(), 1);
        assert_eq!(page.users[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn it_updates_the_timezone() {
        let repo = repo();
        let user = User::new("ada@example.com", "Ada");
        repo.insert(&user).await.unwrap();

        assert!(repo.update_timezone(&user.id, "Asia/Tokyo").await.unwrap());
        let user = repo.find(&user.id).await.unwrap().unwrap();
        assert_eq!(user.timezone.as_deref(), Some("Asia/Tokyo"));
        assert!(!repo.update_timezone(&ID::new(), "Asia/Tokyo").await.unwrap());
    }
}
