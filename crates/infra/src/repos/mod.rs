mod deadline;
mod notification;
mod records;
mod shared;
mod user;

pub use deadline::{DeadlineQuery, DeadlineRepo};
use mongodb::{options::ClientOptions, Client};
pub use notification::NotificationRepo;
pub use records::{IRecordStore, InMemoryRecordStore, MongoRecordStore};
pub use shared::query_structs::*;
pub use shared::repo::{RecordDocument, UpdateResult};
use std::sync::Arc;
use study_planner_domain::{DeadlineKind, Notification, CREATED_AT_FIELD, USER_ID_FIELD};
use tracing::info;
pub use user::{UserRepo, UsersPage};

#[derive(Clone)]
pub struct Repos {
    pub records: Arc<dyn IRecordStore>,
    pub users: UserRepo,
    pub notifications: NotificationRepo,
    pub deadlines: DeadlineRepo,
}

impl Repos {
    pub async fn create_mongodb(
        connection_string: &str,
        db_name: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let client_options = ClientOptions::parse(connection_string).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // This is needed to make sure that db is ready when starting the scanner
        info!("DB CHECKING CONNECTION ...");
        db.run_command(mongodb::bson::doc! { "ping": 1 }, None)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        let store = MongoRecordStore::new(&db);
        for kind in DeadlineKind::ALL.iter() {
            store
                .ensure_index(
                    kind.collection(),
                    &[
                        (USER_ID_FIELD, SortOrder::Ascending),
                        (kind.deadline_field(), SortOrder::Ascending),
                    ],
                )
                .await?;
        }
        store
            .ensure_index(
                Notification::COLLECTION,
                &[
                    (USER_ID_FIELD, SortOrder::Ascending),
                    (CREATED_AT_FIELD, SortOrder::Descending),
                ],
            )
            .await?;
        store
            .ensure_index(
                Notification::COLLECTION,
                &[
                    (USER_ID_FIELD, SortOrder::Ascending),
                    ("read", SortOrder::Ascending),
                ],
            )
            .await?;

        Ok(Self::with_store(Arc::new(store)))
    }

    pub fn create_inmemory() -> Self {
        Self::with_store(Arc::new(InMemoryRecordStore::new()))
    }

    pub fn with_store(store: Arc<dyn IRecordStore>) -> Self {
        Self {
            users: UserRepo::new(store.clone()),
            notifications: NotificationRepo::new(store.clone()),
            deadlines: DeadlineRepo::new(store.clone()),
            records: store,
        }
    }
}
