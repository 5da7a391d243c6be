use super::{ensure_id, IRecordStore};
use crate::repos::shared::{
    mongo_repo::*,
    query_structs::{Filter, FindOptions, SortOrder, Update},
    repo::UpdateResult,
};
use mongodb::{bson, Collection, Database, IndexModel};
use study_planner_domain::{Document, ID};
use tracing::info;

pub struct MongoRecordStore {
    db: Database,
}

impl MongoRecordStore {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn collection(&self, name: &str) -> Collection<bson::Document> {
        self.db.collection::<bson::Document>(name)
    }

    /// Creates the index if it does not exist already
    pub async fn ensure_index(
        &self,
        collection: &str,
        keys: &[(&str, SortOrder)],
    ) -> anyhow::Result<()> {
        let mut index_keys = bson::Document::new();
        for (field, order) in keys {
            let direction: i32 = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            index_keys.insert(field.to_string(), direction);
        }
        info!("Ensuring index {:?} on {}", index_keys, collection);

        let model = IndexModel::builder().keys(index_keys).build();
        self.collection(collection).create_index(model, None).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IRecordStore for MongoRecordStore {
    async fn insert_one(&self, collection: &str, mut record: Document) -> anyhow::Result<ID> {
        let id = ensure_id(&mut record)?;
        self.collection(collection)
            .insert_one(to_persistence(&record), None)
            .await?;
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> anyhow::Result<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(
                filter_to_persistence(filter),
                find_options_to_persistence(options),
            )
            .await?;
        consume_cursor(cursor).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> anyhow::Result<UpdateResult> {
        let res = self
            .collection(collection)
            .update_one(
                filter_to_persistence(filter),
                update_to_persistence(update),
                None,
            )
            .await?;
        Ok(UpdateResult {
            matched_count: res.matched_count,
            modified_count: res.modified_count,
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> anyhow::Result<UpdateResult> {
        let res = self
            .collection(collection)
            .update_many(
                filter_to_persistence(filter),
                update_to_persistence(update),
                None,
            )
            .await?;
        Ok(UpdateResult {
            matched_count: res.matched_count,
            modified_count: res.modified_count,
        })
    }

    async fn count(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64> {
        let count = self
            .collection(collection)
            .count_documents(filter_to_persistence(filter), None)
            .await?;
        Ok(count)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64> {
        let res = self
            .collection(collection)
            .delete_one(filter_to_persistence(filter), None)
            .await?;
        Ok(res.deleted_count)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64> {
        let res = self
            .collection(collection)
            .delete_many(filter_to_persistence(filter), None)
            .await?;
        Ok(res.deleted_count)
    }
}
