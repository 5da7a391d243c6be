mod inmemory;
mod mongo;

pub use inmemory::InMemoryRecordStore;
pub use mongo::MongoRecordStore;

use super::shared::{
    query_structs::{Filter, FindOptions, Update},
    repo::UpdateResult,
};
use study_planner_domain::{Document, ID};

/// Schemaless storage of `Document`s grouped in named collections.
///
/// `update_one` is atomic per document: the filter is evaluated against the
/// state the update is applied to, so a filter carrying the expected
/// pre-state acts as a compare-and-set.
#[async_trait::async_trait]
pub trait IRecordStore: Send + Sync {
    /// Assigns a new `_id` when the record has none
    async fn insert_one(&self, collection: &str, record: Document) -> anyhow::Result<ID>;
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> anyhow::Result<Vec<Document>>;
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> anyhow::Result<UpdateResult>;
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> anyhow::Result<UpdateResult>;
    async fn count(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64>;
    /// Removes the first matching document and returns the number removed
    async fn delete_one(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64>;
    async fn delete_many(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> anyhow::Result<Option<Document>> {
        let mut found = self
            .find(collection, filter, &FindOptions::new().limit(1))
            .await?;
        Ok(found.pop())
    }
}

/// Makes sure `record` has a valid `_id` and returns it
fn ensure_id(record: &mut Document) -> anyhow::Result<ID> {
    match record.get(Document::ID_FIELD) {
        None => {
            let id = ID::new();
            record.insert(Document::ID_FIELD, &id);
            Ok(id)
        }
        Some(_) => record
            .id()
            .ok_or_else(|| anyhow::anyhow!("Record has a malformed `_id`")),
    }
}
