use super::{ensure_id, IRecordStore};
use crate::repos::shared::{
    inmemory_repo::*,
    query_structs::{Filter, FindOptions, Update},
    repo::UpdateResult,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};
use study_planner_domain::{Document, ID};

type Collection = Arc<Mutex<Vec<Document>>>;

pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn collection(&self, name: &str) -> anyhow::Result<Collection> {
        let existing = self
            .collections
            .read()
            .map_err(|_| anyhow::anyhow!("In-memory store lock was poisoned"))?
            .get(name)
            .cloned();
        if let Some(collection) = existing {
            return Ok(collection);
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow::anyhow!("In-memory store lock was poisoned"))?;
        Ok(collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone())
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IRecordStore for InMemoryRecordStore {
    async fn insert_one(&self, collection: &str, mut record: Document) -> anyhow::Result<ID> {
        let id = ensure_id(&mut record)?;
        let records = self.collection(collection)?;
        insert(record, &*records)?;
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> anyhow::Result<Vec<Document>> {
        let records = self.collection(collection)?;
        find_by(&*records, filter, options)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> anyhow::Result<UpdateResult> {
        let records = self.collection(collection)?;
        update_by(&*records, filter, update, false)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> anyhow::Result<UpdateResult> {
        let records = self.collection(collection)?;
        update_by(&*records, filter, update, true)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64> {
        let records = self.collection(collection)?;
        count_by(&*records, filter)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64> {
        let records = self.collection(collection)?;
        delete_by(&*records, filter, false)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> anyhow::Result<u64> {
        let records = self.collection(collection)?;
        delete_by(&*records, filter, true)
    }
}
