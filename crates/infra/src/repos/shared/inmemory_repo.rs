use super::{
    query_structs::{Filter, FindOptions, SortOrder, Update},
    repo::UpdateResult,
};
use anyhow::anyhow;
use std::{
    cmp::Ordering,
    sync::{Mutex, MutexGuard},
};
use study_planner_domain::{Document, Value};

/// Useful functions for creating inmemory repositories

fn lock(collection: &Mutex<Vec<Document>>) -> anyhow::Result<MutexGuard<'_, Vec<Document>>> {
    collection
        .lock()
        .map_err(|_| anyhow!("In-memory collection lock was poisoned"))
}

pub fn insert(doc: Document, collection: &Mutex<Vec<Document>>) -> anyhow::Result<()> {
    lock(collection)?.push(doc);
    Ok(())
}

pub fn find_by(
    collection: &Mutex<Vec<Document>>,
    filter: &Filter,
    options: &FindOptions,
) -> anyhow::Result<Vec<Document>> {
    let collection = lock(collection)?;
    let mut items = collection
        .iter()
        .filter(|doc| filter.matches(doc))
        .cloned()
        .collect::<Vec<_>>();
    drop(collection);

    if let Some((field, order)) = &options.sort {
        items.sort_by(|a, b| {
            let ordering = compare_field(a.get(field), b.get(field));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    let items = items
        .into_iter()
        .skip(options.skip)
        .take(options.limit.unwrap_or(usize::MAX));

    Ok(match &options.projection {
        Some(fields) => items.map(|doc| doc.project(fields)).collect(),
        None => items.collect(),
    })
}

pub fn count_by(collection: &Mutex<Vec<Document>>, filter: &Filter) -> anyhow::Result<u64> {
    let collection = lock(collection)?;
    Ok(collection.iter().filter(|doc| filter.matches(doc)).count() as u64)
}

/// Matching and updating happens while holding the lock, so concurrent
/// conditional updates of the same document are serialized
pub fn update_by(
    collection: &Mutex<Vec<Document>>,
    filter: &Filter,
    update: &Update,
    many: bool,
) -> anyhow::Result<UpdateResult> {
    let mut collection = lock(collection)?;
    let mut res = UpdateResult::default();

    for doc in collection.iter_mut().filter(|doc| filter.matches(doc)) {
        res.matched_count += 1;
        if update.apply(doc) {
            res.modified_count += 1;
        }
        if !many {
            break;
        }
    }

    Ok(res)
}

pub fn delete_by(
    collection: &Mutex<Vec<Document>>,
    filter: &Filter,
    many: bool,
) -> anyhow::Result<u64> {
    let mut collection = lock(collection)?;
    let mut deleted = 0;
    collection.retain(|doc| {
        let remove = (many || deleted == 0) && filter.matches(doc);
        if remove {
            deleted += 1;
        }
        !remove
    });
    Ok(deleted)
}

/// Missing fields sort first, like in MongoDB
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
