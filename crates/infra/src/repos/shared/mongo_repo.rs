use super::query_structs::{Filter, FindOptions, Predicate, SortOrder, Update};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson},
    options, Cursor,
};
use study_planner_domain::{Document, Timestamp, Value};

/// Useful functions for creating mongodb repositories

pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Int(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::String(s) => Bson::String(s.clone()),
        Value::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_chrono(ts.to_utc())),
        Value::Document(doc) => Bson::Document(to_persistence(doc)),
        Value::Array(items) => Bson::Array(items.iter().map(value_to_bson).collect()),
    }
}

pub fn bson_to_value(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::Int(i as i64),
        Bson::Int64(i) => Value::Int(i),
        Bson::Double(f) => Value::Float(f),
        Bson::String(s) => Value::String(s),
        Bson::DateTime(dt) => Value::Timestamp(Timestamp::Utc(dt.to_chrono())),
        Bson::Document(doc) => Value::Document(to_domain(doc)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_value).collect()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => Value::String(other.to_string()),
    }
}

pub fn to_persistence(doc: &Document) -> bson::Document {
    doc.iter()
        .map(|(key, value)| (key.clone(), value_to_bson(value)))
        .collect()
}

pub fn to_domain(doc: bson::Document) -> Document {
    doc.into_iter()
        .map(|(key, value)| (key, bson_to_value(value)))
        .collect()
}

/// Clauses on the same field are merged into one operator document,
/// e.g. `{ "due_date": { "$gt": .., "$lt": .. } }`
pub fn filter_to_persistence(filter: &Filter) -> bson::Document {
    let mut query = bson::Document::new();
    for (field, predicate) in &filter.clauses {
        let (operator, value) = match predicate {
            Predicate::Eq(v) => ("$eq", v),
            Predicate::Ne(v) => ("$ne", v),
            Predicate::Gt(v) => ("$gt", v),
            Predicate::Gte(v) => ("$gte", v),
            Predicate::Lt(v) => ("$lt", v),
            Predicate::Lte(v) => ("$lte", v),
        };
        let entry = query
            .entry(field.clone())
            .or_insert_with(|| Bson::Document(bson::Document::new()));
        if let Bson::Document(operators) = entry {
            operators.insert(operator, value_to_bson(value));
        }
    }
    query
}

pub fn update_to_persistence(update: &Update) -> bson::Document {
    doc! {
        "$set": to_persistence(&update.set)
    }
}

pub fn find_options_to_persistence(opts: &FindOptions) -> options::FindOptions {
    let mut find_options = options::FindOptions::builder().build();
    find_options.skip = Some(opts.skip as u64);
    find_options.limit = opts.limit.map(|limit| limit as i64);
    find_options.sort = opts.sort.as_ref().map(|(field, order)| {
        let direction: i32 = match order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };
        let mut sort = bson::Document::new();
        sort.insert(field.clone(), direction);
        sort
    });
    find_options.projection = opts.projection.as_ref().map(|fields| {
        fields
            .iter()
            .map(|field| (field.clone(), Bson::Int32(1)))
            .collect()
    });
    find_options
}

pub async fn consume_cursor(cursor: Cursor<bson::Document>) -> anyhow::Result<Vec<Document>> {
    let documents = cursor.try_collect::<Vec<_>>().await?;
    Ok(documents.into_iter().map(to_domain).collect())
}
