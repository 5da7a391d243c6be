use study_planner_domain::{Document, Value};

/// A single condition on a field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    /// Also matches documents where the field is missing
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
}

impl Predicate {
    pub fn matches(&self, field: Option<&Value>) -> bool {
        use std::cmp::Ordering::*;

        match (self, field) {
            (Self::Eq(expected), Some(actual)) => actual.matches(expected),
            (Self::Eq(expected), None) => *expected == Value::Null,
            (Self::Ne(expected), Some(actual)) => !actual.matches(expected),
            (Self::Ne(expected), None) => *expected != Value::Null,
            (Self::Gt(bound), Some(actual)) => actual.compare(bound) == Some(Greater),
            (Self::Gte(bound), Some(actual)) => {
                matches!(actual.compare(bound), Some(Greater) | Some(Equal))
            }
            (Self::Lt(bound), Some(actual)) => actual.compare(bound) == Some(Less),
            (Self::Lte(bound), Some(actual)) => {
                matches!(actual.compare(bound), Some(Less) | Some(Equal))
            }
            (_, None) => false,
        }
    }
}

/// A conjunction of field predicates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub clauses: Vec<(String, Predicate)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id<V: Into<Value>>(id: V) -> Self {
        Self::new().eq(Document::ID_FIELD, id)
    }

    pub fn with(mut self, field: &str, predicate: Predicate) -> Self {
        self.clauses.push((field.to_string(), predicate));
        self
    }

    pub fn eq<V: Into<Value>>(self, field: &str, value: V) -> Self {
        self.with(field, Predicate::Eq(value.into()))
    }

    pub fn ne<V: Into<Value>>(self, field: &str, value: V) -> Self {
        self.with(field, Predicate::Ne(value.into()))
    }

    pub fn gt<V: Into<Value>>(self, field: &str, value: V) -> Self {
        self.with(field, Predicate::Gt(value.into()))
    }

    pub fn gte<V: Into<Value>>(self, field: &str, value: V) -> Self {
        self.with(field, Predicate::Gte(value.into()))
    }

    pub fn lt<V: Into<Value>>(self, field: &str, value: V) -> Self {
        self.with(field, Predicate::Lt(value.into()))
    }

    pub fn lte<V: Into<Value>>(self, field: &str, value: V) -> Self {
        self.with(field, Predicate::Lte(value.into()))
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, predicate)| predicate.matches(doc.get(field)))
    }
}

/// Fields to set on the matched documents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    pub set: Document,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.set.insert(field, value);
        self
    }

    pub fn set_all(changes: Document) -> Self {
        Self { set: changes }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Applies the update and tells whether the document changed
    pub fn apply(&self, doc: &mut Document) -> bool {
        let mut modified = false;
        for (field, value) in self.set.iter() {
            if doc.get(field) != Some(value) {
                doc.insert(field.clone(), value.clone());
                modified = true;
            }
        }
        modified
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindOptions {
    pub skip: usize,
    pub limit: Option<usize>,
    pub sort: Option<(String, SortOrder)>,
    /// Only return these fields (and `_id`)
    pub projection: Option<Vec<String>>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    pub fn projection(mut self, fields: &[&str]) -> Self {
        self.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}
