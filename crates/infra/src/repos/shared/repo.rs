use study_planner_domain::Document;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Mapping between an entity and the `Document` it is persisted as
pub trait RecordDocument: Sized {
    const COLLECTION: &'static str;

    fn to_document(&self) -> Document;
    /// Returns `None` when the document is missing required fields
    fn from_document(doc: &Document) -> Option<Self>;
}
