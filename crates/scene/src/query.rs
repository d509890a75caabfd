use std::sync::Arc;

use crate::record::{AnimalRecord, IucnStatus};

/// Search-box and status-dropdown filter over the catalog.
///
/// An empty search term matches every name; `status: None` matches every
/// status, including records without one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub status: Option<IucnStatus>,
}

impl CatalogQuery {
    pub fn new(search: impl Into<String>, status: Option<IucnStatus>) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    /// Case-insensitive substring match on the name, exact match on status.
    pub fn matches(&self, record: &AnimalRecord) -> bool {
        let needle = self.search.to_lowercase();
        self.matches_lowered(record, &needle)
    }

    fn matches_lowered(&self, record: &AnimalRecord, needle: &str) -> bool {
        if !record.name.to_lowercase().contains(needle) {
            return false;
        }
        match &self.status {
            None => true,
            Some(wanted) => record.iucn_status.as_ref() == Some(wanted),
        }
    }
}

/// The full record list as loaded, in source order.
#[derive(Debug, Clone, Default)]
pub struct AnimalCatalog {
    records: Vec<Arc<AnimalRecord>>,
}

impl AnimalCatalog {
    pub fn new(records: Vec<AnimalRecord>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn all(&self) -> &[Arc<AnimalRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<AnimalRecord>> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Matching records in catalog order.
    pub fn filter(&self, query: &CatalogQuery) -> Vec<Arc<AnimalRecord>> {
        let needle = query.search.to_lowercase();
        self.records
            .iter()
            .filter(|r| query.matches_lowered(r, &needle))
            .cloned()
            .collect()
    }
}
