//! Collection catalog. Pure data; sizes are estimates supplied by the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::CollectionId;

/// Page size assumed when deriving `max_pages` (bytes).
pub const DEFAULT_PAGE_SIZE: u64 = 4 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Ordered field list. Shard-key and index fields must come from here.
    pub fields: Vec<String>,
    #[serde(default)]
    pub doc_count: u64,
    /// Average document size in bytes.
    #[serde(default)]
    pub avg_doc_size: u64,
    /// Derived from `doc_count * avg_doc_size / page_size`; see `refresh_pages`.
    #[serde(default)]
    pub max_pages: u64,
    /// Candidate shard-key fields, most frequently filtered first.
    #[serde(default)]
    pub interesting: Vec<String>,
}

impl Collection {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            doc_count: 0,
            avg_doc_size: 0,
            max_pages: 0,
            interesting: Vec::new(),
        }
    }

    /// Set size statistics and re-derive `max_pages` with the default page size.
    pub fn with_stats(mut self, doc_count: u64, avg_doc_size: u64) -> Self {
        self.doc_count = doc_count;
        self.avg_doc_size = avg_doc_size;
        self.refresh_pages(DEFAULT_PAGE_SIZE);
        self
    }

    pub fn with_interesting<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interesting = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> CollectionId {
        CollectionId::for_name(&self.name)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Total data bytes (`doc_count * avg_doc_size`), saturating.
    pub fn data_bytes(&self) -> u64 {
        self.doc_count.saturating_mul(self.avg_doc_size)
    }

    pub fn refresh_pages(&mut self, page_size: u64) {
        self.max_pages = pages_for(self.data_bytes(), page_size);
    }
}

/// `ceil(bytes / page_size)`; zero page size yields zero pages.
pub fn pages_for(bytes: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    bytes.div_ceil(page_size)
}

/// Name-ordered set of collections. Ordered so every walk is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    collections: BTreeMap<String, Collection>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collection: Collection) -> Option<Collection> {
        self.collections.insert(collection.name.clone(), collection)
    }

    pub fn remove(&mut self, name: &str) -> Option<Collection> {
        self.collections.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Collection> {
        self.collections.values_mut()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl FromIterator<Collection> for Catalog {
    fn from_iter<T: IntoIterator<Item = Collection>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        for c in iter {
            catalog.insert(c);
        }
        catalog
    }
}
