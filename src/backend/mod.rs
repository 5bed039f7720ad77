//! Frequency backend abstraction
//!
//! Every store answers a lookup by key with either a count (or per-label
//! counts) or "not found". The router never sees store-specific request
//! shapes; it only decides which capability to ask.
//!
//! # Implementations
//!
//! | Adapter                 | CountBackend   | SubstitutionBackend |
//! |-------------------------|----------------|---------------------|
//! | `MongoDocumentStore`    | unigrams       | wildcarded n-grams  |
//! | `HBaseRestColumnStore`  | bi/trigrams    | -                   |
//! | `InMemoryStore`         | any            | any                 |

pub mod column;
#[cfg(feature = "document-store")]
pub mod document;
pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BackendError;

pub use column::HBaseRestColumnStore;
#[cfg(feature = "document-store")]
pub use document::MongoDocumentStore;
pub use memory::InMemoryStore;

/// Outcome of a single backend lookup
///
/// A missing record and a record the adapter could not read are both
/// `NotFound`; callers turn that into a zero count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

impl Lookup<u64> {
    /// Absence is a zero count
    pub fn or_zero(self) -> u64 {
        self.found().unwrap_or(0)
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

/// Per-adapter tally of cell reads, split by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellStats {
    pub found: u64,
    pub absent: u64,
    /// Cells present but not a non-negative base-10 integer
    pub malformed: u64,
}

/// Exact count lookup by n-gram key
#[async_trait]
pub trait CountBackend: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    async fn count(&self, key: &str) -> Result<Lookup<u64>, BackendError>;

    /// Read outcome counters, for adapters that keep them
    fn cell_stats(&self) -> Option<CellStats> {
        None
    }
}

/// Per-label counts for a wildcarded n-gram key
#[async_trait]
pub trait SubstitutionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn substitution_counts(
        &self,
        key: &str,
    ) -> Result<Lookup<HashMap<String, u64>>, BackendError>;
}

/// The backends wired into an oracle. Any of them may be absent.
#[derive(Clone, Default)]
pub struct BackendSet {
    pub unigrams: Option<Arc<dyn CountBackend>>,
    pub substitutions: Option<Arc<dyn SubstitutionBackend>>,
    pub dense: Option<Arc<dyn CountBackend>>,
}

impl BackendSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one document store for both unigram and substitution lookups
    pub fn with_document_store<B>(mut self, store: Arc<B>) -> Self
    where
        B: CountBackend + SubstitutionBackend + 'static,
    {
        self.unigrams = Some(store.clone());
        self.substitutions = Some(store);
        self
    }

    pub fn with_column_store(mut self, store: Arc<dyn CountBackend>) -> Self {
        self.dense = Some(store);
        self
    }

    pub fn has_document_store(&self) -> bool {
        self.unigrams.is_some() || self.substitutions.is_some()
    }

    pub fn has_column_store(&self) -> bool {
        self.dense.is_some()
    }
}

impl std::fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSet")
            .field("unigrams", &self.unigrams.as_ref().map(|b| b.name()))
            .field("substitutions", &self.substitutions.as_ref().map(|b| b.name()))
            .field("dense", &self.dense.as_ref().map(|b| b.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_or_zero() {
        assert_eq!(Lookup::Found(7u64).or_zero(), 7);
        assert_eq!(Lookup::<u64>::NotFound.or_zero(), 0);
        assert_eq!(Lookup::from(Some(3u64)), Lookup::Found(3));
        assert!(!Lookup::<u64>::from(None).is_found());
    }

    #[test]
    fn test_backend_set_wiring() {
        let store = Arc::new(InMemoryStore::new());
        let set = BackendSet::new().with_document_store(store);
        assert!(set.has_document_store());
        assert!(!set.has_column_store());
        assert!(format!("{:?}", set).contains("in-memory"));
    }
}
