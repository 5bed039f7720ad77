//! In-memory backend
//!
//! Serves counts from maps populated up front. Used as a test double and
//! for offline runs over a small precomputed table. Every lookup is
//! counted so tests can assert which routes touched the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{CountBackend, Lookup, SubstitutionBackend};
use crate::error::BackendError;

const NAME: &str = "in-memory";

#[derive(Debug, Default)]
pub struct InMemoryStore {
    counts: HashMap<String, u64>,
    substitutions: HashMap<String, HashMap<String, u64>>,
    unavailable: bool,
    count_calls: AtomicU64,
    substitution_calls: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact count for `key`
    pub fn with_count(mut self, key: impl Into<String>, count: u64) -> Self {
        self.counts.insert(key.into(), count);
        self
    }

    /// Per-label counts for a wildcarded `key`
    pub fn with_substitutions<I, S>(mut self, key: impl Into<String>, counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let counts = counts.into_iter().map(|(l, c)| (l.into(), c)).collect();
        self.substitutions.insert(key.into(), counts);
        self
    }

    /// Fail every lookup with a connection error
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn count_calls(&self) -> u64 {
        self.count_calls.load(Ordering::Relaxed)
    }

    pub fn substitution_calls(&self) -> u64 {
        self.substitution_calls.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable {
            return Err(BackendError::connection(NAME, "store marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CountBackend for InMemoryStore {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn count(&self, key: &str) -> Result<Lookup<u64>, BackendError> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        Ok(self.counts.get(key).copied().into())
    }
}

#[async_trait]
impl SubstitutionBackend for InMemoryStore {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn substitution_counts(
        &self,
        key: &str,
    ) -> Result<Lookup<HashMap<String, u64>>, BackendError> {
        self.substitution_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        Ok(self.substitutions.get(key).cloned().into())
    }
}
