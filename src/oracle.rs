//! The frequency oracle
//!
//! [`NgramOracle`] is the configured context every query goes through. It is
//! built once, computes the substitution baseline eagerly, and is read-only
//! afterwards, so a shared `&NgramOracle` (or `Arc`) serves concurrent
//! callers without locking. Each `get_freq` awaits at most one backend
//! round-trip.

use std::time::Duration;

use tracing::{debug, info};

use crate::assemble::{self, FrequencyMap, SubstitutionBaseline};
use crate::backend::{BackendSet, CellStats};
use crate::config::{OracleConfig, DEFAULT_RATE_WINDOW_SECS};
use crate::error::{BackendRole, OracleError};
use crate::ngram::Ngram;
use crate::rate::{RateObserver, RateSnapshot};
use crate::router::{route, Route};
use crate::vocabulary::SubstitutionVocabulary;

/// Diagnostics knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleOptions {
    /// Log column-store call rate (observational only)
    pub rate_logging: bool,
    pub rate_window: Duration,
}

impl Default for OracleOptions {
    fn default() -> Self {
        Self {
            rate_logging: false,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
        }
    }
}

#[derive(Debug)]
pub struct NgramOracle {
    vocabulary: SubstitutionVocabulary,
    backends: BackendSet,
    baseline: SubstitutionBaseline,
    rate: RateObserver,
}

impl NgramOracle {
    /// Wire backends and compute the substitution baseline.
    ///
    /// Each vocabulary label is looked up once as a unigram; a non-empty
    /// vocabulary therefore needs a unigram backend.
    pub async fn configure(
        vocabulary: SubstitutionVocabulary,
        backends: BackendSet,
        options: OracleOptions,
    ) -> Result<Self, OracleError> {
        let mut oracle = Self {
            vocabulary,
            backends,
            baseline: SubstitutionBaseline::new(),
            rate: RateObserver::new(options.rate_logging, options.rate_window),
        };

        oracle.baseline = oracle.compute_baseline().await?;
        // window starts once everything is wired
        oracle.rate.reset();

        info!(
            labels = oracle.vocabulary.len(),
            document_store = oracle.backends.has_document_store(),
            column_store = oracle.backends.has_column_store(),
            rate_logging = oracle.rate.is_enabled(),
            "N-gram oracle configured"
        );

        Ok(oracle)
    }

    /// Connect the backends named in `config` and configure
    pub async fn connect(config: &OracleConfig) -> Result<Self, OracleError> {
        let vocabulary = config.vocabulary.load()?;
        let mut backends = BackendSet::new();

        if let Some(endpoint) = &config.document_store {
            #[cfg(feature = "document-store")]
            {
                let store = crate::backend::MongoDocumentStore::connect(endpoint).await?;
                backends = backends.with_document_store(std::sync::Arc::new(store));
            }
            #[cfg(not(feature = "document-store"))]
            {
                let _ = endpoint;
                return Err(crate::config::ConfigError::FeatureDisabled("document-store").into());
            }
        }

        if let Some(column) = &config.column_store {
            let store = crate::backend::HBaseRestColumnStore::new(column)?;
            backends = backends.with_column_store(std::sync::Arc::new(store));
        }

        Self::configure(vocabulary, backends, config.diagnostics.options()).await
    }

    async fn compute_baseline(&self) -> Result<SubstitutionBaseline, OracleError> {
        let mut baseline = SubstitutionBaseline::new();
        for label in self.vocabulary.iter() {
            baseline.insert(label.to_string(), self.unigram_count(label).await?);
        }
        Ok(baseline)
    }

    async fn unigram_count(&self, key: &str) -> Result<u64, OracleError> {
        let backend = self
            .backends
            .unigrams
            .as_ref()
            .ok_or(OracleError::BackendNotConfigured(BackendRole::Unigram))?;
        Ok(backend.count(key).await?.or_zero())
    }

    /// Corpus frequency of a space-delimited n-gram.
    ///
    /// Missing records count zero. Fails only for unsupported shapes,
    /// unwired backends, and client errors.
    pub async fn get_freq(&self, input: &str) -> Result<FrequencyMap, OracleError> {
        let ngram = Ngram::parse(input)?;
        let route = route(&ngram)?;
        debug!(ngram = %ngram, ?route, "Routing frequency query");

        match route {
            Route::Baseline => Ok(assemble::baseline(&self.baseline)),
            Route::Unigram => {
                let count = self.unigram_count(ngram.key()).await?;
                Ok(assemble::single_word(&ngram, count))
            }
            Route::Substitution => {
                let backend = self
                    .backends
                    .substitutions
                    .as_ref()
                    .ok_or(OracleError::BackendNotConfigured(BackendRole::Substitution))?;
                let counts = backend.substitution_counts(ngram.key()).await?;
                Ok(assemble::substituted(&ngram, &self.vocabulary, counts))
            }
            Route::Dense => {
                let backend = self
                    .backends
                    .dense
                    .as_ref()
                    .ok_or(OracleError::BackendNotConfigured(BackendRole::Dense))?;
                let outcome = backend.count(ngram.key()).await;
                self.rate.record();
                Ok(assemble::exact(&ngram, outcome?.or_zero()))
            }
        }
    }

    pub fn vocabulary(&self) -> &SubstitutionVocabulary {
        &self.vocabulary
    }

    pub fn substitution_baseline(&self) -> &SubstitutionBaseline {
        &self.baseline
    }

    /// Column-store call count in the current rate window
    pub fn column_store_rate(&self) -> RateSnapshot {
        self.rate.snapshot()
    }

    /// Found/absent/malformed tally of the column store, if it keeps one
    pub fn column_store_stats(&self) -> Option<CellStats> {
        self.backends.dense.as_ref().and_then(|b| b.cell_stats())
    }

    /// Release backend clients, logging final column-store statistics
    pub fn close(self) {
        if let Some(stats) = self.column_store_stats() {
            info!(
                found = stats.found,
                absent = stats.absent,
                malformed = stats.malformed,
                "Closing column store"
            );
        }
        drop(self.backends);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_vocabulary_needs_no_backend() {
        let oracle = NgramOracle::configure(
            SubstitutionVocabulary::default(),
            BackendSet::new(),
            OracleOptions::default(),
        )
        .await
        .unwrap();

        assert!(oracle.substitution_baseline().is_empty());
        assert!(oracle.get_freq("SUB").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vocabulary_without_document_store() {
        let err = NgramOracle::configure(
            SubstitutionVocabulary::new(["dog"]),
            BackendSet::new(),
            OracleOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            OracleError::BackendNotConfigured(BackendRole::Unigram)
        ));
    }

    #[tokio::test]
    async fn test_missing_column_store() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = NgramOracle::configure(
            SubstitutionVocabulary::default(),
            BackendSet::new().with_document_store(store),
            OracleOptions::default(),
        )
        .await
        .unwrap();

        let err = oracle.get_freq("quick brown").await.unwrap_err();
        assert!(matches!(
            err,
            OracleError::BackendNotConfigured(BackendRole::Dense)
        ));
        assert_eq!(oracle.column_store_rate().calls, 0);
    }

    #[tokio::test]
    async fn test_dense_calls_are_observed() {
        let column = Arc::new(InMemoryStore::new().with_count("quick brown", 42));
        let oracle = NgramOracle::configure(
            SubstitutionVocabulary::default(),
            BackendSet::new().with_column_store(column),
            OracleOptions::default(),
        )
        .await
        .unwrap();

        oracle.get_freq("quick brown").await.unwrap();
        oracle.get_freq("lazy dog").await.unwrap();
        assert_eq!(oracle.column_store_rate().calls, 2);
        // in-memory store keeps no cell stats
        assert!(oracle.column_store_stats().is_none());
    }

    #[tokio::test]
    async fn test_connect_without_backends() {
        let config = OracleConfig::from_yaml("diagnostics:\n  rate_logging: true\n").unwrap();
        let oracle = NgramOracle::connect(&config).await.unwrap();
        assert!(oracle.vocabulary().is_empty());
        oracle.close();
    }
}
