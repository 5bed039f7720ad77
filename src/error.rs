//! Error types for the frequency oracle
//!
//! Absence of data is never an error here: backends answer
//! [`Lookup::NotFound`](crate::backend::Lookup) and the router maps that to a
//! zero count. What remains are shape errors on the query itself, missing
//! wiring, and failures raised by the underlying store clients.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type returned by [`NgramOracle`](crate::NgramOracle)
#[derive(Error, Debug)]
pub enum OracleError {
    /// No backend path serves this many tokens. Retrying the same input
    /// will fail the same way.
    #[error("{arity}-grams are not supported{}", wildcard_suffix(.wildcard))]
    UnsupportedArity { arity: usize, wildcard: bool },

    #[error("n-gram '{ngram}' contains {count} substitution tokens, at most one is allowed")]
    MultipleWildcards { ngram: String, count: usize },

    #[error("no {0} backend is configured")]
    BackendNotConfigured(BackendRole),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn wildcard_suffix(wildcard: &bool) -> &'static str {
    if *wildcard {
        " with a substitution token"
    } else {
        ""
    }
}

/// Which lookup a route needs a backend for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendRole {
    /// Exact unigram counts (document store)
    Unigram,
    /// Per-label counts for wildcarded n-grams (document store)
    Substitution,
    /// Exact bigram/trigram counts (column store)
    Dense,
}

impl fmt::Display for BackendRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendRole::Unigram => write!(f, "unigram"),
            BackendRole::Substitution => write!(f, "substitution"),
            BackendRole::Dense => write!(f, "dense n-gram"),
        }
    }
}

/// Failures raised by a store client
///
/// These are not categorised further and are never retried.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{backend} connection failed: {message}")]
    Connection {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} returned HTTP {status} for '{key}'")]
    Status {
        backend: &'static str,
        status: u16,
        key: String,
    },

    #[error("invalid {backend} endpoint '{endpoint}': {message}")]
    Endpoint {
        backend: &'static str,
        endpoint: String,
        message: String,
    },
}

impl BackendError {
    pub fn connection(backend: &'static str, err: impl fmt::Display) -> Self {
        BackendError::Connection {
            backend,
            message: err.to_string(),
        }
    }
}
