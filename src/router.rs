//! Arity routing
//!
//! | arity | substitution token | route          |
//! |-------|--------------------|----------------|
//! | 1     | yes                | `Baseline`     |
//! | 1     | no                 | `Unigram`      |
//! | 2-4   | yes                | `Substitution` |
//! | 2-3   | no                 | `Dense`        |
//! | other | -                  | unsupported    |

use crate::error::OracleError;
use crate::ngram::{Ngram, MAX_EXACT_ARITY, MAX_SUBSTITUTION_ARITY};

/// Where a query is answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Precomputed substitution baseline, no backend call
    Baseline,
    /// Document store, unigram collection
    Unigram,
    /// Document store, n-gram collection with per-label counts
    Substitution,
    /// Column store
    Dense,
}

pub fn route(ngram: &Ngram) -> Result<Route, OracleError> {
    let arity = ngram.arity();
    let wildcard = ngram.has_wildcard();

    match (arity, wildcard) {
        (1, true) => Ok(Route::Baseline),
        (1, false) => Ok(Route::Unigram),
        (2..=MAX_SUBSTITUTION_ARITY, true) => Ok(Route::Substitution),
        (2..=MAX_EXACT_ARITY, false) => Ok(Route::Dense),
        _ => Err(OracleError::UnsupportedArity { arity, wildcard }),
    }
}
