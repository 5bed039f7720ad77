//! Kilogram - N-gram Frequency Oracle
//!
//! Answers "how often does this n-gram occur in the corpus?" from two
//! heterogeneous stores behind a single query call. A query may contain one
//! substitution token (`SUB`), in which case the answer is one count per
//! label of the substitution vocabulary.
//!
//! # Architecture
//!
//! ```text
//!   "the cat SUB"
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │  Ngram::parse + router::route                │
//! │  arity / substitution token -> Route         │
//! └──────────────────────────────────────────────┘
//!        │
//!        ├── Baseline ──────► precomputed label unigram counts
//!        ├── Unigram ───────► document store  (1grams.default)
//!        ├── Substitution ──► document store  (ngrams.default)
//!        └── Dense ─────────► column store    (HBase "ngrams", ngram:value)
//!                               │
//!                               └─► RateObserver (log only)
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │  assemble: FrequencyMap (NgramKey -> count)  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use kilogram::{NgramOracle, OracleConfig};
//!
//! let config = OracleConfig::from_file("config/kilogram.yaml")?;
//! let oracle = NgramOracle::connect(&config).await?;
//!
//! let counts = oracle.get_freq("the cat SUB").await?;
//! ```

pub mod assemble;
pub mod backend;
pub mod config;
pub mod error;
pub mod ngram;
pub mod oracle;
pub mod rate;
pub mod router;
pub mod vocabulary;

// Re-export main types
pub use assemble::{FrequencyEntry, FrequencyMap, SubstitutionBaseline};
pub use backend::{BackendSet, CellStats, CountBackend, Lookup, SubstitutionBackend};
pub use config::{ColumnStoreConfig, Endpoint, OracleConfig};
pub use error::{BackendError, BackendRole, OracleError};
pub use ngram::{Ngram, NgramKey, SUBSTITUTION_TOKEN};
pub use oracle::{NgramOracle, OracleOptions};
pub use rate::RateObserver;
pub use vocabulary::SubstitutionVocabulary;
