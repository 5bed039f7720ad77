//! Document store adapter (MongoDB)
//!
//! Two collections, both keyed by the `ngram` field:
//!
//! - `1grams.default`: `{ ngram: "dog", count: 10 }`
//! - `ngrams.default`: `{ ngram: "the cat SUB", count: { dog: 3, cat: 0 } }`
//!
//! Values that are not non-negative integers read as absent.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::{debug, warn};

use super::{CountBackend, Lookup, SubstitutionBackend};
use crate::config::Endpoint;
use crate::error::BackendError;

const NAME: &str = "mongodb";

pub const UNIGRAM_DATABASE: &str = "1grams";
pub const NGRAM_DATABASE: &str = "ngrams";
pub const COLLECTION: &str = "default";
pub const NGRAM_FIELD: &str = "ngram";
pub const COUNT_FIELD: &str = "count";

pub struct MongoDocumentStore {
    unigrams: Collection<Document>,
    ngrams: Collection<Document>,
}

impl MongoDocumentStore {
    /// Connect to `mongodb://host:port`
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, BackendError> {
        let uri = format!("mongodb://{}:{}", endpoint.host, endpoint.port);
        let options = ClientOptions::parse(&uri)
            .await
            .map_err(|e| BackendError::Endpoint {
                backend: NAME,
                endpoint: uri.clone(),
                message: e.to_string(),
            })?;
        let client = Client::with_options(options).map_err(|e| BackendError::connection(NAME, e))?;

        debug!(%uri, "MongoDB client ready");
        Ok(Self::from_client(&client))
    }

    pub fn from_client(client: &Client) -> Self {
        Self {
            unigrams: client.database(UNIGRAM_DATABASE).collection(COLLECTION),
            ngrams: client.database(NGRAM_DATABASE).collection(COLLECTION),
        }
    }

    async fn find_record(
        collection: &Collection<Document>,
        key: &str,
    ) -> Result<Option<Document>, BackendError> {
        collection
            .find_one(ngram_filter(key), None)
            .await
            .map_err(|e| BackendError::connection(NAME, e))
    }
}

/// Exact-match filter on the `ngram` field
pub fn ngram_filter(key: &str) -> Document {
    doc! { NGRAM_FIELD: key }
}

/// Read a non-negative integer, accepting whole-valued doubles
pub fn bson_count(value: &Bson) -> Option<u64> {
    match value {
        Bson::Int32(v) => u64::try_from(*v).ok(),
        Bson::Int64(v) => u64::try_from(*v).ok(),
        Bson::Double(v) if *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64 => {
            Some(*v as u64)
        }
        _ => None,
    }
}

/// `count` of a unigram record
pub fn unigram_count(record: &Document) -> Lookup<u64> {
    record.get(COUNT_FIELD).and_then(bson_count).into()
}

/// `count` sub-document of a substitution record. Labels with unreadable
/// values are dropped so they default to zero downstream.
pub fn substitution_counts(record: &Document) -> Lookup<HashMap<String, u64>> {
    let Ok(counts) = record.get_document(COUNT_FIELD) else {
        return Lookup::NotFound;
    };

    Lookup::Found(
        counts
            .iter()
            .filter_map(|(label, value)| bson_count(value).map(|c| (label.clone(), c)))
            .collect(),
    )
}

#[async_trait]
impl CountBackend for MongoDocumentStore {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn count(&self, key: &str) -> Result<Lookup<u64>, BackendError> {
        let Some(record) = Self::find_record(&self.unigrams, key).await? else {
            return Ok(Lookup::NotFound);
        };

        let count = unigram_count(&record);
        if !count.is_found() {
            warn!(ngram = %key, "Unigram record without integer count");
        }
        Ok(count)
    }
}

#[async_trait]
impl SubstitutionBackend for MongoDocumentStore {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn substitution_counts(
        &self,
        key: &str,
    ) -> Result<Lookup<HashMap<String, u64>>, BackendError> {
        let Some(record) = Self::find_record(&self.ngrams, key).await? else {
            return Ok(Lookup::NotFound);
        };

        let counts = substitution_counts(&record);
        if !counts.is_found() {
            warn!(ngram = %key, "Substitution record without count mapping");
        }
        Ok(counts)
    }
}
