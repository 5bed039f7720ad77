//! Oracle configuration
//!
//! Loaded once at startup from YAML, optionally overridden from the
//! environment, and never re-read afterwards.
//!
//! ```yaml
//! document_store:
//!   host: localhost
//!   port: 27017
//! column_store:
//!   host: localhost
//!   port: 8080
//!   table: ngrams
//! vocabulary:
//!   file: config/dbpedia_types.txt
//! diagnostics:
//!   rate_logging: true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oracle::OracleOptions;
use crate::vocabulary::SubstitutionVocabulary;

/// Default HBase table holding dense n-gram counts
pub const DEFAULT_TABLE: &str = "ngrams";

/// Default column holding the count cell
pub const DEFAULT_COLUMN: &str = "ngram:value";

/// Default sampling window for the column-store rate log
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 30;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid endpoint '{0}', expected host:port")]
    InvalidEndpoint(String),

    #[error("feature '{0}' is required for this configuration")]
    FeatureDisabled(&'static str),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub document_store: Option<Endpoint>,
    #[serde(default)]
    pub column_store: Option<ColumnStoreConfig>,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// host/port pair of a backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host:port`
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidEndpoint(value.to_string());
        let (host, port) = value.trim().rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(host, port))
    }
}

/// HBase REST gateway settings
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnStoreConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_column")]
    pub column: String,
    /// Request timeout handed to the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_column() -> String {
    DEFAULT_COLUMN.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ColumnStoreConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            host: endpoint.host,
            port: endpoint.port,
            table: default_table(),
            column: default_column(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where the substitution labels come from. Inline labels and a label file
/// may be combined.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VocabularyConfig {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl VocabularyConfig {
    pub fn load(&self) -> Result<SubstitutionVocabulary, ConfigError> {
        let mut labels = self.labels.clone();
        if let Some(path) = &self.file {
            let from_file = SubstitutionVocabulary::from_file(path)?;
            labels.extend(from_file.labels().iter().cloned());
        }
        Ok(SubstitutionVocabulary::new(labels))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log column-store request rate (observational only)
    #[serde(default)]
    pub rate_logging: bool,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_window_secs() -> u64 {
    DEFAULT_RATE_WINDOW_SECS
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            rate_logging: false,
            window_secs: DEFAULT_RATE_WINDOW_SECS,
        }
    }
}

impl DiagnosticsConfig {
    pub fn options(&self) -> OracleOptions {
        OracleOptions {
            rate_logging: self.rate_logging,
            rate_window: Duration::from_secs(self.window_secs),
        }
    }
}

impl OracleConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: OracleConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Point the column store at `endpoint`, keeping table, column and
    /// timeout when one is already configured
    pub fn set_column_store(&mut self, endpoint: Endpoint) {
        match self.column_store.as_mut() {
            Some(existing) => {
                existing.host = endpoint.host;
                existing.port = endpoint.port;
            }
            None => self.column_store = Some(ColumnStoreConfig::new(endpoint)),
        }
    }

    /// Apply `KILOGRAM_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// - `KILOGRAM_DOCUMENT_STORE=host:port`
    /// - `KILOGRAM_COLUMN_STORE=host:port` (table and column keep their values)
    /// - `KILOGRAM_DEBUG=1|true` enables rate logging
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("KILOGRAM_DOCUMENT_STORE") {
            self.document_store = Some(Endpoint::parse(&value)?);
        }

        if let Some(value) = lookup("KILOGRAM_COLUMN_STORE") {
            self.set_column_store(Endpoint::parse(&value)?);
        }

        if let Some(value) = lookup("KILOGRAM_DEBUG") {
            self.diagnostics.rate_logging = matches!(value.trim(), "1" | "true" | "yes");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
document_store:
  host: "mongo.internal"
  port: 27017

column_store:
  host: "hbase.internal"
  port: 8080
  table: "typogram"

vocabulary:
  labels: ["Person", "Place"]

diagnostics:
  rate_logging: true
"#;

        let config = OracleConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.document_store,
            Some(Endpoint::new("mongo.internal", 27017))
        );

        let column = config.column_store.unwrap();
        assert_eq!(column.table, "typogram");
        assert_eq!(column.column, DEFAULT_COLUMN);
        assert_eq!(column.timeout(), Duration::from_secs(30));

        assert!(config.diagnostics.rate_logging);
        assert_eq!(config.diagnostics.window_secs, DEFAULT_RATE_WINDOW_SECS);
        assert_eq!(config.vocabulary.load().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_config() {
        let config = OracleConfig::from_yaml("{}").unwrap();
        assert!(config.document_store.is_none());
        assert!(config.column_store.is_none());
        assert!(!config.diagnostics.rate_logging);
        assert!(config.vocabulary.load().unwrap().is_empty());
    }

    #[test]
    fn test_vocabulary_file_and_labels_merge() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Place\nBand").unwrap();

        let vocab = VocabularyConfig {
            labels: vec!["Person".to_string(), "Place".to_string()],
            file: Some(file.path().to_path_buf()),
        }
        .load()
        .unwrap();

        assert_eq!(vocab.labels(), ["Band", "Person", "Place"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "column_store:\n  host: localhost\n  port: 9090").unwrap();

        let config = OracleConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.column_store.unwrap().endpoint(), Endpoint::new("localhost", 9090));
    }

    #[test]
    fn test_endpoint_parse() {
        assert_eq!(
            Endpoint::parse("diufpc304:9090").unwrap(),
            Endpoint::new("diufpc304", 9090)
        );
        assert!(Endpoint::parse("no-port").is_err());
        assert!(Endpoint::parse(":80").is_err());
        assert!(Endpoint::parse("host:99999").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("KILOGRAM_DOCUMENT_STORE", "mongo:27017"),
            ("KILOGRAM_COLUMN_STORE", "hbase:8080"),
            ("KILOGRAM_DEBUG", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = OracleConfig::from_yaml(
            "column_store:\n  host: old\n  port: 1\n  table: typogram\n",
        )
        .unwrap();
        config
            .apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.document_store, Some(Endpoint::new("mongo", 27017)));
        let column = config.column_store.unwrap();
        assert_eq!(column.endpoint(), Endpoint::new("hbase", 8080));
        assert_eq!(column.table, "typogram");
        assert!(config.diagnostics.rate_logging);
    }

    #[test]
    fn test_set_column_store() {
        let mut config = OracleConfig::default();
        config.set_column_store(Endpoint::new("hbase", 8080));
        let column = config.column_store.clone().unwrap();
        assert_eq!(column.endpoint(), Endpoint::new("hbase", 8080));
        assert_eq!(column.table, DEFAULT_TABLE);

        let mut config = OracleConfig::from_yaml(
            "column_store:\n  host: old\n  port: 1\n  table: typogram\n  column: ngram:types\n  timeout_secs: 3\n",
        )
        .unwrap();
        config.set_column_store(Endpoint::new("hbase", 8080));
        let column = config.column_store.unwrap();
        assert_eq!(column.endpoint(), Endpoint::new("hbase", 8080));
        assert_eq!(column.table, "typogram");
        assert_eq!(column.column, "ngram:types");
        assert_eq!(column.timeout_secs, 3);
    }

    #[test]
    fn test_env_override_rejects_bad_endpoint() {
        let mut config = OracleConfig::default();
        let err = config
            .apply_env_with(|k| (k == "KILOGRAM_COLUMN_STORE").then(|| "hbase".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
    }
}
