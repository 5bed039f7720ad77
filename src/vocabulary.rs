//! Substitution vocabulary
//!
//! The fixed set of candidate labels a substitution token can stand for.
//! Labels are kept sorted so every wildcarded query enumerates them in the
//! same order.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionVocabulary {
    labels: Vec<String>,
}

impl SubstitutionVocabulary {
    /// Build from any set of labels. Labels are trimmed, empty ones dropped,
    /// duplicates collapsed.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        Self {
            labels: sorted.into_iter().collect(),
        }
    }

    /// Parse one label per line; blank lines and `#` comments are skipped
    pub fn parse_lines(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.starts_with('#')),
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse_lines(&content))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sorted_and_deduplicated() {
        let vocab = SubstitutionVocabulary::new(["dog", "cat", " dog ", ""]);
        assert_eq!(vocab.labels(), ["cat", "dog"]);
    }

    #[test]
    fn test_parse_lines() {
        let vocab = SubstitutionVocabulary::parse_lines(
            "# dbpedia types\nPerson\n\nPlace\nOrganisation\n",
        );
        assert_eq!(vocab.labels(), ["Organisation", "Person", "Place"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "city").unwrap();
        writeln!(file, "band").unwrap();

        let vocab = SubstitutionVocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["band", "city"]);
    }

    #[test]
    fn test_missing_file() {
        let err = SubstitutionVocabulary::from_file("/nonexistent/labels.txt").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
