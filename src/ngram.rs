//! N-gram parsing and result keys

use std::fmt;

use serde::Serialize;

use crate::error::OracleError;

/// Reserved token standing in for one label of the substitution vocabulary
pub const SUBSTITUTION_TOKEN: &str = "SUB";

/// Longest n-gram answered without a substitution token (column store)
pub const MAX_EXACT_ARITY: usize = 3;

/// Longest n-gram answered with a substitution token (document store)
pub const MAX_SUBSTITUTION_ARITY: usize = 4;

/// A whitespace-tokenized query with at most one substitution token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ngram {
    raw: String,
    tokens: Vec<String>,
    wildcard: Option<usize>,
}

impl Ngram {
    /// Split a query on whitespace and locate the substitution token.
    ///
    /// Arity bounds are not checked here; see [`crate::router::route`].
    pub fn parse(input: &str) -> Result<Self, OracleError> {
        let tokens: Vec<String> = input.split_whitespace().map(str::to_owned).collect();

        if tokens.is_empty() {
            return Err(OracleError::UnsupportedArity {
                arity: 0,
                wildcard: false,
            });
        }

        let positions: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.as_str() == SUBSTITUTION_TOKEN)
            .map(|(i, _)| i)
            .collect();

        if positions.len() > 1 {
            return Err(OracleError::MultipleWildcards {
                ngram: tokens.join(" "),
                count: positions.len(),
            });
        }

        Ok(Self {
            raw: input.to_string(),
            tokens,
            wildcard: positions.first().copied(),
        })
    }

    pub fn arity(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn has_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    pub fn wildcard_position(&self) -> Option<usize> {
        self.wildcard
    }

    /// Backend lookup key: the query exactly as submitted
    pub fn key(&self) -> &str {
        &self.raw
    }

    /// Tokens with the substitution token replaced by `label`.
    ///
    /// Returns the tokens unchanged when there is no substitution token.
    pub fn substitute(&self, label: &str) -> Vec<String> {
        let mut tokens = self.tokens.clone();
        if let Some(pos) = self.wildcard {
            tokens[pos] = label.to_string();
        }
        tokens
    }
}

impl fmt::Display for Ngram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Key of a [`FrequencyMap`](crate::assemble::FrequencyMap) entry
///
/// Single-word queries without substitution (and the substitution baseline)
/// are keyed by the bare word, everything else by the ordered token tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum NgramKey {
    Word(String),
    Tokens(Vec<String>),
}

impl NgramKey {
    pub fn word(word: impl Into<String>) -> Self {
        NgramKey::Word(word.into())
    }

    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NgramKey::Tokens(tokens.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for NgramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NgramKey::Word(w) => write!(f, "{}", w),
            NgramKey::Tokens(t) => write!(f, "{}", t.join(" ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let ngram = Ngram::parse("quick  brown\tfox").unwrap();
        assert_eq!(ngram.arity(), 3);
        assert!(!ngram.has_wildcard());
        assert_eq!(ngram.tokens(), ["quick", "brown", "fox"]);
        // lookups use the submitted string, not a re-joined one
        assert_eq!(ngram.key(), "quick  brown\tfox");
    }

    #[test]
    fn test_parse_wildcard() {
        let ngram = Ngram::parse("the cat SUB").unwrap();
        assert_eq!(ngram.wildcard_position(), Some(2));
        assert_eq!(ngram.substitute("dog"), vec!["the", "cat", "dog"]);
        // original tokens untouched
        assert_eq!(ngram.tokens()[2], SUBSTITUTION_TOKEN);
    }

    #[test]
    fn test_wildcard_is_case_sensitive() {
        let ngram = Ngram::parse("sub Sub").unwrap();
        assert!(!ngram.has_wildcard());
    }

    #[test]
    fn test_parse_empty() {
        let err = Ngram::parse("   ").unwrap_err();
        assert!(matches!(
            err,
            OracleError::UnsupportedArity { arity: 0, .. }
        ));
    }

    #[test]
    fn test_parse_multiple_wildcards() {
        let err = Ngram::parse("SUB of SUB").unwrap_err();
        assert!(matches!(err, OracleError::MultipleWildcards { count: 2, .. }));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(NgramKey::word("dog").to_string(), "dog");
        assert_eq!(NgramKey::tokens(["the", "dog"]).to_string(), "the dog");
    }
}
