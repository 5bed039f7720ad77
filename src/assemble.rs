//! Result assembly
//!
//! Turns backend answers into the keyed count mapping callers consume. The
//! key shape depends only on the route: bare word for single-word lookups
//! (and the baseline), token tuple otherwise.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::backend::Lookup;
use crate::ngram::{Ngram, NgramKey};
use crate::vocabulary::SubstitutionVocabulary;

/// Query result: n-gram key to corpus count
pub type FrequencyMap = BTreeMap<NgramKey, u64>;

/// Unigram count of every substitution label, computed at configuration
pub type SubstitutionBaseline = BTreeMap<String, u64>;

/// `{query: count}`, keyed by the query string as submitted
pub fn single_word(ngram: &Ngram, count: u64) -> FrequencyMap {
    BTreeMap::from([(NgramKey::Word(ngram.key().to_string()), count)])
}

/// `{(t1, .., tn): count}`
pub fn exact(ngram: &Ngram, count: u64) -> FrequencyMap {
    BTreeMap::from([(NgramKey::Tokens(ngram.tokens().to_vec()), count)])
}

/// One entry per vocabulary label with the substitution token replaced.
/// Labels missing from `counts` (or a missing record) count zero.
pub fn substituted(
    ngram: &Ngram,
    vocabulary: &SubstitutionVocabulary,
    counts: Lookup<HashMap<String, u64>>,
) -> FrequencyMap {
    let counts = counts.found().unwrap_or_default();

    vocabulary
        .iter()
        .map(|label| {
            let count = counts.get(label).copied().unwrap_or(0);
            (NgramKey::Tokens(ngram.substitute(label)), count)
        })
        .collect()
}

/// Baseline keyed by bare label
pub fn baseline(baseline: &SubstitutionBaseline) -> FrequencyMap {
    baseline
        .iter()
        .map(|(label, count)| (NgramKey::Word(label.clone()), *count))
        .collect()
}

/// Flat, serializable form of one result entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub ngram: NgramKey,
    pub count: u64,
}

pub fn entries(map: &FrequencyMap) -> Vec<FrequencyEntry> {
    map.iter()
        .map(|(ngram, count)| FrequencyEntry {
            ngram: ngram.clone(),
            count: *count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_word_key() {
        let ngram = Ngram::parse("dog").unwrap();
        let map = single_word(&ngram, 0);
        assert_eq!(map, BTreeMap::from([(NgramKey::word("dog"), 0)]));

        let padded = Ngram::parse(" dog ").unwrap();
        let map = single_word(&padded, 3);
        assert_eq!(map, BTreeMap::from([(NgramKey::word(" dog "), 3)]));
    }

    #[test]
    fn test_substituted_defaults_to_zero() {
        let ngram = Ngram::parse("SUB barked").unwrap();
        let vocab = SubstitutionVocabulary::new(["dog", "cat", "cow"]);
        let counts = HashMap::from([("dog".to_string(), 4)]);

        let map = substituted(&ngram, &vocab, Lookup::Found(counts));
        assert_eq!(
            map,
            BTreeMap::from([
                (NgramKey::tokens(["cat", "barked"]), 0),
                (NgramKey::tokens(["cow", "barked"]), 0),
                (NgramKey::tokens(["dog", "barked"]), 4),
            ])
        );
    }

    #[test]
    fn test_substituted_missing_record() {
        let ngram = Ngram::parse("a SUB").unwrap();
        let vocab = SubstitutionVocabulary::new(["x", "y"]);
        let map = substituted(&ngram, &vocab, Lookup::NotFound);
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|c| *c == 0));
    }

    #[test]
    fn test_entries_serialize() {
        let ngram = Ngram::parse("quick brown").unwrap();
        let json = serde_json::to_string(&entries(&exact(&ngram, 42))).unwrap();
        assert_eq!(json, r#"[{"ngram":["quick","brown"],"count":42}]"#);

        let word = Ngram::parse("dog").unwrap();
        let json = serde_json::to_string(&entries(&single_word(&word, 1))).unwrap();
        assert_eq!(json, r#"[{"ngram":"dog","count":1}]"#);
    }
}
