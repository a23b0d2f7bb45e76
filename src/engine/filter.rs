use std::collections::{BTreeSet, HashSet};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::generator::corpus::{WordCorpus, WordEntry};

/// Percentage of a limited selection reserved for words that use a new key.
pub const NEW_KEY_PERCENT: usize = 70;

/// The keys a learner may be asked to type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyFilter {
    pub allowed: BTreeSet<char>,
}

impl KeyFilter {
    pub fn new<I: IntoIterator<Item = char>>(allowed: I) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_allowed(&self, ch: char) -> bool {
        self.allowed.contains(&ch) || ch == ' '
    }

    /// All-or-nothing: one unavailable letter disqualifies the word.
    pub fn admits(&self, entry: &WordEntry) -> bool {
        entry.letters.iter().all(|&ch| self.is_allowed(ch))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WordQuery {
    pub min_length: usize,
    pub max_length: usize,
    /// Keep only words with at least one of these letters.
    pub must_include: Option<BTreeSet<char>>,
    pub limit: Option<usize>,
    /// Randomize after sorting; the frequency order is discarded before the limit.
    pub shuffle: bool,
}

impl Default for WordQuery {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: usize::MAX,
            must_include: None,
            limit: None,
            shuffle: false,
        }
    }
}

impl WordQuery {
    pub fn lengths(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

/// Words typeable with `available`, most frequent first (stable on ties).
pub fn valid_words<'c>(
    corpus: &'c WordCorpus,
    available: &KeyFilter,
    query: &WordQuery,
    rng: &mut SmallRng,
) -> Vec<&'c WordEntry> {
    select(corpus, available, query, &HashSet::new(), rng)
}

/// Two-phase pick: up to `ceil(limit * 0.7)` words using a new key, then the
/// remainder from any typeable word not already chosen. May come back short
/// when the corpus is sparse.
pub fn words_for_new_keys<'c>(
    corpus: &'c WordCorpus,
    available: &KeyFilter,
    new_keys: &[char],
    query: &WordQuery,
    rng: &mut SmallRng,
) -> Vec<&'c WordEntry> {
    let new_keys: BTreeSet<char> = new_keys.iter().copied().collect();
    let phase_a_query = WordQuery {
        must_include: Some(new_keys),
        limit: query.limit.map(new_key_quota),
        ..query.clone()
    };
    let mut chosen = select(corpus, available, &phase_a_query, &HashSet::new(), rng);

    let remaining = query.limit.map(|l| l.saturating_sub(chosen.len()));
    if remaining == Some(0) {
        return chosen;
    }
    let exclude: HashSet<&str> = chosen.iter().map(|e| e.word.as_str()).collect();
    let phase_b_query = WordQuery {
        must_include: None,
        limit: remaining,
        ..query.clone()
    };
    let rest = select(corpus, available, &phase_b_query, &exclude, rng);
    chosen.extend(rest);
    chosen
}

/// `ceil(limit * 0.7)` without float rounding surprises.
pub fn new_key_quota(limit: usize) -> usize {
    (limit * NEW_KEY_PERCENT).div_ceil(100)
}

fn select<'c>(
    corpus: &'c WordCorpus,
    available: &KeyFilter,
    query: &WordQuery,
    exclude: &HashSet<&str>,
    rng: &mut SmallRng,
) -> Vec<&'c WordEntry> {
    let mut matching: Vec<&WordEntry> = corpus
        .words
        .iter()
        .filter(|e| available.admits(e))
        .filter(|e| {
            let len = e.char_len();
            len >= query.min_length && len <= query.max_length
        })
        .filter(|e| {
            query
                .must_include
                .as_ref()
                .is_none_or(|keys| e.contains_any(keys))
        })
        .filter(|e| !exclude.contains(e.word.as_str()))
        .collect();

    matching.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    if query.shuffle {
        matching.shuffle(rng);
    }
    if let Some(limit) = query.limit {
        matching.truncate(limit);
    }
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn corpus(words: &[(&str, u8)]) -> WordCorpus {
        WordCorpus::new(
            "en",
            words
                .iter()
                .map(|&(w, f)| WordEntry::new(w, f, None))
                .collect(),
        )
    }

    fn words<'a>(entries: &[&'a WordEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.word.as_str()).collect()
    }

    fn home_row() -> KeyFilter {
        KeyFilter::new(['a', 's', 'd', 'f', 'j', 'k', 'l', ' '])
    }

    #[test]
    fn test_subset_filter_orders_by_frequency() {
        let corpus = corpus(&[("dad", 6), ("flask", 8), ("hello", 10)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let result = valid_words(&corpus, &home_row(), &WordQuery::lengths(2, 10), &mut rng);
        assert_eq!(words(&result), vec!["flask", "dad"]);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let corpus = corpus(&[("sad", 5), ("lad", 5), ("add", 5), ("fall", 9)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let result = valid_words(&corpus, &home_row(), &WordQuery::default(), &mut rng);
        assert_eq!(words(&result), vec!["fall", "sad", "lad", "add"]);
    }

    #[test]
    fn test_length_bounds_and_limit() {
        let corpus = corpus(&[("as", 9), ("dad", 8), ("flask", 7), ("salads", 6)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let query = WordQuery::lengths(3, 5).with_limit(1);
        let result = valid_words(&corpus, &home_row(), &query, &mut rng);
        assert_eq!(words(&result), vec!["dad"]);
    }

    #[test]
    fn test_must_include_is_union() {
        let corpus = corpus(&[("dad", 9), ("lass", 8), ("ask", 7), ("fall", 6)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let query = WordQuery {
            must_include: Some(BTreeSet::from(['k', 'f'])),
            ..WordQuery::default()
        };
        let result = valid_words(&corpus, &home_row(), &query, &mut rng);
        assert_eq!(words(&result), vec!["ask", "fall"]);
    }

    #[test]
    fn test_shuffle_keeps_membership() {
        let corpus = corpus(&[("dad", 9), ("lass", 8), ("ask", 7), ("fall", 6), ("sad", 5)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let shuffled = valid_words(
            &corpus,
            &home_row(),
            &WordQuery::default().with_shuffle(true),
            &mut rng,
        );
        let mut sorted = words(&shuffled);
        sorted.sort();
        assert_eq!(sorted, vec!["ask", "dad", "fall", "lass", "sad"]);
    }

    #[test]
    fn test_new_keys_fill_seventy_percent_first() {
        let corpus = corpus(&[
            ("dad", 10),
            ("sad", 10),
            ("lad", 10),
            ("add", 10),
            ("ask", 3),
            ("flask", 2),
            ("kid", 1),
            ("jak", 1),
        ]);
        let mut rng = SmallRng::seed_from_u64(0);
        let query = WordQuery::default().with_limit(4);
        let result = words_for_new_keys(&corpus, &home_row(), &['k', 'j'], &query, &mut rng);
        // ceil(4 * 0.7) = 3 from phase A, the rest by frequency
        assert_eq!(words(&result), vec!["ask", "flask", "jak", "dad"]);
    }

    #[test]
    fn test_sparse_corpus_comes_back_short() {
        let corpus = corpus(&[("dad", 5), ("hello", 9)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let query = WordQuery::default().with_limit(8);
        let result = words_for_new_keys(&corpus, &home_row(), &['k'], &query, &mut rng);
        assert_eq!(words(&result), vec!["dad"]);
    }

    #[test]
    fn test_phase_b_never_repeats_phase_a() {
        let corpus = corpus(&[("ask", 9), ("dad", 8)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let result = words_for_new_keys(&corpus, &home_row(), &['k'], &WordQuery::default(), &mut rng);
        assert_eq!(words(&result), vec!["ask", "dad"]);
    }

    #[test]
    fn test_quota() {
        assert_eq!(new_key_quota(8), 6);
        assert_eq!(new_key_quota(10), 7);
        assert_eq!(new_key_quota(1), 1);
        assert_eq!(new_key_quota(0), 0);
    }
}
