use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::source::WordSource;

/// Language every other corpus falls back to.
pub const FALLBACK_LANGUAGE: &str = "en";

const MIN_FREQUENCY: u8 = 1;
const MAX_FREQUENCY: u8 = 10;
const DEFAULT_FREQUENCY: u8 = 5;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("no word list for language {0:?}")]
    Missing(String),
    #[error("word list for {language:?} is malformed: {source}")]
    Parse {
        language: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("word list for {0:?} has no usable words")]
    Empty(String),
    #[error("failed to read word list for {language:?}: {source}")]
    Io {
        language: String,
        #[source]
        source: std::io::Error,
    },
}

/// A word list record as stored on disk: either a bare string or an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawWord {
    Plain(String),
    Detailed {
        word: String,
        #[serde(default)]
        frequency: Option<u32>,
        #[serde(default)]
        category: Option<String>,
    },
}

impl RawWord {
    pub fn new(word: &str, frequency: u32) -> Self {
        RawWord::Detailed {
            word: word.to_string(),
            frequency: Some(frequency),
            category: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    /// Distinct characters of `word`, computed once at load time.
    pub letters: BTreeSet<char>,
    pub frequency: u8,
    pub category: Option<String>,
}

impl WordEntry {
    pub fn new(word: &str, frequency: u8, category: Option<String>) -> Self {
        let word: String = word.trim().chars().flat_map(char::to_lowercase).collect();
        let letters = word.chars().collect();
        Self {
            word,
            letters,
            frequency: frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY),
            category,
        }
    }

    pub fn char_len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn contains_any(&self, keys: &BTreeSet<char>) -> bool {
        !self.letters.is_disjoint(keys)
    }
}

impl From<RawWord> for WordEntry {
    fn from(raw: RawWord) -> Self {
        match raw {
            RawWord::Plain(word) => WordEntry::new(&word, DEFAULT_FREQUENCY, None),
            RawWord::Detailed {
                word,
                frequency,
                category,
            } => {
                let frequency = frequency
                    .unwrap_or(DEFAULT_FREQUENCY as u32)
                    .clamp(MIN_FREQUENCY as u32, MAX_FREQUENCY as u32) as u8;
                WordEntry::new(&word, frequency, category)
            }
        }
    }
}

/// One language's vocabulary. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordCorpus {
    pub language: String,
    pub words: Vec<WordEntry>,
}

impl WordCorpus {
    /// Builds a corpus, dropping blank words and keeping the first of any duplicates.
    pub fn new(language: &str, entries: Vec<WordEntry>) -> Self {
        let mut seen = HashSet::new();
        let words = entries
            .into_iter()
            .filter(|e| !e.word.is_empty())
            .filter(|e| seen.insert(e.word.clone()))
            .collect();
        Self {
            language: language.to_string(),
            words,
        }
    }

    pub fn from_raw(language: &str, raw: Vec<RawWord>) -> Self {
        Self::new(language, raw.into_iter().map(WordEntry::from).collect())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&WordEntry> {
        self.words.iter().find(|e| e.word == word)
    }
}

/// Loads corpora on first use and keeps them for the life of the loader.
pub struct CorpusLoader<S> {
    source: S,
    cache: RwLock<HashMap<String, Arc<WordCorpus>>>,
}

impl<S: WordSource> CorpusLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the corpus for `language`, substituting English when that
    /// language cannot be loaded. Check `language` on the result to see
    /// whether a substitution happened. Only an English failure is an error.
    pub fn load(&self, language: &str) -> Result<Arc<WordCorpus>, CorpusError> {
        let language = language.trim().to_lowercase();
        if let Some(corpus) = self.cache.read().get(&language) {
            return Ok(Arc::clone(corpus));
        }

        match self.load_uncached(&language) {
            Ok(corpus) => Ok(corpus),
            Err(err) if language != FALLBACK_LANGUAGE => {
                log::warn!("word list for {language:?} unavailable, using English: {err}");
                self.load(FALLBACK_LANGUAGE)
            }
            Err(err) => Err(err),
        }
    }

    pub fn is_cached(&self, language: &str) -> bool {
        self.cache.read().contains_key(language)
    }

    fn load_uncached(&self, language: &str) -> Result<Arc<WordCorpus>, CorpusError> {
        let raw = self.source.load(language)?;
        let corpus = WordCorpus::from_raw(language, raw);
        if corpus.is_empty() {
            return Err(CorpusError::Empty(language.to_string()));
        }
        log::info!("loaded {} words for {language:?}", corpus.len());

        let corpus = Arc::new(corpus);
        // Concurrent first loads may both get here; last write wins.
        self.cache
            .write()
            .insert(language.to_string(), Arc::clone(&corpus));
        Ok(corpus)
    }
}
