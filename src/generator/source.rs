use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use rust_embed::Embed;
use serde::Deserialize;

use crate::generator::corpus::{CorpusError, RawWord};

#[derive(Embed)]
#[folder = "assets/words/"]
struct WordAssets;

/// Where word lists come from. Implementations only fetch and parse; caching
/// and the English fallback live in `CorpusLoader`.
pub trait WordSource: Send + Sync {
    fn load(&self, language: &str) -> Result<Vec<RawWord>, CorpusError>;
}

impl<T: WordSource + ?Sized> WordSource for Box<T> {
    fn load(&self, language: &str) -> Result<Vec<RawWord>, CorpusError> {
        (**self).load(language)
    }
}

#[derive(Deserialize)]
struct WordListFile {
    words: Vec<RawWord>,
}

/// Parses `{"words": [...]}`; a bare top-level array is accepted too.
pub fn parse_word_list(language: &str, content: &str) -> Result<Vec<RawWord>, CorpusError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Wrapped(WordListFile),
        Bare(Vec<RawWord>),
    }

    match serde_json::from_str::<Shape>(content) {
        Ok(Shape::Wrapped(file)) => Ok(file.words),
        Ok(Shape::Bare(words)) => Ok(words),
        // Re-parse strictly so the error names the real problem
        Err(_) => serde_json::from_str::<WordListFile>(content)
            .map(|f| f.words)
            .map_err(|source| CorpusError::Parse {
                language: language.to_string(),
                source,
            }),
    }
}

/// Word lists compiled into the binary, optionally shadowed by files in a
/// user directory (`<dir>/<language>.json`).
#[derive(Clone, Debug, Default)]
pub struct BundledWords {
    override_dir: Option<PathBuf>,
}

impl BundledWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Languages with a bundled list, sorted.
    pub fn languages() -> Vec<String> {
        let mut langs: Vec<String> = WordAssets::iter()
            .filter_map(|name| name.strip_suffix(".json").map(str::to_string))
            .collect();
        langs.sort();
        langs
    }

    fn load_override(&self, language: &str) -> Result<Option<String>, CorpusError> {
        let Some(dir) = &self.override_dir else {
            return Ok(None);
        };
        let path = dir.join(format!("{language}.json"));
        match fs::read_to_string(&path) {
            Ok(content) => {
                log::debug!("using word list override {}", path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CorpusError::Io {
                language: language.to_string(),
                source,
            }),
        }
    }
}

impl WordSource for BundledWords {
    fn load(&self, language: &str) -> Result<Vec<RawWord>, CorpusError> {
        if !is_valid_language_code(language) {
            return Err(CorpusError::Missing(language.to_string()));
        }

        if let Some(content) = self.load_override(language)? {
            return parse_word_list(language, &content);
        }

        let file = WordAssets::get(&format!("{language}.json"))
            .ok_or_else(|| CorpusError::Missing(language.to_string()))?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        parse_word_list(language, &content)
    }
}

/// Language codes end up in file names.
fn is_valid_language_code(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// In-memory word lists, for tests and callers that ship their own data.
#[derive(Clone, Debug, Default)]
pub struct StaticWords {
    lists: HashMap<String, Vec<RawWord>>,
}

impl StaticWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(mut self, language: &str, words: &[(&str, u32)]) -> Self {
        let raw = words
            .iter()
            .map(|&(word, frequency)| RawWord::new(word, frequency))
            .collect();
        self.lists.insert(language.to_string(), raw);
        self
    }

    pub fn with_raw(mut self, language: &str, raw: Vec<RawWord>) -> Self {
        self.lists.insert(language.to_string(), raw);
        self
    }
}

impl WordSource for StaticWords {
    fn load(&self, language: &str) -> Result<Vec<RawWord>, CorpusError> {
        self.lists
            .get(language)
            .cloned()
            .ok_or_else(|| CorpusError::Missing(language.to_string()))
    }
}
