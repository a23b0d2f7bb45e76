use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::generator::corpus::{WordCorpus, WordEntry};

/// Highest share a secondary language may take of a blended corpus.
pub const MAX_MIX_PERCENT: u8 = 90;

/// Secondary-language blend settings. The ratio is a whole percentage so the
/// options can be part of a hashable cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MixOptions {
    pub language: String,
    pub ratio_percent: u8,
}

impl MixOptions {
    pub fn new(language: &str, ratio_percent: u8) -> Self {
        Self {
            language: language.trim().to_lowercase(),
            ratio_percent: ratio_percent.min(MAX_MIX_PERCENT),
        }
    }
}

/// Interleaves secondary words into the primary corpus so that they make up
/// roughly `ratio_percent` of the result. Secondary words are taken in
/// descending frequency; spellings already present in the primary are skipped.
/// Meaning is not compared.
pub fn blend(
    primary: &WordCorpus,
    secondary: &WordCorpus,
    ratio_percent: u8,
    rng: &mut SmallRng,
) -> WordCorpus {
    let ratio = f64::from(ratio_percent.min(MAX_MIX_PERCENT)) / 100.0;
    let label = format!("{}+{}", primary.language, secondary.language);
    if ratio <= 0.0 || secondary.language == primary.language {
        return WordCorpus::new(&label, primary.words.clone());
    }

    let mut extra: Vec<&WordEntry> = secondary
        .words
        .iter()
        .filter(|e| primary.get(&e.word).is_none())
        .collect();
    extra.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    let wanted = ((primary.len() as f64) * ratio / (1.0 - ratio)).round() as usize;
    extra.truncate(wanted.max(1));

    let mut merged = Vec::with_capacity(primary.len() + extra.len());
    let mut primary_iter = primary.words.iter().peekable();
    let mut extra_iter = extra.into_iter().peekable();
    loop {
        let take_extra = match (primary_iter.peek(), extra_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(_), Some(_)) => rng.gen_bool(ratio),
        };
        let next = if take_extra {
            extra_iter.next()
        } else {
            primary_iter.next()
        };
        if let Some(entry) = next {
            merged.push(entry.clone());
        }
    }

    WordCorpus::new(&label, merged)
}
