use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::curriculum::{Curriculum, KeyStage};
use crate::engine::filter::{KeyFilter, WordQuery, words_for_new_keys};
use crate::engine::scoring::{min_accuracy, min_wpm};
use crate::generator::corpus::{CorpusError, WordCorpus};
use crate::keyboard::layout::LayoutFamily;
use crate::keyboard::registry::LayoutError;

pub const QUIZ_SIZE: usize = 8;
pub const MIN_EXERCISES: usize = 6;

/// Stages up to this id also get single-key and key-pair drills.
const EARLY_STAGE_MAX: u32 = 3;
const MIN_WORD_LEN: usize = 2;
const SHORT_MAX: usize = 3;
const MEDIUM_MAX: usize = 5;
const DRILL_REPEATS: usize = 4;
const PSEUDO_WORDS_PER_DRILL: usize = 6;

#[derive(Debug, Error)]
pub enum LessonError {
    #[error("{family:?} curriculum has no stage {stage} (stages 1..={stages})")]
    UnknownStage {
        family: LayoutFamily,
        stage: u32,
        stages: usize,
    },
    #[error("no curriculum for {0:?}")]
    MissingCurriculum(LayoutFamily),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedLesson {
    pub id: u32,
    pub name: String,
    /// Keys introduced by this stage.
    pub keys: Vec<char>,
    pub cumulative_keys: Vec<char>,
    pub exercises: Vec<String>,
    pub quiz_words: Vec<String>,
    pub min_wpm: u32,
    pub min_accuracy: u32,
}

impl GeneratedLesson {
    /// Interleaves static drills with the generated exercises, drills first.
    pub fn with_drills(mut self, drills: Vec<String>) -> Self {
        if drills.is_empty() {
            return self;
        }
        let generated = std::mem::take(&mut self.exercises);
        let mut drills = drills.into_iter();
        let mut generated = generated.into_iter();
        loop {
            let drill = drills.next();
            let exercise = generated.next();
            if drill.is_none() && exercise.is_none() {
                break;
            }
            self.exercises.extend(drill);
            self.exercises.extend(exercise);
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonConfig {
    #[serde(default = "default_words_per_exercise")]
    pub words_per_exercise: usize,
    #[serde(default = "default_mixed_words")]
    pub mixed_words: usize,
    #[serde(default = "default_shuffle_words")]
    pub shuffle_words: bool,
}

fn default_words_per_exercise() -> usize {
    10
}
fn default_mixed_words() -> usize {
    12
}
fn default_shuffle_words() -> bool {
    true
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            words_per_exercise: default_words_per_exercise(),
            mixed_words: default_mixed_words(),
            shuffle_words: default_shuffle_words(),
        }
    }
}

/// Builds lessons for one layout family from its curriculum and a corpus.
pub struct LessonAssembler<'a> {
    curriculum: &'a Curriculum,
    config: LessonConfig,
}

impl<'a> LessonAssembler<'a> {
    pub fn new(curriculum: &'a Curriculum, config: LessonConfig) -> Self {
        Self { curriculum, config }
    }

    pub fn curriculum(&self) -> &'a Curriculum {
        self.curriculum
    }

    pub fn stage(&self, stage_id: u32) -> Result<&'a KeyStage, LessonError> {
        self.curriculum
            .stage(stage_id)
            .ok_or(LessonError::UnknownStage {
                family: self.curriculum.family,
                stage: stage_id,
                stages: self.curriculum.len(),
            })
    }

    pub fn generate_lesson(
        &self,
        stage_id: u32,
        corpus: &WordCorpus,
        rng: &mut SmallRng,
    ) -> Result<GeneratedLesson, LessonError> {
        let stage = self.stage(stage_id)?;
        Ok(self.build(stage, Some(corpus), rng))
    }

    /// Drills and pseudo-word quiz only; usable before any corpus is loaded.
    pub fn generate_keys_only(
        &self,
        stage_id: u32,
        rng: &mut SmallRng,
    ) -> Result<GeneratedLesson, LessonError> {
        let stage = self.stage(stage_id)?;
        Ok(self.build(stage, None, rng))
    }

    pub fn generate_all(&self, corpus: &WordCorpus, rng: &mut SmallRng) -> Vec<GeneratedLesson> {
        self.curriculum
            .stages
            .iter()
            .map(|stage| self.build(stage, Some(corpus), rng))
            .collect()
    }

    fn build(&self, stage: &KeyStage, corpus: Option<&WordCorpus>, rng: &mut SmallRng) -> GeneratedLesson {
        let pool = PseudoWords::new(stage);
        let mut exercises = Vec::new();

        if stage.id <= EARLY_STAGE_MAX {
            exercises.extend(key_drills(&stage.new_keys));
        }

        let words = corpus
            .map(|c| self.pick_words(stage, c, self.pool_size(), rng))
            .unwrap_or_default();
        let word_exercises = self.word_exercises(&words, rng);
        if word_exercises.is_empty() {
            exercises.push(pool.drill(0));
        } else {
            exercises.extend(word_exercises);
        }

        let mut offset = 1;
        while exercises.len() < MIN_EXERCISES {
            exercises.push(pool.drill(offset));
            offset += 1;
        }

        let quiz_candidates = corpus
            .map(|c| self.pick_words(stage, c, QUIZ_SIZE, rng))
            .unwrap_or_default();
        let quiz_words = fill_quiz(quiz_candidates, &pool);

        log::debug!(
            "stage {} ({}): {} exercises, {} quiz words from corpus",
            stage.id,
            stage.name,
            exercises.len(),
            quiz_words.iter().filter(|&w| words.contains(w)).count()
        );

        GeneratedLesson {
            id: stage.id,
            name: stage.name.clone(),
            keys: stage.new_keys.clone(),
            cumulative_keys: stage.cumulative_keys.clone(),
            exercises,
            quiz_words,
            min_wpm: min_wpm(stage.id),
            min_accuracy: min_accuracy(stage.id),
        }
    }

    fn pool_size(&self) -> usize {
        self.config.words_per_exercise * 3 + self.config.mixed_words
    }

    fn pick_words(&self, stage: &KeyStage, corpus: &WordCorpus, limit: usize, rng: &mut SmallRng) -> Vec<String> {
        let filter = KeyFilter::new(stage.cumulative_keys.iter().copied());
        let query = WordQuery::lengths(MIN_WORD_LEN, usize::MAX)
            .with_limit(limit)
            .with_shuffle(self.config.shuffle_words);
        words_for_new_keys(corpus, &filter, &stage.new_keys, &query, rng)
            .into_iter()
            .map(|e| e.word.clone())
            .collect()
    }

    /// Short, medium and long tiers (each only if populated) plus one mixed list.
    fn word_exercises(&self, words: &[String], rng: &mut SmallRng) -> Vec<String> {
        if words.is_empty() {
            return Vec::new();
        }
        let per = self.config.words_per_exercise;
        let tier = |lo: usize, hi: usize| {
            words
                .iter()
                .filter(|w| (lo..=hi).contains(&w.chars().count()))
                .map(String::as_str)
                .collect::<Vec<&str>>()
        };

        let mut exercises: Vec<String> = [
            tier(MIN_WORD_LEN, SHORT_MAX),
            tier(SHORT_MAX + 1, MEDIUM_MAX),
            tier(MEDIUM_MAX + 1, usize::MAX),
        ]
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(|t| cycle_join(&t, per))
        .collect();

        let mut mixed: Vec<&str> = words.iter().map(String::as_str).collect();
        mixed.shuffle(rng);
        exercises.push(cycle_join(&mixed, self.config.mixed_words));
        exercises
    }
}

/// Repetition drill per new key, then alternating pairs of new keys.
fn key_drills(new_keys: &[char]) -> Vec<String> {
    let mut drills: Vec<String> = new_keys
        .iter()
        .map(|&k| vec![k.to_string().repeat(3); DRILL_REPEATS].join(" "))
        .collect();
    for (i, &a) in new_keys.iter().enumerate() {
        for &b in &new_keys[i + 1..] {
            let pair = format!("{a}{b}");
            let reversed = format!("{b}{a}");
            let groups: Vec<String> = (0..DRILL_REPEATS)
                .flat_map(|_| [pair.clone(), reversed.clone()])
                .collect();
            drills.push(groups.join(" "));
        }
    }
    drills
}

fn cycle_join(words: &[&str], count: usize) -> String {
    words
        .iter()
        .cycle()
        .take(count.max(1))
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fill_quiz(mut quiz: Vec<String>, pool: &PseudoWords) -> Vec<String> {
    quiz.truncate(QUIZ_SIZE);
    let mut seed = 0;
    // Uniqueness is best effort; one or two keys only spell a handful of words.
    while quiz.len() < QUIZ_SIZE && seed < QUIZ_SIZE * 8 {
        let word = pool.word(seed);
        if !quiz.contains(&word) {
            quiz.push(word);
        }
        seed += 1;
    }
    while quiz.len() < QUIZ_SIZE {
        quiz.push(pool.word(seed));
        seed += 1;
    }
    quiz
}

/// Key-concatenation fallback words. Structurally valid, not real words.
struct PseudoWords {
    keys: Vec<char>,
}

impl PseudoWords {
    fn new(stage: &KeyStage) -> Self {
        let mut keys: Vec<char> = stage.new_keys.clone();
        for &k in &stage.cumulative_keys {
            if !keys.contains(&k) {
                keys.push(k);
            }
        }
        let letters: Vec<char> = keys.iter().copied().filter(|c| c.is_alphabetic()).collect();
        if !letters.is_empty() {
            keys = letters;
        }
        if keys.is_empty() {
            keys.push(' ');
        }
        Self { keys }
    }

    fn word(&self, seed: usize) -> String {
        let n = self.keys.len();
        let len = 3 + seed % 3;
        let stride = seed % 2 + 1;
        (0..len)
            .map(|k| self.keys[(seed * 3 + k * stride) % n])
            .collect()
    }

    fn drill(&self, offset: usize) -> String {
        (0..PSEUDO_WORDS_PER_DRILL)
            .map(|i| self.word(offset * PSEUDO_WORDS_PER_DRILL + i))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
