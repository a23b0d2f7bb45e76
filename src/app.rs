use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::engine::curriculum::{Curriculum, reference_drills};
use crate::engine::lesson::{GeneratedLesson, LessonAssembler, LessonError};
use crate::generator::blend::{MixOptions, blend};
use crate::generator::cache::{LessonCache, LessonCacheKey};
use crate::generator::corpus::{CorpusError, CorpusLoader, FALLBACK_LANGUAGE, WordCorpus};
use crate::generator::source::{BundledWords, WordSource};
use crate::keyboard::detect::{DetectionResult, LayoutDetector};
use crate::keyboard::layout::{LayoutDescriptor, LayoutFamily, REFERENCE_LAYOUT_ID};
use crate::keyboard::mapper::CharacterMapper;
use crate::keyboard::registry::{LayoutError, LayoutRegistry};
use crate::store::json_store::PreferenceStore;

/// What a lesson set is generated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonOptions {
    pub family: LayoutFamily,
    pub language: String,
    pub mix: Option<MixOptions>,
    /// Fixed seed for reproducible output. Seeded requests skip the lesson cache.
    pub seed: Option<u64>,
}

impl Default for LessonOptions {
    fn default() -> Self {
        Self::new(LayoutFamily::Qwerty, FALLBACK_LANGUAGE)
    }
}

impl LessonOptions {
    pub fn new(family: LayoutFamily, language: &str) -> Self {
        Self {
            family,
            language: language.trim().to_lowercase(),
            mix: None,
            seed: None,
        }
    }

    pub fn with_mix(mut self, mix: Option<MixOptions>) -> Self {
        self.mix = mix.filter(|m| m.ratio_percent > 0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn cache_key(&self) -> LessonCacheKey {
        LessonCacheKey::new(self.family, &self.language, self.mix.clone())
    }
}

/// Entry point tying detection, remapping and lesson generation together.
pub struct Trainer<S: WordSource = BundledWords> {
    registry: LayoutRegistry,
    config: Config,
    corpora: CorpusLoader<S>,
    lessons: LessonCache,
    store: Option<Box<dyn PreferenceStore>>,
    confirmed: Mutex<Option<String>>,
}

impl Trainer<BundledWords> {
    /// Trainer over the bundled word lists, honoring `config.word_dir`.
    pub fn from_config(config: Config) -> Self {
        let source = match &config.word_dir {
            Some(dir) => BundledWords::with_override_dir(dir.clone()),
            None => BundledWords::new(),
        };
        Self::with_source(config, source)
    }
}

impl<S: WordSource> Trainer<S> {
    pub fn with_source(config: Config, source: S) -> Self {
        Self {
            registry: LayoutRegistry::builtin().clone(),
            config,
            corpora: CorpusLoader::new(source),
            lessons: LessonCache::new(),
            store: None,
            confirmed: Mutex::new(None),
        }
    }

    pub fn with_registry(mut self, registry: LayoutRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_store(mut self, store: Box<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lesson_cache(&self) -> &LessonCache {
        &self.lessons
    }

    /// Lesson options for `family` in the configured language and mix.
    pub fn default_options(&self, family: LayoutFamily) -> LessonOptions {
        LessonOptions::new(family, &self.config.language).with_mix(self.config.mix_options())
    }

    // --- Layouts ---

    pub fn detect_layout(&self, buffer: &str) -> DetectionResult {
        LayoutDetector::new(&self.registry, self.config.detection).detect(buffer)
    }

    /// The layout all authored content is written for.
    pub fn reference_layout(&self) -> Result<&LayoutDescriptor, LayoutError> {
        self.registry.require(REFERENCE_LAYOUT_ID)
    }

    pub fn transform_text(&self, text: &str, layout_id: &str) -> Result<String, LayoutError> {
        let target = self.registry.require(layout_id)?;
        let mapper = CharacterMapper::new(self.reference_layout()?);
        Ok(mapper.transform_text(text, target))
    }

    pub fn transform_keys<K: AsRef<str>>(
        &self,
        keys: &[K],
        layout_id: &str,
    ) -> Result<Vec<String>, LayoutError> {
        let target = self.registry.require(layout_id)?;
        let mapper = CharacterMapper::new(self.reference_layout()?);
        Ok(mapper.transform_keys(keys, target))
    }

    /// Records the user's choice. A failing store is logged, not returned.
    pub fn confirm_layout(&self, layout_id: &str) -> Result<(), LayoutError> {
        let layout = self.registry.require(layout_id)?;
        *self.confirmed.lock() = Some(layout.id.to_string());
        if let Some(store) = &self.store
            && let Err(e) = store.save_layout(layout.id)
        {
            log::warn!("could not persist layout {}: {e:#}", layout.id);
        }
        Ok(())
    }

    /// Layout confirmed this session, else the stored one if still in the catalog.
    pub fn preferred_layout(&self) -> Option<&LayoutDescriptor> {
        let id = self
            .confirmed
            .lock()
            .clone()
            .or_else(|| self.store.as_ref().and_then(|s| s.load_layout()))?;
        let layout = self.registry.get(&id);
        if layout.is_none() {
            log::warn!("stored layout {id:?} is not in the catalog");
        }
        layout
    }

    // --- Lessons ---

    pub fn generate_lesson(
        &self,
        stage: u32,
        options: &LessonOptions,
    ) -> Result<GeneratedLesson, LessonError> {
        let assembler = self.assembler(curriculum_for(options.family)?);
        let idx = assembler.stage(stage)?.id as usize - 1;
        let key = options.cache_key();
        if options.seed.is_none()
            && let Some(lessons) = self.lessons.get(&key)
        {
            log::debug!("lesson cache hit for {key:?}");
            return pick_stage(&lessons, idx, options.family, stage);
        }

        let mut rng = seeded_rng(options.seed);
        let loaded = self.corpus_for(options, &mut rng)?;
        if options.seed.is_none() && !loaded.substituted {
            let lessons = self.lessons.put(key, assembler.generate_all(&loaded.corpus, &mut rng));
            return pick_stage(&lessons, idx, options.family, stage);
        }
        assembler.generate_lesson(stage, &loaded.corpus, &mut rng)
    }

    /// Every stage of the family, served from the lesson cache when possible.
    pub fn generate_all_lessons(
        &self,
        options: &LessonOptions,
    ) -> Result<Arc<Vec<GeneratedLesson>>, LessonError> {
        let key = options.cache_key();
        if options.seed.is_none()
            && let Some(lessons) = self.lessons.get(&key)
        {
            log::debug!("lesson cache hit for {key:?}");
            return Ok(lessons);
        }
        log::debug!("lesson cache miss for {key:?}");

        let assembler = self.assembler(curriculum_for(options.family)?);
        let mut rng = seeded_rng(options.seed);
        let loaded = self.corpus_for(options, &mut rng)?;
        let lessons = assembler.generate_all(&loaded.corpus, &mut rng);

        if options.seed.is_some() || loaded.substituted {
            return Ok(Arc::new(lessons));
        }
        Ok(self.lessons.put(key, lessons))
    }

    /// Keys-only lesson for display before the corpus is ready.
    pub fn preview_lesson(
        &self,
        stage: u32,
        options: &LessonOptions,
    ) -> Result<GeneratedLesson, LessonError> {
        let assembler = self.assembler(curriculum_for(options.family)?);
        assembler.generate_keys_only(stage, &mut seeded_rng(options.seed))
    }

    /// A lesson whose keys, words and drills are all in `layout_id`'s characters.
    ///
    /// Family representatives share the cached family lesson set. Other
    /// layouts get the reference plan projected onto their own rows.
    pub fn lesson_for_layout(
        &self,
        layout_id: &str,
        stage: u32,
        options: &LessonOptions,
    ) -> Result<GeneratedLesson, LessonError> {
        let target = self.registry.require(layout_id)?;
        let reference = self.reference_layout()?;
        let options = LessonOptions {
            family: target.family,
            ..options.clone()
        };

        let lesson = if target.id == target.family.representative() {
            self.generate_lesson(stage, &options)?
        } else {
            let curriculum = Curriculum::project(reference, target);
            let assembler = self.assembler(&curriculum);
            assembler.stage(stage)?;
            let mut rng = seeded_rng(options.seed);
            let loaded = self.corpus_for(&options, &mut rng)?;
            assembler.generate_lesson(stage, &loaded.corpus, &mut rng)?
        };

        let mapper = CharacterMapper::new(reference);
        let drills = reference_drills(stage)
            .iter()
            .map(|drill| mapper.transform_text(drill, target))
            .collect();
        Ok(lesson.with_drills(drills))
    }

    fn assembler<'c>(&self, curriculum: &'c Curriculum) -> LessonAssembler<'c> {
        LessonAssembler::new(curriculum, self.config.lesson.clone())
    }

    fn corpus_for(
        &self,
        options: &LessonOptions,
        rng: &mut SmallRng,
    ) -> Result<LoadedCorpus, CorpusError> {
        let primary = self.corpora.load(&options.language)?;
        let mut substituted = primary.language != options.language;
        let Some(mix) = &options.mix else {
            return Ok(LoadedCorpus::new(primary, substituted));
        };
        let secondary = self.corpora.load(&mix.language)?;
        substituted |= secondary.language != mix.language;
        if secondary.language == primary.language {
            return Ok(LoadedCorpus::new(primary, substituted));
        }
        let blended = blend(&primary, &secondary, mix.ratio_percent, rng);
        Ok(LoadedCorpus::new(Arc::new(blended), substituted))
    }
}

/// A corpus ready for lesson generation. `substituted` marks English standing
/// in for a requested language; such lessons are never cached.
struct LoadedCorpus {
    corpus: Arc<WordCorpus>,
    substituted: bool,
}

impl LoadedCorpus {
    fn new(corpus: Arc<WordCorpus>, substituted: bool) -> Self {
        if substituted {
            log::debug!("lessons from substitute corpus {:?} will not be cached", corpus.language);
        }
        Self { corpus, substituted }
    }
}

fn pick_stage(
    lessons: &[GeneratedLesson],
    idx: usize,
    family: LayoutFamily,
    stage: u32,
) -> Result<GeneratedLesson, LessonError> {
    lessons.get(idx).cloned().ok_or(LessonError::UnknownStage {
        family,
        stage,
        stages: lessons.len(),
    })
}

fn curriculum_for(family: LayoutFamily) -> Result<&'static Curriculum, LessonError> {
    Curriculum::for_family(family).ok_or(LessonError::MissingCurriculum(family))
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}
