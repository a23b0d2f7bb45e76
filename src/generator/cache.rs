use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::engine::lesson::GeneratedLesson;
use crate::generator::blend::MixOptions;
use crate::keyboard::layout::LayoutFamily;

/// Identifies one generated lesson set. Structured rather than a joined
/// string so distinct option combinations can never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LessonCacheKey {
    pub family: LayoutFamily,
    pub language: String,
    pub mix: Option<MixOptions>,
}

impl LessonCacheKey {
    pub fn new(family: LayoutFamily, language: &str, mix: Option<MixOptions>) -> Self {
        Self {
            family,
            language: language.trim().to_lowercase(),
            mix,
        }
    }
}

/// Write-once, read-many store of generated lesson sets. A miss is resolved by
/// the caller recomputing; concurrent identical inserts are last-write-wins.
#[derive(Default)]
pub struct LessonCache {
    entries: RwLock<HashMap<LessonCacheKey, Arc<Vec<GeneratedLesson>>>>,
}

impl LessonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &LessonCacheKey) -> Option<Arc<Vec<GeneratedLesson>>> {
        self.entries.read().get(key).cloned()
    }

    /// Replaces any existing entry wholesale.
    pub fn put(&self, key: LessonCacheKey, lessons: Vec<GeneratedLesson>) -> Arc<Vec<GeneratedLesson>> {
        let lessons = Arc::new(lessons);
        self.entries.write().insert(key, Arc::clone(&lessons));
        lessons
    }

    pub fn invalidate(&self, key: &LessonCacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: u32) -> GeneratedLesson {
        GeneratedLesson {
            id,
            name: format!("Stage {id}"),
            keys: vec!['f', 'j'],
            cumulative_keys: vec!['f', 'j'],
            exercises: vec!["fff jjj".to_string(); 6],
            quiz_words: vec!["fj".to_string(); 8],
            min_wpm: 10,
            min_accuracy: 80,
        }
    }

    #[test]
    fn test_mix_options_are_part_of_the_key() {
        let cache = LessonCache::new();
        let plain = LessonCacheKey::new(LayoutFamily::Qwerty, "en", None);
        let mixed = LessonCacheKey::new(LayoutFamily::Qwerty, "en", Some(MixOptions::new("de", 20)));
        cache.put(plain.clone(), vec![lesson(1)]);

        assert!(cache.get(&plain).is_some());
        assert!(cache.get(&mixed).is_none());
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let cache = LessonCache::new();
        let key = LessonCacheKey::new(LayoutFamily::Dvorak, "EN ", None);
        cache.put(key.clone(), vec![lesson(1), lesson(2)]);
        cache.put(key.clone(), vec![lesson(1)]);
        assert_eq!(cache.get(&key).unwrap().len(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(key.language, "en");
    }

    #[test]
    fn test_invalidate() {
        let cache = LessonCache::new();
        let key = LessonCacheKey::new(LayoutFamily::Azerty, "fr", None);
        cache.put(key.clone(), vec![lesson(1)]);
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        assert!(cache.is_empty());
    }
}
