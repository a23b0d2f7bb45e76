use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use keyadapt::app::{LessonOptions, Trainer};
use keyadapt::config::Config;
use keyadapt::engine::filter::{KeyFilter, WordQuery, new_key_quota, valid_words, words_for_new_keys};
use keyadapt::engine::scoring::{min_accuracy, min_wpm};
use keyadapt::generator::corpus::{WordCorpus, WordEntry};
use keyadapt::generator::source::StaticWords;
use keyadapt::keyboard::detect::LayoutDetector;
use keyadapt::keyboard::layout::{LayoutDescriptor, LayoutFamily};
use keyadapt::keyboard::registry::LayoutRegistry;

fn builtin(id: &str) -> LayoutDescriptor {
    LayoutRegistry::builtin().get(id).unwrap().clone()
}

fn corpus(words: &[(&str, u8)]) -> WordCorpus {
    WordCorpus::new(
        "en",
        words
            .iter()
            .map(|&(w, f)| WordEntry::new(w, f, None))
            .collect(),
    )
}

fn home_row_keys() -> KeyFilter {
    KeyFilter::new(['a', 's', 'd', 'f', 'j', 'k', 'l', ' '])
}

#[test]
fn single_layout_registry_confirms_exact_signature() {
    let registry = LayoutRegistry::new(vec![builtin("qwerty-us")]);
    let result = LayoutDetector::with_defaults(&registry).detect("asdfghjkl;");
    assert_eq!(result.layout.as_deref(), Some("qwerty-us"));
    assert!(!result.needs_disambiguation);
}

#[test]
fn shared_signature_asks_for_disambiguation() {
    let registry = LayoutRegistry::new(vec![builtin("qwertz-de"), builtin("qwertz-ch")]);
    let result = LayoutDetector::with_defaults(&registry).detect("asdfghjklö");
    assert_eq!(result.layout, None);
    assert!(result.needs_disambiguation);
    assert_eq!(result.candidates, vec!["qwertz-de", "qwertz-ch"]);
    assert_eq!(result.family, Some(LayoutFamily::Qwertz));
}

#[test]
fn qwertz_swaps_y_and_z() {
    let trainer = Trainer::with_source(Config::default(), StaticWords::new());
    assert_eq!(trainer.transform_text("yellow", "qwertz-de").unwrap(), "zellow");
    assert_eq!(trainer.transform_text("hello", "qwertz-de").unwrap(), "hello");
}

#[test]
fn home_row_filter_excludes_unavailable_letters() {
    let corpus = corpus(&[("dad", 9), ("flask", 6), ("hello", 10)]);
    let mut rng = SmallRng::seed_from_u64(0);
    let result = valid_words(&corpus, &home_row_keys(), &WordQuery::lengths(2, usize::MAX), &mut rng);
    let words: Vec<&str> = result.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["dad", "flask"]);
}

#[test]
fn first_stage_lesson_is_complete_without_matching_words() {
    // Nothing here is typeable with the first two keys of any family
    let words = StaticWords::new().with_words("en", &[("hello", 10), ("world", 9), ("salad", 5)]);
    let trainer = Trainer::with_source(Config::default(), words);
    for &family in LayoutFamily::all() {
        let options = LessonOptions::new(family, "en").with_seed(17);
        let lesson = trainer.generate_lesson(1, &options).unwrap();
        assert!(lesson.exercises.len() >= 6, "{family:?}");
        assert_eq!(lesson.quiz_words.len(), 8, "{family:?}");
    }
}

#[test]
fn transform_to_reference_is_identity() {
    let trainer = Trainer::with_source(Config::default(), StaticWords::new());
    let text = "The quick brown fox; jumps over 13 lazy dogs! äöü ß";
    assert_eq!(trainer.transform_text(text, "qwerty-us").unwrap(), text);
}

#[test]
fn every_signature_detects_its_layouts() {
    let registry = LayoutRegistry::builtin();
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for layout in registry.all() {
        groups
            .entry(layout.home_row_signature())
            .or_default()
            .push(layout.id);
    }

    let detector = LayoutDetector::with_defaults(registry);
    for (signature, ids) in groups {
        let result = detector.detect(&signature);
        if ids.len() == 1 {
            assert_eq!(result.layout.as_deref(), Some(ids[0]), "{signature}");
            assert!(!result.needs_disambiguation);
        } else {
            assert_eq!(result.layout, None, "{signature}");
            assert!(result.needs_disambiguation);
            assert_eq!(result.candidates, ids, "{signature}");
        }
    }
}

#[test]
fn detection_is_idempotent() {
    let detector = LayoutDetector::with_defaults(LayoutRegistry::builtin());
    for buffer in ["", "asd", "asdfghjklö", "arstdhneio", "qsdfghjkxx"] {
        assert_eq!(detector.detect(buffer), detector.detect(buffer));
    }
}

#[test]
fn filtered_words_only_use_available_keys() {
    let corpus = corpus(&[
        ("dad", 9),
        ("jail", 8),
        ("flask", 6),
        ("skald", 4),
        ("hello", 10),
        ("add", 3),
    ]);
    let filter = home_row_keys();
    let mut rng = SmallRng::seed_from_u64(4);
    let query = WordQuery::default().with_shuffle(true);
    for entry in valid_words(&corpus, &filter, &query, &mut rng) {
        assert!(entry.letters.iter().all(|&c| filter.is_allowed(c)), "{}", entry.word);
    }
}

#[test]
fn new_key_words_lead_the_selection() {
    let corpus = corpus(&[
        ("dad", 10),
        ("sad", 10),
        ("add", 9),
        ("lad", 9),
        ("ask", 5),
        ("jak", 4),
        ("flask", 3),
        ("skald", 2),
        ("kalas", 1),
    ]);
    let mut rng = SmallRng::seed_from_u64(9);
    let query = WordQuery::default().with_limit(6).with_shuffle(true);
    let result = words_for_new_keys(&corpus, &home_row_keys(), &['k'], &query, &mut rng);
    assert_eq!(result.len(), 6);
    for entry in &result[..new_key_quota(6)] {
        assert!(entry.letters.contains(&'k'), "{}", entry.word);
    }
}

#[test]
fn thresholds_rise_and_cap() {
    for stage in 1..100 {
        assert!(min_wpm(stage + 1) >= min_wpm(stage));
        assert!(min_accuracy(stage + 1) >= min_accuracy(stage));
    }
    assert_eq!(min_wpm(1000), 40);
    assert_eq!(min_accuracy(1000), 95);
}

#[test]
fn bundled_words_generate_every_family() {
    let trainer = Trainer::from_config(Config::default());
    for &family in LayoutFamily::all() {
        let options = LessonOptions::new(family, "en").with_seed(1);
        let lessons = trainer.generate_all_lessons(&options).unwrap();
        assert_eq!(lessons.len(), 15);
        for lesson in lessons.iter() {
            assert!(lesson.exercises.len() >= 6);
            assert_eq!(lesson.quiz_words.len(), 8);
        }
    }
}
