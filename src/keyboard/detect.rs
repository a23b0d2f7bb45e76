use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

use crate::keyboard::layout::{LayoutDescriptor, LayoutFamily};
use crate::keyboard::registry::LayoutRegistry;

/// Detection thresholds. `min_score` is a tuning heuristic, not a bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// A lone partial match confirms once the buffer is at least this long.
    #[serde(default = "default_min_partial_len")]
    pub min_partial_len: usize,
    /// Positional scoring only runs once the buffer is at least this long.
    #[serde(default = "default_min_scored_len")]
    pub min_scored_len: usize,
    /// Matching positions a layout needs before scoring can pick it.
    #[serde(default = "default_min_score")]
    pub min_score: usize,
}

fn default_min_partial_len() -> usize {
    8
}
fn default_min_scored_len() -> usize {
    10
}
fn default_min_score() -> usize {
    8
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_partial_len: default_min_partial_len(),
            min_scored_len: default_min_scored_len(),
            min_score: default_min_score(),
        }
    }
}

/// Outcome of one detection pass.
///
/// Confirmed: `layout` set and `candidates == [layout]`.
/// Ambiguous: `layout` unset, `needs_disambiguation`, two or more candidates.
/// Unresolved: everything empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub layout: Option<String>,
    pub needs_disambiguation: bool,
    pub candidates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<LayoutFamily>,
}

impl DetectionResult {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn confirmed(layout: &LayoutDescriptor) -> Self {
        Self {
            layout: Some(layout.id.to_string()),
            needs_disambiguation: false,
            candidates: vec![layout.id.to_string()],
            family: Some(layout.family),
        }
    }

    pub fn ambiguous(candidates: &[&LayoutDescriptor]) -> Self {
        let family = shared_family(candidates);
        Self {
            layout: None,
            needs_disambiguation: true,
            candidates: candidates.iter().map(|l| l.id.to_string()).collect(),
            family,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.layout.is_some()
    }

    pub fn is_unresolved(&self) -> bool {
        self.layout.is_none() && self.candidates.is_empty()
    }
}

fn shared_family(layouts: &[&LayoutDescriptor]) -> Option<LayoutFamily> {
    let first = layouts.first()?.family;
    layouts.iter().all(|l| l.family == first).then_some(first)
}

/// Infers the user's layout from their attempt at typing the home row.
///
/// Stateless: the caller owns the buffer and calls `detect` again after every
/// edit, backspaces included.
pub struct LayoutDetector<'a> {
    registry: &'a LayoutRegistry,
    config: DetectionConfig,
}

impl<'a> LayoutDetector<'a> {
    pub fn new(registry: &'a LayoutRegistry, config: DetectionConfig) -> Self {
        Self { registry, config }
    }

    pub fn with_defaults(registry: &'a LayoutRegistry) -> Self {
        Self::new(registry, DetectionConfig::default())
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn detect(&self, buffer: &str) -> DetectionResult {
        let typed = normalize_buffer(buffer);
        if typed.is_empty() {
            return DetectionResult::unresolved();
        }

        let exact: Vec<&LayoutDescriptor> = self
            .registry
            .signatures()
            .filter(|(_, sig)| sig.chars().eq(typed.iter().copied()))
            .map(|(layout, _)| layout)
            .collect();
        match exact.len() {
            0 => {}
            1 => {
                log::debug!("exact home-row match: {}", exact[0].id);
                return DetectionResult::confirmed(exact[0]);
            }
            _ => {
                log::debug!("home-row signature shared by {} layouts", exact.len());
                return DetectionResult::ambiguous(&exact);
            }
        }

        let partial: Vec<&LayoutDescriptor> = self
            .registry
            .signatures()
            .filter(|(_, sig)| is_prefix_either_way(sig, &typed))
            .map(|(layout, _)| layout)
            .collect();
        if partial.len() == 1 && typed.len() >= self.config.min_partial_len {
            log::debug!("single partial match: {}", partial[0].id);
            return DetectionResult::confirmed(partial[0]);
        }

        if typed.len() < self.config.min_scored_len {
            return DetectionResult::unresolved();
        }
        self.detect_by_score(&typed)
    }

    fn detect_by_score(&self, typed: &[char]) -> DetectionResult {
        let scored: Vec<(&LayoutDescriptor, usize)> = self
            .registry
            .signatures()
            .map(|(layout, sig)| (layout, positional_score(typed, sig)))
            .collect();

        let best = scored.iter().map(|&(_, s)| s).max().unwrap_or(0);
        if best < self.config.min_score {
            log::debug!("best positional score {best} below threshold");
            return DetectionResult::unresolved();
        }

        let top: Vec<&LayoutDescriptor> = scored
            .iter()
            .filter(|&&(_, s)| s == best)
            .map(|&(layout, _)| layout)
            .collect();
        if top.len() == 1 {
            DetectionResult::confirmed(top[0])
        } else {
            DetectionResult::ambiguous(&top)
        }
    }
}

/// NFC, trimmed and lowercased, so "o\u{308}" and "ö" type the same key.
fn normalize_buffer(buffer: &str) -> Vec<char> {
    let nfc = ComposingNormalizerBorrowed::new_nfc().normalize(buffer);
    nfc.trim().chars().flat_map(char::to_lowercase).collect()
}

fn is_prefix_either_way(signature: &str, typed: &[char]) -> bool {
    let sig: Vec<char> = signature.chars().collect();
    sig.starts_with(typed) || typed.starts_with(&sig)
}

fn positional_score(typed: &[char], signature: &str) -> usize {
    typed
        .iter()
        .zip(signature.chars())
        .filter(|&(&a, b)| a == b)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::layout::{LayoutFamily, Region};

    fn descriptor(
        id: &'static str,
        family: LayoutFamily,
        rows: &'static [&'static str],
    ) -> LayoutDescriptor {
        LayoutDescriptor {
            id,
            name: id,
            family,
            region: Region::WesternEurope,
            rows,
        }
    }

    fn small_registry() -> LayoutRegistry {
        LayoutRegistry::new(vec![
            descriptor("qwerty-us", LayoutFamily::Qwerty, &["qwertyuiop", "asdfghjkl;", "zxcvbnm,./"]),
            descriptor("qwertz-de", LayoutFamily::Qwertz, &["qwertzuiop", "asdfghjklö", "yxcvbnm,.-"]),
            descriptor("qwertz-ch", LayoutFamily::Qwertz, &["qwertzuiop", "asdfghjklö", "yxcvbnm,.-"]),
            descriptor("azerty-fr", LayoutFamily::Azerty, &["azertyuiop", "qsdfghjklm", "wxcvbn,;:!"]),
        ])
    }

    #[test]
    fn test_exact_unique_signature_confirms() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        let result = detector.detect("asdfghjkl;");
        assert_eq!(result.layout.as_deref(), Some("qwerty-us"));
        assert!(!result.needs_disambiguation);
        assert_eq!(result.candidates, vec!["qwerty-us"]);
    }

    #[test]
    fn test_shared_signature_needs_disambiguation() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        let result = detector.detect("asdfghjklö");
        assert_eq!(result.layout, None);
        assert!(result.needs_disambiguation);
        assert_eq!(result.candidates, vec!["qwertz-de", "qwertz-ch"]);
        assert_eq!(result.family, Some(LayoutFamily::Qwertz));
    }

    #[test]
    fn test_short_buffer_is_unresolved() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        assert!(detector.detect("").is_unresolved());
        assert!(detector.detect("   ").is_unresolved());
        assert!(detector.detect("asdf").is_unresolved());
    }

    #[test]
    fn test_single_partial_match_confirms_at_eight() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        // Only azerty starts with 'q'
        assert!(detector.detect("qsdfghj").is_unresolved());
        let result = detector.detect("qsdfghjk");
        assert_eq!(result.layout.as_deref(), Some("azerty-fr"));
    }

    #[test]
    fn test_scored_fallback_tolerates_typos() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        // One typo in the middle: 9 of 10 positions match
        let result = detector.detect("qsdfgxjklm");
        assert_eq!(result.layout.as_deref(), Some("azerty-fr"));
    }

    #[test]
    fn test_scored_tie_is_ambiguous_across_families() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        // Matches positions 0..9 of us, de and ch equally
        let result = detector.detect("asdfghjklx");
        assert!(result.needs_disambiguation);
        assert_eq!(result.candidates.len(), 3);
        assert_eq!(result.family, None);
    }

    #[test]
    fn test_scored_tie_within_family_keeps_family() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        // Typo at position 7: de and ch score 9, us only 8
        let result = detector.detect("asdfghjxlö");
        assert_eq!(result.layout, None);
        assert!(result.needs_disambiguation);
        assert_eq!(result.candidates, vec!["qwertz-de", "qwertz-ch"]);
        assert_eq!(result.family, Some(LayoutFamily::Qwertz));
    }

    #[test]
    fn test_scored_below_threshold_is_unresolved() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        assert!(detector.detect("zzzzzzzzzz").is_unresolved());
    }

    #[test]
    fn test_case_whitespace_and_decomposed_input() {
        let registry = small_registry();
        let detector = LayoutDetector::with_defaults(&registry);
        let composed = detector.detect("  ASDFGHJKLÖ ");
        let decomposed = detector.detect("asdfghjklo\u{308}");
        assert_eq!(composed, decomposed);
        assert!(composed.needs_disambiguation);
    }

    #[test]
    fn test_threshold_is_tunable() {
        let registry = small_registry();
        let strict = DetectionConfig {
            min_score: 10,
            ..DetectionConfig::default()
        };
        let detector = LayoutDetector::new(&registry, strict);
        assert!(detector.detect("qsdfgxjklm").is_unresolved());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let registry = LayoutRegistry::builtin();
        let detector = LayoutDetector::with_defaults(registry);
        for buffer in ["aoeuidhtns", "asdfghjk", "arstdhneio", "qsdfghjklm"] {
            assert_eq!(detector.detect(buffer), detector.detect(buffer));
        }
    }
}
