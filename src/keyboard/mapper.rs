use std::collections::HashMap;

use crate::keyboard::layout::LayoutDescriptor;

/// Reference-to-target character table for one target layout.
///
/// Only characters that actually move get an entry. Uppercase entries exist
/// only for keys whose reference character has a distinct uppercase form, so
/// shifted punctuation is never guessed at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterMapping {
    table: HashMap<char, char>,
}

impl CharacterMapping {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn build(reference: &LayoutDescriptor, target: &LayoutDescriptor) -> Self {
        let mut table = HashMap::new();
        let ref_rows: Vec<Vec<char>> = (0..reference.rows.len()).map(|r| reference.row(r)).collect();
        let target_rows: Vec<Vec<char>> = (0..target.rows.len()).map(|r| target.row(r)).collect();

        for (ref_row, target_row) in ref_rows.iter().zip(target_rows.iter()) {
            for (&ref_ch, &target_ch) in ref_row.iter().zip(target_row.iter()) {
                let ref_lower = single_lower(ref_ch);
                let target_lower = single_lower(target_ch);
                if ref_lower == target_lower {
                    continue;
                }
                table.insert(ref_lower, target_lower);

                if let Some(ref_upper) = single_upper(ref_lower)
                    && ref_upper != ref_lower
                    && let Some(target_upper) = single_upper(target_lower)
                {
                    table.insert(ref_upper, target_upper);
                }
            }
        }

        Self { table }
    }

    pub fn get(&self, ch: char) -> Option<char> {
        self.table.get(&ch).copied()
    }

    pub fn map_char(&self, ch: char) -> char {
        self.get(ch).unwrap_or(ch)
    }

    pub fn apply(&self, text: &str) -> String {
        text.chars().map(|ch| self.map_char(ch)).collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn single_lower(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => ch,
    }
}

fn single_upper(ch: char) -> Option<char> {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => Some(u),
        _ => None,
    }
}

/// Rewrites content authored on the reference layout for other layouts.
#[derive(Clone, Copy, Debug)]
pub struct CharacterMapper<'a> {
    reference: &'a LayoutDescriptor,
}

impl<'a> CharacterMapper<'a> {
    pub fn new(reference: &'a LayoutDescriptor) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &'a LayoutDescriptor {
        self.reference
    }

    pub fn build_mapping(&self, target: &LayoutDescriptor) -> CharacterMapping {
        if self.is_reference(target) {
            return CharacterMapping::identity();
        }
        CharacterMapping::build(self.reference, target)
    }

    pub fn transform_text(&self, text: &str, target: &LayoutDescriptor) -> String {
        if self.is_reference(target) {
            return text.to_string();
        }
        self.build_mapping(target).apply(text)
    }

    /// Maps "keys to learn" tokens; multi-character tokens map char by char.
    pub fn transform_keys<S: AsRef<str>>(&self, keys: &[S], target: &LayoutDescriptor) -> Vec<String> {
        if self.is_reference(target) {
            return keys.iter().map(|k| k.as_ref().to_string()).collect();
        }
        let mapping = self.build_mapping(target);
        keys.iter().map(|k| mapping.apply(k.as_ref())).collect()
    }

    pub fn transform_chars(&self, keys: &[char], target: &LayoutDescriptor) -> Vec<char> {
        if self.is_reference(target) {
            return keys.to_vec();
        }
        let mapping = self.build_mapping(target);
        keys.iter().map(|&k| mapping.map_char(k)).collect()
    }

    fn is_reference(&self, target: &LayoutDescriptor) -> bool {
        target.id == self.reference.id
    }
}
