use std::sync::LazyLock;

use thiserror::Error;

use crate::keyboard::layout::{ALL_LAYOUTS, LayoutDescriptor, LayoutFamily, Region};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown keyboard layout: {0}")]
    UnknownLayout(String),
}

static BUILTIN: LazyLock<LayoutRegistry> =
    LazyLock::new(|| LayoutRegistry::new(ALL_LAYOUTS.to_vec()));

/// Read-only layout catalog with home-row signatures computed up front.
#[derive(Clone, Debug)]
pub struct LayoutRegistry {
    layouts: Vec<LayoutDescriptor>,
    signatures: Vec<String>,
}

impl LayoutRegistry {
    pub fn new(layouts: Vec<LayoutDescriptor>) -> Self {
        let signatures = layouts.iter().map(|l| l.home_row_signature()).collect();
        Self {
            layouts,
            signatures,
        }
    }

    pub fn builtin() -> &'static LayoutRegistry {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&LayoutDescriptor> {
        self.layouts.iter().find(|l| l.id == id)
    }

    /// Like `get`, for callers that treat a missing id as an error.
    pub fn require(&self, id: &str) -> Result<&LayoutDescriptor, LayoutError> {
        self.get(id)
            .ok_or_else(|| LayoutError::UnknownLayout(id.to_string()))
    }

    pub fn all(&self) -> &[LayoutDescriptor] {
        &self.layouts
    }

    pub fn by_region(&self, region: Region) -> Vec<&LayoutDescriptor> {
        self.layouts.iter().filter(|l| l.region == region).collect()
    }

    pub fn by_family(&self, family: LayoutFamily) -> Vec<&LayoutDescriptor> {
        self.layouts.iter().filter(|l| l.family == family).collect()
    }

    /// Layouts paired with their precomputed signatures, in catalog order.
    pub fn signatures(&self) -> impl Iterator<Item = (&LayoutDescriptor, &str)> {
        self.layouts
            .iter()
            .zip(self.signatures.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
