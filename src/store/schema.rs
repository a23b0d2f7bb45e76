use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreferencesData {
    pub schema_version: u32,
    /// Last layout the user confirmed, if any.
    pub layout_id: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for PreferencesData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            layout_id: None,
            saved_at: None,
        }
    }
}

impl PreferencesData {
    pub fn with_layout(layout_id: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            layout_id: Some(layout_id.to_string()),
            saved_at: Some(Utc::now()),
        }
    }

    /// Data written by a different schema is ignored rather than migrated.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
