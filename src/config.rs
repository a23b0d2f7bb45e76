use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::lesson::LessonConfig;
use crate::generator::blend::{MAX_MIX_PERCENT, MixOptions};
use crate::generator::corpus::FALLBACK_LANGUAGE;
use crate::keyboard::detect::DetectionConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub secondary_language: Option<String>,
    #[serde(default = "default_mix_ratio_percent")]
    pub mix_ratio_percent: u8,
    /// Directory of `{language}.json` word lists checked before the bundled ones.
    #[serde(default)]
    pub word_dir: Option<PathBuf>,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub lesson: LessonConfig,
}

fn default_language() -> String {
    FALLBACK_LANGUAGE.to_string()
}
fn default_mix_ratio_percent() -> u8 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            secondary_language: None,
            mix_ratio_percent: default_mix_ratio_percent(),
            word_dir: None,
            detection: DetectionConfig::default(),
            lesson: LessonConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyadapt")
            .join("config.toml")
    }

    /// Mixing options for the configured secondary language, if one is set.
    pub fn mix_options(&self) -> Option<MixOptions> {
        self.secondary_language
            .as_deref()
            .filter(|lang| !lang.trim().is_empty())
            .map(|lang| MixOptions::new(lang, self.mix_ratio_percent))
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn normalize(&mut self) {
        self.language = self.language.trim().to_lowercase();
        if self.language.is_empty() {
            self.language = default_language();
        }
        self.mix_ratio_percent = self.mix_ratio_percent.min(MAX_MIX_PERCENT);
        if self.lesson.words_per_exercise == 0 {
            self.lesson.words_per_exercise = LessonConfig::default().words_per_exercise;
        }
        if self.lesson.mixed_words == 0 {
            self.lesson.mixed_words = LessonConfig::default().mixed_words;
        }
    }
}
