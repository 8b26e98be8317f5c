use crate::error::{ExperimentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stroop_core::{Block, ColorSpec, KeyBinding, Rgba};

/// Everything the generator, runner and orchestrator read.
///
/// Loaded from JSON when a config file exists; any field left out keeps its
/// default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub practice_trials: usize,
    pub main_trials: usize,
    pub fixation_ms: u64,
    pub max_response_ms: u64,
    pub feedback_ms: u64,
    pub completion_ms: u64,
    pub results_dir: PathBuf,
    pub colors: Vec<ColorSpec>,
    pub keys: Vec<KeyBinding>,
    pub texts: Texts,
    pub window: WindowConfig,
    pub font_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub correct: String,
    pub incorrect: String,
    pub too_slow: String,
    pub transition: String,
    pub completion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub background: Rgba,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            practice_trials: 10,
            main_trials: 60,
            fixation_ms: 400,
            max_response_ms: 2500,
            feedback_ms: 500,
            completion_ms: 2000,
            results_dir: PathBuf::from("stroop_sonuclari"),
            colors: vec![
                ColorSpec::new("KIRMIZI", "red", [255, 0, 0, 255]),
                ColorSpec::new("YESIL", "green", [0, 128, 0, 255]),
                ColorSpec::new("MAVI", "blue", [0, 0, 255, 255]),
                ColorSpec::new("SARI", "yellow", [255, 255, 0, 255]),
            ],
            keys: vec![
                KeyBinding::new('r', "KIRMIZI"),
                KeyBinding::new('g', "YESIL"),
                KeyBinding::new('b', "MAVI"),
                KeyBinding::new('y', "SARI"),
            ],
            texts: Texts::default(),
            window: WindowConfig::default(),
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        }
    }
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            correct: "CORRECT".to_string(),
            incorrect: "WRONG".to_string(),
            too_slow: "Too slow!".to_string(),
            transition: "Practice is over. The main experiment starts now.\n\n\
                         Press any key to begin."
                .to_string(),
            completion: "Experiment complete. Your data has been saved. Thank you!".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fullscreen: false,
            background: [128, 128, 128, 255],
        }
    }
}

impl StroopConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ExperimentError::io(path, e))?;
        let config: StroopConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_json_file(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.colors.len() < 2 {
            return Err(ExperimentError::Config(format!(
                "at least two colors are needed for incongruent trials, got {}",
                self.colors.len()
            )));
        }

        let mut names = HashSet::new();
        let mut inks = HashSet::new();
        for color in &self.colors {
            if !names.insert(color.name.as_str()) {
                return Err(ExperimentError::Config(format!(
                    "duplicate color name {}",
                    color.name
                )));
            }
            if !inks.insert(color.ink.as_str()) {
                return Err(ExperimentError::Config(format!(
                    "duplicate ink {}",
                    color.ink
                )));
            }
        }

        let mut keys = HashSet::new();
        for binding in &self.keys {
            if !keys.insert(binding.key) {
                return Err(ExperimentError::Config(format!(
                    "key '{}' is bound twice",
                    binding.key
                )));
            }
            if !names.contains(binding.color.as_str()) {
                return Err(ExperimentError::Config(format!(
                    "key '{}' is bound to unknown color {}",
                    binding.key, binding.color
                )));
            }
        }
        for color in &self.colors {
            if !self.keys.iter().any(|b| b.color == color.name) {
                return Err(ExperimentError::Config(format!(
                    "no response key for color {}",
                    color.name
                )));
            }
        }

        if self.max_response_ms == 0 {
            return Err(ExperimentError::Config(
                "max_response_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fixation(&self) -> Duration {
        Duration::from_millis(self.fixation_ms)
    }

    pub fn max_response(&self) -> Duration {
        Duration::from_millis(self.max_response_ms)
    }

    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    pub fn completion(&self) -> Duration {
        Duration::from_millis(self.completion_ms)
    }

    pub fn trials_for(&self, block: Block) -> usize {
        match block {
            Block::Practice => self.practice_trials,
            Block::Main => self.main_trials,
        }
    }

    pub fn response_keys(&self) -> Vec<char> {
        self.keys.iter().map(|b| b.key).collect()
    }

    /// Color name claimed by a response key
    pub fn color_for_key(&self, key: char) -> Option<&str> {
        self.keys
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.color.as_str())
    }

    /// Canonical color name of an ink identifier
    pub fn name_for_ink(&self, ink: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|c| c.ink == ink)
            .map(|c| c.name.as_str())
    }

    pub fn ink_rgba(&self, ink: &str) -> Option<Rgba> {
        self.colors.iter().find(|c| c.ink == ink).map(|c| c.rgba)
    }

    pub fn instructions(&self) -> String {
        let bindings = self
            .keys
            .iter()
            .map(|b| format!("{}: {}", b.key.to_ascii_uppercase(), b.color))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Welcome to the Stroop test!\n\n\
             Press the key for the INK COLOR of the word on screen:\n\
             {bindings}\n\n\
             There will be {} practice and {} main trials.\n\
             Press any key to start.",
            self.practice_trials, self.main_trials
        )
    }
}
