use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::SAMPLE_RATE;

const CONFIG_DIR: &str = ".drawscillator";
const CONFIG_FILE: &str = "config.json";

/// Tunables for the whole pipeline. Every field has a default so a partial
/// config.json only overrides what it names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sample_rate: u32,
    /// How many times the cycle is tiled into an exported clip.
    pub repeat_count: usize,
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Pointer samples are clamped this far inside the right/bottom edges.
    /// 0 lets a stroke reach full scale; touch screens want about 10.
    pub canvas_margin: f32,
    pub keys: KeyLayout,
    /// 1.0 scrolls the scope one cycle per drawn frame; higher is slower.
    pub visual_speed_factor: f32,
    /// Columns in the scope trace, 16 per key in the keyboard strip.
    pub scope_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            repeat_count: 30,
            canvas_width: 400.0,
            canvas_height: 200.0,
            canvas_margin: 0.0,
            keys: KeyLayout::default(),
            visual_speed_factor: 2.0,
            scope_width: 75 * 16,
        }
    }
}

/// A contiguous run of key indices, anchored to a reference pitch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLayout {
    pub base_key: i32,
    pub key_count: i32,
    pub reference_key: i32,
    pub reference_freq: f32,
}

impl Default for KeyLayout {
    fn default() -> Self {
        // A1 = 55 Hz, 75 keys up from there
        Self {
            base_key: 33,
            key_count: 75,
            reference_key: 33,
            reference_freq: 55.0,
        }
    }
}

impl KeyLayout {
    pub fn clamp(&self, key: i32) -> i32 {
        let last = self.base_key + self.key_count.max(1) - 1;
        key.clamp(self.base_key, last)
    }

    /// Equal-tempered key index to Hz. Pure, no per-key state.
    pub fn frequency(&self, key: i32) -> f32 {
        let semis = (self.clamp(key) - self.reference_key) as f32;
        self.reference_freq * 2.0_f32.powf(semis / 12.0)
    }

    pub fn keys(&self) -> impl Iterator<Item = i32> {
        self.base_key..self.base_key + self.key_count.max(0)
    }
}

pub fn note_name(key: i32) -> &'static str {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    NAMES[key.rem_euclid(12) as usize]
}

// <project_dir>/.drawscillator/config.json
fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Missing file means defaults; a file that exists but doesn't parse is an error.
pub fn load_config(project_dir: &Path) -> anyhow::Result<Config> {
    let path = config_file_path(project_dir);
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let data = std::fs::read_to_string(&path)?;
    let config = serde_json::from_str(&data)?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}
