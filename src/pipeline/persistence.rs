// to be called on startup and quit; only the wave (and the opaque image) is
// durable, audio gets re-encoded on every load
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::clip::{Clip, ClipCollection};
use super::resample::WaveformBuffer;
use crate::shared::WAVE_LENGTH;

const DRAWSCILLATOR_DIR: &str = ".drawscillator";
const CLIPS_FILE: &str = "clips.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedClip {
    pub image: String,
    pub wave: WaveformBuffer,
}

// <project_dir>/.drawscillator/clips.json
fn clips_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DRAWSCILLATOR_DIR).join(CLIPS_FILE)
}

/// None when there's nothing saved (or it doesn't parse); the caller starts
/// with an empty collection either way.
pub fn load_clips(project_dir: &Path, sample_rate: u32, repeat_count: usize) -> Option<ClipCollection> {
    let path = clips_file_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    let saved: Vec<SavedClip> = match serde_json::from_str(&data) {
        Ok(saved) => saved,
        Err(e) => {
            log::warn!("ignoring unreadable {}: {e}", path.display());
            return None;
        }
    };

    let mut clips = ClipCollection::default();
    for (i, s) in saved.into_iter().enumerate() {
        let len = s.wave.samples().len();
        if len != WAVE_LENGTH {
            log::warn!("dropping saved clip {i}: {len} samples, expected {WAVE_LENGTH}");
            continue;
        }
        match Clip::new(s.image, s.wave, sample_rate, repeat_count) {
            Ok(clip) => {
                clips.push(clip);
            }
            Err(e) => log::warn!("dropping saved clip: {e:#}"),
        }
    }
    log::info!("loaded {} clip(s) from {}", clips.len(), path.display());
    Some(clips)
}

// Save the clips to disk, making the files if they don't exist already
pub fn save_clips(project_dir: &Path, clips: &ClipCollection) -> anyhow::Result<()> {
    let path = clips_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .drawscillator/ if needed
    }
    let saved: Vec<SavedClip> = clips
        .iter()
        .map(|c| SavedClip {
            image: c.image.clone(),
            wave: c.wave.clone(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&saved)?;
    std::fs::write(&path, json)?;
    Ok(())
}
