use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::resample::WaveformBuffer;
use crate::audio::encode_wav;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClipId(pub u64);

// atomic counter so ids stay unique even across reloads in one process
pub fn next_clip_id() -> ClipId {
    ClipId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// A committed drawing. `audio` is encoded from `wave` once, here, and never
/// re-derived while the clip lives.
#[derive(Clone, Debug)]
pub struct Clip {
    pub id: ClipId,
    pub image: String, // opaque, rendered by whoever owns the canvas
    pub wave: WaveformBuffer,
    audio: Vec<u8>,
}

impl Clip {
    pub fn new(
        image: String,
        wave: WaveformBuffer,
        sample_rate: u32,
        repeat_count: usize,
    ) -> anyhow::Result<Self> {
        let audio = encode_wav(&wave, sample_rate, repeat_count)?;
        Ok(Self {
            id: next_clip_id(),
            image,
            wave,
            audio,
        })
    }

    /// The encoded WAV bytes.
    pub fn audio(&self) -> &[u8] {
        &self.audio
    }

    /// Download name, `drawscillator_clip_<index>.wav`.
    pub fn file_name(index: usize) -> String {
        format!("drawscillator_clip_{index}.wav")
    }
}

/// Clips in creation order.
#[derive(Clone, Debug, Default)]
pub struct ClipCollection {
    clips: Vec<Clip>,
}

impl ClipCollection {
    pub fn push(&mut self, clip: Clip) -> usize {
        self.clips.push(clip);
        self.clips.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Clip> {
        (index < self.clips.len()).then(|| self.clips.remove(index))
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn position(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }
}

/// Write every clip's audio into `dir` under its download name.
pub fn export_clips(clips: &ClipCollection, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(clips.len());
    for (i, clip) in clips.iter().enumerate() {
        let path = dir.join(Clip::file_name(i));
        std::fs::write(&path, clip.audio())?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
