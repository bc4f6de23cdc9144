// Curve in, clip out: pointer samples → waveform cycle → encoded clip.

pub mod clip;
pub mod persistence;
mod resample;
mod sampler;

pub use clip::{Clip, ClipCollection, ClipId, export_clips};
pub use resample::{WaveformBuffer, curve_to_wave};
pub use sampler::CurveSampler;
