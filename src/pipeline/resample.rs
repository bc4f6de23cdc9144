use serde::{Deserialize, Serialize};

use crate::shared::{CurvePoint, WAVE_LENGTH};

/// One cycle of a periodic signal, every sample in [-1, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f32>", into = "Vec<f32>")]
pub struct WaveformBuffer(Vec<f32>);

impl WaveformBuffer {
    pub fn silent() -> Self {
        Self(vec![0.0; WAVE_LENGTH])
    }

    /// Wrap samples from elsewhere (a reload, a test), forcing them into range.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self(
            samples
                .into_iter()
                .map(|s| if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 })
                .collect(),
        )
    }

    pub fn samples(&self) -> &[f32] {
        &self.0
    }

    /// Exact bit pattern, for memoizing anything derived from this buffer.
    pub fn fingerprint(&self) -> Vec<u32> {
        self.0.iter().map(|s| s.to_bits()).collect()
    }
}

impl From<Vec<f32>> for WaveformBuffer {
    fn from(samples: Vec<f32>) -> Self {
        Self::from_samples(samples)
    }
}

impl From<WaveformBuffer> for Vec<f32> {
    fn from(wave: WaveformBuffer) -> Self {
        wave.0
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    // exact when a == b, so a flat stroke stays exactly on its level
    a + t * (b - a)
}

/// Turn a committed curve into a WAVE_LENGTH-sample cycle.
///
/// Canvas x is scaled onto sample indices; each index takes the first pair of
/// points that brackets it and interpolates y, which is then flipped so the
/// top of the canvas is +1 and half-height is 0. Indices outside the drawn
/// range are silent.
pub fn curve_to_wave(points: &[CurvePoint], canvas_width: f32, canvas_height: f32) -> WaveformBuffer {
    if points.is_empty() || canvas_width <= 0.0 || canvas_height <= 0.0 {
        return WaveformBuffer::silent();
    }

    let scaled: Vec<CurvePoint> = points
        .iter()
        .map(|p| CurvePoint::new(p.x / canvas_width * WAVE_LENGTH as f32, p.y))
        .collect();

    let mut wave = vec![0.0f32; WAVE_LENGTH];
    for (i, sample) in wave.iter_mut().enumerate() {
        let i = i as f32;
        let Some(w) = scaled.windows(2).find(|w| w[0].x <= i && w[1].x >= i) else {
            continue; // outside the drawn range
        };
        let (p0, p1) = (w[0], w[1]);
        let span = p1.x - p0.x;
        let t = if span > 0.0 { (i - p0.x) / span } else { 0.0 };
        let y = lerp(p0.y, p1.y, t);
        *sample = (1.0 - 2.0 * (y / canvas_height)).clamp(-1.0, 1.0);
    }

    WaveformBuffer(wave)
}
