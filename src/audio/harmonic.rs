use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;

use crate::pipeline::WaveformBuffer;
use crate::shared::HARMONIC_SIZE;

/// Fourier coefficients of one cycle, `real[k]`/`imag[k]` for harmonic `k`.
/// Index 0 is DC; the oscillator ignores it.
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonicTable {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
}

impl HarmonicTable {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    #[cfg(test)]
    pub fn magnitude(&self, k: usize) -> f32 {
        self.real[k].hypot(self.imag[k])
    }
}

/// Stretch `samples` onto `size` evenly spaced points spanning the first to
/// the last input sample.
fn resample(samples: &[f32], size: usize) -> Vec<f64> {
    let last = samples.len() - 1;
    (0..size)
        .map(|i| {
            let t = i as f64 / size as f64 * last as f64;
            let i0 = t.floor() as usize;
            let i1 = (i0 + 1).min(last);
            let frac = t - i0 as f64;
            samples[i0] as f64 * (1.0 - frac) + samples[i1] as f64 * frac
        })
        .collect()
}

/// Plain O(K²) DFT of the wave resampled to HARMONIC_SIZE points.
/// Returns None for anything shorter than two samples.
pub fn analyze(wave: &WaveformBuffer) -> Option<HarmonicTable> {
    let samples = wave.samples();
    if samples.len() < 2 {
        return None;
    }

    let k_size = HARMONIC_SIZE;
    let resampled = resample(samples, k_size);
    let mut real = vec![0.0f32; k_size];
    let mut imag = vec![0.0f32; k_size];

    for k in 0..k_size {
        let mut sum_re = 0.0f64;
        let mut sum_im = 0.0f64;
        for (n, &x) in resampled.iter().enumerate() {
            let phase = TAU * (k * n) as f64 / k_size as f64;
            sum_re += x * phase.cos();
            sum_im -= x * phase.sin();
        }
        real[k] = (sum_re / k_size as f64) as f32;
        imag[k] = (sum_im / k_size as f64) as f32;
    }

    Some(HarmonicTable { real, imag })
}

/// Memoizes `analyze` per exact buffer contents, so replaying a clip doesn't
/// redo the transform.
#[derive(Default)]
pub struct HarmonicCache {
    tables: HashMap<Vec<u32>, Arc<HarmonicTable>>,
}

impl HarmonicCache {
    pub fn get(&mut self, wave: &WaveformBuffer) -> Option<Arc<HarmonicTable>> {
        let key = wave.fingerprint();
        if let Some(table) = self.tables.get(&key) {
            log::debug!("harmonic cache hit ({} entries)", self.tables.len());
            return Some(Arc::clone(table));
        }
        let table = Arc::new(analyze(wave)?);
        self.tables.insert(key, Arc::clone(&table));
        Some(table)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
