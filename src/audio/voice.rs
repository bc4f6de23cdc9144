use std::f64::consts::TAU;

use super::harmonic::HarmonicTable;

/// Samples in the single-cycle table a voice reads from.
pub const CYCLE_TABLE_SIZE: usize = 2048;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Sum harmonics 1.. of `table` into one cycle, dropping any partial that
/// would sit at or above Nyquist for `frequency`, then scale the peak to 1.
///
/// Each partial is `real[k]·cos(kθ) + imag[k]·sin(kθ)`; DC is left out.
pub fn synthesize_cycle(table: &HarmonicTable, frequency: f32, sample_rate: u32) -> Vec<f32> {
    let size = CYCLE_TABLE_SIZE;
    if table.is_empty() {
        return vec![0.0; size];
    }
    let nyquist = sample_rate as f64 / 2.0;
    let cos: Vec<f64> = (0..size).map(|m| (TAU * m as f64 / size as f64).cos()).collect();
    let sin: Vec<f64> = (0..size).map(|m| (TAU * m as f64 / size as f64).sin()).collect();

    let partials = (1..table.len().min(size / 2))
        .take_while(|&k| k as f64 * (frequency as f64) < nyquist);

    let mut cycle = vec![0.0f64; size];
    for k in partials {
        let (a, b) = (table.real[k] as f64, table.imag[k] as f64);
        if a == 0.0 && b == 0.0 {
            continue;
        }
        for (n, out) in cycle.iter_mut().enumerate() {
            let m = (k * n) % size;
            *out += a * cos[m] + b * sin[m];
        }
    }

    let peak = cycle.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    let scale = if peak > 1e-6 { 1.0 / peak } else { 0.0 };
    cycle.into_iter().map(|s| (s * scale) as f32).collect()
}

/// The one sounding oscillator, as the audio thread sees it. Built on the
/// control thread so the callback never allocates.
#[derive(Clone, Debug)]
pub struct Voice {
    cycle: Vec<f32>,
    phase: f32,     // position in the cycle, [0, 1)
    phase_inc: f32, // cycles per sample
    pub gain: f32,
    pub active: bool,
}

impl Voice {
    pub fn new(table: &HarmonicTable, frequency: f32, gain: f32, sample_rate: u32) -> Self {
        Self {
            cycle: synthesize_cycle(table, frequency, sample_rate),
            phase: 0.0,
            phase_inc: frequency / sample_rate as f32,
            gain: gain.clamp(0.0, 1.0),
            active: true,
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn next_sample(&mut self) -> f32 {
        if !self.active || self.cycle.is_empty() {
            return 0.0;
        }
        let size = self.cycle.len();
        let pos = self.phase * size as f32;
        let i = (pos as usize).min(size - 1);
        let frac = pos - i as f32;
        let s0 = self.cycle[i];
        let s1 = self.cycle[(i + 1) % size];

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        lerp(s0, s1, frac) * self.gain
    }

    /// Mix this voice into a mono block.
    #[cfg(test)]
    pub fn render_into(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            if !self.active {
                break;
            }
            *s += self.next_sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::harmonic::analyze;
    use crate::pipeline::WaveformBuffer;
    use float_cmp::approx_eq;

    fn sine_table() -> HarmonicTable {
        let mut table = HarmonicTable {
            real: vec![0.0; 512],
            imag: vec![0.0; 512],
        };
        table.imag[1] = 0.5;
        table
    }

    #[test]
    fn single_partial_is_a_unit_sine() {
        let cycle = synthesize_cycle(&sine_table(), 440.0, 44100);
        assert_eq!(cycle.len(), CYCLE_TABLE_SIZE);
        assert!(approx_eq!(f32, cycle[CYCLE_TABLE_SIZE / 4], 1.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, cycle[3 * CYCLE_TABLE_SIZE / 4], -1.0, epsilon = 1e-6));
        assert!(cycle[0].abs() < 1e-6);
    }

    #[test]
    fn partials_above_nyquist_are_dropped() {
        let mut table = sine_table();
        table.imag[1] = 0.0;
        table.real[30] = 0.5; // 30 * 1000 Hz is past 22.05 kHz
        let cycle = synthesize_cycle(&table, 1000.0, 44100);
        assert!(cycle.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn dc_only_is_silent() {
        let wave = WaveformBuffer::from_samples(vec![0.7; 64]);
        let table = analyze(&wave).unwrap();
        let mut voice = Voice::new(&table, 55.0, 1.0, 44100);
        let mut out = vec![0.0; 256];
        voice.render_into(&mut out);
        assert!(out.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn gain_scales_and_clamps() {
        let mut loud = Voice::new(&sine_table(), 441.0, 3.0, 44100);
        assert_eq!(loud.gain, 1.0);
        let mut quiet = Voice::new(&sine_table(), 441.0, 0.25, 44100);
        let peak = |v: &mut Voice| (0..200).map(|_| v.next_sample().abs()).fold(0.0, f32::max);
        let loud_peak = peak(&mut loud);
        let quiet_peak = peak(&mut quiet);
        assert!(loud_peak > 0.99);
        assert!(approx_eq!(f32, quiet_peak, loud_peak * 0.25, epsilon = 1e-3));
    }

    #[test]
    fn period_matches_frequency() {
        // 441 Hz at 44.1 kHz repeats every 100 samples
        let mut voice = Voice::new(&sine_table(), 441.0, 1.0, 44100);
        let first: Vec<f32> = (0..100).map(|_| voice.next_sample()).collect();
        let second: Vec<f32> = (0..100).map(|_| voice.next_sample()).collect();
        for (a, b) in first.iter().zip(&second) {
            assert!(approx_eq!(f32, *a, *b, epsilon = 1e-3));
        }
    }

    #[test]
    fn empty_table_is_silent() {
        let table = HarmonicTable {
            real: vec![],
            imag: vec![],
        };
        let cycle = synthesize_cycle(&table, 440.0, 44100);
        assert_eq!(cycle.len(), CYCLE_TABLE_SIZE);
        assert!(cycle.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn stopped_voice_is_silent() {
        let mut voice = Voice::new(&sine_table(), 441.0, 1.0, 44100);
        voice.stop();
        voice.stop();
        let mut out = vec![0.0; 64];
        voice.render_into(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
