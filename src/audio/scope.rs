use crate::pipeline::WaveformBuffer;

// Redraws assumed per second when converting scroll speed to per-frame steps.
const REFERENCE_FPS: f32 = 60.0;

/// Scrolling picture of the sounding wave. Purely cosmetic: it advances with
/// wall-clock time, so dropped frames just skip ahead.
#[derive(Clone, Debug)]
pub struct Scope {
    wave: Vec<f32>,
    pixels_per_second: f32,
    offset: f32,
}

impl Scope {
    /// `width` is the trace width in columns; one cycle per frame crosses it
    /// `frequency / REFERENCE_FPS` times before `speed_factor` slows it down.
    pub fn new(wave: &WaveformBuffer, frequency: f32, speed_factor: f32, width: usize) -> Self {
        let samples = wave.samples();
        let (min, max) = samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        let mid = (min + max) / 2.0;
        let amplitude = (min - mid).abs().max((max - mid).abs());
        let amplitude = if amplitude > 0.0 { amplitude } else { 1.0 };
        let wave = samples.iter().map(|s| (s - mid) / amplitude).collect();
        Self {
            wave,
            pixels_per_second: width as f32 * frequency / speed_factor.max(f32::EPSILON),
            offset: 0.0,
        }
    }

    #[cfg(test)]
    pub fn pixels_per_frame(&self) -> f32 {
        self.pixels_per_second / REFERENCE_FPS
    }

    #[cfg(test)]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn tick(&mut self, elapsed_secs: f64) {
        if self.wave.is_empty() {
            return;
        }
        let len = self.wave.len() as f32;
        self.offset = (self.offset + self.pixels_per_second * elapsed_secs as f32) % len;
    }

    /// One y coordinate per column, top of the box is 0.
    pub fn trace(&self, width: usize, height: f32) -> Vec<f32> {
        let half = height / 2.0;
        let len = self.wave.len();
        (0..width)
            .map(|i| {
                let val = if len == 0 {
                    0.0
                } else {
                    self.wave[((i as f32 + self.offset) % len as f32) as usize % len]
                };
                half - val * half
            })
            .collect()
    }
}

/// Squash a trace (y per column, 0 at the top of a `height` box) into `rows`
/// lines of `cols` characters for a terminal.
pub fn render_ascii(trace: &[f32], height: f32, cols: usize, rows: usize) -> Vec<String> {
    let mut grid = vec![vec![' '; cols]; rows];
    if trace.is_empty() || rows == 0 || height <= 0.0 {
        return grid.into_iter().map(String::from_iter).collect();
    }
    for c in 0..cols {
        let y = trace[c * trace.len() / cols];
        let row = ((y / height) * rows as f32).floor().clamp(0.0, (rows - 1) as f32) as usize;
        grid[row][c] = '*';
    }
    grid.into_iter().map(String::from_iter).collect()
}
