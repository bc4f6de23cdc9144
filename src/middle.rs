// The middle layer: owns the drawing gesture, the clip list and the tone
// engine, turns InputEvents into state changes plus AudioCommands. The UI
// just forwards events and draws whatever this exposes.

use crate::audio::{HarmonicCache, ToneEngine};
use crate::audio_api::AudioCommand;
use crate::config::Config;
use crate::pipeline::{Clip, ClipCollection, ClipId, CurveSampler, curve_to_wave};
use crate::shared::{CurvePoint, InputEvent};

pub struct Middle {
    config: Config,
    sampler: CurveSampler,
    clips: ClipCollection,
    selected: Option<ClipId>,
    tone: ToneEngine,
    harmonics: HarmonicCache,
}

impl Middle {
    /// `playback_rate` is what the output device runs at; clips are always
    /// encoded at the configured rate.
    pub fn new(config: Config, playback_rate: u32) -> Self {
        Self::with_clips(config, playback_rate, ClipCollection::default())
    }

    pub fn with_clips(config: Config, playback_rate: u32, clips: ClipCollection) -> Self {
        let tone = ToneEngine::new(
            config.keys,
            playback_rate,
            config.visual_speed_factor,
            config.scope_width,
        );
        Self {
            sampler: Self::fresh_sampler(&config),
            clips,
            selected: None,
            tone,
            harmonics: HarmonicCache::default(),
            config,
        }
    }

    fn fresh_sampler(config: &Config) -> CurveSampler {
        CurveSampler::new(config.canvas_width, config.canvas_height, config.canvas_margin)
    }

    pub fn clips(&self) -> &ClipCollection {
        &self.clips
    }

    #[cfg(test)]
    pub fn sampler(&self) -> &CurveSampler {
        &self.sampler
    }

    pub fn tone(&self) -> &ToneEngine {
        &self.tone
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        let index = self.clips.position(self.selected?)?;
        self.clips.get(index)
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        match event {
            InputEvent::PointerDown(p) => {
                // touching the right edge submits straight away
                if p.x >= self.config.canvas_width {
                    self.commit(String::new());
                } else {
                    self.sampler.begin(p);
                }
                vec![]
            }
            InputEvent::PointerMove(p) => {
                self.sampler.extend(p);
                vec![]
            }
            InputEvent::PointerUp => {
                self.sampler.end();
                vec![]
            }
            InputEvent::Commit { image } => {
                self.commit(image);
                vec![]
            }
            InputEvent::ClearCanvas => {
                self.sampler = Self::fresh_sampler(&self.config);
                vec![]
            }
            InputEvent::SelectClip(index) => self.select(index),
            InputEvent::DiscardClip(index) => self.discard(index),
            InputEvent::ClearClips => {
                self.clips.clear();
                self.selected = None;
                self.harmonics.clear();
                self.tone.note_off()
            }
            InputEvent::KeyDown { key, gain } => self.key_down(key, gain),
            InputEvent::KeyUp => self.tone.note_off(),
        }
    }

    /// Bake the current gesture into a clip and start a fresh canvas. Returns
    /// the new clip's index; a failed encode is logged and the drawing kept.
    pub fn commit(&mut self, image: String) -> Option<usize> {
        let sampler = std::mem::replace(&mut self.sampler, Self::fresh_sampler(&self.config));
        let curve = sampler.into_curve();
        let wave = curve_to_wave(&curve, self.config.canvas_width, self.config.canvas_height);
        match Clip::new(image, wave, self.config.sample_rate, self.config.repeat_count) {
            Ok(clip) => {
                let index = self.clips.push(clip);
                log::info!("committed clip {index} from {} points", curve.len());
                Some(index)
            }
            Err(e) => {
                log::error!("failed to encode clip: {e:#}");
                None
            }
        }
    }

    fn select(&mut self, index: usize) -> Vec<AudioCommand> {
        let id = self.clips.get(index).map(|c| c.id);
        if id == self.selected {
            return vec![];
        }
        self.selected = id;
        self.tone.note_off()
    }

    fn discard(&mut self, index: usize) -> Vec<AudioCommand> {
        let Some(clip) = self.clips.remove(index) else {
            return vec![];
        };
        if self.selected == Some(clip.id) {
            self.selected = None;
            return self.tone.note_off();
        }
        vec![]
    }

    fn key_down(&mut self, key: i32, gain: f32) -> Vec<AudioCommand> {
        let Some(wave) = self.selected_clip().map(|c| c.wave.clone()) else {
            log::debug!("key {key} pressed with no clip selected");
            return self.tone.note_off();
        };
        match self.harmonics.get(&wave) {
            Some(table) => self.tone.note_on(key, &wave, &table, gain),
            None => self.tone.note_off(),
        }
    }

    /// Advance time-driven state (the scope) by `elapsed_secs`.
    pub fn tick(&mut self, elapsed_secs: f64) {
        self.tone.tick(elapsed_secs);
    }

    /// One y per column of the scrolling trace, None while nothing sounds.
    pub fn scope_trace(&self, height: f32) -> Option<Vec<f32>> {
        self.tone
            .scope()
            .map(|s| s.trace(self.config.scope_width, height))
    }
}

/// A diagonal or any other scripted gesture, for the CLI and tests.
pub fn draw_curve(middle: &mut Middle, points: &[CurvePoint]) {
    let mut iter = points.iter();
    if let Some(&first) = iter.next() {
        middle.handle_input(InputEvent::PointerDown(first));
        for &p in iter {
            middle.handle_input(InputEvent::PointerMove(p));
        }
        middle.handle_input(InputEvent::PointerUp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::harmonic::analyze;
    use crate::shared::{HARMONIC_SIZE, WAVE_LENGTH};

    fn middle() -> Middle {
        Middle::new(Config::default(), 44100)
    }

    fn commit_diagonal(m: &mut Middle) -> usize {
        // top-left to bottom-right
        let points: Vec<CurvePoint> = (0..=40)
            .map(|i| CurvePoint::new(i as f32 * 10.0, i as f32 * 5.0))
            .collect();
        draw_curve(m, &points);
        m.commit("diagonal".into()).unwrap()
    }

    fn is_start(cmd: &AudioCommand) -> bool {
        matches!(cmd, AudioCommand::Start(_))
    }

    #[test]
    fn empty_commit_is_a_silent_clip() {
        let mut m = middle();
        m.handle_input(InputEvent::Commit { image: "blank".into() });
        let clip = m.clips().get(0).unwrap();
        assert_eq!(clip.wave.samples().len(), WAVE_LENGTH);
        assert!(clip.wave.samples().iter().all(|&s| s == 0.0));
        assert!(clip.audio()[44..].iter().all(|&b| b == 0));
        assert!(m.sampler().points().is_empty());
    }

    #[test]
    fn diagonal_is_a_falling_ramp_with_a_strong_fundamental() {
        let mut m = middle();
        let index = commit_diagonal(&mut m);
        let wave = m.clips().get(index).unwrap().wave.clone();
        let s = wave.samples();

        assert_eq!(s[0], 1.0);
        assert!(s[WAVE_LENGTH - 1] < -0.98);
        for w in s.windows(2) {
            assert!(w[1] < w[0], "ramp must fall: {} then {}", w[0], w[1]);
        }

        let table = analyze(&wave).unwrap();
        let fundamental = table.magnitude(1);
        assert!(fundamental > 0.1);
        // a sampled sawtooth's partials fall off as 1/sin(πk/K), roughly 1/k
        let falloff = |k: usize| (std::f32::consts::PI * k as f32 / HARMONIC_SIZE as f32).sin();
        for k in 2..HARMONIC_SIZE / 2 {
            let mag = table.magnitude(k);
            assert!(mag < fundamental, "harmonic {k} dominates");
            assert!(
                mag <= fundamental * falloff(1) / falloff(k) * 1.05,
                "harmonic {k} too strong"
            );
        }
    }

    #[test]
    fn diagonal_into_the_margin_still_falls_all_the_way() {
        let mut m = Middle::new(
            Config {
                canvas_margin: 10.0,
                ..Config::default()
            },
            44100,
        );
        let index = commit_diagonal(&mut m);
        let s = m.clips().get(index).unwrap().wave.samples().to_vec();
        // clamped to 190 px, then held there across the margin
        for w in s.windows(2) {
            assert!(w[1] <= w[0], "ramp must not rise: {} then {}", w[0], w[1]);
        }
        assert!((s[WAVE_LENGTH - 1] + 0.9).abs() < 1e-6);
    }

    #[test]
    fn stroke_that_stops_short_returns_to_baseline() {
        let mut m = middle();
        draw_curve(&mut m, &[CurvePoint::new(0.0, 0.0), CurvePoint::new(100.0, 0.0)]);
        let index = m.commit(String::new()).unwrap();
        let s = m.clips().get(index).unwrap().wave.samples().to_vec();
        assert_eq!(s[0], 1.0);
        assert!(s[WAVE_LENGTH - 1].abs() < 0.01);
    }

    #[test]
    fn pointer_at_the_right_edge_commits() {
        let mut m = middle();
        m.handle_input(InputEvent::PointerDown(CurvePoint::new(0.0, 20.0)));
        m.handle_input(InputEvent::PointerMove(CurvePoint::new(100.0, 20.0)));
        m.handle_input(InputEvent::PointerUp);
        m.handle_input(InputEvent::PointerDown(CurvePoint::new(400.0, 20.0)));
        assert_eq!(m.clips().len(), 1);
        assert!(m.sampler().points().is_empty());
    }

    #[test]
    fn keys_do_nothing_without_a_clip() {
        let mut m = middle();
        assert!(m.handle_input(InputEvent::KeyDown { key: 40, gain: 1.0 }).is_empty());
        assert!(!m.tone().is_sounding());
    }

    #[test]
    fn key_down_plays_the_selected_clip() {
        let mut m = middle();
        commit_diagonal(&mut m);
        assert!(m.handle_input(InputEvent::SelectClip(0)).is_empty());
        let cmds = m.handle_input(InputEvent::KeyDown { key: 45, gain: 0.5 });
        assert_eq!(cmds.len(), 1);
        assert!(is_start(&cmds[0]));
        assert_eq!(m.tone().frequency(), Some(110.0));
        assert!(m.scope_trace(64.0).is_some_and(|t| t.len() == 75 * 16));

        // a second key while held: exactly one stop then one start
        let cmds = m.handle_input(InputEvent::KeyDown { key: 46, gain: 0.5 });
        assert!(matches!(cmds.as_slice(), [AudioCommand::Stop, AudioCommand::Start(_)]));

        let cmds = m.handle_input(InputEvent::KeyUp);
        assert!(matches!(cmds.as_slice(), [AudioCommand::Stop]));
        assert!(m.handle_input(InputEvent::KeyUp).is_empty());
        assert!(m.scope_trace(64.0).is_none());
    }

    #[test]
    fn switching_clips_stops_the_tone() {
        let mut m = middle();
        commit_diagonal(&mut m);
        commit_diagonal(&mut m);
        m.handle_input(InputEvent::SelectClip(0));
        m.handle_input(InputEvent::KeyDown { key: 40, gain: 1.0 });
        let cmds = m.handle_input(InputEvent::SelectClip(1));
        assert!(matches!(cmds.as_slice(), [AudioCommand::Stop]));
        assert!(!m.tone().is_sounding());
        // reselecting the same clip is not a change
        assert!(m.handle_input(InputEvent::SelectClip(1)).is_empty());
    }

    #[test]
    fn discarding_the_sounding_clip_stops_it() {
        let mut m = middle();
        commit_diagonal(&mut m);
        commit_diagonal(&mut m);
        m.handle_input(InputEvent::SelectClip(1));
        m.handle_input(InputEvent::KeyDown { key: 40, gain: 1.0 });
        assert!(m.handle_input(InputEvent::DiscardClip(0)).is_empty());
        assert!(m.tone().is_sounding());
        let cmds = m.handle_input(InputEvent::DiscardClip(0));
        assert!(matches!(cmds.as_slice(), [AudioCommand::Stop]));
        assert!(m.selected_clip().is_none());
        assert!(m.handle_input(InputEvent::DiscardClip(9)).is_empty());
    }

    #[test]
    fn clear_clips_silences_everything() {
        let mut m = middle();
        commit_diagonal(&mut m);
        m.handle_input(InputEvent::SelectClip(0));
        m.handle_input(InputEvent::KeyDown { key: 40, gain: 1.0 });
        let cmds = m.handle_input(InputEvent::ClearClips);
        assert!(matches!(cmds.as_slice(), [AudioCommand::Stop]));
        assert!(m.clips().is_empty());
        assert!(m.handle_input(InputEvent::KeyDown { key: 40, gain: 1.0 }).is_empty());
    }

    #[test]
    fn clear_canvas_drops_the_gesture() {
        let mut m = middle();
        draw_curve(&mut m, &[CurvePoint::new(0.0, 0.0), CurvePoint::new(50.0, 10.0)]);
        m.handle_input(InputEvent::ClearCanvas);
        assert!(m.sampler().points().is_empty());
        assert!(m.clips().is_empty());
    }
}
