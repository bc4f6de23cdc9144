use crate::audio_api::AudioCommand;
use crate::config::KeyLayout;
use crate::pipeline::WaveformBuffer;

use super::harmonic::HarmonicTable;
use super::scope::Scope;
use super::voice::Voice;

/// What's sounding right now, from the control side.
#[derive(Clone, Debug)]
pub struct Sounding {
    pub key: i32,
    pub frequency: f32,
    pub scope: Scope,
}

#[derive(Clone, Debug, Default)]
pub enum ToneState {
    #[default]
    Idle,
    Sounding(Sounding),
}

/// Monophonic note control. Every transition returns the commands the audio
/// thread needs to mirror it.
pub struct ToneEngine {
    keys: KeyLayout,
    sample_rate: u32,
    visual_speed_factor: f32,
    scope_width: usize,
    state: ToneState,
}

impl ToneEngine {
    pub fn new(keys: KeyLayout, sample_rate: u32, visual_speed_factor: f32, scope_width: usize) -> Self {
        Self {
            keys,
            sample_rate,
            visual_speed_factor,
            scope_width,
            state: ToneState::Idle,
        }
    }

    pub fn is_sounding(&self) -> bool {
        matches!(self.state, ToneState::Sounding(_))
    }

    pub fn frequency(&self) -> Option<f32> {
        match &self.state {
            ToneState::Sounding(s) => Some(s.frequency),
            ToneState::Idle => None,
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        match &self.state {
            ToneState::Sounding(s) => Some(&s.scope),
            ToneState::Idle => None,
        }
    }

    /// Start `key` with the given shape, tearing down any current note first.
    pub fn note_on(
        &mut self,
        key: i32,
        wave: &WaveformBuffer,
        table: &HarmonicTable,
        gain: f32,
    ) -> Vec<AudioCommand> {
        let mut cmds = self.note_off();

        let key = self.keys.clamp(key);
        let frequency = self.keys.frequency(key);
        let gain = gain.clamp(0.0, 1.0);
        let voice = Voice::new(table, frequency, gain, self.sample_rate);
        log::debug!("note on: key {key} ({frequency:.2} Hz) gain {gain:.2}");

        self.state = ToneState::Sounding(Sounding {
            key,
            frequency,
            scope: Scope::new(wave, frequency, self.visual_speed_factor, self.scope_width),
        });
        cmds.push(AudioCommand::Start(voice));
        cmds
    }

    /// Stop the current note. Does nothing (and sends nothing) when idle.
    pub fn note_off(&mut self) -> Vec<AudioCommand> {
        match std::mem::take(&mut self.state) {
            ToneState::Idle => vec![],
            ToneState::Sounding(s) => {
                log::debug!("note off: key {}", s.key);
                vec![AudioCommand::Stop]
            }
        }
    }

    pub fn tick(&mut self, elapsed_secs: f64) {
        if let ToneState::Sounding(s) = &mut self.state {
            s.scope.tick(elapsed_secs);
        }
    }
}
