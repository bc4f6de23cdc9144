use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::AudioCommand;

mod engine;
pub mod harmonic;
pub mod pcm;
mod scope;
mod tone;
mod voice;

pub use harmonic::HarmonicCache;
pub use pcm::encode_wav;
pub use scope::render_ascii;
pub use tone::ToneEngine;
pub use voice::Voice;

use engine::Engine;

/// Live playback is a capability, not a requirement: everything else in the
/// pipeline keeps working when this comes back as an error.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no default output device")]
    NoDevice,
    #[error("no default output config: {0}")]
    NoConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported sample format {0:?} (only f32 supported for now)")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to play output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    retired_rx: Receiver<Voice>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    /// Free voices the callback has let go of. Call once per tick.
    pub fn collect_retired(&self) -> usize {
        self.retired_rx.try_iter().count()
    }

    /// The device's rate, which voices must be built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio() -> Result<AudioHandle, AudioError> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(64);
    // every command retires at most one voice
    let (retired_tx, retired_rx) = crossbeam_channel::bounded::<Voice>(64);

    let host = cpal::default_host();
    log::info!("cpal host: {}", host.id().name());
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let config = device.default_output_config()?;

    let sample_rate: u32 = config.sample_rate().into();
    let channels = config.channels() as usize;
    log::info!("output: {sample_rate} Hz, {channels} channel(s)");

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let mut engine = Engine::new();
            engine.set_retired_tx(retired_tx);
            let output_stream = device.build_output_stream(
                &config.into(),
                move |data: &mut [f32], _info| {
                    while let Ok(cmd) = rx.try_recv() {
                        engine.handle_cmd(cmd);
                    }
                    engine.render_block(data, channels);
                },
                |err| log::error!("audio output stream error: {err}"),
                None,
            )?;
            output_stream.play()?;

            Ok(AudioHandle {
                tx,
                retired_rx,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        other => Err(AudioError::UnsupportedFormat(other)),
    }
}
