use crossbeam_channel::Sender;

use crate::audio_api::AudioCommand;

use super::voice::Voice;

/// Lives inside the output callback. Holds at most one voice; a new Start
/// replaces whatever was there.
///
/// Voices leave through `retired_tx` so their tables are freed on the control
/// thread, not in the callback.
#[derive(Default)]
pub struct Engine {
    voice: Option<Voice>,
    retired_tx: Option<Sender<Voice>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_retired_tx(&mut self, tx: Sender<Voice>) {
        self.retired_tx = Some(tx);
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        let old = match cmd {
            AudioCommand::Start(voice) => self.voice.replace(voice),
            AudioCommand::Stop => self.voice.take(),
        };
        if let Some(mut v) = old {
            v.stop();
            self.retire(v);
        }
    }

    fn retire(&self, voice: Voice) {
        if let Some(tx) = &self.retired_tx {
            // a full queue means the control side stopped draining; the
            // voice is dropped here as a last resort
            let _ = tx.try_send(voice);
        }
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voice.iter().filter(|v| v.active).count()
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.voice.as_mut() {
            Some(v) => v.next_sample(),
            None => 0.0,
        }
    }

    /// Fill an interleaved block, the same mono sample on every channel.
    pub fn render_block(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let s = self.next_sample();
            frame.fill(s);
        }
    }
}
