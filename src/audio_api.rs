pub use crate::audio::Voice;

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't build voices (the harmonic resynthesis allocates), so
    // the control side builds one and hands it over whole
    Start(Voice),

    // Silence whatever is sounding; harmless when nothing is
    Stop,
}
