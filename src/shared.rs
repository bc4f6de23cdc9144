// Types and constants shared between the input side (pointer + keys), the
// middle layer, and the audio thread.
//
// The input plan, as the collaborator (canvas/keyboard UI) sends it:
//
//   pointer down        //  PointerDown(x, y)   starts a gesture
//   pointer drag        //  PointerMove(x, y)   extends it, left-to-right only
//   pointer up / leave  //  PointerUp           ends the gesture (no commit yet)
//   submit button       //  Commit              bakes the curve into a clip
//   clear button        //  ClearCanvas         throws the curve away
//
//   clip list tap       //  SelectClip(i) / DiscardClip(i) / ClearClips
//   piano key press     //  KeyDown { key, gain } / KeyUp
//
// Everything numeric lives in canvas pixel space until the resampler turns it
// into a WaveformBuffer.

use serde::{Deserialize, Serialize};

/// Samples per drawn cycle. One WaveformBuffer is exactly this long.
pub const WAVE_LENGTH: usize = 341;

/// Resynthesis size for harmonic analysis, independent of WAVE_LENGTH.
pub const HARMONIC_SIZE: usize = 512;

pub const SAMPLE_RATE: u32 = 44100;

// ye olde types
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // canvas
    PointerDown(CurvePoint),
    PointerMove(CurvePoint),
    PointerUp,
    Commit { image: String },
    ClearCanvas,

    // clip list
    SelectClip(usize),
    DiscardClip(usize),
    ClearClips,

    // keyboard, gain comes from the external volume knob
    KeyDown { key: i32, gain: f32 },
    KeyUp,
}
