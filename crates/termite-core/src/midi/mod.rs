//! MIDI input handling: raw message decoding and the per-message router.

mod message;
mod router;

pub use message::{
    MidiMessage, RawMessage, LEARN_STATUS_LIMIT, NOTE_OFF_STATUS, NOTE_ON_STATUS,
    PITCH_BEND_STATUS, SUSTAIN_CONTROLLER, SUSTAIN_STATUS,
};
pub use router::MidiRouter;
