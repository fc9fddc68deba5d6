//! Audio and MIDI transports for a termite session.
//!
//! - [`AudioOutput`]: a CPAL output stream whose callback drives an
//!   [`AudioPump`](termite_core::AudioPump)
//! - [`MidiInputs`]: every enumerable midir input port, each delivering its
//!   messages to its own [`MidiRouter`](termite_core::MidiRouter) clone
//!
//! Both must be stopped before the session they feed is torn down.

pub mod error;
pub use error::{Error, Result};

mod audio;
pub use audio::{list_output_devices, AudioOutput, OutputConfig};

mod midi;
pub use midi::{list_midi_inputs, MidiInputDevice, MidiInputs};
