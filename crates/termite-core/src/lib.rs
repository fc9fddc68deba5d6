//! Real-time control synchronization for a MIDI-driven synthesizer.
//!
//! Three kinds of thread share one set of named synthesis parameters:
//!
//! - the audio thread calls [`AudioPump::process`] once per output block
//! - each MIDI input port calls [`MidiRouter::route`] once per message
//! - the foreground thread runs [`InputDispatcher::run`] over key presses
//!
//! They all serialize through the single [`Gate`] owned by a [`Session`].
//! Critical sections are bounded (lookups, comparisons, arithmetic); display
//! redraws and logging happen only after the gate is released.
//!
//! # Example
//!
//! ```ignore
//! use termite_core::prelude::*;
//!
//! let session = Arc::new(Session::new(engine, display, TermiteConfig::default())?);
//! let mut pump = AudioPump::new(session.clone());
//! let router = MidiRouter::new(session.clone());
//!
//! router.route(&[0x90, 60, 100]);
//! pump.process(&mut block, StreamStatus::Ok);
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{LearnedCcPolicy, TermiteConfig, DEFAULT_KEYBOARD_LAYOUT};

mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat};

mod gate;
pub use gate::{Gate, GateGuard};

pub mod control;
pub use control::{Control, ControlSpec, ControlView, ControllerId, ParamSink};

mod registry;
pub use registry::{Binding, ControlId, ControlRegistry};

mod engine;
pub use engine::{flush_redraws, Display, NullDisplay, Redraw, Redraws, SoundEngine};

mod session;
pub use session::{Mode, Session, SessionState};

mod audio;
pub use audio::{AudioPump, StreamStatus};

pub mod midi;
pub use midi::MidiRouter;

mod input;
pub use input::{InputDispatcher, Key, KeyLayout, KeySource};

mod snapshot;
pub use snapshot::{ControlState, RestoreReport, Snapshot};

#[cfg(test)]
mod test_support;

pub mod prelude {
    //! Common imports for hosting a session.
    pub use crate::{
        AtomicFloat, AudioPump, ControlSpec, Display, InputDispatcher, Key, KeySource,
        MidiRouter, Mode, NullDisplay, ParamSink, Session, SoundEngine, StreamStatus,
        TermiteConfig,
    };
    pub use std::sync::Arc;
}
