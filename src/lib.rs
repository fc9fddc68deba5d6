//! # Termite - terminal MIDI synth controller
//!
//! Named synthesis controls driven from three places at once: the audio
//! callback, every MIDI input port, and the computer keyboard.
//!
//! ## Architecture
//!
//! Termite is an umbrella crate that coordinates:
//! - **termite-core** - Gate, controls, MIDI learn, audio pump, MIDI router,
//!   keyboard dispatcher, snapshots
//! - **termite-io** - CPAL audio output and midir MIDI input
//!
//! ## Quick Start
//!
//! ```ignore
//! use termite::prelude::*;
//!
//! let synth = PluckSynth::new();
//! let display = Arc::new(TerminalDisplay::for_engine(&synth));
//! let termite = termite::builder()
//!     .base_pitch(60)
//!     .build(synth, display)?;
//!
//! let _guard = TerminalGuard::enter()?;
//! termite.run(&mut TerminalKeys::new())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `terminal` (default) - crossterm display and key source, required by the binary

/// Re-export of termite-core for direct access
pub use termite_core as core;
/// Re-export of termite-io for direct access
pub use termite_io as io;

pub use termite_core::{
    AtomicFloat, AudioPump, ControlSpec, ControlView, Display, InputDispatcher, Key, KeySource,
    LearnedCcPolicy, MidiRouter, Mode, NullDisplay, ParamSink, RestoreReport, Session, Snapshot,
    SoundEngine, StreamStatus, TermiteConfig,
};
pub use termite_io::{list_midi_inputs, list_output_devices, MidiInputDevice, OutputConfig};

mod builder;
mod engine;
mod error;
mod synth;

pub use builder::TermiteBuilder;

/// Shorthand for [`TermiteBuilder::new`].
pub fn builder() -> TermiteBuilder {
    TermiteBuilder::new()
}
pub use engine::Termite;
pub use error::{Error, Result};
pub use synth::PluckSynth;

#[cfg(feature = "terminal")]
mod terminal;
#[cfg(feature = "terminal")]
pub use terminal::{TerminalDisplay, TerminalGuard, TerminalKeys};

pub mod prelude {
    //! Common imports for running a termite session.

    pub use crate::{
        ControlSpec, Display, Key, KeySource, LearnedCcPolicy, NullDisplay, ParamSink,
        PluckSynth, SoundEngine, Termite, TermiteBuilder, TermiteConfig,
    };

    #[cfg(feature = "terminal")]
    pub use crate::{TerminalDisplay, TerminalGuard, TerminalKeys};

    pub use std::sync::Arc;
}
