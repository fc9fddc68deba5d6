//! Centralized error type for the termite umbrella crate.
//!
//! Wraps the core and transport errors so `?` propagates across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] termite_core::Error),

    #[error("Audio/MIDI: {0}")]
    Device(#[from] termite_io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
