//! Error types for termite-core.

use thiserror::Error;

/// Error type for termite-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Sound engine exposes no navigable controls")]
    NoControls,

    #[error("Duplicate control name: {0}")]
    DuplicateControl(String),

    #[error("Unknown control: {0}")]
    UnknownControl(String),

    #[error("Invalid control '{name}': {reason}")]
    InvalidControl { name: String, reason: String },

    #[error("Invalid MIDI controller id: {0}. Must be between 0 and 127")]
    InvalidController(u8),

    #[error("Registry inconsistent: {0}")]
    Inconsistent(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
