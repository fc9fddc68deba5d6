//! Builder for configuring and constructing a [`Termite`] runner.

use crate::{Result, Termite};
use std::sync::Arc;
use termite_core::{Display, LearnedCcPolicy, Session, SoundEngine, TermiteConfig};
use termite_io::OutputConfig;

/// Every session setting has a default; MIDI input is on unless disabled with
/// `.midi(false)`.
///
/// # Example
///
/// ```ignore
/// use termite::prelude::*;
///
/// let termite = TermiteBuilder::new()
///     .sample_rate(48000)
///     .base_pitch(60)
///     .build(PluckSynth::new(), Arc::new(NullDisplay))?;
/// ```
#[derive(Debug, Clone)]
pub struct TermiteBuilder {
    config: TermiteConfig,
    output_device: Option<usize>,
    enable_midi: bool,
}

impl Default for TermiteBuilder {
    fn default() -> Self {
        Self {
            config: TermiteConfig::default(),
            output_device: None,
            enable_midi: true,
        }
    }
}

impl TermiteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config instead of the defaults.
    pub fn config(mut self, config: TermiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Frames per audio callback. Default: 64
    pub fn block_size(mut self, frames: usize) -> Self {
        self.config.block_size = frames;
        self
    }

    /// Default: 2
    pub fn channels(mut self, channels: usize) -> Self {
        self.config.channels = channels;
        self
    }

    /// Pitch of the first layout key. Default: 48
    pub fn base_pitch(mut self, pitch: u8) -> Self {
        self.config.base_pitch = pitch;
        self
    }

    pub fn keyboard_layout(mut self, keys: impl Into<String>) -> Self {
        self.config.keyboard_layout = keys.into();
        self
    }

    /// Default: 'm'
    pub fn learn_toggle_key(mut self, key: char) -> Self {
        self.config.learn_toggle_key = key;
        self
    }

    /// Default: 'c'
    pub fn learn_clear_key(mut self, key: char) -> Self {
        self.config.learn_clear_key = key;
        self
    }

    /// Velocity of notes played from the keyboard. Default: 1.0
    pub fn keyboard_velocity(mut self, velocity: f32) -> Self {
        self.config.keyboard_velocity = velocity;
        self
    }

    pub fn learned_cc_policy(mut self, policy: LearnedCcPolicy) -> Self {
        self.config.learned_cc_policy = policy;
        self
    }

    /// Output device index from [`termite_io::list_output_devices`].
    /// Default: the host's default device.
    pub fn output_device(mut self, index: usize) -> Self {
        self.output_device = Some(index);
        self
    }

    pub fn midi(mut self, enabled: bool) -> Self {
        self.enable_midi = enabled;
        self
    }

    /// Validates the config and populates the session from `engine`.
    /// Nothing is opened until [`Termite::run`].
    pub fn build<E: SoundEngine + 'static>(
        self,
        engine: E,
        display: Arc<dyn Display>,
    ) -> Result<Termite<E>> {
        let output = OutputConfig::from_session(&self.config, self.output_device);
        let session = Session::new(engine, display, self.config)?;
        Ok(Termite::new(Arc::new(session), output, self.enable_midi))
    }
}
