//! Session configuration.

use crate::{Error, Result};

/// Keys on the computer keyboard that play notes, lowest pitch first.
pub const DEFAULT_KEYBOARD_LAYOUT: &str = "awsedftgyhujkolp;'";

/// How a learned controller binding interacts with the dedicated MIDI branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearnedCcPolicy {
    /// Learned bindings only react to messages no dedicated branch
    /// (note, pitch bend, sustain) consumed.
    #[default]
    Exclusive,
    /// Learned bindings react to every message whose first data byte matches,
    /// even when a note, pitch-bend or sustain branch already handled it.
    Overlap,
}

/// Configuration for a termite session.
#[derive(Debug, Clone)]
pub struct TermiteConfig {
    pub sample_rate: u32,
    /// Frames rendered per audio block.
    pub block_size: usize,
    /// Output channels; the mono render is copied to each.
    pub channels: usize,
    /// MIDI pitch of the first key in `keyboard_layout`.
    pub base_pitch: u8,
    pub keyboard_layout: String,
    pub learn_toggle_key: char,
    pub learn_clear_key: char,
    /// Velocity used for notes played from the computer keyboard.
    pub keyboard_velocity: f32,
    pub learned_cc_policy: LearnedCcPolicy,
}

impl Default for TermiteConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 64,
            channels: 2,
            base_pitch: 48,
            keyboard_layout: DEFAULT_KEYBOARD_LAYOUT.to_string(),
            learn_toggle_key: 'm',
            learn_clear_key: 'c',
            keyboard_velocity: 1.0,
            learned_cc_policy: LearnedCcPolicy::Exclusive,
        }
    }
}

impl TermiteConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000..=384000).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.block_size == 0 || self.block_size > 8192 {
            return Err(Error::InvalidConfig(format!(
                "block_size {} out of range (1-8192 frames)",
                self.block_size
            )));
        }
        if self.channels == 0 {
            return Err(Error::InvalidConfig("channels must be at least 1".into()));
        }

        let keys: Vec<char> = self.keyboard_layout.chars().collect();
        if keys.is_empty() {
            return Err(Error::InvalidConfig("keyboard_layout is empty".into()));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(Error::InvalidConfig(format!(
                    "keyboard_layout repeats key '{key}'"
                )));
            }
        }
        if self.base_pitch as usize + keys.len() > 128 {
            return Err(Error::InvalidConfig(format!(
                "base_pitch {} + {} layout keys exceeds MIDI pitch range",
                self.base_pitch,
                keys.len()
            )));
        }

        if self.learn_toggle_key == self.learn_clear_key {
            return Err(Error::InvalidConfig(
                "learn toggle and clear keys must differ".into(),
            ));
        }
        for key in [self.learn_toggle_key, self.learn_clear_key] {
            if keys.contains(&key) {
                return Err(Error::InvalidConfig(format!(
                    "key '{key}' is used by both the note layout and a learn command"
                )));
            }
        }

        if !(self.keyboard_velocity > 0.0 && self.keyboard_velocity <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "keyboard_velocity {} out of range (0-1]",
                self.keyboard_velocity
            )));
        }
        Ok(())
    }
}
