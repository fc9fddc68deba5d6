//! Named, bounded, quantized synthesis parameters.
//!
//! A [`Control`] owns the user-facing value of one sound-engine parameter and
//! forwards every committed change to the engine through its [`ParamSink`].
//!
//! # Quantization
//!
//! A 7-bit MIDI value is mapped onto `resolution` equal steps:
//!
//! ```
//! use termite_core::control::quantize_cc;
//!
//! // 4 steps over [0, 1]: 0.0, 0.25, 0.5, 0.75, 1.0
//! assert_eq!(quantize_cc(0, 0.0, 1.0, 4), 0.0);
//! assert_eq!(quantize_cc(64, 0.0, 1.0, 4), 0.5);
//! assert_eq!(quantize_cc(127, 0.0, 1.0, 4), 1.0);
//! ```

use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Largest value carried by a MIDI data byte.
pub const MIDI_DATA_MAX: u8 = 127;

/// MIDI controller id (0-127).
pub type ControllerId = u8;

/// Receiver in the sound engine for a control's clamped value.
pub trait ParamSink: Send + Sync {
    fn set(&self, value: f32);
}

/// Map a MIDI data value into `[min, max]` using `resolution` discrete steps.
///
/// `index = floor(resolution * cc / 127)`, `value = min + index * (max - min) / resolution`.
/// CC 0 yields `min`, CC 127 yields exactly `max`, and the result never decreases
/// as `cc` grows.
pub fn quantize_cc(cc: u8, min: f32, max: f32, resolution: u32) -> f32 {
    let cc = cc.min(MIDI_DATA_MAX) as u64;
    let resolution = resolution.max(1);
    let index = (resolution as u64 * cc / MIDI_DATA_MAX as u64) as u32;
    if index >= resolution {
        return max;
    }
    let value = min + index as f32 * (max - min) / resolution as f32;
    value.clamp(min, max)
}

/// Map a pitch-bend data byte to `[-1, 1]` as `2 * value / 127 - 1`.
///
/// The midpoint is not exactly zero: 64 maps to `1/127`.
#[inline]
pub fn pitch_bend_value(value: u8) -> f32 {
    (2.0 * value.min(MIDI_DATA_MAX) as f32) / MIDI_DATA_MAX as f32 - 1.0
}

/// What the sound engine declares about one of its parameters.
#[derive(Clone)]
pub struct ControlSpec {
    pub name: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Number of steps `[min, max]` is divided into.
    pub resolution: u32,
    pub sink: Arc<dyn ParamSink>,
}

impl ControlSpec {
    pub fn new(
        name: impl Into<String>,
        min: f32,
        max: f32,
        default: f32,
        resolution: u32,
        sink: Arc<dyn ParamSink>,
    ) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            default,
            resolution,
            sink,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidControl {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if !self.min.is_finite() || !self.max.is_finite() || !self.default.is_finite() {
            return Err(invalid("non-finite bound or default"));
        }
        if self.min > self.max {
            return Err(invalid("min is greater than max"));
        }
        if self.resolution == 0 {
            return Err(invalid("resolution must be positive"));
        }
        Ok(())
    }
}

impl fmt::Debug for ControlSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSpec")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("default", &self.default)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

/// A live parameter. `min <= current_value <= max` holds after every mutation.
pub struct Control {
    name: Arc<str>,
    current_value: f32,
    min: f32,
    max: f32,
    resolution: u32,
    midi_learn: Option<ControllerId>,
    sink: Arc<dyn ParamSink>,
}

impl Control {
    pub(crate) fn from_spec(spec: ControlSpec) -> Result<Self> {
        spec.validate()?;
        let control = Self {
            name: Arc::from(spec.name),
            current_value: spec.default.clamp(spec.min, spec.max),
            min: spec.min,
            max: spec.max,
            resolution: spec.resolution,
            midi_learn: None,
            sink: spec.sink,
        };
        control.push();
        Ok(control)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f32 {
        self.current_value
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn midi_learn(&self) -> Option<ControllerId> {
        self.midi_learn
    }

    pub(crate) fn set_midi_learn(&mut self, id: Option<ControllerId>) {
        self.midi_learn = id;
    }

    /// Size of one quantization step.
    #[inline]
    pub fn step(&self) -> f32 {
        (self.max - self.min) / self.resolution as f32
    }

    /// Moves the value by whole steps. Not clamped until [`Control::commit`].
    #[inline]
    pub(crate) fn nudge(&mut self, steps: i32) {
        self.current_value += steps as f32 * self.step();
    }

    /// Clamps the value into range and pushes it to the sink.
    #[inline]
    pub(crate) fn commit(&mut self) {
        if self.current_value.is_nan() {
            self.current_value = self.min;
        }
        self.current_value = self.current_value.clamp(self.min, self.max);
        self.push();
    }

    /// Sets, clamps and pushes.
    #[inline]
    pub(crate) fn set_value(&mut self, value: f32) {
        self.current_value = value;
        self.commit();
    }

    /// Applies a CC value through the quantizer.
    #[inline]
    pub(crate) fn apply_cc(&mut self, cc: u8) {
        self.set_value(quantize_cc(cc, self.min, self.max, self.resolution));
    }

    #[inline]
    fn push(&self) {
        self.sink.set(self.current_value);
    }

    /// Copy of the fields a display needs. Does not allocate.
    pub fn view(&self) -> ControlView {
        ControlView {
            name: Arc::clone(&self.name),
            value: self.current_value,
            min: self.min,
            max: self.max,
            resolution: self.resolution,
            midi_learn: self.midi_learn,
        }
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("name", &self.name)
            .field("current_value", &self.current_value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("resolution", &self.resolution)
            .field("midi_learn", &self.midi_learn)
            .finish_non_exhaustive()
    }
}

/// Detached view of a control, taken under the gate and drawn after release.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlView {
    pub name: Arc<str>,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub resolution: u32,
    pub midi_learn: Option<ControllerId>,
}
