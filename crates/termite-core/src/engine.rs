//! Interfaces to the collaborators the core drives but does not implement:
//! the sound engine that renders audio and the display that shows controls.

use crate::control::{ControlSpec, ControlView};
use smallvec::SmallVec;

/// The DSP engine rendering audio from control values.
///
/// Every method is called with the gate held, so implementations must not
/// block, allocate in `render`, or log.
pub trait SoundEngine: Send {
    fn set_sample_rate(&mut self, sample_rate: u32);

    /// Navigable parameters, in the order they should be browsed.
    fn controls(&self) -> Vec<ControlSpec>;

    /// The pitch-bend parameter, driven only by pitch-bend messages.
    fn pitch_bend(&self) -> ControlSpec;

    fn note_on(&mut self, pitch: u8, velocity: f32);

    fn note_off(&mut self, pitch: u8);

    fn sustain_on(&mut self);

    fn sustain_off(&mut self);

    /// Renders exactly `out.len()` mono samples.
    fn render(&mut self, out: &mut [f32]);
}

/// Draws controls. Called only after the gate has been released.
pub trait Display: Send + Sync {
    fn draw_control(&self, control: &ControlView, highlighted: bool);

    fn draw_control_status(&self, control: &ControlView, learn_armed: bool);
}

/// Display that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn draw_control(&self, _control: &ControlView, _highlighted: bool) {}

    fn draw_control_status(&self, _control: &ControlView, _learn_armed: bool) {}
}

/// A draw request recorded inside a critical section.
#[derive(Debug, Clone, PartialEq)]
pub enum Redraw {
    Control {
        view: ControlView,
        highlighted: bool,
    },
    Status {
        view: ControlView,
        learn_armed: bool,
    },
}

impl Redraw {
    pub fn apply(&self, display: &dyn Display) {
        match self {
            Redraw::Control { view, highlighted } => display.draw_control(view, *highlighted),
            Redraw::Status { view, learn_armed } => display.draw_control_status(view, *learn_armed),
        }
    }
}

/// Inline storage for the redraws of one event; no handler queues more than four.
pub type Redraws = SmallVec<[Redraw; 4]>;

/// Issues queued redraws, in order.
pub fn flush_redraws(display: &dyn Display, redraws: &Redraws) {
    for redraw in redraws {
        redraw.apply(display);
    }
}
