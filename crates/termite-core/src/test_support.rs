//! Recording engine and display for unit tests.

use crate::control::{ControlSpec, ControlView};
use crate::engine::{Display, SoundEngine};
use crate::{AtomicFloat, Session, TermiteConfig};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock, Weak};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    NoteOn(u8, f32),
    NoteOff(u8),
    SustainOn,
    SustainOff,
}

#[derive(Clone, Default)]
pub struct EngineLog(Arc<Mutex<Vec<EngineEvent>>>);

impl EngineLog {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.0.lock().clone()
    }

    fn push(&self, event: EngineEvent) {
        self.0.lock().push(event);
    }
}

/// Renders a running sample counter so fan-out can be checked.
pub struct RecordingEngine {
    log: EngineLog,
    counter: f32,
}

impl SoundEngine for RecordingEngine {
    fn set_sample_rate(&mut self, _sample_rate: u32) {}

    fn controls(&self) -> Vec<ControlSpec> {
        vec![
            ControlSpec::new("volume", 0.0, 1.0, 0.5, 10, Arc::new(AtomicFloat::default())),
            ControlSpec::new("cutoff", 0.0, 1.0, 0.0, 4, Arc::new(AtomicFloat::default())),
            ControlSpec::new("decay", 0.1, 2.0, 0.5, 19, Arc::new(AtomicFloat::default())),
        ]
    }

    fn pitch_bend(&self) -> ControlSpec {
        ControlSpec::new("pitch_bend", -1.0, 1.0, 0.0, 127, Arc::new(AtomicFloat::default()))
    }

    fn note_on(&mut self, pitch: u8, velocity: f32) {
        self.log.push(EngineEvent::NoteOn(pitch, velocity));
    }

    fn note_off(&mut self, pitch: u8) {
        self.log.push(EngineEvent::NoteOff(pitch));
    }

    fn sustain_on(&mut self) {
        self.log.push(EngineEvent::SustainOn);
    }

    fn sustain_off(&mut self) {
        self.log.push(EngineEvent::SustainOff);
    }

    fn render(&mut self, out: &mut [f32]) {
        for sample in out {
            *sample = self.counter;
            self.counter += 1.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub name: String,
    /// Status line rather than the control itself.
    pub status: bool,
    /// `highlighted` for controls, `learn_armed` for status lines.
    pub flag: bool,
    pub value: f32,
}

/// Records draws and asserts none happens while the session's gate is held.
#[derive(Default)]
pub struct RecordingDisplay {
    draws: Mutex<Vec<Draw>>,
    session: OnceLock<Weak<Session<RecordingEngine>>>,
}

impl RecordingDisplay {
    pub fn draws(&self) -> Vec<Draw> {
        self.draws.lock().clone()
    }

    pub fn clear(&self) {
        self.draws.lock().clear();
    }

    fn attach(&self, session: &Arc<Session<RecordingEngine>>) {
        let _ = self.session.set(Arc::downgrade(session));
    }

    fn record(&self, control: &ControlView, status: bool, flag: bool) {
        if let Some(session) = self.session.get().and_then(Weak::upgrade) {
            assert!(
                !session.gate().is_held(),
                "'{}' drawn while the gate is held",
                control.name
            );
        }
        self.draws.lock().push(Draw {
            name: control.name.to_string(),
            status,
            flag,
            value: control.value,
        });
    }
}

impl Display for RecordingDisplay {
    fn draw_control(&self, control: &ControlView, highlighted: bool) {
        self.record(control, false, highlighted);
    }

    fn draw_control_status(&self, control: &ControlView, learn_armed: bool) {
        self.record(control, true, learn_armed);
    }
}

pub fn session_with(
    config: TermiteConfig,
) -> (Arc<Session<RecordingEngine>>, EngineLog, Arc<RecordingDisplay>) {
    let log = EngineLog::default();
    let display = Arc::new(RecordingDisplay::default());
    let engine = RecordingEngine {
        log: log.clone(),
        counter: 0.0,
    };
    let session = Arc::new(Session::new(engine, display.clone(), config).unwrap());
    display.attach(&session);
    (session, log, display)
}

pub fn session() -> (Arc<Session<RecordingEngine>>, EngineLog, Arc<RecordingDisplay>) {
    session_with(TermiteConfig::default())
}
