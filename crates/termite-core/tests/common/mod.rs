//! Shared fixtures for termite-core integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use termite_core::prelude::*;
use termite_core::ControlView;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    NoteOn(u8, f32),
    NoteOff(u8),
    SustainOn,
    SustainOff,
}

/// Engine that records note events and exposes its parameter cells.
pub struct TestEngine {
    pub events: Arc<Mutex<Vec<Event>>>,
    pub params: Vec<(String, Arc<AtomicFloat>)>,
    pub bend: Arc<AtomicFloat>,
    pub blocks: Arc<AtomicUsize>,
}

impl TestEngine {
    pub fn new() -> Self {
        let params = ["volume", "cutoff", "resonance", "attack", "release"]
            .into_iter()
            .map(|name| (name.to_string(), Arc::new(AtomicFloat::default())))
            .collect();
        Self {
            events: Arc::default(),
            params,
            bend: Arc::new(AtomicFloat::default()),
            blocks: Arc::default(),
        }
    }

    pub fn param(&self, name: &str) -> Arc<AtomicFloat> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| Arc::clone(cell))
            .unwrap()
    }
}

impl SoundEngine for TestEngine {
    fn set_sample_rate(&mut self, _sample_rate: u32) {}

    fn controls(&self) -> Vec<ControlSpec> {
        let ranges = [(0.0, 1.0, 100), (20.0, 20000.0, 127), (0.0, 4.0, 8), (0.001, 2.0, 64), (0.01, 5.0, 3)];
        self.params
            .iter()
            .zip(ranges)
            .map(|((name, cell), (min, max, res))| {
                ControlSpec::new(name.as_str(), min, max, min, res, Arc::clone(cell) as Arc<dyn ParamSink>)
            })
            .collect()
    }

    fn pitch_bend(&self) -> ControlSpec {
        ControlSpec::new("pitch_bend", -1.0, 1.0, 0.0, 127, Arc::clone(&self.bend) as Arc<dyn ParamSink>)
    }

    fn note_on(&mut self, pitch: u8, velocity: f32) {
        self.events.lock().push(Event::NoteOn(pitch, velocity));
    }

    fn note_off(&mut self, pitch: u8) {
        self.events.lock().push(Event::NoteOff(pitch));
    }

    fn sustain_on(&mut self) {
        self.events.lock().push(Event::SustainOn);
    }

    fn sustain_off(&mut self) {
        self.events.lock().push(Event::SustainOff);
    }

    fn render(&mut self, out: &mut [f32]) {
        out.fill(0.25);
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }
}

/// Display that only counts draws.
#[derive(Default)]
pub struct CountingDisplay {
    pub controls: AtomicUsize,
    pub statuses: AtomicUsize,
}

impl Display for CountingDisplay {
    fn draw_control(&self, _control: &ControlView, _highlighted: bool) {
        self.controls.fetch_add(1, Ordering::Relaxed);
    }

    fn draw_control_status(&self, _control: &ControlView, _learn_armed: bool) {
        self.statuses.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct Fixture {
    pub session: Arc<Session<TestEngine>>,
    pub events: Arc<Mutex<Vec<Event>>>,
    pub cells: Vec<(String, Arc<AtomicFloat>)>,
    pub bend: Arc<AtomicFloat>,
    pub blocks: Arc<AtomicUsize>,
    pub display: Arc<CountingDisplay>,
}

pub fn fixture(config: TermiteConfig) -> Fixture {
    let engine = TestEngine::new();
    let events = Arc::clone(&engine.events);
    let cells = engine.params.clone();
    let bend = Arc::clone(&engine.bend);
    let blocks = Arc::clone(&engine.blocks);
    let display = Arc::new(CountingDisplay::default());
    let session = Session::new(engine, display.clone(), config).expect("valid session");
    Fixture {
        session: Arc::new(session),
        events,
        cells,
        bend,
        blocks,
        display,
    }
}

impl Fixture {
    pub fn cell(&self, name: &str) -> f32 {
        self.cells
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| cell.get())
            .unwrap()
    }

    pub fn value(&self, name: &str) -> f32 {
        self.session
            .with_state(|s| s.registry().get(name).map(|c| c.value()).unwrap())
    }

    pub fn binding(&self, name: &str) -> Option<u8> {
        self.session
            .with_state(|s| s.registry().get(name).and_then(|c| c.midi_learn()))
    }

    pub fn selected(&self) -> String {
        self.session
            .with_state(|s| s.registry().selected().name().to_string())
    }
}
