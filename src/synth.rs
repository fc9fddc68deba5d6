//! A small polyphonic pluck synth used by the `termite` binary.
//!
//! Two detuned saws per voice through a one-pole low-pass, shaped by an
//! attack/decay/release envelope. Parameters arrive through [`AtomicFloat`]
//! sinks and are read once per rendered block.

use std::f32::consts::TAU;
use std::sync::Arc;
use termite_core::{AtomicFloat, ControlSpec, SoundEngine};

const MAX_VOICES: usize = 16;
const SILENCE: f32 = 1.0e-4;
const BEND_SEMITONES: f32 = 2.0;

#[derive(Debug, Default)]
struct Params {
    volume: Arc<AtomicFloat>,
    cutoff: Arc<AtomicFloat>,
    attack: Arc<AtomicFloat>,
    decay: Arc<AtomicFloat>,
    release: Arc<AtomicFloat>,
    detune: Arc<AtomicFloat>,
    bend: Arc<AtomicFloat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Release,
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    pitch: u8,
    velocity: f32,
    stage: Stage,
    /// Key is up but the sustain pedal is holding the note.
    sustained: bool,
    env: f32,
    phase: [f32; 2],
    lowpass: f32,
    age: u64,
}

impl Voice {
    const IDLE: Voice = Voice {
        pitch: 0,
        velocity: 0.0,
        stage: Stage::Idle,
        sustained: false,
        env: 0.0,
        phase: [0.0; 2],
        lowpass: 0.0,
        age: 0,
    };

    fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    fn release(&mut self) {
        if self.is_active() {
            self.stage = Stage::Release;
            self.sustained = false;
        }
    }
}

/// Per-block coefficients derived from the parameter sinks.
struct Block {
    volume: f32,
    lowpass: f32,
    attack_step: f32,
    decay: f32,
    release: f32,
    detune: f32,
    bend: f32,
}

/// Reference [`SoundEngine`]: controls `volume`, `cutoff`, `attack`, `decay`,
/// `release`, `detune` and a ±2 semitone `pitch_bend`.
pub struct PluckSynth {
    params: Params,
    sample_rate: f32,
    voices: [Voice; MAX_VOICES],
    sustain: bool,
    clock: u64,
}

impl Default for PluckSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl PluckSynth {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            sample_rate: 44100.0,
            voices: [Voice::IDLE; MAX_VOICES],
            sustain: false,
            clock: 0,
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn is_sustaining(&self) -> bool {
        self.sustain
    }

    fn block(&self) -> Block {
        let sr = self.sample_rate;
        let p = &self.params;
        let cutoff = p.cutoff.get().clamp(20.0, sr * 0.45);
        Block {
            volume: p.volume.get(),
            lowpass: 1.0 - (-TAU * cutoff / sr).exp(),
            attack_step: 1.0 / (p.attack.get().max(1.0e-4) * sr),
            decay: (-1.0 / (p.decay.get().max(1.0e-3) * sr)).exp(),
            release: (-1.0 / (p.release.get().max(1.0e-3) * sr)).exp(),
            detune: 2f32.powf(p.detune.get() / 1200.0),
            bend: 2f32.powf(p.bend.get() * BEND_SEMITONES / 12.0),
        }
    }

    /// Slot for a new note: a free voice, else the oldest one.
    fn allocate(&mut self) -> usize {
        if let Some(i) = self.voices.iter().position(|v| !v.is_active()) {
            return i;
        }
        let mut oldest = 0;
        for (i, voice) in self.voices.iter().enumerate() {
            if voice.age < self.voices[oldest].age {
                oldest = i;
            }
        }
        oldest
    }
}

fn frequency(pitch: u8) -> f32 {
    440.0 * 2f32.powf((pitch as f32 - 69.0) / 12.0)
}

impl SoundEngine for PluckSynth {
    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate as f32;
    }

    fn controls(&self) -> Vec<ControlSpec> {
        let p = &self.params;
        vec![
            ControlSpec::new("volume", 0.0, 1.0, 0.5, 100, p.volume.clone()),
            ControlSpec::new("cutoff", 100.0, 12000.0, 4000.0, 127, p.cutoff.clone()),
            ControlSpec::new("attack", 0.001, 1.0, 0.005, 100, p.attack.clone()),
            ControlSpec::new("decay", 0.05, 4.0, 0.8, 100, p.decay.clone()),
            ControlSpec::new("release", 0.01, 4.0, 0.3, 100, p.release.clone()),
            ControlSpec::new("detune", 0.0, 50.0, 5.0, 50, p.detune.clone()),
        ]
    }

    fn pitch_bend(&self) -> ControlSpec {
        ControlSpec::new("pitch_bend", -1.0, 1.0, 0.0, 127, self.params.bend.clone())
    }

    fn note_on(&mut self, pitch: u8, velocity: f32) {
        self.clock += 1;
        let slot = self.allocate();
        self.voices[slot] = Voice {
            pitch,
            velocity,
            stage: Stage::Attack,
            age: self.clock,
            ..Voice::IDLE
        };
    }

    fn note_off(&mut self, pitch: u8) {
        let sustain = self.sustain;
        for voice in self.voices.iter_mut().filter(|v| v.pitch == pitch && v.is_active()) {
            if voice.stage == Stage::Release {
                continue;
            }
            if sustain {
                voice.sustained = true;
            } else {
                voice.release();
            }
        }
    }

    fn sustain_on(&mut self) {
        self.sustain = true;
    }

    fn sustain_off(&mut self) {
        self.sustain = false;
        for voice in self.voices.iter_mut().filter(|v| v.sustained) {
            voice.release();
        }
    }

    fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let block = self.block();
        let sr = self.sample_rate;

        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            let base = frequency(voice.pitch) * block.bend / sr;
            let increments = [base, base * block.detune];

            for sample in out.iter_mut() {
                match voice.stage {
                    Stage::Attack => {
                        voice.env += block.attack_step;
                        if voice.env >= 1.0 {
                            voice.env = 1.0;
                            voice.stage = Stage::Decay;
                        }
                    }
                    Stage::Decay => voice.env *= block.decay,
                    Stage::Release => voice.env *= block.release,
                    Stage::Idle => break,
                }
                if voice.stage != Stage::Attack && voice.env < SILENCE {
                    *voice = Voice::IDLE;
                    break;
                }

                let mut saw = 0.0;
                for (phase, inc) in voice.phase.iter_mut().zip(increments) {
                    saw += 2.0 * *phase - 1.0;
                    *phase = (*phase + inc).fract();
                }
                voice.lowpass += block.lowpass * (0.5 * saw - voice.lowpass);
                *sample += voice.lowpass * voice.env * voice.velocity;
            }
        }

        for sample in out.iter_mut() {
            *sample = (*sample * block.volume).clamp(-1.0, 1.0);
        }
    }
}
