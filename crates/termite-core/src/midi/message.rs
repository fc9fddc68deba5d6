//! Raw MIDI byte triplets and their classification.

use crate::control::MIDI_DATA_MAX;

/// First Note Off status byte (channel 1); Note Off spans 128..144.
pub const NOTE_OFF_STATUS: u8 = 0x80;
/// First Note On status byte (channel 1); Note On spans 144..160.
pub const NOTE_ON_STATUS: u8 = 0x90;
/// Pitch bend, channel 1 only.
pub const PITCH_BEND_STATUS: u8 = 0xE0;
/// Control change, channel 1 only.
pub const SUSTAIN_STATUS: u8 = 0xB0;
/// Controller id of the sustain pedal.
pub const SUSTAIN_CONTROLLER: u8 = 64;
/// Status bytes at or above this never complete a MIDI learn.
pub const LEARN_STATUS_LIMIT: u8 = 254;

/// A message of at least three bytes. Data bytes are masked to 7 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

/// What a raw message means to the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    NoteOn { pitch: u8, velocity: f32 },
    NoteOff { pitch: u8 },
    PitchBend { value: u8 },
    Sustain { on: bool },
    /// Anything else: a candidate for MIDI learn and learned bindings.
    Other,
}

impl RawMessage {
    /// `None` for messages shorter than three bytes.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [status, data1, data2, ..] => Some(Self {
                status: *status,
                data1: data1 & MIDI_DATA_MAX,
                data2: data2 & MIDI_DATA_MAX,
            }),
            _ => None,
        }
    }

    /// Note On with velocity 0 is a Note Off; velocity scales as `data2 / 128`.
    #[inline]
    pub fn classify(&self) -> MidiMessage {
        match self.status {
            NOTE_ON_STATUS..=0x9F => {
                if self.data2 != 0 {
                    MidiMessage::NoteOn {
                        pitch: self.data1,
                        velocity: self.data2 as f32 / 128.0,
                    }
                } else {
                    MidiMessage::NoteOff { pitch: self.data1 }
                }
            }
            NOTE_OFF_STATUS..=0x8F => MidiMessage::NoteOff { pitch: self.data1 },
            PITCH_BEND_STATUS => MidiMessage::PitchBend { value: self.data2 },
            SUSTAIN_STATUS if self.data1 == SUSTAIN_CONTROLLER => MidiMessage::Sustain {
                on: self.data2 != 0,
            },
            _ => MidiMessage::Other,
        }
    }

    /// Whether this message may complete a pending MIDI learn.
    #[inline]
    pub fn can_learn(&self) -> bool {
        self.status < LEARN_STATUS_LIMIT
    }
}
