//! MIDI-thread entry point and the learn-mode state machine.

use super::message::{MidiMessage, RawMessage};
use crate::config::LearnedCcPolicy;
use crate::control::{pitch_bend_value, ControllerId};
use crate::engine::{flush_redraws, Redraw, Redraws, SoundEngine};
use crate::session::{Mode, Session};
use std::sync::Arc;

/// A learn completed inside the critical section, logged after release.
struct Learned {
    control: Arc<str>,
    id: ControllerId,
    displaced: Option<Arc<str>>,
}

/// Dispatches inbound MIDI messages. Cheap to clone; give one to each input port.
pub struct MidiRouter<E: SoundEngine> {
    session: Arc<Session<E>>,
}

impl<E: SoundEngine> Clone for MidiRouter<E> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<E: SoundEngine> MidiRouter<E> {
    pub fn new(session: Arc<Session<E>>) -> Self {
        Self { session }
    }

    /// Handles one inbound message. Messages under three bytes are dropped
    /// silently.
    ///
    /// Note, pitch-bend and sustain messages go to the engine. Any other
    /// message completes a pending MIDI learn by binding its first data byte to
    /// the selected control. Then, if that controller id is learned, the second
    /// data byte is quantized onto the bound control (see [`LearnedCcPolicy`]
    /// for messages a dedicated branch already handled).
    pub fn route(&self, bytes: &[u8]) {
        let Some(raw) = RawMessage::from_bytes(bytes) else {
            return;
        };
        let policy = self.session.config().learned_cc_policy;

        let mut redraws = Redraws::new();
        let mut learned = None;
        {
            let mut guard = self.session.gate().acquire();
            let state = &mut *guard;
            let message = raw.classify();

            match message {
                MidiMessage::NoteOn { pitch, velocity } => state.engine.note_on(pitch, velocity),
                MidiMessage::NoteOff { pitch } => state.engine.note_off(pitch),
                MidiMessage::PitchBend { value } => {
                    let id = state.registry.pitch_bend_id();
                    let highlighted = state.registry.is_selected(id);
                    let control = state.registry.control_mut(id);
                    control.set_value(pitch_bend_value(value));
                    redraws.push(Redraw::Control {
                        view: control.view(),
                        highlighted,
                    });
                }
                MidiMessage::Sustain { on: true } => state.engine.sustain_on(),
                MidiMessage::Sustain { on: false } => state.engine.sustain_off(),
                MidiMessage::Other => {
                    if state.mode == Mode::MidiLearn && raw.can_learn() {
                        let target = state.registry.selected_id();
                        if let Ok(binding) = state.registry.bind(target, raw.data1) {
                            state.mode = Mode::Standard;
                            let view = state.registry.control(target).view();
                            learned = Some(Learned {
                                control: Arc::clone(&view.name),
                                id: raw.data1,
                                displaced: binding
                                    .displaced
                                    .map(|id| state.registry.control(id).view().name),
                            });
                            redraws.push(Redraw::Status {
                                view,
                                learn_armed: false,
                            });
                        }
                    }
                }
            }

            let apply_learned = match policy {
                LearnedCcPolicy::Exclusive => message == MidiMessage::Other,
                LearnedCcPolicy::Overlap => true,
            };
            if apply_learned {
                if let Some(id) = state.registry.bound(raw.data1) {
                    let highlighted = state.registry.is_selected(id);
                    let control = state.registry.control_mut(id);
                    control.apply_cc(raw.data2);
                    let view = control.view();
                    redraws.push(Redraw::Control {
                        view: view.clone(),
                        highlighted,
                    });
                    redraws.push(Redraw::Status {
                        view,
                        learn_armed: false,
                    });
                }
            }
        }

        flush_redraws(self.session.display(), &redraws);

        if let Some(learned) = learned {
            tracing::debug!("Learned CC {} for '{}'", learned.id, learned.control);
            if let Some(displaced) = learned.displaced {
                tracing::warn!(
                    "CC {} moved from '{}' to '{}'",
                    learned.id,
                    displaced,
                    learned.control
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, session_with, EngineEvent};
    use crate::TermiteConfig;

    #[test]
    fn test_note_dispatch() {
        let (session, log, _) = session();
        let router = MidiRouter::new(session);

        router.route(&[0x90, 60, 64]);
        router.route(&[0x90, 60, 0]);
        router.route(&[0x85, 61, 10]);

        assert_eq!(
            log.events(),
            vec![
                EngineEvent::NoteOn(60, 0.5),
                EngineEvent::NoteOff(60),
                EngineEvent::NoteOff(61),
            ]
        );
    }

    #[test]
    fn test_short_message_ignored() {
        let (session, log, display) = session();
        let router = MidiRouter::new(Arc::clone(&session));
        router.route(&[0x90, 60]);
        assert!(log.events().is_empty());
        assert!(display.draws().is_empty());
    }

    #[test]
    fn test_sustain() {
        let (session, log, _) = session();
        let router = MidiRouter::new(session);
        router.route(&[0xB0, 64, 127]);
        router.route(&[0xB0, 64, 0]);
        assert_eq!(log.events(), vec![EngineEvent::SustainOn, EngineEvent::SustainOff]);
    }

    #[test]
    fn test_pitch_bend_sets_control() {
        let (session, _, display) = session();
        let router = MidiRouter::new(Arc::clone(&session));

        router.route(&[0xE0, 0, 0]);
        assert_eq!(session.with_state(|s| s.registry().pitch_bend().value()), -1.0);
        router.route(&[0xE0, 0, 127]);
        assert_eq!(session.with_state(|s| s.registry().pitch_bend().value()), 1.0);
        router.route(&[0xE0, 0, 64]);
        assert_eq!(
            session.with_state(|s| s.registry().pitch_bend().value()),
            (2.0 * 64.0) / 127.0 - 1.0
        );

        let draws = display.draws();
        assert_eq!(draws.len(), 3);
        assert!(draws.iter().all(|d| d.name == "pitch_bend" && !d.status && !d.flag));
    }

    #[test]
    fn test_learn_binds_selected_and_applies_value() {
        let (session, _, display) = session();
        session.gate().acquire().mode = Mode::MidiLearn;
        let router = MidiRouter::new(Arc::clone(&session));

        router.route(&[0xB0, 21, 127]);

        session.with_state(|s| {
            let volume = s.registry().get("volume").unwrap();
            assert_eq!(s.mode(), Mode::Standard);
            assert_eq!(volume.midi_learn(), Some(21));
            assert_eq!(s.registry().bound(21), s.registry().id_of("volume"));
            assert_eq!(volume.value(), volume.max());
        });
        let draws = display.draws();
        assert_eq!(draws.len(), 3);
        assert!(draws[0].status);
        assert!(!draws[1].status && draws[1].flag);
    }

    #[test]
    fn test_redraws_follow_gate_release() {
        // The recording display fails on any draw made under the gate.
        let (session, _, display) = session();
        session.gate().acquire().mode = Mode::MidiLearn;
        let router = MidiRouter::new(Arc::clone(&session));

        router.route(&[0xB0, 30, 10]);
        router.route(&[0xB0, 30, 90]);
        router.route(&[0xE0, 0, 100]);

        assert_eq!(display.draws().len(), 3 + 2 + 1);
        assert!(!session.gate().is_held());
    }

    #[test]
    fn test_note_does_not_complete_learn() {
        let (session, log, _) = session();
        session.gate().acquire().mode = Mode::MidiLearn;
        let router = MidiRouter::new(Arc::clone(&session));

        router.route(&[0x90, 21, 100]);

        assert_eq!(session.mode(), Mode::MidiLearn);
        assert_eq!(session.with_state(|s| s.registry().bound(21)), None);
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn test_system_messages_do_not_learn() {
        let (session, _, _) = session();
        session.gate().acquire().mode = Mode::MidiLearn;
        let router = MidiRouter::new(Arc::clone(&session));
        router.route(&[0xFE, 5, 5]);
        assert_eq!(session.mode(), Mode::MidiLearn);
        assert_eq!(session.with_state(|s| s.registry().bound(5)), None);
    }

    #[test]
    fn test_learned_cc_quantized() {
        let (session, _, _) = session();
        let router = MidiRouter::new(Arc::clone(&session));
        {
            let mut state = session.gate().acquire();
            let cutoff = state.registry.id_of("cutoff").unwrap();
            state.registry.bind(cutoff, 74).unwrap();
        }

        router.route(&[0xB0, 74, 0]);
        assert_eq!(session.with_state(|s| s.registry().get("cutoff").unwrap().value()), 0.0);
        router.route(&[0xB0, 74, 64]);
        // resolution 4 over [0, 1]: floor(4 * 64 / 127) = 2
        assert_eq!(session.with_state(|s| s.registry().get("cutoff").unwrap().value()), 0.5);
        router.route(&[0xB0, 74, 127]);
        assert_eq!(session.with_state(|s| s.registry().get("cutoff").unwrap().value()), 1.0);
    }

    #[test]
    fn test_exclusive_policy_skips_dedicated_messages() {
        let (session, log, _) = session();
        let router = MidiRouter::new(Arc::clone(&session));
        session.gate().with(|state| {
            let cutoff = state.registry.id_of("cutoff").unwrap();
            state.registry.bind(cutoff, 64).unwrap();
        });

        router.route(&[0xB0, 64, 127]);

        assert_eq!(log.events(), vec![EngineEvent::SustainOn]);
        assert_eq!(session.with_state(|s| s.registry().get("cutoff").unwrap().value()), 0.0);
    }

    #[test]
    fn test_overlap_policy_applies_to_dedicated_messages() {
        let config = TermiteConfig {
            learned_cc_policy: LearnedCcPolicy::Overlap,
            ..Default::default()
        };
        let (session, log, _) = session_with(config);
        let router = MidiRouter::new(Arc::clone(&session));
        session.gate().with(|state| {
            let cutoff = state.registry.id_of("cutoff").unwrap();
            state.registry.bind(cutoff, 64).unwrap();
        });

        router.route(&[0xB0, 64, 127]);

        assert_eq!(log.events(), vec![EngineEvent::SustainOn]);
        assert_eq!(session.with_state(|s| s.registry().get("cutoff").unwrap().value()), 1.0);
    }
}
