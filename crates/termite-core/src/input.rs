//! Foreground keyboard loop: selection, value steps, learn toggling and notes.

use crate::engine::{flush_redraws, Redraw, Redraws, SoundEngine};
use crate::session::{Mode, Session};
use std::sync::Arc;

/// One key press, as delivered by a [`KeySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    /// Ends the session.
    Exit,
    Other,
}

/// Blocking supplier of key presses.
pub trait KeySource {
    /// Waits for the next key. `None` means the source is closed.
    fn read_key(&mut self) -> Option<Key>;
}

/// Fixed ordered keys that play ascending pitches from a base pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    keys: Vec<char>,
    base_pitch: u8,
}

impl KeyLayout {
    pub fn new(keys: &str, base_pitch: u8) -> Self {
        Self {
            keys: keys.chars().collect(),
            base_pitch,
        }
    }

    /// `base_pitch + position` of `key` in the layout.
    pub fn pitch_for(&self, key: char) -> Option<u8> {
        self.keys
            .iter()
            .position(|&k| k == key)
            .and_then(|index| u8::try_from(self.base_pitch as usize + index).ok())
    }
}

/// Drives the session from the computer keyboard.
pub struct InputDispatcher<E: SoundEngine> {
    session: Arc<Session<E>>,
    layout: KeyLayout,
    toggle_key: char,
    clear_key: char,
    velocity: f32,
}

impl<E: SoundEngine> InputDispatcher<E> {
    pub fn new(session: Arc<Session<E>>) -> Self {
        let config = session.config();
        let layout = KeyLayout::new(&config.keyboard_layout, config.base_pitch);
        let toggle_key = config.learn_toggle_key;
        let clear_key = config.learn_clear_key;
        let velocity = config.keyboard_velocity;
        Self {
            session,
            layout,
            toggle_key,
            clear_key,
            velocity,
        }
    }

    /// Reads and handles keys until the exit key arrives or the source closes.
    pub fn run(&mut self, keys: &mut dyn KeySource) {
        while let Some(key) = keys.read_key() {
            if !self.handle_key(key) {
                break;
            }
        }
        tracing::debug!("Input loop finished");
    }

    /// Handles one key. Returns `false` for the exit key.
    ///
    /// After every key the selected control is clamped, pushed to its sink and
    /// redrawn highlighted, with a status line showing whether learn is armed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if key == Key::Exit {
            return false;
        }
        let pitch = match key {
            Key::Char(c) if c != self.toggle_key && c != self.clear_key => self.layout.pitch_for(c),
            _ => None,
        };

        let mut redraws = Redraws::new();
        let mut cleared = None;
        {
            let mut guard = self.session.gate().acquire();
            let state = &mut *guard;

            match key {
                Key::Char(c) if c == self.toggle_key => state.mode = state.mode.toggled(),
                Key::Char(c) if c == self.clear_key => {
                    let selected = state.registry.selected_id();
                    cleared = state
                        .registry
                        .erase(selected)
                        .map(|id| (state.registry.control(selected).view().name, id));
                    state.mode = Mode::Standard;
                }
                Key::Up | Key::Down => {
                    let old = if key == Key::Up {
                        state.registry.select_prev()
                    } else {
                        state.registry.select_next()
                    };
                    redraws.push(Redraw::Control {
                        view: state.registry.control(old).view(),
                        highlighted: false,
                    });
                }
                Key::Right => state.registry.selected_mut().nudge(1),
                Key::Left => state.registry.selected_mut().nudge(-1),
                Key::Char(_) => {
                    if let Some(pitch) = pitch {
                        state.engine.note_on(pitch, self.velocity);
                    }
                }
                Key::Exit | Key::Other => {}
            }

            let learn_armed = state.mode.is_learning();
            let control = state.registry.selected_mut();
            control.commit();
            let view = control.view();
            redraws.push(Redraw::Control {
                view: view.clone(),
                highlighted: true,
            });
            redraws.push(Redraw::Status { view, learn_armed });
        }

        flush_redraws(self.session.display(), &redraws);

        if let Some((control, id)) = cleared {
            tracing::debug!("Cleared CC {} from '{}'", id, control);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, EngineEvent};
    use std::collections::VecDeque;

    struct Script(VecDeque<Key>);

    impl KeySource for Script {
        fn read_key(&mut self) -> Option<Key> {
            self.0.pop_front()
        }
    }

    #[test]
    fn test_layout_pitches() {
        let layout = KeyLayout::new("awsedftgyhujkolp;'", 48);
        assert_eq!(layout.pitch_for('a'), Some(48));
        assert_eq!(layout.pitch_for('w'), Some(49));
        assert_eq!(layout.pitch_for('\''), Some(65));
        assert_eq!(layout.pitch_for('z'), None);
    }

    #[test]
    fn test_layout_keys_trigger_notes() {
        let (session, log, _) = session();
        let mut input = InputDispatcher::new(session);
        assert!(input.handle_key(Key::Char('a')));
        assert!(input.handle_key(Key::Char('w')));
        assert!(input.handle_key(Key::Char('z')));
        assert_eq!(
            log.events(),
            vec![EngineEvent::NoteOn(48, 1.0), EngineEvent::NoteOn(49, 1.0)]
        );
    }

    #[test]
    fn test_toggle_and_clear_mode() {
        let (session, _, display) = session();
        let mut input = InputDispatcher::new(Arc::clone(&session));

        input.handle_key(Key::Char('m'));
        assert_eq!(session.mode(), Mode::MidiLearn);
        let status = display.draws().pop().unwrap();
        assert!(status.status && status.flag);

        input.handle_key(Key::Char('m'));
        assert_eq!(session.mode(), Mode::Standard);

        input.handle_key(Key::Char('m'));
        input.handle_key(Key::Char('c'));
        assert_eq!(session.mode(), Mode::Standard);
    }

    #[test]
    fn test_navigation_redraws() {
        let (session, _, display) = session();
        let mut input = InputDispatcher::new(Arc::clone(&session));

        input.handle_key(Key::Down);
        let draws = display.draws();
        assert_eq!(draws.len(), 3);
        assert_eq!((draws[0].name.as_str(), draws[0].flag), ("volume", false));
        assert_eq!((draws[1].name.as_str(), draws[1].flag), ("cutoff", true));
        assert!(draws[2].status);

        display.clear();
        input.handle_key(Key::Up);
        input.handle_key(Key::Up);
        assert_eq!(session.with_state(|s| s.registry().selected().name().to_string()), "decay");
    }

    #[test]
    fn test_value_steps_clamp() {
        let (session, _, _) = session();
        let mut input = InputDispatcher::new(Arc::clone(&session));
        input.handle_key(Key::Down); // cutoff: [0, 1] in 4 steps, starts at 0

        input.handle_key(Key::Right);
        assert_eq!(session.with_state(|s| s.registry().selected().value()), 0.25);
        for _ in 0..10 {
            input.handle_key(Key::Right);
        }
        assert_eq!(session.with_state(|s| s.registry().selected().value()), 1.0);
        input.handle_key(Key::Left);
        assert_eq!(session.with_state(|s| s.registry().selected().value()), 0.75);
        for _ in 0..10 {
            input.handle_key(Key::Left);
        }
        assert_eq!(session.with_state(|s| s.registry().selected().value()), 0.0);
    }

    #[test]
    fn test_redraws_follow_gate_release() {
        // The recording display fails on any draw made under the gate.
        let (session, _, display) = session();
        let mut input = InputDispatcher::new(Arc::clone(&session));
        let keys = [
            Key::Char('m'),
            Key::Char('c'),
            Key::Down,
            Key::Up,
            Key::Right,
            Key::Left,
            Key::Char('a'),
            Key::Other,
        ];
        for key in keys {
            input.handle_key(key);
        }

        // Two draws per key, plus the deselected control on each move.
        assert_eq!(display.draws().len(), keys.len() * 2 + 2);
    }

    #[test]
    fn test_run_stops_at_exit() {
        let (session, log, _) = session();
        let mut input = InputDispatcher::new(session);
        let mut keys = Script(VecDeque::from([Key::Char('a'), Key::Exit, Key::Char('w')]));

        input.run(&mut keys);

        assert_eq!(log.events(), vec![EngineEvent::NoteOn(48, 1.0)]);
        assert_eq!(keys.0.len(), 1);
    }
}
