//! Session context shared by the audio, MIDI and keyboard threads.
//!
//! All mutable shared state (registry, selection, learn map, mode and the
//! engine itself) lives in one [`SessionState`] behind the session's [`Gate`],
//! so every handler receives it explicitly instead of reaching for globals.

use crate::engine::{Display, Redraw, SoundEngine};
use crate::gate::Gate;
use crate::registry::ControlRegistry;
use crate::{Result, TermiteConfig};
use std::sync::Arc;

/// How the next unclaimed MIDI message is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Standard,
    /// The next unclaimed message binds its controller id to the selected control.
    MidiLearn,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Standard => Mode::MidiLearn,
            Mode::MidiLearn => Mode::Standard,
        }
    }

    pub fn is_learning(self) -> bool {
        self == Mode::MidiLearn
    }
}

/// Everything guarded by the gate.
pub struct SessionState<E> {
    pub(crate) registry: ControlRegistry,
    pub(crate) mode: Mode,
    pub(crate) engine: E,
}

impl<E> SessionState<E> {
    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

/// Owns the gate and the collaborators every entry point shares.
///
/// Build one per run, wrap it in an `Arc`, and hand clones to the
/// [`AudioPump`](crate::AudioPump), each [`MidiRouter`](crate::MidiRouter) and
/// the [`InputDispatcher`](crate::InputDispatcher).
pub struct Session<E: SoundEngine> {
    gate: Gate<SessionState<E>>,
    display: Arc<dyn Display>,
    config: TermiteConfig,
    control_count: usize,
}

impl<E: SoundEngine> Session<E> {
    /// Validates the config and populates the registry from the engine.
    ///
    /// Must run before any audio, MIDI or keyboard thread starts.
    pub fn new(mut engine: E, display: Arc<dyn Display>, config: TermiteConfig) -> Result<Self> {
        config.validate()?;
        engine.set_sample_rate(config.sample_rate);
        let registry = ControlRegistry::new(engine.controls(), engine.pitch_bend())?;

        tracing::debug!(
            "Session created with {} controls at {} Hz",
            registry.len(),
            config.sample_rate
        );

        let control_count = registry.len();
        Ok(Self {
            control_count,
            gate: Gate::new(SessionState {
                registry,
                mode: Mode::Standard,
                engine,
            }),
            display,
            config,
        })
    }

    pub fn gate(&self) -> &Gate<SessionState<E>> {
        &self.gate
    }

    pub fn config(&self) -> &TermiteConfig {
        &self.config
    }

    pub fn display(&self) -> &dyn Display {
        self.display.as_ref()
    }

    /// Number of navigable controls; fixed for the session's lifetime.
    pub fn control_count(&self) -> usize {
        self.control_count
    }

    pub fn mode(&self) -> Mode {
        self.gate.acquire().mode
    }

    /// Read access to the guarded state for the duration of `f`.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState<E>) -> R) -> R {
        let state = self.gate.acquire();
        f(&state)
    }

    /// Draws every control once, in navigation order with the pitch-bend
    /// control last, highlighting the selection, then its status line.
    pub fn draw_all(&self) {
        let mut redraws = Vec::with_capacity(self.control_count + 2);
        {
            let state = self.gate.acquire();
            let registry = &state.registry;
            let selected = registry.selected();
            for control in registry.iter() {
                redraws.push(Redraw::Control {
                    view: control.view(),
                    highlighted: Arc::ptr_eq(control.shared_name(), selected.shared_name()),
                });
            }
            redraws.push(Redraw::Control {
                view: registry.pitch_bend().view(),
                highlighted: false,
            });
            redraws.push(Redraw::Status {
                view: selected.view(),
                learn_armed: state.mode.is_learning(),
            });
        }
        for redraw in &redraws {
            redraw.apply(self.display());
        }
    }

    /// Runs [`ControlRegistry::verify`] under the gate.
    pub fn verify(&self) -> Result<()> {
        self.gate.acquire().registry.verify()
    }

    /// Tears the session down once every producer has been stopped.
    pub fn into_engine(self) -> E {
        self.gate.into_inner().engine
    }
}
