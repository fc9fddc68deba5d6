//! Complete, ordered enumeration of control state for an external serializer,
//! and the inverse operation that applies one back onto a session.

use crate::control::ControllerId;
use crate::engine::SoundEngine;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Saved state of one navigable control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub name: Arc<str>,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub resolution: u32,
    pub midi_learn: Option<ControllerId>,
}

/// Every navigable control, in navigation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub controls: Vec<ControlState>,
}

/// What [`Session::restore`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Controls whose value (and binding) were applied.
    pub applied: usize,
    /// Restored values that had to be clamped into range.
    pub clamped: usize,
    /// Names in the snapshot this session does not have.
    pub unknown: Vec<Arc<str>>,
    /// Entries whose learn id was rejected.
    pub invalid_bindings: Vec<Arc<str>>,
}

impl<E: SoundEngine> Session<E> {
    /// Enumerates all navigable controls. The pitch-bend control is transient
    /// and not included.
    pub fn snapshot(&self) -> Snapshot {
        let mut controls = Vec::with_capacity(self.control_count());
        {
            let state = self.gate().acquire();
            controls.extend(state.registry.iter().map(|control| ControlState {
                name: Arc::clone(&control.view().name),
                value: control.value(),
                min: control.min(),
                max: control.max(),
                resolution: control.resolution(),
                midi_learn: control.midi_learn(),
            }));
        }
        Snapshot { controls }
    }

    /// Applies a snapshot. Values are clamped into each control's own range
    /// (the snapshot's bounds are informational), pushed to the sinks, and
    /// learn bindings are installed through the binder or erased when unset.
    pub fn restore(&self, snapshot: &Snapshot) -> RestoreReport {
        let mut report = RestoreReport {
            unknown: Vec::with_capacity(snapshot.controls.len()),
            invalid_bindings: Vec::with_capacity(snapshot.controls.len()),
            ..Default::default()
        };

        {
            let mut guard = self.gate().acquire();
            let registry = &mut guard.registry;
            for saved in &snapshot.controls {
                let Some(id) = registry.id_of(&saved.name).filter(|id| *id != registry.pitch_bend_id())
                else {
                    report.unknown.push(Arc::clone(&saved.name));
                    continue;
                };

                let control = registry.control_mut(id);
                let value = if saved.value.is_nan() {
                    control.min()
                } else {
                    saved.value
                };
                if !(control.min()..=control.max()).contains(&value) {
                    report.clamped += 1;
                }
                control.set_value(value);

                match saved.midi_learn {
                    Some(cc) => {
                        if registry.bind(id, cc).is_err() {
                            report.invalid_bindings.push(Arc::clone(&saved.name));
                        }
                    }
                    None => {
                        registry.erase(id);
                    }
                }
                report.applied += 1;
            }
        }

        for name in &report.unknown {
            tracing::warn!("Snapshot names unknown control '{}'", name);
        }
        for name in &report.invalid_bindings {
            tracing::warn!("Snapshot has an invalid CC binding for '{}'", name);
        }
        report
    }
}
