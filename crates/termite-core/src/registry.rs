//! Control registry: lookup by name, wrapping navigation, the current
//! selection, the pitch-bend control and the MIDI-learn reverse map.
//!
//! The registry owns every [`Control`]. The learn map only associates a
//! controller id with a [`ControlId`]; the registry keeps it consistent with
//! each control's own `midi_learn` field so the two always form a bijection.

use crate::control::{Control, ControlSpec, ControllerId, MIDI_DATA_MAX};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

const LEARN_SLOTS: usize = MIDI_DATA_MAX as usize + 1;

/// Index of a control inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(usize);

/// Outcome of installing a learn binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Binding {
    /// Id the target control was bound to before, now erased.
    pub previous: Option<ControllerId>,
    /// Another control that held the same id and lost it.
    pub displaced: Option<ControlId>,
}

pub struct ControlRegistry {
    /// Navigable controls in insertion order, followed by the pitch-bend control.
    controls: Vec<Control>,
    by_name: HashMap<Arc<str>, ControlId>,
    navigable: usize,
    selected: usize,
    learn: [Option<ControlId>; LEARN_SLOTS],
}

impl ControlRegistry {
    /// Builds the registry from the engine's parameter set.
    ///
    /// `specs` keeps its order for navigation; `pitch_bend` is reachable only
    /// through [`ControlRegistry::pitch_bend`] and pitch-bend messages.
    pub fn new(specs: Vec<ControlSpec>, pitch_bend: ControlSpec) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::NoControls);
        }

        let navigable = specs.len();
        let mut controls = Vec::with_capacity(navigable + 1);
        let mut by_name = HashMap::with_capacity(navigable + 1);

        for spec in specs.into_iter().chain(std::iter::once(pitch_bend)) {
            let control = Control::from_spec(spec)?;
            let id = ControlId(controls.len());
            if by_name.insert(Arc::clone(control.shared_name()), id).is_some() {
                return Err(Error::DuplicateControl(control.name().to_string()));
            }
            controls.push(control);
        }

        Ok(Self {
            controls,
            by_name,
            navigable,
            selected: 0,
            learn: [None; LEARN_SLOTS],
        })
    }

    /// Number of navigable controls.
    pub fn len(&self) -> usize {
        self.navigable
    }

    pub fn is_empty(&self) -> bool {
        self.navigable == 0
    }

    /// Navigable controls in navigation order.
    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls[..self.navigable].iter()
    }

    pub fn id_of(&self, name: &str) -> Option<ControlId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.id_of(name).map(|id| &self.controls[id.0])
    }

    pub fn control(&self, id: ControlId) -> &Control {
        &self.controls[id.0]
    }

    pub(crate) fn control_mut(&mut self, id: ControlId) -> &mut Control {
        &mut self.controls[id.0]
    }

    // ==================== Selection ====================

    pub fn selected_id(&self) -> ControlId {
        ControlId(self.selected)
    }

    pub fn selected(&self) -> &Control {
        &self.controls[self.selected]
    }

    pub(crate) fn selected_mut(&mut self) -> &mut Control {
        &mut self.controls[self.selected]
    }

    pub fn is_selected(&self, id: ControlId) -> bool {
        id.0 == self.selected
    }

    /// Selects a navigable control by name.
    pub fn select(&mut self, name: &str) -> Result<ControlId> {
        match self.id_of(name) {
            Some(id) if id.0 < self.navigable => {
                self.selected = id.0;
                Ok(id)
            }
            _ => Err(Error::UnknownControl(name.to_string())),
        }
    }

    /// Moves the selection back one control, wrapping. Returns the old selection.
    pub fn select_prev(&mut self) -> ControlId {
        let old = ControlId(self.selected);
        self.selected = (self.selected + self.navigable - 1) % self.navigable;
        old
    }

    /// Moves the selection forward one control, wrapping. Returns the old selection.
    pub fn select_next(&mut self) -> ControlId {
        let old = ControlId(self.selected);
        self.selected = (self.selected + 1) % self.navigable;
        old
    }

    // ==================== Pitch bend ====================

    pub fn pitch_bend_id(&self) -> ControlId {
        ControlId(self.navigable)
    }

    pub fn pitch_bend(&self) -> &Control {
        &self.controls[self.navigable]
    }

    // ==================== MIDI learn ====================

    /// Control bound to a controller id, if any.
    #[inline]
    pub fn bound(&self, id: ControllerId) -> Option<ControlId> {
        self.learn.get(id as usize).copied().flatten()
    }

    /// Binds `target` to controller `id`.
    ///
    /// Any binding already recorded on `target` is erased first. If another
    /// control held `id`, its stored binding is cleared and it is reported in
    /// [`Binding::displaced`].
    pub fn bind(&mut self, target: ControlId, id: ControllerId) -> Result<Binding> {
        if id > MIDI_DATA_MAX {
            return Err(Error::InvalidController(id));
        }

        let previous = self.erase(target);
        let displaced = self.learn[id as usize].filter(|holder| *holder != target);
        if let Some(holder) = displaced {
            self.controls[holder.0].set_midi_learn(None);
        }

        self.learn[id as usize] = Some(target);
        self.controls[target.0].set_midi_learn(Some(id));
        Ok(Binding {
            previous,
            displaced,
        })
    }

    /// Removes the binding recorded on `target`. Returns the id it held.
    pub fn erase(&mut self, target: ControlId) -> Option<ControllerId> {
        let id = self.controls[target.0].midi_learn()?;
        if self.learn[id as usize] == Some(target) {
            self.learn[id as usize] = None;
        }
        self.controls[target.0].set_midi_learn(None);
        Some(id)
    }

    /// Checks value bounds and that the learn map and each control's stored
    /// binding agree in both directions.
    pub fn verify(&self) -> Result<()> {
        for control in &self.controls {
            let value = control.value();
            if !(control.min() <= value && value <= control.max()) {
                return Err(Error::Inconsistent(format!(
                    "'{}' value {} outside [{}, {}]",
                    control.name(),
                    value,
                    control.min(),
                    control.max()
                )));
            }
        }

        for (cc, slot) in self.learn.iter().enumerate() {
            if let Some(id) = slot {
                let control = &self.controls[id.0];
                if control.midi_learn() != Some(cc as ControllerId) {
                    return Err(Error::Inconsistent(format!(
                        "CC {cc} maps to '{}' which records {:?}",
                        control.name(),
                        control.midi_learn()
                    )));
                }
            }
        }

        for (index, control) in self.controls.iter().enumerate() {
            if let Some(cc) = control.midi_learn() {
                if self.learn[cc as usize] != Some(ControlId(index)) {
                    return Err(Error::Inconsistent(format!(
                        "'{}' records CC {cc} but the learn map disagrees",
                        control.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlRegistry")
            .field("controls", &self.controls)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
