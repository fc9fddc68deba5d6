//! midir input ports feeding a [`MidiRouter`].

use crate::Result;
use midir::{Ignore, MidiInput, MidiInputConnection};
use termite_core::{MidiRouter, SoundEngine};
use tracing::{debug, info, warn};

const CLIENT_NAME: &str = "termite-midi-input";

/// An enumerable MIDI input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiInputDevice {
    pub index: usize,
    pub name: String,
}

/// Lists input ports on the system. An unavailable MIDI backend yields an
/// empty list.
pub fn list_midi_inputs() -> Vec<MidiInputDevice> {
    let mut devices = Vec::new();
    if let Ok(midi_input) = MidiInput::new("termite-device-list") {
        for (index, port) in midi_input.ports().iter().enumerate() {
            let name = midi_input
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            devices.push(MidiInputDevice { index, name });
        }
    }
    devices
}

/// One open connection per input port. Each port's callback thread owns its
/// own router clone.
pub struct MidiInputs {
    connections: Vec<(String, MidiInputConnection<()>)>,
}

impl MidiInputs {
    /// Opens every enumerable input port. A port that fails to open is
    /// logged and skipped; finding no ports at all is not an error.
    pub fn open_all<E: SoundEngine + 'static>(router: &MidiRouter<E>) -> Result<Self> {
        let probe = MidiInput::new(CLIENT_NAME)?;
        let port_count = probe.port_count();
        drop(probe);

        if port_count == 0 {
            info!("No MIDI devices found");
        }

        let mut connections = Vec::with_capacity(port_count);
        for index in 0..port_count {
            match connect_port(index, router.clone()) {
                Ok((name, connection)) => {
                    info!("Opened MIDI input '{}'", name);
                    connections.push((name, connection));
                }
                Err(err) => warn!("Failed to open MIDI input {}: {}", index, err),
            }
        }

        Ok(Self { connections })
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn port_names(&self) -> impl Iterator<Item = &str> {
        self.connections.iter().map(|(name, _)| name.as_str())
    }

    /// Closes every port. No router clone is invoked after this returns.
    pub fn close(self) {
        for (name, connection) in self.connections {
            connection.close();
            debug!("Closed MIDI input '{}'", name);
        }
    }
}

fn connect_port<E: SoundEngine + 'static>(
    index: usize,
    router: MidiRouter<E>,
) -> Result<(String, MidiInputConnection<()>)> {
    // midir consumes the client on connect, so each port gets its own.
    let mut midi_input = MidiInput::new(CLIENT_NAME)?;
    midi_input.ignore(Ignore::All);

    let ports = midi_input.ports();
    let port = ports.get(index).ok_or_else(|| {
        crate::Error::MidiDevice(format!("MIDI input device {} not found", index))
    })?;
    let name = midi_input.port_name(port)?;

    let connection = midi_input.connect(
        port,
        "termite-input",
        move |_timestamp, message, _| router.route(message),
        (),
    )?;

    Ok((name, connection))
}
