//! Termite application runner: owns the transports and sequences startup and
//! shutdown around the foreground keyboard loop.

use crate::Result;
use std::sync::Arc;
use termite_core::{AudioPump, InputDispatcher, KeySource, MidiRouter, Session, SoundEngine};
use termite_io::{AudioOutput, MidiInputs, OutputConfig};
use tracing::{debug, info, warn};

/// A built session plus the audio and MIDI transports that feed it. Created by
/// [`TermiteBuilder::build`](crate::TermiteBuilder::build).
///
/// Fields drop in declaration order, so an abandoned runner still stops audio
/// before MIDI and both before the session.
pub struct Termite<E: SoundEngine + 'static> {
    audio: Option<AudioOutput>,
    midi: Option<MidiInputs>,
    session: Arc<Session<E>>,
    output: OutputConfig,
    enable_midi: bool,
}

impl<E: SoundEngine + 'static> Termite<E> {
    pub(crate) fn new(session: Arc<Session<E>>, output: OutputConfig, enable_midi: bool) -> Self {
        Self {
            audio: None,
            midi: None,
            session,
            output,
            enable_midi,
        }
    }

    pub fn session(&self) -> &Arc<Session<E>> {
        &self.session
    }

    pub fn output_config(&self) -> &OutputConfig {
        &self.output
    }

    pub fn is_audio_running(&self) -> bool {
        self.audio.as_ref().is_some_and(AudioOutput::is_running)
    }

    /// Number of MIDI input ports currently open.
    pub fn midi_port_count(&self) -> usize {
        self.midi.as_ref().map_or(0, MidiInputs::len)
    }

    /// Opens the output stream. No audio means no session, so this is fatal.
    pub fn start_audio(&mut self) -> Result<()> {
        if self.audio.is_none() {
            let pump = AudioPump::new(Arc::clone(&self.session));
            self.audio = Some(AudioOutput::start(&self.output, pump)?);
        }
        Ok(())
    }

    /// Opens every MIDI input port. Failure leaves a keyboard-only session.
    pub fn open_midi(&mut self) {
        if !self.enable_midi || self.midi.is_some() {
            return;
        }
        let router = MidiRouter::new(Arc::clone(&self.session));
        match MidiInputs::open_all(&router) {
            Ok(inputs) => {
                info!("{} MIDI input port(s) open", inputs.len());
                self.midi = Some(inputs);
            }
            Err(err) => warn!("MIDI unavailable, continuing keyboard-only: {}", err),
        }
    }

    /// Starts audio and MIDI, draws every control, then dispatches keys
    /// until the exit key or a closed source, and finally shuts down.
    pub fn run(mut self, keys: &mut dyn KeySource) -> Result<()> {
        self.start_audio()?;
        self.open_midi();
        self.session.draw_all();

        InputDispatcher::new(Arc::clone(&self.session)).run(keys);

        self.shutdown();
        Ok(())
    }

    /// Stops audio, then closes MIDI, then tears down the session and returns
    /// the engine. Returns `None` if a session handle is still held elsewhere.
    pub fn shutdown(mut self) -> Option<E> {
        if let Some(mut audio) = self.audio.take() {
            audio.stop();
        }
        if let Some(midi) = self.midi.take() {
            midi.close();
        }
        debug!("Transports stopped");

        match Arc::try_unwrap(self.session) {
            Ok(session) => Some(session.into_engine()),
            Err(_) => {
                warn!("Session still shared at shutdown");
                None
            }
        }
    }
}
