//! Audio-thread entry point.

use crate::engine::SoundEngine;
use crate::session::Session;
use std::sync::Arc;

/// Host-reported condition of the output stream for one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Ok,
    /// The host ran out of samples since the previous callback.
    Underflow,
}

/// Fills interleaved output blocks from the engine's mono render.
///
/// Owned by the audio thread. The gate is held only around each render
/// step; fanning out to the output channels happens after release.
pub struct AudioPump<E: SoundEngine> {
    session: Arc<Session<E>>,
    channels: usize,
    scratch: Vec<f32>,
}

impl<E: SoundEngine> AudioPump<E> {
    /// Pre-allocates one block of scratch so the callback never allocates.
    pub fn new(session: Arc<Session<E>>) -> Self {
        let channels = session.config().channels;
        let block_size = session.config().block_size;
        Self {
            session,
            channels,
            scratch: vec![0.0; block_size],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Writes `output.len() / channels` frames, each channel an identical copy
    /// of the mono render. Requests longer than one block are rendered in
    /// block-sized steps, taking the gate once per step.
    pub fn process(&mut self, output: &mut [f32], status: StreamStatus) {
        if status == StreamStatus::Underflow {
            tracing::warn!("Stream underflow detected");
        }

        let channels = self.channels;
        let frames = output.len() / channels;
        let mut done = 0;

        while done < frames {
            let chunk = (frames - done).min(self.scratch.len());
            let mono = &mut self.scratch[..chunk];
            {
                let mut state = self.session.gate().acquire();
                state.engine.render(mono);
            }

            let out = &mut output[done * channels..(done + chunk) * channels];
            for (frame, &sample) in out.chunks_exact_mut(channels).zip(mono.iter()) {
                frame.fill(sample);
            }
            done += chunk;
        }

        output[frames * channels..].fill(0.0);
    }
}
