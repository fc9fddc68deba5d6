//! CPAL audio output driving an [`AudioPump`].

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Arc;
use termite_core::{AtomicFlag, AudioPump, SoundEngine, StreamStatus, TermiteConfig};

/// Stream parameters requested from the output device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// `None` = host default device.
    pub device_index: Option<usize>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Fixed frames per callback.
    pub block_size: u32,
}

impl OutputConfig {
    pub fn from_session(config: &TermiteConfig, device_index: Option<usize>) -> Self {
        Self {
            device_index,
            sample_rate: config.sample_rate,
            channels: config.channels as u16,
            block_size: config.block_size as u32,
        }
    }

    fn stream_config(&self) -> cpal::StreamConfig {
        cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.block_size),
        }
    }
}

/// A running output stream. Dropping it or calling [`AudioOutput::stop`]
/// ends all further pump invocations.
pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    device_name: String,
}

impl AudioOutput {
    /// Opens the device and starts calling `pump` from the audio thread.
    pub fn start<E: SoundEngine + 'static>(config: &OutputConfig, pump: AudioPump<E>) -> Result<Self> {
        if pump.channels() != config.channels as usize {
            return Err(Error::InvalidConfig(format!(
                "pump renders {} channels but the stream has {}",
                pump.channels(),
                config.channels
            )));
        }

        let device = get_device(config.device_index)?;
        let device_name = device.name()?;
        let sample_format = device.default_output_config()?.sample_format();
        let stream_config = config.stream_config();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32, E>(&device, &stream_config, pump)?,
            cpal::SampleFormat::I16 => build_stream::<i16, E>(&device, &stream_config, pump)?,
            cpal::SampleFormat::U16 => build_stream::<u16, E>(&device, &stream_config, pump)?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };
        stream.play()?;

        tracing::info!(
            "Audio output on '{}': {} Hz, {} channels, {} frame blocks",
            device_name,
            config.sample_rate,
            config.channels,
            config.block_size
        );

        Ok(Self {
            stream: Some(stream),
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Stops and closes the stream. Once this returns the pump is never
    /// called again. Failures to pause a degraded stream are logged.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                tracing::warn!("Failed to pause audio stream: {}", err);
            }
            drop(stream);
            tracing::debug!("Audio output on '{}' closed", self.device_name);
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `index: name` for every output device on the default host.
pub fn list_output_devices() -> Result<Vec<String>> {
    cpal::default_host()
        .output_devices()?
        .enumerate()
        .map(|(i, d)| Ok(format!("{i}: {}", d.name()?)))
        .collect()
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices()?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::InvalidDevice(format!("Device index {i} out of range ({count} available)"))
            })
        }
        None => host.default_output_device().ok_or(Error::NoOutputDevice),
    }
}

fn build_stream<T, E>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut pump: AudioPump<E>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
    E: SoundEngine + 'static,
{
    let underflow = Arc::new(AtomicFlag::new(false));
    let reported = Arc::clone(&underflow);

    // Grows on the first callback, then stable.
    let mut output_f32 = Vec::<f32>::with_capacity(config.channels as usize * 1024);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let status = take_status(&underflow);
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                if output_f32.len() < data.len() {
                    output_f32.resize(data.len(), 0.0);
                }
                let block = &mut output_f32[..data.len()];
                pump.process(block, status);
                write_output(data, block);
            }));

            if result.is_err() {
                output_silence(data);
            }
        },
        move |err| {
            tracing::warn!("Audio stream error: {}", err);
            if is_xrun(&err) {
                reported.set(true);
            }
        },
        None,
    )?;

    Ok(stream)
}

/// Whether a stream error reports an xrun rather than a device or backend failure.
fn is_xrun(err: &cpal::StreamError) -> bool {
    match err {
        cpal::StreamError::BackendSpecific { err } => {
            let description = err.description.to_lowercase();
            ["underrun", "underflow", "xrun"]
                .iter()
                .any(|word| description.contains(word))
        }
        _ => false,
    }
}

/// Consumes an underflow reported by the host since the previous callback.
#[inline]
fn take_status(underflow: &AtomicFlag) -> StreamStatus {
    if underflow.swap(false) {
        StreamStatus::Underflow
    } else {
        StreamStatus::Ok
    }
}

/// Convert interleaved f32 to the device format.
#[inline]
fn write_output<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T], output: &[f32]) {
    for (sample, &value) in data.iter_mut().zip(output) {
        *sample = T::from_sample(value);
    }
}

/// Output silence (panic recovery).
#[inline]
fn output_silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_from_session() {
        let config = OutputConfig::from_session(&TermiteConfig::default(), None);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 2);
        assert_eq!(config.block_size, 64);

        let stream = config.stream_config();
        assert_eq!(stream.sample_rate, cpal::SampleRate(44100));
        assert_eq!(stream.buffer_size, cpal::BufferSize::Fixed(64));
    }

    #[test]
    fn test_underflow_reported_once() {
        let flag = AtomicFlag::new(false);
        assert_eq!(take_status(&flag), StreamStatus::Ok);
        flag.set(true);
        assert_eq!(take_status(&flag), StreamStatus::Underflow);
        assert_eq!(take_status(&flag), StreamStatus::Ok);
    }

    #[test]
    fn test_only_xruns_count_as_underflow() {
        let backend = |description: &str| cpal::StreamError::BackendSpecific {
            err: cpal::BackendSpecificError {
                description: description.to_string(),
            },
        };
        assert!(is_xrun(&backend("ALSA buffer underrun")));
        assert!(is_xrun(&backend("XRUN detected")));
        assert!(!is_xrun(&backend("device lost")));
        assert!(!is_xrun(&cpal::StreamError::DeviceNotAvailable));
    }

    #[test]
    fn test_write_output_converts_format() {
        let mut data = [0i16; 4];
        write_output(&mut data, &[0.0, 1.0, -1.0, 0.5]);
        assert_eq!(data[0], 0);
        assert_eq!(data[1], i16::MAX);
        assert_eq!(data[2], i16::MIN);
        assert!(data[3] > 0);

        output_silence(&mut data);
        assert_eq!(data, [0; 4]);
    }
}
