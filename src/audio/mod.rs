//! Audio output — sinks that pull mono buffers from an [`Oscillator`].
//!
//! A sink takes ownership of the oscillator on [`AudioSink::start`] and gives
//! it back on [`AudioSink::stop`], so the phase survives a stop/start cycle.
//! The device sink runs the oscillator inside the cpal callback; the oscillator
//! returns to the control thread through a lock-free ring buffer when the
//! stream is torn down.

pub mod callback;
pub mod offline;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Split},
    HeapCons, HeapRb,
};
use thiserror::Error;

pub use offline::OfflineSink;

use crate::instrument::Oscillator;
use callback::AudioCallback;

/// Audio output errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio output device found.
    #[error("no audio output device found")]
    NoOutputDevice,
    /// Failed to query device configuration.
    #[error("device config error: {0}")]
    DeviceConfig(String),
    /// Failed to build the audio stream.
    #[error("stream build error: {0}")]
    StreamBuild(String),
    /// Failed to start the audio stream.
    #[error("stream play error: {0}")]
    StreamPlay(String),
    /// `start` called while the sink already holds an oscillator.
    #[error("audio sink is already running")]
    AlreadyRunning,
}

/// Something that periodically pulls sample buffers from an oscillator.
pub trait AudioSink {
    /// Output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Take the oscillator and begin pulling buffers from it.
    fn start(&mut self, oscillator: Oscillator) -> Result<(), AudioError>;

    /// Stop pulling buffers and hand the oscillator back.
    ///
    /// Returns `None` if the sink was not running or the oscillator could not
    /// be recovered.
    fn stop(&mut self) -> Option<Oscillator>;

    /// Whether buffers are currently being pulled.
    fn is_running(&self) -> bool;
}

/// Output format requested from the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputSettings {
    /// Override the device's default sample rate.
    pub sample_rate: Option<u32>,
    /// Fixed callback size in frames. `None` lets the device choose.
    pub buffer_size: Option<u32>,
}

/// Sink that plays through the default cpal output device.
///
/// The oscillator renders mono; the callback copies each sample to every
/// device channel.
pub struct CpalSink {
    device: cpal::Device,
    config: cpal::StreamConfig,
    stream: Option<cpal::Stream>,
    handback: Option<HeapCons<Oscillator>>,
}

impl CpalSink {
    /// Open the default output device with its default configuration.
    pub fn new() -> Result<Self, AudioError> {
        Self::with_settings(OutputSettings::default())
    }

    /// Open the default output device, overriding rate and buffer size.
    pub fn with_settings(settings: OutputSettings) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let default_config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = settings
            .sample_rate
            .unwrap_or_else(|| default_config.sample_rate().0);
        let buffer_size = match settings.buffer_size {
            Some(frames) => cpal::BufferSize::Fixed(frames),
            None => cpal::BufferSize::Default,
        };

        let config = cpal::StreamConfig {
            channels: default_config.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size,
        };

        if let Ok(name) = device.name() {
            log::info!(
                "audio device: {name} ({sample_rate} Hz, {} ch)",
                config.channels
            );
        }

        Ok(Self {
            device,
            config,
            stream: None,
            handback: None,
        })
    }

    /// Number of device channels.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

impl AudioSink for CpalSink {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self, oscillator: Oscillator) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Err(AudioError::AlreadyRunning);
        }

        let rb = HeapRb::<Oscillator>::new(1);
        let (producer, consumer) = rb.split();
        // If the build fails below, the callback is dropped and the
        // oscillator still lands in the handback slot.
        self.handback = Some(consumer);

        let mut audio_callback = AudioCallback::new(oscillator, producer, self.config.channels);

        let err_fn = |err: cpal::StreamError| {
            log::error!("audio stream error: {err}");
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Option<Oscillator> {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::warn!("failed to pause audio stream: {e}");
            }
            // Dropping the stream drops the callback, which returns the oscillator.
            drop(stream);
        }
        let mut handback = self.handback.take()?;
        let oscillator = handback.try_pop();
        if oscillator.is_none() {
            log::debug!("oscillator was not handed back by the audio callback");
        }
        oscillator
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}
