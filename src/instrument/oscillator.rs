//! Sine oscillator — phase accumulator with click-free frequency glides.
//!
//! The oscillator is split in two halves:
//! - [`Oscillator`] owns the phase and the last rendered frequency. It lives on
//!   the render thread and is the only thing that touches those fields.
//! - [`OscillatorHandle`] is a cheap clone that writes the target frequency and
//!   amplitude into atomic slots. It can be used from any thread while the
//!   oscillator renders.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::ThereminError;

/// Frequency used when no target has been set yet.
pub const DEFAULT_FREQUENCY: f32 = 440.0;

/// Amplitude used when no target has been set yet.
pub const DEFAULT_AMPLITUDE: f32 = 0.25;

/// An `f32` stored as its bit pattern.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Targets shared between the control thread and the render thread.
#[derive(Debug)]
struct OscillatorParams {
    frequency: AtomicF32,
    amplitude: AtomicF32,
}

/// Control-side handle for setting oscillator targets. Never blocks.
#[derive(Debug, Clone)]
pub struct OscillatorHandle {
    params: Arc<OscillatorParams>,
}

impl OscillatorHandle {
    /// Set the target frequency in Hz. Must be finite and positive.
    pub fn set_frequency(&self, hz: f32) -> Result<(), ThereminError> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ThereminError::InvalidFrequency(hz));
        }
        self.params.frequency.store(hz);
        Ok(())
    }

    /// Set the target amplitude. Must be finite; clamped to `[0, 1]`.
    pub fn set_amplitude(&self, gain: f32) -> Result<(), ThereminError> {
        if !gain.is_finite() {
            return Err(ThereminError::InvalidAmplitude(gain));
        }
        self.params.amplitude.store(gain.clamp(0.0, 1.0));
        Ok(())
    }

    /// Current target frequency.
    pub fn frequency(&self) -> f32 {
        self.params.frequency.load()
    }

    /// Current target amplitude.
    pub fn amplitude(&self) -> f32 {
        self.params.amplitude.load()
    }
}

/// Mono sine generator.
///
/// When the target frequency changes between buffers, the next buffer glides
/// linearly from the previous frequency to the new one, reaching it on the
/// final sample. The phase is continuous across the glide, so there is no
/// click.
#[derive(Debug)]
pub struct Oscillator {
    handle: OscillatorHandle,
    sample_rate: u32,
    phase: f64,
    last_frequency: f32,
}

impl Oscillator {
    /// Create an oscillator at the default frequency and amplitude.
    pub fn new(sample_rate: u32) -> Result<Self, ThereminError> {
        Self::with_params(DEFAULT_FREQUENCY, DEFAULT_AMPLITUDE, sample_rate)
    }

    /// Create an oscillator with an initial frequency and amplitude.
    pub fn with_params(
        frequency: f32,
        amplitude: f32,
        sample_rate: u32,
    ) -> Result<Self, ThereminError> {
        if sample_rate == 0 {
            return Err(ThereminError::InvalidSampleRate(sample_rate));
        }
        let handle = OscillatorHandle {
            params: Arc::new(OscillatorParams {
                frequency: AtomicF32::new(DEFAULT_FREQUENCY),
                amplitude: AtomicF32::new(DEFAULT_AMPLITUDE),
            }),
        };
        handle.set_frequency(frequency)?;
        handle.set_amplitude(amplitude)?;
        Ok(Self {
            handle,
            sample_rate,
            phase: 0.0,
            last_frequency: frequency,
        })
    }

    /// Change the output sample rate. Only call while not rendering.
    pub fn configure(&mut self, sample_rate: u32) -> Result<(), ThereminError> {
        if sample_rate == 0 {
            return Err(ThereminError::InvalidSampleRate(sample_rate));
        }
        self.sample_rate = sample_rate;
        Ok(())
    }

    /// A handle for setting targets from another thread.
    pub fn handle(&self) -> OscillatorHandle {
        self.handle.clone()
    }

    pub fn set_frequency(&self, hz: f32) -> Result<(), ThereminError> {
        self.handle.set_frequency(hz)
    }

    pub fn set_amplitude(&self, gain: f32) -> Result<(), ThereminError> {
        self.handle.set_amplitude(gain)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current phase in radians, always in `[0, 2π)`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Frequency of the most recently rendered sample.
    pub fn last_frequency(&self) -> f32 {
        self.last_frequency
    }

    /// Render `frames` samples into a new buffer.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render_into(&mut out);
        out
    }

    /// Fill `out` with samples. Does not allocate.
    ///
    /// Targets are read once at the start of the buffer.
    pub fn render_into(&mut self, out: &mut [f32]) {
        let target = self.handle.frequency();
        let amplitude = self.handle.amplitude() as f64;
        let n = out.len();
        let step_scale = TAU / self.sample_rate as f64;

        for (i, sample) in out.iter_mut().enumerate() {
            let mut freq = target;
            if target != self.last_frequency {
                let remaining = (n - i) as f32;
                freq = ((remaining - 1.0) * self.last_frequency + target) / remaining;
                self.last_frequency = freq;
            }

            *sample = (amplitude * self.phase.sin()) as f32;

            self.phase += step_scale * freq as f64;
            if self.phase >= TAU {
                self.phase -= TAU;
                if self.phase >= TAU {
                    self.phase = self.phase.rem_euclid(TAU);
                }
            }
        }
    }
}
