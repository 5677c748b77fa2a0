//! Audio callback — runs on the cpal audio thread.
//!
//! Renders the oscillator into a mono scratch buffer and copies it to every
//! output channel. Hands the oscillator back when dropped.

use ringbuf::traits::Producer;
use ringbuf::HeapProd;

use crate::instrument::Oscillator;

/// Scratch capacity reserved up front, in frames.
const INITIAL_SCRATCH_FRAMES: usize = 4096;

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    oscillator: Option<Oscillator>,
    handback: HeapProd<Oscillator>,
    scratch: Vec<f32>,
    channels: u16,
}

impl AudioCallback {
    /// Create a callback that renders `oscillator` and returns it through `handback`.
    pub fn new(oscillator: Oscillator, handback: HeapProd<Oscillator>, channels: u16) -> Self {
        Self {
            oscillator: Some(oscillator),
            handback,
            scratch: vec![0.0; INITIAL_SCRATCH_FRAMES],
            channels: channels.max(1),
        }
    }

    /// Called by cpal for each device buffer. Fills `output` with interleaved samples.
    pub fn process(&mut self, output: &mut [f32]) {
        let Some(oscillator) = self.oscillator.as_mut() else {
            output.fill(0.0);
            return;
        };

        let channels = self.channels as usize;
        let frames = output.len() / channels;
        if self.scratch.len() < frames {
            // Only grows if the device hands us a larger buffer than expected.
            self.scratch.resize(frames, 0.0);
        }

        let mono = &mut self.scratch[..frames];
        oscillator.render_into(mono);

        for (frame, &sample) in output.chunks_exact_mut(channels).zip(mono.iter()) {
            frame.fill(sample);
        }
        // Trailing partial frame, if the device buffer is not a whole number of frames.
        for sample in output[frames * channels..].iter_mut() {
            *sample = 0.0;
        }
    }

    /// Number of output channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Drop for AudioCallback {
    fn drop(&mut self) {
        if let Some(oscillator) = self.oscillator.take() {
            let _ = self.handback.try_push(oscillator);
        }
    }
}
