//! Offline sink — buffers are pulled by the caller instead of a device.
//!
//! Used for tests and for embedding the instrument in a host that drives its
//! own audio loop.

use super::{AudioError, AudioSink};
use crate::instrument::Oscillator;

/// A sink whose buffers are requested explicitly with [`OfflineSink::pull`].
#[derive(Debug)]
pub struct OfflineSink {
    sample_rate: u32,
    oscillator: Option<Oscillator>,
    requests: usize,
}

impl OfflineSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            oscillator: None,
            requests: 0,
        }
    }

    /// Render the next `frames` samples. `None` while stopped.
    pub fn pull(&mut self, frames: usize) -> Option<Vec<f32>> {
        let oscillator = self.oscillator.as_mut()?;
        self.requests += 1;
        Some(oscillator.render(frames))
    }

    /// Render into a caller-provided buffer. Returns `false` while stopped.
    pub fn pull_into(&mut self, out: &mut [f32]) -> bool {
        match self.oscillator.as_mut() {
            Some(oscillator) => {
                self.requests += 1;
                oscillator.render_into(out);
                true
            }
            None => false,
        }
    }

    /// Number of buffers served since creation.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl AudioSink for OfflineSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(&mut self, oscillator: Oscillator) -> Result<(), AudioError> {
        if self.oscillator.is_some() {
            return Err(AudioError::AlreadyRunning);
        }
        self.oscillator = Some(oscillator);
        Ok(())
    }

    fn stop(&mut self) -> Option<Oscillator> {
        self.oscillator.take()
    }

    fn is_running(&self) -> bool {
        self.oscillator.is_some()
    }
}
