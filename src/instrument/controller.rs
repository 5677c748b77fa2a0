//! Tone controller — range management and start/stop lifecycle on top of the oscillator.
//!
//! This is the single place that decides what the instrument should sound
//! like. Frequencies are clamped to the key's range and amplitudes to
//! `[0, 1]` before they reach the oscillator.

use crate::audio::AudioSink;
use crate::error::ThereminError;
use crate::mapping::{required_sample_rate, NoteTable};

use super::key::{Key, RangeSpan};
use super::oscillator::{Oscillator, OscillatorHandle, DEFAULT_AMPLITUDE};

/// Owns the oscillator and the output sink.
///
/// The oscillator is created on the first [`start`](Self::start) and kept
/// across stop/start cycles, so the phase carries over and the pitch and
/// volume resume where they were.
pub struct ToneController<S: AudioSink> {
    sink: S,
    key: Key,
    span: RangeSpan,
    min_frequency: f32,
    max_frequency: f32,
    frequency: f32,
    amplitude: f32,
    note_table: NoteTable,
    oscillator: Option<Oscillator>,
    handle: Option<OscillatorHandle>,
    playing: bool,
}

impl<S: AudioSink> ToneController<S> {
    /// Create a stopped controller in the default key (C, two octaves).
    pub fn new(sink: S) -> Self {
        Self::with_key(sink, Key::default(), RangeSpan::default())
    }

    /// Create a stopped controller for a key and range span.
    pub fn with_key(sink: S, key: Key, span: RangeSpan) -> Self {
        let (min_frequency, max_frequency) = span.bounds(key);
        Self {
            sink,
            key,
            span,
            min_frequency,
            max_frequency,
            frequency: min_frequency,
            amplitude: DEFAULT_AMPLITUDE,
            note_table: NoteTable::new(min_frequency, max_frequency),
            oscillator: None,
            handle: None,
            playing: false,
        }
    }

    /// Start pulling audio. No-op while already playing.
    pub fn start(&mut self) -> Result<(), ThereminError> {
        if self.playing {
            return Ok(());
        }

        let rate = self.sink.sample_rate();
        let required = required_sample_rate(self.min_frequency, self.max_frequency);
        if rate < required {
            return Err(ThereminError::SampleRateTooLow { rate, required });
        }

        let mut oscillator = match self.oscillator.take() {
            Some(osc) => osc,
            None => Oscillator::with_params(self.frequency, self.amplitude, rate)?,
        };
        oscillator.configure(rate)?;
        oscillator.set_frequency(self.frequency)?;
        oscillator.set_amplitude(self.amplitude)?;
        let handle = oscillator.handle();

        if let Err(e) = self.sink.start(oscillator) {
            log::error!("failed to start audio output: {e}");
            self.oscillator = self.sink.stop();
            return Err(e.into());
        }

        self.handle = Some(handle);
        self.playing = true;
        log::info!(
            "playing {:.2} Hz at amplitude {:.2} ({} Hz output)",
            self.frequency,
            self.amplitude,
            rate
        );
        Ok(())
    }

    /// Stop pulling audio. No-op while already stopped.
    ///
    /// Frequency, amplitude, and oscillator phase are kept for the next start.
    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.oscillator = self.sink.stop();
        if self.oscillator.is_none() {
            self.handle = None;
        }
        log::info!("stopped");
    }

    /// Toggle between playing and stopped.
    pub fn start_stop(&mut self) -> Result<(), ThereminError> {
        if self.playing {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set the frequency, clamped to the key's range. Returns the stored value.
    ///
    /// Non-finite input is rejected and the previous frequency kept.
    pub fn set_frequency(&mut self, hz: f32) -> Result<f32, ThereminError> {
        if !hz.is_finite() {
            return Err(ThereminError::InvalidFrequency(hz));
        }
        self.frequency = hz.clamp(self.min_frequency, self.max_frequency);
        if let Some(handle) = &self.handle {
            handle.set_frequency(self.frequency)?;
        }
        Ok(self.frequency)
    }

    /// Set the amplitude, clamped to `[0, 1]`. Returns the stored value.
    ///
    /// Non-finite input is rejected and the previous amplitude kept.
    pub fn set_amplitude(&mut self, gain: f32) -> Result<f32, ThereminError> {
        if !gain.is_finite() {
            return Err(ThereminError::InvalidAmplitude(gain));
        }
        self.amplitude = gain.clamp(0.0, 1.0);
        if let Some(handle) = &self.handle {
            handle.set_amplitude(self.amplitude)?;
        }
        Ok(self.amplitude)
    }

    /// Select a key by name (case-insensitive, `#`/`b` aliases accepted).
    ///
    /// An unknown name leaves the current key and range untouched.
    pub fn select_key(&mut self, name: &str) -> Result<Key, ThereminError> {
        let key = name.parse::<Key>().map_err(|e| {
            log::warn!("ignoring key selection: {e}");
            e
        })?;
        self.set_key(key);
        Ok(key)
    }

    /// Switch to `key`, resetting the frequency to its root.
    pub fn set_key(&mut self, key: Key) {
        self.key = key;
        self.apply_range();
        log::info!(
            "key {} ({:.2}–{:.2} Hz)",
            key,
            self.min_frequency,
            self.max_frequency
        );
    }

    /// Switch the range span, resetting the frequency to the root.
    pub fn set_range_span(&mut self, span: RangeSpan) {
        self.span = span;
        self.apply_range();
        log::info!("range {} octave(s)", span.octaves());
    }

    fn apply_range(&mut self) {
        let (min, max) = self.span.bounds(self.key);
        self.min_frequency = min;
        self.max_frequency = max;
        self.note_table = NoteTable::new(min, max);
        self.frequency = min;
        if let Some(handle) = &self.handle {
            // min is a positive constant from the key table.
            let _ = handle.set_frequency(min);
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn range_span(&self) -> RangeSpan {
        self.span
    }

    pub fn min_frequency(&self) -> f32 {
        self.min_frequency
    }

    pub fn max_frequency(&self) -> f32 {
        self.max_frequency
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn note_table(&self) -> &NoteTable {
        &self.note_table
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<S: AudioSink> Drop for ToneController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineSink;
    use assert_approx_eq::assert_approx_eq;

    fn controller() -> ToneController<OfflineSink> {
        ToneController::new(OfflineSink::new(44100))
    }

    #[test]
    fn starts_stopped_at_root_of_c() {
        let c = controller();
        assert!(!c.is_playing());
        assert_eq!(c.key(), Key::C);
        assert_eq!(c.min_frequency(), 261.63);
        assert_approx_eq!(c.max_frequency(), 261.63 * 4.0, 1e-3);
        assert_eq!(c.frequency(), c.min_frequency());
        assert_eq!(c.amplitude(), DEFAULT_AMPLITUDE);
    }

    #[test]
    fn frequency_is_clamped() {
        let mut c = controller();
        assert_eq!(c.set_frequency(10.0).unwrap(), c.min_frequency());
        assert_eq!(c.set_frequency(20000.0).unwrap(), c.max_frequency());
        assert_eq!(c.set_frequency(500.0).unwrap(), 500.0);
    }

    #[test]
    fn amplitude_is_clamped() {
        let mut c = controller();
        assert_eq!(c.set_amplitude(-0.5).unwrap(), 0.0);
        assert_eq!(c.set_amplitude(1.5).unwrap(), 1.0);
        assert_eq!(c.set_amplitude(0.4).unwrap(), 0.4);
    }

    #[test]
    fn non_finite_values_hold_last_good() {
        let mut c = controller();
        c.set_frequency(400.0).unwrap();
        c.set_amplitude(0.3).unwrap();
        assert!(matches!(
            c.set_frequency(f32::NAN),
            Err(ThereminError::InvalidFrequency(_))
        ));
        assert!(matches!(
            c.set_amplitude(f32::INFINITY),
            Err(ThereminError::InvalidAmplitude(_))
        ));
        assert_eq!(c.frequency(), 400.0);
        assert_eq!(c.amplitude(), 0.3);
    }

    #[test]
    fn select_key_rederives_range_and_resets_frequency() {
        let mut c = controller();
        c.set_frequency(600.0).unwrap();
        assert_eq!(c.select_key("a").unwrap(), Key::A);
        assert_eq!(c.min_frequency(), 440.0);
        assert_eq!(c.max_frequency(), 1760.0);
        assert_eq!(c.frequency(), 440.0);
        assert_eq!(c.note_table().len(), 12);
        assert_eq!(c.note_table().get(0).unwrap().frequency, 440.0);
    }

    #[test]
    fn invalid_key_keeps_previous_range() {
        let mut c = controller();
        c.select_key("C").unwrap();
        let before = (c.min_frequency(), c.max_frequency(), c.key());
        assert!(matches!(
            c.select_key("INVALID"),
            Err(ThereminError::InvalidKey(_))
        ));
        assert_eq!((c.min_frequency(), c.max_frequency(), c.key()), before);
    }

    #[test]
    fn one_octave_span() {
        let mut c = ToneController::with_key(OfflineSink::new(44100), Key::A, RangeSpan::OneOctave);
        assert_eq!(c.max_frequency(), 880.0);
        c.set_range_span(RangeSpan::TwoOctaves);
        assert_eq!(c.max_frequency(), 1760.0);
        assert_eq!(c.frequency(), 440.0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut c = controller();
        c.start().unwrap();
        c.start().unwrap();
        assert!(c.is_playing());
        assert!(c.sink().is_running());
        c.stop();
        c.stop();
        assert!(!c.is_playing());
        assert!(!c.sink().is_running());
    }

    #[test]
    fn start_pushes_current_values() {
        let mut c = controller();
        c.set_frequency(300.0).unwrap();
        c.set_amplitude(0.8).unwrap();
        c.start().unwrap();
        let buf = c.sink_mut().pull(2048).unwrap();
        let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.7 && peak <= 0.8 + 1e-6);
    }

    #[test]
    fn setters_forward_while_playing() {
        let mut c = controller();
        c.set_amplitude(0.0).unwrap();
        c.start().unwrap();
        let silent = c.sink_mut().pull(512).unwrap();
        assert!(silent.iter().all(|s| *s == 0.0));
        c.set_amplitude(0.5).unwrap();
        let loud = c.sink_mut().pull(512).unwrap();
        assert!(loud.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn stop_start_resumes_phase_and_values() {
        let mut c = controller();
        c.set_frequency(500.0).unwrap();
        c.set_amplitude(0.6).unwrap();
        c.start().unwrap();
        c.sink_mut().pull(333);
        c.stop();

        assert_eq!(c.frequency(), 500.0);
        assert_eq!(c.amplitude(), 0.6);

        // The reclaimed oscillator continues where it left off.
        let mut reference = Oscillator::with_params(500.0, 0.6, 44100).unwrap();
        reference.render(333);
        let expected = reference.render(64);

        c.start().unwrap();
        let resumed = c.sink_mut().pull(64).unwrap();
        for (a, b) in resumed.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn stop_halts_pull_requests() {
        let mut c = controller();
        c.start().unwrap();
        c.sink_mut().pull(64).unwrap();
        let served = c.sink().requests();
        c.stop();
        assert!(c.sink_mut().pull(64).is_none());
        assert_eq!(c.sink().requests(), served);
    }

    #[test]
    fn setters_while_stopped_apply_on_start() {
        let mut c = controller();
        c.start().unwrap();
        c.stop();
        c.set_frequency(700.0).unwrap();
        c.start().unwrap();
        // Glide from the old frequency lands on the new one by the end of a buffer.
        c.sink_mut().pull(256);
        let osc = c.sink_mut().stop().unwrap();
        assert_approx_eq!(osc.last_frequency(), 700.0, 1e-3);
    }

    #[test]
    fn key_change_while_playing_moves_oscillator() {
        let mut c = controller();
        c.start().unwrap();
        c.set_key(Key::A);
        c.sink_mut().pull(256);
        let osc = c.sink_mut().stop().unwrap();
        assert_approx_eq!(osc.last_frequency(), 440.0, 1e-3);
    }

    #[test]
    fn low_sample_rate_refuses_to_start() {
        let mut c = ToneController::new(OfflineSink::new(2000));
        let err = c.start().unwrap_err();
        assert!(matches!(err, ThereminError::SampleRateTooLow { rate: 2000, .. }));
        assert!(!c.is_playing());
    }

    #[test]
    fn start_stop_toggles() {
        let mut c = controller();
        c.start_stop().unwrap();
        assert!(c.is_playing());
        c.start_stop().unwrap();
        assert!(!c.is_playing());
    }
}
