//! Theremin session — gesture mapping, quantization, and handedness on top of the tone controller.
//!
//! [`Theremin::on_gesture_update`] is the entry point for tracker frames;
//! [`Theremin::apply`] handles every [`ControlEvent`]. The UI reads the result
//! back through [`Theremin::readout`].

use crate::audio::AudioSink;
use crate::control::{ControlEvent, GestureUpdate, Handedness};
use crate::error::ThereminError;
use crate::instrument::{Key, RangeSpan, ToneController};
use crate::mapping::{
    frequency_to_linear, guide_positions, linear_to_frequency, nearest_note, quantize_to_step,
    FREQ_INTERVALS,
};

/// Default window for naming the current note, in cents.
pub const DEFAULT_NOTE_TOLERANCE_CENTS: f32 = 50.0;

/// Session settings applied at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub key: Key,
    pub range: RangeSpan,
    pub quantize: bool,
    pub handedness: Handedness,
    pub amplitude: f32,
    pub note_tolerance_cents: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            key: Key::default(),
            range: RangeSpan::default(),
            quantize: false,
            handedness: Handedness::default(),
            amplitude: crate::instrument::oscillator::DEFAULT_AMPLITUDE,
            note_tolerance_cents: DEFAULT_NOTE_TOLERANCE_CENTS,
        }
    }
}

/// Snapshot of the instrument state for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub frequency: f32,
    pub amplitude: f32,
    /// Name of the nearest note, `None` when between notes.
    pub note: Option<&'static str>,
    /// Distance from the named note in cents.
    pub cents: Option<f32>,
    pub playing: bool,
    pub key: Key,
    pub range: RangeSpan,
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub quantize: bool,
    pub handedness: Handedness,
    /// Frequency position within the range, `0.0` at the root.
    pub pitch_position: f32,
}

impl Readout {
    /// Note label for display.
    pub fn note_label(&self) -> &'static str {
        self.note.unwrap_or("none")
    }

    /// Guide line offsets for a display of `height` units, only while quantizing.
    pub fn guides(&self, height: f32) -> Vec<f32> {
        if self.quantize {
            guide_positions(height)
        } else {
            Vec::new()
        }
    }
}

/// A playable instrument: tone controller plus gesture interpretation.
pub struct Theremin<S: AudioSink> {
    controller: ToneController<S>,
    handedness: Handedness,
    quantize: bool,
    note_tolerance_cents: f32,
    last_gesture: Option<GestureUpdate>,
}

impl<S: AudioSink> Theremin<S> {
    pub fn new(sink: S, settings: &SessionSettings) -> Self {
        let mut controller = ToneController::with_key(sink, settings.key, settings.range);
        if let Err(e) = controller.set_amplitude(settings.amplitude) {
            log::warn!("ignoring configured amplitude: {e}");
        }
        Self {
            controller,
            handedness: settings.handedness,
            quantize: settings.quantize,
            note_tolerance_cents: settings.note_tolerance_cents,
            last_gesture: None,
        }
    }

    /// Apply one tracker frame.
    ///
    /// Coordinates are clamped to `[0, 1]`. A frame with a non-finite
    /// coordinate is skipped and the previous pitch and volume kept.
    pub fn on_gesture_update(&mut self, left: f32, right: f32) -> Result<(), ThereminError> {
        let update = GestureUpdate::new(left, right);
        if !update.is_finite() {
            log::debug!("skipping gesture with non-finite coordinates ({left}, {right})");
            return Ok(());
        }

        let (pitch, volume) = update.assign(self.handedness);
        let min = self.controller.min_frequency();
        let max = self.controller.max_frequency();
        let frequency = if self.quantize {
            quantize_to_step(pitch, FREQ_INTERVALS, min, max)
        } else {
            linear_to_frequency(pitch, min, max)
        };

        self.controller.set_frequency(frequency)?;
        self.controller.set_amplitude(volume)?;
        self.last_gesture = Some(update);
        Ok(())
    }

    /// Handle a control event.
    pub fn apply(&mut self, event: ControlEvent) -> Result<(), ThereminError> {
        match event {
            ControlEvent::Gesture(update) => self.on_gesture_update(update.left, update.right)?,
            ControlEvent::GestureLost => {
                log::debug!("no gesture signal; holding current parameters");
            }
            ControlEvent::StartStop => self.controller.start_stop()?,
            ControlEvent::Start => self.controller.start()?,
            ControlEvent::Stop => self.controller.stop(),
            ControlEvent::SelectKey(name) => {
                self.controller.select_key(&name)?;
            }
            ControlEvent::SetQuantize(on) => self.set_quantize(on),
            ControlEvent::ToggleQuantize => self.set_quantize(!self.quantize),
            ControlEvent::SetHandedness(handedness) => self.set_handedness(handedness),
            ControlEvent::ToggleHandedness => self.set_handedness(self.handedness.toggle()),
        }
        Ok(())
    }

    pub fn set_quantize(&mut self, on: bool) {
        if self.quantize != on {
            self.quantize = on;
            log::info!("quantization {}", if on { "on" } else { "off" });
        }
    }

    pub fn set_handedness(&mut self, handedness: Handedness) {
        if self.handedness != handedness {
            self.handedness = handedness;
            log::info!("{}", handedness.label());
        }
    }

    pub fn quantize(&self) -> bool {
        self.quantize
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// The most recent accepted tracker frame.
    pub fn last_gesture(&self) -> Option<GestureUpdate> {
        self.last_gesture
    }

    pub fn controller(&self) -> &ToneController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ToneController<S> {
        &mut self.controller
    }

    /// Current state for display.
    pub fn readout(&self) -> Readout {
        let c = &self.controller;
        let frequency = c.frequency();
        let matched = nearest_note(frequency, c.note_table(), self.note_tolerance_cents);
        Readout {
            frequency,
            amplitude: c.amplitude(),
            note: matched.as_ref().map(|m| m.name),
            cents: matched.as_ref().map(|m| m.cents),
            playing: c.is_playing(),
            key: c.key(),
            range: c.range_span(),
            min_frequency: c.min_frequency(),
            max_frequency: c.max_frequency(),
            quantize: self.quantize,
            handedness: self.handedness,
            pitch_position: frequency_to_linear(frequency, c.min_frequency(), c.max_frequency())
                .clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineSink;
    use assert_approx_eq::assert_approx_eq;

    fn theremin_in(key: Key) -> Theremin<OfflineSink> {
        let settings = SessionSettings {
            key,
            ..SessionSettings::default()
        };
        Theremin::new(OfflineSink::new(44100), &settings)
    }

    #[test]
    fn gesture_maps_pitch_and_volume() {
        let mut t = theremin_in(Key::A);
        t.on_gesture_update(0.3, 0.5).unwrap();
        let r = t.readout();
        assert_approx_eq!(r.frequency, 880.0, 0.01);
        assert_approx_eq!(r.amplitude, 0.3, 1e-6);
    }

    #[test]
    fn handedness_swaps_roles() {
        let mut t = theremin_in(Key::A);
        t.apply(ControlEvent::ToggleHandedness).unwrap();
        t.on_gesture_update(1.0, 0.25).unwrap();
        let r = t.readout();
        assert_eq!(r.frequency, 1760.0);
        assert_eq!(r.amplitude, 0.25);
        assert_eq!(r.handedness, Handedness::Left);
    }

    #[test]
    fn quantized_gesture_lands_on_table_entry() {
        let mut t = theremin_in(Key::A);
        t.apply(ControlEvent::SetQuantize(true)).unwrap();
        t.on_gesture_update(0.5, 0.47).unwrap();
        let expected = t.controller().note_table().get(6).unwrap().frequency;
        assert_eq!(t.readout().frequency, expected);
    }

    #[test]
    fn out_of_range_coordinates_clamp() {
        let mut t = theremin_in(Key::A);
        t.on_gesture_update(2.0, -1.0).unwrap();
        let r = t.readout();
        assert_eq!(r.frequency, 440.0);
        assert_eq!(r.amplitude, 1.0);
    }

    #[test]
    fn non_finite_gesture_holds_last_values() {
        let mut t = theremin_in(Key::A);
        t.on_gesture_update(0.4, 0.5).unwrap();
        let before = t.readout();
        t.on_gesture_update(f32::NAN, 0.9).unwrap();
        t.apply(ControlEvent::GestureLost).unwrap();
        let after = t.readout();
        assert_eq!(before.frequency, after.frequency);
        assert_eq!(before.amplitude, after.amplitude);
        assert_eq!(t.last_gesture(), Some(GestureUpdate::new(0.4, 0.5)));
    }

    #[test]
    fn invalid_key_event_is_an_error_without_side_effects() {
        let mut t = theremin_in(Key::C);
        let err = t.apply(ControlEvent::SelectKey("Z".to_string()));
        assert!(matches!(err, Err(ThereminError::InvalidKey(_))));
        assert_eq!(t.readout().key, Key::C);
    }

    #[test]
    fn readout_names_notes() {
        let mut t = theremin_in(Key::A);
        t.on_gesture_update(0.5, 0.5).unwrap();
        let r = t.readout();
        assert_eq!(r.note, Some("A"));
        assert_eq!(r.note_label(), "A");
        assert_approx_eq!(r.pitch_position, 0.5, 1e-4);
    }

    #[test]
    fn readout_none_between_notes() {
        let mut t = theremin_in(Key::A);
        // Halfway between A (440) and B (493.88) in log space is A#.
        t.controller_mut().set_frequency(466.16).unwrap();
        let r = t.readout();
        assert_eq!(r.note, None);
        assert_eq!(r.note_label(), "none");
    }

    #[test]
    fn guides_only_while_quantizing() {
        let mut t = theremin_in(Key::A);
        assert!(t.readout().guides(120.0).is_empty());
        t.apply(ControlEvent::ToggleQuantize).unwrap();
        let guides = t.readout().guides(120.0);
        assert_eq!(guides.len(), FREQ_INTERVALS);
        assert_eq!(guides[1], 10.0);
    }

    #[test]
    fn start_stop_events_drive_playback() {
        let mut t = theremin_in(Key::A);
        t.apply(ControlEvent::Start).unwrap();
        assert!(t.readout().playing);
        t.apply(ControlEvent::StartStop).unwrap();
        assert!(!t.readout().playing);
        t.apply(ControlEvent::StartStop).unwrap();
        assert!(t.readout().playing);
        t.apply(ControlEvent::Stop).unwrap();
        assert!(!t.readout().playing);
    }

    #[test]
    fn settings_amplitude_applied() {
        let settings = SessionSettings {
            amplitude: 0.6,
            ..SessionSettings::default()
        };
        let t = Theremin::new(OfflineSink::new(44100), &settings);
        assert_eq!(t.readout().amplitude, 0.6);
    }
}
