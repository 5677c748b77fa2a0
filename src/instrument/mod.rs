//! Instrument core — the oscillator, keys, and the tone controller that ties them together.

pub mod controller;
pub mod key;
pub mod oscillator;

pub use controller::ToneController;
pub use key::{Key, RangeSpan};
pub use oscillator::{Oscillator, OscillatorHandle};
