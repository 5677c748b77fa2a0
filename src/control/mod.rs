//! Control input — mpsc-based event bridge from gesture trackers, OSC, and the UI.
//!
//! Producers (the OSC listener thread, the terminal UI, a host application)
//! send [`ControlEvent`]s; the thread that owns the [`Theremin`] drains them.
//!
//! [`Theremin`]: crate::theremin::Theremin

pub mod gesture;

use std::sync::mpsc;
use std::time::Duration;

pub use gesture::{GestureUpdate, Handedness};

/// Events that change what the instrument plays.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// New hand positions, each normalized to `[0, 1]`.
    Gesture(GestureUpdate),
    /// The tracker has no hands in view. Parameters hold their last values.
    GestureLost,
    /// Toggle play/stop.
    StartStop,
    /// Start playing.
    Start,
    /// Stop playing.
    Stop,
    /// Select a key by name.
    SelectKey(String),
    /// Enable or disable quantization.
    SetQuantize(bool),
    /// Flip quantization.
    ToggleQuantize,
    /// Set which hand controls pitch.
    SetHandedness(Handedness),
    /// Swap which hand controls pitch.
    ToggleHandedness,
}

/// Sender half — clone this for each producer thread.
pub type ControlSender = mpsc::Sender<ControlEvent>;

/// Receiver half — held by the thread that owns the instrument.
pub struct ControlReceiver {
    rx: mpsc::Receiver<ControlEvent>,
}

impl ControlReceiver {
    /// Non-blocking poll for the next event.
    pub fn poll(&self) -> Option<ControlEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn poll_timeout(&self, timeout: Duration) -> Option<ControlEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Create a new control channel pair.
pub fn control_channel() -> (ControlSender, ControlReceiver) {
    let (tx, rx) = mpsc::channel();
    (tx, ControlReceiver { rx })
}
