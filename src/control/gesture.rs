//! Gesture updates — two normalized hand positions and the handedness that assigns them.

use serde::{Deserialize, Serialize};

/// One tracker frame: a normalized coordinate per hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureUpdate {
    pub left: f32,
    pub right: f32,
}

impl GestureUpdate {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.right.is_finite()
    }

    /// Split into `(pitch, volume)` scalars, each clamped to `[0, 1]`.
    pub fn assign(&self, handedness: Handedness) -> (f32, f32) {
        let (pitch, volume) = match handedness {
            Handedness::Right => (self.right, self.left),
            Handedness::Left => (self.left, self.right),
        };
        (pitch.clamp(0.0, 1.0), volume.clamp(0.0, 1.0))
    }

    /// Build an update from `(pitch, volume)` scalars.
    pub fn from_controls(pitch: f32, volume: f32, handedness: Handedness) -> Self {
        match handedness {
            Handedness::Right => Self::new(volume, pitch),
            Handedness::Left => Self::new(pitch, volume),
        }
    }
}

/// Which hand controls pitch. The other hand controls volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    pub fn toggle(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Right => "right-handed",
            Self::Left => "left-handed",
        }
    }
}
