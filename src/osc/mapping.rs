//! OSC message mapping — converts OSC addresses and arguments to ControlEvents.

use rosc::{OscMessage, OscType};
use serde::{Deserialize, Serialize};

use crate::control::{ControlEvent, GestureUpdate, Handedness};

/// What an OSC message maps to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OscTarget {
    /// Hand positions (expects two float args: left, right).
    Hands,
    /// Tracker lost the hands.
    HandsLost,
    /// Toggle play/stop.
    PlayStop,
    Start,
    Stop,
    /// Select a key (expects a string arg).
    Key,
    /// Set quantization (bool, int or float arg); toggles with no arg.
    Quantize,
    /// Set handedness ("left"/"right" string arg); toggles with no arg.
    Handedness,
}

/// A mapping from an OSC address pattern to a target action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscMapping {
    pub address_pattern: String,
    pub target: OscTarget,
}

/// Apply an OSC message against mappings to produce a ControlEvent.
pub fn apply_osc_message(msg: &OscMessage, mappings: &[OscMapping]) -> Option<ControlEvent> {
    let mapping = mappings
        .iter()
        .find(|m| osc_address_matches(&msg.addr, &m.address_pattern))?;
    match mapping.target {
        OscTarget::Hands => {
            let left = extract_float(&msg.args, 0)?;
            let right = extract_float(&msg.args, 1)?;
            Some(ControlEvent::Gesture(GestureUpdate::new(left, right)))
        }
        OscTarget::HandsLost => Some(ControlEvent::GestureLost),
        OscTarget::PlayStop => Some(ControlEvent::StartStop),
        OscTarget::Start => Some(ControlEvent::Start),
        OscTarget::Stop => Some(ControlEvent::Stop),
        OscTarget::Key => extract_string(&msg.args, 0).map(ControlEvent::SelectKey),
        OscTarget::Quantize => match msg.args.first() {
            None => Some(ControlEvent::ToggleQuantize),
            Some(_) => extract_bool(&msg.args, 0).map(ControlEvent::SetQuantize),
        },
        OscTarget::Handedness => match msg.args.first() {
            None => Some(ControlEvent::ToggleHandedness),
            Some(_) => {
                let name = extract_string(&msg.args, 0)?;
                match name.to_ascii_lowercase().as_str() {
                    "left" => Some(ControlEvent::SetHandedness(Handedness::Left)),
                    "right" => Some(ControlEvent::SetHandedness(Handedness::Right)),
                    _ => None,
                }
            }
        },
    }
}

/// Simple address matching (exact match).
fn osc_address_matches(addr: &str, pattern: &str) -> bool {
    addr == pattern
}

/// Extract a float from OSC args at the given index.
fn extract_float(args: &[OscType], index: usize) -> Option<f32> {
    args.get(index).and_then(|arg| match arg {
        OscType::Float(f) => Some(*f),
        OscType::Double(d) => Some(*d as f32),
        OscType::Int(i) => Some(*i as f32),
        _ => None,
    })
}

fn extract_string(args: &[OscType], index: usize) -> Option<String> {
    args.get(index).and_then(|arg| match arg {
        OscType::String(s) => Some(s.clone()),
        _ => None,
    })
}

fn extract_bool(args: &[OscType], index: usize) -> Option<bool> {
    args.get(index).and_then(|arg| match arg {
        OscType::Bool(b) => Some(*b),
        OscType::Int(i) => Some(*i != 0),
        OscType::Float(f) => Some(*f >= 0.5),
        _ => None,
    })
}
