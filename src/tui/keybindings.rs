//! Key bindings — maps key events to application actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Pitch change per arrow press, as a fraction of the range.
pub const PITCH_STEP: f32 = 1.0 / 48.0;
/// Pitch change per shifted arrow press: one quantization step.
pub const PITCH_STEP_COARSE: f32 = 1.0 / 12.0;
/// Volume change per arrow press.
pub const VOLUME_STEP: f32 = 0.05;

/// Application-level actions triggered by key events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Toggle play/stop.
    TogglePlayback,
    ToggleQuantize,
    /// Swap which hand controls pitch.
    ToggleHandedness,
    NextKey,
    PrevKey,
    /// Switch between the one- and two-octave range.
    ToggleRange,
    /// Move the pitch control by a fraction of the range.
    NudgePitch(f32),
    /// Move the volume control.
    NudgeVolume(f32),
}

/// Map a key event to an action.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePlayback),
        KeyCode::Char('z') => Some(Action::ToggleQuantize),
        KeyCode::Char('h') => Some(Action::ToggleHandedness),
        KeyCode::Char(']') => Some(Action::NextKey),
        KeyCode::Char('[') => Some(Action::PrevKey),
        KeyCode::Char('o') => Some(Action::ToggleRange),
        KeyCode::Up if shift => Some(Action::NudgePitch(PITCH_STEP_COARSE)),
        KeyCode::Down if shift => Some(Action::NudgePitch(-PITCH_STEP_COARSE)),
        KeyCode::Up => Some(Action::NudgePitch(PITCH_STEP)),
        KeyCode::Down => Some(Action::NudgePitch(-PITCH_STEP)),
        KeyCode::Right => Some(Action::NudgeVolume(VOLUME_STEP)),
        KeyCode::Left => Some(Action::NudgeVolume(-VOLUME_STEP)),
        _ => None,
    }
}

/// One-line help for the status bar.
pub fn hint() -> &'static str {
    "Space:play  ↑↓:pitch  ←→:volume  z:quantize  h:hands  [ ]:key  o:range  q:quit"
}
