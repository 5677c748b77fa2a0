//! Musical keys — the 12 pitch classes, their root frequencies, and the playable range span.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThereminError;

/// Pitch-class names in ascending order from C, using sharps.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the 12 pitch classes, selecting the bottom of the playable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    #[default]
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl Key {
    /// All keys in ascending order.
    pub const ALL: [Key; 12] = [
        Key::C,
        Key::CSharp,
        Key::D,
        Key::DSharp,
        Key::E,
        Key::F,
        Key::FSharp,
        Key::G,
        Key::GSharp,
        Key::A,
        Key::ASharp,
        Key::B,
    ];

    /// Semitone index from C (0..12).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Root frequency in Hz, octave 4 (A = 440 Hz).
    pub fn root_frequency(self) -> f32 {
        match self {
            Key::C => 261.63,
            Key::CSharp => 277.18,
            Key::D => 293.66,
            Key::DSharp => 311.13,
            Key::E => 329.63,
            Key::F => 349.23,
            Key::FSharp => 369.99,
            Key::G => 392.00,
            Key::GSharp => 415.30,
            Key::A => 440.00,
            Key::ASharp => 466.16,
            Key::B => 493.88,
        }
    }

    /// Canonical (sharp) name.
    pub fn name(self) -> &'static str {
        PITCH_CLASSES[self.index()]
    }

    /// Next key up, wrapping B → C.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % 12]
    }

    /// Next key down, wrapping C → B.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + 11) % 12]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a key name: a letter A–G, optionally followed by `#`/`♯` (sharp) or
/// `b`/`♭` (flat). Case-insensitive; surrounding whitespace is ignored.
impl FromStr for Key {
    type Err = ThereminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ThereminError::InvalidKey(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();

        let base: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(invalid()),
        };

        let accidental: i32 = match chars.next() {
            None => 0,
            Some('#') | Some('♯') => 1,
            Some('b') | Some('B') | Some('♭') => -1,
            Some(_) => return Err(invalid()),
        };

        if chars.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::ALL[(base + accidental).rem_euclid(12) as usize])
    }
}

impl TryFrom<String> for Key {
    type Error = ThereminError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.name().to_string()
    }
}

/// How far above the root the playable range extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeSpan {
    /// Root to one octave up (×2).
    OneOctave,
    /// Root to two octaves up (×4).
    #[default]
    TwoOctaves,
}

impl RangeSpan {
    /// Ratio between the top and bottom of the range.
    pub fn multiplier(self) -> f32 {
        match self {
            RangeSpan::OneOctave => 2.0,
            RangeSpan::TwoOctaves => 4.0,
        }
    }

    /// Number of octaves covered.
    pub fn octaves(self) -> u8 {
        match self {
            RangeSpan::OneOctave => 1,
            RangeSpan::TwoOctaves => 2,
        }
    }

    /// Build from an octave count (1 or 2).
    pub fn from_octaves(octaves: u8) -> Option<Self> {
        match octaves {
            1 => Some(RangeSpan::OneOctave),
            2 => Some(RangeSpan::TwoOctaves),
            _ => None,
        }
    }

    /// `(min, max)` frequencies for a key.
    pub fn bounds(self, key: Key) -> (f32, f32) {
        let min = key.root_frequency();
        (min, min * self.multiplier())
    }
}

/// Name of the equal-tempered pitch class closest to `freq` (A4 = 440 Hz).
pub fn pitch_class_name(freq: f32) -> &'static str {
    let semitones_from_a = (12.0 * (freq as f64 / 440.0).log2()).round() as i64;
    PITCH_CLASSES[(Key::A.index() as i64 + semitones_from_a).rem_euclid(12) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_naturals() {
        assert_eq!("C".parse::<Key>().unwrap(), Key::C);
        assert_eq!("A".parse::<Key>().unwrap(), Key::A);
        assert_eq!("B".parse::<Key>().unwrap(), Key::B);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("a".parse::<Key>().unwrap(), Key::A);
        assert_eq!("f#".parse::<Key>().unwrap(), Key::FSharp);
        assert_eq!(" g ".parse::<Key>().unwrap(), Key::G);
    }

    #[test]
    fn parse_enharmonic_aliases() {
        assert_eq!("Db".parse::<Key>().unwrap(), Key::CSharp);
        assert_eq!("DB".parse::<Key>().unwrap(), Key::CSharp);
        assert_eq!("Bb".parse::<Key>().unwrap(), Key::ASharp);
        assert_eq!("E♭".parse::<Key>().unwrap(), Key::DSharp);
        assert_eq!("Cb".parse::<Key>().unwrap(), Key::B);
        assert_eq!("B#".parse::<Key>().unwrap(), Key::C);
        assert_eq!("E#".parse::<Key>().unwrap(), Key::F);
    }

    #[test]
    fn parse_rejects_unknown() {
        for bad in ["", "H", "INVALID", "C##", "C4", "#"] {
            assert!(bad.parse::<Key>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn root_frequencies_ascend() {
        for pair in Key::ALL.windows(2) {
            assert!(pair[0].root_frequency() < pair[1].root_frequency());
        }
        assert_eq!(Key::A.root_frequency(), 440.0);
    }

    #[test]
    fn next_and_prev_wrap() {
        assert_eq!(Key::B.next(), Key::C);
        assert_eq!(Key::C.prev(), Key::B);
        assert_eq!(Key::A.next().prev(), Key::A);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for key in Key::ALL {
            assert_eq!(key.to_string().parse::<Key>().unwrap(), key);
        }
    }

    #[test]
    fn two_octave_bounds_for_a() {
        let (min, max) = RangeSpan::TwoOctaves.bounds(Key::A);
        assert_eq!(min, 440.0);
        assert_eq!(max, 1760.0);
    }

    #[test]
    fn one_octave_bounds_for_a() {
        let (min, max) = RangeSpan::OneOctave.bounds(Key::A);
        assert_eq!(min, 440.0);
        assert_eq!(max, 880.0);
    }

    #[test]
    fn default_span_is_two_octaves() {
        assert_eq!(RangeSpan::default(), RangeSpan::TwoOctaves);
        assert_eq!(RangeSpan::from_octaves(1), Some(RangeSpan::OneOctave));
        assert_eq!(RangeSpan::from_octaves(3), None);
    }

    #[test]
    fn pitch_class_names_of_roots() {
        for key in Key::ALL {
            assert_eq!(pitch_class_name(key.root_frequency()), key.name());
            assert_eq!(pitch_class_name(key.root_frequency() * 2.0), key.name());
        }
    }

    #[test]
    fn key_serde_uses_names() {
        let yaml = serde_yaml::to_string(&Key::FSharp).unwrap();
        assert!(yaml.contains("F#"));
        assert_eq!(serde_yaml::from_str::<Key>(&yaml).unwrap(), Key::FSharp);
        let parsed: Key = serde_yaml::from_str("bb").unwrap();
        assert_eq!(parsed, Key::ASharp);
        assert!(serde_yaml::from_str::<Key>("X").is_err());
    }
}
