//! Note table — the 12 log-spaced frequencies of the active range and their labels.

use crate::instrument::key::pitch_class_name;

use super::{linear_to_frequency, FREQ_INTERVALS};

/// A labelled frequency in the note table.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEntry {
    pub name: &'static str,
    pub frequency: f32,
}

/// Result of a nearest-note lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteMatch {
    pub name: &'static str,
    /// Index into the note table.
    pub index: usize,
    /// Signed distance from the table entry in cents, octave-folded.
    pub cents: f32,
}

/// Ascending table of [`FREQ_INTERVALS`] entries dividing `[min, max)` into
/// equal log steps. Entry `k` is `linear_to_frequency(k / 12, min, max)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteTable {
    entries: Vec<NoteEntry>,
}

impl NoteTable {
    /// Build the table for a range.
    pub fn new(min: f32, max: f32) -> Self {
        let entries = (0..FREQ_INTERVALS)
            .map(|k| {
                let frequency =
                    linear_to_frequency(k as f32 / FREQ_INTERVALS as f32, min, max);
                NoteEntry {
                    name: pitch_class_name(frequency),
                    frequency,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by index.
    pub fn get(&self, index: usize) -> Option<&NoteEntry> {
        self.entries.get(index)
    }
}

/// Find the table entry closest to `freq`, comparing pitch classes.
///
/// Distance is measured in cents with octaves folded away, so a frequency an
/// octave above an entry matches that entry. On an exact tie the higher entry
/// wins. Returns `None` for non-positive or non-finite input, or when the
/// closest entry is more than `tolerance_cents` away.
pub fn nearest_note(freq: f32, table: &NoteTable, tolerance_cents: f32) -> Option<NoteMatch> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }

    let mut best: Option<NoteMatch> = None;
    for (index, entry) in table.entries().iter().enumerate() {
        let cents = folded_cents(freq, entry.frequency);
        let closer = match &best {
            None => true,
            Some(b) => cents.abs() <= b.cents.abs(),
        };
        if closer {
            best = Some(NoteMatch {
                name: entry.name,
                index,
                cents,
            });
        }
    }

    best.filter(|m| m.cents.abs() <= tolerance_cents)
}

/// Cents from `reference` to `freq`, folded into `[-600, 600)`.
fn folded_cents(freq: f32, reference: f32) -> f32 {
    let cents = 1200.0 * (freq as f64 / reference as f64).log2();
    ((cents + 600.0).rem_euclid(1200.0) - 600.0) as f32
}
