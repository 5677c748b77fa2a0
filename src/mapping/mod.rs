//! Gesture-to-pitch mapping — normalized coordinates, logarithmic frequency, and scale steps.
//!
//! Everything here is a pure function of its arguments. Pitch perception is
//! logarithmic, so equal gesture movement maps to equal musical intervals.

pub mod note_table;

pub use note_table::{nearest_note, NoteEntry, NoteMatch, NoteTable};

/// Number of quantization steps (and note-table entries) across the range.
pub const FREQ_INTERVALS: usize = 12;

/// Map `t` in `[0, 1]` to a frequency between `min` and `max` on a log scale.
///
/// `t <= 0` returns `min` and `t >= 1` returns `max` exactly.
pub fn linear_to_frequency(t: f32, min: f32, max: f32) -> f32 {
    if t <= 0.0 {
        return min;
    }
    if t >= 1.0 {
        return max;
    }
    let lo = (min as f64).log10();
    let hi = (max as f64).log10();
    10f64.powf(t as f64 * (hi - lo) + lo) as f32
}

/// Inverse of [`linear_to_frequency`]. Not clamped: frequencies outside the
/// range map outside `[0, 1]`.
pub fn frequency_to_linear(freq: f32, min: f32, max: f32) -> f32 {
    let lo = (min as f64).log10();
    let hi = (max as f64).log10();
    (((freq as f64).log10() - lo) / (hi - lo)) as f32
}

/// Snap `t` to one of `steps` log-spaced frequencies starting at `min`.
///
/// The step index is `ceil(t * steps)`: crossing a boundary selects the next
/// higher step, so thresholds sit at `k / steps` rather than halfway between
/// steps. Only `t <= 0` selects the root; the index is capped at `steps - 1`,
/// so the result is always one of the [`NoteTable`] frequencies.
pub fn quantize_to_step(t: f32, steps: usize, min: f32, max: f32) -> f32 {
    let steps = steps.max(1);
    let step = (t.clamp(0.0, 1.0) * steps as f32).ceil() as usize;
    let step = step.min(steps - 1);
    linear_to_frequency(step as f32 / steps as f32, min, max)
}

/// Vertical positions of the pitch guide lines for a display of the given height.
pub fn guide_positions(total_height: f32) -> Vec<f32> {
    let spacing = total_height / FREQ_INTERVALS as f32;
    (0..FREQ_INTERVALS).map(|i| spacing * i as f32).collect()
}

/// Lowest sample rate that leaves headroom above the Nyquist limit for `max`.
pub fn required_sample_rate(min: f32, max: f32) -> u32 {
    (2.0 * max).ceil() as u32 + min.ceil() as u32
}
