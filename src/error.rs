//! Error types for the theremin core.

use thiserror::Error;

use crate::audio::AudioError;

/// Errors raised by the oscillator, tone controller, and session.
///
/// None of these stop audio output. Callers log them and keep the last good
/// value.
#[derive(Debug, Error)]
pub enum ThereminError {
    /// Key name is not one of the 12 pitch classes or their aliases.
    #[error("unknown key: {0:?}")]
    InvalidKey(String),
    /// Frequency is non-finite or not positive.
    #[error("invalid frequency: {0} Hz")]
    InvalidFrequency(f32),
    /// Amplitude is non-finite.
    #[error("invalid amplitude: {0}")]
    InvalidAmplitude(f32),
    /// Sample rate of zero.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
    /// Output rate cannot represent the top of the playable range.
    #[error("sample rate {rate} Hz is below the {required} Hz needed for this range")]
    SampleRateTooLow { rate: u32, required: u32 },
    /// Output device failure.
    #[error(transparent)]
    Audio(#[from] AudioError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ThereminError::InvalidKey("H".to_string()).to_string(),
            "unknown key: \"H\""
        );
        assert_eq!(
            ThereminError::SampleRateTooLow {
                rate: 2000,
                required: 3960
            }
            .to_string(),
            "sample rate 2000 Hz is below the 3960 Hz needed for this range"
        );
    }

    #[test]
    fn audio_error_is_transparent() {
        let err: ThereminError = AudioError::NoOutputDevice.into();
        assert_eq!(err.to_string(), "no audio output device found");
    }
}
