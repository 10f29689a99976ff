//! Error types for synth configuration.

use thiserror::Error;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: f32 = 8000.0;
/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;

/// Errors raised while configuring a [`Synth`](crate::Synth).
///
/// Rendering never fails; these only come from construction, sample-rate
/// changes and patch lookup.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SynthError {
    /// Sample rate is not finite or outside the supported range
    #[error("invalid sample rate {0} Hz (expected 8000 to 384000)")]
    InvalidSampleRate(f32),

    /// No factory patch has the requested name
    #[error("unknown factory patch")]
    UnknownPatch,
}

/// Result alias for synth configuration.
pub type Result<T> = core::result::Result<T, SynthError>;

/// Check that `sample_rate` is usable.
pub fn validate_sample_rate(sample_rate: f32) -> Result<f32> {
    if sample_rate.is_finite() && (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(sample_rate)
    } else {
        Err(SynthError::InvalidSampleRate(sample_rate))
    }
}
