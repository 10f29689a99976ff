//! Mathematical utility functions for DSP.
//!
//! Provides the pitch and level conversions used throughout the voice
//! pipeline. All functions are allocation-free and suitable for `no_std`.
//!
//! # Pitch Conversions
//!
//! - [`midi_to_freq`] - MIDI note number to Hz
//! - [`semitones_to_ratio`] / [`cents_to_ratio`] - Interval to frequency ratio
//!
//! # Waveshaping
//!
//! - [`soft_clip`] - Hyperbolic tangent saturation
//!
//! # Utilities
//!
//! - [`flush_denormal`] - Denormal protection for recursive state
//! - [`ms_to_samples`] - Time conversion

use libm::{exp2f, tanhf};

/// Reference pitch for A4 in Hz.
pub const A4_FREQ: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_NOTE: f32 = 69.0;

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning where A4 (note 69) = 440 Hz.
///
/// # Example
///
/// ```rust
/// use poorhouse_core::midi_to_freq;
///
/// assert!((midi_to_freq(69) - 440.0).abs() < 0.01);
/// assert!((midi_to_freq(81) - 880.0).abs() < 0.01);
/// ```
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    A4_FREQ * exp2f((f32::from(note) - A4_NOTE) / 12.0)
}

/// Convert an interval in semitones to a frequency ratio.
///
/// `2^(semitones / 12)`. Twelve semitones doubles the frequency.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    exp2f(semitones / 12.0)
}

/// Convert an interval in cents to a frequency ratio.
///
/// `2^(cents / 1200)`.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    exp2f(cents / 1200.0)
}

/// Soft clip using hyperbolic tangent.
///
/// Smooth saturation that approaches ±1 asymptotically.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Convert milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * 0.001 * sample_rate
}

/// Flush values in the subnormal range to zero.
///
/// Recursive filter state decaying toward zero can enter the subnormal
/// range, where some CPUs run orders of magnitude slower.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_to_freq() {
        assert!((midi_to_freq(69) - 440.0).abs() < 0.01);
        assert!((midi_to_freq(57) - 220.0).abs() < 0.01);
        assert!((midi_to_freq(60) - 261.63).abs() < 0.01);
    }

    #[test]
    fn test_interval_ratios() {
        assert!((semitones_to_ratio(12.0) - 2.0).abs() < 1e-5);
        assert!((semitones_to_ratio(-12.0) - 0.5).abs() < 1e-5);
        assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-5);
        assert_eq!(cents_to_ratio(0.0), 1.0);
    }

    #[test]
    fn test_soft_clip_is_bounded() {
        assert!(soft_clip(100.0) <= 1.0);
        assert!(soft_clip(-100.0) >= -1.0);
        assert!((soft_clip(0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-38), 0.0);
    }

    #[test]
    fn test_ms_to_samples() {
        assert!((ms_to_samples(10.0, 48000.0) - 480.0).abs() < 1e-3);
    }
}
