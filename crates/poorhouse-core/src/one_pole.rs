//! Zero-delay-feedback one-pole filter.
//!
//! A trapezoidal-integrator (TPT) one-pole with the per-sample update:
//!
//! ```text
//! v     = (x - s) * G
//! lp    = v + s
//! s     = lp + v
//! hp    = x - lp
//! ```
//!
//! where `g = tan(π · fc / fs)` is the prewarped integrator gain and
//! `G = g / (1 + g)` resolves the zero-delay loop. `G` stays in (0, 1) for
//! every cutoff below Nyquist, so the recursion is unconditionally stable.
//!
//! This is the building block of the ladder in [`crate::ladder`] and of the
//! voice high-pass stage.
//!
//! # Usage
//!
//! ```rust
//! use poorhouse_core::ZdfOnePole;
//!
//! let mut hp = ZdfOnePole::new(48000.0, 120.0);
//! let out = hp.process_highpass(1.0);
//! assert!(out > 0.0 && out <= 1.0);
//! ```
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use crate::flush_denormal;
use core::f32::consts::PI;
use libm::tanf;

/// Compute the bilinear-warped integrator gain `tan(π · fc / fs)`.
///
/// The cutoff is clamped to `[1 Hz, 0.49 · fs]` so the tangent never
/// approaches its pole at Nyquist.
#[inline]
pub fn zdf_gain(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let fc = cutoff_hz.clamp(1.0, sample_rate * 0.49);
    tanf(PI * fc / sample_rate)
}

/// Resolve a prewarped gain `g` into the instantaneous one-pole gain `g / (1 + g)`.
#[inline]
pub fn zdf_resolve(g: f32) -> f32 {
    g / (1.0 + g)
}

/// One-pole ZDF filter with simultaneous lowpass and highpass outputs.
///
/// # Invariants
///
/// - `g` is the resolved gain, always in (0, 1)
/// - `state` is flushed to zero when below 1e-20 (denormal protection)
#[derive(Debug, Clone)]
pub struct ZdfOnePole {
    state: f32,
    g: f32,
    cutoff: f32,
    sample_rate: f32,
}

impl Default for ZdfOnePole {
    fn default() -> Self {
        Self::new(48000.0, 1000.0)
    }
}

impl ZdfOnePole {
    /// Create a new one-pole filter at the given cutoff.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            state: 0.0,
            g: zdf_resolve(zdf_gain(cutoff_hz, sample_rate)),
            cutoff: cutoff_hz,
            sample_rate,
        }
    }

    /// Set the cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff = cutoff_hz;
        self.g = zdf_resolve(zdf_gain(cutoff_hz, self.sample_rate));
    }

    /// Get the cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set the resolved gain `G` directly.
    ///
    /// Used when several stages share one precomputed gain.
    #[inline]
    pub fn set_gain(&mut self, g: f32) {
        self.g = g;
    }

    /// Update the sample rate and recompute the gain.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.g = zdf_resolve(zdf_gain(self.cutoff, sample_rate));
    }

    /// Process one sample, returning the lowpass output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let v = (input - self.state) * self.g;
        let lp = v + self.state;
        self.state = flush_denormal(lp + v);
        lp
    }

    /// Process one sample, returning the highpass output (`input - lowpass`).
    #[inline]
    pub fn process_highpass(&mut self, input: f32) -> f32 {
        input - self.process(input)
    }

    /// Current integrator state.
    #[inline]
    pub fn state(&self) -> f32 {
        self.state
    }

    /// Zero the integrator state. The gain is kept.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
