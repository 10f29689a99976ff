//! Zero-delay-feedback 4-pole ladder lowpass.
//!
//! Four [`ZdfOnePole`] stages in series with global negative feedback from
//! the last stage to the first:
//!
//! ```text
//! u  = x - k · y4
//! y1 = LP(u), y2 = LP(y1), y3 = LP(y2), y4 = LP(y3)
//! ```
//!
//! `k = 4 · resonance`. At `k = 4` the loop gain at the cutoff reaches unity
//! and the filter self-oscillates. The feedback loop is solved
//! instantaneously: each stage is written as `y = G·x + σ` with
//! `σ = s·(1 - G)`, which gives
//!
//! ```text
//! y4 = (G⁴·x + G³σ1 + G²σ2 + Gσ3 + σ4) / (1 + k·G⁴)
//! ```
//!
//! The loop input is linear. Only the fed-back term `k · y4` passes through
//! `tanh`, which bounds self-oscillation while leaving a zero-resonance
//! ladder (where the term is zero) exactly linear.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 5.

use crate::one_pole::{ZdfOnePole, zdf_gain, zdf_resolve};
use crate::soft_clip;

/// Maximum feedback gain (self-oscillation threshold).
pub const MAX_FEEDBACK: f32 = 4.0;

/// 4-pole (24 dB/oct) ZDF ladder lowpass.
///
/// ## Parameters
/// - `cutoff`: Cutoff in Hz (clamped to 20 Hz..0.49·fs)
/// - `resonance`: 0.0 to 1.0, mapped to feedback `k = 4 · resonance`
///
/// # Example
///
/// ```rust
/// use poorhouse_core::LadderFilter;
///
/// let mut ladder = LadderFilter::new(48000.0);
/// ladder.set_cutoff(1000.0);
/// ladder.set_resonance(0.5);
/// let out = ladder.process(0.25);
/// assert!(out.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LadderFilter {
    stages: [ZdfOnePole; 4],
    /// Resolved per-stage gain `G`
    g: f32,
    /// Feedback gain
    k: f32,
    cutoff: f32,
    resonance: f32,
    sample_rate: f32,
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl LadderFilter {
    /// Create a ladder with cutoff 1 kHz and no resonance.
    pub fn new(sample_rate: f32) -> Self {
        let mut ladder = Self {
            stages: core::array::from_fn(|_| ZdfOnePole::new(sample_rate, 1000.0)),
            g: 0.0,
            k: 0.0,
            cutoff: 1000.0,
            resonance: 0.0,
            sample_rate,
        };
        ladder.set_cutoff(1000.0);
        ladder
    }

    /// Set the cutoff frequency in Hz.
    ///
    /// Range: 20.0 to `sample_rate × 0.49`. Values are clamped.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff = cutoff_hz.clamp(20.0, self.sample_rate * 0.49);
        self.set_prewarped_gain(zdf_gain(self.cutoff, self.sample_rate));
    }

    /// Set the prewarped gain `g = tan(π·fc/fs)` directly.
    ///
    /// Callers that already hold the tangent (for example when caching it
    /// across samples) use this to skip the trigonometry.
    #[inline]
    pub fn set_prewarped_gain(&mut self, g: f32) {
        self.g = zdf_resolve(g);
        for stage in &mut self.stages {
            stage.set_gain(self.g);
        }
    }

    /// Get the cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance (0.0 to 1.0).
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 1.0);
        self.k = self.resonance * MAX_FEEDBACK;
    }

    /// Get resonance (0.0 to 1.0).
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Update sample rate and recompute the gain for the current cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_cutoff(self.cutoff);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let g = self.g;
        let beta = 1.0 - g;
        let [s1, s2, s3, s4] = [
            self.stages[0].state() * beta,
            self.stages[1].state() * beta,
            self.stages[2].state() * beta,
            self.stages[3].state() * beta,
        ];
        let sigma = ((s1 * g + s2) * g + s3) * g + s4;
        let g4 = g * g * g * g;
        let y4 = (g4 * input + sigma) / (1.0 + self.k * g4);

        let u = input - soft_clip(self.k * y4);
        let y1 = self.stages[0].process(u);
        let y2 = self.stages[1].process(y1);
        let y3 = self.stages[2].process(y2);
        self.stages[3].process(y3)
    }

    /// Zero all four stage states. Cutoff and resonance are kept.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;
    use libm::sinf;

    fn steady_peak(resonance: f32, freq: f32) -> f32 {
        let sr = 48000.0;
        let mut ladder = LadderFilter::new(sr);
        ladder.set_cutoff(freq);
        ladder.set_resonance(resonance);
        let mut peak = 0.0f32;
        for i in 0..48000 {
            let x = 0.02 * sinf(TAU * freq * i as f32 / sr);
            let y = ladder.process(x);
            if i > 43200 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_passes_low_frequencies() {
        for level in [0.5, 2.0, -3.0] {
            let mut ladder = LadderFilter::new(48000.0);
            ladder.set_cutoff(5000.0);
            let mut out = 0.0;
            for _ in 0..4800 {
                out = ladder.process(level);
            }
            assert!(
                (out - level).abs() < 1e-3 * level.abs(),
                "DC {level} should pass at unity gain with no resonance, got {out}"
            );
        }
    }

    #[test]
    fn test_small_signals_stay_linear_with_resonance() {
        // DC gain of the linear ladder is 1 / (1 + k)
        let mut ladder = LadderFilter::new(48000.0);
        ladder.set_cutoff(2000.0);
        ladder.set_resonance(0.25);
        let mut out = 0.0;
        for _ in 0..9600 {
            out = ladder.process(0.01);
        }
        assert!((out - 0.005).abs() < 1e-4, "expected 0.005, got {out}");
    }

    #[test]
    fn test_attenuates_above_cutoff() {
        let mut ladder = LadderFilter::new(48000.0);
        ladder.set_cutoff(200.0);
        let mut peak = 0.0f32;
        for i in 0..9600 {
            let x = 0.5 * sinf(TAU * 8000.0 * i as f32 / 48000.0);
            let y = ladder.process(x);
            if i > 4800 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 1e-4, "24 dB/oct slope should crush 8 kHz, got {peak}");
    }

    #[test]
    fn test_resonance_boosts_cutoff_region() {
        let low = steady_peak(0.0, 1000.0);
        let high = steady_peak(0.8, 1000.0);
        assert!(high > low * 2.0, "resonance should boost: {low} -> {high}");
    }

    #[test]
    fn test_stable_at_extreme_cutoff() {
        let mut ladder = LadderFilter::new(48000.0);
        ladder.set_cutoff(30000.0);
        ladder.set_resonance(1.0);
        for i in 0..48000 {
            let x = if i % 7 == 0 { 1.0 } else { -0.3 };
            let y = ladder.process(x);
            assert!(y.is_finite() && y.abs() < 10.0, "unstable at sample {i}: {y}");
        }
    }

    #[test]
    fn test_self_oscillation_sustains() {
        let mut ladder = LadderFilter::new(48000.0);
        ladder.set_cutoff(1000.0);
        ladder.set_resonance(1.0);
        ladder.process(1.0);
        let mut peak = 0.0f32;
        for i in 0..9600 {
            let y = ladder.process(0.0);
            if i > 4800 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak > 1e-3, "full resonance should ring on, got {peak}");
    }

    #[test]
    fn test_reset_reproduces_impulse_response() {
        let mut used = LadderFilter::new(48000.0);
        used.set_cutoff(2500.0);
        used.set_resonance(0.6);
        for i in 0..1000 {
            used.process(if i % 3 == 0 { 0.8 } else { -0.2 });
        }
        used.reset();

        let mut fresh = LadderFilter::new(48000.0);
        fresh.set_cutoff(2500.0);
        fresh.set_resonance(0.6);

        for i in 0..512 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            assert_eq!(used.process(x), fresh.process(x), "mismatch at {i}");
        }
    }
}
