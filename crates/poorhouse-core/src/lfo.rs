//! Triangle low-frequency oscillator with onset delay.
//!
//! The waveform starts at zero, peaks at +1 a quarter of the way through the
//! cycle, bottoms out at −1 at three quarters and returns to zero:
//!
//! ```text
//!  +1 |    /\
//!   0 |---/--\------/---
//!  -1 |         \/
//!     0   ¼   ½   ¾   1   (phase)
//! ```
//!
//! Because the cycle begins at zero, the linear onset-delay fade composes
//! without a jump: [`Lfo::trigger`] restarts the fade, and while it runs the
//! raw value is scaled by `timer / delay`.

/// Lowest supported rate in Hz.
pub const MIN_RATE_HZ: f32 = 0.1;
/// Highest supported rate in Hz.
pub const MAX_RATE_HZ: f32 = 30.0;
/// Longest supported onset delay in seconds.
pub const MAX_DELAY_SECONDS: f32 = 3.0;

/// Evaluate the zero-start triangle at `phase` in [0, 1).
#[inline]
pub fn triangle(phase: f32) -> f32 {
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        4.0 * phase - 4.0
    }
}

/// Free-running triangle LFO with a delayed fade-in.
///
/// ## Parameters
/// - `rate`: Frequency in Hz (0.1 to 30.0, default 2.0)
/// - `delay`: Fade-in time after [`trigger`](Lfo::trigger) in seconds (0.0 to 3.0, default 0.0)
///
/// # Example
///
/// ```rust
/// use poorhouse_core::Lfo;
///
/// let mut lfo = Lfo::new(48000.0, 2.0);
/// lfo.set_delay(0.5);
/// lfo.trigger();
///
/// let value = lfo.advance();
/// assert_eq!(value, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    rate: f32,
    delay: f32,
    /// Seconds elapsed since the last trigger
    delay_timer: f32,
    sample_rate: f32,
    /// Last value produced by `advance`
    value: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 2.0)
    }
}

impl Lfo {
    /// Create a new LFO with the given sample rate and rate in Hz.
    pub fn new(sample_rate: f32, rate_hz: f32) -> Self {
        let mut lfo = Self {
            phase: 0.0,
            phase_inc: 0.0,
            rate: rate_hz,
            delay: 0.0,
            delay_timer: 0.0,
            sample_rate,
            value: 0.0,
        };
        lfo.set_rate(rate_hz);
        lfo
    }

    /// Set rate in Hz (clamped to 0.1..=30.0).
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate = rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ);
        self.phase_inc = self.rate / self.sample_rate;
    }

    /// Get rate in Hz.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set onset delay in seconds (clamped to 0.0..=3.0).
    pub fn set_delay(&mut self, seconds: f32) {
        self.delay = seconds.clamp(0.0, MAX_DELAY_SECONDS);
    }

    /// Get onset delay in seconds.
    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Update the sample rate, keeping the rate in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.phase_inc = self.rate / sample_rate;
    }

    /// Current phase (0.0 to 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Restart the onset-delay fade. Phase keeps running.
    pub fn trigger(&mut self) {
        self.delay_timer = 0.0;
    }

    /// Reset phase and fade timer.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.delay_timer = 0.0;
        self.value = 0.0;
    }

    /// Current fade-in scale in [0, 1].
    #[inline]
    pub fn fade(&self) -> f32 {
        if self.delay <= 0.0 || self.delay_timer >= self.delay {
            1.0
        } else {
            self.delay_timer / self.delay
        }
    }

    /// Produce the next value in [-1, 1] and advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.value = triangle(self.phase) * self.fade();

        if self.delay_timer < self.delay {
            self.delay_timer += 1.0 / self.sample_rate;
        }

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        self.value
    }

    /// Last value produced by [`advance`](Self::advance).
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_shape() {
        assert_eq!(triangle(0.0), 0.0);
        assert!((triangle(0.25) - 1.0).abs() < 1e-6);
        assert!((triangle(0.5)).abs() < 1e-6);
        assert!((triangle(0.75) + 1.0).abs() < 1e-6);
        assert!((triangle(0.999) + 0.004).abs() < 1e-3);
    }

    #[test]
    fn test_one_period_spans_full_range() {
        let sr = 48000.0;
        let mut lfo = Lfo::new(sr, 1.0);
        let first = lfo.advance();
        let mut min = first;
        let mut max = first;
        for _ in 1..48000 {
            let v = lfo.advance();
            min = min.min(v);
            max = max.max(v);
        }
        assert_eq!(first, 0.0, "triangle must start at zero");
        assert!((max - 1.0).abs() < 0.1, "max {max}");
        assert!((min + 1.0).abs() < 0.1, "min {min}");
    }

    #[test]
    fn test_rate_clamped() {
        let mut lfo = Lfo::new(48000.0, 100.0);
        assert_eq!(lfo.rate(), MAX_RATE_HZ);
        lfo.set_rate(0.0);
        assert_eq!(lfo.rate(), MIN_RATE_HZ);
    }

    #[test]
    fn test_delay_fades_in_linearly() {
        let sr = 1000.0;
        let mut lfo = Lfo::new(sr, 1.0);
        lfo.set_delay(1.0);
        lfo.trigger();

        for _ in 0..500 {
            lfo.advance();
        }
        assert!((lfo.fade() - 0.5).abs() < 0.01, "fade {}", lfo.fade());

        for _ in 0..600 {
            lfo.advance();
        }
        assert_eq!(lfo.fade(), 1.0);
    }

    #[test]
    fn test_trigger_restarts_fade_but_not_phase() {
        let mut lfo = Lfo::new(48000.0, 1.0);
        lfo.set_delay(0.1);
        for _ in 0..9600 {
            lfo.advance();
        }
        let phase = lfo.phase();
        lfo.trigger();
        assert_eq!(lfo.fade(), 0.0);
        assert_eq!(lfo.phase(), phase);
    }

    #[test]
    fn test_zero_delay_is_always_full_scale() {
        let mut lfo = Lfo::new(48000.0, 5.0);
        lfo.trigger();
        assert_eq!(lfo.fade(), 1.0);
    }

    #[test]
    fn test_reset_zeroes_phase() {
        let mut lfo = Lfo::new(48000.0, 3.0);
        for _ in 0..1000 {
            lfo.advance();
        }
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
        assert_eq!(lfo.advance(), 0.0);
    }
}
