//! Dual-stage BBD chorus.
//!
//! Emulates the two bucket-brigade chorus circuits of the classic polysynth
//! this engine models. Each stage owns a short circular delay line and a
//! triangle LFO. The left channel reads the line at `base + lfo · depth`,
//! the right channel at `base - lfo · depth`; that opposite-polarity read is
//! the only source of stereo width.
//!
//! | Stage | Base delay | Depth | Rate |
//! |-------|-----------|-------|------|
//! | I | 2.5 ms | 0.5 ms | 0.65 Hz |
//! | II | 4.0 ms | 0.8 ms | 0.50 Hz |
//!
//! Single-stage modes mix 80% dry with 20% wet. Mode I+II mixes 80% dry
//! with 15% of each stage so the two wet paths do not build up.
//!
//! Outside Off mode both lines are written and both LFOs advance every
//! sample, whichever stage is heard, so switching between stages plays real
//! history.

use libm::ceilf;
use poorhouse_core::{InterpolatedDelay, Lfo, ms_to_samples};

/// Minimum delay-line length in samples.
pub const MIN_BUFFER_SAMPLES: usize = 512;

const DRY_LEVEL: f32 = 0.8;
const WET_SINGLE: f32 = 0.2;
const WET_BOTH: f32 = 0.15;

/// Chorus switch position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChorusMode {
    /// Bypass: dry mono on both channels
    #[default]
    Off,
    /// Stage I only
    One,
    /// Stage II only
    Two,
    /// Stages I and II together
    Both,
}

impl ChorusMode {
    /// All modes in switch order.
    pub const ALL: [ChorusMode; 4] = [Self::Off, Self::One, Self::Two, Self::Both];

    /// Mode for a switch index, clamping out-of-range indices to the last mode.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Switch index of this mode.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fixed timing of one BBD stage.
#[derive(Clone, Copy, Debug)]
struct StageTiming {
    base_ms: f32,
    depth_ms: f32,
    rate_hz: f32,
}

const STAGE_ONE: StageTiming = StageTiming {
    base_ms: 2.5,
    depth_ms: 0.5,
    rate_hz: 0.65,
};

const STAGE_TWO: StageTiming = StageTiming {
    base_ms: 4.0,
    depth_ms: 0.8,
    rate_hz: 0.50,
};

/// One delay line with its modulating LFO.
#[derive(Debug, Clone)]
struct BbdStage {
    line: InterpolatedDelay,
    lfo: Lfo,
    timing: StageTiming,
    base_samples: f32,
    depth_samples: f32,
}

impl BbdStage {
    fn new(sample_rate: f32, timing: StageTiming) -> Self {
        let longest = ms_to_samples(timing.base_ms + timing.depth_ms, sample_rate);
        let capacity = (ceilf(longest) as usize + 2).max(MIN_BUFFER_SAMPLES);
        Self {
            line: InterpolatedDelay::new(capacity),
            lfo: Lfo::new(sample_rate, timing.rate_hz),
            timing,
            base_samples: ms_to_samples(timing.base_ms, sample_rate),
            depth_samples: ms_to_samples(timing.depth_ms, sample_rate),
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> (f32, f32) {
        self.line.write(input);
        let swing = self.lfo.advance() * self.depth_samples;
        let left = self.line.read(self.base_samples + swing);
        let right = self.line.read(self.base_samples - swing);
        (left, right)
    }

    fn reset(&mut self) {
        self.line.clear();
        self.lfo.reset();
    }
}

/// Mono-in, stereo-out BBD chorus with four modes.
///
/// # Example
///
/// ```rust
/// use poorhouse_effects::{Chorus, ChorusMode};
///
/// let mut chorus = Chorus::new(48000.0);
/// chorus.set_mode(ChorusMode::Both);
///
/// let (left, right) = chorus.process(0.5);
/// assert!(left.is_finite() && right.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Chorus {
    stage_one: BbdStage,
    stage_two: BbdStage,
    mode: ChorusMode,
    sample_rate: f32,
}

impl Default for Chorus {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Chorus {
    /// Create a chorus in [`ChorusMode::Off`].
    pub fn new(sample_rate: f32) -> Self {
        Self {
            stage_one: BbdStage::new(sample_rate, STAGE_ONE),
            stage_two: BbdStage::new(sample_rate, STAGE_TWO),
            mode: ChorusMode::Off,
            sample_rate,
        }
    }

    /// Select the chorus mode.
    ///
    /// Leaving Off clears both lines, since nothing was written while
    /// bypassed and audio from before the bypass must not be replayed.
    pub fn set_mode(&mut self, mode: ChorusMode) {
        if self.mode == ChorusMode::Off && mode != ChorusMode::Off {
            self.stage_one.line.clear();
            self.stage_two.line.clear();
        }
        self.mode = mode;
    }

    /// Current chorus mode.
    pub fn mode(&self) -> ChorusMode {
        self.mode
    }

    /// Rebuild both stages for a new sample rate. Clears all state.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.stage_one = BbdStage::new(sample_rate, self.stage_one.timing);
        self.stage_two = BbdStage::new(sample_rate, self.stage_two.timing);
    }

    /// Process one mono sample into a stereo pair.
    #[inline]
    pub fn process(&mut self, input: f32) -> (f32, f32) {
        if self.mode == ChorusMode::Off {
            return (input, input);
        }
        let dry = DRY_LEVEL * input;
        let (l1, r1) = self.stage_one.process(input);
        let (l2, r2) = self.stage_two.process(input);
        match self.mode {
            ChorusMode::One => (dry + WET_SINGLE * l1, dry + WET_SINGLE * r1),
            ChorusMode::Two => (dry + WET_SINGLE * l2, dry + WET_SINGLE * r2),
            _ => (dry + WET_BOTH * (l1 + l2), dry + WET_BOTH * (r1 + r2)),
        }
    }

    /// Zero both delay lines and both LFO phases.
    pub fn reset(&mut self) {
        self.stage_one.reset();
        self.stage_two.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;
    use libm::sinf;

    fn tone(i: usize) -> f32 {
        0.5 * sinf(TAU * 440.0 * i as f32 / 48000.0)
    }

    #[test]
    fn test_off_is_identity() {
        let mut chorus = Chorus::new(48000.0);
        for i in 0..4800 {
            let x = tone(i);
            assert_eq!(chorus.process(x), (x, x));
        }
    }

    #[test]
    fn test_mode_index_round_trip() {
        for mode in ChorusMode::ALL {
            assert_eq!(ChorusMode::from_index(mode.index()), mode);
        }
        assert_eq!(ChorusMode::from_index(99), ChorusMode::Both);
    }

    #[test]
    fn test_buffer_covers_longest_delay() {
        let chorus = Chorus::new(192000.0);
        let needed = ms_to_samples(4.8, 192000.0);
        assert!(chorus.stage_two.line.capacity() as f32 > needed + 1.0);
        assert_eq!(Chorus::new(48000.0).stage_one.line.capacity(), MIN_BUFFER_SAMPLES);
    }

    #[test]
    fn test_dc_gain_per_mode() {
        for (mode, expected) in [
            (ChorusMode::One, DRY_LEVEL + WET_SINGLE),
            (ChorusMode::Two, DRY_LEVEL + WET_SINGLE),
            (ChorusMode::Both, DRY_LEVEL + 2.0 * WET_BOTH),
        ] {
            let mut chorus = Chorus::new(48000.0);
            chorus.set_mode(mode);
            let mut out = (0.0, 0.0);
            for _ in 0..2000 {
                out = chorus.process(1.0);
            }
            assert!((out.0 - expected).abs() < 1e-4, "{mode:?}: left {}", out.0);
            assert!((out.1 - expected).abs() < 1e-4, "{mode:?}: right {}", out.1);
        }
    }

    #[test]
    fn test_active_modes_have_stereo_width() {
        for mode in [ChorusMode::One, ChorusMode::Two, ChorusMode::Both] {
            let mut chorus = Chorus::new(48000.0);
            chorus.set_mode(mode);
            let mut max_diff = 0.0f32;
            // Two seconds covers a full period of the slowest stage LFO
            for i in 0..96000 {
                let (l, r) = chorus.process(tone(i));
                max_diff = max_diff.max((l - r).abs());
            }
            assert!(max_diff > 0.01, "{mode:?}: max L/R difference {max_diff}");
        }
    }

    #[test]
    fn test_switching_on_starts_from_silence() {
        let mut chorus = Chorus::new(48000.0);
        chorus.set_mode(ChorusMode::One);
        for _ in 0..1000 {
            chorus.process(1.0);
        }
        chorus.set_mode(ChorusMode::Off);
        chorus.set_mode(ChorusMode::One);
        let (l, r) = chorus.process(0.0);
        assert_eq!((l, r), (0.0, 0.0));
    }

    #[test]
    fn test_idle_stage_keeps_history() {
        let mut chorus = Chorus::new(48000.0);
        chorus.set_mode(ChorusMode::One);
        for _ in 0..1000 {
            chorus.process(1.0);
        }
        // Stage II was written while only stage I was heard
        chorus.set_mode(ChorusMode::Both);
        let (l, r) = chorus.process(1.0);
        let expected = DRY_LEVEL + 2.0 * WET_BOTH;
        assert!((l - expected).abs() < 1e-4, "left {l}");
        assert!((r - expected).abs() < 1e-4, "right {r}");
    }

    #[test]
    fn test_stage_lfos_run_in_every_active_mode() {
        let mut chorus = Chorus::new(48000.0);
        chorus.set_mode(ChorusMode::One);
        for _ in 0..480 {
            chorus.process(0.0);
        }
        assert!(chorus.stage_one.lfo.phase() > 0.0);
        assert!(chorus.stage_two.lfo.phase() > 0.0, "stage II LFO should advance");
    }

    #[test]
    fn test_reset_zeroes_lines_and_phase() {
        let mut chorus = Chorus::new(48000.0);
        chorus.set_mode(ChorusMode::Both);
        for i in 0..5000 {
            chorus.process(tone(i));
        }
        chorus.reset();
        assert_eq!(chorus.stage_one.lfo.phase(), 0.0);
        assert_eq!(chorus.stage_two.lfo.phase(), 0.0);
        assert_eq!(chorus.process(0.0), (0.0, 0.0));
    }
}
