//! Per-voice filter section: drive, optional high-pass, ZDF ladder.
//!
//! Signal flow:
//!
//! ```text
//! input → ×drive → tanh (drive > 1) → HPF (if on) → 4-pole ladder → out
//! ```
//!
//! The ladder cutoff is the knob position mapped to `20·1000^c` Hz, scaled
//! by key tracking, then shifted in semitones by the filter envelope
//! (±48), the LFO (±24) and velocity (±24). The result is clamped to
//! `[20, 0.49·fs]`.
//!
//! Coefficients are only recomputed when the semitone offset or the base
//! frequency actually changes, so a voice sitting in its sustain stage with
//! no LFO routed skips both `exp2` and `tan` entirely.

use libm::{powf, sqrtf, tanhf};
use poorhouse_core::{LadderFilter, ZdfOnePole, semitones_to_ratio};

use crate::params::{FilterParams, KeyTrack};

/// Semitones of cutoff shift at full envelope amount.
pub const ENV_RANGE_SEMITONES: f32 = 48.0;
/// Semitones of cutoff shift at full LFO amount.
pub const LFO_RANGE_SEMITONES: f32 = 24.0;
/// Semitones of cutoff shift at full velocity sensitivity.
pub const VELOCITY_RANGE_SEMITONES: f32 = 24.0;

const REFERENCE_HZ: f32 = 440.0;

/// Map a normalized cutoff knob (0.0 to 1.0) to Hz.
#[inline]
pub fn cutoff_knob_to_hz(knob: f32) -> f32 {
    20.0 * powf(1000.0, knob.clamp(0.0, 1.0))
}

/// Voice filter with modulated cutoff.
///
/// # Example
///
/// ```rust
/// use poorhouse_synth::{FilterParams, VoiceFilter};
///
/// let mut filter = VoiceFilter::new(48000.0);
/// filter.set_params(FilterParams { cutoff: 0.3, resonance: 0.5, ..Default::default() });
///
/// let out = filter.process(0.5, 0.0, 0.0);
/// assert!(out.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct VoiceFilter {
    params: FilterParams,
    ladder: LadderFilter,
    highpass: ZdfOnePole,
    highpass_on: bool,
    sample_rate: f32,
    note_hz: f32,
    velocity: f32,
    velocity_amount: f32,
    /// Knob cutoff times key tracking, before modulation
    base_hz: f32,
    /// Semitone offset the ladder gain was last computed for
    applied_semitones: f32,
    dirty: bool,
}

impl Default for VoiceFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl VoiceFilter {
    /// Create a filter with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let params = FilterParams::default();
        let mut filter = Self {
            params,
            ladder: LadderFilter::new(sample_rate),
            highpass: ZdfOnePole::new(sample_rate, 30.0),
            highpass_on: false,
            sample_rate,
            note_hz: REFERENCE_HZ,
            velocity: 0.5,
            velocity_amount: 0.0,
            base_hz: cutoff_knob_to_hz(params.cutoff),
            applied_semitones: 0.0,
            dirty: true,
        };
        filter.set_params(params);
        filter
    }

    /// Replace the parameter set.
    pub fn set_params(&mut self, params: FilterParams) {
        self.params = params.sanitized();
        self.ladder.set_resonance(self.params.resonance);
        match self.params.hpf.cutoff_hz() {
            Some(hz) => {
                if !self.highpass_on {
                    self.highpass.reset();
                }
                self.highpass.set_cutoff(hz);
                self.highpass_on = true;
            }
            None => self.highpass_on = false,
        }
        self.update_base();
    }

    /// Current parameter set.
    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Set the played note frequency used for key tracking.
    pub fn set_note_frequency(&mut self, hz: f32) {
        self.note_hz = hz.max(1.0);
        self.update_base();
    }

    /// Set the note velocity (0.0 to 1.0) and the velocity-to-cutoff amount.
    pub fn set_velocity(&mut self, velocity: f32, amount: f32) {
        self.velocity = velocity.clamp(0.0, 1.0);
        self.velocity_amount = amount.clamp(0.0, 1.0);
        self.dirty = true;
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.ladder.set_sample_rate(sample_rate);
        self.highpass.set_sample_rate(sample_rate);
        self.dirty = true;
    }

    /// Ladder cutoff in Hz as of the last processed sample.
    pub fn cutoff_hz(&self) -> f32 {
        self.ladder.cutoff()
    }

    fn update_base(&mut self) {
        let ratio = self.note_hz / REFERENCE_HZ;
        let tracking = match self.params.key_track {
            KeyTrack::Off => 1.0,
            KeyTrack::Half => sqrtf(ratio),
            KeyTrack::Full => ratio,
        };
        self.base_hz = cutoff_knob_to_hz(self.params.cutoff) * tracking;
        self.dirty = true;
    }

    #[inline]
    fn update_cutoff(&mut self, env: f32, lfo: f32) {
        let semitones = ENV_RANGE_SEMITONES * self.params.env_amount * env
            + LFO_RANGE_SEMITONES * self.params.lfo_amount * lfo
            + VELOCITY_RANGE_SEMITONES * self.velocity_amount * (self.velocity - 0.5) * 2.0;
        if self.dirty || semitones != self.applied_semitones {
            let hz = self.base_hz * semitones_to_ratio(semitones);
            self.ladder.set_cutoff(hz.clamp(20.0, self.sample_rate * 0.49));
            self.applied_semitones = semitones;
            self.dirty = false;
        }
    }

    /// Filter one sample.
    ///
    /// `env` is the filter envelope value (0.0 to 1.0, already inverted if
    /// the polarity calls for it) and `lfo` the shared LFO value.
    #[inline]
    pub fn process(&mut self, input: f32, env: f32, lfo: f32) -> f32 {
        self.update_cutoff(env, lfo);

        let mut x = input;
        if self.params.drive > 1.0 {
            x = tanhf(x * self.params.drive);
        }
        if self.highpass_on {
            x = self.highpass.process_highpass(x);
        }
        self.ladder.process(x)
    }

    /// Zero the ladder and high-pass states. Parameters are kept.
    pub fn reset(&mut self) {
        self.ladder.reset();
        self.highpass.reset();
    }
}
