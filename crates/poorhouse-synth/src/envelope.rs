//! ADSR envelope generator.
//!
//! A five-state machine with one-pole exponential segments. Every segment
//! uses the coefficient
//!
//! ```text
//! α = 1 − exp(−4.6 / (seconds · sample_rate))
//! ```
//!
//! which covers 99% of the distance to its target in the configured time.

use libm::expf;

use crate::params::EnvelopeParams;

/// Level at which the attack hands over to the decay.
const ATTACK_END: f32 = 0.999;
/// Distance from the sustain level at which the decay settles.
const DECAY_EPSILON: f32 = 0.001;
/// Level below which the release snaps to zero.
const RELEASE_FLOOR: f32 = 0.0001;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Inactive, output is zero
    #[default]
    Idle,
    /// Rising toward 1.0
    Attack,
    /// Falling toward the sustain level
    Decay,
    /// Pinned to the sustain level while the gate is held
    Sustain,
    /// Falling toward zero after the gate closes
    Release,
}

/// One-pole coefficient for a segment time in seconds. Zero time is instant.
#[inline]
fn segment_coeff(seconds: f32, sample_rate: f32) -> f32 {
    if seconds <= 0.0 {
        return 1.0;
    }
    1.0 - expf(-4.6 / (seconds * sample_rate))
}

/// ADSR envelope generator.
///
/// Retriggering from any active state restarts the attack from the current
/// level. Triggering from idle seeds the level at the sustain value, which
/// shortens the opening sweep of a filter envelope.
///
/// # Example
///
/// ```rust
/// use poorhouse_synth::{AdsrEnvelope, EnvelopeParams, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_params(EnvelopeParams { attack: 0.01, decay: 0.1, sustain: 0.6, release: 0.2 });
///
/// env.gate_on();
/// for _ in 0..1000 {
///     let level = env.advance();
///     assert!((0.0..=1.0).contains(&level));
/// }
///
/// env.gate_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,
    params: EnvelopeParams,
    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create an idle envelope with default times.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            params: EnvelopeParams::default(),
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.recalculate_coefficients();
        env
    }

    /// Replace the times and sustain level.
    ///
    /// The current stage and level are kept; only the coefficients change.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = params.sanitized();
        self.recalculate_coefficients();
    }

    /// Current parameter set.
    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Open the gate (note on).
    pub fn gate_on(&mut self) {
        if self.state == EnvelopeState::Idle {
            self.level = self.params.sustain;
        }
        self.state = EnvelopeState::Attack;
    }

    /// Close the gate (note off). Has no effect while idle.
    pub fn gate_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
        }
    }

    /// Force the envelope to idle at zero.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level.clamp(0.0, 1.0)
    }

    /// True unless idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance one sample and return the level in [0, 1].
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => return 0.0,
            EnvelopeState::Attack => {
                self.level += (1.0 - self.level) * self.attack_coeff;
                if self.level >= ATTACK_END {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                let target = self.params.sustain;
                self.level += (target - self.level) * self.decay_coeff;
                if (self.level - target).abs() < DECAY_EPSILON {
                    self.level = target;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }
            EnvelopeState::Release => {
                self.level -= self.level * self.release_coeff;
                if self.level <= RELEASE_FLOOR {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }
        self.level.clamp(0.0, 1.0)
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = segment_coeff(self.params.attack, self.sample_rate);
        self.decay_coeff = segment_coeff(self.params.decay, self.sample_rate);
        self.release_coeff = segment_coeff(self.params.release, self.sample_rate);
    }
}
