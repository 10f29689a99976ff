//! Digitally-controlled oscillator (DCO).
//!
//! One DCO per voice mixes four sources sharing a single pitch:
//!
//! - **Saw**: `2·phase − 1` with a PolyBLEP correction at the wrap
//! - **Pulse**: ±1 step with PolyBLEP at both edges, LFO-modulatable width
//! - **Sub**: plain square one octave down, on its own phase
//! - **Noise**: uniform white noise
//!
//! ## Frequency
//!
//! ```text
//! f = base · range · 2^(detune/1200) · 2^(drift/1200) · 2^(lfo/12 if pitch)
//! ```
//!
//! ## Drift
//!
//! Every 100 ms a new Gaussian target (σ = 0.5 cents) is drawn and the
//! drift offset creeps toward it with a one-pole coefficient of 1e-4.
//! Both phases are randomized on note-on since the hardware never
//! phase-locks its oscillators to the key.

use libm::fmodf;
use poorhouse_core::{NoiseSource, cents_to_ratio, semitones_to_ratio};

use crate::params::OscillatorParams;

/// Standard deviation of a drift target in cents.
pub const DRIFT_STD_DEV_CENTS: f32 = 0.5;
/// Seconds between drift target draws.
pub const DRIFT_INTERVAL_SECONDS: f32 = 0.1;

const DRIFT_SMOOTHING: f32 = 1e-4;
const PWM_RANGE: f32 = 0.4;

/// Second-order PolyBLEP residual for a unit step at phase 0.
///
/// `t` is the phase in [0, 1) and `dt` the phase increment per sample.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// Per-voice DCO.
///
/// # Example
///
/// ```rust
/// use poorhouse_synth::{Dco, OscillatorParams};
///
/// let mut dco = Dco::new(48000.0, 1);
/// dco.set_params(OscillatorParams { saw_level: 1.0, drift: false, ..Default::default() });
/// dco.set_frequency(440.0);
/// dco.note_on();
///
/// let sample = dco.process();
/// assert!(sample.abs() <= 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Dco {
    params: OscillatorParams,
    sample_rate: f32,
    frequency: f32,
    /// Range and detune folded into one ratio
    static_ratio: f32,
    phase: f32,
    sub_phase: f32,
    lfo: f32,
    drift_cents: f32,
    drift_target: f32,
    drift_counter: u32,
    drift_interval: u32,
    rng: NoiseSource,
}

impl Default for Dco {
    fn default() -> Self {
        Self::new(48000.0, 0)
    }
}

impl Dco {
    /// Create a DCO with its own random stream.
    pub fn new(sample_rate: f32, seed: u64) -> Self {
        let params = OscillatorParams::default();
        Self {
            params,
            sample_rate,
            frequency: 440.0,
            static_ratio: Self::static_ratio(&params),
            phase: 0.0,
            sub_phase: 0.0,
            lfo: 0.0,
            drift_cents: 0.0,
            drift_target: 0.0,
            drift_counter: 0,
            drift_interval: Self::drift_interval(sample_rate),
            rng: NoiseSource::new(seed),
        }
    }

    fn static_ratio(params: &OscillatorParams) -> f32 {
        params.range.factor() * cents_to_ratio(params.detune_cents)
    }

    fn drift_interval(sample_rate: f32) -> u32 {
        ((DRIFT_INTERVAL_SECONDS * sample_rate) as u32).max(1)
    }

    /// Replace the parameter set. Phase and drift state are kept.
    pub fn set_params(&mut self, params: OscillatorParams) {
        self.params = params.sanitized();
        self.static_ratio = Self::static_ratio(&self.params);
        if !self.params.drift {
            self.drift_cents = 0.0;
        }
    }

    /// Current parameter set.
    pub fn params(&self) -> &OscillatorParams {
        &self.params
    }

    /// Set the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.drift_interval = Self::drift_interval(sample_rate);
    }

    /// Set the note frequency in Hz before range, detune, drift and LFO.
    #[inline]
    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
    }

    /// Note frequency in Hz before range, detune, drift and LFO.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the shared LFO value for this sample (-1.0 to 1.0).
    #[inline]
    pub fn set_lfo(&mut self, value: f32) {
        self.lfo = value.clamp(-1.0, 1.0);
    }

    /// Current drift offset in cents.
    pub fn drift_cents(&self) -> f32 {
        self.drift_cents
    }

    /// Main oscillator phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Randomize both phases and restart the drift walk.
    pub fn note_on(&mut self) {
        self.phase = self.rng.unit();
        self.sub_phase = self.rng.unit();
        self.drift_cents = 0.0;
        self.drift_counter = 0;
        self.drift_target = if self.params.drift {
            self.rng.gaussian(DRIFT_STD_DEV_CENTS)
        } else {
            0.0
        };
    }

    /// Zero phases and drift.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.sub_phase = 0.0;
        self.lfo = 0.0;
        self.drift_cents = 0.0;
        self.drift_target = 0.0;
        self.drift_counter = 0;
    }

    /// Effective oscillator frequency for the current sample.
    pub fn effective_frequency(&self) -> f32 {
        let mut freq = self.frequency * self.static_ratio;
        if self.drift_cents != 0.0 {
            freq *= cents_to_ratio(self.drift_cents);
        }
        if self.params.lfo_target.modulates_pitch() && self.lfo != 0.0 {
            freq *= semitones_to_ratio(self.lfo);
        }
        freq
    }

    #[inline]
    fn update_drift(&mut self) {
        if !self.params.drift {
            return;
        }
        self.drift_counter += 1;
        if self.drift_counter >= self.drift_interval {
            self.drift_counter = 0;
            self.drift_target = self.rng.gaussian(DRIFT_STD_DEV_CENTS);
        }
        self.drift_cents += DRIFT_SMOOTHING * (self.drift_target - self.drift_cents);
    }

    /// Generate one sample and advance both phases.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.update_drift();

        let inc = (self.effective_frequency() / self.sample_rate).min(0.5);
        let sub_inc = inc * 0.5;
        let p = &self.params;

        let mut out = 0.0;
        if p.saw_level > 0.0 {
            let saw = 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc);
            out += p.saw_level * saw;
        }
        if p.pulse_level > 0.0 {
            let mut width = p.pulse_width;
            if p.lfo_target.modulates_pwm() {
                width = (width + self.lfo * p.pwm_depth * PWM_RANGE).clamp(0.05, 0.95);
            }
            let mut pulse = if self.phase < width { 1.0 } else { -1.0 };
            pulse += poly_blep(self.phase, inc);
            pulse -= poly_blep(fmodf(self.phase + 1.0 - width, 1.0), inc);
            out += p.pulse_level * pulse;
        }
        if p.sub_level > 0.0 {
            let sub = if self.sub_phase < 0.5 { 1.0 } else { -1.0 };
            out += p.sub_level * sub;
        }
        if p.noise_level > 0.0 {
            out += p.noise_level * self.rng.bipolar();
        }

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.sub_phase += sub_inc;
        if self.sub_phase >= 1.0 {
            self.sub_phase -= 1.0;
        }

        out
    }
}
