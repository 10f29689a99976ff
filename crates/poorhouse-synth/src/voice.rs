//! A single synth voice.
//!
//! ```text
//! DCO → VoiceFilter → × VCA × level × velocity → out
//!          ↑  filter env (optionally inverted)
//!          ↑  shared LFO
//! ```
//!
//! The VCA follows the amplitude envelope, or in gate mode opens fully
//! while the key (or the sustain pedal) holds the note. Pitch per sample is
//! the portamento glide frequency times the bend and master-tune ratios.

use poorhouse_core::{LinearSmoothedParam, cents_to_ratio, midi_to_freq, semitones_to_ratio};

use crate::envelope::AdsrEnvelope;
use crate::filter::VoiceFilter;
use crate::oscillator::Dco;
use crate::params::{
    EnvPolarity, EnvelopeParams, FilterParams, OscillatorParams, PerformanceParams, VcaMode,
};

/// One voice: DCO, filter, filter envelope and amplitude envelope.
///
/// # Example
///
/// ```rust
/// use poorhouse_synth::Voice;
///
/// let mut voice = Voice::new(48000.0, 0);
/// voice.note_on(60, 0.8);
/// assert!(voice.is_active());
///
/// for _ in 0..480 {
///     let _sample = voice.process(0.0);
/// }
///
/// voice.note_off();
/// assert!(voice.is_releasing());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    dco: Dco,
    filter: VoiceFilter,
    filter_env: AdsrEnvelope,
    amp_env: AdsrEnvelope,
    glide: LinearSmoothedParam,
    performance: PerformanceParams,
    bend_ratio: f32,
    tune_ratio: f32,
    note: u8,
    velocity: f32,
    /// Samples since the last trigger, counted while sounding
    age: u64,
    held: bool,
    sustained: bool,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48000.0, 0)
    }
}

impl Voice {
    /// Create an idle voice. `seed` selects its random stream.
    pub fn new(sample_rate: f32, seed: u64) -> Self {
        let mut voice = Self {
            dco: Dco::new(sample_rate, seed),
            filter: VoiceFilter::new(sample_rate),
            filter_env: AdsrEnvelope::new(sample_rate),
            amp_env: AdsrEnvelope::new(sample_rate),
            glide: LinearSmoothedParam::with_config(midi_to_freq(69), sample_rate, 0.0),
            performance: PerformanceParams::default(),
            bend_ratio: 1.0,
            tune_ratio: 1.0,
            note: 69,
            velocity: 0.0,
            age: 0,
            held: false,
            sustained: false,
        };
        voice.set_performance_params(PerformanceParams::default());
        voice
    }

    /// Set sample rate on every component.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.dco.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.glide.set_sample_rate(sample_rate);
    }

    /// Replace the oscillator parameters.
    pub fn set_oscillator_params(&mut self, params: OscillatorParams) {
        self.dco.set_params(params);
    }

    /// Replace the filter parameters.
    pub fn set_filter_params(&mut self, params: FilterParams) {
        self.filter.set_params(params);
    }

    /// Replace the filter envelope parameters.
    pub fn set_filter_env_params(&mut self, params: EnvelopeParams) {
        self.filter_env.set_params(params);
    }

    /// Replace the amplitude envelope parameters.
    pub fn set_amp_env_params(&mut self, params: EnvelopeParams) {
        self.amp_env.set_params(params);
    }

    /// Replace the performance parameters.
    ///
    /// Lifting the sustain pedal releases this voice if it was only being
    /// held by the pedal.
    pub fn set_performance_params(&mut self, params: PerformanceParams) {
        let params = params.sanitized();
        self.bend_ratio = semitones_to_ratio(params.pitch_bend * params.bend_range);
        self.tune_ratio = cents_to_ratio(params.master_tune);
        self.glide.set_transition_time_ms(params.portamento * 1000.0);
        self.filter.set_velocity(self.velocity, params.velocity_to_filter);
        self.performance = params;

        if !params.sustain_pedal && self.sustained {
            self.sustained = false;
            if !self.held {
                self.release();
            }
        }
    }

    /// Start a note. `velocity` is normalized to 0.0 to 1.0.
    ///
    /// With portamento enabled and the voice already sounding, pitch glides
    /// linearly from the current frequency; otherwise it jumps.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let target = midi_to_freq(note);
        if self.performance.portamento > 0.0 && self.is_active() {
            self.glide.set_target(target);
        } else {
            self.glide.set_immediate(target);
        }

        self.note = note;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.age = 0;
        self.held = true;
        self.sustained = false;

        self.filter.set_note_frequency(target);
        self.filter.set_velocity(self.velocity, self.performance.velocity_to_filter);
        self.dco.note_on();
        self.filter_env.gate_on();
        self.amp_env.gate_on();
    }

    /// Key released. Deferred while the sustain pedal is down.
    pub fn note_off(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        if self.performance.sustain_pedal {
            self.sustained = true;
        } else {
            self.release();
        }
    }

    /// Release both envelopes regardless of pedal state.
    pub fn release(&mut self) {
        self.held = false;
        self.sustained = false;
        self.filter_env.gate_off();
        self.amp_env.gate_off();
    }

    /// Silence immediately and clear all state.
    pub fn reset(&mut self) {
        self.held = false;
        self.sustained = false;
        self.age = 0;
        self.velocity = 0.0;
        self.dco.reset();
        self.filter.reset();
        self.filter_env.reset();
        self.amp_env.reset();
        self.glide.set_immediate(self.glide.target());
    }

    /// Render one sample given the shared LFO value.
    #[inline]
    pub fn process(&mut self, lfo: f32) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        self.age += 1;

        let filter_env = match self.performance.filter_env_polarity {
            EnvPolarity::Normal => self.filter_env.advance(),
            EnvPolarity::Inverted => 1.0 - self.filter_env.advance(),
        };
        let amp_env = self.amp_env.advance();

        let freq = self.glide.advance() * self.bend_ratio * self.tune_ratio;
        self.dco.set_frequency(freq);
        self.dco.set_lfo(lfo);
        let osc = self.dco.process();
        let filtered = self.filter.process(osc, filter_env, lfo);

        let vca = match self.performance.vca_mode {
            VcaMode::Envelope => amp_env,
            VcaMode::Gate => {
                if self.held || self.sustained {
                    1.0
                } else {
                    0.0
                }
            }
        };
        let sensitivity = self.performance.velocity_to_amp;
        let velocity_gain = 1.0 - sensitivity + sensitivity * self.velocity;

        filtered * vca * self.performance.vca_level * velocity_gain
    }

    /// True while either envelope is running.
    pub fn is_active(&self) -> bool {
        self.filter_env.is_active() || self.amp_env.is_active()
    }

    /// True when the key is up but the voice still sounds.
    pub fn is_releasing(&self) -> bool {
        !self.held && self.is_active()
    }

    /// True while the key is down.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// True while the pedal holds a released key.
    pub fn is_sustained(&self) -> bool {
        self.sustained
    }

    /// Most recently triggered MIDI note.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Normalized velocity of the current note.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Samples rendered since the last trigger.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Glide frequency in Hz before bend and tuning.
    pub fn glide_frequency(&self) -> f32 {
        self.glide.get()
    }

    /// Oscillator pitch in Hz for the last rendered sample.
    pub fn frequency(&self) -> f32 {
        self.dco.frequency()
    }

    /// Amplitude envelope.
    pub fn amp_envelope(&self) -> &AdsrEnvelope {
        &self.amp_env
    }

    /// Filter envelope.
    pub fn filter_envelope(&self) -> &AdsrEnvelope {
        &self.filter_env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeState;

    const SR: f32 = 48000.0;

    fn fast_env() -> EnvelopeParams {
        EnvelopeParams {
            attack: 0.001,
            decay: 0.002,
            sustain: 1.0,
            release: 0.002,
        }
    }

    fn voice() -> Voice {
        let mut v = Voice::new(SR, 1);
        v.set_oscillator_params(OscillatorParams {
            saw_level: 1.0,
            drift: false,
            ..Default::default()
        });
        v.set_filter_params(FilterParams {
            cutoff: 1.0,
            ..Default::default()
        });
        v.set_filter_env_params(fast_env());
        v.set_amp_env_params(fast_env());
        v
    }

    fn run(v: &mut Voice, samples: usize) -> Vec<f32> {
        (0..samples).map(|_| v.process(0.0)).collect()
    }

    #[test]
    fn test_idle_voice_is_silent() {
        let mut v = voice();
        assert!(!v.is_active());
        assert!(run(&mut v, 100).iter().all(|&s| s == 0.0));
        assert_eq!(v.age(), 0);
    }

    #[test]
    fn test_note_on_produces_sound_and_ages() {
        let mut v = voice();
        v.note_on(60, 1.0);
        let out = run(&mut v, 2400);
        assert!(out.iter().any(|s| s.abs() > 0.1));
        assert_eq!(v.age(), 2400);
        assert!(v.is_held() && !v.is_releasing());
    }

    #[test]
    fn test_note_off_releases_to_idle() {
        let mut v = voice();
        v.note_on(60, 1.0);
        run(&mut v, 1000);
        v.note_off();
        assert!(v.is_releasing());
        run(&mut v, 4800);
        assert!(!v.is_active());
        assert_eq!(v.amp_envelope().state(), EnvelopeState::Idle);
    }

    #[test]
    fn test_sustain_pedal_defers_release() {
        let mut v = voice();
        v.set_performance_params(PerformanceParams {
            sustain_pedal: true,
            ..Default::default()
        });
        v.note_on(60, 1.0);
        run(&mut v, 1000);
        v.note_off();
        assert!(v.is_sustained());
        assert_eq!(v.amp_envelope().state(), EnvelopeState::Sustain);

        v.set_performance_params(PerformanceParams::default());
        assert!(!v.is_sustained());
        assert_eq!(v.amp_envelope().state(), EnvelopeState::Release);
    }

    #[test]
    fn test_pedal_up_keeps_held_key() {
        let mut v = voice();
        v.set_performance_params(PerformanceParams {
            sustain_pedal: true,
            ..Default::default()
        });
        v.note_on(60, 1.0);
        v.set_performance_params(PerformanceParams::default());
        assert!(v.is_held());
        assert_eq!(v.amp_envelope().state(), EnvelopeState::Attack);
    }

    #[test]
    fn test_velocity_scales_amplitude() {
        let peak = |velocity: f32| {
            let mut v = voice();
            v.note_on(57, velocity);
            run(&mut v, 4800).iter().fold(0.0f32, |m, s| m.max(s.abs()))
        };
        let loud = peak(1.0);
        let soft = peak(0.25);
        assert!(
            (soft / loud - 0.25).abs() < 0.05,
            "full sensitivity should scale linearly: {soft} / {loud}"
        );
    }

    #[test]
    fn test_gate_mode_cuts_on_release() {
        let mut v = voice();
        v.set_amp_env_params(EnvelopeParams {
            release: 2.0,
            ..fast_env()
        });
        v.set_performance_params(PerformanceParams {
            vca_mode: VcaMode::Gate,
            ..Default::default()
        });
        v.note_on(60, 1.0);
        run(&mut v, 1000);
        v.note_off();
        assert!(v.is_active(), "envelopes still run in the background");
        assert!(run(&mut v, 100).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_portamento_glides_only_when_sounding() {
        let mut v = voice();
        v.set_performance_params(PerformanceParams {
            portamento: 0.1,
            ..Default::default()
        });
        v.note_on(57, 1.0);
        assert!((v.glide_frequency() - 220.0).abs() < 1e-3, "first note jumps");

        run(&mut v, 10);
        v.note_on(69, 1.0);
        run(&mut v, 2400);
        let mid = v.glide_frequency();
        assert!((mid - 330.0).abs() < 2.0, "halfway through glide: {mid}");
        run(&mut v, 2400);
        assert!((v.glide_frequency() - 440.0).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_bend_and_tune() {
        let mut v = voice();
        v.set_performance_params(PerformanceParams {
            pitch_bend: 1.0,
            bend_range: 12.0,
            master_tune: 0.0,
            ..Default::default()
        });
        v.note_on(69, 1.0);
        v.process(0.0);
        assert!((v.frequency() - 880.0).abs() < 0.01, "bend {}", v.frequency());

        v.set_performance_params(PerformanceParams {
            master_tune: 50.0,
            ..Default::default()
        });
        v.process(0.0);
        let expected = 440.0 * cents_to_ratio(50.0);
        assert!((v.frequency() - expected).abs() < 0.01);
    }

    #[test]
    fn test_inverted_filter_envelope_closes_filter() {
        let mut v = voice();
        v.set_filter_params(FilterParams {
            cutoff: 0.5,
            env_amount: 1.0,
            ..Default::default()
        });
        v.set_performance_params(PerformanceParams {
            filter_env_polarity: EnvPolarity::Inverted,
            ..Default::default()
        });
        v.note_on(60, 1.0);
        run(&mut v, 2000);
        // Sustain 1.0 inverted is zero envelope: cutoff sits at the knob value
        assert!((v.filter.cutoff_hz() - crate::filter::cutoff_knob_to_hz(0.5)).abs() < 1.0);
    }

    #[test]
    fn test_reset_silences() {
        let mut v = voice();
        v.note_on(60, 1.0);
        run(&mut v, 500);
        v.reset();
        assert!(!v.is_active());
        assert_eq!(v.process(0.0), 0.0);
    }
}
