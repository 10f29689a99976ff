//! The polyphonic synthesizer.
//!
//! [`Synth`] owns a fixed array of [`Voice`]s, the shared LFO and the
//! chorus. Per sample:
//!
//! ```text
//! LFO × mod wheel ─┬─► voice 0 ─┐
//!                  ├─► voice 1 ─┤
//!                  ⋮            ├─ Σ × 1/√N ─► Chorus ─► × master ─► (L, R)
//!                  └─► voice N ─┘
//! ```
//!
//! Parameter changes are copied into every voice as whole sets. With six
//! voices and control-rate changes this is cheap and keeps each voice
//! self-contained.

use libm::sqrtf;
use poorhouse_core::{Lfo, SmoothedParam};
use poorhouse_effects::Chorus;

use crate::control::{CcTarget, ParamId, ParamSection, cc_target, read_param, write_param};
use crate::error::{Result, validate_sample_rate};
use crate::midi::MidiMessage;
use crate::params::{
    ChorusMode, ChorusParams, EnvelopeParams, FilterParams, LfoParams, OscillatorParams,
    PerformanceParams, StealMode,
};
use crate::patch::Patch;
use crate::voice::Voice;

/// Default polyphony.
pub const DEFAULT_VOICES: usize = 6;

/// Seed for voice 0; voice `i` uses `VOICE_SEED + i`.
const VOICE_SEED: u64 = 0x106;

/// Master volume smoothing time.
const MASTER_SMOOTHING_MS: f32 = 10.0;

/// A polyphonic synthesizer with `N` voices.
///
/// # Example
///
/// ```rust
/// use poorhouse_synth::{Patch, Synth};
///
/// let mut synth: Synth = Synth::new(48000.0).unwrap();
/// synth.load_patch(&Patch::factory_by_name("Classic Juno").unwrap());
///
/// synth.note_on(60, 100);
/// synth.note_on(64, 100);
/// synth.note_on(67, 100);
///
/// let mut left = [0.0; 256];
/// let mut right = [0.0; 256];
/// synth.render(&mut left, &mut right);
/// assert_eq!(synth.active_voice_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Synth<const N: usize = DEFAULT_VOICES> {
    voices: [Voice; N],
    lfo: Lfo,
    chorus: Chorus,
    oscillator: OscillatorParams,
    filter: FilterParams,
    filter_env: EnvelopeParams,
    amp_env: EnvelopeParams,
    lfo_params: LfoParams,
    chorus_params: ChorusParams,
    performance: PerformanceParams,
    master: SmoothedParam,
    headroom: f32,
    sample_rate: f32,
}

impl<const N: usize> Default for Synth<N> {
    fn default() -> Self {
        Self::build(48000.0)
    }
}

impl<const N: usize> Synth<N> {
    /// Create a synth with default parameters.
    ///
    /// Fails with [`SynthError::InvalidSampleRate`](crate::SynthError) for a
    /// non-finite rate or one outside 8 kHz to 384 kHz.
    pub fn new(sample_rate: f32) -> Result<Self> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        let synth = Self::build(sample_rate);
        #[cfg(feature = "tracing")]
        tracing::info!(sample_rate, voices = N, "synth created");
        Ok(synth)
    }

    fn build(sample_rate: f32) -> Self {
        const { assert!(N > 0, "a synth needs at least one voice") };

        let lfo_params = LfoParams::default();
        let mut lfo = Lfo::new(sample_rate, lfo_params.rate);
        lfo.set_delay(lfo_params.delay);

        let performance = PerformanceParams::default();
        let mut synth = Self {
            voices: core::array::from_fn(|i| Voice::new(sample_rate, VOICE_SEED + i as u64)),
            lfo,
            chorus: Chorus::new(sample_rate),
            oscillator: OscillatorParams::default(),
            filter: FilterParams::default(),
            filter_env: EnvelopeParams::default(),
            amp_env: EnvelopeParams::default(),
            lfo_params,
            chorus_params: ChorusParams::default(),
            performance,
            master: SmoothedParam::with_config(
                performance.master_volume,
                sample_rate,
                MASTER_SMOOTHING_MS,
            ),
            headroom: 1.0 / sqrtf(N as f32),
            sample_rate,
        };
        synth.load_patch(&Patch::default());
        synth
    }

    /// Change the sample rate of every component.
    ///
    /// On error nothing is changed.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
        self.lfo.set_sample_rate(sample_rate);
        self.chorus.set_sample_rate(sample_rate);
        self.master.set_sample_rate(sample_rate);
        #[cfg(feature = "tracing")]
        tracing::info!(sample_rate, "synth sample rate changed");
        Ok(())
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    // --- Notes ---

    /// Start a note. Velocity 0 is a note-off.
    ///
    /// Takes the first idle voice. When all are sounding, steals by the
    /// current [`StealMode`], preferring a releasing voice over a held one.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let note = note.min(127);
        if velocity == 0 {
            self.note_off(note);
            return;
        }
        let Some(index) = self.allocate() else {
            return;
        };
        self.voices[index].note_on(note, f32::from(velocity.min(127)) / 127.0);
        self.lfo.trigger();
    }

    /// Release every voice playing `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_held() && voice.note() == note {
                voice.note_off();
            }
        }
    }

    /// Release every voice, ignoring the sustain pedal.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    /// Silence every voice and clear the chorus immediately.
    pub fn all_sound_off(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.chorus.reset();
    }

    /// Return everything to idle: voices, LFO, chorus and master gain.
    pub fn reset(&mut self) {
        self.all_sound_off();
        self.lfo.reset();
        self.master.snap_to_target();
    }

    /// Number of voices with a non-idle envelope.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// The voice pool.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    fn allocate(&self) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| !v.is_active())
            .or_else(|| self.steal_candidate(Voice::is_releasing))
            .or_else(|| self.steal_candidate(Voice::is_held))
    }

    /// Highest-scoring voice passing `eligible`; earlier voices win ties.
    fn steal_candidate(&self, eligible: fn(&Voice) -> bool) -> Option<usize> {
        let mode = self.performance.steal_mode;
        let mut best: Option<(usize, i64)> = None;
        for (index, voice) in self.voices.iter().enumerate() {
            if !eligible(voice) {
                continue;
            }
            let score = steal_score(mode, voice);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    // --- Rendering ---

    /// Render one stereo frame.
    #[inline]
    pub fn process_sample(&mut self) -> (f32, f32) {
        let lfo = self.lfo.advance() * self.performance.mod_wheel;
        let mut sum = 0.0;
        for voice in &mut self.voices {
            sum += voice.process(lfo);
        }
        let (left, right) = self.chorus.process(sum * self.headroom);
        let gain = self.master.advance();
        (left * gain, right * gain)
    }

    /// Render one mono sample (the average of both channels).
    #[inline]
    pub fn process_mono(&mut self) -> f32 {
        let (left, right) = self.process_sample();
        0.5 * (left + right)
    }

    /// Fill `left` and `right` with `min(left.len(), right.len())` frames.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample();
        }
    }

    /// Fill `out` with mono samples.
    pub fn render_mono(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.process_mono();
        }
    }

    // --- Parameter sets ---

    /// Replace the oscillator settings on every voice.
    pub fn set_oscillator_params(&mut self, params: OscillatorParams) {
        self.oscillator = params.sanitized();
        for voice in &mut self.voices {
            voice.set_oscillator_params(self.oscillator);
        }
    }

    /// Replace the filter settings on every voice.
    pub fn set_filter_params(&mut self, params: FilterParams) {
        self.filter = params.sanitized();
        for voice in &mut self.voices {
            voice.set_filter_params(self.filter);
        }
    }

    /// Replace the filter envelope on every voice.
    pub fn set_filter_env_params(&mut self, params: EnvelopeParams) {
        self.filter_env = params.sanitized();
        for voice in &mut self.voices {
            voice.set_filter_env_params(self.filter_env);
        }
    }

    /// Replace the amplitude envelope on every voice.
    pub fn set_amp_env_params(&mut self, params: EnvelopeParams) {
        self.amp_env = params.sanitized();
        for voice in &mut self.voices {
            voice.set_amp_env_params(self.amp_env);
        }
    }

    /// Set the shared LFO rate and onset delay.
    pub fn set_lfo_params(&mut self, params: LfoParams) {
        self.lfo_params = params.sanitized();
        self.lfo.set_rate(self.lfo_params.rate);
        self.lfo.set_delay(self.lfo_params.delay);
    }

    /// Select the chorus mode.
    pub fn set_chorus_mode(&mut self, mode: ChorusMode) {
        self.chorus_params.mode = mode;
        self.chorus.set_mode(mode);
    }

    /// Replace the performance settings.
    pub fn set_performance_params(&mut self, params: PerformanceParams) {
        self.performance = params.sanitized();
        for voice in &mut self.voices {
            voice.set_performance_params(self.performance);
        }
        self.master.set_target(self.performance.master_volume);
    }

    /// Pitch wheel position, -1.0 to 1.0.
    pub fn set_pitch_bend(&mut self, bend: f32) {
        self.set_performance_params(PerformanceParams {
            pitch_bend: bend,
            ..self.performance
        });
    }

    /// Mod wheel position, 0.0 to 1.0. Scales the LFO for every voice.
    pub fn set_mod_wheel(&mut self, amount: f32) {
        self.set_performance_params(PerformanceParams {
            mod_wheel: amount,
            ..self.performance
        });
    }

    /// Press or lift the sustain pedal.
    pub fn set_sustain_pedal(&mut self, down: bool) {
        self.set_performance_params(PerformanceParams {
            sustain_pedal: down,
            ..self.performance
        });
    }

    /// Select the voice steal policy.
    pub fn set_steal_mode(&mut self, mode: StealMode) {
        self.set_performance_params(PerformanceParams {
            steal_mode: mode,
            ..self.performance
        });
    }

    /// Master output level, 0.0 to 1.0 (smoothed).
    pub fn set_master_volume(&mut self, volume: f32) {
        self.set_performance_params(PerformanceParams {
            master_volume: volume,
            ..self.performance
        });
    }

    /// Current oscillator settings.
    pub fn oscillator_params(&self) -> OscillatorParams {
        self.oscillator
    }

    /// Current filter settings.
    pub fn filter_params(&self) -> FilterParams {
        self.filter
    }

    /// Current filter envelope.
    pub fn filter_env_params(&self) -> EnvelopeParams {
        self.filter_env
    }

    /// Current amplitude envelope.
    pub fn amp_env_params(&self) -> EnvelopeParams {
        self.amp_env
    }

    /// Current LFO settings.
    pub fn lfo_params(&self) -> LfoParams {
        self.lfo_params
    }

    /// Current chorus mode.
    pub fn chorus_mode(&self) -> ChorusMode {
        self.chorus_params.mode
    }

    /// Current performance settings.
    pub fn performance_params(&self) -> PerformanceParams {
        self.performance
    }

    // --- Patches and flat parameters ---

    /// Apply every set in `patch`. Performance settings are left alone.
    pub fn load_patch(&mut self, patch: &Patch) {
        self.set_oscillator_params(patch.oscillator);
        self.set_filter_params(patch.filter);
        self.set_filter_env_params(patch.filter_env);
        self.set_amp_env_params(patch.amp_env);
        self.set_lfo_params(patch.lfo);
        self.set_chorus_mode(patch.chorus.mode);
        #[cfg(feature = "tracing")]
        tracing::debug!(chorus = ?patch.chorus.mode, "patch loaded");
    }

    /// The current sound as a patch.
    pub fn patch(&self) -> Patch {
        Patch {
            oscillator: self.oscillator,
            filter: self.filter,
            filter_env: self.filter_env,
            amp_env: self.amp_env,
            lfo: self.lfo_params,
            chorus: self.chorus_params,
        }
    }

    /// Set one parameter in natural units. Out-of-range values are clamped.
    pub fn set_param(&mut self, id: ParamId, value: f32) {
        let mut patch = self.patch();
        let mut performance = self.performance;
        write_param(id, value, &mut patch, &mut performance);
        match id.section() {
            ParamSection::Oscillator => self.set_oscillator_params(patch.oscillator),
            ParamSection::Filter => self.set_filter_params(patch.filter),
            ParamSection::FilterEnv => self.set_filter_env_params(patch.filter_env),
            ParamSection::AmpEnv => self.set_amp_env_params(patch.amp_env),
            ParamSection::Lfo => self.set_lfo_params(patch.lfo),
            ParamSection::Chorus => self.set_chorus_mode(patch.chorus.mode),
            ParamSection::Performance => self.set_performance_params(performance),
        }
    }

    /// Read one parameter in natural units.
    pub fn param(&self, id: ParamId) -> f32 {
        read_param(id, &self.patch(), &self.performance)
    }

    // --- MIDI ---

    /// Apply a controller change through the default controller map.
    /// Unassigned controllers are ignored.
    pub fn control_change(&mut self, controller: u8, value: u8) {
        match cc_target(controller) {
            Some(CcTarget::Param(id, curve)) => self.set_param(id, curve.map(id, value)),
            Some(CcTarget::AllSoundOff) => self.all_sound_off(),
            Some(CcTarget::AllNotesOff) => self.all_notes_off(),
            None => {}
        }
    }

    /// Apply a decoded MIDI message.
    pub fn handle_message(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            MidiMessage::NoteOff { note } => self.note_off(note),
            MidiMessage::ControlChange { controller, value } => {
                self.control_change(controller, value);
            }
            MidiMessage::PitchBend(bend) => self.set_pitch_bend(bend),
        }
    }

    /// Decode and apply a raw three-byte message. Unhandled types are ignored.
    pub fn handle_midi(&mut self, status: u8, data1: u8, data2: u8) {
        if let Some(message) = MidiMessage::parse(status, data1, data2) {
            self.handle_message(message);
        }
    }
}

/// Steal priority: the highest score is taken first.
fn steal_score(mode: StealMode, voice: &Voice) -> i64 {
    let age = i64::try_from(voice.age()).unwrap_or(i64::MAX);
    let note = i64::from(voice.note());
    match mode {
        StealMode::Oldest => age,
        StealMode::Newest => -age,
        StealMode::ProtectLow => note,
        StealMode::ProtectHigh => -note,
    }
}
