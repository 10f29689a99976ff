//! Parameter sets for every voice component.
//!
//! Plain value structs with no behaviour beyond range enforcement. The
//! [`Synth`](crate::Synth) holds one copy of each set as the single source
//! of truth and broadcasts it to every voice on change.
//!
//! Every set has a `sanitized()` method that clamps each field to its
//! documented range. Setters on the synth always store the sanitized copy,
//! so out-of-range input is corrected silently rather than rejected.

pub use poorhouse_effects::ChorusMode;

/// Declare a C-like parameter enum with index conversion.
macro_rules! switch_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All positions in switch order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Position for an index, clamping out-of-range indices to the last.
            pub fn from_index(index: usize) -> Self {
                Self::ALL[index.min(Self::ALL.len() - 1)]
            }

            /// Index of this position.
            pub fn index(self) -> usize {
                self as usize
            }
        }
    };
}

switch_enum! {
    /// Where the shared LFO is routed inside the oscillator.
    LfoTarget {
        /// No oscillator modulation
        #[default]
        Off,
        /// Vibrato
        Pitch,
        /// Pulse-width modulation
        Pwm,
        /// Vibrato and PWM together
        Both,
    }
}

impl LfoTarget {
    /// True when the LFO bends pitch.
    pub fn modulates_pitch(self) -> bool {
        matches!(self, Self::Pitch | Self::Both)
    }

    /// True when the LFO moves the pulse width.
    pub fn modulates_pwm(self) -> bool {
        matches!(self, Self::Pwm | Self::Both)
    }
}

switch_enum! {
    /// Oscillator footage.
    OctaveRange {
        /// 16': one octave down
        Low,
        /// 8': concert pitch
        #[default]
        Normal,
        /// 4': one octave up
        High,
    }
}

impl OctaveRange {
    /// Frequency multiplier for this range.
    pub fn factor(self) -> f32 {
        match self {
            Self::Low => 0.5,
            Self::Normal => 1.0,
            Self::High => 2.0,
        }
    }
}

switch_enum! {
    /// Filter keyboard tracking.
    KeyTrack {
        /// Cutoff ignores the played note
        #[default]
        Off,
        /// Cutoff follows half the note interval
        Half,
        /// Cutoff follows the note one to one
        Full,
    }
}

switch_enum! {
    /// High-pass filter position.
    HpfMode {
        /// High-pass bypassed
        #[default]
        Off,
        /// 30 Hz
        Low,
        /// 60 Hz
        Mid,
        /// 120 Hz
        High,
    }
}

impl HpfMode {
    /// Cutoff in Hz, or `None` when bypassed.
    pub fn cutoff_hz(self) -> Option<f32> {
        match self {
            Self::Off => None,
            Self::Low => Some(30.0),
            Self::Mid => Some(60.0),
            Self::High => Some(120.0),
        }
    }
}

switch_enum! {
    /// What opens the VCA.
    VcaMode {
        /// Amplitude envelope
        #[default]
        Envelope,
        /// Key gate, instant on and off
        Gate,
    }
}

switch_enum! {
    /// Direction of the filter envelope.
    EnvPolarity {
        /// Envelope opens the filter
        #[default]
        Normal,
        /// Envelope is flipped to `1 - value`
        Inverted,
    }
}

switch_enum! {
    /// Which voice is reassigned when all voices are busy.
    StealMode {
        /// Longest-sounding voice
        #[default]
        Oldest,
        /// Most recently triggered voice
        Newest,
        /// Keep low notes: steal the highest
        ProtectLow,
        /// Keep high notes: steal the lowest
        ProtectHigh,
    }
}

/// Oscillator (DCO) settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OscillatorParams {
    /// Sawtooth level (0.0 to 1.0)
    pub saw_level: f32,
    /// Pulse level (0.0 to 1.0)
    pub pulse_level: f32,
    /// Sub-oscillator level (0.0 to 1.0)
    pub sub_level: f32,
    /// Noise level (0.0 to 1.0)
    pub noise_level: f32,
    /// Pulse width (0.05 to 0.95)
    pub pulse_width: f32,
    /// LFO pulse-width depth (0.0 to 1.0)
    pub pwm_depth: f32,
    /// LFO destination
    pub lfo_target: LfoTarget,
    /// Footage
    pub range: OctaveRange,
    /// Detune in cents (-50.0 to 50.0)
    pub detune_cents: f32,
    /// Slow random pitch drift
    pub drift: bool,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            saw_level: 0.5,
            pulse_level: 0.0,
            sub_level: 0.0,
            noise_level: 0.0,
            pulse_width: 0.5,
            pwm_depth: 0.0,
            lfo_target: LfoTarget::Off,
            range: OctaveRange::Normal,
            detune_cents: 0.0,
            drift: true,
        }
    }
}

impl OscillatorParams {
    /// Copy with every field clamped to range.
    pub fn sanitized(self) -> Self {
        Self {
            saw_level: unit(self.saw_level),
            pulse_level: unit(self.pulse_level),
            sub_level: unit(self.sub_level),
            noise_level: unit(self.noise_level),
            pulse_width: clamp_or(self.pulse_width, 0.05, 0.95, 0.5),
            pwm_depth: unit(self.pwm_depth),
            detune_cents: clamp_or(self.detune_cents, -50.0, 50.0, 0.0),
            ..self
        }
    }
}

/// Filter (VCF) settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterParams {
    /// Cutoff knob (0.0 to 1.0, log-mapped to 20 Hz..20 kHz)
    pub cutoff: f32,
    /// Resonance (0.0 to 1.0, self-oscillates near the top)
    pub resonance: f32,
    /// Bipolar envelope amount (-1.0 to 1.0)
    pub env_amount: f32,
    /// LFO amount (0.0 to 1.0)
    pub lfo_amount: f32,
    /// Keyboard tracking
    pub key_track: KeyTrack,
    /// Input drive (1.0 to 4.0, saturates above 1.0)
    pub drive: f32,
    /// High-pass position
    pub hpf: HpfMode,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff: 0.5,
            resonance: 0.0,
            env_amount: 0.0,
            lfo_amount: 0.0,
            key_track: KeyTrack::Off,
            drive: 1.0,
            hpf: HpfMode::Off,
        }
    }
}

impl FilterParams {
    /// Copy with every field clamped to range.
    pub fn sanitized(self) -> Self {
        Self {
            cutoff: unit(self.cutoff),
            resonance: unit(self.resonance),
            env_amount: clamp_or(self.env_amount, -1.0, 1.0, 0.0),
            lfo_amount: unit(self.lfo_amount),
            drive: clamp_or(self.drive, 1.0, 4.0, 1.0),
            ..self
        }
    }
}

/// ADSR settings. Times are in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeParams {
    /// Attack (0.001 to 3.0 s)
    pub attack: f32,
    /// Decay (0.002 to 12.0 s)
    pub decay: f32,
    /// Sustain level (0.0 to 1.0)
    pub sustain: f32,
    /// Release (0.002 to 12.0 s)
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.7,
            release: 0.5,
        }
    }
}

impl EnvelopeParams {
    /// Shortest attack in seconds.
    pub const MIN_ATTACK: f32 = 0.001;
    /// Longest attack in seconds.
    pub const MAX_ATTACK: f32 = 3.0;
    /// Shortest decay or release in seconds.
    pub const MIN_TIME: f32 = 0.002;
    /// Longest decay or release in seconds.
    pub const MAX_TIME: f32 = 12.0;

    /// Copy with every field clamped to range.
    pub fn sanitized(self) -> Self {
        Self {
            attack: clamp_or(self.attack, Self::MIN_ATTACK, Self::MAX_ATTACK, 0.01),
            decay: clamp_or(self.decay, Self::MIN_TIME, Self::MAX_TIME, 0.3),
            sustain: unit(self.sustain),
            release: clamp_or(self.release, Self::MIN_TIME, Self::MAX_TIME, 0.5),
        }
    }
}

/// Shared LFO settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LfoParams {
    /// Rate in Hz (0.1 to 30.0)
    pub rate: f32,
    /// Onset delay in seconds (0.0 to 3.0)
    pub delay: f32,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            rate: 2.0,
            delay: 0.0,
        }
    }
}

impl LfoParams {
    /// Copy with every field clamped to range.
    pub fn sanitized(self) -> Self {
        Self {
            rate: clamp_or(self.rate, 0.1, 30.0, 2.0),
            delay: clamp_or(self.delay, 0.0, 3.0, 0.0),
        }
    }
}

/// Chorus settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChorusParams {
    /// Switch position
    pub mode: ChorusMode,
}

/// Performance controls shared by every voice.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceParams {
    /// Pitch-bend position (-1.0 to 1.0)
    pub pitch_bend: f32,
    /// Bend range in semitones (0.0 to 24.0)
    pub bend_range: f32,
    /// Glide time in seconds (0.0 to 10.0, 0 disables)
    pub portamento: f32,
    /// Modulation wheel, scales the shared LFO (0.0 to 1.0)
    pub mod_wheel: f32,
    /// VCA source
    pub vca_mode: VcaMode,
    /// Filter envelope direction
    pub filter_env_polarity: EnvPolarity,
    /// Per-voice VCA level (0.0 to 1.0)
    pub vca_level: f32,
    /// Output level after the chorus (0.0 to 1.0)
    pub master_volume: f32,
    /// Global tuning offset in cents (-50.0 to 50.0)
    pub master_tune: f32,
    /// Velocity to filter cutoff (0.0 to 1.0)
    pub velocity_to_filter: f32,
    /// Velocity to amplitude (0.0 to 1.0)
    pub velocity_to_amp: f32,
    /// Sustain pedal held
    pub sustain_pedal: bool,
    /// Voice-steal policy
    pub steal_mode: StealMode,
}

impl Default for PerformanceParams {
    fn default() -> Self {
        Self {
            pitch_bend: 0.0,
            bend_range: 2.0,
            portamento: 0.0,
            mod_wheel: 1.0,
            vca_mode: VcaMode::Envelope,
            filter_env_polarity: EnvPolarity::Normal,
            vca_level: 0.8,
            master_volume: 1.0,
            master_tune: 0.0,
            velocity_to_filter: 0.0,
            velocity_to_amp: 1.0,
            sustain_pedal: false,
            steal_mode: StealMode::Oldest,
        }
    }
}

impl PerformanceParams {
    /// Copy with every field clamped to range.
    pub fn sanitized(self) -> Self {
        Self {
            pitch_bend: clamp_or(self.pitch_bend, -1.0, 1.0, 0.0),
            bend_range: clamp_or(self.bend_range, 0.0, 24.0, 2.0),
            portamento: clamp_or(self.portamento, 0.0, 10.0, 0.0),
            mod_wheel: clamp_or(self.mod_wheel, 0.0, 1.0, 1.0),
            vca_level: clamp_or(self.vca_level, 0.0, 1.0, 0.8),
            master_volume: clamp_or(self.master_volume, 0.0, 1.0, 1.0),
            master_tune: clamp_or(self.master_tune, -50.0, 50.0, 0.0),
            velocity_to_filter: unit(self.velocity_to_filter),
            velocity_to_amp: clamp_or(self.velocity_to_amp, 0.0, 1.0, 1.0),
            ..self
        }
    }
}

/// Clamp to [0, 1], mapping NaN to 0.
#[inline]
fn unit(x: f32) -> f32 {
    clamp_or(x, 0.0, 1.0, 0.0)
}

/// Clamp to `[lo, hi]`, mapping NaN to `fallback`.
#[inline]
fn clamp_or(x: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if x.is_nan() { fallback } else { x.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_already_sanitized() {
        assert_eq!(OscillatorParams::default().sanitized(), OscillatorParams::default());
        assert_eq!(FilterParams::default().sanitized(), FilterParams::default());
        assert_eq!(EnvelopeParams::default().sanitized(), EnvelopeParams::default());
        assert_eq!(LfoParams::default().sanitized(), LfoParams::default());
        assert_eq!(
            PerformanceParams::default().sanitized(),
            PerformanceParams::default()
        );
    }

    #[test]
    fn test_oscillator_clamping() {
        let p = OscillatorParams {
            saw_level: 2.0,
            noise_level: -1.0,
            pulse_width: 0.99,
            detune_cents: 300.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.saw_level, 1.0);
        assert_eq!(p.noise_level, 0.0);
        assert_eq!(p.pulse_width, 0.95);
        assert_eq!(p.detune_cents, 50.0);
    }

    #[test]
    fn test_nan_falls_back() {
        let f = FilterParams {
            cutoff: f32::NAN,
            drive: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(f.cutoff, 0.0);
        assert_eq!(f.drive, 1.0);
    }

    #[test]
    fn test_envelope_times_positive() {
        let e = EnvelopeParams {
            attack: 0.0,
            decay: -3.0,
            sustain: 1.5,
            release: 100.0,
        }
        .sanitized();
        assert_eq!(e.attack, EnvelopeParams::MIN_ATTACK);
        assert_eq!(e.decay, EnvelopeParams::MIN_TIME);
        assert_eq!(e.sustain, 1.0);
        assert_eq!(e.release, EnvelopeParams::MAX_TIME);
    }

    #[test]
    fn test_switch_enums() {
        assert_eq!(OctaveRange::from_index(0).factor(), 0.5);
        assert_eq!(OctaveRange::from_index(7), OctaveRange::High);
        assert_eq!(HpfMode::High.cutoff_hz(), Some(120.0));
        assert_eq!(HpfMode::Off.cutoff_hz(), None);
        assert!(LfoTarget::Both.modulates_pitch() && LfoTarget::Both.modulates_pwm());
        assert!(!LfoTarget::Pwm.modulates_pitch());
        assert_eq!(StealMode::ALL.len(), 4);
        assert_eq!(KeyTrack::Full.index(), 2);
    }
}
