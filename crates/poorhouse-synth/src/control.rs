//! Flat parameter addressing and the MIDI controller map.
//!
//! [`ParamId`] names every scalar parameter so hosts and the controller
//! table can reach any field without knowing which set it lives in. Values
//! are in natural units: seconds, Hz, cents, 0..1 levels. Switches are
//! passed as their position index and booleans as 0.0 / 1.0.
//!
//! ## Controller map
//!
//! [`CC_MAP`] is a flat table from controller number to [`CcTarget`]. The
//! 7-bit value is scaled by the entry's [`CcCurve`]:
//!
//! | Curve | Mapping |
//! |-------|---------|
//! | `Linear` | `min + (max − min)·v/127` over the parameter range |
//! | `Exponential` | `min·(max/min)^(v/127)` |
//! | `Bucket` | position `v·count/128` |
//! | `Switch` | on when `v ≥ 64` |

use libm::powf;

use crate::params::{
    ChorusMode, EnvPolarity, EnvelopeParams, HpfMode, KeyTrack, LfoTarget, OctaveRange,
    PerformanceParams, StealMode, VcaMode,
};
use crate::patch::Patch;

/// Which parameter set a [`ParamId`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamSection {
    /// [`OscillatorParams`](crate::OscillatorParams)
    Oscillator,
    /// [`FilterParams`](crate::FilterParams)
    Filter,
    /// Filter [`EnvelopeParams`]
    FilterEnv,
    /// Amplitude [`EnvelopeParams`]
    AmpEnv,
    /// [`LfoParams`](crate::LfoParams)
    Lfo,
    /// [`ChorusParams`](crate::ChorusParams)
    Chorus,
    /// [`PerformanceParams`]
    Performance,
}

macro_rules! param_ids {
    ($($variant:ident => ($name:literal, $section:ident, $min:expr, $max:expr)),+ $(,)?) => {
        /// Every scalar parameter, in front-panel order.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ParamId {
            $(
                #[doc = $name]
                $variant
            ),+
        }

        impl ParamId {
            /// All parameters in front-panel order.
            pub const ALL: &'static [ParamId] = &[$(ParamId::$variant),+];

            /// Display name.
            pub fn name(self) -> &'static str {
                match self {
                    $(ParamId::$variant => $name),+
                }
            }

            /// Parameter set this parameter lives in.
            pub fn section(self) -> ParamSection {
                match self {
                    $(ParamId::$variant => ParamSection::$section),+
                }
            }

            /// Lowest and highest value in natural units.
            pub fn range(self) -> (f32, f32) {
                match self {
                    $(ParamId::$variant => ($min as f32, $max as f32)),+
                }
            }
        }
    };
}

const fn last_index(count: usize) -> f32 {
    (count - 1) as f32
}

param_ids! {
    SawLevel => ("Saw Level", Oscillator, 0.0, 1.0),
    PulseLevel => ("Pulse Level", Oscillator, 0.0, 1.0),
    SubLevel => ("Sub Level", Oscillator, 0.0, 1.0),
    NoiseLevel => ("Noise Level", Oscillator, 0.0, 1.0),
    PulseWidth => ("Pulse Width", Oscillator, 0.05, 0.95),
    PwmDepth => ("PWM Depth", Oscillator, 0.0, 1.0),
    LfoTarget => ("LFO Target", Oscillator, 0.0, last_index(LfoTarget::ALL.len())),
    Range => ("Range", Oscillator, 0.0, last_index(OctaveRange::ALL.len())),
    Detune => ("Detune", Oscillator, -50.0, 50.0),
    Drift => ("Drift", Oscillator, 0.0, 1.0),
    Cutoff => ("Cutoff", Filter, 0.0, 1.0),
    Resonance => ("Resonance", Filter, 0.0, 1.0),
    FilterEnvAmount => ("Filter Env Amount", Filter, -1.0, 1.0),
    FilterLfoAmount => ("Filter LFO Amount", Filter, 0.0, 1.0),
    KeyTrack => ("Key Track", Filter, 0.0, last_index(KeyTrack::ALL.len())),
    Drive => ("Drive", Filter, 1.0, 4.0),
    Hpf => ("HPF", Filter, 0.0, last_index(HpfMode::ALL.len())),
    FilterAttack => ("Filter Attack", FilterEnv, EnvelopeParams::MIN_ATTACK, EnvelopeParams::MAX_ATTACK),
    FilterDecay => ("Filter Decay", FilterEnv, EnvelopeParams::MIN_TIME, EnvelopeParams::MAX_TIME),
    FilterSustain => ("Filter Sustain", FilterEnv, 0.0, 1.0),
    FilterRelease => ("Filter Release", FilterEnv, EnvelopeParams::MIN_TIME, EnvelopeParams::MAX_TIME),
    AmpAttack => ("Amp Attack", AmpEnv, EnvelopeParams::MIN_ATTACK, EnvelopeParams::MAX_ATTACK),
    AmpDecay => ("Amp Decay", AmpEnv, EnvelopeParams::MIN_TIME, EnvelopeParams::MAX_TIME),
    AmpSustain => ("Amp Sustain", AmpEnv, 0.0, 1.0),
    AmpRelease => ("Amp Release", AmpEnv, EnvelopeParams::MIN_TIME, EnvelopeParams::MAX_TIME),
    LfoRate => ("LFO Rate", Lfo, 0.1, 30.0),
    LfoDelay => ("LFO Delay", Lfo, 0.0, 3.0),
    Chorus => ("Chorus", Chorus, 0.0, last_index(ChorusMode::ALL.len())),
    PitchBend => ("Pitch Bend", Performance, -1.0, 1.0),
    BendRange => ("Bend Range", Performance, 0.0, 24.0),
    Portamento => ("Portamento", Performance, 0.0, 10.0),
    ModWheel => ("Mod Wheel", Performance, 0.0, 1.0),
    VcaMode => ("VCA Mode", Performance, 0.0, last_index(VcaMode::ALL.len())),
    FilterEnvPolarity => ("Filter Env Polarity", Performance, 0.0, last_index(EnvPolarity::ALL.len())),
    VcaLevel => ("VCA Level", Performance, 0.0, 1.0),
    MasterTune => ("Master Tune", Performance, -50.0, 50.0),
    VelocityToFilter => ("Velocity to Filter", Performance, 0.0, 1.0),
    VelocityToAmp => ("Velocity to Amp", Performance, 0.0, 1.0),
    SustainPedal => ("Sustain Pedal", Performance, 0.0, 1.0),
    StealMode => ("Steal Mode", Performance, 0.0, last_index(StealMode::ALL.len())),
    MasterVolume => ("Master Volume", Performance, 0.0, 1.0),
}

impl ParamId {
    /// Value of this parameter in the default sets.
    pub fn default_value(self) -> f32 {
        read_param(self, &Patch::default(), &PerformanceParams::default())
    }
}

#[inline]
fn position(value: f32) -> usize {
    // Negative and NaN saturate to 0
    libm::roundf(value) as usize
}

#[inline]
fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

#[inline]
fn index_value(index: usize) -> f32 {
    index as f32
}

/// Read one parameter out of a patch and performance set.
pub fn read_param(id: ParamId, patch: &Patch, perf: &PerformanceParams) -> f32 {
    let osc = &patch.oscillator;
    let filter = &patch.filter;
    let fenv = &patch.filter_env;
    let aenv = &patch.amp_env;
    match id {
        ParamId::SawLevel => osc.saw_level,
        ParamId::PulseLevel => osc.pulse_level,
        ParamId::SubLevel => osc.sub_level,
        ParamId::NoiseLevel => osc.noise_level,
        ParamId::PulseWidth => osc.pulse_width,
        ParamId::PwmDepth => osc.pwm_depth,
        ParamId::LfoTarget => index_value(osc.lfo_target.index()),
        ParamId::Range => index_value(osc.range.index()),
        ParamId::Detune => osc.detune_cents,
        ParamId::Drift => flag(osc.drift),
        ParamId::Cutoff => filter.cutoff,
        ParamId::Resonance => filter.resonance,
        ParamId::FilterEnvAmount => filter.env_amount,
        ParamId::FilterLfoAmount => filter.lfo_amount,
        ParamId::KeyTrack => index_value(filter.key_track.index()),
        ParamId::Drive => filter.drive,
        ParamId::Hpf => index_value(filter.hpf.index()),
        ParamId::FilterAttack => fenv.attack,
        ParamId::FilterDecay => fenv.decay,
        ParamId::FilterSustain => fenv.sustain,
        ParamId::FilterRelease => fenv.release,
        ParamId::AmpAttack => aenv.attack,
        ParamId::AmpDecay => aenv.decay,
        ParamId::AmpSustain => aenv.sustain,
        ParamId::AmpRelease => aenv.release,
        ParamId::LfoRate => patch.lfo.rate,
        ParamId::LfoDelay => patch.lfo.delay,
        ParamId::Chorus => index_value(patch.chorus.mode.index()),
        ParamId::PitchBend => perf.pitch_bend,
        ParamId::BendRange => perf.bend_range,
        ParamId::Portamento => perf.portamento,
        ParamId::ModWheel => perf.mod_wheel,
        ParamId::VcaMode => index_value(perf.vca_mode.index()),
        ParamId::FilterEnvPolarity => index_value(perf.filter_env_polarity.index()),
        ParamId::VcaLevel => perf.vca_level,
        ParamId::MasterTune => perf.master_tune,
        ParamId::VelocityToFilter => perf.velocity_to_filter,
        ParamId::VelocityToAmp => perf.velocity_to_amp,
        ParamId::SustainPedal => flag(perf.sustain_pedal),
        ParamId::StealMode => index_value(perf.steal_mode.index()),
        ParamId::MasterVolume => perf.master_volume,
    }
}

/// Write one parameter into a patch and performance set.
///
/// The caller sanitizes the touched set afterwards.
pub fn write_param(id: ParamId, value: f32, patch: &mut Patch, perf: &mut PerformanceParams) {
    let osc = &mut patch.oscillator;
    let filter = &mut patch.filter;
    match id {
        ParamId::SawLevel => osc.saw_level = value,
        ParamId::PulseLevel => osc.pulse_level = value,
        ParamId::SubLevel => osc.sub_level = value,
        ParamId::NoiseLevel => osc.noise_level = value,
        ParamId::PulseWidth => osc.pulse_width = value,
        ParamId::PwmDepth => osc.pwm_depth = value,
        ParamId::LfoTarget => osc.lfo_target = LfoTarget::from_index(position(value)),
        ParamId::Range => osc.range = OctaveRange::from_index(position(value)),
        ParamId::Detune => osc.detune_cents = value,
        ParamId::Drift => osc.drift = value >= 0.5,
        ParamId::Cutoff => filter.cutoff = value,
        ParamId::Resonance => filter.resonance = value,
        ParamId::FilterEnvAmount => filter.env_amount = value,
        ParamId::FilterLfoAmount => filter.lfo_amount = value,
        ParamId::KeyTrack => filter.key_track = KeyTrack::from_index(position(value)),
        ParamId::Drive => filter.drive = value,
        ParamId::Hpf => filter.hpf = HpfMode::from_index(position(value)),
        ParamId::FilterAttack => patch.filter_env.attack = value,
        ParamId::FilterDecay => patch.filter_env.decay = value,
        ParamId::FilterSustain => patch.filter_env.sustain = value,
        ParamId::FilterRelease => patch.filter_env.release = value,
        ParamId::AmpAttack => patch.amp_env.attack = value,
        ParamId::AmpDecay => patch.amp_env.decay = value,
        ParamId::AmpSustain => patch.amp_env.sustain = value,
        ParamId::AmpRelease => patch.amp_env.release = value,
        ParamId::LfoRate => patch.lfo.rate = value,
        ParamId::LfoDelay => patch.lfo.delay = value,
        ParamId::Chorus => patch.chorus.mode = ChorusMode::from_index(position(value)),
        ParamId::PitchBend => perf.pitch_bend = value,
        ParamId::BendRange => perf.bend_range = value,
        ParamId::Portamento => perf.portamento = value,
        ParamId::ModWheel => perf.mod_wheel = value,
        ParamId::VcaMode => perf.vca_mode = VcaMode::from_index(position(value)),
        ParamId::FilterEnvPolarity => {
            perf.filter_env_polarity = EnvPolarity::from_index(position(value));
        }
        ParamId::VcaLevel => perf.vca_level = value,
        ParamId::MasterTune => perf.master_tune = value,
        ParamId::VelocityToFilter => perf.velocity_to_filter = value,
        ParamId::VelocityToAmp => perf.velocity_to_amp = value,
        ParamId::SustainPedal => perf.sustain_pedal = value >= 0.5,
        ParamId::StealMode => perf.steal_mode = StealMode::from_index(position(value)),
        ParamId::MasterVolume => perf.master_volume = value,
    }
}

/// How a 7-bit controller value maps onto a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CcCurve {
    /// Straight line across the parameter range
    Linear,
    /// Geometric sweep between two positive bounds
    Exponential {
        /// Value at 0
        min: f32,
        /// Value at 127
        max: f32,
    },
    /// Exponential, except 0 maps to exactly 0 (off)
    ExponentialOrOff {
        /// Value at 1
        min: f32,
        /// Value at 127
        max: f32,
    },
    /// Equal-width buckets across the switch positions
    Bucket,
    /// On at 64 and above
    Switch,
}

impl CcCurve {
    /// Map a controller value to natural units for `id`.
    pub fn map(self, id: ParamId, value: u8) -> f32 {
        let value = value.min(127);
        let norm = f32::from(value) / 127.0;
        match self {
            Self::Linear => {
                let (min, max) = id.range();
                min + (max - min) * norm
            }
            Self::Exponential { min, max } => min * powf(max / min, norm),
            Self::ExponentialOrOff { min, max } => {
                if value == 0 {
                    0.0
                } else {
                    min * powf(max / min, norm)
                }
            }
            Self::Bucket => {
                let (_, last) = id.range();
                let count = last as usize + 1;
                index_value(usize::from(value) * count / 128)
            }
            Self::Switch => flag(value >= 64),
        }
    }
}

/// What a controller number does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CcTarget {
    /// Set a parameter through a curve
    Param(ParamId, CcCurve),
    /// Hard-silence every voice and the chorus (CC 120)
    AllSoundOff,
    /// Release every voice (CC 123)
    AllNotesOff,
}

const fn linear(id: ParamId) -> CcTarget {
    CcTarget::Param(id, CcCurve::Linear)
}

const fn bucket(id: ParamId) -> CcTarget {
    CcTarget::Param(id, CcCurve::Bucket)
}

const fn exp(id: ParamId, min: f32, max: f32) -> CcTarget {
    CcTarget::Param(id, CcCurve::Exponential { min, max })
}

const ATTACK: (f32, f32) = (EnvelopeParams::MIN_ATTACK, EnvelopeParams::MAX_ATTACK);
const TIME: (f32, f32) = (EnvelopeParams::MIN_TIME, EnvelopeParams::MAX_TIME);

/// Default controller assignments.
pub const CC_MAP: &[(u8, CcTarget)] = &[
    (1, linear(ParamId::ModWheel)),
    (
        5,
        CcTarget::Param(
            ParamId::Portamento,
            CcCurve::ExponentialOrOff {
                min: 0.001,
                max: 10.0,
            },
        ),
    ),
    (7, linear(ParamId::MasterVolume)),
    (64, CcTarget::Param(ParamId::SustainPedal, CcCurve::Switch)),
    (65, bucket(ParamId::VcaMode)),
    (70, linear(ParamId::FilterEnvAmount)),
    (71, linear(ParamId::Resonance)),
    (72, exp(ParamId::AmpRelease, TIME.0, TIME.1)),
    (73, exp(ParamId::AmpAttack, ATTACK.0, ATTACK.1)),
    (74, linear(ParamId::Cutoff)),
    (75, exp(ParamId::AmpDecay, TIME.0, TIME.1)),
    (76, exp(ParamId::LfoRate, 0.1, 30.0)),
    (77, linear(ParamId::LfoDelay)),
    (78, linear(ParamId::PwmDepth)),
    (79, linear(ParamId::AmpSustain)),
    (80, linear(ParamId::PulseWidth)),
    (81, bucket(ParamId::LfoTarget)),
    (82, bucket(ParamId::Range)),
    (83, bucket(ParamId::KeyTrack)),
    (84, bucket(ParamId::Hpf)),
    (85, bucket(ParamId::Chorus)),
    (86, linear(ParamId::FilterLfoAmount)),
    (87, exp(ParamId::FilterAttack, ATTACK.0, ATTACK.1)),
    (88, exp(ParamId::FilterDecay, TIME.0, TIME.1)),
    (89, linear(ParamId::FilterSustain)),
    (90, exp(ParamId::FilterRelease, TIME.0, TIME.1)),
    (91, linear(ParamId::SawLevel)),
    (92, linear(ParamId::PulseLevel)),
    (93, linear(ParamId::SubLevel)),
    (94, linear(ParamId::NoiseLevel)),
    (95, bucket(ParamId::FilterEnvPolarity)),
    (120, CcTarget::AllSoundOff),
    (123, CcTarget::AllNotesOff),
];

/// Find the assignment for a controller number.
pub fn cc_target(controller: u8) -> Option<CcTarget> {
    CC_MAP
        .iter()
        .find(|(cc, _)| *cc == controller)
        .map(|&(_, target)| target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_unique_and_nonempty() {
        for (i, a) in ParamId::ALL.iter().enumerate() {
            assert!(!a.name().is_empty());
            for b in &ParamId::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn test_read_write_every_param() {
        let mut patch = Patch::default();
        let mut perf = PerformanceParams::default();
        for &id in ParamId::ALL {
            let (_, max) = id.range();
            write_param(id, max, &mut patch, &mut perf);
            assert_eq!(read_param(id, &patch, &perf), max, "{}", id.name());
        }
    }

    #[test]
    fn test_defaults_inside_range() {
        for &id in ParamId::ALL {
            let (min, max) = id.range();
            let v = id.default_value();
            assert!(
                (min..=max).contains(&v),
                "{} default {v} outside {min}..{max}",
                id.name()
            );
        }
    }

    #[test]
    fn test_linear_curve_endpoints() {
        assert_eq!(CcCurve::Linear.map(ParamId::Cutoff, 0), 0.0);
        assert_eq!(CcCurve::Linear.map(ParamId::Cutoff, 127), 1.0);
        assert_eq!(CcCurve::Linear.map(ParamId::FilterEnvAmount, 0), -1.0);
        assert!((CcCurve::Linear.map(ParamId::PulseWidth, 127) - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_exponential_curve() {
        let curve = CcCurve::Exponential {
            min: 0.1,
            max: 30.0,
        };
        assert!((curve.map(ParamId::LfoRate, 0) - 0.1).abs() < 1e-6);
        assert!((curve.map(ParamId::LfoRate, 127) - 30.0).abs() < 1e-3);
        let mid = curve.map(ParamId::LfoRate, 64);
        assert!(mid > 1.0 && mid < 2.5, "geometric midpoint {mid}");
    }

    #[test]
    fn test_portamento_zero_is_off() {
        let Some(CcTarget::Param(id, curve)) = cc_target(5) else {
            panic!("CC 5 should map to a parameter");
        };
        assert_eq!(id, ParamId::Portamento);
        assert_eq!(curve.map(id, 0), 0.0);
        assert!(curve.map(id, 1) > 0.0);
        assert!((curve.map(id, 127) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_bucket_curve_covers_all_positions() {
        let positions: Vec<f32> = [0u8, 31, 32, 63, 64, 95, 96, 127]
            .iter()
            .map(|&v| CcCurve::Bucket.map(ParamId::Chorus, v))
            .collect();
        assert_eq!(positions, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        assert_eq!(CcCurve::Bucket.map(ParamId::VcaMode, 63), 0.0);
        assert_eq!(CcCurve::Bucket.map(ParamId::VcaMode, 64), 1.0);
    }

    #[test]
    fn test_switch_threshold() {
        assert_eq!(CcCurve::Switch.map(ParamId::SustainPedal, 63), 0.0);
        assert_eq!(CcCurve::Switch.map(ParamId::SustainPedal, 64), 1.0);
    }

    #[test]
    fn test_unknown_controller() {
        assert_eq!(cc_target(2), None);
        assert_eq!(cc_target(127), None);
        assert_eq!(cc_target(120), Some(CcTarget::AllSoundOff));
    }

    #[test]
    fn test_cc_map_has_no_duplicates() {
        for (i, (a, _)) in CC_MAP.iter().enumerate() {
            assert!(CC_MAP[i + 1..].iter().all(|(b, _)| a != b), "CC {a} twice");
        }
    }
}
