//! Patches: every sound-shaping parameter set in one bundle.
//!
//! A [`Patch`] holds what a preset stores. Performance controls (bend,
//! wheel, pedal, master level, steal policy) are deliberately absent, so
//! loading a patch never moves a controller the player is touching.

use crate::error::{Result, SynthError};
use crate::params::{
    ChorusMode, ChorusParams, EnvelopeParams, FilterParams, KeyTrack, LfoParams, LfoTarget,
    OscillatorParams,
};

/// Number of factory patches.
pub const FACTORY_PATCH_COUNT: usize = 5;

/// A complete sound.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patch {
    /// DCO settings
    pub oscillator: OscillatorParams,
    /// VCF settings
    pub filter: FilterParams,
    /// Filter envelope
    pub filter_env: EnvelopeParams,
    /// Amplitude envelope
    pub amp_env: EnvelopeParams,
    /// Shared LFO
    pub lfo: LfoParams,
    /// Chorus
    pub chorus: ChorusParams,
}

impl Patch {
    /// Copy with every set clamped to range.
    pub fn sanitized(self) -> Self {
        Self {
            oscillator: self.oscillator.sanitized(),
            filter: self.filter.sanitized(),
            filter_env: self.filter_env.sanitized(),
            amp_env: self.amp_env.sanitized(),
            lfo: self.lfo.sanitized(),
            chorus: self.chorus,
        }
    }

    /// The factory bank, in bank order.
    pub fn factory() -> [(&'static str, Patch); FACTORY_PATCH_COUNT] {
        [
            ("Init", init()),
            ("Classic Juno", classic()),
            ("Bass", bass()),
            ("Pad", pad()),
            ("Lead", lead()),
        ]
    }

    /// Look up a factory patch by name (ASCII case-insensitive).
    ///
    /// ```rust
    /// use poorhouse_synth::Patch;
    ///
    /// let pad = Patch::factory_by_name("pad").unwrap();
    /// assert!(pad.amp_env.attack > 1.0);
    /// assert!(Patch::factory_by_name("Brass").is_err());
    /// ```
    pub fn factory_by_name(name: &str) -> Result<Patch> {
        Self::factory()
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, patch)| patch)
            .ok_or(SynthError::UnknownPatch)
    }
}

fn env(attack: f32, decay: f32, sustain: f32, release: f32) -> EnvelopeParams {
    EnvelopeParams {
        attack,
        decay,
        sustain,
        release,
    }
}

fn init() -> Patch {
    Patch {
        filter: FilterParams {
            cutoff: 0.8,
            ..FilterParams::default()
        },
        filter_env: env(0.01, 0.3, 0.7, 0.5),
        amp_env: env(0.005, 0.3, 0.8, 0.3),
        ..Patch::default()
    }
}

fn classic() -> Patch {
    Patch {
        oscillator: OscillatorParams {
            saw_level: 0.6,
            pulse_level: 0.4,
            pwm_depth: 0.3,
            lfo_target: LfoTarget::Pwm,
            ..OscillatorParams::default()
        },
        filter: FilterParams {
            cutoff: 0.65,
            resonance: 0.4,
            env_amount: 0.5,
            key_track: KeyTrack::Half,
            ..FilterParams::default()
        },
        filter_env: env(0.01, 0.8, 0.4, 0.5),
        amp_env: env(0.01, 0.5, 0.7, 0.4),
        lfo: LfoParams {
            rate: 4.5,
            delay: 0.0,
        },
        chorus: ChorusParams {
            mode: ChorusMode::Two,
        },
    }
}

fn bass() -> Patch {
    Patch {
        oscillator: OscillatorParams {
            saw_level: 0.8,
            pulse_level: 0.2,
            sub_level: 0.6,
            pulse_width: 0.3,
            ..OscillatorParams::default()
        },
        filter: FilterParams {
            cutoff: 0.4,
            resonance: 0.6,
            env_amount: 0.8,
            key_track: KeyTrack::Full,
            ..FilterParams::default()
        },
        filter_env: env(0.001, 0.4, 0.1, 0.2),
        amp_env: env(0.001, 0.3, 0.9, 0.1),
        lfo: LfoParams {
            rate: 0.5,
            delay: 0.0,
        },
        chorus: ChorusParams::default(),
    }
}

fn pad() -> Patch {
    Patch {
        oscillator: OscillatorParams {
            saw_level: 0.5,
            pulse_level: 0.5,
            noise_level: 0.05,
            pulse_width: 0.6,
            pwm_depth: 0.5,
            lfo_target: LfoTarget::Pwm,
            detune_cents: 3.0,
            ..OscillatorParams::default()
        },
        filter: FilterParams {
            cutoff: 0.7,
            resonance: 0.3,
            env_amount: 0.3,
            ..FilterParams::default()
        },
        filter_env: env(1.5, 2.0, 0.8, 2.5),
        amp_env: env(1.2, 1.0, 0.9, 2.0),
        lfo: LfoParams {
            rate: 0.3,
            delay: 0.0,
        },
        chorus: ChorusParams {
            mode: ChorusMode::Both,
        },
    }
}

fn lead() -> Patch {
    Patch {
        oscillator: OscillatorParams {
            saw_level: 1.0,
            lfo_target: LfoTarget::Pitch,
            ..OscillatorParams::default()
        },
        filter: FilterParams {
            cutoff: 0.75,
            resonance: 0.5,
            env_amount: 0.7,
            key_track: KeyTrack::Full,
            ..FilterParams::default()
        },
        filter_env: env(0.005, 0.2, 0.5, 0.3),
        amp_env: env(0.002, 0.1, 1.0, 0.1),
        lfo: LfoParams {
            rate: 5.0,
            delay: 0.0,
        },
        chorus: ChorusParams {
            mode: ChorusMode::One,
        },
    }
}
