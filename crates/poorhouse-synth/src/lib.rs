//! Poorhouse Synth - six-voice polyphonic subtractive synthesizer
//!
//! Each voice runs one DCO into a ZDF ladder filter with an optional
//! high-pass in front, shaped by two ADSR envelopes. A shared delayed
//! triangle LFO modulates pitch, pulse width and cutoff, and the mono voice
//! sum is widened by a dual BBD-style chorus.
//!
//! # Components
//!
//! ## Sound generation
//!
//! - [`Dco`] - Band-limited saw, pulse, sub-octave square and noise mixer
//! - [`VoiceFilter`] - Cutoff mapping, modulation and drive around the ladder
//! - [`AdsrEnvelope`] - Exponential ADSR state machine
//! - [`Voice`] - DCO, filter and both envelopes with VCA, glide and sustain
//!
//! ## Engine
//!
//! - [`Synth`] - Fixed voice pool with stealing, shared LFO and chorus
//! - [`StealMode`] - Which sounding voice gives way to a new note
//!
//! ## Parameters
//!
//! Sound settings travel as small `Copy` structs that are broadcast to every
//! voice: [`OscillatorParams`], [`FilterParams`], [`EnvelopeParams`],
//! [`LfoParams`], [`ChorusParams`] and [`PerformanceParams`]. A [`Patch`]
//! bundles everything but the performance set, and [`ParamId`] addresses any
//! single field.
//!
//! ## Control
//!
//! - [`MidiMessage`] - Omni decoding of note, controller and bend messages
//! - [`CC_MAP`] - Default controller assignments
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default features:
//!
//! ```toml
//! [dependencies]
//! poorhouse-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use poorhouse_synth::{ChorusMode, FilterParams, Synth};
//!
//! let mut synth: Synth = Synth::new(48000.0).unwrap();
//! synth.set_filter_params(FilterParams {
//!     cutoff: 0.6,
//!     resonance: 0.4,
//!     ..FilterParams::default()
//! });
//! synth.set_chorus_mode(ChorusMode::One);
//!
//! // CC 74 moves the cutoff
//! synth.handle_midi(0xB0, 74, 100);
//! synth.handle_midi(0x90, 60, 100);
//!
//! let mut left = vec![0.0; 512];
//! let mut right = vec![0.0; 512];
//! synth.render(&mut left, &mut right);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod control;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod midi;
pub mod oscillator;
pub mod params;
pub mod patch;
pub mod synth;
pub mod voice;

pub use control::{CC_MAP, CcCurve, CcTarget, ParamId, ParamSection, cc_target};
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use error::{Result, SynthError};
pub use filter::{VoiceFilter, cutoff_knob_to_hz};
pub use midi::MidiMessage;
pub use oscillator::Dco;
pub use params::{
    ChorusMode, ChorusParams, EnvPolarity, EnvelopeParams, FilterParams, HpfMode, KeyTrack,
    LfoParams, LfoTarget, OctaveRange, OscillatorParams, PerformanceParams, StealMode, VcaMode,
};
pub use patch::Patch;
pub use synth::{DEFAULT_VOICES, Synth};
pub use voice::Voice;
