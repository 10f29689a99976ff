//! Poorhouse Core - DSP primitives for the poorhouse voice engine
//!
//! This crate provides the building blocks the synth voice and chorus are
//! assembled from, designed for real-time processing with zero allocation
//! in the audio path.
//!
//! # Filters
//!
//! - [`ZdfOnePole`] - Trapezoidal one-pole with lowpass and highpass outputs
//! - [`LadderFilter`] - 4-pole zero-delay-feedback ladder with self-oscillation
//!
//! # Delay Lines
//!
//! - [`InterpolatedDelay`] - Circular buffer with linear fractional reads
//!
//! # Modulation
//!
//! - [`Lfo`] - Zero-start triangle LFO with onset fade-in
//!
//! # Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing
//! - [`LinearSmoothedParam`] - Constant-rate ramps (portamento)
//!
//! # Utilities
//!
//! - Pitch math: [`midi_to_freq`], [`semitones_to_ratio`], [`cents_to_ratio`]
//! - [`NoiseSource`] - Seeded random source for noise and drift
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! poorhouse-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod delay;
pub mod ladder;
pub mod lfo;
pub mod math;
pub mod noise;
pub mod one_pole;
pub mod param;

pub use delay::InterpolatedDelay;
pub use ladder::LadderFilter;
pub use lfo::Lfo;
pub use math::{
    cents_to_ratio, flush_denormal, midi_to_freq, ms_to_samples, semitones_to_ratio, soft_clip,
};
pub use noise::NoiseSource;
pub use one_pole::{ZdfOnePole, zdf_gain, zdf_resolve};
pub use param::{LinearSmoothedParam, SmoothedParam};
