//! Poorhouse Effects - Post-voice effects for the poorhouse engine
//!
//! - [`Chorus`] - Dual-stage bucket-brigade chorus, mono in and stereo out
//!
//! ## Example
//!
//! ```rust
//! use poorhouse_effects::{Chorus, ChorusMode};
//!
//! let mut chorus = Chorus::new(48000.0);
//! chorus.set_mode(ChorusMode::One);
//!
//! let (left, right) = chorus.process(0.25);
//! assert!(left.is_finite() && right.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chorus;

pub use chorus::{Chorus, ChorusMode};
