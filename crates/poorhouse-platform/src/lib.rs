//! Poorhouse Platform - real-time engine context for the poorhouse synth
//!
//! The synth core is single-threaded: nothing in it is synchronized. This
//! crate puts a bounded lock-free queue in front of it so MIDI and UI
//! threads can send events while the audio callback owns the synth.
//!
//! - [`engine`] - Split a [`Synth`](poorhouse_synth::Synth) into a producer
//!   handle and an audio-thread context
//! - [`ControlHandle`] - Non-blocking, cloneable event sender
//! - [`AudioEngine`] - Drains the queue at block start, then renders
//! - [`ControlEvent`] - Everything that can be sent
//!
//! # Example
//!
//! ```rust
//! use poorhouse_platform::{AudioEngine, ControlEvent};
//!
//! let (control, mut audio) = AudioEngine::<6>::create(48000.0, 64).unwrap();
//!
//! // MIDI thread
//! let midi = control.clone();
//! std::thread::spawn(move || {
//!     midi.midi(0x90, 60, 100).ok();
//! })
//! .join()
//! .unwrap();
//! control.send(ControlEvent::AllNotesOff).unwrap();
//!
//! // Audio callback
//! let mut left = vec![0.0; 256];
//! let mut right = vec![0.0; 256];
//! audio.process_block(&mut left, &mut right);
//! ```

pub mod engine;
pub mod error;

pub use engine::{AudioEngine, ControlEvent, ControlHandle, engine};
pub use error::{EngineError, Result};
