//! Control queue and audio-thread engine context.
//!
//! Control events travel from any number of producer threads to the audio
//! thread over a bounded crossbeam channel. The audio callback owns the
//! [`AudioEngine`] outright and drains the queue once at the top of each
//! block, so the synth is only ever touched from one thread.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use poorhouse_synth::{DEFAULT_VOICES, MidiMessage, ParamId, Patch, Synth};

use crate::error::{EngineError, Result};

/// Events accepted by the engine, applied in arrival order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlEvent {
    /// Start a note (velocity 0 releases it)
    NoteOn {
        /// MIDI note number
        note: u8,
        /// Raw velocity
        velocity: u8,
    },
    /// Release a note
    NoteOff {
        /// MIDI note number
        note: u8,
    },
    /// Controller change routed through the default map
    ControlChange {
        /// Controller number
        controller: u8,
        /// Raw value
        value: u8,
    },
    /// Pitch wheel, -1.0 to 1.0
    PitchBend(f32),
    /// Raw three-byte MIDI message
    Midi([u8; 3]),
    /// Set one parameter in natural units
    SetParam(ParamId, f32),
    /// Replace the current sound
    LoadPatch(Patch),
    /// Release every voice
    AllNotesOff,
    /// Silence and clear everything
    Reset,
}

impl From<MidiMessage> for ControlEvent {
    fn from(message: MidiMessage) -> Self {
        match message {
            MidiMessage::NoteOn { note, velocity } => Self::NoteOn { note, velocity },
            MidiMessage::NoteOff { note } => Self::NoteOff { note },
            MidiMessage::ControlChange { controller, value } => {
                Self::ControlChange { controller, value }
            }
            MidiMessage::PitchBend(bend) => Self::PitchBend(bend),
        }
    }
}

/// Producer side of the control queue. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: Sender<ControlEvent>,
}

impl ControlHandle {
    /// Queue an event without blocking.
    ///
    /// A full queue drops the event and returns [`EngineError::QueueFull`].
    pub fn send(&self, event: ControlEvent) -> Result<()> {
        self.tx.try_send(event).map_err(|err| match err {
            TrySendError::Full(dropped) => {
                tracing::warn!(event = ?dropped, "control queue full, dropping event");
                EngineError::QueueFull
            }
            TrySendError::Disconnected(_) => EngineError::Disconnected,
        })
    }

    /// Queue a note-on.
    pub fn note_on(&self, note: u8, velocity: u8) -> Result<()> {
        self.send(ControlEvent::NoteOn { note, velocity })
    }

    /// Queue a note-off.
    pub fn note_off(&self, note: u8) -> Result<()> {
        self.send(ControlEvent::NoteOff { note })
    }

    /// Queue a controller change.
    pub fn control_change(&self, controller: u8, value: u8) -> Result<()> {
        self.send(ControlEvent::ControlChange { controller, value })
    }

    /// Queue a pitch-wheel position.
    pub fn pitch_bend(&self, bend: f32) -> Result<()> {
        self.send(ControlEvent::PitchBend(bend))
    }

    /// Queue a raw MIDI message.
    pub fn midi(&self, status: u8, data1: u8, data2: u8) -> Result<()> {
        self.send(ControlEvent::Midi([status, data1, data2]))
    }

    /// Queue a single parameter change.
    pub fn set_param(&self, id: ParamId, value: f32) -> Result<()> {
        self.send(ControlEvent::SetParam(id, value))
    }

    /// Queue a patch change.
    pub fn load_patch(&self, patch: Patch) -> Result<()> {
        self.send(ControlEvent::LoadPatch(patch))
    }

    /// Number of events waiting for the next block.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Audio-thread context: the synth plus the consumer end of the queue.
///
/// Move this into the audio callback and call [`process_block`] there.
///
/// [`process_block`]: AudioEngine::process_block
#[derive(Debug)]
pub struct AudioEngine<const N: usize = DEFAULT_VOICES> {
    synth: Synth<N>,
    rx: Receiver<ControlEvent>,
}

/// Split a synth into a control handle and an audio engine.
///
/// `capacity` bounds the queue (minimum 1).
///
/// ```rust
/// use poorhouse_platform::engine;
/// use poorhouse_synth::Synth;
///
/// let synth: Synth = Synth::new(48000.0).unwrap();
/// let (control, mut audio) = engine(synth, 256);
///
/// control.note_on(60, 100).unwrap();
///
/// let mut left = [0.0; 128];
/// let mut right = [0.0; 128];
/// audio.process_block(&mut left, &mut right);
/// assert_eq!(audio.synth().active_voice_count(), 1);
/// ```
pub fn engine<const N: usize>(
    synth: Synth<N>,
    capacity: usize,
) -> (ControlHandle, AudioEngine<N>) {
    let capacity = capacity.max(1);
    let (tx, rx) = bounded(capacity);
    tracing::info!(
        capacity,
        voices = N,
        sample_rate = synth.sample_rate(),
        "audio engine created"
    );
    (ControlHandle { tx }, AudioEngine { synth, rx })
}

impl<const N: usize> AudioEngine<N> {
    /// Build a default synth at `sample_rate` and split it.
    pub fn create(sample_rate: f32, capacity: usize) -> Result<(ControlHandle, Self)> {
        let synth = Synth::new(sample_rate)?;
        Ok(engine(synth, capacity))
    }

    /// Apply every queued event, in order. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        if applied > 0 {
            tracing::trace!(applied, "control events applied");
        }
        applied
    }

    /// Drain the queue, then render `min(left.len(), right.len())` frames.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.drain_events();
        self.synth.render(left, right);
    }

    /// Drain the queue, then fill an interleaved buffer.
    ///
    /// Channel 0 gets left and channel 1 right; further channels are zeroed.
    /// A mono buffer gets the channel average.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        self.drain_events();
        if channels == 0 {
            return;
        }
        for frame in data.chunks_exact_mut(channels) {
            let (left, right) = self.synth.process_sample();
            match frame {
                [mono] => *mono = 0.5 * (left + right),
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    /// Change the sample rate. Call from the audio thread or before starting.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.synth.set_sample_rate(sample_rate)?;
        Ok(())
    }

    /// The synth, for inspection.
    pub fn synth(&self) -> &Synth<N> {
        &self.synth
    }

    /// The synth, for setup outside the audio callback.
    pub fn synth_mut(&mut self) -> &mut Synth<N> {
        &mut self.synth
    }

    fn apply(&mut self, event: ControlEvent) {
        let synth = &mut self.synth;
        match event {
            ControlEvent::NoteOn { note, velocity } => synth.note_on(note, velocity),
            ControlEvent::NoteOff { note } => synth.note_off(note),
            ControlEvent::ControlChange { controller, value } => {
                synth.control_change(controller, value);
            }
            ControlEvent::PitchBend(bend) => synth.set_pitch_bend(bend),
            ControlEvent::Midi([status, data1, data2]) => synth.handle_midi(status, data1, data2),
            ControlEvent::SetParam(id, value) => synth.set_param(id, value),
            ControlEvent::LoadPatch(patch) => synth.load_patch(&patch),
            ControlEvent::AllNotesOff => synth.all_notes_off(),
            ControlEvent::Reset => synth.reset(),
        }
    }
}
