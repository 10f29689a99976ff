//! Decoding of raw three-byte MIDI channel messages.
//!
//! The engine listens omni: the channel nibble is ignored. Data bytes are
//! masked to seven bits so a stray high bit cannot push a note or
//! controller out of range.

/// A decoded channel message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiMessage {
    /// Key pressed with velocity 1 to 127
    NoteOn {
        /// MIDI note number
        note: u8,
        /// Raw velocity
        velocity: u8,
    },
    /// Key released (also note-on with velocity 0)
    NoteOff {
        /// MIDI note number
        note: u8,
    },
    /// Controller change
    ControlChange {
        /// Controller number
        controller: u8,
        /// Raw value 0 to 127
        value: u8,
    },
    /// Pitch wheel normalized to -1.0 to 1.0
    PitchBend(f32),
}

impl MidiMessage {
    /// Decode a status byte and its two data bytes.
    ///
    /// Returns `None` for message types the engine does not handle.
    ///
    /// ```rust
    /// use poorhouse_synth::MidiMessage;
    ///
    /// assert_eq!(
    ///     MidiMessage::parse(0x93, 60, 0),
    ///     Some(MidiMessage::NoteOff { note: 60 })
    /// );
    /// assert_eq!(MidiMessage::parse(0xE0, 0, 64), Some(MidiMessage::PitchBend(0.0)));
    /// assert_eq!(MidiMessage::parse(0xF8, 0, 0), None);
    /// ```
    pub fn parse(status: u8, data1: u8, data2: u8) -> Option<Self> {
        let d1 = data1 & 0x7F;
        let d2 = data2 & 0x7F;
        match status & 0xF0 {
            0x90 if d2 > 0 => Some(Self::NoteOn {
                note: d1,
                velocity: d2,
            }),
            0x80 | 0x90 => Some(Self::NoteOff { note: d1 }),
            0xB0 => Some(Self::ControlChange {
                controller: d1,
                value: d2,
            }),
            0xE0 => {
                let raw = (i32::from(d2) << 7) | i32::from(d1);
                let bend = (raw - 8192) as f32 / 8192.0;
                Some(Self::PitchBend(bend.clamp(-1.0, 1.0)))
            }
            _ => None,
        }
    }

    /// Parse a byte slice of at least three bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [status, d1, d2, ..] => Self::parse(status, d1, d2),
            _ => None,
        }
    }
}
