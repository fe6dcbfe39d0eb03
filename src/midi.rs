//! MIDI event vocabulary shared by the keyboard, the knobs and the sinks.

pub const NOTES: usize = 128;

const NOTE_NAMES: [&str; 12] = [
    "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "A♯", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    ControllerChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
}

impl MidiEvent {
    /// Raw wire bytes. Program changes are two bytes long, everything else three.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            } => vec![0b1001_0000 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOff {
                channel,
                note,
                velocity,
            } => vec![0b1000_0000 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiEvent::ControllerChange {
                channel,
                controller,
                value,
            } => vec![0b1011_0000 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
            MidiEvent::ProgramChange { channel, program } => {
                vec![0b1100_0000 | (channel & 0x0F), program & 0x7F]
            }
        }
    }

    /// Parses one complete channel message. Running status, system messages
    /// and truncated input yield `None`.
    pub fn from_raw_midi(bytes: &[u8]) -> Option<MidiEvent> {
        let status = *bytes.first()?;
        let channel = status & 0x0F;
        match (status & 0xF0, &bytes[1..]) {
            (0x90, [note, 0, ..]) => Some(MidiEvent::NoteOff {
                channel,
                note: *note & 0x7F,
                velocity: 0,
            }),
            (0x90, [note, velocity, ..]) => Some(MidiEvent::NoteOn {
                channel,
                note: *note & 0x7F,
                velocity: *velocity & 0x7F,
            }),
            (0x80, [note, velocity, ..]) => Some(MidiEvent::NoteOff {
                channel,
                note: *note & 0x7F,
                velocity: *velocity & 0x7F,
            }),
            (0xB0, [controller, value, ..]) => Some(MidiEvent::ControllerChange {
                channel,
                controller: *controller & 0x7F,
                value: *value & 0x7F,
            }),
            (0xC0, [program, ..]) => Some(MidiEvent::ProgramChange {
                channel,
                program: *program & 0x7F,
            }),
            _ => None,
        }
    }
}

/// Pitch-class name plus octave, e.g. 60 -> "C4".
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}
