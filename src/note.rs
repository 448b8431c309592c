//! # Note Types
//!
//! The data primitives shared by every stage of the codec.
//!
//! ## Type Hierarchy
//! ```text
//! NoteEvent (performance side, quarter-note units)
//!   ├── pitch: u8 (MIDI, 60 = middle C)
//!   ├── start / duration: f64 quarter notes
//!   └── instrument: Option<String>
//!
//! NoteToken (token side, one note within one time step)
//!   ├── pitch: u8
//!   ├── value: NoteValue (Start | Continue | Duration(n))
//!   └── instrument: Option<usize>
//! ```
//!
//! ## Pitch Spelling
//! - Black keys are spelled with sharps: `C# D# F# G# A#`
//! - Octave is `pitch / 12 - 1`, so MIDI 60 is `C4` and MIDI 0 is `C-1`
//! - Parsing also accepts flats (`Bb3`) and respellings (`B#3` = `C4`)

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Cell value for a note onset whose length is given by the following continuations.
pub const VAL_START: i32 = -1;

/// Cell value for a note that started on an earlier step and is still sounding.
pub const VAL_CONT: i32 = -2;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A performed note as supplied by the note-stream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    /// Start time in quarter notes
    pub start: f64,
    /// Length in quarter notes
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
}

impl NoteEvent {
    pub fn new(pitch: u8, start: f64, duration: f64, instrument: Option<&str>) -> Self {
        Self {
            pitch,
            start,
            duration,
            instrument: instrument.map(str::to_string),
        }
    }
}

/// What a chord-array cell says about a sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValue {
    /// Onset, length inferred from the following continuations (`-1`)
    Start,
    /// Held from an earlier onset (`-2`)
    Continue,
    /// Onset with an explicit length in steps (always > 0)
    Duration(u32),
}

impl NoteValue {
    /// Interpret a raw cell or type-atom value.
    ///
    /// `0` and negative values other than the two sentinels are rejected.
    pub fn from_cell(value: i32) -> Result<Self, CodecError> {
        match value {
            VAL_START => Ok(NoteValue::Start),
            VAL_CONT => Ok(NoteValue::Continue),
            n if n > 0 => Ok(NoteValue::Duration(n as u32)),
            n => Err(CodecError::InvalidDuration(n)),
        }
    }

    pub fn to_cell(self) -> i32 {
        match self {
            NoteValue::Start => VAL_START,
            NoteValue::Continue => VAL_CONT,
            NoteValue::Duration(n) => n as i32,
        }
    }

    /// Collapse to the two states binary mode can represent.
    pub fn to_binary(self) -> Self {
        match self {
            NoteValue::Continue => NoteValue::Continue,
            _ => NoteValue::Start,
        }
    }

    pub fn is_onset(self) -> bool {
        !matches!(self, NoteValue::Continue)
    }
}

/// One note within one time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteToken {
    pub pitch: u8,
    pub value: NoteValue,
    pub instrument: Option<usize>,
}

impl NoteToken {
    /// Build a token from a raw duration value.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidDuration`] for a zero duration, or for a
    /// negative duration that is not one of the onset/continuation sentinels.
    pub fn new(pitch: u8, duration: i32, instrument: Option<usize>) -> Result<Self, CodecError> {
        Ok(Self {
            pitch,
            value: NoteValue::from_cell(duration)?,
            instrument,
        })
    }

    /// Pitch class name without octave, e.g. `C#`.
    pub fn name(&self) -> &'static str {
        pitch_class_name(self.pitch)
    }

    pub fn octave(&self) -> i32 {
        pitch_octave(self.pitch)
    }

    /// Pitch class name with octave, e.g. `C#4`.
    pub fn name_with_octave(&self) -> String {
        format!("{}{}", self.name(), self.octave())
    }

    /// Instrument index, untagged notes belong to instrument 0.
    pub fn instrument_index(&self) -> usize {
        self.instrument.unwrap_or(0)
    }
}

pub fn pitch_class_name(pitch: u8) -> &'static str {
    NOTE_NAMES[(pitch % 12) as usize]
}

pub fn pitch_octave(pitch: u8) -> i32 {
    pitch as i32 / 12 - 1
}

/// Parse `<letter><accidental?><octave>` into a MIDI pitch.
///
/// The letter is `A`-`G`, the accidental `#` or `b`, the octave a signed
/// integer. Returns `None` for anything else, including pitches outside
/// the MIDI range.
///
/// # Examples
/// ```
/// use scoretok::note::parse_pitch_name;
///
/// assert_eq!(parse_pitch_name("C4"), Some(60));
/// assert_eq!(parse_pitch_name("C#4"), Some(61));
/// assert_eq!(parse_pitch_name("Bb3"), Some(58));
/// assert_eq!(parse_pitch_name("C-1"), Some(0));
/// assert_eq!(parse_pitch_name("H4"), None);
/// assert_eq!(parse_pitch_name("C"), None);
/// ```
pub fn parse_pitch_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i64 = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave_str) = match rest.chars().next()? {
        '#' => (1, &rest[1..]),
        'b' => (-1, &rest[1..]),
        _ => (0, rest),
    };

    // Octave must be a plain signed integer: no '+', no whitespace.
    let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = octave_str.parse().ok()?;

    let midi = (i64::from(octave) + 1) * 12 + base + accidental;
    u8::try_from(midi).ok().filter(|&p| p <= 127)
}
