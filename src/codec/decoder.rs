//! Token string to chord sequence.
//!
//! Decoding never aborts: a note group that cannot be parsed is dropped,
//! recorded in the [`DecodeReport`], and the rest of the step and sequence
//! is decoded as usual.

use thiserror::Error;

use crate::chord_array::Chord;
use crate::config::{CodecConfig, DurationStrategy};
use crate::error::CodecError;
use crate::note::{parse_pitch_name, NoteToken, NoteValue};

use super::{
    INSTRUMENT_PREFIX, MEASURE_END, MEASURE_START, NOTE_PREFIX, OCTAVE_PREFIX, TIME_SEP,
    TYPE_PREFIX,
};

/// Why a note group was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteParseError {
    #[error("Note group has no note name")]
    MissingNoteName,

    #[error("Invalid pitch name: {0}")]
    InvalidPitch(String),

    #[error("Note {0} has no type")]
    MissingType(String),

    #[error("Invalid type value: {0}")]
    InvalidType(String),

    #[error("Invalid note duration: {0}")]
    InvalidDuration(i32),

    #[error("Invalid instrument index: {0}")]
    InvalidInstrument(String),

    #[error("Pitch {pitch} is outside the pitch range 0..{range}")]
    PitchOutOfRange { pitch: u8, range: usize },

    #[error("Invalid wait count: {0}")]
    InvalidWait(String),
}

/// Outcome of parsing one note group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteParse {
    Note(NoteToken),
    Error(NoteParseError),
}

/// A note group that was dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNote {
    /// Step the note would have belonged to
    pub step: usize,
    /// Index of the group's first atom in the whitespace-split input
    pub position: usize,
    pub error: NoteParseError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub skipped: Vec<SkippedNote>,
}

impl DecodeReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Turn the first dropped note, if any, into an error.
    pub fn into_result(self) -> Result<(), CodecError> {
        match self.skipped.into_iter().next() {
            None => Ok(()),
            Some(skipped) => Err(CodecError::ParseError {
                position: skipped.position,
                message: skipped.error.to_string(),
            }),
        }
    }
}

/// Decoded chords plus the record of dropped notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub chords: Vec<Chord>,
    pub report: DecodeReport,
}

/// A classified whitespace-delimited atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom<'a> {
    TimeSep,
    /// Measure or sequence markers, carry no state
    Marker,
    Note(&'a str),
    Octave(&'a str),
    Type(&'a str),
    Instrument(&'a str),
    Unknown(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct LocatedAtom<'a> {
    atom: Atom<'a>,
    position: usize,
}

fn classify<'a>(raw: &'a str, config: &CodecConfig) -> Atom<'a> {
    if raw == TIME_SEP {
        return Atom::TimeSep;
    }
    if raw == MEASURE_START || raw == MEASURE_END || raw == config.sequence_start_marker {
        return Atom::Marker;
    }
    let mut chars = raw.chars();
    let prefix = chars.next();
    let body = chars.as_str();
    match prefix {
        Some(NOTE_PREFIX) => Atom::Note(body),
        Some(OCTAVE_PREFIX) => Atom::Octave(body),
        Some(TYPE_PREFIX) => Atom::Type(body),
        Some(INSTRUMENT_PREFIX) => Atom::Instrument(body),
        _ => Atom::Unknown(raw),
    }
}

fn lex<'a>(text: &'a str, config: &CodecConfig) -> Vec<LocatedAtom<'a>> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, raw)| LocatedAtom {
            atom: classify(raw, config),
            position,
        })
        .filter(|located| located.atom != Atom::Marker)
        .collect()
}

/// Build a note from one group of atoms.
///
/// A repeated prefix within the group overrides the earlier atom.
fn parse_group(group: &[LocatedAtom<'_>], config: &CodecConfig) -> NoteParse {
    let mut name = None;
    let mut octave = None;
    let mut type_value = None;
    let mut instrument = None;

    for located in group {
        match located.atom {
            Atom::Note(body) => name = Some(body),
            Atom::Octave(body) => octave = Some(body),
            Atom::Type(body) => type_value = Some(body),
            Atom::Instrument(body) => instrument = Some(body),
            Atom::Unknown(raw) => log::debug!("Ignoring unknown atom '{}'", raw),
            Atom::TimeSep | Atom::Marker => {}
        }
    }

    match build_note(name, octave, type_value, instrument, config) {
        Ok(note) => NoteParse::Note(note),
        Err(error) => NoteParse::Error(error),
    }
}

fn build_note(
    name: Option<&str>,
    octave: Option<&str>,
    type_value: Option<&str>,
    instrument: Option<&str>,
    config: &CodecConfig,
) -> Result<NoteToken, NoteParseError> {
    let name = name.ok_or(NoteParseError::MissingNoteName)?;
    let spelled = format!("{}{}", name, octave.unwrap_or(""));

    let pitch =
        parse_pitch_name(&spelled).ok_or_else(|| NoteParseError::InvalidPitch(spelled.clone()))?;

    let type_value = type_value.ok_or_else(|| NoteParseError::MissingType(spelled.clone()))?;
    let duration: i32 = type_value
        .parse()
        .map_err(|_| NoteParseError::InvalidType(type_value.to_string()))?;
    let value =
        NoteValue::from_cell(duration).map_err(|_| NoteParseError::InvalidDuration(duration))?;

    let instrument = match instrument {
        Some(raw) => match raw.parse::<usize>() {
            Ok(index) if index < config.max_instruments => Some(index),
            _ => return Err(NoteParseError::InvalidInstrument(raw.to_string())),
        },
        None => None,
    };

    if pitch as usize >= config.pitch_range {
        return Err(NoteParseError::PitchOutOfRange {
            pitch,
            range: config.pitch_range,
        });
    }

    Ok(NoteToken {
        pitch,
        value,
        instrument,
    })
}

/// Parse one note group given as raw atoms, e.g. `["nC#", "o4", "t-1", "i0"]`.
///
/// # Example
/// ```rust
/// use scoretok::codec::{parse_note_group, NoteParse, NoteParseError};
/// use scoretok::CodecConfig;
///
/// let config = CodecConfig::default();
/// match parse_note_group(&["nC#4", "t3"], &config) {
///     NoteParse::Note(note) => assert_eq!(note.pitch, 61),
///     NoteParse::Error(e) => panic!("{}", e),
/// }
/// assert_eq!(
///     parse_note_group(&["o4", "t3"], &config),
///     NoteParse::Error(NoteParseError::MissingNoteName)
/// );
/// ```
pub fn parse_note_group(atoms: &[&str], config: &CodecConfig) -> NoteParse {
    let group: Vec<LocatedAtom<'_>> = atoms
        .iter()
        .enumerate()
        .map(|(position, raw)| LocatedAtom {
            atom: classify(raw, config),
            position,
        })
        .collect();
    parse_group(&group, config)
}

/// Split a step's atoms into note groups; each note-name atom opens a new group.
fn note_groups<'s, 'a>(atoms: &'s [LocatedAtom<'a>]) -> Vec<&'s [LocatedAtom<'a>]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (idx, located) in atoms.iter().enumerate() {
        if matches!(located.atom, Atom::Note(_)) && idx > start {
            groups.push(&atoms[start..idx]);
            start = idx;
        }
    }
    if start < atoms.len() {
        groups.push(&atoms[start..]);
    }
    groups
}

fn decode_step(
    atoms: &[LocatedAtom<'_>],
    step: usize,
    config: &CodecConfig,
    report: &mut DecodeReport,
) -> Chord {
    let mut chord = Vec::new();
    for group in note_groups(atoms) {
        match parse_group(group, config) {
            NoteParse::Note(note) => chord.push(note),
            NoteParse::Error(error) => {
                let position = group[0].position;
                log::warn!(
                    "Dropping note at step {} (token {}): {}",
                    step,
                    position,
                    error
                );
                report.skipped.push(SkippedNote {
                    step,
                    position,
                    error,
                });
            }
        }
    }
    chord
}

/// Decode a token string into one chord per time step.
///
/// Measure markers and the sequence-start marker are discarded. In binary mode
/// every separator closes a step; in duration mode every separator opens one,
/// led by a wait count that expands into that many empty steps. A wait above
/// `config.max_wait_steps` is reported and the step's notes are still decoded.
pub fn decode(text: &str, config: &CodecConfig) -> Decoded {
    let atoms = lex(text, config);
    let chunks: Vec<&[LocatedAtom<'_>]> = atoms.split(|a| a.atom == Atom::TimeSep).collect();
    let last = chunks.len() - 1;

    let mut decoded = Decoded::default();
    for (idx, chunk) in chunks.into_iter().enumerate() {
        let mut chunk = chunk;
        match config.strategy {
            DurationStrategy::Binary => {
                // Text after the final separator is only a step if it holds atoms.
                if idx == last && chunk.is_empty() {
                    continue;
                }
            }
            DurationStrategy::Duration => {
                if idx == 0 && chunk.is_empty() {
                    continue;
                }
                if let Some((first, rest)) = chunk.split_first() {
                    if let Atom::Type(body) = first.atom {
                        chunk = rest;
                        match body.parse::<usize>() {
                            Ok(wait) if wait <= config.max_wait_steps => {
                                decoded.chords.extend(std::iter::repeat_with(Vec::new).take(wait))
                            }
                            _ => {
                                let error = NoteParseError::InvalidWait(body.to_string());
                                log::warn!("Ignoring wait at token {}: {}", first.position, error);
                                decoded.report.skipped.push(SkippedNote {
                                    step: decoded.chords.len(),
                                    position: first.position,
                                    error,
                                });
                            }
                        }
                    }
                }
            }
        }

        let step = decoded.chords.len();
        let chord = decode_step(chunk, step, config, &mut decoded.report);
        decoded.chords.push(chord);
    }
    decoded
}
