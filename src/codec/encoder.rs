//! Chord sequence to token atoms.

use std::fmt;

use crate::chord_array::Chord;
use crate::config::{CodecConfig, DurationStrategy, Granularity};
use crate::note::{NoteToken, NoteValue};

use super::{
    INSTRUMENT_PREFIX, MEASURE_END, MEASURE_START, NOTE_PREFIX, OCTAVE_PREFIX, TIME_SEP,
    TYPE_PREFIX,
};

/// The flat list of atoms produced by the encoder.
///
/// `Display` joins the atoms with single spaces, which is the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedSequence {
    pub atoms: Vec<String>,
}

impl EncodedSequence {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl fmt::Display for EncodedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.atoms.join(" "))
    }
}

/// Atoms for a single note.
///
/// In binary mode any explicit length is written as the onset sentinel. In
/// duration mode a continuation produces no atoms at all.
pub fn note_atoms(
    note: &NoteToken,
    granularity: Granularity,
    strategy: DurationStrategy,
) -> Vec<String> {
    let value = match strategy {
        DurationStrategy::Binary => note.value.to_binary(),
        DurationStrategy::Duration => {
            if note.value == NoteValue::Continue {
                return Vec::new();
            }
            note.value
        }
    };
    let type_atom = format!("{}{}", TYPE_PREFIX, value.to_cell());

    match granularity {
        Granularity::Long => vec![
            format!("{}{}", NOTE_PREFIX, note.name()),
            format!("{}{}", OCTAVE_PREFIX, note.octave()),
            type_atom,
            format!("{}{}", INSTRUMENT_PREFIX, note.instrument_index()),
        ],
        Granularity::Short => vec![
            format!("{}{}", NOTE_PREFIX, note.name_with_octave()),
            type_atom,
        ],
    }
}

fn chord_atoms(chord: &Chord, config: &CodecConfig) -> Vec<String> {
    chord
        .iter()
        .flat_map(|note| note_atoms(note, config.granularity, config.strategy))
        .collect()
}

/// Encode a chord sequence using the strategy and granularity in `config`.
pub fn encode(chords: &[Chord], config: &CodecConfig) -> EncodedSequence {
    let atoms = match config.strategy {
        DurationStrategy::Binary => encode_binary(chords, config),
        DurationStrategy::Duration => encode_duration(chords, config),
    };
    EncodedSequence { atoms }
}

/// Every step is terminated by a separator; measure markers go in front of
/// each step that starts a new measure. A zero `measure_steps` emits none.
fn encode_binary(chords: &[Chord], config: &CodecConfig) -> Vec<String> {
    let mut atoms = Vec::new();
    for (idx, chord) in chords.iter().enumerate() {
        if config.separate_measures
            && config.measure_steps > 0
            && idx > 0
            && idx % config.measure_steps == 0
        {
            atoms.push(MEASURE_END.to_string());
            if idx < chords.len() - 1 {
                atoms.push(MEASURE_START.to_string());
            }
        }
        atoms.extend(chord_atoms(chord, config));
        atoms.push(TIME_SEP.to_string());
    }
    atoms
}

/// Steps that emit nothing accumulate into a wait count; each step that
/// emits notes is written as separator, wait count, note atoms.
fn encode_duration(chords: &[Chord], config: &CodecConfig) -> Vec<String> {
    let mut atoms = Vec::new();
    let mut wait_count = 0usize;
    for chord in chords {
        let step_atoms = chord_atoms(chord, config);
        if step_atoms.is_empty() {
            wait_count += 1;
            continue;
        }
        atoms.push(TIME_SEP.to_string());
        atoms.push(format!("{}{}", TYPE_PREFIX, wait_count));
        atoms.extend(step_atoms);
        wait_count = 0;
    }
    atoms
}
