//! # Array Reconstruction
//!
//! Turn decoded chords back into a [`ChordArray`], then into a [`Performance`]
//! that the renderer consumes.
//!
//! ## Note Lengths
//! - **Duration mode**: the onset cell holds the length in steps
//! - **Binary mode**: the length is `1 + ` the number of `VAL_CONT` cells
//!   directly after the onset in the same column, recovered with
//!   [`continuation_runs()`]
//!
//! ## Example
//! ```rust
//! use scoretok::{array_to_performance, CodecConfig, ChordArray, VAL_CONT, VAL_START};
//!
//! let mut arr = ChordArray::zeros(3, 1, 127);
//! arr.set(0, 0, 60, VAL_START);
//! arr.set(1, 0, 60, VAL_CONT);
//! arr.set(2, 0, 60, VAL_CONT);
//!
//! let performance = array_to_performance(&arr, &CodecConfig::default());
//! let chord = &performance.parts[0].chords[0];
//! assert_eq!(chord.step, 0);
//! assert_eq!(chord.notes[0].steps, 3);
//! ```

use ndarray::{Array1, ArrayView1};
use serde::Serialize;

use crate::chord_array::{Chord, ChordArray};
use crate::config::{CodecConfig, DurationStrategy};
use crate::note::{NoteEvent, NoteValue, VAL_CONT};

/// A note with its recovered length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformedNote {
    pub pitch: u8,
    pub steps: u32,
}

/// Onsets that start on the same step in one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoundingChord {
    pub step: usize,
    pub notes: Vec<PerformedNote>,
}

/// All chords of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub instrument: usize,
    pub chords: Vec<SoundingChord>,
}

/// What the performance renderer receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    /// Length of one step in quarter notes
    pub quantum: f64,
    pub parts: Vec<Part>,
}

impl Performance {
    /// Flatten into note events, in part order then step order.
    ///
    /// The instrument identifier is the part's index.
    pub fn note_events(&self) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        for part in &self.parts {
            let instrument = part.instrument.to_string();
            for chord in &part.chords {
                for note in &chord.notes {
                    events.push(NoteEvent {
                        pitch: note.pitch,
                        start: chord.step as f64 * self.quantum,
                        duration: note.steps as f64 * self.quantum,
                        instrument: Some(instrument.clone()),
                    });
                }
            }
        }
        events
    }
}

/// Copy decoded chords into a zero-initialized array.
///
/// The instrument axis is sized by the largest instrument index seen; chords
/// without any instrument tags give a single instrument. Notes whose index is
/// not below `config.max_instruments` are dropped.
pub fn chords_to_array(chords: &[Chord], config: &CodecConfig) -> ChordArray {
    let instruments = chords
        .iter()
        .flatten()
        .map(|note| note.instrument_index())
        .filter(|&index| index < config.max_instruments)
        .max()
        .and_then(|max| max.checked_add(1))
        .unwrap_or(1);

    let mut arr = ChordArray::zeros(chords.len(), instruments, config.pitch_range);
    for (step, chord) in chords.iter().enumerate() {
        for note in chord {
            if note.pitch as usize >= config.pitch_range {
                log::warn!("Dropping pitch {} outside pitch range", note.pitch);
                continue;
            }
            if note.instrument_index() >= instruments {
                log::warn!("Dropping note on instrument {}", note.instrument_index());
                continue;
            }
            arr.set(step, note.instrument_index(), note.pitch as usize, note.value.to_cell());
        }
    }
    arr
}

/// For every step, how many consecutive `VAL_CONT` cells start there.
///
/// A right-to-left fold over one column: a continuation extends the run that
/// follows it, anything else ends it.
///
/// ```rust
/// use ndarray::array;
/// use scoretok::continuation_runs;
///
/// let column = array![-1, -2, -2, 0, -2, -1];
/// assert_eq!(continuation_runs(column.view()), array![0, 2, 1, 0, 1, 0]);
/// ```
pub fn continuation_runs(column: ArrayView1<'_, i32>) -> Array1<u32> {
    let mut runs = Array1::zeros(column.len());
    let mut next = 0u32;
    for (step, &value) in column.iter().enumerate().rev() {
        next = if value == VAL_CONT { next + 1 } else { 0 };
        runs[step] = next;
    }
    runs
}

fn is_onset(value: i32) -> bool {
    NoteValue::from_cell(value).is_ok_and(NoteValue::is_onset)
}

/// Recover note lengths and group onsets into per-instrument chords.
pub fn array_to_performance(arr: &ChordArray, config: &CodecConfig) -> Performance {
    let steps = arr.steps();
    let mut parts = Vec::with_capacity(arr.instruments());

    for instrument in 0..arr.instruments() {
        // Per-pitch continuation runs, only needed where a length is inferred.
        let runs: Vec<Array1<u32>> = (0..arr.pitch_range())
            .map(|pitch| continuation_runs(arr.column(instrument, pitch)))
            .collect();

        let mut chords = Vec::new();
        for step in 0..steps {
            let mut notes = Vec::new();
            for pitch in 0..arr.pitch_range() {
                let value = arr.get(step, instrument, pitch);
                if !is_onset(value) {
                    continue;
                }
                let length = match config.strategy {
                    DurationStrategy::Duration if value > 0 => value as u32,
                    _ => {
                        let held = if step + 1 < steps { runs[pitch][step + 1] } else { 0 };
                        held + 1
                    }
                };
                notes.push(PerformedNote {
                    pitch: pitch as u8,
                    steps: length,
                });
            }
            if !notes.is_empty() {
                chords.push(SoundingChord { step, notes });
            }
        }
        parts.push(Part { instrument, chords });
    }

    Performance {
        quantum: config.quantum(),
        parts,
    }
}
