//! # Chord Array
//!
//! The dense state grid between note events and tokens, indexed
//! `[time step][instrument][pitch]`.
//!
//! ## Cell Values
//! - `0` - silence
//! - `n > 0` - note onset with an explicit length of `n` steps
//! - `VAL_START` (`-1`) - note onset, length given by the following continuations
//! - `VAL_CONT` (`-2`) - note held from an earlier onset in the same column
//!
//! ## Builder
//! [`build_chord_array()`] writes the raw length at each onset and `VAL_CONT`
//! on every following step the note covers. Overlapping notes in the same
//! cell are resolved last-writer-wins.
//!
//! ## Projection
//! [`project()`] turns every step into a [`Chord`]: the nonzero cells of
//! that step as [`NoteToken`]s, ordered by ascending pitch.

use ndarray::{s, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::note::{NoteEvent, NoteToken, VAL_CONT};

/// Notes active in one time step, ascending by pitch.
pub type Chord = Vec<NoteToken>;

/// Dense `[step][instrument][pitch]` grid of cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordArray {
    data: Array3<i32>,
}

impl ChordArray {
    pub fn zeros(steps: usize, instruments: usize, pitch_range: usize) -> Self {
        Self {
            data: Array3::zeros((steps, instruments, pitch_range)),
        }
    }

    pub fn from_array(data: Array3<i32>) -> Self {
        Self { data }
    }

    pub fn view(&self) -> ArrayView3<'_, i32> {
        self.data.view()
    }

    pub fn steps(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn instruments(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn pitch_range(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn get(&self, step: usize, instrument: usize, pitch: usize) -> i32 {
        self.data[[step, instrument, pitch]]
    }

    pub fn set(&mut self, step: usize, instrument: usize, pitch: usize, value: i32) {
        self.data[[step, instrument, pitch]] = value;
    }

    /// One time step as an `[instrument][pitch]` view.
    pub fn step(&self, step: usize) -> ArrayView2<'_, i32> {
        self.data.index_axis(Axis(0), step)
    }

    /// One `[instrument][pitch]` column across all steps.
    pub fn column(&self, instrument: usize, pitch: usize) -> ArrayView1<'_, i32> {
        self.data.slice(s![.., instrument, pitch])
    }

    pub fn is_silent_step(&self, step: usize) -> bool {
        self.step(step).iter().all(|&v| v == 0)
    }

    /// Copy the given steps, in order, into a new array.
    pub fn select_steps(&self, steps: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), steps),
        }
    }
}

/// Instrument identifiers in first-seen order; the position is the instrument index.
pub fn instrument_order(events: &[NoteEvent]) -> Vec<Option<String>> {
    let mut order: Vec<Option<String>> = Vec::new();
    for event in events {
        if !order.contains(&event.instrument) {
            order.push(event.instrument.clone());
        }
    }
    order
}

/// Quantize quarter-note time to steps.
///
/// Halves round to the even step.
fn quantize(quarters: f64, sample_freq: u32) -> i64 {
    (quarters * sample_freq as f64).round_ties_even() as i64
}

/// Build the chord array for a collection of note events.
///
/// The array has one step per quantized time slice up to the last sounding
/// step, one row per distinct instrument, and `config.pitch_range` pitches.
/// Notes whose length rounds to zero are skipped.
///
/// # Errors
/// - [`CodecError::PitchOutOfRange`] if a pitch does not fit the pitch range
/// - [`CodecError::NegativeOffset`] if a note starts before step 0
/// - [`CodecError::TooManyInstruments`] past `config.max_instruments`
///
/// # Example
/// ```rust
/// use scoretok::{build_chord_array, CodecConfig, NoteEvent, VAL_CONT};
///
/// let events = vec![NoteEvent::new(60, 0.0, 1.0, Some("piano"))];
/// let arr = build_chord_array(&events, &CodecConfig::default())?;
///
/// assert_eq!(arr.steps(), 4);
/// assert_eq!(arr.get(0, 0, 60), 4);
/// assert_eq!(arr.get(3, 0, 60), VAL_CONT);
/// # Ok::<(), scoretok::CodecError>(())
/// ```
pub fn build_chord_array(
    events: &[NoteEvent],
    config: &CodecConfig,
) -> Result<ChordArray, CodecError> {
    let instruments = instrument_order(events);
    if instruments.len() > config.max_instruments {
        return Err(CodecError::TooManyInstruments {
            count: instruments.len(),
            max: config.max_instruments,
        });
    }

    // (pitch, offset, length, instrument index)
    let mut notes: Vec<(usize, usize, usize, usize)> = Vec::with_capacity(events.len());
    for event in events {
        if event.pitch as usize >= config.pitch_range {
            return Err(CodecError::PitchOutOfRange {
                pitch: event.pitch,
                range: config.pitch_range,
            });
        }

        let offset = quantize(event.start, config.sample_freq);
        if offset < 0 {
            return Err(CodecError::NegativeOffset(offset));
        }
        let length = quantize(event.duration, config.sample_freq);
        if length <= 0 {
            log::debug!(
                "Skipping zero-length note: pitch {} at step {}",
                event.pitch,
                offset
            );
            continue;
        }

        let instrument = instruments
            .iter()
            .position(|id| *id == event.instrument)
            .unwrap_or(0);
        notes.push((event.pitch as usize, offset as usize, length as usize, instrument));
    }

    let steps = notes
        .iter()
        .map(|&(_, offset, length, _)| offset + length)
        .max()
        .unwrap_or(0);

    let mut arr = ChordArray::zeros(steps, instruments.len(), config.pitch_range);
    for (pitch, offset, length, instrument) in notes {
        arr.set(offset, instrument, pitch, length as i32);
        for step in offset + 1..offset + length {
            arr.set(step, instrument, pitch, VAL_CONT);
        }
    }
    Ok(arr)
}

/// Project one time step onto its chord.
pub fn project_step(arr: &ChordArray, step: usize) -> Result<Chord, CodecError> {
    let mut chord = Vec::new();
    for ((instrument, pitch), &value) in arr.step(step).indexed_iter() {
        if value == 0 {
            continue;
        }
        chord.push(NoteToken::new(pitch as u8, value, Some(instrument))?);
    }
    // Stable: equal pitches keep instrument order.
    chord.sort_by_key(|note| note.pitch);
    Ok(chord)
}

/// Project every time step onto its chord.
pub fn project(arr: &ChordArray) -> Result<Vec<Chord>, CodecError> {
    (0..arr.steps()).map(|step| project_step(arr, step)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{NoteValue, VAL_START};

    fn config() -> CodecConfig {
        CodecConfig::default()
    }

    #[test]
    fn test_single_note_layout() {
        let events = vec![NoteEvent::new(60, 0.0, 1.0, None)];
        let arr = build_chord_array(&events, &config()).unwrap();

        assert_eq!(arr.steps(), 4);
        assert_eq!(arr.instruments(), 1);
        assert_eq!(arr.pitch_range(), 127);
        assert_eq!(arr.get(0, 0, 60), 4);
        for step in 1..4 {
            assert_eq!(arr.get(step, 0, 60), VAL_CONT);
        }
        assert_eq!(arr.column(0, 61).iter().filter(|&&v| v != 0).count(), 0);
    }

    #[test]
    fn test_instruments_in_first_seen_order() {
        let events = vec![
            NoteEvent::new(60, 0.0, 0.25, Some("violin")),
            NoteEvent::new(48, 0.0, 0.25, Some("cello")),
            NoteEvent::new(62, 0.25, 0.25, Some("violin")),
        ];
        assert_eq!(
            instrument_order(&events),
            vec![Some("violin".to_string()), Some("cello".to_string())]
        );

        let arr = build_chord_array(&events, &config()).unwrap();
        assert_eq!(arr.instruments(), 2);
        assert_eq!(arr.get(0, 0, 60), 1);
        assert_eq!(arr.get(0, 1, 48), 1);
        assert_eq!(arr.get(1, 0, 62), 1);
    }

    #[test]
    fn test_zero_length_note_skipped() {
        let events = vec![
            NoteEvent::new(60, 0.0, 0.1, None), // rounds to 0 steps
            NoteEvent::new(64, 0.5, 0.25, None),
        ];
        let arr = build_chord_array(&events, &config()).unwrap();
        assert_eq!(arr.steps(), 3);
        assert_eq!(arr.get(0, 0, 60), 0);
        assert_eq!(arr.get(2, 0, 64), 1);
    }

    #[test]
    fn test_rounding_ties_to_even() {
        // 0.125 quarters * 4 = 0.5 steps -> 0, 0.375 * 4 = 1.5 -> 2
        let events = vec![NoteEvent::new(60, 0.125, 0.375, None)];
        let arr = build_chord_array(&events, &config()).unwrap();
        assert_eq!(arr.get(0, 0, 60), 2);
        assert_eq!(arr.get(1, 0, 60), VAL_CONT);
    }

    #[test]
    fn test_last_writer_wins() {
        let events = vec![
            NoteEvent::new(60, 0.0, 1.0, None),
            NoteEvent::new(60, 0.5, 0.5, None),
        ];
        let arr = build_chord_array(&events, &config()).unwrap();
        assert_eq!(arr.get(0, 0, 60), 4);
        assert_eq!(arr.get(1, 0, 60), VAL_CONT);
        assert_eq!(arr.get(2, 0, 60), 2);
        assert_eq!(arr.get(3, 0, 60), VAL_CONT);
    }

    #[test]
    fn test_pitch_out_of_range_rejected() {
        let events = vec![NoteEvent::new(127, 0.0, 1.0, None)];
        match build_chord_array(&events, &config()) {
            Err(CodecError::PitchOutOfRange { pitch: 127, range: 127 }) => {}
            other => panic!("Expected PitchOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_offset_rejected() {
        let events = vec![NoteEvent::new(60, -1.0, 1.0, None)];
        assert!(matches!(
            build_chord_array(&events, &config()),
            Err(CodecError::NegativeOffset(-4))
        ));
    }

    #[test]
    fn test_too_many_instruments_rejected() {
        let config = CodecConfig {
            max_instruments: 2,
            ..CodecConfig::default()
        };
        let events: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|name| NoteEvent::new(60, 0.0, 1.0, Some(*name)))
            .collect();
        assert!(matches!(
            build_chord_array(&events, &config),
            Err(CodecError::TooManyInstruments { count: 3, max: 2 })
        ));
        assert!(build_chord_array(&events[..2], &config).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let arr = build_chord_array(&[], &config()).unwrap();
        assert_eq!(arr.steps(), 0);
        assert!(project(&arr).unwrap().is_empty());
    }

    #[test]
    fn test_projection_sorted_by_pitch() {
        let events = vec![
            NoteEvent::new(67, 0.0, 0.25, Some("a")),
            NoteEvent::new(60, 0.0, 0.25, Some("b")),
            NoteEvent::new(64, 0.0, 0.25, Some("a")),
        ];
        let arr = build_chord_array(&events, &config()).unwrap();
        let chords = project(&arr).unwrap();
        let pitches: Vec<u8> = chords[0].iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
        assert_eq!(chords[0][0].instrument, Some(1));
    }

    #[test]
    fn test_projection_ties_keep_instrument_order() {
        let events = vec![
            NoteEvent::new(60, 0.0, 0.25, Some("a")),
            NoteEvent::new(60, 0.0, 0.25, Some("b")),
        ];
        let arr = build_chord_array(&events, &config()).unwrap();
        let chord = project_step(&arr, 0).unwrap();
        let instruments: Vec<_> = chord.iter().map(|n| n.instrument).collect();
        assert_eq!(instruments, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_projection_values() {
        let mut arr = ChordArray::zeros(2, 1, 127);
        arr.set(0, 0, 60, VAL_START);
        arr.set(1, 0, 60, VAL_CONT);
        let chords = project(&arr).unwrap();
        assert_eq!(chords[0][0].value, NoteValue::Start);
        assert_eq!(chords[1][0].value, NoteValue::Continue);
    }

    #[test]
    fn test_projection_rejects_corrupt_cell() {
        let mut arr = ChordArray::zeros(1, 1, 127);
        arr.set(0, 0, 60, -7);
        assert!(project(&arr).is_err());
    }

    #[test]
    fn test_select_steps() {
        let mut arr = ChordArray::zeros(3, 1, 127);
        arr.set(2, 0, 10, 1);
        let picked = arr.select_steps(&[2, 0]);
        assert_eq!(picked.steps(), 2);
        assert_eq!(picked.get(0, 0, 10), 1);
        assert!(picked.is_silent_step(1));
    }
}
