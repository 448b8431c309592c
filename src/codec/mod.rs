//! # Token Codec
//!
//! Serialize per-step chords into the space-delimited token string consumed by
//! the sequence model, and parse such strings back into chords.
//!
//! ## Sub-modules
//! - `encoder` - Chords to atoms, binary or duration strategy
//! - `decoder` - Atoms to chords, with per-note error recovery
//!
//! ## Atoms
//! - `||` - time-step separator
//! - `|s|` / `|e|` - measure start/end (binary mode, optional)
//! - `nX` - note name: `nC#` (long) or `nC#4` (short, octave fused)
//! - `oX` - octave, long form only
//! - `tX` - type: `-1` onset, `-2` continuation, `n > 0` explicit length.
//!   In duration mode the atom right after a separator is the wait count.
//! - `iX` - instrument index, long form only
//!
//! ## Example
//! ```rust
//! use scoretok::codec::{decode, encode};
//! use scoretok::{build_chord_array, project, CodecConfig, NoteEvent};
//!
//! let config = CodecConfig::default();
//! let events = vec![NoteEvent::new(60, 0.0, 1.0, None)];
//! let chords = project(&build_chord_array(&events, &config)?)?;
//!
//! let tokens = encode(&chords, &config).to_string();
//! assert_eq!(tokens, "nC o4 t-1 i0 || nC o4 t-2 i0 || nC o4 t-2 i0 || nC o4 t-2 i0 ||");
//!
//! let decoded = decode(&tokens, &config);
//! assert_eq!(decoded.chords.len(), 4);
//! assert!(decoded.report.is_clean());
//! # Ok::<(), scoretok::CodecError>(())
//! ```

mod decoder;
mod encoder;


pub use decoder::{
    decode, parse_note_group, DecodeReport, Decoded, NoteParse, NoteParseError, SkippedNote,
};
pub use encoder::{encode, note_atoms, EncodedSequence};

/// Time-step separator
pub const TIME_SEP: &str = "||";
/// Measure start marker
pub const MEASURE_START: &str = "|s|";
/// Measure end marker
pub const MEASURE_END: &str = "|e|";

/// Note name prefix
pub const NOTE_PREFIX: char = 'n';
/// Octave prefix
pub const OCTAVE_PREFIX: char = 'o';
/// Type prefix (onset/continuation/length, or wait count)
pub const TYPE_PREFIX: char = 't';
/// Instrument prefix
pub const INSTRUMENT_PREFIX: char = 'i';
