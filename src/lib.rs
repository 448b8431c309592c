pub mod api;
pub mod chord_array;
pub mod codec;
pub mod config;
pub mod error;
pub mod note;
pub mod reconstruct;
pub mod rests;
pub mod storage;

pub use api::*;
pub use chord_array::{
    build_chord_array, instrument_order, project, project_step, Chord, ChordArray,
};
pub use codec::{decode, encode, Decoded, DecodeReport, EncodedSequence};
pub use config::{CodecConfig, DurationStrategy, Granularity};
pub use error::*;
pub use note::{NoteEvent, NoteToken, NoteValue, VAL_CONT, VAL_START};
pub use reconstruct::{
    array_to_performance, chords_to_array, continuation_runs, Part, Performance, PerformedNote,
    SoundingChord,
};
pub use rests::{compress_rests, trim_rests};
pub use storage::{load_chord_array, save_chord_array};
