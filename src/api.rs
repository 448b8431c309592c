//! # Public API
//!
//! End-to-end entry points for both directions of the codec.
//!
//! ## Encode Direction
//! note events → [`build_chord_array()`] → optional rest transforms →
//! [`project()`] → [`encode()`] → token string
//!
//! ## Decode Direction
//! token string → [`decode()`] → [`chords_to_array()`] →
//! [`array_to_performance()`] → note events
//!
//! ## Typical Usage
//!
//! ```rust
//! use scoretok::{decode_to_events, encode_events, CodecConfig, NoteEvent};
//!
//! let config = CodecConfig::default();
//! let events = vec![
//!     NoteEvent::new(60, 0.0, 1.0, Some("piano")),
//!     NoteEvent::new(64, 0.0, 0.5, Some("piano")),
//! ];
//!
//! let tokens = encode_events(&events, &config)?;
//! let decoded = decode_to_events(&tokens, &config);
//!
//! assert_eq!(decoded.len(), 2);
//! assert_eq!(decoded[1].pitch, 64);
//! assert_eq!(decoded[1].duration, 0.5);
//! # Ok::<(), scoretok::CodecError>(())
//! ```
//!
//! [`build_chord_array()`]: crate::build_chord_array
//! [`project()`]: crate::project
//! [`encode()`]: crate::codec::encode
//! [`decode()`]: crate::codec::decode
//! [`chords_to_array()`]: crate::chords_to_array
//! [`array_to_performance()`]: crate::array_to_performance

use crate::chord_array::{build_chord_array, project, ChordArray};
use crate::codec::{decode, encode, DecodeReport};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::note::NoteEvent;
use crate::reconstruct::{array_to_performance, chords_to_array, Performance};
use crate::rests::{compress_rests, trim_rests};

/// Build the chord array and apply the rest transforms enabled in `config`.
///
/// Trimming runs before compression.
pub fn events_to_chord_array(
    events: &[NoteEvent],
    config: &CodecConfig,
) -> Result<ChordArray, CodecError> {
    config.validate()?;
    let mut arr = build_chord_array(events, config)?;
    if config.trim_rests {
        arr = trim_rests(&arr, config.trim_block);
    }
    if config.compress_rests {
        arr = compress_rests(&arr, config.max_rests);
    }
    Ok(arr)
}

/// Encode a chord array into the token string.
///
/// # Errors
/// - [`CodecError::ConfigError`] if `config` does not validate
/// - [`CodecError::InvalidDuration`] if a cell holds a value that is neither
///   silence, a positive length, nor one of the two sentinels
pub fn encode_chord_array(arr: &ChordArray, config: &CodecConfig) -> Result<String, CodecError> {
    config.validate()?;
    let chords = project(arr)?;
    Ok(encode(&chords, config).to_string())
}

/// Encode note events into the token string.
///
/// # Example
/// ```rust
/// use scoretok::{encode_events, CodecConfig, DurationStrategy, NoteEvent};
///
/// let config = CodecConfig {
///     strategy: DurationStrategy::Duration,
///     ..CodecConfig::default()
/// };
/// let events = vec![NoteEvent::new(60, 0.5, 1.0, None)];
/// assert_eq!(encode_events(&events, &config)?, "|| t2 nC o4 t4 i0");
/// # Ok::<(), scoretok::CodecError>(())
/// ```
pub fn encode_events(events: &[NoteEvent], config: &CodecConfig) -> Result<String, CodecError> {
    let arr = events_to_chord_array(events, config)?;
    encode_chord_array(&arr, config)
}

/// Decode a token string into a chord array, reporting dropped notes.
pub fn decode_to_chord_array(text: &str, config: &CodecConfig) -> (ChordArray, DecodeReport) {
    let decoded = decode(text, config);
    (chords_to_array(&decoded.chords, config), decoded.report)
}

/// Decode a token string into the structure handed to the renderer.
pub fn decode_to_performance(text: &str, config: &CodecConfig) -> Performance {
    let (arr, _) = decode_to_chord_array(text, config);
    array_to_performance(&arr, config)
}

/// Decode a token string into note events.
///
/// Unparsable notes are dropped; use [`decode_to_chord_array()`] to see which.
pub fn decode_to_events(text: &str, config: &CodecConfig) -> Vec<NoteEvent> {
    decode_to_performance(text, config).note_events()
}
