//! # Error Types
//!
//! This module defines all error types for the scoretok codec.
//!
//! ## Error Types
//! - `InvalidDuration` - A note token was built with a zero or out-of-range duration
//! - `PitchOutOfRange` - A note event pitch does not fit the configured pitch range
//! - `NegativeOffset` - A note event starts before time zero
//! - `TooManyInstruments` - More distinct instruments than the config allows
//! - `ParseError` - A token group could not be turned into a note
//! - `ConfigError` - Invalid YAML configuration
//! - `ShapeError` - A persisted array does not match the expected shape
//! - `Io` / `Json` - Persistence failures
//!
//! ## Usage
//! ```rust
//! use scoretok::{encode_events, CodecConfig, CodecError, NoteEvent};
//!
//! let events = vec![NoteEvent::new(200, 0.0, 1.0, None)];
//! match encode_events(&events, &CodecConfig::default()) {
//!     Ok(tokens) => println!("{}", tokens),
//!     Err(CodecError::PitchOutOfRange { pitch, range }) => {
//!         eprintln!("pitch {} does not fit in 0..{}", pitch, range);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    /// Note token duration error.
    ///
    /// Zero-length notes are rejected at construction. The only negative
    /// values allowed are the onset (`-1`) and continuation (`-2`) sentinels.
    ///
    /// # Example
    /// ```
    /// # use scoretok::CodecError;
    /// let err = CodecError::InvalidDuration(0);
    /// assert_eq!(err.to_string(), "Invalid note duration: 0");
    /// ```
    #[error("Invalid note duration: {0}")]
    InvalidDuration(i32),

    /// Pitch does not fit in the configured pitch range.
    #[error("Pitch {pitch} is outside the pitch range 0..{range}")]
    PitchOutOfRange { pitch: u8, range: usize },

    /// Note event starts before the first time step.
    #[error("Note event starts at negative step {0}")]
    NegativeOffset(i64),

    #[error("{count} instruments exceed the limit of {max}")]
    TooManyInstruments { count: usize, max: usize },

    /// Token parse error with the position of the offending atom.
    ///
    /// # Example
    /// ```
    /// # use scoretok::CodecError;
    /// let err = CodecError::ParseError {
    ///     position: 3,
    ///     message: "Missing note name".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Parse error at token 3: Missing note name");
    /// ```
    #[error("Parse error at token {position}: {message}")]
    ParseError { position: usize, message: String },

    /// Invalid configuration.
    ///
    /// # Example
    /// ```
    /// # use scoretok::CodecError;
    /// let err = CodecError::ConfigError("sample-freq must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid config: sample-freq must be positive");
    /// ```
    #[error("Invalid config: {0}")]
    ConfigError(String),

    #[error("Shape error: {0}")]
    ShapeError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
