//! # Codec Configuration
//!
//! Every entry point takes a [`CodecConfig`] instead of reading module-level
//! constants, so a given encode/decode run is reproducible from its config alone.
//!
//! Configs can be written as YAML with kebab-case keys. Missing keys take
//! their defaults:
//!
//! ```rust
//! use scoretok::{CodecConfig, DurationStrategy, Granularity};
//!
//! let config = CodecConfig::from_yaml(r#"
//! sample-freq: 8
//! strategy: duration
//! granularity: short
//! "#)?;
//!
//! assert_eq!(config.sample_freq, 8);
//! assert_eq!(config.strategy, DurationStrategy::Duration);
//! assert_eq!(config.granularity, Granularity::Short);
//! assert_eq!(config.pitch_range, 127);
//! # Ok::<(), scoretok::CodecError>(())
//! ```

use serde::Deserialize;

use crate::error::CodecError;

/// Number of pitches in the chord array (MIDI 0-126).
pub const DEFAULT_PITCH_RANGE: usize = 127;

/// Time steps per quarter note.
pub const DEFAULT_SAMPLE_FREQ: u32 = 4;

/// Longest wait count the decoder expands.
pub const DEFAULT_MAX_WAIT_STEPS: usize = 4096;

/// Most instruments an array may hold.
pub const DEFAULT_MAX_INSTRUMENTS: usize = 128;

/// Opaque sequence-start marker of the downstream text-model vocabulary.
pub const DEFAULT_SEQUENCE_START: &str = "xxbos";

/// How many atoms each note produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Note name, octave, type and instrument atoms (`nC o4 t-1 i0`)
    #[default]
    Long,
    /// Fused note+octave and type atoms, no instrument (`nC4 t-1`)
    Short,
}

/// How note length is carried in the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationStrategy {
    /// Onset/continuation per step, every step separator-terminated
    #[default]
    Binary,
    /// Explicit duration at the onset, silence collapsed into wait counts
    Duration,
}

/// Codec parameters shared by the builder, transforms, encoder and decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    pub pitch_range: usize,
    pub sample_freq: u32,
    /// Block size that leading/trailing rest trimming is aligned to
    pub trim_block: usize,
    /// Rest-run length that compression caps at (plus the mod-4 remainder)
    pub max_rests: usize,
    /// Steps per measure when measure markers are emitted
    pub measure_steps: usize,
    pub separate_measures: bool,
    pub granularity: Granularity,
    pub strategy: DurationStrategy,
    pub sequence_start_marker: String,
    pub trim_rests: bool,
    pub compress_rests: bool,
    /// Decoded wait counts above this are reported and not expanded
    pub max_wait_steps: usize,
    /// Instrument indices must stay below this
    pub max_instruments: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            pitch_range: DEFAULT_PITCH_RANGE,
            sample_freq: DEFAULT_SAMPLE_FREQ,
            trim_block: 16,
            max_rests: 32,
            measure_steps: 4,
            separate_measures: false,
            granularity: Granularity::Long,
            strategy: DurationStrategy::Binary,
            sequence_start_marker: DEFAULT_SEQUENCE_START.to_string(),
            trim_rests: false,
            compress_rests: false,
            max_wait_steps: DEFAULT_MAX_WAIT_STEPS,
            max_instruments: DEFAULT_MAX_INSTRUMENTS,
        }
    }
}

/// Raw config for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
    pub pitch_range: Option<usize>,
    pub sample_freq: Option<u32>,
    pub trim_block: Option<usize>,
    pub max_rests: Option<usize>,
    pub measure_steps: Option<usize>,
    pub separate_measures: Option<bool>,
    pub granularity: Option<Granularity>,
    pub strategy: Option<DurationStrategy>,
    pub sequence_start_marker: Option<String>,
    pub trim_rests: Option<bool>,
    pub compress_rests: Option<bool>,
    pub max_wait_steps: Option<usize>,
    pub max_instruments: Option<usize>,
}

impl CodecConfig {
    /// Parse a YAML config, filling in defaults and validating the result.
    pub fn from_yaml(content: &str) -> Result<Self, CodecError> {
        // An empty document deserializes to unit, not to an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| CodecError::ConfigError(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> Result<Self, CodecError> {
        let defaults = Self::default();
        let config = Self {
            pitch_range: raw.pitch_range.unwrap_or(defaults.pitch_range),
            sample_freq: raw.sample_freq.unwrap_or(defaults.sample_freq),
            trim_block: raw.trim_block.unwrap_or(defaults.trim_block),
            max_rests: raw.max_rests.unwrap_or(defaults.max_rests),
            measure_steps: raw.measure_steps.unwrap_or(defaults.measure_steps),
            separate_measures: raw.separate_measures.unwrap_or(defaults.separate_measures),
            granularity: raw.granularity.unwrap_or(defaults.granularity),
            strategy: raw.strategy.unwrap_or(defaults.strategy),
            sequence_start_marker: raw
                .sequence_start_marker
                .unwrap_or(defaults.sequence_start_marker),
            trim_rests: raw.trim_rests.unwrap_or(defaults.trim_rests),
            compress_rests: raw.compress_rests.unwrap_or(defaults.compress_rests),
            max_wait_steps: raw.max_wait_steps.unwrap_or(defaults.max_wait_steps),
            max_instruments: raw.max_instruments.unwrap_or(defaults.max_instruments),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every entry point relies on.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.pitch_range == 0 || self.pitch_range > DEFAULT_PITCH_RANGE {
            return Err(CodecError::ConfigError(format!(
                "pitch-range must be between 1 and {}, got {}",
                DEFAULT_PITCH_RANGE, self.pitch_range
            )));
        }
        if self.sample_freq == 0 {
            return Err(CodecError::ConfigError(
                "sample-freq must be positive".to_string(),
            ));
        }
        if self.trim_block == 0 {
            return Err(CodecError::ConfigError(
                "trim-block must be positive".to_string(),
            ));
        }
        if self.measure_steps == 0 {
            return Err(CodecError::ConfigError(
                "measure-steps must be positive".to_string(),
            ));
        }
        if self.max_instruments == 0 {
            return Err(CodecError::ConfigError(
                "max-instruments must be positive".to_string(),
            ));
        }
        if self.sequence_start_marker.trim().is_empty() {
            return Err(CodecError::ConfigError(
                "sequence-start-marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Length of one time step in quarter notes.
    pub fn quantum(&self) -> f64 {
        1.0 / self.sample_freq as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.pitch_range, 127);
        assert_eq!(config.sample_freq, 4);
        assert_eq!(config.trim_block, 16);
        assert_eq!(config.max_rests, 32);
        assert_eq!(config.measure_steps, 4);
        assert_eq!(config.strategy, DurationStrategy::Binary);
        assert_eq!(config.granularity, Granularity::Long);
        assert_eq!(config.quantum(), 0.25);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = CodecConfig::from_yaml("").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = CodecConfig::from_yaml("max-rests: 8\nseparate-measures: true\n").unwrap();
        assert_eq!(config.max_rests, 8);
        assert!(config.separate_measures);
        assert_eq!(config.trim_block, 16);
    }

    #[test]
    fn test_zero_sample_freq_rejected() {
        let result = CodecConfig::from_yaml("sample-freq: 0");
        match result {
            Err(CodecError::ConfigError(message)) => assert!(message.contains("sample-freq")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_pitch_range_too_large_rejected() {
        assert!(CodecConfig::from_yaml("pitch-range: 128").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(CodecConfig::from_yaml("tempo: 120").is_err());
    }

    #[test]
    fn test_decode_limits_from_yaml() {
        let config = CodecConfig::from_yaml("max-wait-steps: 64\nmax-instruments: 4\n").unwrap();
        assert_eq!(config.max_wait_steps, 64);
        assert_eq!(config.max_instruments, 4);
        assert!(CodecConfig::from_yaml("max-instruments: 0").is_err());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(CodecConfig::from_yaml("strategy: ternary").is_err());
    }
}
