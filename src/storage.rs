//! Sparse on-disk form of a chord array.
//!
//! The array is flattened to a `[step][instrument * pitch]` matrix and only
//! its nonzero cells are written, as `(row, col, value)` triples in JSON.
//! Loading reshapes back to 3-D using the configured pitch range.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::chord_array::ChordArray;
use crate::config::CodecConfig;
use crate::error::CodecError;

/// Coordinate-list form of the flattened chord array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseChordArray {
    pub rows: usize,
    pub cols: usize,
    pub entries: Vec<(usize, usize, i32)>,
}

pub fn to_sparse(arr: &ChordArray) -> SparseChordArray {
    let pitch_range = arr.pitch_range();
    let entries = arr
        .view()
        .indexed_iter()
        .filter(|(_, value)| **value != 0)
        .map(|((step, instrument, pitch), &value)| (step, instrument * pitch_range + pitch, value))
        .collect();
    SparseChordArray {
        rows: arr.steps(),
        cols: arr.instruments() * pitch_range,
        entries,
    }
}

pub fn from_sparse(
    sparse: &SparseChordArray,
    pitch_range: usize,
) -> Result<ChordArray, CodecError> {
    if pitch_range == 0 || sparse.cols % pitch_range != 0 {
        return Err(CodecError::ShapeError(format!(
            "{} columns is not a multiple of the pitch range {}",
            sparse.cols, pitch_range
        )));
    }
    let cells = sparse
        .rows
        .checked_mul(sparse.cols)
        .and_then(|cells| cells.checked_mul(std::mem::size_of::<i32>()))
        .filter(|&bytes| bytes <= isize::MAX as usize);
    if cells.is_none() {
        return Err(CodecError::ShapeError(format!(
            "a {}x{} matrix is too large",
            sparse.rows, sparse.cols
        )));
    }
    let instruments = sparse.cols / pitch_range;

    let mut data = Array3::zeros((sparse.rows, instruments, pitch_range));
    for &(row, col, value) in &sparse.entries {
        if row >= sparse.rows || col >= sparse.cols {
            return Err(CodecError::ShapeError(format!(
                "entry ({}, {}) outside a {}x{} matrix",
                row, col, sparse.rows, sparse.cols
            )));
        }
        data[[row, col / pitch_range, col % pitch_range]] = value;
    }
    Ok(ChordArray::from_array(data))
}

/// Write `arr` to `path`. The array must not be mutated while this runs.
pub fn save_chord_array(path: impl AsRef<Path>, arr: &ChordArray) -> Result<(), CodecError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &to_sparse(arr))?;
    writer.flush()?;
    Ok(())
}

pub fn load_chord_array(
    path: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<ChordArray, CodecError> {
    let reader = BufReader::new(File::open(path)?);
    let sparse: SparseChordArray = serde_json::from_reader(reader)?;
    let arr = from_sparse(&sparse, config.pitch_range)?;
    if arr.instruments() > config.max_instruments {
        return Err(CodecError::TooManyInstruments {
            count: arr.instruments(),
            max: config.max_instruments,
        });
    }
    Ok(arr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{VAL_CONT, VAL_START};

    fn sample() -> ChordArray {
        let mut arr = ChordArray::zeros(3, 2, 127);
        arr.set(0, 0, 60, VAL_START);
        arr.set(1, 0, 60, VAL_CONT);
        arr.set(2, 1, 126, 4);
        arr
    }

    #[test]
    fn test_sparse_layout() {
        let sparse = to_sparse(&sample());
        assert_eq!(sparse.rows, 3);
        assert_eq!(sparse.cols, 254);
        assert_eq!(
            sparse.entries,
            vec![(0, 60, VAL_START), (1, 60, VAL_CONT), (2, 127 + 126, 4)]
        );
    }

    #[test]
    fn test_sparse_restores_array() {
        let arr = sample();
        assert_eq!(from_sparse(&to_sparse(&arr), 127).unwrap(), arr);
    }

    #[test]
    fn test_bad_column_count() {
        let sparse = SparseChordArray { rows: 1, cols: 200, entries: vec![] };
        assert!(matches!(from_sparse(&sparse, 127), Err(CodecError::ShapeError(_))));
    }

    #[test]
    fn test_entry_out_of_bounds() {
        let sparse = SparseChordArray { rows: 1, cols: 127, entries: vec![(1, 0, 1)] };
        assert!(matches!(from_sparse(&sparse, 127), Err(CodecError::ShapeError(_))));
    }

    #[test]
    fn test_oversized_shape_rejected() {
        for (rows, cols) in [(usize::MAX, 127), (1 << 40, 1 << 30)] {
            let sparse = SparseChordArray { rows, cols, entries: vec![] };
            assert!(matches!(from_sparse(&sparse, 127), Err(CodecError::ShapeError(_))));
        }
    }

    #[test]
    fn test_load_too_many_instruments() {
        let path = std::env::temp_dir().join(format!(
            "scoretok-storage-wide-{}.json",
            std::process::id()
        ));
        save_chord_array(&path, &sample()).unwrap();
        let config = CodecConfig {
            max_instruments: 1,
            ..CodecConfig::default()
        };
        let result = load_chord_array(&path, &config);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(CodecError::TooManyInstruments { count: 2, max: 1 })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "scoretok-storage-{}.json",
            std::process::id()
        ));
        let arr = sample();
        save_chord_array(&path, &arr).unwrap();
        let loaded = load_chord_array(&path, &CodecConfig::default()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, arr);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("scoretok-does-not-exist.json");
        assert!(matches!(
            load_chord_array(&path, &CodecConfig::default()),
            Err(CodecError::Io(_))
        ));
    }
}
