//! Rest transforms applied to a built chord array before projection.
//!
//! Both are lossy and run before encoding; decoding never recovers the
//! original rest lengths.

use crate::chord_array::ChordArray;

/// Drop leading and trailing silent steps in whole multiples of `block`.
///
/// A song with 20 silent steps up front and `block = 16` loses 16 of them, so
/// what remains stays aligned to measure boundaries.
pub fn trim_rests(arr: &ChordArray, block: usize) -> ChordArray {
    let steps = arr.steps();
    let block = block.max(1);

    let leading = (0..steps).take_while(|&t| arr.is_silent_step(t)).count();
    let trailing = (0..steps).rev().take_while(|&t| arr.is_silent_step(t)).count();

    let start = leading - leading % block;
    let end = steps - (trailing - trailing % block);
    if start >= end {
        return arr.select_steps(&[]);
    }
    if start > 0 || end < steps {
        log::debug!("Trimming rests: keeping steps {}..{} of {}", start, end, steps);
    }

    let keep: Vec<usize> = (start..end).collect();
    arr.select_steps(&keep)
}

/// Length a silent run is kept at after compression.
///
/// Runs longer than `max_rests + 4` collapse to `run % 4 + max_rests`.
pub fn compressed_run(run: usize, max_rests: usize) -> usize {
    if run > max_rests + 4 {
        run % 4 + max_rests
    } else {
        run
    }
}

/// Cap every run of silent steps via [`compressed_run`].
///
/// Non-silent steps are copied through unchanged.
pub fn compress_rests(arr: &ChordArray, max_rests: usize) -> ChordArray {
    let mut keep: Vec<usize> = Vec::with_capacity(arr.steps());
    let mut run_start = 0;
    let mut run = 0;

    let flush = |keep: &mut Vec<usize>, run_start: usize, run: usize| {
        let kept = compressed_run(run, max_rests);
        if kept != run {
            log::debug!("Compressing rests: {} -> {}", run, kept);
        }
        keep.extend(run_start..run_start + kept);
    };

    for step in 0..arr.steps() {
        if arr.is_silent_step(step) {
            if run == 0 {
                run_start = step;
            }
            run += 1;
        } else {
            flush(&mut keep, run_start, run);
            run = 0;
            keep.push(step);
        }
    }
    flush(&mut keep, run_start, run);

    arr.select_steps(&keep)
}
