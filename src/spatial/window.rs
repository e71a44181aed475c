//! Merge rule applied when a candidate window is pasted into the realization

use ndarray::{ArrayView2, ArrayViewMut2, Zip};
use num_traits::Float;

/// Whether a candidate value must never be pasted
pub fn is_no_update<F: Float>(value: F, no_update_bands: &[F]) -> bool {
    no_update_bands.contains(&value)
}

/// Paste a candidate window into the realization window in place
///
/// A cell keeps its current value (which may be missing) when it was observed
/// in the training image or when the candidate value is a no-update band.
/// Every other cell takes the candidate value. Returns the number of cells
/// whose value was taken from the candidate.
///
/// # Panics
///
/// Panics if the three windows differ in shape.
pub fn merge_window<F: Float>(
    mut current: ArrayViewMut2<'_, F>,
    candidate: ArrayView2<'_, F>,
    observed: ArrayView2<'_, bool>,
    no_update_bands: &[F],
) -> usize {
    let mut written = 0;
    Zip::from(&mut current)
        .and(&candidate)
        .and(&observed)
        .for_each(|cell, &value, &is_observed| {
            if !is_observed && !is_no_update(value, no_update_bands) {
                *cell = value;
                written += 1;
            }
        });
    written
}
