//! Dissimilarity between a realization window and a candidate window
//!
//! Distances are normalized to `[0, 1]`: `0` means the candidate agrees with
//! every constrained cell of the current window and `1` means it agrees with
//! none. Any scoring function with the same signature can be plugged into the
//! sampler through [`WindowDistance`].

use crate::spatial::grid::is_missing;
use ndarray::ArrayView2;
use num_traits::Float;

/// Scoring seam between the sampler and a distance metric
///
/// Implemented for every function or closure taking the current window and a
/// candidate window of the same shape.
pub trait WindowDistance<F> {
    /// Score a candidate against the current window, lower is closer
    fn distance(&self, current: ArrayView2<'_, F>, candidate: ArrayView2<'_, F>) -> f64;
}

impl<F, T> WindowDistance<F> for T
where
    T: Fn(ArrayView2<'_, F>, ArrayView2<'_, F>) -> f64,
{
    fn distance(&self, current: ArrayView2<'_, F>, candidate: ArrayView2<'_, F>) -> f64 {
        self(current, candidate)
    }
}

/// Function pointer form of a distance metric, the sampler's default
pub type DistanceFn<F> = fn(ArrayView2<'_, F>, ArrayView2<'_, F>) -> f64;

/// Jointly observed cells of two windows split by agreement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementCounts {
    /// Cells observed in both windows with equal values
    pub in_common: usize,
    /// Cells observed in both windows with different values
    pub different: usize,
}

impl AgreementCounts {
    /// Number of cells observed in both windows
    pub const fn jointly_observed(&self) -> usize {
        self.in_common + self.different
    }
}

/// Count agreement over the cells observed in both windows
pub fn agreement_counts<F: Float>(x: ArrayView2<'_, F>, y: ArrayView2<'_, F>) -> AgreementCounts {
    debug_assert_eq!(x.dim(), y.dim(), "windows must share a shape");

    x.iter()
        .zip(y.iter())
        .filter(|&(&a, &b)| !is_missing(a) && !is_missing(b))
        .fold(AgreementCounts::default(), |mut counts, (a, b)| {
            if a == b {
                counts.in_common += 1;
            } else {
                counts.different += 1;
            }
            counts
        })
}

/// Fraction of jointly observed cells on which two windows disagree
///
/// Returns `0.0` when `x` is entirely missing, since an unconstrained window
/// matches anything. When the windows share no observed cell while `x` has
/// some, the score is `1.0` instead of a division by zero.
pub fn nandiff<F: Float>(x: ArrayView2<'_, F>, y: ArrayView2<'_, F>) -> f64 {
    if x.iter().all(|&v| is_missing(v)) {
        return 0.0;
    }

    let counts = agreement_counts(x, y);
    let total = counts.jointly_observed();
    if total == 0 {
        return 1.0;
    }

    1.0 - counts.in_common as f64 / total as f64
}
