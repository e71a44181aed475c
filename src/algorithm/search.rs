//! Greedy candidate search over random training image windows

use crate::algorithm::distance::WindowDistance;
use crate::spatial::grid::window_view;
use ndarray::ArrayView2;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Outcome of a candidate search at one site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMatch {
    /// Training image site the accepted window was taken from
    pub position: [usize; 2],
    /// Distance between the accepted window and the current window
    pub distance: f64,
    /// Number of candidates drawn, including the accepted one
    pub tries: usize,
    /// Whether the search stopped because the distance beat the threshold
    pub early_accept: bool,
}

/// Bounded random search for a training image window matching a site
///
/// Draws candidates uniformly from a pool of training image sites. The first
/// candidate scoring strictly below the threshold is accepted at once;
/// otherwise the lowest-scoring candidate seen within `max_tries` draws wins.
pub struct CandidateSearch<'s, F, D> {
    training_image: ArrayView2<'s, F>,
    pool: &'s [[usize; 2]],
    radius: usize,
    threshold: f64,
    max_tries: usize,
    distance: &'s D,
}

impl<'s, F, D> CandidateSearch<'s, F, D>
where
    D: WindowDistance<F>,
{
    /// Create a search over the given candidate pool
    pub const fn new(
        training_image: ArrayView2<'s, F>,
        pool: &'s [[usize; 2]],
        radius: usize,
        threshold: f64,
        max_tries: usize,
        distance: &'s D,
    ) -> Self {
        Self {
            training_image,
            pool,
            radius,
            threshold,
            max_tries,
            distance,
        }
    }

    /// Find a candidate for the given current window
    ///
    /// Returns `None` only when the pool is empty or `max_tries` is zero.
    pub fn search<R: Rng + ?Sized>(
        &self,
        current: ArrayView2<'_, F>,
        rng: &mut R,
    ) -> Option<CandidateMatch> {
        let mut best: Option<CandidateMatch> = None;

        for tries in 1..=self.max_tries {
            let &position = self.pool.choose(rng)?;
            let candidate = window_view(self.training_image.view(), position, self.radius);
            let distance = self.distance.distance(current.view(), candidate);

            if distance < self.threshold {
                return Some(CandidateMatch {
                    position,
                    distance,
                    tries,
                    early_accept: true,
                });
            }

            // The first draw always counts, even at the maximal distance
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(CandidateMatch {
                    position,
                    distance,
                    tries,
                    early_accept: false,
                });
            }
        }

        best.map(|b| CandidateMatch {
            tries: self.max_tries,
            ..b
        })
    }
}
