//! Grid model for direct sampling
//!
//! Grids are plain `ndarray` matrices whose missing cells hold NaN. A window
//! is the `2 * radius` square whose top-left corner sits `radius` cells above
//! and left of its site, so sites are restricted to positions where the whole
//! window fits inside the grid.

use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, Slice};
use num_traits::Float;
use std::ops::Range;

/// A 2D grid of cell values where NaN marks a missing cell
pub type Grid<F = f64> = Array2<F>;

/// Create a grid with every cell missing
pub fn missing_grid<F: Float>(shape: (usize, usize)) -> Grid<F> {
    Array2::from_elem(shape, F::nan())
}

/// Whether a cell value is the missing marker
pub fn is_missing<F: Float>(value: F) -> bool {
    value.is_nan()
}

/// Count the missing cells of a grid
pub fn missing_count<F: Float>(grid: ArrayView2<'_, F>) -> usize {
    grid.iter().filter(|&&v| is_missing(v)).count()
}

/// Valid site coordinates along one axis
///
/// A site `p` is valid when `p - radius >= 0` and `p + radius <= extent`.
/// Returns an empty range when the axis is shorter than one window.
pub const fn site_range(extent: usize, radius: usize) -> Range<usize> {
    if extent < 2 * radius {
        0..0
    } else {
        radius..extent - radius + 1
    }
}

/// Every site of a grid with the given shape
pub fn interior_sites(shape: (usize, usize), radius: usize) -> Vec<[usize; 2]> {
    let rows = site_range(shape.0, radius);
    let cols = site_range(shape.1, radius);

    let mut sites = Vec::with_capacity(rows.len() * cols.len());
    for row in rows {
        for col in cols.clone() {
            sites.push([row, col]);
        }
    }
    sites
}

/// Sites whose own cell is missing
pub fn missing_sites<F: Float>(grid: ArrayView2<'_, F>, radius: usize) -> Vec<[usize; 2]> {
    interior_sites(grid.dim(), radius)
        .into_iter()
        .filter(|&[row, col]| grid.get((row, col)).is_some_and(|&v| is_missing(v)))
        .collect()
}

/// Sites whose window contains no missing cell
///
/// Uses a summed-area table of missing cells so each window costs four lookups.
pub fn complete_sites<F: Float>(grid: ArrayView2<'_, F>, radius: usize) -> Vec<[usize; 2]> {
    let (rows, cols) = grid.dim();
    let mut table = Array2::<usize>::zeros((rows + 1, cols + 1));

    for row in 0..rows {
        let mut running = 0;
        for col in 0..cols {
            if grid.get((row, col)).is_some_and(|&v| is_missing(v)) {
                running += 1;
            }
            let above = table.get((row, col + 1)).copied().unwrap_or(0);
            if let Some(cell) = table.get_mut((row + 1, col + 1)) {
                *cell = above + running;
            }
        }
    }

    let lookup = |row: usize, col: usize| table.get((row, col)).copied().unwrap_or(0);

    interior_sites(grid.dim(), radius)
        .into_iter()
        .filter(|&[row, col]| {
            let (top, bottom) = (row - radius, row + radius);
            let (left, right) = (col - radius, col + radius);
            let missing = lookup(bottom, right) + lookup(top, left)
                - lookup(top, right)
                - lookup(bottom, left);
            missing == 0
        })
        .collect()
}

/// Mask of cells holding a value
pub fn observed_mask<F: Float>(grid: ArrayView2<'_, F>) -> Array2<bool> {
    grid.mapv(|v| !is_missing(v))
}

/// Half-open row and column bounds of the window at a site
pub const fn window_bounds(site: [usize; 2], radius: usize) -> (Range<usize>, Range<usize>) {
    let [row, col] = site;
    (row - radius..row + radius, col - radius..col + radius)
}

/// Read-only window of a grid at a site
///
/// # Panics
///
/// Panics if the window does not fit inside the grid. Sites produced by
/// [`interior_sites`] always fit.
pub fn window_view<'g, F>(
    grid: ArrayView2<'g, F>,
    site: [usize; 2],
    radius: usize,
) -> ArrayView2<'g, F> {
    let (rows, cols) = window_bounds(site, radius);
    grid.slice_axis_move(Axis(0), Slice::from(rows))
        .slice_axis_move(Axis(1), Slice::from(cols))
}

/// Mutable window of a grid at a site
///
/// # Panics
///
/// Panics if the window does not fit inside the grid.
pub fn window_view_mut<'g, F>(
    grid: ArrayViewMut2<'g, F>,
    site: [usize; 2],
    radius: usize,
) -> ArrayViewMut2<'g, F> {
    let (rows, cols) = window_bounds(site, radius);
    grid.slice_axis_move(Axis(0), Slice::from(rows))
        .slice_axis_move(Axis(1), Slice::from(cols))
}
