//! Categorical PNG codec for training images and realizations
//!
//! Every distinct visible colour becomes a category whose index is the cell
//! value. Fully transparent pixels are missing cells. Exporting reverses the
//! mapping and draws missing cells transparent.

use crate::io::error::{Result, SimulationError};
use crate::spatial::grid::{Grid, is_missing};
use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::{Array2, ArrayView2};
use std::collections::BTreeSet;
use std::path::Path;

/// Colour for missing cells in exported images
pub const MISSING_COLOR: [u8; 4] = [0, 0, 0, 0];

/// Sorted list of category colours, indexed by category
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
}

impl Palette {
    /// Build a palette, sorting and deduplicating the colours
    pub fn from_colors(colors: impl IntoIterator<Item = [u8; 4]>) -> Self {
        let unique: BTreeSet<[u8; 4]> = colors.into_iter().collect();
        Self {
            colors: unique.into_iter().collect(),
        }
    }

    /// Category colours in index order
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Number of categories
    pub const fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no category
    pub const fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Category index of a colour
    pub fn category(&self, color: [u8; 4]) -> Option<usize> {
        self.colors.binary_search(&color).ok()
    }

    /// Colour of a category index
    pub fn color(&self, category: usize) -> Option<[u8; 4]> {
        self.colors.get(category).copied()
    }

    /// Colour of a cell value, `None` for missing cells
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not the index of a palette entry
    pub fn color_of_value(&self, value: f64) -> Result<Option<[u8; 4]>> {
        if is_missing(value) {
            return Ok(None);
        }

        let invalid = || SimulationError::InvalidCategory {
            value,
            categories: self.len(),
        };

        if value < 0.0 || value.fract() != 0.0 {
            return Err(invalid());
        }
        self.color(value as usize).map(Some).ok_or_else(invalid)
    }
}

/// Grid decoded from an image together with its palette
#[derive(Debug, Clone)]
pub struct CategoricalImage {
    /// Category indices, NaN where the pixel was transparent
    pub grid: Grid,
    /// Colour of each category
    pub palette: Palette,
}

/// Decode an RGBA image into a categorical grid
pub fn grid_from_rgba(img: &RgbaImage) -> CategoricalImage {
    let palette = Palette::from_colors(
        img.pixels()
            .filter(|pixel| pixel.0[3] > 0)
            .map(|pixel| pixel.0),
    );

    let (width, height) = img.dimensions();
    let mut grid = Array2::from_elem((height as usize, width as usize), f64::NAN);

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        if let (Some(category), Some(cell)) = (
            palette.category(pixel.0),
            grid.get_mut((y as usize, x as usize)),
        ) {
            *cell = category as f64;
        }
    }

    CategoricalImage { grid, palette }
}

/// Load a PNG file as a categorical grid
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or decoded
/// - The image holds no visible pixel
pub fn load_categorical_png(path: &Path) -> Result<CategoricalImage> {
    let img = image::open(path).map_err(|e| SimulationError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    let decoded = grid_from_rgba(&img.to_rgba8());
    if decoded.palette.is_empty() {
        return Err(SimulationError::InvalidSourceData {
            reason: format!("'{}' has no visible pixels", path.display()),
        });
    }

    Ok(decoded)
}

/// Render a categorical grid, drawing missing cells with the given colour
///
/// # Errors
///
/// Returns an error if a cell value is not a palette index
pub fn render_grid(
    grid: ArrayView2<'_, f64>,
    palette: &Palette,
    missing_color: [u8; 4],
) -> Result<RgbaImage> {
    let (rows, cols) = grid.dim();
    let mut img = ImageBuffer::new(cols as u32, rows as u32);

    for ((row, col), &value) in grid.indexed_iter() {
        let color = palette.color_of_value(value)?.unwrap_or(missing_color);
        img.put_pixel(col as u32, row as u32, Rgba(color));
    }

    Ok(img)
}

/// Export a categorical grid as a PNG with transparent missing cells
///
/// # Errors
///
/// Returns an error if:
/// - A cell value is not a palette index
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_grid_as_png(
    grid: ArrayView2<'_, f64>,
    palette: &Palette,
    output_path: &Path,
) -> Result<()> {
    let img = render_grid(grid, palette, MISSING_COLOR)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SimulationError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save(output_path)
        .map_err(|e| SimulationError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
