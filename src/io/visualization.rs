//! Frame capture and GIF generation for the realization history

use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;
use crate::io::error::{Result, SimulationError};
use crate::io::image::{Palette, render_grid};
use image::{Delay, Frame, RgbaImage};
use ndarray::ArrayView2;
use std::path::Path;

/// Captures realization snapshots for an animated export
///
/// Missing cells are drawn in the average palette colour so that filling
/// progress stays visible against any background.
pub struct HistoryCapture {
    frames: Vec<RgbaImage>,
    palette: Palette,
    empty_color: [u8; 4],
}

impl HistoryCapture {
    /// The average of all category colours is used as the empty colour
    pub fn new(palette: Palette, iterations: usize) -> Self {
        let empty_color = if palette.is_empty() {
            [128, 128, 128, 255]
        } else {
            let mut sums = [0u32; 4];
            for color in palette.colors() {
                for (sum, &channel) in sums.iter_mut().zip(color) {
                    *sum += u32::from(channel);
                }
            }

            let count = palette.len() as u32;
            sums.map(|sum| (sum / count) as u8)
        };

        Self {
            frames: Vec::with_capacity(iterations + 1),
            palette,
            empty_color,
        }
    }

    /// Colour used for missing cells
    pub const fn empty_color(&self) -> [u8; 4] {
        self.empty_color
    }

    /// Render and store one snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if a cell value is not a palette index
    pub fn record(&mut self, snapshot: ArrayView2<'_, f64>) -> Result<()> {
        let frame = render_grid(snapshot, &self.palette, self.empty_color)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Number of captured snapshots
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Export the captured snapshots as an animated GIF
    ///
    /// The delay is raised to the minimum viewers honour, and the final
    /// snapshot is held longer so the result is readable.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No snapshot was captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        if self.frames.is_empty() {
            return Err(SimulationError::InvalidSourceData {
                reason: "No snapshots captured for visualization".to_string(),
            });
        }

        let delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let mut frames: Vec<Frame> = self
            .frames
            .iter()
            .map(|img| {
                Frame::from_parts(img.clone(), 0, 0, Delay::from_numer_denom_ms(delay_ms, 1))
            })
            .collect();

        if let Some(last) = self.frames.last() {
            frames.push(Frame::from_parts(
                last.clone(),
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms * 5, 1),
            ));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SimulationError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| SimulationError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| SimulationError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }
}
