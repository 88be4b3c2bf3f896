//! Normalized Grid - the 28x28 model input and its preview rendering

use std::fmt;
use std::path::Path;

use ndarray::{Array2, Array4, ArrayView2, Axis};
use serde::{Serialize, Serializer};

use crate::error::{CanvasError, CanvasResult};

/// Shades used for the text preview, dark to bright
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Square grid of intensities in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGrid {
    cells: Array2<f32>,
}

impl NormalizedGrid {
    pub fn from_array(cells: Array2<f32>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> ArrayView2<'_, f32> {
        self.cells.view()
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.cells.get((row, col)).copied()
    }

    /// Single-sample single-channel tensor `[1, 1, rows, cols]`
    pub fn as_model_input(&self) -> Array4<f32> {
        self.cells
            .clone()
            .insert_axis(Axis(0))
            .insert_axis(Axis(0))
    }

    /// Repeat every cell `factor x factor` times (Kronecker product with a block of ones)
    pub fn upscale(&self, factor: usize) -> Array2<f32> {
        let (rows, cols) = self.cells.dim();
        Array2::from_shape_fn((rows * factor, cols * factor), |(y, x)| {
            self.cells[[y / factor, x / factor]]
        })
    }

    /// Upscaled 8-bit grayscale preview
    pub fn to_preview_image(&self, factor: usize) -> CanvasResult<image::GrayImage> {
        let upscaled = self.upscale(factor);
        let (height, width) = upscaled.dim();
        let raw: Vec<u8> = upscaled
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();

        image::GrayImage::from_raw(width as u32, height as u32, raw)
            .ok_or_else(|| CanvasError::Encode(format!("bad preview size {width}x{height}")))
    }

    /// Write the upscaled preview as PNG
    pub fn save_preview(&self, path: &Path, factor: usize) -> CanvasResult<()> {
        self.to_preview_image(factor)?
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| CanvasError::Encode(e.to_string()))
    }

    /// One character per cell
    pub fn to_ascii(&self) -> String {
        let last = (ASCII_RAMP.len() - 1) as f32;
        let mut out = String::with_capacity(self.cells.len() + self.cells.nrows());
        for row in self.cells.rows() {
            for v in row {
                let idx = (v.clamp(0.0, 1.0) * last).round() as usize;
                out.push(ASCII_RAMP[idx] as char);
            }
            out.push('\n');
        }
        out
    }
}

impl Serialize for NormalizedGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.rows().into_iter().map(|row| row.to_vec()))
    }
}

impl fmt::Display for NormalizedGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}
