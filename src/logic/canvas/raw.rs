//! Raw Canvas Image - RGBA pixel buffer
//!
//! Height x width x 4 array of 8-bit intensities, the same layout the
//! drawing surface produces on every stroke.

use ndarray::{Array3, ArrayView3};

use crate::error::{CanvasError, CanvasResult};

/// Number of channels (RGBA)
pub const CHANNELS: usize = 4;

/// Transparent black, the empty canvas colour
pub const BACKGROUND: [u8; CHANNELS] = [0, 0, 0, 0];

/// Opaque white, the brush colour
pub const INK: [u8; CHANNELS] = [255, 255, 255, 255];

#[derive(Debug, Clone, PartialEq)]
pub struct RawCanvasImage {
    pixels: Array3<u8>,
}

impl RawCanvasImage {
    /// Blank (transparent black) canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, BACKGROUND)
    }

    /// Canvas with every pixel set to `rgba`
    pub fn filled(width: usize, height: usize, rgba: [u8; CHANNELS]) -> Self {
        let pixels = Array3::from_shape_fn((height, width, CHANNELS), |(_, _, c)| rgba[c]);
        Self { pixels }
    }

    /// Wrap a row-major RGBA byte buffer
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> CanvasResult<Self> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(CanvasError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        let pixels = Array3::from_shape_vec((height, width, CHANNELS), data).map_err(|_| {
            CanvasError::BufferSize {
                width,
                height,
                expected,
                actual: expected,
            }
        })?;
        Ok(Self { pixels })
    }

    /// Wrap an existing `(height, width, 4)` array
    pub fn from_array(pixels: Array3<u8>) -> CanvasResult<Self> {
        let (height, width, channels) = pixels.dim();
        if channels != CHANNELS {
            return Err(CanvasError::BufferSize {
                width,
                height,
                expected: width * height * CHANNELS,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels })
    }

    /// Wrap an array already known to hold 4 channels
    pub(crate) fn from_rgba_array(pixels: Array3<u8>) -> Self {
        debug_assert_eq!(pixels.dim().2, CHANNELS);
        Self { pixels }
    }

    /// Decode an encoded image (PNG/JPEG/BMP) into an RGBA canvas
    pub fn decode(bytes: &[u8]) -> CanvasResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| CanvasError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(width as usize, height as usize, decoded.into_raw())
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; CHANNELS]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = &self.pixels;
        Some([p[[y, x, 0]], p[[y, x, 1]], p[[y, x, 2]], p[[y, x, 3]]])
    }

    /// Set a pixel, out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; CHANNELS]) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        for (c, value) in rgba.iter().enumerate() {
            self.pixels[[y, x, c]] = *value;
        }
    }

    /// True when every pixel is the background colour
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&v| v == 0)
    }
}
