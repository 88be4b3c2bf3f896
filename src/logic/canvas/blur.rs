//! Gaussian Blur - separable smoothing of the canvas before downsampling
//!
//! Kernel weights follow the OpenCV convention for an unspecified sigma:
//! `sigma = 0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`. Borders are extended with
//! reflect-101 (`dcb|abcd|cba`), results are rounded back to 8 bits.

use ndarray::Array3;

use super::raw::RawCanvasImage;
use crate::error::{CanvasError, CanvasResult};

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianBlur {
    kernel: Vec<f32>,
    sigma: f64,
}

impl GaussianBlur {
    /// Blur with sigma derived from the kernel size
    pub fn new(size: usize) -> CanvasResult<Self> {
        Self::with_sigma(size, sigma_for(size))
    }

    pub fn with_sigma(size: usize, sigma: f64) -> CanvasResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(CanvasError::InvalidKernel(size));
        }

        let center = (size / 2) as f64;
        let scale = 2.0 * sigma * sigma;
        let raw: Vec<f64> = (0..size)
            .map(|i| {
                let d = i as f64 - center;
                (-(d * d) / scale).exp()
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        let kernel = raw.iter().map(|w| (w / sum) as f32).collect();

        Ok(Self { kernel, sigma })
    }

    pub fn size(&self) -> usize {
        self.kernel.len()
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn kernel(&self) -> &[f32] {
        &self.kernel
    }

    /// Blur every channel (alpha included) of the canvas
    pub fn apply(&self, image: &RawCanvasImage) -> RawCanvasImage {
        let src = image.pixels();
        let (height, width, channels) = src.dim();
        let radius = (self.kernel.len() / 2) as isize;

        let mut horizontal = Array3::<f32>::zeros((height, width, channels));
        for y in 0..height {
            for x in 0..width {
                for (k, weight) in self.kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + k as isize - radius, width);
                    for c in 0..channels {
                        horizontal[[y, x, c]] += weight * src[[y, sx, c]] as f32;
                    }
                }
            }
        }

        let mut out = Array3::<u8>::zeros((height, width, channels));
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    let acc: f32 = self
                        .kernel
                        .iter()
                        .enumerate()
                        .map(|(k, weight)| {
                            let sy = reflect_101(y as isize + k as isize - radius, height);
                            weight * horizontal[[sy, x, c]]
                        })
                        .sum();
                    out[[y, x, c]] = acc.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        RawCanvasImage::from_rgba_array(out)
    }
}

/// Sigma OpenCV picks when none is given
pub fn sigma_for(size: usize) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Map an out-of-range index back into `0..len` (reflect-101)
pub(crate) fn reflect_101(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = index.rem_euclid(period);
    if m >= len as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}
