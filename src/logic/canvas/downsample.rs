//! Downsampler - RGBA canvas to normalized grid
//!
//! blur -> drop alpha -> unweighted RGB mean / 255 -> block mean.
//! Canvas sides must be exact multiples of the grid size.

use ndarray::{s, Array2, ArrayView2};

use super::blur::GaussianBlur;
use super::grid::NormalizedGrid;
use super::raw::RawCanvasImage;
use crate::error::{CanvasError, CanvasResult};
use crate::logic::config::PipelineConfig;

#[derive(Debug, Clone)]
pub struct Downsampler {
    grid_size: usize,
    blur: Option<GaussianBlur>,
}

impl Downsampler {
    pub fn new(grid_size: usize, blur: Option<GaussianBlur>) -> Self {
        Self { grid_size, blur }
    }

    pub fn from_config(config: &PipelineConfig) -> CanvasResult<Self> {
        let blur = config.blur_kernel.map(GaussianBlur::new).transpose()?;
        Ok(Self::new(config.grid_size, blur))
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn blur(&self) -> Option<&GaussianBlur> {
        self.blur.as_ref()
    }

    /// Fails when `raw` cannot be split into whole grid blocks
    pub fn check(&self, raw: &RawCanvasImage) -> CanvasResult<()> {
        check_divisible(raw.width(), raw.height(), self.grid_size)
    }

    pub fn downsample(&self, raw: &RawCanvasImage) -> CanvasResult<NormalizedGrid> {
        self.check(raw)?;

        let gray = match &self.blur {
            Some(blur) => to_grayscale(&blur.apply(raw)),
            None => to_grayscale(raw),
        };
        block_mean(gray.view(), self.grid_size)
    }
}

/// Unweighted RGB average scaled to [0, 1]; alpha is ignored
pub fn to_grayscale(image: &RawCanvasImage) -> Array2<f32> {
    let p = image.pixels();
    Array2::from_shape_fn((image.height(), image.width()), |(y, x)| {
        let sum = p[[y, x, 0]] as f32 + p[[y, x, 1]] as f32 + p[[y, x, 2]] as f32;
        sum / 3.0 / 255.0
    })
}

/// Mean of each `(h / grid) x (w / grid)` block
pub fn block_mean(gray: ArrayView2<'_, f32>, grid_size: usize) -> CanvasResult<NormalizedGrid> {
    let (height, width) = gray.dim();
    check_divisible(width, height, grid_size)?;

    let bh = height / grid_size;
    let bw = width / grid_size;
    let cells = Array2::from_shape_fn((grid_size, grid_size), |(i, j)| {
        gray.slice(s![i * bh..(i + 1) * bh, j * bw..(j + 1) * bw])
            .mean()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    });

    Ok(NormalizedGrid::from_array(cells))
}

fn check_divisible(width: usize, height: usize, grid_size: usize) -> CanvasResult<()> {
    if width == 0 || height == 0 {
        return Err(CanvasError::Empty { width, height });
    }
    if grid_size == 0 || width % grid_size != 0 || height % grid_size != 0 {
        return Err(CanvasError::IndivisibleDimensions {
            width,
            height,
            grid: grid_size,
        });
    }
    Ok(())
}
