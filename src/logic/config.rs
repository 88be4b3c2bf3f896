//! Pipeline configuration

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;

/// Canvas and downsampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Canvas side length in pixels
    pub canvas_size: usize,

    /// Output grid side length
    pub grid_size: usize,

    /// Brush diameter in pixels
    pub stroke_width: f32,

    /// Gaussian kernel size, `None` disables the blur
    pub blur_kernel: Option<usize>,

    /// Preview upscale factor per axis
    pub preview_scale: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas_size: constants::DEFAULT_CANVAS_SIZE,
            grid_size: constants::GRID_SIZE,
            stroke_width: constants::DEFAULT_STROKE_WIDTH,
            blur_kernel: Some(constants::DEFAULT_BLUR_KERNEL),
            preview_scale: constants::DEFAULT_PREVIEW_SCALE,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// `DIGIT_BLUR_KERNEL=0` turns the blur off.
    pub fn from_env() -> Self {
        let kernel = constants::get_blur_kernel();
        Self {
            canvas_size: constants::get_canvas_size(),
            grid_size: constants::GRID_SIZE,
            stroke_width: constants::get_stroke_width(),
            blur_kernel: if kernel == 0 { None } else { Some(kernel) },
            preview_scale: constants::get_preview_scale(),
        }
    }

    /// Same configuration without the blur step
    pub fn without_blur(self) -> Self {
        Self { blur_kernel: None, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 {
            return Err(ConfigError::Zero { field: "canvas_size" });
        }
        if self.grid_size == 0 {
            return Err(ConfigError::Zero { field: "grid_size" });
        }
        if self.preview_scale == 0 {
            return Err(ConfigError::Zero { field: "preview_scale" });
        }
        if !(self.stroke_width > 0.0) {
            return Err(ConfigError::Zero { field: "stroke_width" });
        }
        if let Some(kernel) = self.blur_kernel {
            if kernel % 2 == 0 {
                return Err(ConfigError::EvenKernel(kernel));
            }
        }
        if self.canvas_size % self.grid_size != 0 {
            return Err(ConfigError::IndivisibleCanvas {
                canvas: self.canvas_size,
                grid: self.grid_size,
            });
        }
        Ok(())
    }
}
