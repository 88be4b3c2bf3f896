//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! To change the canvas geometry, only edit this file (or set the env overrides).

/// Side length of the drawing canvas in pixels
pub const DEFAULT_CANVAS_SIZE: usize = 280;

/// Side length of the grid fed to the model
pub const GRID_SIZE: usize = 28;

/// Brush diameter in canvas pixels
pub const DEFAULT_STROKE_WIDTH: f32 = 20.0;

/// Gaussian blur kernel size (odd)
pub const DEFAULT_BLUR_KERNEL: usize = 51;

/// Upscale factor per axis for the grid preview
pub const DEFAULT_PREVIEW_SCALE: usize = 10;

/// Model file extensions accepted by the uploader
pub const MODEL_EXTENSIONS: &[&str] = &["onnx"];

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Digit Canvas";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get canvas size from environment or use default
pub fn get_canvas_size() -> usize {
    std::env::var("DIGIT_CANVAS_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CANVAS_SIZE)
}

/// Get stroke width from environment or use default
pub fn get_stroke_width() -> f32 {
    std::env::var("DIGIT_STROKE_WIDTH")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_STROKE_WIDTH)
}

/// Get blur kernel size from environment or use default
pub fn get_blur_kernel() -> usize {
    std::env::var("DIGIT_BLUR_KERNEL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_BLUR_KERNEL)
}

/// Get preview scale from environment or use default
pub fn get_preview_scale() -> usize {
    std::env::var("DIGIT_PREVIEW_SCALE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PREVIEW_SCALE)
}
