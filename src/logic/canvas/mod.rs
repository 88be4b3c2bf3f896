//! Canvas Module - drawing surface and downsampling pipeline
//!
//! - `raw` - RGBA pixel buffer produced by the drawing surface
//! - `surface` - stroke rasterization, undo / clear
//! - `blur` - Gaussian anti-aliasing before downsampling
//! - `downsample` - grayscale conversion and block-mean reduction
//! - `grid` - the normalized 28x28 result and its preview

pub mod blur;
pub mod downsample;
pub mod grid;
pub mod raw;
pub mod surface;


// Re-export common types
pub use blur::GaussianBlur;
pub use downsample::{block_mean, to_grayscale, Downsampler};
pub use grid::NormalizedGrid;
pub use raw::RawCanvasImage;
pub use surface::{CanvasAction, DrawingSurface, Stroke};
