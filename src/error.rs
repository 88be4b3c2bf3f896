//! Error handling

use thiserror::Error;

pub type CanvasResult<T> = Result<T, CanvasError>;
pub type ModelResult<T> = Result<T, ModelError>;
pub type SessionResult<T> = Result<T, SessionError>;

/// Canvas / downsampling errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanvasError {
    #[error("canvas buffer has {actual} bytes, expected {expected} ({width}x{height} RGBA)")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("canvas has no pixels ({width}x{height})")]
    Empty { width: usize, height: usize },

    #[error("canvas {width}x{height} is not divisible into a {grid}x{grid} grid")]
    IndivisibleDimensions {
        width: usize,
        height: usize,
        grid: usize,
    },

    #[error("blur kernel must be odd and positive, got {0}")]
    InvalidKernel(usize),

    #[error("failed to decode canvas image: {0}")]
    Decode(String),

    #[error("failed to encode preview image: {0}")]
    Encode(String),
}

/// Model loading / inference errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Uploaded bytes could not be turned into a model
    #[error("failed to load model: {0}")]
    Load(String),

    #[error("unsupported model file '{file_name}' (accepted: {accepted})")]
    UnsupportedFileType { file_name: String, accepted: String },

    /// Model does not accept the grid input
    #[error("model input {expected} does not accept {actual}: {reason}")]
    ShapeMismatch {
        expected: String,
        actual: String,
        reason: String,
    },

    #[error("model produced invalid output: {0}")]
    InvalidOutput(String),

    #[error("model produced non-finite score at class {0}")]
    NonFiniteScore(usize),
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("blur kernel must be odd, got {0}")]
    EvenKernel(usize),

    #[error("canvas size {canvas} is not a multiple of grid size {grid}")]
    IndivisibleCanvas { canvas: usize, grid: usize },
}

/// Session state machine errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("a model is already loaded for this session")]
    ModelAlreadyLoaded,

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// True when the model rejected the grid input
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, SessionError::Model(ModelError::ShapeMismatch { .. }))
    }
}
