//! Digit Canvas
//!
//! Draw a digit, reduce the drawing to a 28x28 grayscale grid and classify it
//! with an uploaded ONNX model.
//!
//! - `logic::canvas` - drawing surface and the blur / block-mean pipeline
//! - `logic::model` - model capability, ONNX Runtime backend, softmax adapter
//! - `logic::session` - per-session state machine (NoModel -> ModelLoaded)
//! - `api` - commands used by the `digit-canvas` binary

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{CanvasError, ConfigError, ModelError, SessionError};
pub use logic::canvas::{Downsampler, NormalizedGrid, RawCanvasImage, Stroke};
pub use logic::config::PipelineConfig;
pub use logic::model::{predict, ModelHandle, ModelLoader, PredictionResult};
pub use logic::session::{RenderFrame, Session, SessionEvent, SessionState};
