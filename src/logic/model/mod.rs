//! Model Module - inference artifact and adapter
//!
//! The session only sees the `ModelHandle` capability; ONNX Runtime is one
//! implementation of it.

pub mod handle;
pub mod inference;
pub mod loaded;
pub mod onnx;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common types
pub use handle::{ModelHandle, ModelLoader, TensorShape};
pub use inference::{argmax, predict, softmax, PredictionResult};
pub use loaded::{fingerprint, LoadedModel, ModelMetadata};
pub use onnx::{OnnxLoader, OnnxModel};
