//! Logic Module - canvas pipeline, model inference, session state
//!
//! - `canvas/` - drawing surface, blur, downsampling (the bespoke part)
//! - `model/` - model capability, ONNX backend, softmax adapter
//! - `session/` - event-driven UI state machine

pub mod canvas;
pub mod config;
pub mod model;
pub mod session;
