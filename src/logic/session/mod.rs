//! Session Module - per-user interaction state
//!
//! No global slots: callers own a `Session` and feed it events.

pub mod state;


pub use state::{RenderFrame, Session, SessionEvent, SessionState, SessionStats};
