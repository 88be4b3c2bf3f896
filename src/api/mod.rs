//! API Module
//!
//! Structure:
//! - commands.rs: operations behind the CLI subcommands
//!
//! Usage:
//! - `api::commands::upload_model_file()` - Direct access
//! - `api::upload_model_file()` - Re-exported

pub mod commands;

// Re-export current version as default
pub use commands::*;
