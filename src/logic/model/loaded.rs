//! Loaded Model - handle plus upload metadata
//!
//! Validates file type and declared input shape before the session accepts
//! the model.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::handle::{ModelHandle, ModelLoader, TensorShape};
use crate::error::{ModelError, ModelResult};

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub file_name: String,
    pub size_bytes: usize,
    pub sha256: String,
    pub input_shape: Option<TensorShape>,
    pub num_classes: Option<usize>,
    pub runtime: String,
    pub loaded_at: DateTime<Utc>,
}

pub struct LoadedModel {
    handle: Box<dyn ModelHandle>,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl LoadedModel {
    /// Deserialize an uploaded file and check it accepts a `grid_size` grid
    pub fn load(
        loader: &dyn ModelLoader,
        file_name: &str,
        bytes: &[u8],
        grid_size: usize,
    ) -> ModelResult<Self> {
        check_extension(loader.extensions(), file_name)?;

        log::info!("Loading model '{}' ({} bytes)", file_name, bytes.len());
        let handle = loader.load(bytes)?;

        if let Some(declared) = handle.input_shape() {
            let grid_input = TensorShape::grid_input(grid_size);
            if !declared.accepts(&[1, 1, grid_size, grid_size]) {
                return Err(ModelError::ShapeMismatch {
                    expected: declared.to_string(),
                    actual: grid_input.to_string(),
                    reason: "declared input shape is incompatible".to_string(),
                });
            }
        } else {
            log::warn!("Model '{}' declares no input shape, checking at inference", file_name);
        }

        let metadata = ModelMetadata {
            file_name: file_name.to_string(),
            size_bytes: bytes.len(),
            sha256: fingerprint(bytes),
            input_shape: handle.input_shape().cloned(),
            num_classes: handle.num_classes(),
            runtime: handle.runtime().to_string(),
            loaded_at: Utc::now(),
        };

        log::info!(
            "Model '{}' loaded: input {}, classes {}, sha256 {}",
            metadata.file_name,
            metadata
                .input_shape
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            metadata
                .num_classes
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            &metadata.sha256[..12],
        );

        Ok(Self { handle, metadata })
    }

    pub fn handle(&self) -> &dyn ModelHandle {
        self.handle.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Hex SHA-256 of the uploaded bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn check_extension(accepted: &[&'static str], file_name: &str) -> ModelResult<()> {
    if accepted.is_empty() {
        return Ok(());
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) if accepted.iter().any(|a| *a == ext) => Ok(()),
        _ => Err(ModelError::UnsupportedFileType {
            file_name: file_name.to_string(),
            accepted: accepted
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
