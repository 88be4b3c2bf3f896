//! Model Handle - capability interface over an inference artifact
//!
//! One operation (tensor in, scores out) plus the input shape the artifact
//! declares, so incompatible models are rejected when they are uploaded.

use std::fmt;

use ndarray::ArrayView4;
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// Tensor shape; `None` marks a dynamic dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorShape(pub Vec<Option<usize>>);

impl TensorShape {
    pub fn fixed(dims: &[usize]) -> Self {
        Self(dims.iter().map(|&d| Some(d)).collect())
    }

    /// `[1, 1, size, size]`
    pub fn grid_input(size: usize) -> Self {
        Self::fixed(&[1, 1, size, size])
    }

    pub fn dims(&self) -> &[Option<usize>] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Same rank, and every fixed dimension matches
    pub fn accepts(&self, dims: &[usize]) -> bool {
        self.0.len() == dims.len()
            && self
                .0
                .iter()
                .zip(dims)
                .all(|(declared, actual)| declared.map_or(true, |d| d == *actual))
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match dim {
                Some(d) => write!(f, "{}", d)?,
                None => f.write_str("?")?,
            }
        }
        f.write_str("]")
    }
}

/// Loaded inference artifact
pub trait ModelHandle {
    /// Declared input shape, `None` when the artifact does not say
    fn input_shape(&self) -> Option<&TensorShape>;

    /// Declared number of classes
    fn num_classes(&self) -> Option<usize> {
        None
    }

    /// Raw per-class scores for one `[1, 1, h, w]` sample
    fn forward(&self, input: ArrayView4<'_, f32>) -> ModelResult<Vec<f32>>;

    fn runtime(&self) -> &'static str {
        "custom"
    }
}

/// Turns uploaded bytes into a [`ModelHandle`]
pub trait ModelLoader {
    /// Accepted file extensions (lowercase, no dot); empty accepts anything
    fn extensions(&self) -> &[&'static str];

    fn load(&self, bytes: &[u8]) -> ModelResult<Box<dyn ModelHandle>>;
}
