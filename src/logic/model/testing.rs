//! In-crate test doubles for [`ModelHandle`] / [`ModelLoader`]

use ndarray::ArrayView4;

use super::handle::{ModelHandle, ModelLoader, TensorShape};
use crate::constants::{GRID_SIZE, MODEL_EXTENSIONS};
use crate::error::{ModelError, ModelResult};

/// Flatten -> MatMul graph over a `[1, 1, 28, 28]` input with 3 outputs:
/// logits are `[0, mean, -mean]` of the input cells
pub const LINEAR_28X28_ONNX: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/linear_28x28.onnx"));

/// Same graph declaring a `[1, 1, 32, 32]` input
pub const LINEAR_32X32_ONNX: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/linear_32x32.onnx"));

/// Returns the same scores for every input
#[derive(Debug, Clone)]
pub struct FixedScoresModel {
    declared: Option<TensorShape>,
    requires: TensorShape,
    scores: Vec<f32>,
}

impl FixedScoresModel {
    pub fn new(declared: Option<TensorShape>, scores: Vec<f32>) -> Self {
        let requires = declared
            .clone()
            .unwrap_or_else(|| TensorShape::grid_input(GRID_SIZE));
        Self {
            declared,
            requires,
            scores,
        }
    }

    /// Declares a `[1, 1, 28, 28]` input
    pub fn digits(scores: Vec<f32>) -> Self {
        Self::new(Some(TensorShape::grid_input(GRID_SIZE)), scores)
    }

    /// Declares nothing but only runs on `requires`
    pub fn undeclared(requires: TensorShape, scores: Vec<f32>) -> Self {
        Self {
            declared: None,
            requires,
            scores,
        }
    }
}

impl ModelHandle for FixedScoresModel {
    fn input_shape(&self) -> Option<&TensorShape> {
        self.declared.as_ref()
    }

    fn num_classes(&self) -> Option<usize> {
        self.declared.as_ref().map(|_| self.scores.len())
    }

    fn forward(&self, input: ArrayView4<'_, f32>) -> ModelResult<Vec<f32>> {
        if !self.requires.accepts(input.shape()) {
            return Err(ModelError::ShapeMismatch {
                expected: self.requires.to_string(),
                actual: TensorShape::fixed(input.shape()).to_string(),
                reason: "input rejected by model".to_string(),
            });
        }
        Ok(self.scores.clone())
    }

    fn runtime(&self) -> &'static str {
        "stub"
    }
}

/// Hands out clones of one model, or always fails
#[derive(Debug, Clone)]
pub struct StubLoader {
    model: Result<FixedScoresModel, String>,
}

impl StubLoader {
    pub fn new(model: FixedScoresModel) -> Self {
        Self { model: Ok(model) }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            model: Err(reason.to_string()),
        }
    }
}

impl ModelLoader for StubLoader {
    fn extensions(&self) -> &[&'static str] {
        MODEL_EXTENSIONS
    }

    fn load(&self, _bytes: &[u8]) -> ModelResult<Box<dyn ModelHandle>> {
        match &self.model {
            Ok(model) => Ok(Box::new(model.clone())),
            Err(reason) => Err(ModelError::Load(reason.clone())),
        }
    }
}
