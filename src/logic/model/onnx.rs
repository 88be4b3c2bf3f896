//! ONNX Runtime backend
//!
//! Builds an `ort` session from uploaded bytes and reads the declared input
//! and output shapes from the graph.

use ndarray::ArrayView4;
use parking_lot::Mutex;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::handle::{ModelHandle, ModelLoader, TensorShape};
use crate::constants::MODEL_EXTENSIONS;
use crate::error::{ModelError, ModelResult};

/// ONNX model; `Session::run` needs `&mut`, hence the mutex
pub struct OnnxModel {
    session: Mutex<Session>,
    input_shape: Option<TensorShape>,
    num_classes: Option<usize>,
    output_name: String,
}

impl OnnxModel {
    pub fn from_bytes(model_bytes: &[u8]) -> ModelResult<Self> {
        log::debug!("Building ONNX session from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelError::Load(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Load(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError::Load(format!("Load from memory error: {}", e)))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| ModelError::Load("model declares no inputs".to_string()))?;
        let input_shape = input
            .input_type
            .tensor_shape()
            .map(|dims| shape_from_dims(dims));

        let output = session
            .outputs
            .first()
            .ok_or_else(|| ModelError::Load("model declares no outputs".to_string()))?;
        let num_classes = output
            .output_type
            .tensor_shape()
            .and_then(|dims| dims.last().copied())
            .filter(|&d| d > 0)
            .map(|d| d as usize);
        let output_name = output.name.clone();

        Ok(Self {
            session: Mutex::new(session),
            input_shape,
            num_classes,
            output_name,
        })
    }
}

impl ModelHandle for OnnxModel {
    fn input_shape(&self) -> Option<&TensorShape> {
        self.input_shape.as_ref()
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    fn forward(&self, input: ArrayView4<'_, f32>) -> ModelResult<Vec<f32>> {
        let actual = TensorShape::fixed(input.shape()).to_string();
        let expected = self
            .input_shape
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "[dynamic]".to_string());

        let input_tensor = Value::from_array(input.to_owned()).map_err(|e| {
            ModelError::ShapeMismatch {
                expected: expected.clone(),
                actual: actual.clone(),
                reason: format!("Tensor error: {}", e),
            }
        })?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::ShapeMismatch {
                expected,
                actual,
                reason: format!("Inference failed: {}", e),
            })?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::InvalidOutput(format!("no output '{}'", self.output_name)))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::InvalidOutput(format!("Extract error: {}", e)))?;

        Ok(output_tensor.1.to_vec())
    }

    fn runtime(&self) -> &'static str {
        "onnxruntime"
    }
}

/// ONNX Runtime loader for `.onnx` uploads
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxLoader;

impl ModelLoader for OnnxLoader {
    fn extensions(&self) -> &[&'static str] {
        MODEL_EXTENSIONS
    }

    fn load(&self, bytes: &[u8]) -> ModelResult<Box<dyn ModelHandle>> {
        Ok(Box::new(OnnxModel::from_bytes(bytes)?))
    }
}

/// ONNX marks dynamic dimensions with -1 (or 0 for symbolic ones)
fn shape_from_dims(dims: &[i64]) -> TensorShape {
    TensorShape(
        dims.iter()
            .map(|&d| if d > 0 { Some(d as usize) } else { None })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array4};

    use crate::logic::canvas::NormalizedGrid;
    use crate::logic::model::testing::{LINEAR_28X28_ONNX, LINEAR_32X32_ONNX};
    use crate::logic::model::{predict, LoadedModel};

    #[test]
    fn test_shape_from_dims() {
        let shape = shape_from_dims(&[-1, 1, 28, 28]);
        assert_eq!(shape, TensorShape(vec![None, Some(1), Some(28), Some(28)]));
        assert!(shape.accepts(&[1, 1, 28, 28]));
    }

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let err = OnnxLoader.load(b"definitely not a protobuf graph");
        assert!(matches!(err, Err(ModelError::Load(_))));
    }

    #[test]
    fn test_loader_accepts_onnx_only() {
        assert_eq!(OnnxLoader.extensions(), &["onnx"]);
    }

    #[test]
    fn test_reads_declared_shapes_from_graph() {
        let model = OnnxModel::from_bytes(LINEAR_28X28_ONNX).unwrap();
        assert_eq!(model.input_shape(), Some(&TensorShape::grid_input(28)));
        assert_eq!(model.num_classes(), Some(3));
        assert_eq!(model.runtime(), "onnxruntime");
    }

    #[test]
    fn test_forward_runs_graph() {
        let model = OnnxModel::from_bytes(LINEAR_28X28_ONNX).unwrap();
        let input = Array4::<f32>::from_elem((1, 1, 28, 28), 0.5);

        let logits = model.forward(input.view()).unwrap();
        assert_eq!(logits.len(), 3);
        assert!(logits[0].abs() < 1e-4);
        assert!((logits[1] - 0.5).abs() < 1e-3);
        assert!((logits[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_predict_with_onnx_model() {
        let model = OnnxModel::from_bytes(LINEAR_28X28_ONNX).unwrap();
        let grid = NormalizedGrid::from_array(Array2::ones((28, 28)));

        let result = predict(&grid, &model).unwrap();
        assert_eq!(result.class, 1);
        assert_eq!(result.probabilities.len(), 3);
        let sum: f32 = result.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // softmax([0, 1, -1])[1]
        assert!((result.confidence - 0.6652).abs() < 1e-3);
    }

    #[test]
    fn test_wrong_input_size_fails_at_run() {
        let model = OnnxModel::from_bytes(LINEAR_28X28_ONNX).unwrap();
        let input = Array4::<f32>::zeros((1, 1, 32, 32));
        let err = model.forward(input.view()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_declared_32x32_graph_rejected_at_load() {
        let err = LoadedModel::load(&OnnxLoader, "big.onnx", LINEAR_32X32_ONNX, 28).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));

        let loaded = LoadedModel::load(&OnnxLoader, "big.onnx", LINEAR_32X32_ONNX, 32).unwrap();
        assert_eq!(loaded.metadata().input_shape, Some(TensorShape::grid_input(32)));
    }
}
