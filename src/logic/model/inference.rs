//! Inference Adapter - grid in, (class, confidence) out
//!
//! Reshape -> model scores -> softmax -> argmax.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::handle::{ModelHandle, TensorShape};
use crate::error::{ModelError, ModelResult};
use crate::logic::canvas::NormalizedGrid;

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class: usize,
    pub confidence: f32,         // softmax mass of `class`
    pub probabilities: Vec<f32>, // one per class, sums to 1
    pub inference_time_us: u64,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Predicted Digit: {}, Probability: {:.2}%",
            self.class,
            self.confidence * 100.0
        )
    }
}

/// Run the model on one grid
pub fn predict(grid: &NormalizedGrid, model: &dyn ModelHandle) -> ModelResult<PredictionResult> {
    let start_time = Instant::now();

    let input = grid.as_model_input();
    if let Some(declared) = model.input_shape() {
        if !declared.accepts(input.shape()) {
            return Err(ModelError::ShapeMismatch {
                expected: declared.to_string(),
                actual: TensorShape::fixed(input.shape()).to_string(),
                reason: "declared input shape is incompatible".to_string(),
            });
        }
    }

    let scores = model.forward(input.view())?;
    if scores.is_empty() {
        return Err(ModelError::InvalidOutput("empty score vector".to_string()));
    }
    if let Some(expected) = model.num_classes() {
        if scores.len() != expected {
            return Err(ModelError::InvalidOutput(format!(
                "expected {} scores, got {}",
                expected,
                scores.len()
            )));
        }
    }

    let probabilities = softmax(&scores)?;
    let class = argmax(&probabilities)
        .ok_or_else(|| ModelError::InvalidOutput("empty score vector".to_string()))?;
    let confidence = probabilities[class];
    let inference_time_us = start_time.elapsed().as_micros() as u64;

    log::debug!(
        "Predicted class {} ({:.4}) from {} scores in {}us",
        class,
        confidence,
        scores.len(),
        inference_time_us
    );

    Ok(PredictionResult {
        class,
        confidence,
        probabilities,
        inference_time_us,
    })
}

/// Max-subtracted softmax; rejects NaN / infinite scores
pub fn softmax(scores: &[f32]) -> ModelResult<Vec<f32>> {
    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        return Err(ModelError::NonFiniteScore(i));
    }

    let max = scores
        .iter()
        .fold(f64::NEG_INFINITY, |m, &s| m.max(s as f64));
    let exps: Vec<f64> = scores.iter().map(|&s| (s as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    Ok(exps.iter().map(|e| (e / sum) as f32).collect())
}

/// Index of the largest value, first one on ties
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
