//! Commands - operations the front end invokes
//!
//! Each command drives a [`Session`] and returns the rendered frames, or a
//! result that serializes straight to JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::logic::canvas::{CanvasAction, RawCanvasImage};
use crate::logic::config::PipelineConfig;
use crate::logic::model::{LoadedModel, ModelLoader, ModelMetadata, OnnxLoader};
use crate::logic::session::{RenderFrame, Session, SessionEvent};

/// New session backed by ONNX Runtime
pub fn open_session(config: PipelineConfig) -> Result<Session<OnnxLoader>> {
    Session::new(config, OnnxLoader).context("Invalid pipeline configuration")
}

/// Read a model file into an upload event
pub fn read_model_upload(path: &Path) -> Result<SessionEvent> {
    let (file_name, bytes) = read_model_file(path)?;
    Ok(SessionEvent::UploadModel { file_name, bytes })
}

fn read_model_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read model file {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((file_name, bytes))
}

/// Upload a model file into the session
pub fn upload_model_file<L: ModelLoader>(session: &mut Session<L>, path: &Path) -> Result<RenderFrame> {
    let event = read_model_upload(path)?;
    session
        .handle(event)
        .with_context(|| format!("Failed to load model {}", path.display()))
}

/// Load model metadata without keeping a session around
pub fn inspect_model_file<L: ModelLoader>(loader: &L, path: &Path, grid_size: usize) -> Result<ModelMetadata> {
    let (file_name, bytes) = read_model_file(path)?;
    let model = LoadedModel::load(loader, &file_name, &bytes, grid_size)
        .with_context(|| format!("Failed to load model {}", path.display()))?;
    Ok(model.metadata().clone())
}

/// Predict a drawing stored as an image file
pub fn predict_canvas_file<L: ModelLoader>(session: &mut Session<L>, path: &Path) -> Result<RenderFrame> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read canvas {}", path.display()))?;
    let image = RawCanvasImage::decode(&bytes)
        .with_context(|| format!("Failed to decode canvas {}", path.display()))?;

    log::info!("Canvas {} is {}x{}", path.display(), image.width(), image.height());

    session
        .handle(SessionEvent::ReplaceCanvas(image))
        .context("Prediction failed")
}

/// Parse a JSON array of canvas actions
pub fn load_events(path: &Path) -> Result<Vec<CanvasAction>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read events {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid events file {}", path.display()))
}

/// Feed canvas actions one by one, one frame per action
pub fn replay_events<L: ModelLoader>(
    session: &mut Session<L>,
    actions: Vec<CanvasAction>,
) -> Result<Vec<RenderFrame>> {
    let mut frames = Vec::with_capacity(actions.len());
    for (i, action) in actions.into_iter().enumerate() {
        let frame = session
            .handle(SessionEvent::Canvas(action))
            .with_context(|| format!("Event #{} failed", i + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Write the upscaled grid of a frame; false when the frame has no grid
pub fn write_preview(frame: &RenderFrame, path: &Path, scale: usize) -> Result<bool> {
    let Some(grid) = &frame.grid else {
        return Ok(false);
    };
    grid.save_preview(path, scale)
        .with_context(|| format!("Failed to write preview {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::testing::{FixedScoresModel, StubLoader};
    use crate::logic::session::SessionState;
    use tempfile::tempdir;

    fn stub_session(scores: Vec<f32>) -> Session<StubLoader> {
        Session::new(
            PipelineConfig::default(),
            StubLoader::new(FixedScoresModel::digits(scores)),
        )
        .unwrap()
    }

    #[test]
    fn test_upload_model_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("digits.onnx");
        fs::write(&path, b"fake graph").unwrap();

        let mut session = stub_session(vec![0.0; 10]);
        let frame = upload_model_file(&mut session, &path).unwrap();

        assert_eq!(frame.state, SessionState::ModelLoaded);
        let meta = frame.model.unwrap();
        assert_eq!(meta.file_name, "digits.onnx");
        assert_eq!(meta.size_bytes, 10);
    }

    #[test]
    fn test_upload_missing_file() {
        let dir = tempdir().unwrap();
        let mut session = stub_session(vec![0.0; 10]);
        assert!(upload_model_file(&mut session, &dir.path().join("nope.onnx")).is_err());
        assert_eq!(session.state(), SessionState::NoModel);
    }

    #[test]
    fn test_inspect_model_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("digits.onnx");
        fs::write(&path, b"abc").unwrap();

        let loader = StubLoader::new(FixedScoresModel::digits(vec![0.0; 10]));
        let meta = inspect_model_file(&loader, &path, 28).unwrap();
        assert_eq!(
            meta.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(meta.num_classes, Some(10));
    }

    #[test]
    fn test_predict_canvas_png_and_preview() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("m.onnx");
        fs::write(&model_path, b"x").unwrap();

        let canvas_path = dir.path().join("drawing.png");
        let white = image::RgbaImage::from_pixel(280, 280, image::Rgba([255, 255, 255, 255]));
        white.save(&canvas_path).unwrap();

        let mut session = stub_session(vec![0.0, 0.0, 4.0]);
        upload_model_file(&mut session, &model_path).unwrap();
        let frame = predict_canvas_file(&mut session, &canvas_path).unwrap();

        assert_eq!(frame.prediction.as_ref().unwrap().class, 2);

        let preview_path = dir.path().join("preview.png");
        assert!(write_preview(&frame, &preview_path, 10).unwrap());
        let preview = image::open(&preview_path).unwrap().to_luma8();
        assert_eq!(preview.dimensions(), (280, 280));
        assert_eq!(preview.get_pixel(140, 140).0[0], 255);
    }

    #[test]
    fn test_predict_rejects_indivisible_canvas() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("m.onnx");
        fs::write(&model_path, b"x").unwrap();
        let canvas_path = dir.path().join("odd.png");
        image::RgbaImage::new(100, 90).save(&canvas_path).unwrap();

        let mut session = stub_session(vec![1.0]);
        upload_model_file(&mut session, &model_path).unwrap();
        assert!(predict_canvas_file(&mut session, &canvas_path).is_err());
    }

    #[test]
    fn test_replay_events_file() {
        let dir = tempdir().unwrap();
        let events_path = dir.path().join("events.json");
        fs::write(
            &events_path,
            r#"[
                {"type": "stroke", "points": [[140, 40], [140, 240]]},
                {"type": "stroke", "points": [[60, 60]]},
                {"type": "undo"},
                {"type": "clear"}
            ]"#,
        )
        .unwrap();

        let mut session = stub_session(vec![0.0, 1.0]);
        session.upload_model("m.onnx", vec![1]).unwrap();

        let actions = load_events(&events_path).unwrap();
        let frames = replay_events(&mut session, actions).unwrap();

        assert_eq!(frames.len(), 4);
        assert!(frames[0].prediction.is_some());
        assert_eq!(frames[1].strokes, 2);
        assert_eq!(frames[2].strokes, 1);
        assert!(frames[3].prediction.is_none());
        assert!(!write_preview(&frames[3], &dir.path().join("none.png"), 10).unwrap());
    }

    #[test]
    fn test_invalid_events_file() {
        let dir = tempdir().unwrap();
        let events_path = dir.path().join("events.json");
        fs::write(&events_path, r#"[{"type": "erase"}]"#).unwrap();
        assert!(load_events(&events_path).is_err());
    }
}
