//! UI Session - explicit event-driven state machine
//!
//! NoModel --upload--> ModelLoaded (terminal). Every event produces one
//! complete [`RenderFrame`]; the model slot is written once per session.

use std::fmt;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::constants::MODEL_EXTENSIONS;
use crate::error::{SessionError, SessionResult};
use crate::logic::canvas::{CanvasAction, Downsampler, DrawingSurface, NormalizedGrid, RawCanvasImage, Stroke};
use crate::logic::config::PipelineConfig;
use crate::logic::model::{self, LoadedModel, ModelLoader, ModelMetadata, PredictionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoModel,
    ModelLoaded,
}

/// User interaction
#[derive(Debug, Clone)]
pub enum SessionEvent {
    UploadModel { file_name: String, bytes: Vec<u8> },
    Canvas(CanvasAction),
    ReplaceCanvas(RawCanvasImage),
}

/// Everything the UI shows after one event
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub state: SessionState,
    pub model: Option<ModelMetadata>,
    pub strokes: usize,
    pub prediction: Option<PredictionResult>,
    pub grid: Option<NormalizedGrid>,
}

impl fmt::Display for RenderFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            SessionState::NoModel => {
                let accepted: Vec<String> =
                    MODEL_EXTENSIONS.iter().map(|e| format!(".{}", e)).collect();
                writeln!(f, "Upload your model ({}) to start drawing", accepted.join(", "))
            }
            SessionState::ModelLoaded => {
                if let Some(model) = &self.model {
                    writeln!(f, "Model: {} ({} bytes)", model.file_name, model.size_bytes)?;
                }
                match (&self.prediction, &self.grid) {
                    (Some(prediction), Some(grid)) => {
                        writeln!(f, "{}", prediction)?;
                        let (rows, cols) = grid.dim();
                        writeln!(f, "Your Drawing ({}x{}):", rows, cols)?;
                        write!(f, "{}", grid)
                    }
                    _ => writeln!(f, "Draw your digit in the box below"),
                }
            }
        }
    }
}

/// Inference counters for this session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub inference_count: u64,
    pub avg_latency_ms: f32,
    #[serde(skip)]
    latency_sum_us: u64,
}

impl SessionStats {
    fn record(&mut self, latency_us: u64) {
        self.latency_sum_us += latency_us;
        self.inference_count += 1;
        self.avg_latency_ms =
            (self.latency_sum_us as f32 / self.inference_count as f32) / 1000.0;
    }
}

/// Session-scoped context: the write-once model slot plus the canvas
pub struct Session<L: ModelLoader> {
    config: PipelineConfig,
    loader: L,
    model: OnceCell<LoadedModel>,
    surface: DrawingSurface,
    downsampler: Downsampler,
    stats: SessionStats,
}

impl<L: ModelLoader> Session<L> {
    pub fn new(config: PipelineConfig, loader: L) -> SessionResult<Self> {
        config.validate()?;
        let downsampler = Downsampler::from_config(&config)?;
        let surface = DrawingSurface::from_config(&config);

        Ok(Self {
            config,
            loader,
            model: OnceCell::new(),
            surface,
            downsampler,
            stats: SessionStats::default(),
        })
    }

    pub fn state(&self) -> SessionState {
        if self.model.get().is_some() {
            SessionState::ModelLoaded
        } else {
            SessionState::NoModel
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model_metadata(&self) -> Option<&ModelMetadata> {
        self.model.get().map(|m| m.metadata())
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    /// Apply one event and re-render.
    ///
    /// Upload failures leave the session in `NoModel`. Canvas events before a
    /// model is loaded are ignored, the canvas is not active yet.
    pub fn handle(&mut self, event: SessionEvent) -> SessionResult<RenderFrame> {
        match event {
            SessionEvent::UploadModel { file_name, bytes } => {
                if self.model.get().is_some() {
                    log::warn!("Rejected upload of '{}': model already loaded", file_name);
                    return Err(SessionError::ModelAlreadyLoaded);
                }
                let loaded = LoadedModel::load(&self.loader, &file_name, &bytes, self.config.grid_size)
                    .map_err(|e| {
                        log::warn!("Model upload '{}' failed: {}", file_name, e);
                        e
                    })?;
                self.model
                    .set(loaded)
                    .map_err(|_| SessionError::ModelAlreadyLoaded)?;
            }
            SessionEvent::Canvas(action) => {
                if self.model.get().is_none() {
                    log::debug!("Canvas inactive without a model, ignoring {:?}", action);
                } else {
                    self.surface.apply(action);
                }
            }
            SessionEvent::ReplaceCanvas(image) => {
                if self.model.get().is_none() {
                    log::debug!("Canvas inactive without a model, ignoring replacement");
                } else {
                    // a canvas the pipeline cannot reduce never replaces the drawing
                    self.downsampler.check(&image).map_err(|e| {
                        log::warn!("Rejected canvas replacement: {}", e);
                        e
                    })?;
                    self.surface.replace(image);
                }
            }
        }
        self.render()
    }

    pub fn upload_model(&mut self, file_name: &str, bytes: Vec<u8>) -> SessionResult<RenderFrame> {
        self.handle(SessionEvent::UploadModel {
            file_name: file_name.to_string(),
            bytes,
        })
    }

    pub fn draw(&mut self, stroke: Stroke) -> SessionResult<RenderFrame> {
        self.handle(SessionEvent::Canvas(CanvasAction::Stroke(stroke)))
    }

    pub fn undo(&mut self) -> SessionResult<RenderFrame> {
        self.handle(SessionEvent::Canvas(CanvasAction::Undo))
    }

    pub fn clear(&mut self) -> SessionResult<RenderFrame> {
        self.handle(SessionEvent::Canvas(CanvasAction::Clear))
    }

    pub fn replace_canvas(&mut self, image: RawCanvasImage) -> SessionResult<RenderFrame> {
        self.handle(SessionEvent::ReplaceCanvas(image))
    }

    /// Full pipeline: canvas -> grid -> prediction
    pub fn render(&mut self) -> SessionResult<RenderFrame> {
        let loaded = match self.model.get() {
            Some(loaded) => loaded,
            None => {
                return Ok(RenderFrame {
                    state: SessionState::NoModel,
                    model: None,
                    strokes: 0,
                    prediction: None,
                    grid: None,
                })
            }
        };

        let mut frame = RenderFrame {
            state: SessionState::ModelLoaded,
            model: Some(loaded.metadata().clone()),
            strokes: self.surface.stroke_count(),
            prediction: None,
            grid: None,
        };

        // nothing drawn yet: no inference
        if self.surface.is_empty() {
            return Ok(frame);
        }

        let grid = self.downsampler.downsample(self.surface.image())?;
        let prediction = model::predict(&grid, loaded.handle()).map_err(|e| {
            log::warn!("Inference failed: {}", e);
            e
        })?;

        self.stats.record(prediction.inference_time_us);
        frame.prediction = Some(prediction);
        frame.grid = Some(grid);
        Ok(frame)
    }
}
