//! Digit Canvas - Main Entry Point

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use digit_canvas::api::commands;
use digit_canvas::constants::{APP_NAME, APP_VERSION};
use digit_canvas::logic::model::OnnxLoader;
use digit_canvas::{PipelineConfig, RenderFrame};

#[derive(Parser, Debug)]
#[command(name = "digit-canvas", version, about = "Classify hand-drawn digits with an ONNX model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a model and print its metadata
    Inspect {
        #[arg(long, env = "DIGIT_MODEL")]
        model: PathBuf,
    },

    /// Predict a drawing stored as an image file
    Predict {
        #[arg(long, env = "DIGIT_MODEL")]
        model: PathBuf,

        /// Canvas image (PNG/JPEG/BMP); sides must be multiples of 28
        #[arg(long)]
        canvas: PathBuf,

        /// Write the upscaled 28x28 grid here (PNG)
        #[arg(long)]
        preview: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Replay a JSON list of canvas actions, rendering after each one
    Replay {
        #[arg(long, env = "DIGIT_MODEL")]
        model: PathBuf,

        /// `[{"type":"stroke","points":[[x,y],...]}, {"type":"undo"}, {"type":"clear"}]`
        #[arg(long)]
        events: PathBuf,

        /// Write the last rendered grid here (PNG)
        #[arg(long)]
        preview: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config = PipelineConfig::from_env();
    log::debug!("Pipeline config: {:?}", config);

    match cli.command {
        Command::Inspect { model } => {
            let metadata = commands::inspect_model_file(&OnnxLoader, &model, config.grid_size)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Command::Predict {
            model,
            canvas,
            preview,
            json,
        } => {
            let scale = config.preview_scale;
            let mut session = commands::open_session(config)?;
            commands::upload_model_file(&mut session, &model)?;

            let frame = commands::predict_canvas_file(&mut session, &canvas)?;
            print_frame(&frame, json)?;
            save_preview(&frame, preview.as_deref(), scale)?;
        }
        Command::Replay {
            model,
            events,
            preview,
            json,
        } => {
            let scale = config.preview_scale;
            let mut session = commands::open_session(config)?;
            let frame = commands::upload_model_file(&mut session, &model)?;
            print_frame(&frame, json)?;

            let actions = commands::load_events(&events)?;
            let frames = commands::replay_events(&mut session, actions)?;
            for frame in &frames {
                print_frame(frame, json)?;
            }
            if let Some(last) = frames.last() {
                save_preview(last, preview.as_deref(), scale)?;
            }

            let stats = session.stats();
            log::info!(
                "Replayed {} events, {} inferences, avg {:.3}ms",
                frames.len(),
                stats.inference_count,
                stats.avg_latency_ms
            );
        }
    }

    Ok(())
}

fn print_frame(frame: &RenderFrame, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(frame)?);
    } else {
        println!("{}", frame);
    }
    Ok(())
}

fn save_preview(frame: &RenderFrame, path: Option<&Path>, scale: usize) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    if commands::write_preview(frame, path, scale)? {
        log::info!("Preview written to {}", path.display());
    } else {
        log::warn!("Nothing drawn, no preview written to {}", path.display());
    }
    Ok(())
}
