use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use scanlab_core::emotion::infrastructure::mesh_overlay::FaceMeshOverlay;
use scanlab_core::emotion::infrastructure::onnx_face_mesh_provider::{
    OnnxFaceMeshProvider, DEFAULT_CONFIDENCE,
};
use scanlab_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use scanlab_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use scanlab_core::pipeline::detect_emotion_use_case::DetectEmotionUseCase;
use scanlab_core::pipeline::detect_region_use_case::DetectRegionUseCase;
use scanlab_core::pipeline::pipeline_logger::{
    NullPipelineLogger, PipelineLogger, StdoutPipelineLogger,
};
use scanlab_core::region::infrastructure::threshold_region_detector::ThresholdRegionDetector;
use scanlab_core::shared::analysis_result::AnalysisResult;
use scanlab_core::shared::constants::{
    FACE_MESH_MODEL_NAME, FACE_MODEL_NAME, FACE_MODEL_URL, IMAGE_EXTENSIONS,
};
use scanlab_core::shared::model_resolver;

/// Facial expression and bright-region analysis for still images.
#[derive(Parser)]
#[command(name = "scanlab")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the result as a JSON object instead of `path<TAB>label`.
    #[arg(long, global = true)]
    json: bool,

    /// Log a per-stage timing summary.
    #[arg(long, global = true)]
    timings: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the facial expression and draw the face mesh.
    Emotion(EmotionArgs),
    /// Outline the largest hyperintense region and blend a heat map.
    Region(RegionArgs),
}

#[derive(Args)]
struct EmotionArgs {
    /// Input image file.
    input: PathBuf,

    /// Directory searched for models not yet in the cache.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Face detection model (overrides resolution).
    #[arg(long)]
    face_model: Option<PathBuf>,

    /// Face mesh landmark model (overrides resolution).
    #[arg(long)]
    mesh_model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,
}

#[derive(Args)]
struct RegionArgs {
    /// Input image file.
    input: PathBuf,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    processed_image_path: Option<&'a Path>,
    label: String,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.timings { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli.command)?;
    let logger: Box<dyn PipelineLogger> = if cli.timings {
        Box::new(StdoutPipelineLogger::new())
    } else {
        Box::new(NullPipelineLogger)
    };

    let output = match &cli.command {
        Command::Emotion(args) => {
            let mut use_case = build_emotion_use_case(args)?.with_logger(logger);
            render(&use_case.execute(&args.input), cli.json)?
        }
        Command::Region(args) => {
            let mut use_case = DetectRegionUseCase::new(
                Box::new(ImageFileReader::new()),
                Box::new(ImageFileWriter::new()),
                Box::new(ThresholdRegionDetector::new()),
            )
            .with_logger(logger);
            render(&use_case.execute(&args.input), cli.json)?
        }
    };

    println!("{output}");
    Ok(())
}

fn build_emotion_use_case(
    args: &EmotionArgs,
) -> Result<DetectEmotionUseCase, Box<dyn std::error::Error>> {
    let bundled = args.models_dir.as_deref();

    let face_model = match &args.face_model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {FACE_MODEL_NAME}");
            model_resolver::resolve(
                FACE_MODEL_NAME,
                Some(FACE_MODEL_URL),
                bundled,
                Some(Box::new(download_progress)),
            )?
        }
    };
    let mesh_model = match &args.mesh_model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {FACE_MESH_MODEL_NAME}");
            model_resolver::resolve(FACE_MESH_MODEL_NAME, None, bundled, None)?
        }
    };

    let provider = OnnxFaceMeshProvider::new(&face_model, &mesh_model, args.confidence)?;
    Ok(DetectEmotionUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        Box::new(provider),
        Box::new(FaceMeshOverlay::new()),
    ))
}

fn render<L: Display>(
    result: &AnalysisResult<L>,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    if !json {
        return Ok(result.to_string());
    }
    let body = JsonResult {
        processed_image_path: result.processed_image_path.as_deref(),
        label: result.label.to_string(),
    };
    Ok(serde_json::to_string(&body)?)
}

fn validate(command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    let input = match command {
        Command::Emotion(args) => &args.input,
        Command::Region(args) => &args.input,
    };
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !is_image(input) {
        log::warn!(
            "{} has no recognized image extension; decoding may fail",
            input.display()
        );
    }

    if let Command::Emotion(args) = command {
        if !(0.0..=1.0).contains(&args.confidence) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {}",
                args.confidence
            )
            .into());
        }
        for model in [&args.face_model, &args.mesh_model].into_iter().flatten() {
            if !model.exists() {
                return Err(format!("Model file not found: {}", model.display()).into());
            }
        }
        if let Some(dir) = &args.models_dir {
            if !dir.is_dir() {
                return Err(format!("Models directory not found: {}", dir.display()).into());
            }
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
