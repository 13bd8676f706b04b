use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use smoke_assets::{AssetPaths, load_gltf};
use smoke_common::{BufferSize, Viewport};
use smoke_render::{CaptureRenderer, DebugTextRenderer, FrameCapture};
use smoke_sketch::{
    Clock, ControlEdit, FrameBudget, FramePacer, IntervalPacer, Sketch, SteppedClock, SystemClock,
    Tweaks, run,
};
use smoke_tools::{SketchInspector, SketchSummary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smoke-cli", about = "Headless runner for the coffee smoke sketch")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the frame loop against a manual clock and print what each frame uploads
    Simulate(SimulateArgs),
    /// Load a model file and list its objects
    InspectModel {
        /// Path to a .glb or .gltf file
        path: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Args, Debug, Clone)]
struct SimulateArgs {
    /// Number of frames to run
    #[arg(short, long, default_value = "10")]
    frames: u64,
    /// Frame rate of the manual clock
    #[arg(long, default_value = "60")]
    fps: f32,
    /// Time multiplier (0 to 10)
    #[arg(long, default_value = "1")]
    speed: f32,
    /// Smoke opacity (0 to 1)
    #[arg(long, default_value = "1")]
    opacity: f32,
    /// Show the unshaped noise
    #[arg(long)]
    raw: bool,
    /// Draw the smoke as a wireframe
    #[arg(long)]
    wireframe: bool,
    /// Viewport width in logical pixels
    #[arg(long, default_value = "1280")]
    width: f64,
    /// Viewport height in logical pixels
    #[arg(long, default_value = "720")]
    height: f64,
    /// Device pixel ratio
    #[arg(long, default_value = "1")]
    pixel_ratio: f64,
    /// Load bakedModel.glb and perlin.png from this directory first
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Pace frames with the wall clock instead of stepping
    #[arg(long)]
    realtime: bool,
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

/// JSON output of `simulate`.
#[derive(Debug, Serialize)]
struct SimulationReport {
    tweaks: Tweaks,
    aspect: f32,
    buffer: BufferSize,
    summary: SketchSummary,
    frames: Vec<FrameCapture>,
}

fn build_sketch(args: &SimulateArgs) -> Sketch {
    let mut sketch = Sketch::new(Viewport::default());
    sketch.resize(Viewport::new(args.width, args.height, args.pixel_ratio));

    for edit in [
        ControlEdit::Speed(args.speed),
        ControlEdit::Opacity(args.opacity),
        ControlEdit::Raw(args.raw),
        ControlEdit::Wireframe(args.wireframe),
    ] {
        sketch.apply(edit);
    }

    if let Some(dir) = &args.assets {
        tracing::info!(dir = %dir.display(), "loading assets before simulating");
        sketch.load_assets(&AssetPaths::new(dir));
        sketch.wait_for_assets();
    }
    sketch
}

fn drive<R: smoke_render::Renderer>(
    sketch: &mut Sketch,
    args: &SimulateArgs,
    renderer: &mut R,
    on_frame: impl FnMut(&mut Sketch, R::Output),
) -> u64 {
    let (mut clock, mut pacer): (Box<dyn Clock>, Box<dyn FramePacer>) = if args.realtime {
        (
            Box::new(SystemClock::new()),
            Box::new(IntervalPacer::new(args.fps).with_limit(args.frames)),
        )
    } else {
        (
            Box::new(SteppedClock::new(args.fps)),
            Box::new(FrameBudget::new(args.frames)),
        )
    };
    tracing::info!(
        frames = args.frames,
        fps = args.fps,
        realtime = args.realtime,
        "simulating"
    );
    let frames = run(sketch, &mut clock, &mut pacer, renderer, on_frame);
    tracing::debug!(frames, "simulation finished");
    frames
}

fn simulate(args: &SimulateArgs) -> SimulationReport {
    let mut sketch = build_sketch(args);
    let mut renderer = CaptureRenderer::new();
    drive(&mut sketch, args, &mut renderer, |_, _| {});

    let viewport = sketch.viewport();
    SimulationReport {
        tweaks: *sketch.tweaks(),
        aspect: viewport.aspect(),
        buffer: viewport.buffer_size(),
        summary: SketchInspector::summary(&sketch),
        frames: renderer.into_frames(),
    }
}

fn simulate_text(args: &SimulateArgs) -> String {
    let mut sketch = build_sketch(args);
    let mut renderer = DebugTextRenderer::new();
    let mut out = String::new();
    drive(&mut sketch, args, &mut renderer, |_, text| out.push_str(&text));
    out.push_str(&SketchInspector::summary(&sketch).to_string());
    out
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("smoke-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", smoke_assets::crate_info());
            println!("render: {}", smoke_render::crate_info());
            println!("sketch: {}", smoke_sketch::crate_info());
            println!("tools: {}", smoke_tools::crate_info());
            println!("input: {}", smoke_input::crate_info());
            println!("uniforms: {}", smoke_scene::UNIFORM_NAMES.join(", "));
        }
        Commands::Simulate(args) => match args.format {
            OutputFormat::Json => {
                let report = simulate(&args);
                let json = serde_json::to_string_pretty(&report)
                    .context("serialize simulation report")?;
                println!("{json}");
            }
            OutputFormat::Text => println!("{}", simulate_text(&args)),
        },
        Commands::InspectModel { path, json } => {
            tracing::info!(path = %path.display(), "inspecting model");
            let model =
                load_gltf(&path).with_context(|| format!("load model {}", path.display()))?;
            let report = SketchInspector::model_report(&model);
            if !report.baked_found {
                tracing::warn!(path = %path.display(), "model has no baked object");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}
