// Copyright 2020 TwoCookingMice

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use dacquoise_grid::core::error::{ConfigError, RenderError};
use dacquoise_grid::core::scene::Accelerator;
use dacquoise_grid::core::scene_loader::load_scene_with_settings;
use dacquoise_grid::integrators::path::PathTracer;
use dacquoise_grid::io::exr_utils::ExrDestination;
use dacquoise_grid::renderers::block::{BlockRenderer, Renderer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AcceleratorArg {
    Grid,
    List,
}

impl From<AcceleratorArg> for Accelerator {
    fn from(arg: AcceleratorArg) -> Self {
        match arg {
            AcceleratorArg::Grid => Accelerator::Grid,
            AcceleratorArg::List => Accelerator::List,
        }
    }
}

/// Renders one sensor of an XML scene into an OpenEXR file.
#[derive(Parser)]
#[command(name = "dacquoise-grid")]
#[command(about = "A block-scheduled Monte Carlo path tracer")]
struct Args {
    /// Scene description
    scene: PathBuf,

    #[arg(short, long, default_value = "output.exr", help = "Output OpenEXR file")]
    output: PathBuf,

    #[arg(short, long, help = "Worker threads (defaults to the scene setting or all cores)")]
    jobs: Option<usize>,

    #[arg(long, help = "Seed of the root random generator")]
    seed: Option<u64>,

    #[arg(long, help = "Samples per pixel")]
    spp: Option<usize>,

    #[arg(long, help = "Maximum number of path edges")]
    max_depth: Option<usize>,

    #[arg(long, help = "Write a partial image after every N merged blocks")]
    emit_every: Option<usize>,

    #[arg(long, value_enum, help = "Spatial index for ray queries")]
    accelerator: Option<AcceleratorArg>,

    #[arg(long, default_value_t = 0, help = "Index of the sensor to render")]
    sensor: usize,

    #[arg(long, value_enum, default_value = "info", help = "Set the logging level")]
    log_level: LogLevel,

    #[arg(long, help = "Hide the progress bar")]
    no_progress: bool,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let description = load_scene_with_settings(&args.scene, args.accelerator.map(Accelerator::from))?;
    let scene = description.scene;

    let mut path_config = description.path_config;
    if let Some(max_depth) = args.max_depth {
        path_config.max_edges = max_depth;
    }

    let mut options = description.render_options;
    if let Some(jobs) = args.jobs {
        options.jobs = jobs;
    }
    if let Some(seed) = args.seed {
        options.seed = seed;
    }
    if let Some(spp) = args.spp {
        if spp == 0 {
            return Err(ConfigError::invalid("--spp", "0", "must be positive").into());
        }
        options.sample_count = spp;
    }
    if args.emit_every.is_some() {
        options.emit_every = args.emit_every;
    }
    options.show_progress = !args.no_progress;

    let sensor = scene.sensor(args.sensor).ok_or(RenderError::MissingSensor(args.sensor))?;
    let tracer = PathTracer::new(path_config, &scene, sensor)?;
    let renderer = BlockRenderer::new(Box::new(tracer), description.sampler, options);

    let mut destination = ExrDestination::new(&args.output);
    renderer.render(&scene, args.sensor, Some(&mut destination))?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
