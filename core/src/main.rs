//! GPU Essentials - sample runner
//!
//! # Commands
//!
//! - `gpu-essentials list` - List the frame samples
//! - `gpu-essentials run <sample>` - Run a sample in a window
//! - `gpu-essentials headless <sample>` - Render frames off screen, optionally to a PNG
//! - `gpu-essentials add` - Add two random arrays on the GPU and verify the result

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use gpu_essentials::logging::{init_logging, LoggingConfig};
use gpu_essentials::samples::{ArrayAdder, SampleKind};
use gpu_essentials::{app, GpuContext, SampleConfig};

#[derive(Parser)]
#[command(name = "gpu-essentials")]
#[command(about = "Small wgpu samples: compute kernels, triangles, depth and textures")]
#[command(version)]
struct Cli {
    /// JSON config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the frame samples
    List,

    /// Run a sample in a window
    Run(RunArgs),

    /// Render frames off screen
    Headless(HeadlessArgs),

    /// Add two random arrays on the GPU and verify the result
    Add(AddArgs),
}

#[derive(Args)]
struct ViewArgs {
    /// Sample to run
    sample: Option<SampleKind>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Image for the grayscale sample
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    view: ViewArgs,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,
}

#[derive(Args)]
struct HeadlessArgs {
    #[command(flatten)]
    view: ViewArgs,

    /// Number of frames to render
    #[arg(long)]
    frames: Option<u32>,

    /// Write the last frame to this PNG file
    #[arg(long)]
    capture: Option<PathBuf>,
}

#[derive(Args)]
struct AddArgs {
    /// Number of floats in each array
    #[arg(long)]
    length: Option<usize>,
}

impl ViewArgs {
    fn apply(self, config: &mut SampleConfig) {
        if let Some(sample) = self.sample {
            config.sample = sample;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.image.is_some() {
            config.image = self.image;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_verbosity(cli.verbose));

    let mut config = match &cli.config {
        Some(path) => SampleConfig::from_json_file(path)?,
        None => SampleConfig::default(),
    };

    match cli.command {
        Commands::List => {
            for kind in SampleKind::all() {
                println!("{:<10} {}", kind.name(), kind.description());
            }
            Ok(())
        }
        Commands::Run(args) => {
            args.view.apply(&mut config);
            if args.no_vsync {
                config.vsync = false;
            }
            app::run(config)
        }
        Commands::Headless(args) => {
            args.view.apply(&mut config);
            if let Some(frames) = args.frames {
                config.headless_frames = frames;
            }
            if args.capture.is_some() {
                config.capture = args.capture;
            }
            let report = pollster::block_on(app::run_headless(&config))?;
            println!(
                "{}: {} submitted, {} skipped",
                config.sample, report.submitted, report.skipped
            );
            Ok(())
        }
        Commands::Add(args) => {
            if let Some(length) = args.length {
                config.array_length = length;
            }
            add(&config)
        }
    }
}

fn add(config: &SampleConfig) -> Result<()> {
    let ctx = pollster::block_on(GpuContext::new()).context("failed to initialize GPU")?;
    let mut adder = ArrayAdder::new(ctx.device.clone(), ctx.queue.clone(), config.array_length)
        .context("failed to set up adder")?;

    adder.prepare_data(&mut rand::rng())?;
    let result = adder.send_compute_command()?;
    adder.verify_results(&result)?;

    println!("Compute results as expected ({} floats)", adder.len());
    Ok(())
}
