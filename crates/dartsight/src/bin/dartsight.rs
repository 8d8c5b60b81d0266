//! dartsight CLI: locate a throw from four image files, dump the default
//! configuration, or check a rig by projecting a known point.

use clap::{Args, Parser, Subcommand};
use dartsight::detect::{self, PngDumpObserver};
use dartsight::stereo::FrameAligner;
use dartsight::{DartLocator, LocateReport, LocatorConfig, StereoPair};
use log::LevelFilter;
use nalgebra::Point3;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dartsight")]
#[command(about = "Locate a dart on a target from two calibrated cameras")]
#[command(version)]
struct Cli {
    /// Log verbosity (off, error, warn, info, debug, trace). `RUST_LOG`
    /// overrides it when built with the `tracing` feature.
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate one throw from base and post-throw images of both cameras.
    Locate(LocateArgs),

    /// Write the default configuration as JSON.
    DefaultConfig {
        /// Output path. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Project a point given in camera 1's frame into both cameras.
    Project {
        /// Point coordinates `X Y Z` in camera 1's frame.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        point: Vec<f64>,

        /// Configuration JSON. Defaults to the built-in rig.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct LocateArgs {
    /// Camera 1 frame before the throw.
    #[arg(long)]
    base1: PathBuf,
    /// Camera 2 frame before the throw.
    #[arg(long)]
    base2: PathBuf,
    /// Camera 1 frame after the throw.
    #[arg(long)]
    post1: PathBuf,
    /// Camera 2 frame after the throw.
    #[arg(long)]
    post2: PathBuf,

    /// Configuration JSON. Defaults to the built-in rig.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for per-stage mask PNGs and tip overlays.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Path to write a JSON report of the run.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    match cli.command {
        Commands::Locate(args) => run_locate(&args),
        Commands::DefaultConfig { out } => run_default_config(out.as_deref()),
        Commands::Project { point, config } => run_project(&point, config.as_deref()),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(level: LevelFilter) -> CliResult<()> {
    dartsight::core::init_tracing(false, level);
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter) -> CliResult<()> {
    dartsight::core::init_with_level(level)?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<LocatorConfig> {
    match path {
        Some(path) => Ok(LocatorConfig::load_json(path)?),
        None => Ok(LocatorConfig::default()),
    }
}

fn run_locate(args: &LocateArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let locator = DartLocator::new(config)?;

    let base = StereoPair::new(
        detect::load_frame(&args.base1)?,
        detect::load_frame(&args.base2)?,
    );
    let post = StereoPair::new(
        detect::load_frame(&args.post1)?,
        detect::load_frame(&args.post2)?,
    );

    let mut report = LocateReport::new();
    let mut dump = match &args.debug_dir {
        Some(dir) => Some(PngDumpObserver::new(dir)?),
        None => None,
    };
    let result = match dump.as_mut() {
        Some(dump) => {
            let mut both = (&mut report, dump);
            locator.locate_with_observer(&base, &post, &mut both)
        }
        None => locator.locate_with_observer(&base, &post, &mut report),
    };
    report.finish(&result);

    if let Some(dump) = &dump {
        log::info!(
            "wrote {} debug images ({} failed)",
            dump.written().len(),
            dump.failures()
        );
    }
    if let Some(path) = &args.report {
        report.write_json(path)?;
        log::info!("wrote report to {}", path.display());
    }

    match result? {
        Some(dart) => println!("{:.3} {:.3}", dart.landing.x, dart.landing.z),
        None => println!("miss"),
    }
    Ok(())
}

fn run_default_config(out: Option<&Path>) -> CliResult<()> {
    let config = LocatorConfig::default();
    match out {
        Some(path) => {
            config.write_json(path)?;
            log::info!("wrote default config to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

fn run_project(point: &[f64], config: Option<&Path>) -> CliResult<()> {
    let [x, y, z] = point else {
        return Err("--point takes exactly three values".into());
    };
    let config = load_config(config)?;
    let p = Point3::new(*x, *y, *z);
    // Poses map the world frame into each camera; camera 1's pose takes the
    // world into camera 1's frame, so go back through its inverse.
    let world = config.cameras.first.pose.inverse().apply(&p);

    for (camera, model) in config.cameras.iter() {
        let depth = model.depth(&world);
        match model.project(&world) {
            Some(px) => println!(
                "{camera}: ({:.2}, {:.2}) depth {:.3}{}",
                px.x,
                px.y,
                depth,
                if depth < 0.0 { " (behind camera)" } else { "" }
            ),
            None => println!("{camera}: in the focal plane"),
        }
    }

    let landing = FrameAligner::from_config(&config.alignment).landing(&p);
    println!("landing: ({:.3}, {:.3})", landing.x, landing.z);
    Ok(())
}
