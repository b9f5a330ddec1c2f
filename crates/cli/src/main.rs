#![deny(unsafe_code)]
//! Headless CLI for fieldlab.
//!
//! Subcommands:
//! - `render <engine>`: run an engine for N frames and write a PNG snapshot
//! - `run <config.json>`: replay a saved `RunConfig`
//! - `list`: print available engines, colour modes and boundaries
//!
//! Logging goes to stderr through `tracing-subscriber`; `RUST_LOG` overrides
//! the level chosen with `-v`.

mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use error::CliError;
use fieldlab_core::{Boundary, Engine, EngineError, RunConfig, TickDriver};
use fieldlab_engines::pixel::ColorMode;
use fieldlab_engines::{snapshot, EngineKind};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Channel name meaning "the engine's presentation field".
const AUTO_CHANNEL: &str = "auto";

#[derive(Parser)]
#[command(name = "fieldlab", about = "Finite-difference field integrator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an engine for N frames and write a PNG snapshot.
    Render {
        /// Engine name (see `fieldlab list`).
        engine: String,

        /// Grid width in cells.
        #[arg(short = 'W', long, default_value_t = 256)]
        width: usize,

        /// Grid height in cells.
        #[arg(short = 'H', long, default_value_t = 256)]
        height: usize,

        /// Number of presented frames.
        #[arg(short, long, default_value_t = 1)]
        frames: usize,

        /// Engine ticks per frame (default: 200 for turing, 100 otherwise).
        #[arg(short, long)]
        substeps: Option<usize>,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Channel to snapshot ("auto" = presentation field).
        #[arg(short, long, default_value = AUTO_CHANNEL)]
        channel: String,

        /// Colour mode (grayscale, diverging, heat).
        #[arg(long, default_value = "grayscale")]
        color: String,

        /// Lower end of a fixed colour range (requires --max).
        #[arg(long, requires = "max", allow_negative_numbers = true)]
        min: Option<f64>,

        /// Upper end of a fixed colour range (requires --min).
        #[arg(long, requires = "min", allow_negative_numbers = true)]
        max: Option<f64>,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Scan each frame for NaN/∞ and report it.
        #[arg(long)]
        check_finite: bool,

        /// Also save the resolved run config as JSON at this path.
        #[arg(long)]
        save_config: Option<PathBuf>,
    },
    /// Replay a JSON run config.
    Run {
        /// Path to the config file.
        config: PathBuf,
    },
    /// List available engines, colour modes and boundaries.
    List,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs a validated config to completion and writes its snapshot.
/// Returns a JSON summary of the run.
fn execute(config: &RunConfig) -> Result<Value, CliError> {
    config.validate()?;
    let color = ColorMode::from_name(&config.color).ok_or_else(|| {
        let names: Vec<_> = ColorMode::ALL.iter().map(|m| m.name()).collect();
        CliError::Input(format!(
            "unknown colour mode '{}' (expected one of: {})",
            config.color,
            names.join(", ")
        ))
    })?;

    let engine = EngineKind::from_name(
        &config.engine,
        config.width,
        config.height,
        config.seed,
        &config.params,
    )?;
    if config.channel != AUTO_CHANNEL {
        engine.channel_by_name(&config.channel)?;
    }

    let substeps = config
        .substeps
        .unwrap_or_else(|| EngineKind::default_substeps(&config.engine));
    let mut driver =
        TickDriver::new(engine, substeps).with_divergence_check(config.check_finite);
    let last = driver.run_frames(config.frames)?;

    let field = if config.channel == AUTO_CHANNEL {
        driver.present()
    } else {
        driver.engine().channel_by_name(&config.channel)?
    };
    let range = config.range.map(|[lo, hi]| (lo, hi));
    snapshot::write_png(field, color, range, &config.output)?;

    let non_finite = last.and_then(|r| r.non_finite);
    info!(
        engine = %config.engine,
        frames = driver.frames(),
        ticks = driver.ticks(),
        output = %config.output.display(),
        "run finished"
    );
    Ok(json!({
        "engine": config.engine,
        "width": config.width,
        "height": config.height,
        "seed": config.seed,
        "frames": driver.frames(),
        "substeps": substeps,
        "ticks": driver.ticks(),
        "time": driver.engine().time(),
        "channel": config.channel,
        "color": color.name(),
        "non_finite": non_finite,
        "params": driver.engine().params(),
        "output": config.output.display().to_string(),
    }))
}

fn report(summary: &Value, json_mode: bool) -> Result<(), CliError> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} frames, {} ticks, seed {}) -> {}",
            summary["engine"].as_str().unwrap_or_default(),
            summary["width"],
            summary["height"],
            summary["frames"],
            summary["ticks"],
            summary["seed"],
            summary["output"].as_str().unwrap_or_default(),
        );
        if let Some(n) = summary["non_finite"].as_u64().filter(|&n| n > 0) {
            eprintln!("warning: {n} non-finite samples in the presentation field");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let colors: Vec<_> = ColorMode::ALL.iter().map(|m| m.name()).collect();
            let boundaries: Vec<_> = Boundary::ALL.iter().map(|b| b.name()).collect();
            if cli.json {
                let info = json!({
                    "engines": engines,
                    "colors": colors,
                    "boundaries": boundaries,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Colour modes:");
                println!("  {}", colors.join(", "));
                println!("Boundaries:");
                println!("  {}", boundaries.join(", "));
            }
        }
        Command::Render {
            engine,
            width,
            height,
            frames,
            substeps,
            seed,
            channel,
            color,
            min,
            max,
            params,
            output,
            check_finite,
            save_config,
        } => {
            let params: Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;

            let mut config = RunConfig::new(&engine, width, height, seed);
            config.params = params;
            config.frames = frames;
            config.substeps = substeps;
            config.channel = channel;
            config.color = color;
            config.range = min.zip(max).map(|(lo, hi)| [lo, hi]);
            config.output = output;
            config.check_finite = check_finite;

            let summary = execute(&config)?;
            if let Some(path) = save_config {
                let text = serde_json::to_string_pretty(&config)?;
                std::fs::write(&path, text)
                    .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
            }
            report(&summary, cli.json)?;
        }
        Command::Run { config } => {
            let config = RunConfig::load(&config).map_err(|e| match e {
                EngineError::Io(msg) => CliError::Io(msg),
                other => CliError::Input(other.to_string()),
            })?;
            let summary = execute(&config)?;
            report(&summary, cli.json)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
