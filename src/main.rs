// src/main.rs - extruplan command line
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use extruplan_rs::job::render_segments;
use extruplan_rs::report::{profiles_table, summary_table};
use extruplan_rs::{
    AdjustmentSummary, CompensationStrategy, DecayModel, JobFormat, PlannerConfig, load_config,
    load_segments, save_segments,
};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "extruplan", version, about = "Flow-aware feed rate planning for extrusion moves")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Adjust feed rates of a segment file
    Plan {
        /// Planner TOML; built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Segments as a .json array or .toml [[segments]] tables
        #[arg(short, long)]
        segments: PathBuf,
        /// Write adjusted segments here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        window: Option<usize>,
        #[arg(long)]
        strategy: Option<CompensationStrategy>,
        #[arg(long)]
        decay: Option<DecayModel>,
        /// Print a before/after table to stderr
        #[arg(long)]
        summary: bool,
    },
    /// List hotend and material presets
    Profiles,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_plan(
    config: Option<PathBuf>,
    segments: PathBuf,
    output: Option<PathBuf>,
    window: Option<usize>,
    strategy: Option<CompensationStrategy>,
    decay: Option<DecayModel>,
    summary: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let mut config = match config {
        Some(path) => load_config(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(window) = window {
        config.planner.lookahead_window = window;
    }
    if let Some(strategy) = strategy {
        config.planner.compensation_strategy = strategy;
    }
    if let Some(decay) = decay {
        config.planner.decay_model = decay;
    }
    let resolved = config.resolve()?;
    let planner = resolved.planner;
    tracing::info!("Using {}", planner);

    let original = load_segments(&segments)?;
    let adjusted = planner.process(&original, &resolved.hotend, &resolved.material);

    match output {
        Some(path) => save_segments(path, &adjusted)?,
        None => println!("{}", render_segments(&adjusted, JobFormat::Json)?),
    }

    if summary {
        let stats = AdjustmentSummary::compare(&original, &adjusted, &resolved.hotend);
        eprint!(
            "{}",
            summary_table(&stats, &planner, &resolved.hotend, &resolved.material)
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    match cli.command {
        Command::Plan {
            config,
            segments,
            output,
            window,
            strategy,
            decay,
            summary,
        } => run_plan(config, segments, output, window, strategy, decay, summary),
        Command::Profiles => {
            print!("{}", profiles_table());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("extruplan failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
