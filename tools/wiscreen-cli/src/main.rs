//! Wiscreen CLI: calibrate and drive the eye-protection blur from the shell.
//!
//! Usage:
//!   wiscreen calibrate <R1> <R2> <R3>   Store a baseline from three samples
//!   wiscreen blur <RATIO>               Map one face ratio to a blur state
//!   wiscreen reset                      Delete the stored baseline
//!   wiscreen status                     Show calibration state
//!   wiscreen replay <FEED>              Run a recorded detector feed
//!   wiscreen listen                     Follow a live detector feed on stdin
//!   wiscreen config                     Print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wiscreen_model::BlurPreset;

mod commands;

#[derive(Parser)]
#[command(
    name = "wiscreen",
    about = "Face-distance calibration and adaptive eye-protection blur",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/wiscreen/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preference file holding the baseline
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Blur policy preset: blur-behind|render-effect
    #[arg(long, global = true)]
    preset: Option<BlurPreset>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record three calibration samples and store their mean as the baseline
    Calibrate {
        /// Face ratios in [0, 1]
        #[arg(num_args = 3, required = true)]
        ratios: Vec<f64>,
    },

    /// Map a face ratio to a blur state
    Blur {
        /// Face ratio in [0, 1]
        ratio: f64,

        /// Baseline to use instead of the stored one
        #[arg(long)]
        baseline: Option<f64>,

        /// Ratio at which the blur saturates
        #[arg(long)]
        max_ratio: Option<f64>,
    },

    /// Delete the stored baseline
    Reset,

    /// Show calibration state
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a recorded JSONL detector feed through the controller
    Replay {
        /// Path to the feed
        feed: PathBuf,

        /// Start with eye mode enabled
        #[arg(long)]
        eye_mode: bool,

        /// Frame timestamps (ms) at which to capture a calibration sample
        #[arg(long, value_delimiter = ',')]
        calibrate_at: Vec<u64>,
    },

    /// Follow a live detector feed on stdin, keeping only the latest frame
    Listen {
        /// Start with eye mode enabled
        #[arg(long)]
        eye_mode: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config load warnings go out before the configured subscriber exists.
    let ctx = wiscreen_common::logging::with_bootstrap_logging(|| {
        commands::Context::load(cli.config, cli.prefs, cli.preset)
    })?;

    // Initialize logging
    let mut logging = ctx.config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    wiscreen_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Calibrate { ratios } => commands::calibrate::run(&ctx, ratios),
        Commands::Blur {
            ratio,
            baseline,
            max_ratio,
        } => commands::blur::run(&ctx, ratio, baseline, max_ratio),
        Commands::Reset => commands::reset::run(&ctx),
        Commands::Status { json } => commands::status::run(&ctx, json),
        Commands::Replay {
            feed,
            eye_mode,
            calibrate_at,
        } => commands::replay::run(&ctx, feed, eye_mode, calibrate_at),
        Commands::Listen { eye_mode } => commands::listen::run(&ctx, eye_mode).await,
        Commands::Config => commands::config::run(&ctx),
    }
}
