mod commands;
mod config;
mod logging;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use jetpower_meter::Topology;

use commands::run::OutputFormat;
use config::{ConfigOverrides, LogLevel, UserConfig};
use logging::LogMode;

#[derive(Debug, Args)]
struct MeterArgs {
    /// Seconds spent sampling the idle board before the workload starts
    #[arg(long, value_name = "SECONDS")]
    idle_duration: Option<f64>,

    /// Number of idle samples averaged into the baseline
    #[arg(long, value_name = "COUNT")]
    idle_samples: Option<u32>,

    /// Sampling rate while the workload runs
    #[arg(short = 'r', long, value_name = "HZ")]
    sampling_rate: Option<f64>,

    /// Sensor layout (orin, legacy)
    #[arg(short, long)]
    platform: Option<Topology>,

    /// Directory sensor paths are resolved against (default: /)
    #[arg(long, value_name = "PATH")]
    sensor_root: Option<PathBuf>,
}

impl MeterArgs {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            idle_load_duration_secs: self.idle_duration,
            idle_load_samples: self.idle_samples,
            sampling_rate_hz: self.sampling_rate,
            platform: self.platform,
            sensor_root: self.sensor_root,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Measure the energy consumed by a command
    ///
    /// Calibrates the idle baseline first, so keep the board quiet until the
    /// command starts. Example: jetpower run -- stress --cpu 6 -t 5
    #[command(alias = "r")]
    Run {
        #[command(flatten)]
        meter: MeterArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Compact JSON output (single line)
        #[arg(short, long, requires = "json")]
        compact: bool,

        /// Command to run, followed by its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List discovered power channels with a live reading
    #[command(alias = "ls")]
    Channels {
        #[command(flatten)]
        meter: MeterArgs,
    },

    /// Estimate the idle power baseline only
    Baseline {
        #[command(flatten)]
        meter: MeterArgs,
    },

    /// Validate and show the measurement settings from the config file
    Config {
        /// Print config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults
        #[arg(long, conflicts_with = "path")]
        reset: bool,
    },
}

/// Energy measurement for Jetson workloads
/// Samples the INA3221 power monitors while a command runs and reports the
/// energy it used, with and without the board's idle draw.
#[derive(Debug, Parser)]
#[command(name = "jetpower", version, verbatim_doc_comment)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut config = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);
    let log_mode = LogMode::from_config(config.log_to_file);

    match cli.command {
        Commands::Run {
            meter,
            json,
            compact,
            command,
        } => {
            let _guard = logging::init(config.log_level, log_mode, log_level_override);
            config.merge_with_args(meter.into_overrides());
            let format = if json {
                OutputFormat::Json { compact }
            } else {
                OutputFormat::Human
            };
            runtime()?.block_on(commands::run::run(&config, command, format))
        }
        Commands::Channels { meter } => {
            let _guard = logging::init(config.log_level, log_mode, log_level_override);
            config.merge_with_args(meter.into_overrides());
            commands::channels::run(&config)
        }
        Commands::Baseline { meter } => {
            let _guard = logging::init(config.log_level, log_mode, log_level_override);
            config.merge_with_args(meter.into_overrides());
            runtime()?.block_on(commands::baseline::run(&config))
        }
        Commands::Config { path, reset } => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::config::run(path, reset)
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
