use jetpower_platform::ReadError;

use crate::monitor::EnergyTotals;

/// Rejected measurement settings. Raised before any sensor is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("idle load sample count must be at least 1")]
    ZeroSamples,

    #[error("idle load duration must be a finite, non-negative number of seconds (got {0})")]
    InvalidDuration(f64),

    #[error("sampling rate must be a finite, positive frequency in Hz (got {0})")]
    InvalidSamplingRate(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum MeterError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Idle calibration failed: {0}")]
    Calibration(#[source] ReadError),

    #[error("No command given to measure")]
    EmptyCommand,

    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to poll workload status: {0}")]
    Wait(#[source] std::io::Error),

    /// A channel stopped reading mid-run. `partial` holds the totals as of the
    /// last successful sample; they were not advanced past the failure.
    #[error("Power sample failed after {} samples: {source}", .partial.samples)]
    Sample {
        partial: EnergyTotals,
        #[source]
        source: ReadError,
    },
}

pub type Result<T> = std::result::Result<T, MeterError>;
