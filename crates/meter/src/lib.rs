//! Workload energy measurement for jetpower.
//!
//! A [`PowerMeter`] estimates the board's idle draw once, then measures any
//! number of workloads against it. Each measurement samples total power at a
//! fixed rate while the workload runs and integrates it over wall-clock time,
//! both raw and net of the idle baseline.
//!
//! ```no_run
//! use jetpower_meter::{MeterConfig, PowerMeter};
//!
//! # async fn run() -> jetpower_meter::Result<()> {
//! let meter = PowerMeter::from_config(&MeterConfig::default()).await?;
//! let measurement = meter.measure_command(["stress", "--cpu", "6", "-t", "5"]).await?;
//! let (raw_mws, over_idle_mws, total_secs) = measurement.as_tuple();
//! # Ok(())
//! # }
//! ```

mod baseline;
mod config;
mod error;
mod meter;
mod monitor;
#[cfg(test)]
mod testing;

pub use baseline::{Baseline, BaselineCalibrator};
pub use config::{
    MeterConfig, SamplingRate, DEFAULT_IDLE_LOAD_DURATION_SECS, DEFAULT_IDLE_LOAD_SAMPLES,
    DEFAULT_SAMPLING_RATE_HZ,
};
pub use error::{ConfigError, MeterError, Result};
pub use meter::PowerMeter;
pub use monitor::{EnergyTotals, Measurement, WorkloadMonitor};

pub use jetpower_platform::{PowerSource, Topology};
