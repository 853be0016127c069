use std::path::PathBuf;
use std::time::Duration;

use jetpower_platform::Topology;

use crate::baseline::BaselineCalibrator;
use crate::error::ConfigError;

pub const DEFAULT_IDLE_LOAD_DURATION_SECS: f64 = 3.0;
pub const DEFAULT_IDLE_LOAD_SAMPLES: u32 = 10;
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 30.0;

/// Construction-time settings for a [`PowerMeter`](crate::PowerMeter).
#[derive(Debug, Clone, PartialEq)]
pub struct MeterConfig {
    /// Total time spent sampling the idle board.
    pub idle_load_duration_secs: f64,
    /// Number of idle samples averaged into the baseline.
    pub idle_load_samples: u32,
    /// Sampling frequency while a workload runs.
    pub sampling_rate_hz: f64,
    pub topology: Topology,
    /// Directory standing in for `/` when resolving sensor paths.
    pub sensor_root: PathBuf,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            idle_load_duration_secs: DEFAULT_IDLE_LOAD_DURATION_SECS,
            idle_load_samples: DEFAULT_IDLE_LOAD_SAMPLES,
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
            topology: Topology::default(),
            sensor_root: PathBuf::from("/"),
        }
    }
}

impl MeterConfig {
    /// Checks every numeric setting. Touches no hardware.
    pub fn validate(&self) -> Result<(BaselineCalibrator, SamplingRate), ConfigError> {
        let calibrator =
            BaselineCalibrator::new(self.idle_load_duration_secs, self.idle_load_samples)?;
        let rate = SamplingRate::from_hz(self.sampling_rate_hz)?;
        Ok((calibrator, rate))
    }
}

/// A validated sampling frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingRate {
    interval: Duration,
}

impl SamplingRate {
    pub fn from_hz(hz: f64) -> Result<Self, ConfigError> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ConfigError::InvalidSamplingRate(hz));
        }

        let interval = Duration::try_from_secs_f64(1.0 / hz)
            .map_err(|_| ConfigError::InvalidSamplingRate(hz))?;
        if interval.is_zero() {
            return Err(ConfigError::InvalidSamplingRate(hz));
        }

        Ok(Self { interval })
    }

    /// Nominal wait between samples.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn hz(&self) -> f64 {
        1.0 / self.interval.as_secs_f64()
    }
}

impl Default for SamplingRate {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / DEFAULT_SAMPLING_RATE_HZ),
        }
    }
}
