use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use jetpower_platform::{PowerSource, ReadError};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::ConfigError;

/// Idle power draw in milliwatts, subtracted from every workload sample.
///
/// Only a finished calibration produces one; there is no public constructor.
///
/// ```compile_fail
/// let baseline = jetpower_meter::Baseline::from_mw(1500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Baseline(f64);

impl Baseline {
    pub(crate) fn from_mw(milliwatts: f64) -> Self {
        Self(milliwatts)
    }

    pub fn mw(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} mW", self.0)
    }
}

/// Estimates the board's idle draw before any workload starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineCalibrator {
    duration: Duration,
    samples: NonZeroU32,
}

impl BaselineCalibrator {
    pub fn new(duration_secs: f64, samples: u32) -> Result<Self, ConfigError> {
        let samples = NonZeroU32::new(samples).ok_or(ConfigError::ZeroSamples)?;
        let duration = Duration::try_from_secs_f64(duration_secs)
            .map_err(|_| ConfigError::InvalidDuration(duration_secs))?;
        Ok(Self { duration, samples })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn samples(&self) -> u32 {
        self.samples.get()
    }

    /// Waits `duration / samples` before each reading and returns the mean.
    ///
    /// Only [`PowerMeter::calibrate`](crate::PowerMeter::calibrate) runs this,
    /// before the meter can hand out any monitor.
    ///
    /// ```compile_fail
    /// # async fn idle<S: jetpower_meter::PowerSource>(source: S) {
    /// let calibrator = jetpower_meter::BaselineCalibrator::new(3.0, 10).unwrap();
    /// let _ = calibrator.estimate_idle(&source).await;
    /// # }
    /// ```
    pub(crate) async fn estimate_idle<S: PowerSource>(
        &self,
        source: &S,
    ) -> Result<Baseline, ReadError> {
        info!(
            duration_secs = self.duration.as_secs_f64(),
            samples = self.samples.get(),
            "Estimating background power load, please do not use the system"
        );

        let wait = self.duration / self.samples.get();
        let mut total_mw = 0.0;

        for index in 0..self.samples.get() {
            sleep(wait).await;
            let power_mw = source.instant_power_mw()?;
            debug!(index, power_mw, "Idle sample");
            total_mw += power_mw;
        }

        let baseline = Baseline::from_mw(total_mw / f64::from(self.samples.get()));
        info!(idle_mw = baseline.mw(), "Idle power: {}", baseline);
        Ok(baseline)
    }
}
