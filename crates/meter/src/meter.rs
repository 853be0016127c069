use std::ffi::OsStr;
use std::future::Future;

use jetpower_platform::{PowerSource, SensorDiscovery, SysfsPower};

use crate::baseline::{Baseline, BaselineCalibrator};
use crate::config::{MeterConfig, SamplingRate};
use crate::error::{MeterError, Result};
use crate::monitor::{Measurement, WorkloadMonitor};

/// A calibrated power meter.
///
/// Construction runs the idle calibration to completion, so every workload
/// measured through a meter is measured against a finished baseline.
#[derive(Debug)]
pub struct PowerMeter<S = SysfsPower> {
    source: S,
    baseline: Baseline,
    rate: SamplingRate,
}

impl PowerMeter<SysfsPower> {
    /// Validates `config`, discovers the board's channels and calibrates.
    ///
    /// Configuration errors are returned before any sensor file is opened.
    pub async fn from_config(config: &MeterConfig) -> Result<Self> {
        let (calibrator, rate) = config.validate()?;
        let discovery = SensorDiscovery::new(&config.sensor_root, config.topology);
        let source = SysfsPower::discover(&discovery);
        Self::calibrate(source, calibrator, rate).await
    }
}

impl<S: PowerSource> PowerMeter<S> {
    /// Runs the idle calibration on `source` and takes ownership of it.
    ///
    /// This is the only way to obtain a [`Baseline`], and monitors are only
    /// handed out by a finished meter.
    pub async fn calibrate(
        source: S,
        calibrator: BaselineCalibrator,
        rate: SamplingRate,
    ) -> Result<Self> {
        let baseline = calibrator
            .estimate_idle(&source)
            .await
            .map_err(MeterError::Calibration)?;

        Ok(Self {
            source,
            baseline,
            rate,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn sampling_rate(&self) -> SamplingRate {
        self.rate
    }

    /// A fresh monitor for a single workload.
    pub fn monitor(&self) -> WorkloadMonitor<&S> {
        WorkloadMonitor::new(&self.source, self.baseline, self.rate)
    }

    pub async fn measure_command<I, A>(&self, argv: I) -> Result<Measurement>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        self.monitor().measure_command(argv).await
    }

    pub async fn measure_task<F>(&self, task: F) -> Result<Measurement>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.monitor().measure_task(task).await
    }

    pub async fn measure_blocking<F, R>(&self, work: F) -> Result<Measurement>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.monitor().measure_blocking(work).await
    }
}
