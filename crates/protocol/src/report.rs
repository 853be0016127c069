use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::{MIN_SUPPORTED_VERSION, REPORT_VERSION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkloadSummary {
    /// Argument vector, program first.
    pub command: Vec<String>,
    /// `None` when the command was killed by a signal.
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlatformSummary {
    pub topology: String,
    pub channels: usize,
    pub sampling_rate_hz: f64,
}

/// Energy totals. `*_mws` values are milliwatt-seconds (millijoules).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnergySummary {
    pub raw_mws: f64,
    pub over_idle_mws: f64,
    pub raw_joules: f64,
    pub over_idle_joules: f64,
    pub integrated_secs: f64,
    pub samples: usize,
}

impl EnergySummary {
    pub fn new(raw_mws: f64, over_idle_mws: f64, integrated_secs: f64, samples: usize) -> Self {
        Self {
            raw_mws,
            over_idle_mws,
            raw_joules: raw_mws / 1000.0,
            over_idle_joules: over_idle_mws / 1000.0,
            integrated_secs,
            samples,
        }
    }

    /// Mean power over the integrated window, in milliwatts.
    pub fn average_power_mw(&self) -> Option<f64> {
        if self.integrated_secs > 0.0 {
            Some(self.raw_mws / self.integrated_secs)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub version: u32,
    pub started_at: DateTime<Utc>,
    pub workload: WorkloadSummary,
    pub platform: PlatformSummary,
    pub baseline_mw: f64,
    pub energy: EnergySummary,
    pub total_time_secs: f64,
    pub max_power_mw: Option<f64>,
}

impl MeasurementReport {
    pub fn new(
        started_at: DateTime<Utc>,
        workload: WorkloadSummary,
        platform: PlatformSummary,
        baseline_mw: f64,
        energy: EnergySummary,
        total_time_secs: f64,
        max_power_mw: Option<f64>,
    ) -> Self {
        Self {
            version: REPORT_VERSION,
            started_at,
            workload,
            platform,
            baseline_mw,
            energy,
            total_time_secs,
            max_power_mw,
        }
    }

    pub fn is_supported_version(&self) -> bool {
        (MIN_SUPPORTED_VERSION..=REPORT_VERSION).contains(&self.version)
    }

    /// `(raw mW·s, over-idle mW·s, total seconds)`.
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (
            self.energy.raw_mws,
            self.energy.over_idle_mws,
            self.total_time_secs,
        )
    }
}
