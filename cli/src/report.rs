use std::fmt::Write;

use chrono::{DateTime, Utc};
use jetpower_meter::{Measurement, PowerMeter};
use jetpower_platform::SysfsPower;
use jetpower_protocol::{EnergySummary, MeasurementReport, PlatformSummary, WorkloadSummary};

pub fn platform_summary(meter: &PowerMeter<SysfsPower>) -> PlatformSummary {
    PlatformSummary {
        topology: meter.source().topology().as_str().to_string(),
        channels: meter.source().channels().len(),
        sampling_rate_hz: meter.sampling_rate().hz(),
    }
}

pub fn build_command_report(
    started_at: DateTime<Utc>,
    command: Vec<String>,
    platform: PlatformSummary,
    baseline_mw: f64,
    measurement: &Measurement,
) -> MeasurementReport {
    let energy = &measurement.energy;
    MeasurementReport::new(
        started_at,
        WorkloadSummary {
            command,
            exit_code: measurement.exit_code,
        },
        platform,
        baseline_mw,
        EnergySummary::new(
            energy.raw_mws,
            energy.over_idle_mws,
            energy.integrated.as_secs_f64(),
            energy.samples,
        ),
        measurement.total_time.as_secs_f64(),
        measurement.max_power_mw,
    )
}

pub fn format_human(report: &MeasurementReport) -> String {
    let mut out = String::new();
    let energy = &report.energy;

    let _ = writeln!(
        out,
        "Total energy consumption was = {:7.3} J",
        energy.raw_joules
    );
    let _ = writeln!(
        out,
        "Total energy over baseline was = {:7.3} J",
        energy.over_idle_joules
    );
    let _ = writeln!(
        out,
        "Total time running was = {:5.2} s",
        report.total_time_secs
    );
    if let Some(peak) = report.max_power_mw {
        let _ = writeln!(out, "Max power was = {:7.3} W", peak / 1000.0);
    }
    if let Some(average) = energy.average_power_mw() {
        let _ = writeln!(out, "Average power was = {:7.3} W", average / 1000.0);
    }

    let _ = writeln!(
        out,
        "Idle baseline: {:.1} mW over {} channel(s), {} samples at {:.1} Hz",
        report.baseline_mw,
        report.platform.channels,
        energy.samples,
        report.platform.sampling_rate_hz
    );
    if let Some(code) = report.workload.exit_code {
        let _ = writeln!(out, "Exit code: {}", code);
    }

    out
}
