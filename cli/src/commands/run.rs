use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr};
use jetpower_meter::PowerMeter;

use crate::config::UserConfig;
use crate::report::{build_command_report, format_human, platform_summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json { compact: bool },
}

pub async fn run(config: &UserConfig, command: Vec<String>, format: OutputFormat) -> Result<()> {
    let meter_config = config.meter_config();

    let meter = PowerMeter::from_config(&meter_config)
        .await
        .wrap_err("Failed to prepare the power meter")?;

    let started_at = Utc::now();
    let measurement = meter
        .measure_command(&command)
        .await
        .wrap_err_with(|| format!("Failed to measure `{}`", command.join(" ")))?;

    let report = build_command_report(
        started_at,
        command,
        platform_summary(&meter),
        meter.baseline().mw(),
        &measurement,
    );

    match format {
        OutputFormat::Human => print!("{}", format_human(&report)),
        OutputFormat::Json { compact: true } => {
            println!("{}", serde_json::to_string(&report)?)
        }
        OutputFormat::Json { compact: false } => {
            println!("{}", serde_json::to_string_pretty(&report)?)
        }
    }

    Ok(())
}
