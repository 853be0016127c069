use color_eyre::eyre::{Result, WrapErr};
use jetpower_meter::PowerMeter;

use crate::config::UserConfig;

pub async fn run(config: &UserConfig) -> Result<()> {
    let meter_config = config.meter_config();

    println!(
        "Sampling idle power for {:.1}s ({} samples)...",
        meter_config.idle_load_duration_secs, meter_config.idle_load_samples
    );
    let meter = PowerMeter::from_config(&meter_config)
        .await
        .wrap_err("Failed to calibrate idle power")?;

    let source = meter.source();
    println!(
        "Idle baseline: {} over {} {} channel(s)",
        meter.baseline(),
        source.channels().len(),
        source.topology()
    );

    Ok(())
}
