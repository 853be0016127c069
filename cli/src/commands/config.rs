use std::fmt::Write;

use color_eyre::eyre::{Result, WrapErr};
use jetpower_meter::ConfigError;

use crate::config::{config_path, UserConfig};

pub fn run(path: bool, reset: bool) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        UserConfig::default().save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    let config = if config_file.exists() {
        println!("Config file: {}", config_file.display());
        UserConfig::load_from(&config_file)
            .wrap_err_with(|| format!("Failed to read {}", config_file.display()))?
    } else {
        println!("Config file: {} (not found, using defaults)", config_file.display());
        UserConfig::default()
    };
    println!();

    let summary = describe(&config).wrap_err("Config holds invalid measurement settings")?;
    print!("{}", summary);

    Ok(())
}

/// Renders the settings a measurement would run with, after validation.
fn describe(config: &UserConfig) -> Result<String, ConfigError> {
    let (calibrator, rate) = config.meter_config().validate()?;
    let mut out = String::new();

    let _ = writeln!(out, "Platform: {}", config.platform);
    let _ = writeln!(out, "Sensor root: {}", config.sensor_root.display());
    let _ = writeln!(
        out,
        "Idle calibration: {} samples over {:.1} s (one every {:.1} ms)",
        calibrator.samples(),
        calibrator.duration().as_secs_f64(),
        calibrator.duration().as_secs_f64() * 1000.0 / f64::from(calibrator.samples())
    );
    let _ = writeln!(
        out,
        "Sampling: {:.1} Hz (every {:.1} ms)",
        rate.hz(),
        rate.interval().as_secs_f64() * 1000.0
    );
    let _ = writeln!(
        out,
        "Logging: {:?}{}",
        config.log_level,
        if config.log_to_file { ", also to file" } else { "" }
    );

    Ok(out)
}
