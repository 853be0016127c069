use color_eyre::eyre::Result;
use jetpower_platform::{PowerSource, SensorDiscovery, SysfsPower};

use crate::config::UserConfig;

pub fn run(config: &UserConfig) -> Result<()> {
    let discovery = SensorDiscovery::new(&config.sensor_root, config.platform);
    let power = SysfsPower::discover(&discovery);

    println!("jetpower channels");
    println!("{}", "=".repeat(60));
    println!("Platform: {}", power.topology());
    println!("Sensor root: {}", discovery.root().display());

    if power.channels().is_empty() {
        println!("\nNo power channels found.");
        println!("Try --platform legacy on pre-Orin boards, or check --sensor-root.");
        return Ok(());
    }

    for (index, channel) in power.channels().iter().enumerate() {
        println!("\n--- Channel {} ---", index);
        for path in channel.paths() {
            println!("  {}", path.display());
        }
        match channel.read_power_mw() {
            Ok(mw) => println!("  Power: {:.1} mW", mw),
            Err(e) => println!("  Power: unreadable ({})", e),
        }
    }

    println!();
    match power.instant_power_mw() {
        Ok(total) => println!("Total: {:.1} mW", total),
        Err(e) => println!("Total: unreadable ({})", e),
    }

    Ok(())
}
