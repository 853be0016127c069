//! INA3221 sensors exposed through sysfs.

mod discovery;
mod power;

pub use discovery::{SensorDiscovery, LEGACY_DRIVER_PATH, ORIN_HWMON_PATH};
pub use power::SysfsPower;
