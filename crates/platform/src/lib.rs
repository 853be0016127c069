//! Power channel discovery and sampling for jetpower.
//!
//! This crate finds the INA3221 power monitors a Jetson-class board exposes
//! through sysfs and turns them into instantaneous total-power readings.
//!
//! # Topologies
//!
//! - [`Topology::Orin`] - a fixed hwmon node with paired current and voltage
//!   inputs; power is `current * voltage / 1000`
//! - [`Topology::Legacy`] - the `ina3221x` IIO driver with `in_power*_input`
//!   files that already report milliwatts
//!
//! # Example
//!
//! ```no_run
//! use jetpower_platform::{PowerSource, SensorDiscovery, SysfsPower, Topology};
//!
//! let discovery = SensorDiscovery::new("/", Topology::Orin);
//! let power = SysfsPower::discover(&discovery);
//! println!("{} mW", power.instant_power_mw()?);
//! # Ok::<(), jetpower_platform::ReadError>(())
//! ```

mod channel;
mod error;
mod power;
mod sysfs;
mod types;

pub use channel::{read_sensor_value, Channel, ChannelSet};
pub use error::ReadError;
pub use power::PowerSource;
pub use sysfs::{SensorDiscovery, SysfsPower, LEGACY_DRIVER_PATH, ORIN_HWMON_PATH};
pub use types::Topology;
