use tracing::trace;

use crate::channel::ChannelSet;
use crate::error::ReadError;
use crate::power::PowerSource;
use crate::sysfs::SensorDiscovery;
use crate::types::Topology;

/// Reads total board power from discovered INA3221 channels.
#[derive(Debug, Clone)]
pub struct SysfsPower {
    channels: ChannelSet,
}

impl SysfsPower {
    pub fn new(channels: ChannelSet) -> Self {
        Self { channels }
    }

    /// Discovers channels under `root` and wraps them in a reader.
    pub fn discover(discovery: &SensorDiscovery) -> Self {
        Self::new(discovery.discover())
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    pub fn topology(&self) -> Topology {
        self.channels.topology()
    }
}

impl PowerSource for SysfsPower {
    fn instant_power_mw(&self) -> Result<f64, ReadError> {
        let mut total_mw = 0.0;
        for channel in &self.channels {
            total_mw += channel.read_power_mw()?;
        }
        trace!(total_mw, "Sampled instant power");
        Ok(total_mw)
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
