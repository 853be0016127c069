//! Power channel descriptors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReadError;
use crate::types::Topology;

/// Divisor turning milliamps × millivolts into milliwatts.
const CURRENT_VOLTAGE_SCALE: f64 = 1000.0;

/// One physical power-measurement source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Paired current and voltage inputs ([`Topology::Orin`]).
    CurrentVoltage { current: PathBuf, voltage: PathBuf },

    /// A single input already reporting milliwatts ([`Topology::Legacy`]).
    Power { power: PathBuf },
}

impl Channel {
    /// Topology this channel shape belongs to.
    pub fn topology(&self) -> Topology {
        match self {
            Channel::CurrentVoltage { .. } => Topology::Orin,
            Channel::Power { .. } => Topology::Legacy,
        }
    }

    /// Files backing this channel, in read order.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Channel::CurrentVoltage { current, voltage } => vec![current, voltage],
            Channel::Power { power } => vec![power],
        }
    }

    /// Reads the channel's instantaneous power in milliwatts.
    ///
    /// Files are re-opened on every call; sensor values are refreshed by the
    /// driver between reads.
    pub fn read_power_mw(&self) -> Result<f64, ReadError> {
        match self {
            Channel::CurrentVoltage { current, voltage } => {
                let current = read_sensor_value(current)?;
                let voltage = read_sensor_value(voltage)?;
                Ok(current * voltage / CURRENT_VOLTAGE_SCALE)
            }
            Channel::Power { power } => read_sensor_value(power),
        }
    }
}

/// Ordered, immutable set of channels sharing one [`Topology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSet {
    topology: Topology,
    channels: Vec<Channel>,
}

impl ChannelSet {
    /// Creates an empty set. Reading an empty set always yields 0 mW.
    pub fn empty(topology: Topology) -> Self {
        Self {
            topology,
            channels: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, channel: Channel) {
        debug_assert_eq!(channel.topology(), self.topology);
        self.channels.push(channel);
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }
}

impl<'a> IntoIterator for &'a ChannelSet {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

/// Reads the first line of a sensor file as a number.
pub fn read_sensor_value(path: &Path) -> Result<f64, ReadError> {
    let content = fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let line = content.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(ReadError::Empty {
            path: path.to_path_buf(),
        });
    }

    line.parse::<f64>().map_err(|_| ReadError::Parse {
        path: path.to_path_buf(),
        value: line.to_string(),
    })
}
