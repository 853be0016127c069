//! Shared types for power channel discovery and sampling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sensor layout exposed by the board's INA3221 monitors.
///
/// A session picks exactly one topology up front; channel shapes are never
/// mixed within a [`ChannelSet`](crate::ChannelSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Orin-class boards: fixed hwmon node with paired `curr*_input` /
    /// `in*_input` files (milliamps and millivolts).
    #[default]
    Orin,
    /// Older boards using the `ina3221x` IIO driver: `in_power*_input` files
    /// that already report milliwatts.
    Legacy,
}

impl Topology {
    /// Returns a human-readable label for the topology.
    pub fn label(&self) -> &'static str {
        match self {
            Topology::Orin => "Orin (current + voltage)",
            Topology::Legacy => "Legacy (direct power)",
        }
    }

    /// Returns the config/CLI identifier for the topology.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Orin => "orin",
            Topology::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orin" | "a" => Ok(Topology::Orin),
            "legacy" | "b" => Ok(Topology::Legacy),
            other => Err(format!(
                "unknown platform '{}', expected 'orin' or 'legacy'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_labels() {
        assert_eq!(Topology::Orin.label(), "Orin (current + voltage)");
        assert_eq!(Topology::Legacy.label(), "Legacy (direct power)");
        assert_eq!(Topology::default(), Topology::Orin);
    }

    #[test]
    fn test_topology_from_str() {
        assert_eq!("orin".parse::<Topology>(), Ok(Topology::Orin));
        assert_eq!("LEGACY".parse::<Topology>(), Ok(Topology::Legacy));
        assert_eq!("b".parse::<Topology>(), Ok(Topology::Legacy));
        assert!("xavier".parse::<Topology>().is_err());
    }

    #[test]
    fn test_topology_round_trips_through_as_str() {
        for topology in [Topology::Orin, Topology::Legacy] {
            assert_eq!(topology.as_str().parse::<Topology>(), Ok(topology));
        }
    }
}
