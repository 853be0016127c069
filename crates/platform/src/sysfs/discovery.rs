use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::channel::{Channel, ChannelSet};
use crate::types::Topology;

/// hwmon node of the Orin INA3221, relative to the sensor root.
pub const ORIN_HWMON_PATH: &str = "sys/bus/i2c/drivers/ina3221/1-0040/hwmon/hwmon3";

/// `ina3221x` driver directory on legacy boards, relative to the sensor root.
pub const LEGACY_DRIVER_PATH: &str = "sys/bus/i2c/drivers/ina3221x";

const ORIN_CHANNELS: usize = 3;
const LEGACY_POWER_INPUTS: usize = 5;
const LEGACY_IIO_DEVICES: usize = 5;
const LEGACY_IIO_DIR: &str = "iio_device";

/// Enumerates the power channels available under a sensor root.
///
/// The root is `/` on a real board; tests point it at a scratch directory
/// laid out like sysfs.
#[derive(Debug, Clone)]
pub struct SensorDiscovery {
    root: PathBuf,
    topology: Topology,
}

impl SensorDiscovery {
    pub fn new(root: impl Into<PathBuf>, topology: Topology) -> Self {
        Self {
            root: root.into(),
            topology,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Scans the sensor tree. Missing files and directories are skipped;
    /// finding nothing yields an empty set rather than an error.
    pub fn discover(&self) -> ChannelSet {
        let channels = match self.topology {
            Topology::Orin => self.discover_orin(),
            Topology::Legacy => self.discover_legacy(),
        };

        if channels.is_empty() {
            warn!(
                root = %self.root.display(),
                topology = self.topology.as_str(),
                "No power channels found, all readings will be 0 mW"
            );
        } else {
            info!(
                count = channels.len(),
                topology = self.topology.as_str(),
                "Found {} power channels",
                channels.len()
            );
        }

        channels
    }

    fn discover_orin(&self) -> ChannelSet {
        let mut channels = ChannelSet::empty(Topology::Orin);
        let hwmon = self.root.join(ORIN_HWMON_PATH);

        for index in 0..ORIN_CHANNELS {
            let current = hwmon.join(format!("curr{}_input", index));
            let voltage = hwmon.join(format!("in{}_input", index));

            if current.exists() && voltage.exists() {
                info!(
                    current = %current.display(),
                    voltage = %voltage.display(),
                    "Channel found"
                );
                channels.push(Channel::CurrentVoltage { current, voltage });
            }
        }

        channels
    }

    fn discover_legacy(&self) -> ChannelSet {
        let mut channels = ChannelSet::empty(Topology::Legacy);
        let base = self.root.join(LEGACY_DRIVER_PATH);

        let mut names = Vec::new();
        collect_dir_names(&base, &mut names);

        let mut probed_folders = HashSet::new();
        let mut registered = HashSet::new();

        for name in names {
            let folder = base.join(&name);
            if !probed_folders.insert(folder.clone()) {
                continue;
            }

            for input in 0..LEGACY_POWER_INPUTS {
                let file = format!("in_power{}_input", input);

                let primary = folder.join(LEGACY_IIO_DIR).join(&file);
                if primary.exists() {
                    register_power(&mut channels, &mut registered, primary);
                } else {
                    let first = folder.join(iio_device_dir(0)).join(&file);
                    if first.exists() {
                        register_power(&mut channels, &mut registered, first);
                    }
                }

                for device in 1..LEGACY_IIO_DEVICES {
                    let alias = folder.join(iio_device_dir(device)).join(&file);
                    if alias.exists() {
                        register_power(&mut channels, &mut registered, alias);
                    }
                }
            }
        }

        channels
    }
}

fn iio_device_dir(index: usize) -> String {
    format!("iio:device{}", index)
}

/// Registers a power file unless the same physical file was already seen
/// under another name (e.g. `iio_device` linking to `iio:deviceN`).
fn register_power(channels: &mut ChannelSet, registered: &mut HashSet<PathBuf>, path: PathBuf) {
    let identity = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    if !registered.insert(identity) {
        debug!(path = %path.display(), "Skipping alias of an already registered channel");
        return;
    }

    info!(path = %path.display(), "Channel found");
    channels.push(Channel::Power { power: path });
}

/// Collects every directory name below `dir`, parents before children.
///
/// Symlinked directories are listed but not descended into; sysfs is full of
/// link cycles.
fn collect_dir_names(dir: &Path, names: &mut Vec<OsString>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut subdirs: Vec<(PathBuf, bool)> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| {
            let is_link = entry
                .file_type()
                .map(|t| t.is_symlink())
                .unwrap_or(false);
            (entry.path(), is_link)
        })
        .collect();
    subdirs.sort();

    for (path, _) in &subdirs {
        if let Some(name) = path.file_name() {
            names.push(name.to_owned());
        }
    }

    for (path, is_link) in &subdirs {
        if !is_link {
            collect_dir_names(path, names);
        }
    }
}
