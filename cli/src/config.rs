use std::fs;
use std::path::{Path, PathBuf};

use jetpower_meter::{
    MeterConfig, Topology, DEFAULT_IDLE_LOAD_DURATION_SECS, DEFAULT_IDLE_LOAD_SAMPLES,
    DEFAULT_SAMPLING_RATE_HZ,
};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "none" => LogLevel::Off,
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    pub fn as_tracing_level(&self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub idle_load_duration_secs: f64,
    pub idle_load_samples: u32,
    pub sampling_rate_hz: f64,
    pub platform: Topology,
    pub sensor_root: PathBuf,
    pub log_level: LogLevel,
    pub log_to_file: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            idle_load_duration_secs: DEFAULT_IDLE_LOAD_DURATION_SECS,
            idle_load_samples: DEFAULT_IDLE_LOAD_SAMPLES,
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
            platform: Topology::default(),
            sensor_root: PathBuf::from("/"),
            log_level: LogLevel::default(),
            log_to_file: false,
        }
    }
}

/// Command-line overrides for [`UserConfig`]. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub idle_load_duration_secs: Option<f64>,
    pub idle_load_samples: Option<u32>,
    pub sampling_rate_hz: Option<f64>,
    pub platform: Option<Topology>,
    pub sensor_root: Option<PathBuf>,
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("jetpower")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("jetpower")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl UserConfig {
    /// Loads the user's config file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            eprintln!(
                "Warning: ignoring config file {}: {}",
                path.display(),
                e
            );
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn merge_with_args(&mut self, overrides: ConfigOverrides) {
        if let Some(secs) = overrides.idle_load_duration_secs {
            self.idle_load_duration_secs = secs;
        }
        if let Some(samples) = overrides.idle_load_samples {
            self.idle_load_samples = samples;
        }
        if let Some(hz) = overrides.sampling_rate_hz {
            self.sampling_rate_hz = hz;
        }
        if let Some(platform) = overrides.platform {
            self.platform = platform;
        }
        if let Some(root) = overrides.sensor_root {
            self.sensor_root = root;
        }
    }

    pub fn meter_config(&self) -> MeterConfig {
        MeterConfig {
            idle_load_duration_secs: self.idle_load_duration_secs,
            idle_load_samples: self.idle_load_samples,
            sampling_rate_hz: self.sampling_rate_hz,
            topology: self.platform,
            sensor_root: self.sensor_root.clone(),
        }
    }
}
