use std::path::PathBuf;

/// A discovered sensor file could not be sampled.
///
/// Discovery never produces this: a file missing at discovery time is simply
/// not registered. Once registered, a channel that stops reading cleanly
/// fails the sample instead of contributing a substitute value.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read sensor file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sensor file {path:?} holds a non-numeric value {value:?}")]
    Parse { path: PathBuf, value: String },

    #[error("sensor file {path:?} is empty")]
    Empty { path: PathBuf },
}

impl ReadError {
    /// Path of the sensor file that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            ReadError::Io { path, .. } => path,
            ReadError::Parse { path, .. } => path,
            ReadError::Empty { path } => path,
        }
    }
}
