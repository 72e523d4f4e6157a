use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerInfoError {
    #[error("File not found: {}", .0.display())]
    LogNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not locate server banner in {} after {attempts} attempts", path.display())]
    ServerNotReady { path: PathBuf, attempts: u32 },

    #[error("Failed to look up server pid on {host}: {message}")]
    PidLookup { host: String, message: String },

    #[error("Failed to write pid file {}: {source}", path.display())]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Package description not found: {}", .0.display())]
    DescriptionNotFound(PathBuf),
}
