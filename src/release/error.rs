use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    #[error("Invalid release candidate tag '{0}': expected vX.Y.Z-rc")]
    InvalidTag(String),

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("Unrecognized GitHub remote: {0}")]
    UnrecognizedRemote(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Could not locate release for tag: {0}")]
    ReleaseNotFound(String),

    #[error("GitHub API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to read asset {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
