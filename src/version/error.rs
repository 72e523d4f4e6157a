use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Query for {package} failed: {payload}")]
    QueryFailure { package: String, payload: String },

    #[error("Invalid response for {package}: {source}")]
    InvalidResponse {
        package: String,
        #[source]
        source: serde_json::Error,
    },
}
