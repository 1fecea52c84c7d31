use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {status} {reason} ({url})")]
    Status {
        status: u16,
        reason: String,
        url: String,
    },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MigrateError {
    /// Network or non-2xx failures talking to a remote API.
    pub fn is_transport(&self) -> bool {
        matches!(self, MigrateError::Http(_) | MigrateError::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
