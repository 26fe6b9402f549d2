//! Error types for timer configuration files

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or saving a timer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access timer config {0}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse timer config {0}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("failed to serialize timer config")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid timer config: {reason}")]
    Invalid { reason: String },
}
