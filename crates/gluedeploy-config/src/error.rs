//! Resource parameter errors

use thiserror::Error;

/// Fatal configuration errors. Any of these aborts the invocation before a
/// single provisioning step runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required parameter is absent from the environment
    #[error("required parameter '{key}' is not set")]
    MissingParameter { key: String },

    /// A required parameter is present but blank
    #[error("required parameter '{key}' is empty")]
    EmptyParameter { key: String },

    /// A parameter that must be an s3:// URI is not one
    #[error("parameter '{key}' is not a valid s3:// URI: '{value}'")]
    InvalidS3Uri { key: String, value: String },
}

impl ConfigError {
    /// Name of the parameter that caused the error
    pub fn key(&self) -> &str {
        match self {
            Self::MissingParameter { key }
            | Self::EmptyParameter { key }
            | Self::InvalidS3Uri { key, .. } => key,
        }
    }
}
