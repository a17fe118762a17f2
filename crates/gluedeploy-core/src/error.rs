//! Error types for provisioning operations

use gluedeploy_config::ConfigError;
use thiserror::Error;

/// Error codes for programmatic handling and log searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Required configuration missing or invalid
    E001InvalidConfig,
    /// E002: Object storage call failed
    E002ObjectStore,
    /// E003: Catalog call failed
    E003Catalog,
    /// E004: Asset download failed
    E004AssetFetch,
    /// E005: Response could not be delivered to CloudFormation
    E005Callback,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001InvalidConfig => "E001",
            Self::E002ObjectStore => "E002",
            Self::E003Catalog => "E003",
            Self::E004AssetFetch => "E004",
            Self::E005Callback => "E005",
        }
    }
}

/// Errors raised by collaborators and provisioning steps
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Invocation configuration is incomplete; no step ran
    #[error("[{code}] Invalid configuration: {source}")]
    Config {
        code: &'static str,
        #[source]
        source: ConfigError,
    },

    /// Object storage verb failed
    #[error("[{code}] Object storage {operation} failed for '{target}': {reason}")]
    ObjectStore {
        code: &'static str,
        operation: &'static str,
        target: String,
        reason: String,
    },

    /// Catalog verb failed
    #[error("[{code}] Catalog {operation} failed for '{target}': {reason}")]
    Catalog {
        code: &'static str,
        operation: &'static str,
        target: String,
        reason: String,
    },

    /// Asset could not be downloaded from its source URL
    #[error("[{code}] Failed to fetch '{url}': {reason}")]
    Fetch {
        code: &'static str,
        url: String,
        reason: String,
    },

    /// Response delivery to the pre-signed URL failed
    #[error("[{code}] Failed to deliver response to CloudFormation: {reason}")]
    Callback { code: &'static str, reason: String },
}

impl ProvisionError {
    /// Create an object storage error with error code
    pub fn object_store(
        operation: &'static str,
        target: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::ObjectStore {
            code: ErrorCode::E002ObjectStore.as_str(),
            operation,
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a catalog error with error code
    pub fn catalog(operation: &'static str, target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Catalog {
            code: ErrorCode::E003Catalog.as_str(),
            operation,
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an asset fetch error with error code
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            code: ErrorCode::E004AssetFetch.as_str(),
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a callback delivery error with error code
    pub fn callback(reason: impl ToString) -> Self {
        Self::Callback {
            code: ErrorCode::E005Callback.as_str(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { code, .. }
            | Self::ObjectStore { code, .. }
            | Self::Catalog { code, .. }
            | Self::Fetch { code, .. }
            | Self::Callback { code, .. } => code,
        }
    }
}

impl From<ConfigError> for ProvisionError {
    fn from(source: ConfigError) -> Self {
        Self::Config {
            code: ErrorCode::E001InvalidConfig.as_str(),
            source,
        }
    }
}

/// Result type alias for ProvisionError
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_codes() {
        let err = ProvisionError::object_store("PutObject", "srcbkt/a.xml", "AccessDenied");
        assert_eq!(err.code(), "E002");
        assert_eq!(
            err.to_string(),
            "[E002] Object storage PutObject failed for 'srcbkt/a.xml': AccessDenied"
        );

        let err: ProvisionError = ConfigError::MissingParameter {
            key: "src_bucket".to_string(),
        }
        .into();
        assert_eq!(err.code(), "E001");
        assert!(err.to_string().contains("src_bucket"));
    }
}
