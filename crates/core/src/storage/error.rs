//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend is missing required credentials or paths.
    #[error("storage backend not configured: {0}")]
    Unconfigured(String),

    /// Filename extension is not in the allow-set.
    #[error("file type not allowed: {filename}")]
    DisallowedType {
        /// The rejected filename.
        filename: String,
    },

    /// File size exceeds the configured maximum.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Object not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Operation exceeded its bounded timeout.
    #[error("storage operation timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed.
        secs: u64,
    },

    /// Transport-level failure (network, connection reset, rate limit).
    #[error("storage transport failure: {0}")]
    TransportFailure(String),

    /// The provider accepted the request and refused it.
    #[error("storage provider rejected request: {0}")]
    ProviderRejected(String),

    /// A stored reference could not be mapped back to an object key.
    #[error("invalid storage reference: {0}")]
    InvalidReference(String),
}

impl StorageError {
    /// Returns true for failures worth one more attempt over another
    /// transport. Rejections and validation failures are final.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::TransportFailure(_))
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Unconfigured(err.to_string()),
            opendal::ErrorKind::Unexpected | opendal::ErrorKind::RateLimited => {
                Self::TransportFailure(err.to_string())
            }
            _ => Self::ProviderRejected(err.to_string()),
        }
    }
}
