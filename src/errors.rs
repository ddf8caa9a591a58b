//! Error types for artwork-match.

use thiserror::Error;

/// Top-level error type for comparison operations.
#[derive(Debug, Error)]
pub enum ArtmatchError {
    /// Configuration-related errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request fields missing or empty.
    #[error("{0}")]
    Input(String),

    /// Network failure, timeout or non-2xx response.
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// Locator that was being fetched.
        url: String,
        /// Transport or status description.
        reason: String,
    },

    /// Response body could not be decoded as an image.
    #[error("failed to decode image from {url}: {reason}")]
    Decode {
        /// Locator the bytes came from.
        url: String,
        /// Decoder description.
        reason: String,
    },

    /// Fingerprint construction or comparison errors.
    #[error("fingerprint error: {0}")]
    Fingerprint(String),

    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serde serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ArtmatchError {
    /// True for failures that mean "one of the images could not be obtained".
    ///
    /// These are reported as a regular comparison outcome rather than a fault.
    pub fn is_download_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Decode { .. })
    }
}

/// Result type for comparison operations.
pub type Result<T> = std::result::Result<T, ArtmatchError>;
