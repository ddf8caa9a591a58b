//! Configuration for fetching, normalization and fingerprinting.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ArtmatchError, Result};

/// Browser-like identification; some artwork CDNs reject default client agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Empirical constants used by a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Side length of the square canonical image.
    pub canonical_size: u32,
    /// Side length of the fingerprint grid; fingerprints are `hash_size²` bits.
    pub hash_size: u32,
    /// Per-request fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// User-Agent header sent with every fetch.
    pub user_agent: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            canonical_size: 256,
            hash_size: 8,
            fetch_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CompareConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&s)?;
        config.validate()?;
        Ok(config)
    }

    /// Fingerprint width in bits.
    pub fn bit_width(&self) -> usize {
        (self.hash_size as usize) * (self.hash_size as usize)
    }

    /// Fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Check that the constants describe a computable comparison.
    pub fn validate(&self) -> Result<()> {
        if self.canonical_size == 0 {
            return Err(ArtmatchError::Config("canonical_size must be positive".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ArtmatchError::Config("fetch_timeout_secs must be positive".into()));
        }
        if self.hash_size < 2 || !self.hash_size.is_power_of_two() {
            return Err(ArtmatchError::Config(format!(
                "hash_size must be a power of two >= 2, got {}",
                self.hash_size
            )));
        }
        let wavelet_scale = largest_power_of_two_at_most(self.canonical_size);
        if self.hash_size > wavelet_scale {
            return Err(ArtmatchError::Config(format!(
                "hash_size {} exceeds wavelet grid {} for canonical_size {}",
                self.hash_size, wavelet_scale, self.canonical_size
            )));
        }
        Ok(())
    }
}

/// Largest power of two that is `<= n`, or 0 when `n` is 0.
pub(crate) fn largest_power_of_two_at_most(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    1 << (31 - n.leading_zeros())
}
