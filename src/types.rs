//! Common core types shared by the pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ArtmatchError, Result};

/// Supported perceptual fingerprint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashKind {
    /// Mean-threshold hash of a downscaled grayscale image.
    #[serde(rename = "average")]
    Average,
    /// DCT-based hash.
    #[serde(rename = "phash")]
    Perceptual,
    /// Horizontal gradient hash.
    #[serde(rename = "dhash")]
    Difference,
    /// Haar wavelet hash.
    #[serde(rename = "whash")]
    Wavelet,
}

impl HashKind {
    /// Every kind, in output order.
    pub const ALL: [HashKind; 4] = [
        HashKind::Average,
        HashKind::Perceptual,
        HashKind::Difference,
        HashKind::Wavelet,
    ];

    /// Name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HashKind::Average => "average",
            HashKind::Perceptual => "phash",
            HashKind::Difference => "dhash",
            HashKind::Wavelet => "whash",
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one value per [`HashKind`].
///
/// Serializes as an object keyed by the wire names, in [`HashKind::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerKind<T> {
    /// Average hash entry.
    pub average: T,
    /// Perceptual hash entry.
    #[serde(rename = "phash")]
    pub perceptual: T,
    /// Difference hash entry.
    #[serde(rename = "dhash")]
    pub difference: T,
    /// Wavelet hash entry.
    #[serde(rename = "whash")]
    pub wavelet: T,
}

impl<T> PerKind<T> {
    /// Build by evaluating `f` once per kind.
    pub fn from_fn(mut f: impl FnMut(HashKind) -> T) -> Self {
        Self {
            average: f(HashKind::Average),
            perceptual: f(HashKind::Perceptual),
            difference: f(HashKind::Difference),
            wavelet: f(HashKind::Wavelet),
        }
    }

    /// Fallible variant of [`PerKind::from_fn`]; stops at the first error.
    pub fn try_from_fn(mut f: impl FnMut(HashKind) -> Result<T>) -> Result<Self> {
        Ok(Self {
            average: f(HashKind::Average)?,
            perceptual: f(HashKind::Perceptual)?,
            difference: f(HashKind::Difference)?,
            wavelet: f(HashKind::Wavelet)?,
        })
    }

    /// Entry for `kind`.
    pub fn get(&self, kind: HashKind) -> &T {
        match kind {
            HashKind::Average => &self.average,
            HashKind::Perceptual => &self.perceptual,
            HashKind::Difference => &self.difference,
            HashKind::Wavelet => &self.wavelet,
        }
    }

    /// Iterate `(kind, value)` pairs in [`HashKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (HashKind, &T)> + '_ {
        HashKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// URL of a remotely hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageLocator(String);

impl ImageLocator {
    /// Wrap a URL verbatim, rejecting only the empty string.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(ArtmatchError::Input("image locator is empty".into()));
        }
        Ok(Self(url))
    }

    /// The URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
