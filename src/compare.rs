//! Pairwise comparison: fetch both images, fingerprint them, score the distances.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::CompareConfig;
use crate::errors::Result;
use crate::fetch::{ImageSource, RawImage};
use crate::fingerprint::{FingerprintSet, Fingerprinter};
use crate::normalize::normalize;
use crate::types::{ImageLocator, PerKind};

/// Weight of the average-hash sub-score in the overall similarity.
pub const AVERAGE_WEIGHT: f64 = 0.6;
/// Weight of the perceptual-hash sub-score in the overall similarity.
pub const PERCEPTUAL_WEIGHT: f64 = 0.4;

/// Error message reported when either image cannot be obtained.
pub const DOWNLOAD_FAILED: &str = "Failed to download one or both images";
/// Error message reported when a request lacks a locator.
pub const MISSING_URLS: &str = "Missing url1 or url2";

/// Hamming distance per fingerprint kind.
pub type DistanceSet = PerKind<u32>;

/// Percentage of matching bits, floored at 0.
pub fn bit_similarity(distance: u32, bit_width: usize) -> f64 {
    (100.0 - f64::from(distance) * 100.0 / bit_width as f64).max(0.0)
}

/// Fixed blend of the two sub-scores.
pub fn blend(avg_similarity: f64, phash_similarity: f64) -> f64 {
    avg_similarity * AVERAGE_WEIGHT + phash_similarity * PERCEPTUAL_WEIGHT
}

/// Per-kind Hamming distances between two fingerprint sets.
pub fn distances(a: &FingerprintSet, b: &FingerprintSet) -> Result<DistanceSet> {
    PerKind::try_from_fn(|kind| a.get(kind).hamming(b.get(kind)))
}

/// A fully computed comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Overall similarity in `[0, 100]`.
    pub similarity: f64,
    /// Distances for every kind.
    pub distances: DistanceSet,
    /// Fingerprints of the first image.
    pub hashes1: FingerprintSet,
    /// Fingerprints of the second image.
    pub hashes2: FingerprintSet,
    /// Average-hash bit agreement in `[0, 100]`.
    pub avg_similarity: f64,
    /// Perceptual-hash bit agreement in `[0, 100]`.
    pub phash_similarity: f64,
}

impl Comparison {
    /// Score two fingerprint sets of `bit_width`-bit fingerprints.
    pub fn from_fingerprints(
        hashes1: FingerprintSet,
        hashes2: FingerprintSet,
        bit_width: usize,
    ) -> Result<Self> {
        let distances = distances(&hashes1, &hashes2)?;
        let avg_similarity = bit_similarity(distances.average, bit_width);
        let phash_similarity = bit_similarity(distances.perceptual, bit_width);
        Ok(Self {
            similarity: blend(avg_similarity, phash_similarity),
            distances,
            hashes1,
            hashes2,
            avg_similarity,
            phash_similarity,
        })
    }
}

/// Error body emitted instead of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Human-readable cause.
    pub error: String,
    /// Always `0.0` when present; omitted for rejected requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl ErrorReport {
    /// One or both images could not be fetched or decoded.
    pub fn download_failed() -> Self {
        Self {
            error: DOWNLOAD_FAILED.to_string(),
            similarity: Some(0.0),
        }
    }

    /// The request did not name two images.
    pub fn missing_input() -> Self {
        Self {
            error: MISSING_URLS.to_string(),
            similarity: None,
        }
    }

    /// Any other failure.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            similarity: Some(0.0),
        }
    }
}

/// Outcome of a comparison that ran to completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonResult {
    /// Both images were fingerprinted and scored.
    Match(Comparison),
    /// At least one image could not be obtained.
    DownloadFailed(ErrorReport),
}

impl ComparisonResult {
    /// Overall similarity; `0.0` when a download failed.
    pub fn similarity(&self) -> f64 {
        match self {
            Self::Match(c) => c.similarity,
            Self::DownloadFailed(_) => 0.0,
        }
    }
}

/// Fetches, normalizes and fingerprints image pairs.
#[derive(Debug)]
pub struct Comparator<S> {
    source: S,
    fingerprinter: Fingerprinter,
    canonical_size: u32,
}

impl<S: ImageSource + Sync> Comparator<S> {
    /// Comparator with the default fingerprint algorithms.
    ///
    /// Fails with [`crate::ArtmatchError::Config`] if `config` does not validate.
    pub fn new(source: S, config: &CompareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            fingerprinter: Fingerprinter::new(config),
            canonical_size: config.canonical_size,
        })
    }

    /// Replace the fingerprinter.
    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// Compare the images behind two locators.
    ///
    /// Fetch and decode failures yield [`ComparisonResult::DownloadFailed`];
    /// any other failure is returned as an error.
    pub async fn compare(&self, url1: &ImageLocator, url2: &ImageLocator) -> Result<ComparisonResult> {
        let (res1, res2) = tokio::join!(self.source.fetch(url1), self.source.fetch(url2));

        let (img1, img2) = match (res1, res2) {
            (Ok(img1), Ok(img2)) => (img1, img2),
            (res1, res2) => {
                for err in [res1.err(), res2.err()].into_iter().flatten() {
                    if !err.is_download_failure() {
                        return Err(err);
                    }
                    warn!(error = %err, "image download failed");
                }
                return Ok(ComparisonResult::DownloadFailed(ErrorReport::download_failed()));
            }
        };
        debug!(
            size1 = ?(img1.width(), img1.height()),
            size2 = ?(img2.width(), img2.height()),
            "both images decoded"
        );

        let (hashes1, hashes2) = rayon::join(|| self.fingerprint(&img1), || self.fingerprint(&img2));
        let comparison =
            Comparison::from_fingerprints(hashes1?, hashes2?, self.fingerprinter.bit_width())?;

        info!(
            similarity = comparison.similarity,
            avg = comparison.avg_similarity,
            phash = comparison.phash_similarity,
            "comparison complete"
        );
        Ok(ComparisonResult::Match(comparison))
    }

    /// Fetch and fingerprint a single image.
    pub async fn fingerprint_one(&self, url: &ImageLocator) -> Result<FingerprintSet> {
        let raw = self.source.fetch(url).await?;
        self.fingerprint(&raw)
    }

    fn fingerprint(&self, raw: &RawImage) -> Result<FingerprintSet> {
        let canonical = normalize(raw, self.canonical_size);
        self.fingerprinter.fingerprint(&canonical)
    }
}
