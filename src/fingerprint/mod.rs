//! Fixed-width perceptual fingerprints and the set computed per image.

use std::fmt;

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};

use crate::config::CompareConfig;
use crate::errors::{ArtmatchError, Result};
use crate::normalize::CanonicalImage;
use crate::types::{HashKind, PerKind};

/// `image_hasher`-backed average, perceptual and difference hashes.
pub mod hashers;
/// Haar wavelet hash.
pub mod wavelet;

pub use hashers::ImageHasherAlgorithm;
pub use wavelet::WaveletHash;

/// A fixed-width bit vector. Bit 0 is the most significant bit of the first hex digit.
#[derive(Clone, PartialEq, Eq)]
pub struct Fingerprint {
    bits: FixedBitSet,
}

impl Fingerprint {
    /// Build from bits in order.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let bits: Vec<bool> = bits.into_iter().collect();
        let mut set = FixedBitSet::with_capacity(bits.len());
        for (i, b) in bits.into_iter().enumerate() {
            if b {
                set.insert(i);
            }
        }
        Self { bits: set }
    }

    /// Build from packed bytes, most significant bit first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bits(
            bytes
                .iter()
                .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1)),
        )
    }

    /// Parse a hex string; the width is four bits per digit.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bits = Vec::with_capacity(s.len() * 4);
        for c in s.chars() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| ArtmatchError::Fingerprint(format!("invalid hex digit {c:?}")))?;
            bits.extend((0..4).rev().map(|shift| (nibble >> shift) & 1 == 1));
        }
        Ok(Self::from_bits(bits))
    }

    /// Width in bits.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Number of set bits.
    pub fn popcount(&self) -> u32 {
        self.bits.as_slice().iter().map(|w| w.count_ones()).sum()
    }

    /// Count of differing bit positions.
    pub fn hamming(&self, other: &Self) -> Result<u32> {
        if self.width() != other.width() {
            return Err(ArtmatchError::Fingerprint(format!(
                "cannot compare {}-bit and {}-bit fingerprints",
                self.width(),
                other.width()
            )));
        }
        let mut count = 0;
        for (a, b) in self.bits.as_slice().iter().zip(other.bits.as_slice()) {
            count += (a ^ b).count_ones();
        }
        Ok(count)
    }

    /// Lowercase hex, one digit per four bits.
    pub fn to_hex(&self) -> String {
        let mut packed = vec![0u8; (self.width() + 7) / 8];
        for i in self.bits.ones() {
            packed[i / 8] |= 0x80 >> (i % 8);
        }
        let mut s = hex::encode(packed);
        s.truncate((self.width() + 3) / 4);
        s
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// One fingerprint per [`HashKind`].
pub type FingerprintSet = PerKind<Fingerprint>;

/// A perceptual hashing algorithm over canonical images.
pub trait FingerprintAlgorithm: fmt::Debug + Send + Sync {
    /// Which slot of a [`FingerprintSet`] this algorithm fills.
    fn kind(&self) -> HashKind;

    /// Compute the fingerprint. Must be deterministic.
    fn fingerprint(&self, image: &CanonicalImage) -> Result<Fingerprint>;
}

/// Computes a full [`FingerprintSet`] for a canonical image.
#[derive(Debug)]
pub struct Fingerprinter {
    algorithms: PerKind<Box<dyn FingerprintAlgorithm>>,
    bit_width: usize,
}

impl Fingerprinter {
    /// Default algorithms at the configured grid size.
    pub fn new(config: &CompareConfig) -> Self {
        let hash_size = config.hash_size;
        let algorithms = PerKind::from_fn(|kind| -> Box<dyn FingerprintAlgorithm> {
            match kind {
                HashKind::Wavelet => Box::new(WaveletHash::new(hash_size)),
                other => Box::new(ImageHasherAlgorithm::new(other, hash_size)),
            }
        });
        Self {
            algorithms,
            bit_width: config.bit_width(),
        }
    }

    /// Replace the algorithm for `algorithm.kind()`.
    pub fn with_algorithm(mut self, algorithm: Box<dyn FingerprintAlgorithm>) -> Self {
        let slot = match algorithm.kind() {
            HashKind::Average => &mut self.algorithms.average,
            HashKind::Perceptual => &mut self.algorithms.perceptual,
            HashKind::Difference => &mut self.algorithms.difference,
            HashKind::Wavelet => &mut self.algorithms.wavelet,
        };
        *slot = algorithm;
        self
    }

    /// Expected width of every fingerprint, in bits.
    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Compute all four fingerprints; any failure fails the whole set.
    pub fn fingerprint(&self, image: &CanonicalImage) -> Result<FingerprintSet> {
        PerKind::try_from_fn(|kind| {
            let fp = self.algorithms.get(kind).fingerprint(image)?;
            if fp.width() != self.bit_width {
                return Err(ArtmatchError::Fingerprint(format!(
                    "{kind} produced {} bits, expected {}",
                    fp.width(),
                    self.bit_width
                )));
            }
            Ok(fp)
        })
    }
}
