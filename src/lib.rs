#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, missing_docs, rust_2018_idioms)]

//! # artwork-match
//!
//! Perceptual similarity between two remotely hosted album artwork images:
//! - timeout-bounded HTTP fetch and decode
//! - normalization to a canonical 256×256 RGB image
//! - four 64-bit perceptual fingerprints (average, perceptual, difference, wavelet)
//! - a fixed 0.6 / 0.4 blend of average and perceptual bit agreement into a 0–100 score
//!
//! One invocation compares one pair; nothing is cached or persisted.

pub mod compare;
pub mod config;
pub mod errors;
/// Image retrieval and decoding.
pub mod fetch;
/// Perceptual fingerprints and their algorithms.
pub mod fingerprint;
pub mod normalize;
/// Stdin request parsing and stdout result emission.
pub mod request;
pub mod types;

pub use compare::{Comparator, Comparison, ComparisonResult, DistanceSet};
pub use config::CompareConfig;
pub use errors::ArtmatchError;
pub use fetch::{HttpFetcher, ImageSource, MemorySource, RawImage};
pub use fingerprint::{Fingerprint, FingerprintSet, Fingerprinter};
pub use normalize::CanonicalImage;
pub use types::{HashKind, ImageLocator, PerKind};
