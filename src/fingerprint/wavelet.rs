use image::imageops::{self, FilterType};

use super::{Fingerprint, FingerprintAlgorithm};
use crate::config::largest_power_of_two_at_most;
use crate::errors::{ArtmatchError, Result};
use crate::normalize::CanonicalImage;
use crate::types::HashKind;

/// Haar wavelet hash.
///
/// The luma image is resampled to the largest power-of-two square that fits,
/// its top-level LL band (the global mean) is removed, and the LL band is
/// taken repeatedly until `hash_size × hash_size` coefficients remain. Each
/// bit is set where the coefficient exceeds their median.
#[derive(Debug, Clone, Copy)]
pub struct WaveletHash {
    hash_size: u32,
}

impl WaveletHash {
    /// `hash_size` must be a power of two.
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl FingerprintAlgorithm for WaveletHash {
    fn kind(&self) -> HashKind {
        HashKind::Wavelet
    }

    fn fingerprint(&self, image: &CanonicalImage) -> Result<Fingerprint> {
        let scale = largest_power_of_two_at_most(image.size());
        if !self.hash_size.is_power_of_two() || self.hash_size > scale {
            return Err(ArtmatchError::Fingerprint(format!(
                "wavelet hash size {} does not fit a {scale}px grid",
                self.hash_size
            )));
        }

        let mut luma = image.to_luma();
        if luma.width() != scale {
            luma = imageops::resize(&luma, scale, scale, FilterType::Lanczos3);
        }

        let mut coeffs: Vec<f64> = luma.pixels().map(|p| f64::from(p.0[0]) / 255.0).collect();
        let mean = coeffs.iter().sum::<f64>() / coeffs.len() as f64;
        for c in &mut coeffs {
            *c -= mean;
        }

        let mut side = scale as usize;
        while side > self.hash_size as usize {
            coeffs = haar_ll(&coeffs, side);
            side /= 2;
        }

        let med = median(&coeffs);
        Ok(Fingerprint::from_bits(coeffs.iter().map(|&c| c > med)))
    }
}

/// One level of the orthonormal 2D Haar transform, approximation band only.
fn haar_ll(grid: &[f64], side: usize) -> Vec<f64> {
    let half = side / 2;
    let mut out = Vec::with_capacity(half * half);
    for y in 0..half {
        for x in 0..half {
            let i = 2 * y * side + 2 * x;
            out.push((grid[i] + grid[i + 1] + grid[i + side] + grid[i + side + 1]) / 2.0);
        }
    }
    out
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
