use image_hasher::{HashAlg, HasherConfig};

use super::{Fingerprint, FingerprintAlgorithm};
use crate::errors::{ArtmatchError, Result};
use crate::normalize::CanonicalImage;
use crate::types::HashKind;

/// Average, perceptual or difference hash computed by `image_hasher`.
///
/// The fingerprint keeps the bytes of `ImageHash::as_bytes` as packed by
/// `image_hasher`, so the hex string is not the hash grid in row-major order
/// and will not match Python `imagehash` output. Hamming distances equal
/// `ImageHash::dist` regardless.
#[derive(Debug, Clone, Copy)]
pub struct ImageHasherAlgorithm {
    kind: HashKind,
    hash_size: u32,
}

impl ImageHasherAlgorithm {
    /// Hash of `kind` over a `hash_size × hash_size` grid.
    ///
    /// `HashKind::Wavelet` is not provided by `image_hasher`; use
    /// [`super::WaveletHash`] for that slot.
    pub fn new(kind: HashKind, hash_size: u32) -> Self {
        Self { kind, hash_size }
    }
}

impl FingerprintAlgorithm for ImageHasherAlgorithm {
    fn kind(&self) -> HashKind {
        self.kind
    }

    fn fingerprint(&self, image: &CanonicalImage) -> Result<Fingerprint> {
        let config = HasherConfig::new().hash_size(self.hash_size, self.hash_size);
        let config = match self.kind {
            HashKind::Average => config.hash_alg(HashAlg::Mean),
            HashKind::Perceptual => config.hash_alg(HashAlg::Mean).preproc_dct(),
            HashKind::Difference => config.hash_alg(HashAlg::Gradient),
            HashKind::Wavelet => {
                return Err(ArtmatchError::Fingerprint(
                    "image_hasher has no wavelet hash".into(),
                ))
            }
        };
        let hash = config.to_hasher().hash_image(&image.to_dynamic());
        let bytes = hash.as_bytes();

        let expected = (self.hash_size as usize) * (self.hash_size as usize);
        if bytes.len() * 8 != expected {
            return Err(ArtmatchError::Fingerprint(format!(
                "{} hash returned {} bytes for a {}-bit grid",
                self.kind,
                bytes.len(),
                expected
            )));
        }
        Ok(Fingerprint::from_bytes(bytes))
    }
}
