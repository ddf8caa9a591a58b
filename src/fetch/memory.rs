use std::collections::HashMap;

use super::{decode, ImageSource, RawImage};
use crate::errors::{ArtmatchError, Result};
use crate::types::ImageLocator;

/// Serves encoded image bytes from memory, keyed by URL.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    images: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `url`.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), bytes);
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl ImageSource for MemorySource {
    async fn fetch(&self, locator: &ImageLocator) -> Result<RawImage> {
        let bytes = self
            .images
            .get(locator.as_str())
            .ok_or_else(|| ArtmatchError::Fetch {
                url: locator.to_string(),
                reason: "not found".into(),
            })?;
        decode(locator, bytes)
    }
}
