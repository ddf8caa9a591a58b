//! Image retrieval: sources that turn an [`ImageLocator`] into a decoded [`RawImage`].

use std::future::Future;

use image::{ColorType, DynamicImage};

use crate::errors::{ArtmatchError, Result};
use crate::types::ImageLocator;

/// Timeout-bounded HTTP source.
pub mod http;
/// In-memory source keyed by URL.
pub mod memory;

pub use http::HttpFetcher;
pub use memory::MemorySource;

/// Something that can produce a decoded image for a locator.
///
/// Implementations never retry; any failure is returned as
/// [`ArtmatchError::Fetch`] or [`ArtmatchError::Decode`].
pub trait ImageSource {
    /// Retrieve and decode the image behind `locator`.
    fn fetch(&self, locator: &ImageLocator) -> impl Future<Output = Result<RawImage>> + Send;
}

/// A decoded image in whatever color model the source used.
#[derive(Debug, Clone)]
pub struct RawImage {
    image: DynamicImage,
}

impl RawImage {
    /// Wrap an already decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color model of the decoded pixels.
    pub fn color(&self) -> ColorType {
        self.image.color()
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

/// Decode fetched bytes, attributing failures to `locator`.
pub fn decode(locator: &ImageLocator, bytes: &[u8]) -> Result<RawImage> {
    let image = image::load_from_memory(bytes).map_err(|e| ArtmatchError::Decode {
        url: locator.to_string(),
        reason: e.to_string(),
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ArtmatchError::Decode {
            url: locator.to_string(),
            reason: "image has no pixels".into(),
        });
    }
    Ok(RawImage::new(image))
}
