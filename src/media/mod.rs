//! Outbound images: budgeted compression and synthesized card
//! thumbnails.
//!
//! Every image that leaves the engine is an [`ImageAsset`] produced by
//! [`compress`], so it is a JPEG no larger than the configured budget.

pub mod compress;
pub mod thumbnail;

use serde::{Serialize, Serializer};

use crate::error::Result;

pub use compress::{compress, compress_with_quality, MAX_IMAGE_BYTES};
pub use thumbnail::ThumbnailSynthesizer;

pub const JPEG_MIME: &str = "image/jpeg";

/// An encoded image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    #[serde(rename = "size", serialize_with = "serialize_len")]
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageAsset {
    /// Compress raw image bytes into an asset of at most `max_bytes`.
    pub fn compressed(raw: &[u8], max_bytes: usize) -> Result<Self> {
        Ok(Self {
            bytes: compress(raw, max_bytes)?,
            mime_type: JPEG_MIME.to_string(),
        })
    }

    /// [`ImageAsset::compressed`] on the blocking thread pool.
    pub async fn compressed_blocking(raw: Vec<u8>, max_bytes: usize) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::compressed(&raw, max_bytes)).await?
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn serialize_len<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.len() as u64)
}
