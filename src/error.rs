//! Error taxonomy for syndication.
//!
//! Only fatal failures live here. Optional enrichment (page metadata,
//! card thumbnails, facet detection) degrades to documented fallbacks
//! inside its own component and never produces an [`Error`]. Policy
//! no-ops are reported through [`crate::Action::Skip`], not as errors.

use thiserror::Error;

/// Fatal syndication errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Post has no permalink (`url` property) but the composed text requires one")]
    MissingPermalink,

    #[error("Reference {0} is too long to fit in a post alongside the truncation marker")]
    ReferenceTooLong(String),

    #[error("Failed to fetch photo {url}: {reason}")]
    PhotoFetch { url: String, reason: String },

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Image cannot be compressed below {max_bytes} bytes")]
    ImageTooLarge { max_bytes: usize },

    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn invalid_url(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
