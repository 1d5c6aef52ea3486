//! Seams to the posting backend.
//!
//! The engine decides *what* to publish; a [`Transport`] carries it to
//! the backend and a [`FacetDetector`] annotates mentions, hashtags and
//! bare links. Both are supplied by the host application. The record
//! types here carry uploaded blob references instead of image bytes and
//! resolved [`StrongRef`]s instead of URLs; how they map onto the wire
//! is up to the transport.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::facets::Facet;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Account identifier (DID).
    pub did: String,
    pub handle: String,
}

/// Reference to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobRef {
    pub cid: String,
    pub mime_type: String,
    pub size: usize,
}

/// A record pinned to a specific revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

/// An uploaded image with its alt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub blob: BlobRef,
    pub alt: String,
}

/// Embed with media uploaded and records resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordEmbed {
    None,
    Images {
        images: Vec<UploadedImage>,
    },
    External {
        uri: String,
        title: String,
        description: String,
        thumb: Option<BlobRef>,
    },
    Record {
        record: StrongRef,
    },
    RecordWithMedia {
        record: StrongRef,
        images: Vec<UploadedImage>,
    },
}

/// A post ready for publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub text: String,
    pub facets: Vec<Facet>,
    pub embed: RecordEmbed,
}

/// Posting backend.
///
/// Every method returning a URI returns the backend record URI
/// (`at://...`) of the record it created.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Authenticate with the configured credentials.
    async fn login(&self) -> Result<Session>;

    async fn post(&self, session: &Session, record: PostRecord) -> Result<String>;

    async fn like(&self, session: &Session, subject: &StrongRef) -> Result<String>;

    async fn repost(&self, session: &Session, subject: &StrongRef) -> Result<String>;

    async fn upload_blob(&self, session: &Session, bytes: Vec<u8>, mime_type: &str)
        -> Result<BlobRef>;

    /// Resolve a post by account (DID or handle) and record key.
    async fn get_post(&self, session: &Session, account: &str, rkey: &str) -> Result<StrongRef>;
}

/// Detects mention, hashtag and link facets in text.
#[async_trait]
pub trait FacetDetector: Send + Sync {
    async fn detect_facets(&self, text: &str, session: &Session) -> Result<Vec<Facet>>;
}

/// Detector that finds nothing, for backends without rich text.
pub struct NoFacets;

#[async_trait]
impl FacetDetector for NoFacets {
    async fn detect_facets(&self, _text: &str, _session: &Session) -> Result<Vec<Facet>> {
        Ok(Vec::new())
    }
}
