//! `crosspost` - syndicate IndieWeb posts to a Bluesky-style backend
//!
//! # Features
//!
//! - **Classification**: likes, reposts, bookmarks, quote posts and regular
//!   posts, split by whether the target lives on the account's own profile
//! - **Composition**: length-bounded text that keeps its trailing reference
//! - **Embeds**: post photos, link cards with fetched or synthesized
//!   thumbnails, and quoted records
//! - **Images**: JPEG recompression under a byte budget
//! - **Publishing**: a [`Syndicator`] driving a pluggable [`Transport`]
//!
//! # Example
//!
//! ```rust,no_run
//! use crosspost::{Action, Composer, Config, PostProperties};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let composer = Composer::new(Config::load()?)?;
//!     let post: PostProperties = serde_json::from_str(
//!         r#"{"content": "hello world", "url": "https://me.example/notes/1"}"#,
//!     )?;
//!     if let Action::Post(post) = composer.compose(&post).await? {
//!         println!("{}", post.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod compose;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod embed;
pub mod error;
pub mod facets;
pub mod http_client;
pub mod links;
pub mod media;
pub mod metadata;
pub mod properties;
pub mod syndicator;
pub mod transport;
pub mod uri;

pub use compose::{compose_bookmark, compose_like, compose_post, compose_repost, ComposedText};
pub use config::Config;
pub use dispatch::{classify, Action, Composer, Decision, SkipReason};
pub use embed::{Embed, ExternalCard, ImageAttachment, OutboundPost, QuotedRecord};
pub use error::{Error, Result};
pub use facets::{Facet, FacetFeature};
pub use http_client::HttpClient;
pub use links::{harvest_urls, select_external_url};
pub use media::{ImageAsset, ThumbnailSynthesizer};
pub use metadata::{Metadata, MetadataFetcher};
pub use properties::{Content, Photo, PostProperties};
pub use syndicator::{Outcome, Syndicator};
pub use transport::{FacetDetector, NoFacets, Transport};
pub use uri::uri_to_post_url;

/// Version of crosspost
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
