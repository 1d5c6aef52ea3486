//! Post classification and embed selection.
//!
//! [`classify`] maps properties onto a [`Decision`] with one flat table
//! over (reaction, origin, content present, syndication flag).
//! [`Composer::compose`] then builds the [`Action`] for that decision:
//! text from the composition policies, and an embed from post photos, a
//! link card or a quoted record.
//!
//! # Example
//!
//! ```rust
//! use crosspost::{classify, Config, Decision, PostProperties, SkipReason};
//!
//! let config = Config { profile_url: "https://me.example".into(), ..Config::default() };
//! let like = PostProperties { like_of: Some("https://other.example/post".into()), ..Default::default() };
//! assert_eq!(classify(&like, &config), Decision::Skip(SkipReason::ExternalLikesDisabled));
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::compose::{compose_bookmark, compose_like, compose_post, compose_repost, ComposedText};
use crate::config::Config;
use crate::content::extract_optional;
use crate::embed::{Embed, ExternalCard, ImageAttachment, OutboundPost, QuotedRecord, MAX_IMAGES};
use crate::error::{Error, Result};
use crate::facets::derive_link_facets;
use crate::http_client::{HttpClient, MAX_RESPONSE_BYTES};
use crate::links::select_external_url;
use crate::media::{ImageAsset, ThumbnailSynthesizer};
use crate::metadata::{Metadata, MetadataFetcher};
use crate::properties::{Photo, PostProperties};
use crate::uri::is_same_origin;

/// Why nothing is syndicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ExternalLikesDisabled,
    ExternalRepostsDisabled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExternalLikesDisabled => "syndication of external likes is disabled",
            Self::ExternalRepostsDisabled => "syndication of external reposts is disabled",
        })
    }
}

/// Outcome of classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Own post reposted with commentary.
    QuotePost { target: String },
    /// Own post reposted without commentary.
    NativeRepost { target: String },
    /// Outside URL reposted, syndicated as a link post.
    ExternalRepost { target: String },
    NativeLike { target: String },
    /// Outside URL liked, syndicated as a link post.
    ExternalLike { target: String },
    Bookmark { target: String },
    Regular,
    Skip(SkipReason),
}

/// What to do on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Post(OutboundPost),
    Like { target: String },
    Repost { target: String },
    Skip { reason: SkipReason },
}

#[derive(Debug, Clone, Copy)]
enum Reaction<'a> {
    Repost(&'a str),
    Like(&'a str),
    Bookmark(&'a str),
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Own,
    External,
}

/// Classify a post. Reposts win over likes, likes over bookmarks.
pub fn classify(properties: &PostProperties, config: &Config) -> Decision {
    let reaction = if let Some(target) = properties.repost_of.as_deref() {
        Reaction::Repost(target)
    } else if let Some(target) = properties.like_of.as_deref() {
        Reaction::Like(target)
    } else if let Some(target) = properties.bookmark_of.as_deref() {
        Reaction::Bookmark(target)
    } else {
        Reaction::Regular
    };

    let origin = match reaction {
        Reaction::Repost(t) | Reaction::Like(t) if is_same_origin(t, &config.profile_url) => {
            Origin::Own
        }
        _ => Origin::External,
    };
    let enabled = match reaction {
        Reaction::Repost(_) => config.syndicate_external_reposts,
        Reaction::Like(_) => config.syndicate_external_likes,
        Reaction::Bookmark(_) | Reaction::Regular => true,
    };
    let has_content = properties.has_content();

    match (reaction, origin, has_content, enabled) {
        (Reaction::Repost(t), Origin::Own, true, _) => Decision::QuotePost { target: t.into() },
        (Reaction::Repost(t), Origin::Own, false, _) => Decision::NativeRepost { target: t.into() },
        (Reaction::Repost(t), Origin::External, _, true) => {
            Decision::ExternalRepost { target: t.into() }
        }
        (Reaction::Repost(_), Origin::External, _, false) => {
            Decision::Skip(SkipReason::ExternalRepostsDisabled)
        }
        (Reaction::Like(t), Origin::Own, _, _) => Decision::NativeLike { target: t.into() },
        (Reaction::Like(t), Origin::External, _, true) => Decision::ExternalLike { target: t.into() },
        (Reaction::Like(_), Origin::External, _, false) => {
            Decision::Skip(SkipReason::ExternalLikesDisabled)
        }
        (Reaction::Bookmark(t), _, _, _) => Decision::Bookmark { target: t.into() },
        (Reaction::Regular, _, _, _) => Decision::Regular,
    }
}

/// Builds outbound actions from post properties.
///
/// Holds one HTTP client for metadata and image fetches and one
/// thumbnail renderer; both are reused across calls.
pub struct Composer {
    config: Config,
    http: HttpClient,
    metadata: MetadataFetcher,
    thumbnails: Arc<ThumbnailSynthesizer>,
}

impl Composer {
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpClient::with_timeout(config.fetch_timeout())
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            metadata: MetadataFetcher::new(http.clone()),
            http,
            thumbnails: Arc::new(ThumbnailSynthesizer::new()),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decide what to publish for `properties`.
    #[instrument(skip_all, fields(url = properties.url.as_deref().unwrap_or_default()))]
    pub async fn compose(&self, properties: &PostProperties) -> Result<Action> {
        let decision = classify(properties, &self.config);
        debug!(?decision, "Post classified");

        let content = extract_optional(properties.content.as_ref());
        let permalink = properties.url.as_deref();

        let post = match decision {
            Decision::Skip(reason) => {
                info!("Nothing to syndicate: {}", reason);
                return Ok(Action::Skip { reason });
            }
            Decision::NativeLike { target } => return Ok(Action::Like { target }),
            Decision::NativeRepost { target } => return Ok(Action::Repost { target }),
            Decision::QuotePost { target } => {
                let text = compose_post(
                    properties.name.as_deref(),
                    &content,
                    permalink,
                    self.config.include_permalink,
                )?;
                let record = QuotedRecord { url: target };
                let embed = if properties.photo.is_empty() {
                    Embed::Record { record }
                } else {
                    let images = self.photos(properties).await?;
                    Embed::RecordWithImages { record, images }
                };
                self.outbound(properties, text, embed)
            }
            Decision::ExternalRepost { target } => {
                let text = compose_repost(&content, &target)?;
                let card = self.card(&target).await;
                self.outbound(properties, text, Embed::External { card })
            }
            Decision::ExternalLike { target } => {
                let text = compose_like(&content, &target)?;
                let card = self.card(&target).await;
                self.outbound(properties, text, Embed::External { card })
            }
            Decision::Bookmark { target } => {
                let text = compose_bookmark(&content, permalink)?;
                let card = self.card(&target).await;
                self.outbound(properties, text, Embed::External { card })
            }
            Decision::Regular => self.regular_post(properties, &content).await?,
        };

        debug!(
            chars = post.text.char_len(),
            truncated = post.text.is_truncated(),
            links = post.link_facets.len(),
            "Post composed"
        );
        Ok(Action::Post(post))
    }

    async fn regular_post(&self, properties: &PostProperties, content: &str) -> Result<OutboundPost> {
        let permalink = properties.url.as_deref();
        let text = compose_post(
            properties.name.as_deref(),
            content,
            permalink,
            self.config.include_permalink,
        )?;

        let own_domain = permalink
            .and_then(|p| Url::parse(p).ok())
            .and_then(|u| u.host_str().map(str::to_string));
        let external = select_external_url(properties, own_domain.as_deref());
        debug!(external = ?external, photos = properties.photo.len(), "Selecting embed");

        let embed = if !properties.photo.is_empty() {
            Embed::Images {
                images: self.photos(properties).await?,
            }
        } else if let Some(target) = external.as_deref().or(permalink) {
            Embed::External {
                card: self.card(target).await,
            }
        } else {
            Embed::None
        };

        Ok(self.outbound(properties, text, embed))
    }

    fn outbound(&self, properties: &PostProperties, text: ComposedText, embed: Embed) -> OutboundPost {
        let link_facets = match properties.html() {
            Some(markup) if !embed.has_images() => derive_link_facets(markup, text.content()),
            _ => Vec::new(),
        };
        OutboundPost {
            text,
            embed,
            link_facets,
        }
    }

    /// Fetch and compress post photos as one batch.
    ///
    /// Any failure fails the whole batch.
    async fn photos(&self, properties: &PostProperties) -> Result<Vec<ImageAttachment>> {
        if properties.photo.len() > MAX_IMAGES {
            warn!(
                "Post has {} photos, only the first {} are attached",
                properties.photo.len(),
                MAX_IMAGES
            );
        }
        let permalink = properties.url.as_deref();
        let jobs = properties
            .photo
            .iter()
            .take(MAX_IMAGES)
            .map(|photo| self.photo(photo, permalink));
        try_join_all(jobs).await
    }

    async fn photo(&self, photo: &Photo, permalink: Option<&str>) -> Result<ImageAttachment> {
        let url = resolve_photo_url(&photo.url, permalink)?;
        let raw = self
            .http
            .fetch_bytes(&url, MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| Error::PhotoFetch {
                url: url.clone(),
                reason: format!("{e:#}"),
            })?;
        let image = ImageAsset::compressed_blocking(raw, self.config.max_image_bytes).await?;
        debug!(%url, size = image.len(), "Photo prepared");
        Ok(ImageAttachment {
            image,
            alt: photo.alt.clone(),
        })
    }

    /// Build a link card. Never fails: metadata and thumbnail fall back.
    pub async fn card(&self, url: &str) -> ExternalCard {
        let metadata = self.metadata.fetch_metadata(url).await;
        let thumb = self.card_thumbnail(url, &metadata).await;
        ExternalCard {
            url: url.to_string(),
            title: metadata.title,
            description: metadata.description,
            thumb,
        }
    }

    async fn card_thumbnail(&self, url: &str, metadata: &Metadata) -> Option<ImageAsset> {
        let max_bytes = self.config.max_image_bytes;

        if let Some(image_url) = &metadata.image_url {
            match self.remote_image(image_url, max_bytes).await {
                Ok(asset) => return Some(asset),
                Err(e) => warn!("Card image {} unusable, synthesizing: {}", image_url, e),
            }
        }

        let title = metadata.title.clone();
        let site_name = metadata
            .site_name
            .clone()
            .or_else(|| host_of(url))
            .unwrap_or_default();
        let thumbnails = Arc::clone(&self.thumbnails);
        let rendered = tokio::task::spawn_blocking(move || {
            let png = thumbnails.synthesize(&title, &site_name)?;
            ImageAsset::compressed(&png, max_bytes)
        })
        .await
        .map_err(Error::from)
        .and_then(|r| r);

        match rendered {
            Ok(asset) => Some(asset),
            Err(e) => {
                warn!("Thumbnail synthesis failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn remote_image(&self, url: &str, max_bytes: usize) -> Result<ImageAsset> {
        let raw = self
            .http
            .fetch_bytes(url, MAX_RESPONSE_BYTES)
            .await
            .map_err(Error::Transport)?;
        ImageAsset::compressed_blocking(raw, max_bytes).await
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

/// Absolute URL for a photo; relative URLs resolve against the permalink.
fn resolve_photo_url(photo: &str, permalink: Option<&str>) -> Result<String> {
    if let Ok(url) = Url::parse(photo) {
        return Ok(url.to_string());
    }
    let base = permalink
        .ok_or_else(|| Error::invalid_url(photo, "relative photo URL and no permalink"))?;
    let base = Url::parse(base).map_err(|e| Error::invalid_url(base, e))?;
    base.join(photo)
        .map(|u| u.to_string())
        .map_err(|e| Error::invalid_url(photo, e))
}
