//! Executes composed actions against the posting backend.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::{Action, Composer, SkipReason};
use crate::embed::{Embed, ImageAttachment, OutboundPost, QuotedRecord};
use crate::error::Result;
use crate::facets::merge_spans;
use crate::properties::PostProperties;
use crate::transport::{
    FacetDetector, NoFacets, PostRecord, RecordEmbed, Session, StrongRef, Transport, UploadedImage,
};
use crate::uri::{parse_post_url, uri_to_post_url};

/// Result of one syndication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A record was created. `url` is its public address.
    Published { uri: String, url: String },
    Skipped { reason: SkipReason },
}

impl Outcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Published { url, .. } => Some(url),
            Self::Skipped { .. } => None,
        }
    }
}

/// Composes posts and publishes them through a [`Transport`].
pub struct Syndicator<T, F = NoFacets> {
    composer: Composer,
    transport: T,
    facets: F,
}

impl<T: Transport> Syndicator<T> {
    /// Syndicator without facet detection.
    pub fn new(composer: Composer, transport: T) -> Self {
        Self::with_facets(composer, transport, NoFacets)
    }
}

impl<T: Transport, F: FacetDetector> Syndicator<T, F> {
    pub fn with_facets(composer: Composer, transport: T, facets: F) -> Self {
        Self {
            composer,
            transport,
            facets,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Compose and publish one post.
    pub async fn syndicate(&self, properties: &PostProperties) -> Result<Outcome> {
        let action = self.composer.compose(properties).await?;
        self.execute(action).await
    }

    /// Publish an already composed action.
    #[instrument(skip_all)]
    pub async fn execute(&self, action: Action) -> Result<Outcome> {
        let (session, uri) = match action {
            Action::Skip { reason } => return Ok(Outcome::Skipped { reason }),
            Action::Like { target } => {
                let session = self.transport.login().await?;
                let subject = self.resolve(&session, &target).await?;
                let uri = self.transport.like(&session, &subject).await?;
                (session, uri)
            }
            Action::Repost { target } => {
                let session = self.transport.login().await?;
                let subject = self.resolve(&session, &target).await?;
                let uri = self.transport.repost(&session, &subject).await?;
                (session, uri)
            }
            Action::Post(post) => {
                let session = self.transport.login().await?;
                let record = self.record(&session, post).await?;
                let uri = self.transport.post(&session, record).await?;
                (session, uri)
            }
        };

        let url = uri_to_post_url(&self.composer.config().profile_url, &uri)?;
        info!(handle = %session.handle, %url, "Syndicated");
        Ok(Outcome::Published { uri, url })
    }

    /// Strong reference for a public post URL on the profile host.
    async fn resolve(&self, session: &Session, url: &str) -> Result<StrongRef> {
        let (account, rkey) = parse_post_url(&self.composer.config().profile_url, url)?;
        debug!(%account, %rkey, "Resolving post");
        Ok(self.transport.get_post(session, &account, &rkey).await?)
    }

    async fn record(&self, session: &Session, post: OutboundPost) -> Result<PostRecord> {
        let OutboundPost {
            text,
            embed,
            link_facets,
        } = post;
        let text = text.into_string();

        let detected = match self.facets.detect_facets(&text, session).await {
            Ok(facets) => facets,
            Err(e) => {
                warn!("Facet detection failed, keeping derived links only: {:#}", e);
                Vec::new()
            }
        };
        let facets = merge_spans([link_facets, detected]);
        let embed = self.upload_embed(session, embed).await?;

        Ok(PostRecord {
            text,
            facets,
            embed,
        })
    }

    async fn upload_embed(&self, session: &Session, embed: Embed) -> Result<RecordEmbed> {
        Ok(match embed {
            Embed::None => RecordEmbed::None,
            Embed::Images { images } => RecordEmbed::Images {
                images: self.upload_images(session, images).await?,
            },
            Embed::External { card } => {
                let thumb = match card.thumb {
                    Some(thumb) => match self
                        .transport
                        .upload_blob(session, thumb.bytes, &thumb.mime_type)
                        .await
                    {
                        Ok(blob) => Some(blob),
                        Err(e) => {
                            warn!("Thumbnail upload failed for {}: {:#}", card.url, e);
                            None
                        }
                    },
                    None => None,
                };
                RecordEmbed::External {
                    uri: card.url,
                    title: card.title,
                    description: card.description,
                    thumb,
                }
            }
            Embed::Record { record } => RecordEmbed::Record {
                record: self.quoted(session, &record).await?,
            },
            Embed::RecordWithImages { record, images } => {
                let (record, images) = futures::try_join!(
                    self.quoted(session, &record),
                    self.upload_images(session, images)
                )?;
                RecordEmbed::RecordWithMedia { record, images }
            }
        })
    }

    async fn quoted(&self, session: &Session, record: &QuotedRecord) -> Result<StrongRef> {
        self.resolve(session, &record.url).await
    }

    async fn upload_images(
        &self,
        session: &Session,
        images: Vec<ImageAttachment>,
    ) -> Result<Vec<UploadedImage>> {
        let uploads = images.into_iter().map(|attachment| async move {
            let blob = self
                .transport
                .upload_blob(session, attachment.image.bytes, &attachment.image.mime_type)
                .await?;
            Ok::<_, crate::Error>(UploadedImage {
                blob,
                alt: attachment.alt,
            })
        });
        try_join_all(uploads).await
    }
}
