//! Embeds and the outbound post.

use serde::Serialize;

use crate::compose::ComposedText;
use crate::facets::Facet;
use crate::media::ImageAsset;

/// Most images a post may carry.
pub const MAX_IMAGES: usize = 4;

/// A compressed image with its alt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAttachment {
    pub image: ImageAsset,
    pub alt: String,
}

/// Link preview card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalCard {
    pub url: String,
    pub title: String,
    pub description: String,
    pub thumb: Option<ImageAsset>,
}

/// A post on the account's own profile, referenced by public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotedRecord {
    pub url: String,
}

/// The single attachment of an outbound post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Embed {
    None,
    Images {
        images: Vec<ImageAttachment>,
    },
    External {
        card: ExternalCard,
    },
    Record {
        record: QuotedRecord,
    },
    RecordWithImages {
        record: QuotedRecord,
        images: Vec<ImageAttachment>,
    },
}

impl Embed {
    /// `true` for the variants carrying an image gallery.
    pub fn has_images(&self) -> bool {
        matches!(self, Self::Images { .. } | Self::RecordWithImages { .. })
    }

    pub fn as_card(&self) -> Option<&ExternalCard> {
        match self {
            Self::External { card } => Some(card),
            _ => None,
        }
    }
}

/// Text, embed and derived link spans, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundPost {
    pub text: ComposedText,
    pub embed: Embed,
    /// Spans for authored HTML links found in `text`.
    pub link_facets: Vec<Facet>,
}
