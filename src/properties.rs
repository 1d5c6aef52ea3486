//! JF2 post properties, the engine's input.
//!
//! Deserializes the normalized property bag a Micropub server stores for
//! a post. Marker fields keep their hyphenated JF2 names on the wire.
//!
//! ```rust
//! use crosspost::PostProperties;
//!
//! let props: PostProperties = serde_json::from_str(r#"{
//!     "like-of": "https://example.com/post",
//!     "url": "https://me.example/likes/1"
//! }"#).unwrap();
//! assert_eq!(props.like_of.as_deref(), Some("https://example.com/post"));
//! ```

use serde::{Deserialize, Serialize};

/// Normalized post properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PostProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Title, set for article-style posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The post's own permalink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo: Vec<Photo>,
}

impl PostProperties {
    /// `true` if the post carries non-blank content.
    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(|c| !c.is_blank())
    }

    /// HTML content, if any.
    pub fn html(&self) -> Option<&str> {
        self.content.as_ref().and_then(|c| c.html.as_deref())
    }
}

/// Post content. JF2 allows either a bare string or an object with
/// `html` and/or `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ContentRepr")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: Some(text.into()),
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: None,
        }
    }

    fn is_blank(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.html) && blank(&self.text)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentRepr {
    Plain(String),
    Rich {
        #[serde(default)]
        html: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
}

impl From<ContentRepr> for Content {
    fn from(repr: ContentRepr) -> Self {
        match repr {
            ContentRepr::Plain(text) => Self::text(text),
            ContentRepr::Rich { html, text } => Self { html, text },
        }
    }
}

/// A photo attached to the post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PhotoRepr")]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PhotoRepr {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl From<PhotoRepr> for Photo {
    fn from(repr: PhotoRepr) -> Self {
        match repr {
            PhotoRepr::Url(url) => Self {
                url,
                alt: String::new(),
            },
            PhotoRepr::Full { url, alt } => Self {
                url,
                alt: alt.unwrap_or_default(),
            },
        }
    }
}
