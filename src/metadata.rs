//! Open Graph page metadata for link cards.
//!
//! [`MetadataFetcher::fetch_metadata`] is total: network errors,
//! timeouts and non-success responses all produce
//! [`Metadata::fallback`], a card titled with the URL itself.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::compose::take_chars;
use crate::http_client::{HttpClient, MAX_RESPONSE_BYTES};

pub const MAX_TITLE_CHARS: usize = 300;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:title"], meta[name="og:title"]"#));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static OG_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"meta[property="og:description"], meta[name="og:description"]"#)
});
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:image"], meta[name="og:image"]"#));
static OG_SITE_NAME: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"meta[property="og:site_name"], meta[name="og:site_name"]"#)
});

/// Card metadata for a URL. Always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
}

impl Metadata {
    /// Metadata used when the page cannot be retrieved.
    pub fn fallback(url: &str) -> Self {
        Self {
            title: take_chars(url, MAX_TITLE_CHARS).to_string(),
            description: String::new(),
            image_url: None,
            site_name: None,
        }
    }
}

/// Fetches and parses page metadata.
#[derive(Clone)]
pub struct MetadataFetcher {
    client: HttpClient,
}

impl MetadataFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Retrieve metadata for `url`. Never fails.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_metadata(&self, url: &str) -> Metadata {
        match self.client.fetch_text(url, MAX_RESPONSE_BYTES).await {
            Ok((html, final_url)) => {
                let metadata = parse_metadata(&html, url, &final_url);
                debug!(title = %metadata.title, has_image = metadata.image_url.is_some(), "Metadata parsed");
                metadata
            }
            Err(e) => {
                warn!("Metadata fetch failed for {}: {:#}", url, e);
                Metadata::fallback(url)
            }
        }
    }
}

/// Parse Open Graph metadata from an HTML document.
///
/// `url` is the requested URL, used as the title of last resort. `base`
/// is the URL the page was actually served from, used to resolve a
/// relative `og:image`.
pub fn parse_metadata(html: &str, url: &str, base: &Url) -> Metadata {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, &OG_TITLE)
        .or_else(|| element_text(&doc, &TITLE))
        .unwrap_or_else(|| url.to_string());
    let description = meta_content(&doc, &OG_DESCRIPTION)
        .or_else(|| meta_content(&doc, &DESCRIPTION))
        .unwrap_or_default();
    let image_url = meta_content(&doc, &OG_IMAGE).and_then(|src| resolve_http(base, &src));
    let site_name = meta_content(&doc, &OG_SITE_NAME);

    Metadata {
        title: take_chars(&title, MAX_TITLE_CHARS).to_string(),
        description: take_chars(&description, MAX_DESCRIPTION_CHARS).to_string(),
        image_url,
        site_name,
    }
}

fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|s| !s.is_empty())
}

fn element_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|s| !s.is_empty())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_http(base: &Url, src: &str) -> Option<String> {
    let resolved = base.join(src).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}
