//! External URL selection.
//!
//! Picks the one URL a post is "about", used for link cards. Marker
//! properties win outright. Otherwise every URL in the content is
//! harvested into an ordered set and the last one is chosen, since the
//! closing link of authored content is usually the main reference.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::content::html;
use crate::properties::PostProperties;

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("static regex"));

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Insertion-ordered set of URLs.
#[derive(Debug, Default)]
pub struct UrlSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `url` unless already present. Returns `true` if inserted.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.order.push(url.to_string());
        true
    }

    pub fn extend<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            self.insert(url.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Find bare URLs in text, with trailing punctuation removed.
pub fn find_bare_urls(text: &str) -> Vec<String> {
    BARE_URL
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|url| !url.ends_with("://"))
        .map(str::to_string)
        .collect()
}

/// `true` if `url` appears in `text` as a whole bare URL.
///
/// A longer URL sharing `url` as a prefix does not count.
pub fn contains_url(text: &str, url: &str) -> bool {
    let url = url.trim_end_matches(TRAILING_PUNCTUATION);
    !url.is_empty() && find_bare_urls(text).iter().any(|found| found == url)
}

/// Every URL in the post content, deduplicated in first-seen order.
///
/// Order: absolute anchor hrefs, then bare URLs in the HTML's text, then
/// bare URLs in the plain-text content.
pub fn harvest_urls(properties: &PostProperties) -> UrlSet {
    let mut urls = UrlSet::new();
    let Some(content) = &properties.content else {
        return urls;
    };

    if let Some(markup) = &content.html {
        urls.extend(
            html::anchors(markup)
                .into_iter()
                .filter(html::Anchor::is_absolute)
                .map(|a| a.href),
        );
        for text in html::text_nodes(markup) {
            urls.extend(find_bare_urls(&text));
        }
    }
    if let Some(text) = &content.text {
        urls.extend(find_bare_urls(text));
    }
    urls
}

/// Select the URL representing the post's subject.
///
/// `bookmark-of`, `like-of` and `in-reply-to` take priority in that
/// order. Otherwise the last harvested URL is used; when `own_domain` is
/// given, the last URL on another host is preferred.
pub fn select_external_url(properties: &PostProperties, own_domain: Option<&str>) -> Option<String> {
    let marker = [
        &properties.bookmark_of,
        &properties.like_of,
        &properties.in_reply_to,
    ]
    .into_iter()
    .find_map(Option::as_deref);
    if let Some(marker) = marker {
        return Some(marker.to_string());
    }

    let urls = harvest_urls(properties);
    let fallback = urls.last()?;

    if let Some(domain) = own_domain.filter(|d| !d.is_empty()) {
        if let Some(foreign) = urls.iter().rev().find(|url| !host_contains(url, domain)) {
            return Some(foreign.to_string());
        }
    }
    Some(fallback.to_string())
}

fn host_contains(url: &str, domain: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.contains(domain)))
        .unwrap_or(false)
}
