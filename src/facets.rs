//! Rich-text spans over post text.
//!
//! Two producers annotate the same text: the external facet detector
//! (mentions, hashtags, bare links) and link spans derived here from the
//! anchors of the HTML source. [`merge_spans`] combines any number of
//! producers by position; ranges are UTF-8 byte offsets.

use std::ops::Range;

use serde::Serialize;

use crate::content::html::{self, Anchor};

/// What a facet points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FacetFeature {
    Link { uri: String },
    Mention { did: String },
    Tag { tag: String },
}

/// An annotated byte range of post text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub range: Range<usize>,
    pub feature: FacetFeature,
}

impl Facet {
    pub fn link(range: Range<usize>, uri: impl Into<String>) -> Self {
        Self {
            range,
            feature: FacetFeature::Link { uri: uri.into() },
        }
    }
}

/// Anything covering a range of text.
pub trait Span {
    fn span(&self) -> Range<usize>;
}

impl Span for Facet {
    fn span(&self) -> Range<usize> {
        self.range.clone()
    }
}

impl Span for Range<usize> {
    fn span(&self) -> Range<usize> {
        self.clone()
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Merge span producers into one position-ordered list.
///
/// Producers are given in priority order: a span overlapping one already
/// accepted from an earlier producer (or earlier in the same producer)
/// is dropped.
pub fn merge_spans<T, P>(producers: P) -> Vec<T>
where
    T: Span,
    P: IntoIterator<Item = Vec<T>>,
{
    let mut accepted: Vec<T> = Vec::new();
    for mut spans in producers {
        spans.sort_by_key(|s| s.span().start);
        for span in spans {
            let range = span.span();
            if range.is_empty() || accepted.iter().any(|a| overlaps(&a.span(), &range)) {
                continue;
            }
            accepted.push(span);
        }
    }
    accepted.sort_by_key(|s| s.span().start);
    accepted
}

/// Link facets for anchors whose text appears in `text`.
///
/// Anchors are matched in document order, each after the previous match.
/// Anchors with relative targets or whose text did not survive
/// composition are skipped.
pub fn link_facets(anchors: &[Anchor], text: &str) -> Vec<Facet> {
    let mut facets = Vec::new();
    let mut cursor = 0;

    for anchor in anchors.iter().filter(|a| a.is_absolute() && !a.text.is_empty()) {
        let Some(pos) = text[cursor..].find(&anchor.text) else {
            continue;
        };
        let start = cursor + pos;
        let end = start + anchor.text.len();
        facets.push(Facet::link(start..end, anchor.href.clone()));
        cursor = end;
    }
    facets
}

/// [`link_facets`] for the anchors of an HTML document.
pub fn derive_link_facets(markup: &str, text: &str) -> Vec<Facet> {
    link_facets(&html::anchors(markup), text)
}
