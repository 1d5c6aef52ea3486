//! Post text composition under the 300 character limit.
//!
//! Every policy builds text from a free-form content portion and an
//! identifying reference (the permalink or a like/repost marker line).
//! When the result is too long only the content is cut, and the text
//! takes the form `"{content}...\n\n{reference}"`, exactly
//! [`MAX_TEXT_CHARS`] long.
//!
//! Lengths are counted in `char`s.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::links::contains_url;

/// Maximum post length.
pub const MAX_TEXT_CHARS: usize = 300;

/// Inserted where content is cut.
pub const ELLIPSIS: &str = "...";

/// Marker prefixed to the liked URL.
pub const LIKE_MARKER: &str = "❤️";

/// Marker prefixed to the reposted URL.
pub const REPOST_MARKER: &str = "🔁";

const REFERENCE_SEPARATOR: &str = "\n\n";

/// Final post text, guaranteed to be at most [`MAX_TEXT_CHARS`] long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComposedText {
    text: String,
    #[serde(skip)]
    truncated: bool,
    /// Byte length of the content prefix, ellipsis and reference excluded.
    #[serde(skip)]
    content_len: usize,
}

impl ComposedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The authored part of the text, without ellipsis or reference line.
    pub fn content(&self) -> &str {
        &self.text[..self.content_len]
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// `true` if content was cut to fit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

impl fmt::Display for ComposedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for ComposedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` chars of `s`.
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// New-post policy.
///
/// With a `name` the text is `"{name} {permalink}"`. Otherwise it is the
/// extracted content, followed by the permalink when `include_permalink`
/// is set and the content does not already contain it. Over-long content
/// is truncated with the permalink kept as reference.
pub fn compose_post(
    name: Option<&str>,
    content: &str,
    permalink: Option<&str>,
    include_permalink: bool,
) -> Result<ComposedText> {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        let url = permalink.ok_or(Error::MissingPermalink)?;
        return fit(name, " ", Some(url));
    }

    let content = content.trim();
    if char_len(content) > MAX_TEXT_CHARS {
        let url = permalink.ok_or(Error::MissingPermalink)?;
        return fit(content, REFERENCE_SEPARATOR, Some(url));
    }

    if include_permalink {
        let url = permalink.ok_or(Error::MissingPermalink)?;
        if !contains_url(content, url) {
            return fit(content, REFERENCE_SEPARATOR, Some(url));
        }
    }
    fit(content, REFERENCE_SEPARATOR, None)
}

/// Like policy for URLs outside the account.
pub fn compose_like(content: &str, liked: &str) -> Result<ComposedText> {
    compose_reaction(content, LIKE_MARKER, liked)
}

/// Repost policy for URLs outside the account.
pub fn compose_repost(content: &str, reposted: &str) -> Result<ComposedText> {
    compose_reaction(content, REPOST_MARKER, reposted)
}

/// Bookmark policy: commentary followed by the permalink.
///
/// The bookmarked URL travels in the link card, not the text.
pub fn compose_bookmark(commentary: &str, permalink: Option<&str>) -> Result<ComposedText> {
    let url = permalink.ok_or(Error::MissingPermalink)?;
    fit(commentary.trim(), REFERENCE_SEPARATOR, Some(url))
}

fn compose_reaction(content: &str, marker: &str, target: &str) -> Result<ComposedText> {
    let content = content.trim();
    let marker_line = format!("{marker} {target}");

    let already_referenced = contains_url(content, target) && char_len(content) <= MAX_TEXT_CHARS;
    let reference = (!already_referenced).then_some(marker_line.as_str());
    fit(content, REFERENCE_SEPARATOR, reference)
}

/// Join content and reference, truncating the content when needed.
fn fit(content: &str, joiner: &str, reference: Option<&str>) -> Result<ComposedText> {
    let full = match reference {
        Some(r) if content.is_empty() => r.to_string(),
        Some(r) => format!("{content}{joiner}{r}"),
        None => content.to_string(),
    };
    if char_len(&full) <= MAX_TEXT_CHARS {
        return Ok(ComposedText {
            text: full,
            truncated: false,
            content_len: content.len(),
        });
    }

    let (kept, suffix) = match reference {
        None => (
            take_chars(content, MAX_TEXT_CHARS - char_len(ELLIPSIS)),
            ELLIPSIS.to_string(),
        ),
        Some(r) => {
            let suffix = format!("{ELLIPSIS}{REFERENCE_SEPARATOR}{r}");
            let overhead = char_len(&suffix);
            if overhead > MAX_TEXT_CHARS {
                return Err(Error::ReferenceTooLong(r.to_string()));
            }
            (take_chars(content, MAX_TEXT_CHARS - overhead), suffix)
        }
    };

    Ok(ComposedText {
        text: format!("{kept}{suffix}"),
        truncated: true,
        content_len: kept.len(),
    })
}
