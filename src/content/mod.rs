//! Plain-text extraction from post content.
//!
//! HTML content is rendered by [`html::html_to_text`]. Because the link
//! targets of anchors are lost in that rendering, the last absolute
//! `href` is surfaced again as a trailing bare URL so the post keeps its
//! final link.
//!
//! # Example
//!
//! ```rust
//! use crosspost::content::extract_text;
//! use crosspost::Content;
//!
//! let content = Content::html(r#"<p>Read <a href="https://a.example/post">this</a></p>"#);
//! assert_eq!(extract_text(&content), "Read this https://a.example/post");
//! ```

pub mod html;

use crate::links::contains_url;
use crate::properties::Content;

/// Render content to plain text.
///
/// Prefers `html` over `text`; returns an empty string when neither is
/// present.
///
/// The re-appended link is the last *absolute* `http(s)` href, not the
/// last href overall: relative targets such as tag pages cannot be
/// followed from another site, so an earlier absolute link wins over a
/// later relative one. It is skipped when the text already holds that
/// exact URL.
pub fn extract_text(content: &Content) -> String {
    if let Some(markup) = &content.html {
        let mut text = html::html_to_text(markup);
        let last_href = html::anchors(markup)
            .into_iter()
            .rev()
            .find(html::Anchor::is_absolute)
            .map(|a| a.href);

        if let Some(href) = last_href {
            if !contains_url(&text, &href) {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&href);
            }
        }
        return text;
    }

    content.text.clone().unwrap_or_default()
}

/// Like [`extract_text`], for optional content.
pub fn extract_optional(content: Option<&Content>) -> String {
    content.map(extract_text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_is_returned_verbatim() {
        let content = Content::text("  spaced\n\ntext  ");
        assert_eq!(extract_text(&content), "  spaced\n\ntext  ");
    }

    #[test]
    fn empty_content_gives_empty_string() {
        assert_eq!(extract_text(&Content::default()), "");
        assert_eq!(extract_optional(None), "");
    }

    #[test]
    fn html_wins_over_text() {
        let content = Content {
            html: Some("<p>from html</p>".to_string()),
            text: Some("from text".to_string()),
        };
        assert_eq!(extract_text(&content), "from html");
    }

    #[test]
    fn only_the_last_href_is_appended() {
        let content = Content::html(
            r#"<p><a href="https://a.example/1">first</a> and <a href="https://b.example/2">second</a></p>"#,
        );
        assert_eq!(
            extract_text(&content),
            "first and second https://b.example/2"
        );
    }

    #[test]
    fn href_already_in_text_is_not_repeated() {
        let content = Content::html(
            r#"<p>Link: <a href="https://a.example/x">https://a.example/x</a></p>"#,
        );
        assert_eq!(extract_text(&content), "Link: https://a.example/x");
    }

    #[test]
    fn longer_url_in_text_does_not_hide_final_href() {
        let content = Content::html(
            r#"<p>https://a.example/x2 and <a href="https://a.example/x">x</a></p>"#,
        );
        assert_eq!(
            extract_text(&content),
            "https://a.example/x2 and x https://a.example/x"
        );
    }

    #[test]
    fn earlier_absolute_href_wins_over_later_relative_one() {
        let content = Content::html(
            r#"<p><a href="https://a.example/x">x</a> <a href="/tags/rust">#rust</a></p>"#,
        );
        assert_eq!(extract_text(&content), "x #rust https://a.example/x");
    }

    #[test]
    fn relative_hrefs_are_not_surfaced() {
        let content = Content::html(r##"<p>Tagged <a href="/tags/rust">#rust</a></p>"##);
        assert_eq!(extract_text(&content), "Tagged #rust");
    }
}
