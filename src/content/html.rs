//! HTML to plain text rendering.
//!
//! Walks the `scraper` DOM instead of going through markdown: social
//! post text has no markup, so anchors keep only their text and images
//! disappear. html5ever recovers from any malformed input, so rendering
//! never fails.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Elements that start a new paragraph.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6",
    "figure", "figcaption", "section", "article", "header", "footer", "table", "tr",
];

/// Elements whose subtree never contributes text.
const SKIPPED_ELEMENTS: &[&str] = &["img", "script", "style", "template", "picture", "video"];

/// A hyperlink found in HTML content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Visible anchor text, whitespace-collapsed.
    pub text: String,
    /// The `href` attribute, trimmed.
    pub href: String,
}

impl Anchor {
    /// `true` for absolute `http`/`https` targets.
    pub fn is_absolute(&self) -> bool {
        is_http_url(&self.href)
    }
}

pub(crate) fn is_http_url(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Render HTML to plain text.
///
/// Block elements are separated by a blank line, `<br>` becomes a
/// newline, and runs of whitespace collapse to a single space.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = TextBuilder::default();
    render(fragment.root_element(), &mut out);
    out.finish()
}

/// All anchors with an `href`, in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            Some(Anchor {
                text,
                href: href.to_string(),
            })
        })
        .collect()
}

/// Text content of every text node, in document order.
///
/// Unlike [`html_to_text`] this keeps nothing but raw text, which is what
/// URL scanning wants.
pub fn text_nodes(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::to_string)
        .collect()
}

fn render(element: ElementRef<'_>, out: &mut TextBuilder) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_text(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.line_break();
        } else if BLOCK_ELEMENTS.contains(&name) {
            out.paragraph_break();
            render(child, out);
            out.paragraph_break();
        } else {
            render(child, out);
        }
    }
}

#[derive(Default)]
struct TextBuilder {
    paragraphs: Vec<String>,
    current: String,
    pending_space: bool,
}

impl TextBuilder {
    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = !self.current.is_empty() && !self.current.ends_with('\n');
            } else {
                if self.pending_space {
                    self.current.push(' ');
                    self.pending_space = false;
                }
                self.current.push(c);
            }
        }
    }

    fn line_break(&mut self) {
        if !self.current.is_empty() {
            self.current.push('\n');
        }
        self.pending_space = false;
    }

    fn paragraph_break(&mut self) {
        let paragraph = self.current.trim();
        if !paragraph.is_empty() {
            self.paragraphs.push(paragraph.to_string());
        }
        self.current.clear();
        self.pending_space = false;
    }

    fn finish(mut self) -> String {
        self.paragraph_break();
        self.paragraphs.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_blank_line_separated() {
        let text = html_to_text("<p>First   paragraph</p><p>Second\nparagraph</p>");
        assert_eq!(text, "First paragraph\n\nSecond paragraph");
    }

    #[test]
    fn line_breaks_are_kept() {
        assert_eq!(html_to_text("<p>one<br>two<br/> three</p>"), "one\ntwo\nthree");
    }

    #[test]
    fn anchors_keep_text_and_images_vanish() {
        let html = r#"<p>See <a href="https://a.example">this post</a><img src="x.png" alt="pic"> now</p>"#;
        assert_eq!(html_to_text(html), "See this post now");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(html_to_text("<p>Fish &amp; chips &lt;3</p>"), "Fish & chips <3");
    }

    #[test]
    fn malformed_markup_renders_as_text() {
        assert_eq!(html_to_text("<p>unclosed <b>bold"), "unclosed bold");
        assert_eq!(html_to_text("a < b and c > d"), "a < b and c > d");
    }

    #[test]
    fn anchors_are_collected_in_order() {
        let html = r#"<a href=" https://a.example/1 ">One  link</a> and <a href="/rel">two</a><a>none</a>"#;
        let found = anchors(html);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].href, "https://a.example/1");
        assert_eq!(found[0].text, "One link");
        assert!(found[0].is_absolute());
        assert!(!found[1].is_absolute());
    }

    #[test]
    fn text_nodes_skip_attribute_values() {
        let html = r#"<p>visit https://b.example <a href="https://a.example">here</a></p>"#;
        let joined = text_nodes(html).join("");
        assert!(joined.contains("https://b.example"));
        assert!(!joined.contains("https://a.example"));
    }
}
