//! Placeholder link card thumbnails.
//!
//! When a linked page has no usable image, a card is drawn from its
//! title instead:
//! - Slate background (1200x630, standard OG dimensions)
//! - Title word-wrapped and centered, at most 4 lines of 35 chars
//! - Site name along the bottom edge
//!
//! The card is built as an SVG document and rasterized with `resvg`, so
//! the same title and site name always yield the same pixels on a given
//! font set.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::compose::{char_len, take_chars};
use crate::error::{Error, Result};

/// OG image dimensions.
pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 630;

pub const MAX_LINES: usize = 4;
pub const MAX_LINE_CHARS: usize = 35;

const LARGE_FONT_SIZE: u32 = 64;
const SMALL_FONT_SIZE: u32 = 48;
const SITE_FONT_SIZE: u32 = 28;
const SITE_BASELINE_OFFSET: u32 = 60;

const BACKGROUND: &str = "#1f2933";
const TITLE_COLOR: &str = "#f5f7fa";
const SITE_COLOR: &str = "#9aa5b1";

/// Font family string for SVG text.
const FONT_FAMILY: &str = "Inter, Helvetica, Arial, DejaVu Sans, sans-serif";

const ELLIPSIS: &str = "...";

/// Renders placeholder thumbnails. Loads system fonts once.
pub struct ThumbnailSynthesizer {
    options: Options<'static>,
}

impl ThumbnailSynthesizer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        Self { options }
    }

    /// Render a PNG card for `title` and `site_name`.
    pub fn synthesize(&self, title: &str, site_name: &str) -> Result<Vec<u8>> {
        let svg = card_svg(title, site_name);
        let tree = Tree::from_str(&svg, &self.options)
            .map_err(|e| Error::ImageEncode(format!("SVG parse error: {e}")))?;

        let mut pixmap = Pixmap::new(CANVAS_WIDTH, CANVAS_HEIGHT)
            .ok_or_else(|| Error::ImageEncode("failed to create pixmap".to_string()))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| Error::ImageEncode(format!("PNG encode error: {e}")))
    }
}

impl Default for ThumbnailSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Word-wrap a title into at most [`MAX_LINES`] lines of at most
/// [`MAX_LINE_CHARS`] chars.
///
/// Words longer than a line are cut and end in `...`. If the title does
/// not fit in the available lines, the last line ends in `...`.
pub fn wrap_title(title: &str) -> Vec<String> {
    let words = title.split_whitespace().map(|word| {
        if char_len(word) > MAX_LINE_CHARS {
            let keep = MAX_LINE_CHARS - ELLIPSIS.len();
            format!("{}{ELLIPSIS}", take_chars(word, keep))
        } else {
            word.to_string()
        }
    });

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut cut = false;

    for word in words {
        if current.is_empty() {
            current = word;
        } else if char_len(&current) + 1 + char_len(&word) <= MAX_LINE_CHARS {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
            if lines.len() == MAX_LINES {
                cut = true;
                break;
            }
        }
    }

    if cut {
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last);
        }
    } else if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn ellipsize(line: &str) -> String {
    if line.ends_with(ELLIPSIS) {
        return line.to_string();
    }
    let keep = MAX_LINE_CHARS - ELLIPSIS.len();
    format!("{}{ELLIPSIS}", take_chars(line, keep).trim_end())
}

fn font_size(line_count: usize) -> u32 {
    if line_count > 2 {
        SMALL_FONT_SIZE
    } else {
        LARGE_FONT_SIZE
    }
}

/// Build the SVG document for a card.
pub fn card_svg(title: &str, site_name: &str) -> String {
    let lines = wrap_title(title);
    let size = font_size(lines.len());
    let line_height = size * 5 / 4;

    let mut svg = String::with_capacity(2048);
    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="{BACKGROUND}"/>"##,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
    ));

    let count = u32::try_from(lines.len()).unwrap_or(0);
    let block_top = CANVAS_HEIGHT / 2 - count * line_height / 2;
    for (i, line) in (0_u32..).zip(&lines) {
        let y = block_top + i * line_height + line_height / 2;
        svg.push_str(&format!(
            r##"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" font-family="{FONT_FAMILY}" font-size="{size}" font-weight="700" fill="{TITLE_COLOR}">{text}</text>"##,
            x = CANVAS_WIDTH / 2,
            text = escape_xml(line),
        ));
    }

    let site_name = site_name.trim();
    if !site_name.is_empty() {
        svg.push_str(&format!(
            r##"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" font-family="{FONT_FAMILY}" font-size="{SITE_FONT_SIZE}" fill="{SITE_COLOR}">{text}</text>"##,
            x = CANVAS_WIDTH / 2,
            y = CANVAS_HEIGHT - SITE_BASELINE_OFFSET,
            text = escape_xml(take_chars(site_name, 60)),
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
