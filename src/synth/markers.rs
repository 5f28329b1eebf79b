//! Injection markers
//!
//! Every block the synthesizer adds to a document carries an `id` with
//! the `livepane-` prefix. This module is the only place that locates,
//! strips or inserts those blocks, and the only place that touches the
//! structural tags (`<html>`, `<head>`, `<body>`) of user markup.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Prefix shared by every injected block id
pub const MARKER_PREFIX: &str = "livepane-";

static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<style\b[^>]*\bid\s*=\s*["']livepane-[A-Za-z0-9_-]+["'][^>]*>.*?</style\s*>"#)
        .expect("valid style marker regex")
});
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*\bid\s*=\s*["']livepane-[A-Za-z0-9_-]+["'][^>]*>.*?</script\s*>"#)
        .expect("valid script marker regex")
});
static LINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link\b[^>]*\bid\s*=\s*["']livepane-[A-Za-z0-9_-]+["'][^>]*>"#)
        .expect("valid link marker regex")
});
static GENERATION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<script id="livepane-diagnostics" data-generation=")\d+(")"#)
        .expect("valid generation regex")
});

static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(?:\s|<!--.*?-->)*<!doctype[^>]*>").expect("valid doctype regex")
});
/// Regions a browser never reads tags from: comments and raw-text elements
static OPAQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<!--.*?-->",
        r"|<script\b[^>]*>.*?</script\s*>",
        r"|<style\b[^>]*>.*?</style\s*>",
    ))
    .expect("valid opaque region regex")
});
static HTML_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html(?:\s[^>]*)?>").expect("valid regex"));
static HTML_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</html\s*>").expect("valid regex"));
static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("valid regex"));
static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("valid regex"));
static BODY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").expect("valid regex"));
static BODY_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("valid regex"));

static SCRIPT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</script").expect("valid regex"));
static STYLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</style").expect("valid regex"));

/// Identifier of an injected block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Diagnostics capture script
    Diagnostics,
    /// Aggregated user styles
    Styles,
    /// Aggregated user scripts
    Scripts,
    /// Third-party capability, by sanitized name
    Capability(String),
}

impl Marker {
    /// The `id` attribute value of the block
    pub fn id(&self) -> String {
        match self {
            Marker::Diagnostics => format!("{}diagnostics", MARKER_PREFIX),
            Marker::Styles => format!("{}styles", MARKER_PREFIX),
            Marker::Scripts => format!("{}scripts", MARKER_PREFIX),
            Marker::Capability(name) => format!("{}cap-{}", MARKER_PREFIX, sanitize(name)),
        }
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect()
}

/// Copy of `html` with comments and script/style elements blanked out.
/// Byte offsets are preserved, so matches map back onto `html`.
fn masked(html: &str) -> String {
    let mut bytes = html.as_bytes().to_vec();
    for m in OPAQUE.find_iter(html) {
        bytes[m.range()].fill(b' ');
    }
    // Whole regions starting and ending on ASCII were replaced
    String::from_utf8(bytes).unwrap_or_else(|_| html.to_string())
}

fn find_first(re: &Regex, html: &str) -> Option<Range<usize>> {
    re.find(&masked(html)).map(|m| m.range())
}

fn find_last(re: &Regex, html: &str) -> Option<Range<usize>> {
    re.find_iter(&masked(html)).last().map(|m| m.range())
}

/// Remove every match of `re` outside comments and raw-text elements
fn remove_all(re: &Regex, html: &str) -> String {
    let mask = masked(html);
    let mut out = html.to_string();
    let ranges: Vec<Range<usize>> = re.find_iter(&mask).map(|m| m.range()).collect();
    for range in ranges.into_iter().rev() {
        out.replace_range(range, "");
    }
    out
}

/// Remove every previously injected block
pub fn strip_all(html: &str) -> String {
    let html = SCRIPT_BLOCK.replace_all(html, "");
    let html = STYLE_BLOCK.replace_all(&html, "");
    LINK_BLOCK.replace_all(&html, "").into_owned()
}

/// Ensure a doctype and exactly one `<html>`, `<head>` and `<body>`
/// open/close pair, synthesizing whatever is missing.
pub fn ensure_structure(html: &str) -> String {
    let html = html.strip_prefix('\u{feff}').unwrap_or(html);
    let (prologue, rest) = match DOCTYPE.find(html) {
        Some(m) => (html[..m.end()].trim_start().to_string(), &html[m.end()..]),
        None => ("<!DOCTYPE html>\n".to_string(), html),
    };

    let mut doc = if find_first(&HTML_OPEN, rest).is_some() {
        let mut doc = rest.to_string();
        if find_first(&HTML_CLOSE, &doc).is_none() {
            doc.push_str("</html>");
        }
        doc
    } else {
        format!("<html>{}</html>", remove_all(&HTML_CLOSE, rest))
    };

    if find_first(&HEAD_OPEN, &doc).is_none() {
        doc = remove_all(&HEAD_CLOSE, &doc);
        let at = match find_first(&BODY_OPEN, &doc) {
            Some(r) => r.start,
            None => find_first(&HTML_OPEN, &doc).map(|r| r.end).unwrap_or(0),
        };
        doc.insert_str(at, "<head></head>");
    } else if find_first(&HEAD_CLOSE, &doc).is_none() {
        let at = match find_first(&BODY_OPEN, &doc) {
            Some(r) => r.start,
            None => find_first(&HEAD_OPEN, &doc).map(|r| r.end).unwrap_or(0),
        };
        doc.insert_str(at, "</head>");
    }

    if find_first(&BODY_OPEN, &doc).is_none() {
        doc = remove_all(&BODY_CLOSE, &doc);
        let start = find_first(&HEAD_CLOSE, &doc).map(|r| r.end).unwrap_or(0);
        let end = find_last(&HTML_CLOSE, &doc)
            .map(|r| r.start)
            .unwrap_or(doc.len())
            .max(start);
        doc.insert_str(end, "</body>");
        doc.insert_str(start, "<body>");
    } else if find_first(&BODY_CLOSE, &doc).is_none() {
        let end = find_last(&HTML_CLOSE, &doc)
            .map(|r| r.start)
            .unwrap_or(doc.len());
        doc.insert_str(end, "</body>");
    }

    format!("{}{}", prologue, doc)
}

/// Insert `block` as the first content of `<head>`.
///
/// Expects a document that went through [`ensure_structure`]; returns the
/// input unchanged when there is no head.
pub fn insert_after_head_open(html: &str, block: &str) -> String {
    match find_first(&HEAD_OPEN, html) {
        Some(r) => splice(html, r.end, block),
        None => html.to_string(),
    }
}

/// Insert `block` right before the last `</body>`
pub fn insert_before_body_close(html: &str, block: &str) -> String {
    match find_last(&BODY_CLOSE, html) {
        Some(r) => splice(html, r.start, block),
        None => html.to_string(),
    }
}

fn splice(html: &str, at: usize, block: &str) -> String {
    let mut out = String::with_capacity(html.len() + block.len());
    out.push_str(&html[..at]);
    out.push_str(block);
    out.push_str(&html[at..]);
    out
}

/// Stamp the document generation into the diagnostics block
pub fn set_generation(html: &str, generation: u64) -> String {
    GENERATION_ATTR
        .replace(html, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], generation, &caps[2])
        })
        .into_owned()
}

/// Wrap JavaScript in a marked `<script>` block
pub fn script_block(marker: &Marker, body: &str) -> String {
    format!("<script id=\"{}\">{}</script>", marker.id(), escape_script(body))
}

/// Wrap CSS in a marked `<style>` block
pub fn style_block(marker: &Marker, body: &str) -> String {
    format!("<style id=\"{}\">{}</style>", marker.id(), escape_style(body))
}

/// The diagnostics block, generation zero until the host stamps it
pub fn diagnostics_block(body: &str) -> String {
    format!(
        "<script id=\"{}\" data-generation=\"0\">{}</script>",
        Marker::Diagnostics.id(),
        escape_script(body)
    )
}

/// Keep a script body from closing its own block early
pub fn escape_script(body: &str) -> String {
    SCRIPT_END
        .replace_all(body, |caps: &regex::Captures<'_>| format!("<\\/{}", &caps[0][2..]))
        .into_owned()
}

/// Keep a style body from closing its own block early
pub fn escape_style(body: &str) -> String {
    STYLE_END
        .replace_all(body, |caps: &regex::Captures<'_>| format!("<\\/{}", &caps[0][2..]))
        .into_owned()
}

/// Escape a value for a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
