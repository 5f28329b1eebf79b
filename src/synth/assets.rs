//! Asset reference rewriting
//!
//! Replaces references to project images with their data URIs in three
//! places: `<img src>`, `url(...)` inside inline `style` attributes, and
//! `url(...)` inside the aggregated stylesheet. Unresolved references are
//! left exactly as written.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*)["']([^"']+)["']"#).expect("valid img regex")
});
static STYLE_ATTR_DOUBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\sstyle\s*=\s*)"([^"]*)""#).expect("valid style attr regex")
});
static STYLE_ATTR_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\sstyle\s*=\s*)'([^']*)'"#).expect("valid style attr regex")
});
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*["']?([^"')]+?)["']?\s*\)"#).expect("valid url regex")
});

/// Strip query string and fragment from a reference
fn clean_reference(reference: &str) -> &str {
    let reference = reference.split('?').next().unwrap_or(reference);
    reference.split('#').next().unwrap_or(reference).trim()
}

fn lookup(reference: &str, resolve: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let reference = clean_reference(reference);
    if reference.is_empty() || reference.starts_with("data:") {
        return None;
    }
    resolve(reference)
}

/// Rewrite `url(...)` references, quoting replacements with `quote`
fn rewrite_urls(css: &str, quote: char, resolve: &dyn Fn(&str) -> Option<String>) -> String {
    CSS_URL
        .replace_all(css, |caps: &Captures<'_>| match lookup(&caps[1], resolve) {
            Some(data) => format!("url({q}{}{q})", data, q = quote),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Rewrite asset references in the aggregated stylesheet
pub fn rewrite_css(css: &str, resolve: &dyn Fn(&str) -> Option<String>) -> String {
    rewrite_urls(css, '"', resolve)
}

/// Rewrite `<img src>` and inline-style asset references in markup
pub fn rewrite_markup(html: &str, resolve: &dyn Fn(&str) -> Option<String>) -> String {
    let html = IMG_SRC.replace_all(html, |caps: &Captures<'_>| match lookup(&caps[2], resolve) {
        Some(data) => format!("{}\"{}\"", &caps[1], data),
        None => caps[0].to_string(),
    });

    // The replacement quote must differ from the attribute's own quote
    let html = STYLE_ATTR_DOUBLE.replace_all(&html, |caps: &Captures<'_>| {
        format!("{}\"{}\"", &caps[1], rewrite_urls(&caps[2], '\'', resolve))
    });
    STYLE_ATTR_SINGLE
        .replace_all(&html, |caps: &Captures<'_>| {
            format!("{}'{}'", &caps[1], rewrite_urls(&caps[2], '"', resolve))
        })
        .into_owned()
}
