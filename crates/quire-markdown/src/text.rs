//! HTML text helpers.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Escape a single character for HTML output, if it needs escaping.
pub(crate) fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters.
///
/// # Examples
///
/// ```
/// use quire_markdown::escape_html;
///
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// ```
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match escape_char(c) {
            Some(escaped) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

/// Remove every HTML tag from `html` and trim surrounding whitespace.
///
/// Entities are left as they are, so the result is still safe to embed in
/// HTML.
///
/// # Examples
///
/// ```
/// use quire_markdown::strip_tags;
///
/// assert_eq!(strip_tags("<p>Hello <em>world</em></p>\n"), "Hello world");
/// ```
#[must_use]
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").trim().to_owned()
}
