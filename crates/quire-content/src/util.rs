//! Slug and URL helpers.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

static SLUG_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+|/|\||:").unwrap());

/// Characters left untouched by [`encode_url`] besides ASCII alphanumerics.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'*');

/// Turn a file stem or title into a URL-safe slug.
///
/// Runs of whitespace, `/`, `|` and `:` become `_` and the result is
/// lower-cased. Slugifying a slug returns it unchanged.
///
/// # Examples
///
/// ```
/// use quire_content::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello_world");
/// assert_eq!(slugify("a/b|c:d"), "a_b_c_d");
/// assert_eq!(slugify("hello_world"), "hello_world");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    SLUG_SEPARATOR_RE.replace_all(input, "_").to_lowercase()
}

/// Remove a single trailing `/`, leaving the root path `/` as it is.
///
/// # Examples
///
/// ```
/// use quire_content::remove_trailing_slash;
///
/// assert_eq!(remove_trailing_slash("/"), "/");
/// assert_eq!(remove_trailing_slash("blog/"), "blog");
/// assert_eq!(remove_trailing_slash("/blog"), "/blog");
/// ```
#[must_use]
pub fn remove_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Percent-encode a URL as UTF-8.
///
/// Everything except ASCII alphanumerics and `.`, `-`, `_`, `*` is encoded,
/// including `/` and `:`, so the result can be embedded as a query value.
///
/// # Examples
///
/// ```
/// use quire_content::encode_url;
///
/// assert_eq!(encode_url("https://a.io/x y"), "https%3A%2F%2Fa.io%2Fx%20y");
/// ```
#[must_use]
pub fn encode_url(url: &str) -> String {
    utf8_percent_encode(url, URL_ENCODE_SET).to_string()
}

/// Strip the extension (everything from the last `.`) from a file name.
pub(crate) fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(idx) => &filename[..idx],
    }
}
