//! Content units and their per-language views.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::front_matter::{FrontMatter, FrontMatterFormat};

/// Rendered content of one language segment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LocalizedContent {
    /// Body rendered to HTML.
    pub html: String,
    /// Preview rendered to HTML.
    pub preview: String,
    /// Preview with all tags stripped.
    pub preview_text: String,
}

/// One parsed document with everything computed during collection assembly.
#[derive(Clone, Debug, Serialize)]
pub struct Fragment {
    pub source_path: PathBuf,
    /// File name including extension; the key for click counting.
    pub filename: String,
    /// Name of the owning collection.
    pub collection: String,
    pub front_matter_format: FrontMatterFormat,
    pub front_matter: FrontMatter,
    pub title: String,
    /// Never empty.
    pub slug: String,
    pub visible: bool,
    /// Explicit order from front matter, or the back-filled position after
    /// assembly. `None` only before assembly.
    pub order: Option<i32>,
    pub date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub template: String,
    pub default_language: String,
    /// Content per language code (`xx` or `xx-YY`).
    pub languages: BTreeMap<String, LocalizedContent>,
    /// Path part of the URL.
    pub url: String,
    /// Protocol + domain + `url`.
    pub full_url: String,
    /// Percent-encoded `full_url`.
    pub full_url_encoded: String,
    /// Extra entries merged into this fragment's rendering context.
    pub context: Map<String, Value>,
}

/// Read-only view of a fragment in one language.
///
/// Serializes as the fragment's fields plus `language`, `content`, `preview`
/// and `preview_text` for the resolved language.
#[derive(Clone, Debug, Serialize)]
pub struct FragmentView<'a> {
    #[serde(flatten)]
    pub fragment: &'a Fragment,
    /// Language actually shown, after fallback.
    pub language: &'a str,
    pub content: Cow<'a, str>,
    pub preview: Cow<'a, str>,
    pub preview_text: Cow<'a, str>,
}

impl Fragment {
    /// Content for the default language, if present.
    #[must_use]
    pub fn default_content(&self) -> Option<&LocalizedContent> {
        self.languages.get(&self.default_language)
    }

    /// Language codes this fragment has content for.
    pub fn language_codes(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// View this fragment in the requested language.
    ///
    /// Falls back to the default language when `language` is `None` or not
    /// present, and to a placeholder text when the default language is
    /// missing too. Line separators (U+2028) are removed from the content.
    #[must_use]
    pub fn localized(&self, language: Option<&str>) -> FragmentView<'_> {
        let requested = language
            .and_then(|lang| self.languages.get_key_value(lang))
            .or_else(|| self.languages.get_key_value(&self.default_language));

        match requested {
            Some((code, localized)) => FragmentView {
                fragment: self,
                language: code,
                content: remove_line_separators(&localized.html),
                preview: Cow::Borrowed(&localized.preview),
                preview_text: Cow::Borrowed(&localized.preview_text),
            },
            None => {
                let text = format!(
                    "No content defined for this language: {}",
                    self.default_language
                );
                FragmentView {
                    fragment: self,
                    language: &self.default_language,
                    content: Cow::Owned(text.clone()),
                    preview: Cow::Owned(text.clone()),
                    preview_text: Cow::Owned(text),
                }
            }
        }
    }
}

fn remove_line_separators(html: &str) -> Cow<'_, str> {
    if html.contains('\u{2028}') {
        Cow::Owned(html.replace('\u{2028}', ""))
    } else {
        Cow::Borrowed(html)
    }
}

/// Presentation order for lists of fragments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FragmentOrder {
    /// Ascending `order`.
    #[default]
    ByOrder,
    /// Title, ignoring case.
    ByTitle,
    /// Newest first; undated fragments last.
    ByDate,
}

impl FragmentOrder {
    /// Compare two fragments under this ordering.
    #[must_use]
    pub fn compare(self, a: &Fragment, b: &Fragment) -> Ordering {
        match self {
            Self::ByOrder => compare_order(a.order, b.order),
            Self::ByTitle => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::ByDate => match (a.date, b.date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }

    /// Sort fragments in place; the sort is stable.
    pub fn sort(self, fragments: &mut [&Fragment]) {
        fragments.sort_by(|a, b| self.compare(a, b));
    }
}

/// Explicit orders first, ascending; unset orders after them.
pub(crate) fn compare_order(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
