//! Front matter model and decoding.
//!
//! Front matter is the metadata block at the top of every document. It is
//! either YAML fenced by a line of three or more dashes, or JSON fenced by
//! `{{{` / `}}}`:
//!
//! ```text
//! ---
//! title: Hello
//! tags: [rust, web]
//! ---
//! ```
//!
//! ```text
//! {{{
//! "title": "Hello",
//! "tags": ["rust", "web"]
//! }}}
//! ```
//!
//! Values are kept as [`serde_json::Value`] so that unknown keys survive
//! untouched and can be handed to the rendering context. The accessors on
//! [`FrontMatter`] interpret the well-known keys with explicit fallbacks.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding the explicit slug.
pub const SLUG_KEY: &str = "slug";
/// Key holding the title.
pub const TITLE_KEY: &str = "title";
/// Key holding the publish date (`yyyy-MM-dd` or `yyyy-MM-ddTHH:mm`).
pub const DATE_KEY: &str = "date";
/// Key holding the template override.
pub const TEMPLATE_KEY: &str = "template";
/// Key holding the visibility flag.
pub const VISIBLE_KEY: &str = "visible";
/// Key holding the explicit order.
pub const ORDER_KEY: &str = "order";
/// Key holding the explicit preview.
pub const PREVIEW_KEY: &str = "preview";
/// Key holding the list of tags.
pub const TAGS_KEY: &str = "tags";
/// Key holding the list of categories.
pub const CATEGORIES_KEY: &str = "categories";

/// Encoding of a front matter block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterFormat {
    /// `---` fenced YAML.
    Yaml,
    /// `{{{` / `}}}` fenced JSON members.
    Json,
}

impl FrontMatterFormat {
    /// Closing delimiter for JSON front matter.
    pub const JSON_CLOSING: &'static str = "}}}";

    /// Detect the format from an opening fence line.
    ///
    /// Returns `None` when the line is not a fence.
    ///
    /// # Examples
    ///
    /// ```
    /// use quire_content::FrontMatterFormat;
    ///
    /// assert_eq!(FrontMatterFormat::detect("---"), Some(FrontMatterFormat::Yaml));
    /// assert_eq!(FrontMatterFormat::detect("-----"), Some(FrontMatterFormat::Yaml));
    /// assert_eq!(FrontMatterFormat::detect("{{{"), Some(FrontMatterFormat::Json));
    /// assert_eq!(FrontMatterFormat::detect("--"), None);
    /// assert_eq!(FrontMatterFormat::detect("# Title"), None);
    /// ```
    #[must_use]
    pub fn detect(line: &str) -> Option<Self> {
        if is_fence(line, '-') {
            Some(Self::Yaml)
        } else if is_fence(line, '{') {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// Closing delimiter matching the given opening fence.
    ///
    /// YAML blocks close with the exact opening line, JSON blocks with `}}}`.
    #[must_use]
    pub fn closing_delimiter<'a>(self, opening: &'a str) -> &'a str {
        match self {
            Self::Yaml => opening,
            Self::Json => Self::JSON_CLOSING,
        }
    }
}

fn is_fence(line: &str, c: char) -> bool {
    line.len() >= 3 && line.chars().all(|ch| ch == c)
}

/// Error decoding a front matter block.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// YAML syntax error.
    #[error("Invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON syntax error.
    #[error("Invalid JSON front matter: {0}")]
    Json(#[from] serde_json::Error),
    /// The block decoded to something other than a mapping.
    #[error("Front matter must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Decoded front matter: a sorted mapping from keys to arbitrary values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter(Map<String, Value>);

impl FrontMatter {
    /// Decode the raw text between the fences.
    ///
    /// JSON front matter holds object members without the surrounding braces,
    /// so the text is wrapped in `{ ... }` before decoding. Blank YAML decodes
    /// to an empty mapping.
    pub fn decode(format: FrontMatterFormat, raw: &str) -> Result<Self, FrontMatterError> {
        let value = match format {
            FrontMatterFormat::Yaml => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str::<Value>(trimmed)?
            }
            FrontMatterFormat::Json => serde_json::from_str::<Value>(&format!("{{{raw}}}"))?,
        };

        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(FrontMatterError::NotAMapping(value_kind(&other))),
        }
    }

    /// Raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Scalar value rendered as a string.
    ///
    /// Strings are returned as-is, numbers and booleans in their canonical
    /// text form. Lists, mappings and nulls yield `None`.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// Boolean flag with a default for absent keys.
    ///
    /// Only a YAML/JSON `true` or the literal string `"true"` count as true;
    /// any other present value is false.
    #[must_use]
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            Some(_) => false,
        }
    }

    /// Integer value, accepting both numbers and numeric strings.
    ///
    /// Returns `Ok(None)` when the key is absent and `Err` with the offending
    /// text when the value is present but not a 32-bit integer.
    pub fn integer(&self, key: &str) -> Result<Option<i32>, String> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| scalar_to_string(value).unwrap_or_else(|| value.to_string()))
    }

    /// List of strings.
    ///
    /// A list yields its scalar entries as strings; a single scalar yields a
    /// one-element list; anything else yields an empty list.
    #[must_use]
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying mapping.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FrontMatter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
