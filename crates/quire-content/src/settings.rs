//! Per-collection settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How fragment URLs are built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// `url_path` + slug.
    #[default]
    Path,
    /// `url_path` + `/YYYY/MM/DD/` + slug, from the fragment's date.
    Date,
}

/// Everything the loader needs to know about one collection.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionSettings {
    /// Collection identifier, used in logs and for namespacing.
    pub name: String,
    /// Base URL path of the collection.
    pub url_path: String,
    /// Directory holding the documents.
    pub data_dir: PathBuf,
    /// File extension filter, including the dot.
    pub extension: String,
    /// URL scheme prefix, e.g. `https://`.
    pub protocol: String,
    /// Host name used for full URLs.
    pub domain: String,
    pub route_mode: RouteMode,
    /// Whether an overview route is registered at `url_path`.
    pub overview_route: bool,
    pub overview_template: String,
    /// Template for fragments that don't name one.
    pub default_template: String,
    pub default_language: String,
    /// Entries merged into every rendering context.
    pub context: Map<String, Value>,
    /// Number of most-clicked fragments exposed as `top_fragments`.
    pub top_fragments: usize,
}

impl CollectionSettings {
    /// Settings with defaults for everything except name and directory.
    #[must_use]
    pub fn new(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            url_path: "/".to_owned(),
            data_dir: data_dir.into(),
            extension: ".md".to_owned(),
            protocol: "https://".to_owned(),
            domain: String::new(),
            route_mode: RouteMode::Path,
            overview_route: true,
            overview_template: String::new(),
            default_template: String::new(),
            default_language: "en".to_owned(),
            context: Map::new(),
            top_fragments: 5,
        }
    }

    #[must_use]
    pub fn with_url_path(mut self, url_path: impl Into<String>) -> Self {
        self.url_path = url_path.into();
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_domain(mut self, protocol: impl Into<String>, domain: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self.domain = domain.into();
        self
    }

    #[must_use]
    pub fn with_route_mode(mut self, route_mode: RouteMode) -> Self {
        self.route_mode = route_mode;
        self
    }

    #[must_use]
    pub fn with_overview(mut self, enabled: bool, template: impl Into<String>) -> Self {
        self.overview_route = enabled;
        self.overview_template = template.into();
        self
    }

    #[must_use]
    pub fn with_default_template(mut self, template: impl Into<String>) -> Self {
        self.default_template = template.into();
        self
    }

    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_top_fragments(mut self, count: usize) -> Self {
        self.top_fragments = count;
        self
    }

    /// Protocol and domain joined, e.g. `https://example.com`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}{}", self.protocol, self.domain)
    }

    /// Whether a file name passes the extension filter (case-insensitive).
    #[must_use]
    pub fn matches_extension(&self, filename: &str) -> bool {
        filename
            .to_lowercase()
            .ends_with(&self.extension.to_lowercase())
    }
}
