//! Configuration management for quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! default_language = "en"
//! protocol = "https://"
//! domain = "${SITE_DOMAIN:-localhost}"
//!
//! [[collections]]
//! name = "blog"
//! url_path = "/blog/"
//! data_dir = "content/blog"
//! route_mode = "date"
//! overview_template = "blog/overview"
//! default_template = "blog/post"
//!
//! [collections.context]
//! section = "Blog"
//! ```
//!
//! Collections inherit `protocol`, `domain` and `default_language` from the
//! top level unless they set their own. `data_dir` is resolved relative to
//! the directory holding the config file.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `protocol` and `domain`, both top-level and per collection, support
//! `${VAR}` (error if unset) and `${VAR:-default}`.

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use quire_content::{CollectionSettings, RouteMode};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config. Overrides apply to the
/// top level and to every collection.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub domain: Option<String>,
    pub protocol: Option<String>,
    pub default_language: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language used for content without language markers.
    pub default_language: String,
    /// URL scheme prefix for full URLs.
    pub protocol: String,
    /// Host name for full URLs.
    pub domain: String,
    pub collections: Vec<CollectionConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: "en".to_owned(),
            protocol: "https://".to_owned(),
            domain: String::new(),
            collections: Vec::new(),
            config_path: None,
        }
    }
}

/// One `[[collections]]` entry.
#[derive(Debug, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    #[serde(default = "default_url_path")]
    pub url_path: String,
    /// Document directory; absolute after loading.
    pub data_dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Inherits the top-level protocol when absent.
    pub protocol: Option<String>,
    /// Inherits the top-level domain when absent.
    pub domain: Option<String>,
    #[serde(default)]
    pub route_mode: RouteMode,
    #[serde(default = "default_true")]
    pub overview_route: bool,
    #[serde(default)]
    pub overview_template: String,
    #[serde(default)]
    pub default_template: String,
    /// Inherits the top-level default language when absent.
    pub default_language: Option<String>,
    /// Entries merged into every rendering context of the collection.
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default = "default_top_fragments")]
    pub top_fragments: usize,
}

fn default_url_path() -> String {
    "/".to_owned()
}

fn default_extension() -> String {
    ".md".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_top_fragments() -> usize {
    5
}

impl CollectionConfig {
    /// Settings for the content loader.
    ///
    /// Inherited fields must have been resolved, which [`Config::load`]
    /// does; unresolved ones fall back to empty strings.
    #[must_use]
    pub fn to_settings(&self) -> CollectionSettings {
        CollectionSettings::new(&self.name, &self.data_dir)
            .with_url_path(&self.url_path)
            .with_extension(&self.extension)
            .with_domain(
                self.protocol.clone().unwrap_or_default(),
                self.domain.clone().unwrap_or_default(),
            )
            .with_route_mode(self.route_mode)
            .with_overview(self.overview_route, &self.overview_template)
            .with_default_template(&self.default_template)
            .with_default_language(self.default_language.clone().unwrap_or_default())
            .with_context(self.context.clone())
            .with_top_fragments(self.top_fragments)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`collections.blog.domain`").
        field: String,
        /// Error message (e.g., "${`SITE_DOMAIN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a protocol to be `http://` or `https://`.
fn require_http_protocol(protocol: &str, field: &str) -> Result<(), ConfigError> {
    if protocol != "http://" && protocol != "https://" {
        return Err(ConfigError::Validation(format!(
            "{field} must be http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents
    /// and falls back to defaults (no collections).
    ///
    /// CLI settings are applied after loading, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// an environment variable is missing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Settings for every configured collection, in file order.
    #[must_use]
    pub fn collection_settings(&self) -> Vec<CollectionSettings> {
        self.collections
            .iter()
            .map(CollectionConfig::to_settings)
            .collect()
    }

    /// Find a collection by name.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(domain) = &settings.domain {
            self.domain.clone_from(domain);
            for collection in &mut self.collections {
                collection.domain = Some(domain.clone());
            }
        }
        if let Some(protocol) = &settings.protocol {
            self.protocol.clone_from(protocol);
            for collection in &mut self.collections {
                collection.protocol = Some(protocol.clone());
            }
        }
        if let Some(language) = &settings.default_language {
            self.default_language.clone_from(language);
            for collection in &mut self.collections {
                collection.default_language = Some(language.clone());
            }
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.inherit_defaults();

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_http_protocol(&self.protocol, "protocol")?;
        require_non_empty(&self.default_language, "default_language")?;

        let mut names = HashSet::new();
        for collection in &self.collections {
            require_non_empty(&collection.name, "collections.name")?;
            if !names.insert(collection.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate collection name '{}'",
                    collection.name
                )));
            }
            Self::validate_collection(collection)?;
        }

        Ok(())
    }

    fn validate_collection(collection: &CollectionConfig) -> Result<(), ConfigError> {
        let field = |name: &str| format!("collections.{}.{name}", collection.name);

        require_non_empty(&collection.extension, &field("extension"))?;
        if collection.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty",
                field("data_dir")
            )));
        }
        if let Some(protocol) = &collection.protocol {
            require_http_protocol(protocol, &field("protocol"))?;
        }
        if let Some(language) = &collection.default_language {
            require_non_empty(language, &field("default_language"))?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.protocol = expand::expand_env(&self.protocol, "protocol")?;
        self.domain = expand::expand_env(&self.domain, "domain")?;

        for collection in &mut self.collections {
            if let Some(ref protocol) = collection.protocol {
                let field = format!("collections.{}.protocol", collection.name);
                collection.protocol = Some(expand::expand_env(protocol, &field)?);
            }
            if let Some(ref domain) = collection.domain {
                let field = format!("collections.{}.domain", collection.name);
                collection.domain = Some(expand::expand_env(domain, &field)?);
            }
        }

        Ok(())
    }

    /// Fill unset per-collection fields from the top level.
    fn inherit_defaults(&mut self) {
        for collection in &mut self.collections {
            collection
                .protocol
                .get_or_insert_with(|| self.protocol.clone());
            collection.domain.get_or_insert_with(|| self.domain.clone());
            collection
                .default_language
                .get_or_insert_with(|| self.default_language.clone());
        }
    }

    /// Resolve relative data directories against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        for collection in &mut self.collections {
            if collection.data_dir.is_relative() {
                collection.data_dir = config_dir.join(&collection.data_dir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    const BLOG: &str = r#"
domain = "example.com"

[[collections]]
name = "blog"
data_dir = "content/blog"
url_path = "/blog/"
route_mode = "date"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.protocol, "https://");
        assert_eq!(config.domain, "");
        assert!(config.collections.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.protocol, "https://");
        assert!(config.collections.is_empty());
    }

    #[test]
    fn test_parse_collection_defaults() {
        let toml = r#"
[[collections]]
name = "pages"
data_dir = "pages"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let pages = &config.collections[0];
        assert_eq!(pages.url_path, "/");
        assert_eq!(pages.extension, ".md");
        assert_eq!(pages.route_mode, RouteMode::Path);
        assert!(pages.overview_route);
        assert_eq!(pages.top_fragments, 5);
        assert!(pages.protocol.is_none());
        assert!(pages.context.is_empty());
    }

    #[test]
    fn test_parse_collection_missing_name() {
        let toml = r#"
[[collections]]
data_dir = "pages"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_parse_context_table() {
        let toml = r#"
[[collections]]
name = "blog"
data_dir = "blog"

[collections.context]
section = "Blog"
featured = ["a", "b"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let context = &config.collections[0].context;
        assert_eq!(context["section"], "Blog");
        assert_eq!(context["featured"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_load_resolves_paths_and_inheritance() {
        let dir = create_test_dir();
        let path = write_config(dir.path(), BLOG);

        let config = Config::load(Some(&path), None).unwrap();
        let blog = &config.collections[0];
        assert_eq!(blog.data_dir, dir.path().join("content/blog"));
        assert_eq!(blog.domain.as_deref(), Some("example.com"));
        assert_eq!(blog.protocol.as_deref(), Some("https://"));
        assert_eq!(blog.default_language.as_deref(), Some("en"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_collection_overrides_win() {
        let dir = create_test_dir();
        let path = write_config(
            dir.path(),
            r#"
domain = "example.com"
default_language = "de"

[[collections]]
name = "docs"
data_dir = "/srv/docs"
domain = "docs.example.com"
protocol = "http://"
default_language = "fr"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        let docs = &config.collections[0];
        assert_eq!(docs.data_dir, PathBuf::from("/srv/docs"));
        assert_eq!(docs.domain.as_deref(), Some("docs.example.com"));
        assert_eq!(docs.protocol.as_deref(), Some("http://"));
        assert_eq!(docs.default_language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_to_settings() {
        let dir = create_test_dir();
        let path = write_config(dir.path(), BLOG);
        let config = Config::load(Some(&path), None).unwrap();

        let settings = config.collections[0].to_settings();
        assert_eq!(settings.name, "blog");
        assert_eq!(settings.url_path, "/blog/");
        assert_eq!(settings.route_mode, RouteMode::Date);
        assert_eq!(settings.origin(), "https://example.com");
        assert_eq!(settings.data_dir, dir.path().join("content/blog"));
        assert_eq!(config.collection_settings().len(), 1);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = create_test_dir();
        let result = Config::load(Some(&dir.path().join("nope.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = create_test_dir();
        let path = write_config(dir.path(), "collections = [");
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = create_test_dir();
        let path = write_config(dir.path(), "");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_config(&nested), Some(path));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let dir = create_test_dir();
        let path = write_config(
            dir.path(),
            r#"
[[collections]]
name = "blog"
data_dir = "a"

[[collections]]
name = "blog"
data_dir = "b"
"#,
        );
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_protocol() {
        let config = Config {
            protocol: "ftp://".to_owned(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("protocol"));
    }

    #[test]
    fn test_validate_empty_extension() {
        let dir = create_test_dir();
        let path = write_config(
            dir.path(),
            r#"
[[collections]]
name = "blog"
data_dir = "blog"
extension = ""
"#,
        );
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("collections.blog.extension"));
    }

    #[test]
    fn test_validate_empty_default_language() {
        let config = Config {
            default_language: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let dir = create_test_dir();
        let path = write_config(dir.path(), BLOG);
        let overrides = CliSettings {
            domain: Some("localhost:3000".to_owned()),
            protocol: Some("http://".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&overrides)).unwrap();
        assert_eq!(config.domain, "localhost:3000");
        let settings = config.collections[0].to_settings();
        assert_eq!(settings.origin(), "http://localhost:3000");
        assert_eq!(settings.default_language, "en"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_validated() {
        let dir = create_test_dir();
        let path = write_config(dir.path(), BLOG);
        let overrides = CliSettings {
            protocol: Some("gopher://".to_owned()),
            ..Default::default()
        };
        assert!(Config::load(Some(&path), Some(&overrides)).is_err());
    }

    #[test]
    fn test_expand_env_vars_domain() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUIRE_CONFIG_TEST_DOMAIN", "env.example.com");
        }

        let toml = r#"
domain = "${QUIRE_CONFIG_TEST_DOMAIN}"

[[collections]]
name = "blog"
data_dir = "blog"
domain = "blog.${QUIRE_CONFIG_TEST_DOMAIN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.domain, "env.example.com");
        assert_eq!(
            config.collections[0].domain.as_deref(),
            Some("blog.env.example.com")
        );

        unsafe {
            std::env::remove_var("QUIRE_CONFIG_TEST_DOMAIN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUIRE_CONFIG_TEST_MISSING");
        }

        let toml = r#"
[[collections]]
name = "blog"
data_dir = "blog"
domain = "${QUIRE_CONFIG_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("QUIRE_CONFIG_TEST_MISSING"));
        assert!(err.to_string().contains("collections.blog.domain"));
    }
}
