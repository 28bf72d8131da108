//! Document parsing.
//!
//! A document is a UTF-8 text file with a front matter block followed by a
//! Markdown body:
//!
//! ```text
//! ---
//! title: Release notes
//! date: 2024-05-01
//! tags: [news]
//! ---
//! English body, shown for the default language.
//! <!-- more -->
//! Rest of the article.
//! --- de ---
//! Deutscher Text.
//! ```
//!
//! Lines of the form `--- xx ---` or `--- xx-YY ---` switch the language of
//! the following body lines. Each language segment is rendered separately and
//! gets its own preview.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use quire_markdown::{MarkdownRenderer, strip_tags};
use regex::Regex;
use serde_json::Map;

use crate::date::{FALLBACK_DATE, parse_date};
use crate::fragment::{Fragment, LocalizedContent};
use crate::front_matter::{
    CATEGORIES_KEY, DATE_KEY, FrontMatter, FrontMatterFormat, ORDER_KEY, PREVIEW_KEY, SLUG_KEY,
    TAGS_KEY, TEMPLATE_KEY, TITLE_KEY, VISIBLE_KEY,
};
use crate::settings::{CollectionSettings, RouteMode};
use crate::source::{SourceError, Sources};
use crate::util::{file_stem, slugify};

static LANGUAGE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--- (\w{2}(?:-\w{2})?) ---$").unwrap());

static MORE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!--\s*more\s*-->").unwrap());

/// Error parsing a single document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No source knows the path.
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The document has no non-blank content.
    #[error("Document is empty: {}", .0.display())]
    EmptyFile(PathBuf),
    /// The first non-blank line is not a front matter fence.
    #[error("YAML/JSON front matter is missing in {}", .0.display())]
    MissingFrontMatter(PathBuf),
    /// The front matter block is never closed.
    #[error("Front matter is not closed in {}", .0.display())]
    UnclosedFrontMatter(PathBuf),
    /// The document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
}

/// Parses documents of one collection into [`Fragment`]s.
///
/// The parser owns the Markdown renderer, so email obfuscation draws from one
/// generator across all documents it parses, in call order.
#[derive(Debug)]
pub struct DocumentParser {
    sources: Sources,
    renderer: MarkdownRenderer,
    collection: String,
    url_path: String,
    route_mode: RouteMode,
    default_template: String,
}

impl DocumentParser {
    /// Create a parser for documents of the given collection.
    ///
    /// Reads from the filesystem and renders without email obfuscation until
    /// configured otherwise.
    #[must_use]
    pub fn new(settings: &CollectionSettings) -> Self {
        Self {
            sources: Sources::default(),
            renderer: MarkdownRenderer::new(),
            collection: settings.name.clone(),
            url_path: settings.url_path.clone(),
            route_mode: settings.route_mode,
            default_template: settings.default_template.clone(),
        }
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Sources) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Sources this parser reads from.
    #[must_use]
    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Read and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the document is missing, unreadable, empty,
    /// or lacks a well-formed front matter block. Malformed front matter and
    /// dates are logged and degraded instead.
    pub fn parse(&mut self, path: &Path, default_language: &str) -> Result<Fragment, ParseError> {
        let text = self
            .sources
            .read(path)
            .map_err(|source| ParseError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .ok_or_else(|| ParseError::NotFound(path.to_path_buf()))?;

        self.parse_str(path, &text, default_language)
    }

    /// Parse document text that was already read.
    ///
    /// `path` names the document in errors and logs and provides the file
    /// name the slug falls back to.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse), minus read failures.
    pub fn parse_str(
        &mut self,
        path: &Path,
        text: &str,
        default_language: &str,
    ) -> Result<Fragment, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyFile(path.to_path_buf()));
        }

        let mut lines = text.lines();
        let opening = lines
            .by_ref()
            .map(str::trim_end)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        let format = FrontMatterFormat::detect(opening)
            .ok_or_else(|| ParseError::MissingFrontMatter(path.to_path_buf()))?;
        let closing = format.closing_delimiter(opening);

        let mut raw = String::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim_end() == closing {
                closed = true;
                break;
            }
            raw.push_str(line);
            raw.push('\n');
        }
        if !closed {
            return Err(ParseError::UnclosedFrontMatter(path.to_path_buf()));
        }

        let front_matter = FrontMatter::decode(format, &raw).unwrap_or_else(|e| {
            tracing::warn!(
                collection = %self.collection,
                path = %path.display(),
                error = %e,
                "Ignoring malformed front matter"
            );
            FrontMatter::default()
        });

        let mut fragment = self.interpret(path, format, front_matter, default_language);
        fragment.languages = self.render_languages(lines, &fragment.front_matter, default_language);

        tracing::debug!(
            collection = %self.collection,
            path = %path.display(),
            languages = fragment.languages.len(),
            "Loaded document"
        );
        Ok(fragment)
    }

    /// Resolve the well-known front matter keys into fragment fields.
    fn interpret(
        &self,
        path: &Path,
        format: FrontMatterFormat,
        mut front_matter: FrontMatter,
        default_language: &str,
    ) -> Fragment {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let slug = match front_matter.string(SLUG_KEY).filter(|s| !s.is_empty()) {
            Some(slug) => slug,
            None => {
                let slug = slugify(file_stem(&filename));
                front_matter.insert(SLUG_KEY, slug.clone());
                slug
            }
        };

        let date = self.resolve_date(path, &front_matter);
        let url = match self.route_mode {
            RouteMode::Path => path_url(&self.url_path, &slug),
            RouteMode::Date => date_url(&self.url_path, date.unwrap_or(FALLBACK_DATE), &slug),
        };

        let order = front_matter.integer(ORDER_KEY).unwrap_or_else(|value| {
            tracing::warn!(
                collection = %self.collection,
                path = %path.display(),
                value = %value,
                "Ignoring non-integer order"
            );
            None
        });

        Fragment {
            source_path: path.to_path_buf(),
            filename,
            collection: self.collection.clone(),
            front_matter_format: format,
            title: front_matter.string(TITLE_KEY).unwrap_or_default(),
            slug,
            visible: front_matter.flag(VISIBLE_KEY, true),
            order,
            date,
            tags: front_matter.string_list(TAGS_KEY),
            categories: front_matter.string_list(CATEGORIES_KEY),
            template: front_matter
                .string(TEMPLATE_KEY)
                .unwrap_or_else(|| self.default_template.clone()),
            default_language: default_language.to_owned(),
            languages: BTreeMap::new(),
            url,
            full_url: String::new(),
            full_url_encoded: String::new(),
            context: Map::new(),
            front_matter,
        }
    }

    /// Parse the `date` key, degrading to the fallback date where needed.
    fn resolve_date(&self, path: &Path, front_matter: &FrontMatter) -> Option<DateTime<Utc>> {
        let Some(value) = front_matter.string(DATE_KEY) else {
            if self.route_mode == RouteMode::Date {
                tracing::error!(
                    collection = %self.collection,
                    path = %path.display(),
                    "Date is required for date-based routes, using fallback date"
                );
                return Some(FALLBACK_DATE);
            }
            return None;
        };

        match parse_date(&value) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(
                    collection = %self.collection,
                    path = %path.display(),
                    error = %e,
                    "Using fallback date"
                );
                Some(FALLBACK_DATE)
            }
        }
    }

    /// Split the body into language segments and render each.
    fn render_languages<'t>(
        &mut self,
        lines: impl Iterator<Item = &'t str>,
        front_matter: &FrontMatter,
        default_language: &str,
    ) -> BTreeMap<String, LocalizedContent> {
        let explicit_preview = front_matter.string(PREVIEW_KEY);
        let mut languages = BTreeMap::new();
        let mut language = default_language.to_owned();
        let mut buffer = String::new();

        for line in lines {
            if let Some(caps) = LANGUAGE_MARKER_RE.captures(line.trim_end()) {
                let content = self.render_segment(&buffer, explicit_preview.as_deref());
                languages.insert(std::mem::replace(&mut language, caps[1].to_owned()), content);
                buffer.clear();
            } else {
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
        let content = self.render_segment(&buffer, explicit_preview.as_deref());
        languages.insert(language, content);

        languages
    }

    fn render_segment(&mut self, body: &str, explicit_preview: Option<&str>) -> LocalizedContent {
        let html = self.renderer.render(body);
        let preview_source = explicit_preview.unwrap_or_else(|| extract_preview(body));
        let preview = if preview_source.is_empty() {
            String::new()
        } else {
            self.renderer.render(preview_source)
        };
        let preview_text = strip_tags(&preview);

        LocalizedContent {
            html,
            preview,
            preview_text,
        }
    }
}

/// Text before the first read-more marker, or `""` without one.
fn extract_preview(body: &str) -> &str {
    let body = body.trim();
    MORE_MARKER_RE
        .find(body)
        .map_or("", |marker| &body[..marker.start()])
}

fn path_url(url_path: &str, slug: &str) -> String {
    if url_path.ends_with('/') {
        format!("{url_path}{slug}")
    } else {
        format!("{url_path}/{slug}")
    }
}

fn date_url(url_path: &str, date: DateTime<Utc>, slug: &str) -> String {
    format!(
        "{}/{:04}/{:02}/{:02}/{slug}",
        url_path.trim_end_matches('/'),
        date.year(),
        date.month(),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use quire_markdown::EmailObfuscator;

    use super::*;
    use crate::source::MemorySource;

    fn parser() -> DocumentParser {
        DocumentParser::new(&CollectionSettings::new("test", "docs").with_url_path("/docs/"))
    }

    fn parse(text: &str) -> Result<Fragment, ParseError> {
        parser().parse_str(Path::new("docs/My Post.md"), text, "en")
    }

    #[test]
    fn test_parse_yaml_document() {
        let fragment = parse("---\ntitle: Hello\ntags: [a, b]\n---\n# Heading\n\nBody\n").unwrap();
        assert_eq!(fragment.front_matter_format, FrontMatterFormat::Yaml);
        assert_eq!(fragment.title, "Hello");
        assert_eq!(fragment.tags, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(fragment.filename, "My Post.md");
        assert_eq!(
            fragment.languages["en"].html,
            "<h1>Heading</h1>\n<p>Body</p>\n"
        );
    }

    #[test]
    fn test_parse_json_document() {
        let fragment = parse("{{{\n\"title\": \"Json\",\n\"order\": 3\n}}}\nBody\n").unwrap();
        assert_eq!(fragment.front_matter_format, FrontMatterFormat::Json);
        assert_eq!(fragment.title, "Json");
        assert_eq!(fragment.order, Some(3));
    }

    #[test]
    fn test_parse_skips_leading_blank_lines() {
        let fragment = parse("\n\n   \n---\ntitle: Late\n---\nBody\n").unwrap();
        assert_eq!(fragment.title, "Late");
    }

    #[test]
    fn test_parse_longer_fence_must_match_exactly() {
        let fragment = parse("-----\ntitle: Five\n-----\nBody\n").unwrap();
        assert_eq!(fragment.title, "Five");

        let fragment = parse("-----\ntitle: Five\n---\nBody\n");
        assert!(matches!(fragment, Err(ParseError::UnclosedFrontMatter(_))));
    }

    #[test]
    fn test_parse_empty_file() {
        assert!(matches!(parse(""), Err(ParseError::EmptyFile(_))));
        assert!(matches!(parse("\n \n"), Err(ParseError::EmptyFile(_))));
    }

    #[test]
    fn test_parse_missing_front_matter() {
        assert!(matches!(
            parse("# Just markdown\n"),
            Err(ParseError::MissingFrontMatter(_))
        ));
        assert!(matches!(
            parse("--\ntitle: x\n--\n"),
            Err(ParseError::MissingFrontMatter(_))
        ));
    }

    #[test]
    fn test_parse_malformed_front_matter_degrades() {
        let fragment = parse("---\ntitle: [broken\n---\nStill rendered\n").unwrap();
        assert_eq!(fragment.title, "");
        assert_eq!(fragment.slug, "my_post");
        assert_eq!(fragment.languages["en"].html, "<p>Still rendered</p>\n");
    }

    #[test]
    fn test_slug_derived_from_filename() {
        let fragment = parse("---\ntitle: x\n---\n").unwrap();
        assert_eq!(fragment.slug, "my_post");
        assert_eq!(fragment.front_matter.string(SLUG_KEY), Some("my_post".to_owned()));
        assert_eq!(fragment.url, "/docs/my_post");
    }

    #[test]
    fn test_explicit_slug_verbatim() {
        let fragment = parse("---\nslug: Custom-Slug\n---\n").unwrap();
        assert_eq!(fragment.slug, "Custom-Slug");
        assert_eq!(fragment.url, "/docs/Custom-Slug");
    }

    #[test]
    fn test_path_url_adds_separator() {
        let mut parser =
            DocumentParser::new(&CollectionSettings::new("test", "docs").with_url_path("/docs"));
        let fragment = parser
            .parse_str(Path::new("a.md"), "---\n---\n", "en")
            .unwrap();
        assert_eq!(fragment.url, "/docs/a");
    }

    #[test]
    fn test_date_url() {
        let settings = CollectionSettings::new("blog", "posts")
            .with_url_path("/blog/")
            .with_route_mode(RouteMode::Date);
        let mut parser = DocumentParser::new(&settings);
        let fragment = parser
            .parse_str(Path::new("hello.md"), "---\ndate: 2023-02-05T10:15\n---\n", "en")
            .unwrap();
        assert_eq!(fragment.url, "/blog/2023/02/05/hello");
        assert_eq!(
            fragment.date.map(|d| d.to_rfc3339()),
            Some("2023-02-05T10:15:00+00:00".to_owned())
        );
    }

    #[test]
    fn test_date_url_missing_date_uses_fallback() {
        let settings = CollectionSettings::new("blog", "posts").with_route_mode(RouteMode::Date);
        let mut parser = DocumentParser::new(&settings);
        let fragment = parser
            .parse_str(Path::new("hello.md"), "---\ntitle: x\n---\n", "en")
            .unwrap();
        assert_eq!(fragment.url, "/1970/01/01/hello");
        assert_eq!(fragment.date, Some(FALLBACK_DATE));
    }

    #[test]
    fn test_malformed_date_uses_fallback() {
        let fragment = parse("---\ndate: yesterday\n---\n").unwrap();
        assert_eq!(fragment.date, Some(FALLBACK_DATE));
    }

    #[test]
    fn test_missing_date_in_path_mode_is_none() {
        let fragment = parse("---\ntitle: x\n---\n").unwrap();
        assert_eq!(fragment.date, None);
    }

    #[test]
    fn test_visible_and_template() {
        let fragment = parse("---\nvisible: false\ntemplate: special\n---\n").unwrap();
        assert!(!fragment.visible);
        assert_eq!(fragment.template, "special");

        let mut parser = DocumentParser::new(
            &CollectionSettings::new("test", "docs").with_default_template("page"),
        );
        let fragment = parser.parse_str(Path::new("a.md"), "---\n---\n", "en").unwrap();
        assert!(fragment.visible);
        assert_eq!(fragment.template, "page");
    }

    #[test]
    fn test_invalid_order_is_unset() {
        let fragment = parse("---\norder: first\n---\n").unwrap();
        assert_eq!(fragment.order, None);
    }

    #[test]
    fn test_single_language_goes_to_default() {
        let fragment = parse("---\ntitle: x\n---\nOnly text\n").unwrap();
        assert_eq!(fragment.languages.len(), 1);
        assert_eq!(fragment.localized(None).language, "en");
        assert_eq!(fragment.localized(None).content, "<p>Only text</p>\n");
    }

    #[test]
    fn test_language_segments() {
        let text = "---\ntitle: x\n---\nEnglish\n--- de ---\nDeutsch\n--- pt-BR ---\nPortuguês\n";
        let fragment = parse(text).unwrap();
        let codes: Vec<_> = fragment.language_codes().collect();
        assert_eq!(codes, vec!["de", "en", "pt-BR"]);
        assert_eq!(fragment.languages["en"].html, "<p>English</p>\n");
        assert_eq!(fragment.languages["de"].html, "<p>Deutsch</p>\n");
        assert_eq!(fragment.languages["pt-BR"].html, "<p>Português</p>\n");
    }

    #[test]
    fn test_language_marker_requires_exact_form() {
        let text = "---\n---\nA\n--- deu ---\n---de---\nB\n";
        let fragment = parse(text).unwrap();
        assert_eq!(fragment.languages.len(), 1);
    }

    #[test]
    fn test_leading_marker_keeps_empty_default_segment() {
        let fragment = parse("---\n---\n--- de ---\nNur Deutsch\n").unwrap();
        assert_eq!(fragment.languages["en"].html, "");
        assert_eq!(fragment.languages["de"].html, "<p>Nur Deutsch</p>\n");
    }

    #[test]
    fn test_preview_from_more_marker() {
        let text = "---\n---\nIntro **bold**\n<!-- MORE -->\nRest\n";
        let fragment = parse(text).unwrap();
        let en = &fragment.languages["en"];
        assert_eq!(en.preview, "<p>Intro <strong>bold</strong></p>\n");
        assert_eq!(en.preview_text, "Intro bold");
    }

    #[test]
    fn test_preview_marker_variants() {
        for marker in ["<!--more-->", "<!-- more -->", "<!--more -->", "<!-- more-->"] {
            let text = format!("---\n---\nTeaser\n{marker}\nRest\n");
            let fragment = parse(&text).unwrap();
            assert_eq!(fragment.languages["en"].preview_text, "Teaser", "marker: {marker}");
        }
    }

    #[test]
    fn test_preview_explicit_wins_over_marker() {
        let text = "---\npreview: Explicit *one*\n---\nTeaser\n<!--more-->\nRest\n";
        let fragment = parse(text).unwrap();
        let en = &fragment.languages["en"];
        assert_eq!(en.preview, "<p>Explicit <em>one</em></p>\n");
        assert_eq!(en.preview_text, "Explicit one");
    }

    #[test]
    fn test_preview_empty_without_marker() {
        let fragment = parse("---\n---\nNo marker here\n").unwrap();
        assert_eq!(fragment.languages["en"].preview, "");
        assert_eq!(fragment.languages["en"].preview_text, "");
    }

    #[test]
    fn test_preview_per_language() {
        let text = "---\n---\nEN teaser\n<!--more-->\nEN rest\n--- de ---\nDE teaser\n<!--more-->\n";
        let fragment = parse(text).unwrap();
        assert_eq!(fragment.languages["en"].preview_text, "EN teaser");
        assert_eq!(fragment.languages["de"].preview_text, "DE teaser");
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let fragment = parse("---\nauthor: Jane\nextra:\n  nested: 1\n---\n").unwrap();
        assert_eq!(fragment.front_matter.string("author"), Some("Jane".to_owned()));
        assert!(fragment.front_matter.get("extra").is_some());
    }

    #[test]
    fn test_parse_reads_from_sources() {
        let sources = Sources::empty()
            .with(MemorySource::new().with_file("docs/embedded.md", "---\ntitle: Embedded\n---\n"));
        let mut parser = parser().with_sources(sources);
        let fragment = parser.parse(Path::new("docs/embedded.md"), "en").unwrap();
        assert_eq!(fragment.title, "Embedded");

        let missing = parser.parse(Path::new("docs/missing.md"), "en");
        assert!(matches!(missing, Err(ParseError::NotFound(_))));
    }

    #[test]
    fn test_parse_reads_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("on-disk.md");
        fs::write(&path, "---\ntitle: Disk\n---\nBody\n").unwrap();

        let fragment = parser().parse(&path, "en").unwrap();
        assert_eq!(fragment.title, "Disk");
        assert_eq!(fragment.source_path, path);
    }

    #[test]
    fn test_crlf_line_endings() {
        let fragment = parse("---\r\ntitle: Windows\r\n---\r\nBody\r\n").unwrap();
        assert_eq!(fragment.title, "Windows");
        assert_eq!(fragment.languages["en"].html, "<p>Body</p>\n");
    }

    #[test]
    fn test_obfuscation_is_deterministic_across_parsers() {
        let text = "---\n---\nMail <a@b.io>\n";
        let render = || {
            parser()
                .with_renderer(
                    MarkdownRenderer::new().with_email_obfuscation(EmailObfuscator::default()),
                )
                .parse_str(Path::new("a.md"), text, "en")
                .unwrap()
                .languages["en"]
                .html
                .clone()
        };
        assert_eq!(render(), render());
        assert!(!render().contains("a@b.io"));
    }
}
