//! Collection assembly.
//!
//! [`CollectionLoader`] lists a collection's data directory, parses every
//! matching document and assembles the results into a [`Collection`]:
//!
//! 1. Parse documents one by one; a document that fails to parse is logged
//!    and skipped.
//! 2. Stable-sort all fragments by explicit order (unset last), then title.
//! 3. Walk the sorted list once, assigning full URLs, back-filling unset
//!    orders with the walk position, and indexing tags and categories.
//!
//! Steps 2 and 3 are sequential: back-filled orders depend on the global
//! sort position.
//!
//! A missing or empty data directory is logged and yields an empty
//! collection.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use quire_markdown::{EmailObfuscator, MarkdownRenderer};

use crate::clicks::ClickCounter;
use crate::document::DocumentParser;
use crate::fragment::{Fragment, FragmentOrder, compare_order};
use crate::settings::CollectionSettings;
use crate::source::{SourceError, Sources};
use crate::taxonomy::Taxonomy;
use crate::util::encode_url;

/// Error preparing a collection's document list.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// The data directory does not exist in any source.
    #[error("Data directory '{}' of collection '{name}' does not exist", path.display())]
    DirectoryUnavailable { name: String, path: PathBuf },
    /// The data directory has no files.
    #[error("Data directory '{}' of collection '{name}' contains no files", path.display())]
    EmptyDirectory { name: String, path: PathBuf },
    /// The data directory could not be listed.
    #[error("Failed to list documents of collection '{name}': {source}")]
    Source {
        name: String,
        #[source]
        source: SourceError,
    },
}

/// Builds a [`Collection`] from its data directory.
pub struct CollectionLoader {
    settings: CollectionSettings,
    parser: DocumentParser,
    click_counter: Option<Arc<dyn ClickCounter>>,
}

impl CollectionLoader {
    /// Create a loader reading from the filesystem.
    ///
    /// Email links are obfuscated with an [`EmailObfuscator`] seeded with
    /// the default seed, so repeated loads produce identical HTML.
    #[must_use]
    pub fn new(settings: CollectionSettings) -> Self {
        let renderer = MarkdownRenderer::new().with_email_obfuscation(EmailObfuscator::default());
        let parser = DocumentParser::new(&settings).with_renderer(renderer);
        Self {
            settings,
            parser,
            click_counter: None,
        }
    }

    /// Read documents through the given source chain.
    #[must_use]
    pub fn with_sources(mut self, sources: Sources) -> Self {
        self.parser = self.parser.with_sources(sources);
        self
    }

    /// Render documents with the given renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.parser = self.parser.with_renderer(renderer);
        self
    }

    /// Attach a click counter to the assembled collection.
    #[must_use]
    pub fn with_click_counter(mut self, counter: Arc<dyn ClickCounter>) -> Self {
        self.click_counter = Some(counter);
        self
    }

    /// Paths of the documents matching the extension filter, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError`] if the data directory is missing, empty,
    /// or cannot be listed.
    pub fn document_paths(&self) -> Result<Vec<PathBuf>, CollectionError> {
        let dir = &self.settings.data_dir;
        let files = self
            .parser
            .sources()
            .list(dir)
            .map_err(|source| CollectionError::Source {
                name: self.settings.name.clone(),
                source,
            })?
            .ok_or_else(|| CollectionError::DirectoryUnavailable {
                name: self.settings.name.clone(),
                path: dir.clone(),
            })?;

        if files.is_empty() {
            return Err(CollectionError::EmptyDirectory {
                name: self.settings.name.clone(),
                path: dir.clone(),
            });
        }

        Ok(files
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| self.settings.matches_extension(&name.to_string_lossy()))
            })
            .collect())
    }

    /// Parse and assemble the collection.
    ///
    /// Never fails: directory problems yield an empty collection and broken
    /// documents are skipped, both with a log message.
    #[must_use]
    pub fn load(mut self) -> Collection {
        let start = Instant::now();
        let paths = match self.document_paths() {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!(collection = %self.settings.name, error = %e, "Collection not loaded");
                Vec::new()
            }
        };

        let mut fragments = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.parser.parse(path, &self.settings.default_language) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => {
                    tracing::warn!(
                        collection = %self.settings.name,
                        path = %path.display(),
                        error = %e,
                        "Skipping document"
                    );
                }
            }
        }

        let collection = Collection::assemble(self.settings, fragments, self.click_counter);
        tracing::info!(
            collection = %collection.name(),
            visible = collection.visible_len(),
            total = collection.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Collection loaded"
        );
        collection
    }
}

/// An assembled, ordered set of fragments sharing one configuration.
///
/// Immutable after assembly; share it behind an `Arc` to serve concurrent
/// requests.
pub struct Collection {
    pub(crate) settings: CollectionSettings,
    pub(crate) fragments: Vec<Fragment>,
    pub(crate) visible: Vec<usize>,
    pub(crate) tags: Taxonomy,
    pub(crate) categories: Taxonomy,
    pub(crate) click_counter: Option<Arc<dyn ClickCounter>>,
}

impl Collection {
    /// Order, link and index already parsed fragments.
    #[must_use]
    pub fn assemble(
        settings: CollectionSettings,
        mut fragments: Vec<Fragment>,
        click_counter: Option<Arc<dyn ClickCounter>>,
    ) -> Self {
        fragments.sort_by(|a, b| {
            compare_order(a.order, b.order)
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                .then_with(|| a.title.cmp(&b.title))
        });

        let origin = settings.origin();
        let mut visible = Vec::new();
        let mut tags = Taxonomy::default();
        let mut categories = Taxonomy::default();

        for (index, fragment) in fragments.iter_mut().enumerate() {
            fragment.full_url = format!("{origin}{}", fragment.url);
            fragment.full_url_encoded = encode_url(&fragment.full_url);
            if fragment.order.is_none() {
                fragment.order = Some(i32::try_from(index).unwrap_or(i32::MAX));
            }

            tags.add(&fragment.tags, index, fragment.visible);
            categories.add(&fragment.categories, index, fragment.visible);
            if fragment.visible {
                visible.push(index);
            }
        }

        Self {
            settings,
            fragments,
            visible,
            tags,
            categories,
            click_counter,
        }
    }

    /// An empty collection.
    #[must_use]
    pub fn empty(settings: CollectionSettings) -> Self {
        Self::assemble(settings, Vec::new(), None)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    #[must_use]
    pub fn settings(&self) -> &CollectionSettings {
        &self.settings
    }

    /// All fragments, including invisible ones, in assembly order.
    #[must_use]
    pub fn all(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Visible fragments in assembly order.
    pub fn visible(&self) -> impl Iterator<Item = &Fragment> {
        self.visible.iter().map(|&i| &self.fragments[i])
    }

    /// Visible fragments sorted by the given strategy.
    #[must_use]
    pub fn visible_ordered(&self, order: FragmentOrder) -> Vec<&Fragment> {
        let mut fragments: Vec<&Fragment> = self.visible().collect();
        order.sort(&mut fragments);
        fragments
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    /// Find a fragment by its relative URL.
    #[must_use]
    pub fn find_by_url(&self, url: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.url == url)
    }

    /// Find a fragment by its slug.
    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.slug == slug)
    }

    /// Number of fragments, including invisible ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Every tag with all fragments carrying it.
    #[must_use]
    pub fn all_tags(&self) -> BTreeMap<&str, Vec<&Fragment>> {
        self.resolve(self.tags.all())
    }

    /// Every tag with the visible fragments carrying it.
    #[must_use]
    pub fn visible_tags(&self) -> BTreeMap<&str, Vec<&Fragment>> {
        self.resolve(self.tags.visible())
    }

    #[must_use]
    pub fn all_categories(&self) -> BTreeMap<&str, Vec<&Fragment>> {
        self.resolve(self.categories.all())
    }

    #[must_use]
    pub fn visible_categories(&self) -> BTreeMap<&str, Vec<&Fragment>> {
        self.resolve(self.categories.visible())
    }

    /// Attached click counter, if any.
    #[must_use]
    pub fn click_counter(&self) -> Option<&Arc<dyn ClickCounter>> {
        self.click_counter.as_ref()
    }

    /// Most clicked fragments, most clicked first.
    ///
    /// Empty without a click counter. Counted file names that no longer
    /// belong to the collection are skipped.
    #[must_use]
    pub fn top_fragments(&self) -> Vec<&Fragment> {
        let Some(counter) = &self.click_counter else {
            return Vec::new();
        };
        counter
            .top(self.settings.top_fragments)
            .into_iter()
            .filter_map(|(filename, _)| self.fragments.iter().find(|f| f.filename == filename))
            .collect()
    }

    fn resolve<'a>(&'a self, index: &'a BTreeMap<String, Vec<usize>>) -> BTreeMap<&'a str, Vec<&'a Fragment>> {
        index
            .iter()
            .map(|(name, positions)| {
                let fragments = positions.iter().map(|&i| &self.fragments[i]).collect();
                (name.as_str(), fragments)
            })
            .collect()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.settings.name)
            .field("fragments", &self.fragments.len())
            .field("visible", &self.visible.len())
            .field("click_counter", &self.click_counter.is_some())
            .finish_non_exhaustive()
    }
}
