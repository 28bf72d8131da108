//! Content collections for quire.
//!
//! This crate turns a directory of Markdown documents with YAML or JSON front
//! matter into an ordered, queryable [`Collection`] of [`Fragment`]s:
//!
//! - [`DocumentParser`] splits front matter from the body, interprets the
//!   well-known keys, splits the body into language segments and renders each
//!   segment and its preview.
//! - [`CollectionLoader`] parses a whole directory and assembles the result:
//!   stable ordering, order back-fill, full URLs and tag/category indices.
//! - [`Collection::routes`] and [`Collection::render_context`] hand the
//!   result to a routing/templating layer.
//! - [`calculate_pagination`] computes page navigation for any paginated
//!   result.
//!
//! # Example
//!
//! ```
//! use quire_content::{CollectionLoader, CollectionSettings, FragmentOrder};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("b.md"), "---\ntitle: Second\n---\nBody\n").unwrap();
//! std::fs::write(dir.path().join("a.md"), "---\ntitle: First\norder: 0\n---\nBody\n").unwrap();
//!
//! let settings = CollectionSettings::new("posts", dir.path()).with_url_path("/posts/");
//! let collection = CollectionLoader::new(settings).load();
//!
//! let titles: Vec<_> = collection
//!     .visible_ordered(FragmentOrder::ByOrder)
//!     .iter()
//!     .map(|f| f.title.as_str())
//!     .collect();
//! assert_eq!(titles, ["First", "Second"]);
//! assert_eq!(collection.all()[1].url, "/posts/b");
//! ```
//!
//! Documents compiled into the binary are served through [`RustEmbedSource`]
//! placed ahead of [`FsSource`] in a [`Sources`] chain.

mod clicks;
mod collection;
mod date;
mod document;
mod fragment;
mod front_matter;
mod pagination;
mod route;
mod settings;
mod source;
mod taxonomy;
mod util;

pub use clicks::{ClickCounter, MemoryClickCounter};
pub use collection::{Collection, CollectionError, CollectionLoader};
pub use date::{DateError, FALLBACK_DATE, parse_date};
pub use document::{DocumentParser, ParseError};
pub use fragment::{Fragment, FragmentOrder, FragmentView, LocalizedContent};
pub use front_matter::{FrontMatter, FrontMatterError, FrontMatterFormat};
pub use pagination::{ITEMS_PER_PAGE, PageLink, PaginationWindow, calculate_pagination};
pub use route::{RenderError, Route, RouteTarget};
pub use settings::{CollectionSettings, RouteMode};
pub use source::{FsSource, RustEmbedSource, Source, SourceError, Sources};
pub use util::{encode_url, remove_trailing_slash, slugify};
