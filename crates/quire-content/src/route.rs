//! Route table and rendering contexts.
//!
//! The routing layer registers one [`Route`] per visible fragment plus an
//! optional overview route, and asks the collection for a rendering context
//! whenever a route is served. Contexts are plain JSON maps so any template
//! engine can consume them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::collection::Collection;
use crate::fragment::{Fragment, FragmentOrder};
use crate::util::remove_trailing_slash;

/// What a route renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum RouteTarget {
    /// The fragment at this position of [`Collection::all`].
    Fragment(usize),
    /// The collection overview.
    Overview,
}

/// A URL the routing layer should serve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    pub url: String,
    pub template: String,
    pub target: RouteTarget,
}

/// Error building a rendering context.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The route points at a fragment the collection doesn't have.
    #[error("Route refers to unknown fragment #{0}")]
    UnknownFragment(usize),
    /// A value could not be converted to JSON.
    #[error("Failed to serialize context: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Collection {
    /// One route per visible fragment, followed by the overview route when
    /// enabled.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .visible
            .iter()
            .map(|&index| {
                let fragment = &self.fragments[index];
                Route {
                    url: fragment.url.clone(),
                    template: fragment.template.clone(),
                    target: RouteTarget::Fragment(index),
                }
            })
            .collect();

        if self.settings.overview_route {
            routes.push(Route {
                url: remove_trailing_slash(&self.settings.url_path).to_owned(),
                template: self.settings.overview_template.clone(),
                target: RouteTarget::Overview,
            });
        }
        routes
    }

    /// Build the rendering context for a route in the given language.
    ///
    /// Keys: the collection's default context, then for fragment routes the
    /// fragment's own context and `fragment`, followed by `overview_url`,
    /// `fragments` (visible, by order), `fragments_ordered_by_title`,
    /// `all_fragments`, `lang` and, with a click counter, `top_fragments`.
    /// Fragments are serialized as views in the requested language.
    ///
    /// Serving a fragment route records a click for it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the route refers to an unknown fragment or
    /// a value fails to serialize.
    pub fn render_context(
        &self,
        route: &Route,
        language: Option<&str>,
    ) -> Result<Map<String, Value>, RenderError> {
        let mut context = self.settings.context.clone();

        if let RouteTarget::Fragment(index) = route.target {
            let fragment = self
                .fragments
                .get(index)
                .ok_or(RenderError::UnknownFragment(index))?;
            context.extend(fragment.context.clone());
            context.insert(
                "fragment".to_owned(),
                serde_json::to_value(fragment.localized(language))?,
            );
            if let Some(counter) = &self.click_counter {
                counter.record(&fragment.filename);
            }
        }

        context.insert(
            "overview_url".to_owned(),
            Value::String(self.settings.url_path.clone()),
        );
        context.insert(
            "fragments".to_owned(),
            views(self.visible_ordered(FragmentOrder::ByOrder), language)?,
        );
        context.insert(
            "fragments_ordered_by_title".to_owned(),
            views(self.visible_ordered(FragmentOrder::ByTitle), language)?,
        );
        context.insert("all_fragments".to_owned(), views(self.all(), language)?);
        if self.click_counter.is_some() {
            context.insert(
                "top_fragments".to_owned(),
                views(self.top_fragments(), language)?,
            );
        }
        context.insert(
            "lang".to_owned(),
            Value::String(
                language
                    .unwrap_or(&self.settings.default_language)
                    .to_owned(),
            ),
        );

        Ok(context)
    }
}

fn views<'a>(
    fragments: impl IntoIterator<Item = &'a Fragment>,
    language: Option<&str>,
) -> Result<Value, serde_json::Error> {
    let views: Vec<_> = fragments
        .into_iter()
        .map(|f| f.localized(language))
        .collect();
    serde_json::to_value(views)
}
