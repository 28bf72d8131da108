//! `quire routes` command implementation.

use clap::Args;
use quire_config::Config;
use quire_content::Route;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ConfigArgs, loader};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the routes command.
#[derive(Args)]
pub(crate) struct RoutesArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Language to render contexts in (default: each collection's default).
    #[arg(short, long)]
    lang: Option<String>,

    /// Only show routes of this collection.
    #[arg(long)]
    collection: Option<String>,
}

/// One route with its rendering context.
#[derive(Debug, Serialize)]
struct RouteEntry {
    collection: String,
    #[serde(flatten)]
    route: Route,
    context: Map<String, Value>,
}

impl RoutesArgs {
    /// Execute the routes command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the collection is unknown or
    /// a context cannot be rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;

        let entries = collect_routes(&config, self.collection.as_deref(), self.lang.as_deref())?;
        output.result(&serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// Load the selected collections and render every route.
fn collect_routes(
    config: &Config,
    only: Option<&str>,
    language: Option<&str>,
) -> Result<Vec<RouteEntry>, CliError> {
    if let Some(name) = only
        && config.collection(name).is_none()
    {
        return Err(CliError::Validation(format!("Unknown collection: {name}")));
    }

    let mut entries = Vec::new();
    for collection_config in &config.collections {
        if only.is_some_and(|name| name != collection_config.name) {
            continue;
        }
        let collection = loader(config, collection_config.to_settings()).load();
        for route in collection.routes() {
            let context = collection.render_context(&route, language)?;
            entries.push(RouteEntry {
                collection: collection.name().to_owned(),
                route,
                context,
            });
        }
    }
    Ok(entries)
}
