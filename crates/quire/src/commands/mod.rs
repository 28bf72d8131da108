//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod paginate;
pub(crate) mod routes;

use std::path::{Path, PathBuf};

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_content::{CollectionLoader, CollectionSettings, FsSource, RustEmbedSource, Sources};

use crate::error::CliError;

pub(crate) use check::CheckArgs;
pub(crate) use paginate::PaginateArgs;
pub(crate) use routes::RoutesArgs;

/// Configuration arguments shared by commands that load collections.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Domain for full URLs (overrides config).
    #[arg(long, env = "QUIRE_DOMAIN")]
    domain: Option<String>,

    /// Protocol for full URLs (overrides config).
    #[arg(long)]
    protocol: Option<String>,

    /// Default content language (overrides config).
    #[arg(long)]
    default_language: Option<String>,
}

impl ConfigArgs {
    /// Load the configuration with CLI overrides applied.
    pub(crate) fn load(self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            domain: self.domain,
            protocol: self.protocol,
            default_language: self.default_language,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Documents compiled into the binary, laid out like the site directory.
#[derive(rust_embed::RustEmbed)]
#[folder = "bundled/"]
struct Bundled;

/// Bundled documents first, then the filesystem.
///
/// The bundled folder stands in for the directory holding the config file.
pub(crate) fn sources(config: &Config) -> Sources {
    let root = config
        .config_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Sources::empty()
        .with(RustEmbedSource::<Bundled>::new().with_root(root))
        .with(FsSource)
}

/// Loader for one collection reading through [`sources`].
pub(crate) fn loader(config: &Config, settings: CollectionSettings) -> CollectionLoader {
    CollectionLoader::new(settings).with_sources(sources(config))
}
