//! `quire check` command implementation.

use clap::Args;

use super::{ConfigArgs, loader};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;

        if let Some(path) = &config.config_path {
            output.line(&format!("Config: {}", path.display()));
        }
        if config.collections.is_empty() {
            output.warning("No collections configured");
            return Ok(());
        }

        let mut problems = 0;
        for settings in config.collection_settings() {
            output.heading(&settings.name);
            output.line(&format!("  Directory: {}", settings.data_dir.display()));

            let collection_loader = loader(&config, settings);
            if let Err(e) = collection_loader.document_paths() {
                output.warning(&format!("  {e}"));
                problems += 1;
                continue;
            }

            let collection = collection_loader.load();
            output.line(&format!(
                "  Fragments: {} visible / {} total",
                collection.visible_len(),
                collection.len()
            ));
            output.line(&format!(
                "  Tags: {}, categories: {}",
                collection.all_tags().len(),
                collection.all_categories().len()
            ));
            output.line(&format!("  Routes: {}", collection.routes().len()));
        }

        let checked = config.collections.len();
        if problems == 0 {
            output.line(&format!("Checked {checked} collections"));
        } else {
            output.warning(&format!(
                "Checked {checked} collections, {problems} with problems"
            ));
        }
        Ok(())
    }
}
