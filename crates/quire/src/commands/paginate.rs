//! `quire paginate` command implementation.

use clap::Args;
use quire_content::calculate_pagination;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the paginate command.
#[derive(Args)]
pub(crate) struct PaginateArgs {
    /// Current page (1-based).
    page: u32,

    /// Maximum number of numbered pages shown.
    window: u32,

    /// Total number of items.
    total: u64,
}

impl PaginateArgs {
    /// Execute the paginate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page or window is zero.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        if self.page == 0 || self.window == 0 {
            return Err(CliError::Validation(
                "page and window must be at least 1".to_owned(),
            ));
        }
        let window = calculate_pagination(self.page, self.window, self.total);
        Output::new().result(&serde_json::to_string_pretty(&window)?)?;
        Ok(())
    }
}
