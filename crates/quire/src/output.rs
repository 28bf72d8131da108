//! Terminal output for the CLI.

use console::{Style, Term};

/// Human-readable messages on stderr, command results on stdout.
pub(crate) struct Output {
    messages: Term,
    results: Term,
    heading: Style,
    warning: Style,
    error: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            messages: Term::stderr(),
            results: Term::stdout(),
            heading: Style::new().bold(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
        }
    }

    pub(crate) fn line(&self, msg: &str) {
        let _ = self.messages.write_line(msg);
    }

    pub(crate) fn heading(&self, msg: &str) {
        self.styled(&self.heading, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.error, msg);
    }

    /// Write a command result to stdout.
    pub(crate) fn result(&self, data: &str) -> std::io::Result<()> {
        self.results.write_line(data)
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.messages.write_line(&style.apply_to(msg).to_string());
    }
}
