//! Markdown rendering for quire content.
//!
//! This crate provides a [`MarkdownRenderer`] that turns Markdown into HTML
//! with tables enabled and, optionally, obfuscated email links.
//!
//! # Email Obfuscation
//!
//! Obfuscation is randomized per character. The generator is owned by an
//! [`EmailObfuscator`] that the caller constructs with an explicit seed and
//! hands to the renderer, so output is reproducible for a given seed and
//! document order.
//!
//! # Example
//!
//! ```
//! use quire_markdown::{EmailObfuscator, MarkdownRenderer};
//!
//! let mut renderer = MarkdownRenderer::new()
//!     .with_email_obfuscation(EmailObfuscator::with_seed(7));
//! let html = renderer.render("Write to <team@example.com>");
//! assert!(html.starts_with("<p>Write to <a href=\""));
//! ```

mod obfuscate;
mod renderer;
mod text;

pub use obfuscate::{DEFAULT_SEED, EmailObfuscator};
pub use renderer::MarkdownRenderer;
pub use text::{escape_html, strip_tags};
