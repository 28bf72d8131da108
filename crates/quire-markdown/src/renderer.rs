//! Markdown to HTML renderer.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html};

use crate::obfuscate::EmailObfuscator;
use crate::text::escape_html;

/// Markdown renderer producing HTML fragments.
///
/// Tables are enabled by default. Email obfuscation is off until an
/// [`EmailObfuscator`] is attached with
/// [`with_email_obfuscation`](Self::with_email_obfuscation).
#[derive(Debug)]
pub struct MarkdownRenderer {
    tables: bool,
    obfuscator: Option<EmailObfuscator>,
}

/// Autolink to a mail address, collected until its closing tag.
struct PendingAutolink {
    href: String,
    text: String,
}

impl MarkdownRenderer {
    /// Create a renderer with tables enabled and no email obfuscation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: true,
            obfuscator: None,
        }
    }

    /// Enable or disable the tables extension.
    #[must_use]
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self
    }

    /// Obfuscate email links using the given generator.
    ///
    /// Autolinks (`<user@example.com>`, `<mailto:user@example.com>`) get both
    /// their `href` and their text obfuscated. Regular links with a `mailto:`
    /// destination get their `href` obfuscated and keep their text.
    #[must_use]
    pub fn with_email_obfuscation(mut self, obfuscator: EmailObfuscator) -> Self {
        self.obfuscator = Some(obfuscator);
        self
    }

    /// Parser options for the configured extensions.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.tables {
            Options::ENABLE_TABLES
        } else {
            Options::empty()
        }
    }

    /// Render markdown text to HTML.
    pub fn render(&mut self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);

        match self.obfuscator.as_mut() {
            Some(obfuscator) => {
                let events = obfuscate_mail_links(parser, obfuscator);
                html::push_html(&mut output, events.into_iter());
            }
            None => html::push_html(&mut output, parser),
        }

        output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace email links in the event stream with obfuscated inline HTML.
fn obfuscate_mail_links<'a>(
    parser: Parser<'a>,
    obfuscator: &mut EmailObfuscator,
) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut autolink: Option<PendingAutolink> = None;
    let mut in_mailto_link = false;

    for event in parser {
        match event {
            Event::Start(Tag::Link {
                link_type: LinkType::Email,
                dest_url,
                ..
            }) => {
                autolink = Some(PendingAutolink {
                    href: format!("mailto:{dest_url}"),
                    text: String::new(),
                });
            }
            Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url,
                ..
            }) if dest_url.starts_with("mailto:") => {
                autolink = Some(PendingAutolink {
                    href: dest_url.into_string(),
                    text: String::new(),
                });
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if dest_url.starts_with("mailto:") => {
                in_mailto_link = true;
                let href = obfuscator.obfuscate(&dest_url);
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(r#" title="{}""#, escape_html(&title))
                };
                events.push(inline_html(format!(r#"<a href="{href}"{title_attr}>"#)));
            }
            Event::Text(text) if autolink.is_some() => {
                if let Some(link) = autolink.as_mut() {
                    link.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) => {
                if let Some(link) = autolink.take() {
                    let href = obfuscator.obfuscate(&link.href);
                    let text = obfuscator.obfuscate(&link.text);
                    events.push(inline_html(format!(r#"<a href="{href}">{text}</a>"#)));
                } else if in_mailto_link {
                    in_mailto_link = false;
                    events.push(inline_html("</a>".to_owned()));
                } else {
                    events.push(Event::End(TagEnd::Link));
                }
            }
            other => events.push(other),
        }
    }

    events
}

fn inline_html<'a>(html: String) -> Event<'a> {
    Event::InlineHtml(CowStr::from(html))
}
