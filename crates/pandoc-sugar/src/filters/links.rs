/*
 * links.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Filter that expands marker Spans into resolved hyperlinks.
 */

//! Reference link filter.
//!
//! A Span whose identifier is the configured marker (`l` by default) is a
//! reference-link candidate: `[Rust]{#l .wiki}` becomes a Wikipedia link.
//! The reference token is the `type` attribute when present, otherwise the
//! span's first class. The token is looked up in the resolution table
//! (`sugar.links.table`, merged over the built-in shorthands); a `{}`
//! placeholder in the entry's URL is substituted with the span's text,
//! percent-encoded when the entry asks for it. Tokens missing from the
//! table fall back to the `sugar.links.template` URL, which substitutes
//! the token itself. A token that resolves nowhere leaves the span
//! untouched and records an unresolved-reference diagnostic.
//!
//! The visible text can be replaced wholesale with a `title` attribute
//! and decorated with `before`/`after` text, either from the table entry
//! or from attributes on the span itself.

use hashlink::LinkedHashMap;
use pandoc_sugar_ast::attr::Attr;
use pandoc_sugar_ast::inline::{Inline, Link, Span};
use pandoc_sugar_ast::stringify::stringify_inlines;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::config::{Config, LinkEntry, LinksConfig};
use crate::filter_context::FilterContext;
use crate::walk::{FilterReturn, InlineFilter, TraversalMode};

/// Everything except alphanumerics and `-._~` is escaped; spaces then
/// become `+`. Matches what URL query encoders produce.
const QUOTE_PLUS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Filter that rewrites marker Spans into Links.
pub struct LinkFilter {
    config: LinksConfig,
}

impl LinkFilter {
    pub fn new(config: &Config) -> Self {
        LinkFilter {
            config: config.links.clone(),
        }
    }

    fn resolve(&self, span: Span, ctx: &mut FilterContext) -> FilterReturn<Inline> {
        let Some(token) = reference_token(&span.attr) else {
            ctx.unresolved_reference(
                "links",
                "Link marker span has no type attribute and no class, leaving it unchanged",
            );
            return FilterReturn::Unchanged(Inline::Span(span));
        };

        let content_text = stringify_inlines(&span.content);
        let visible = if content_text.is_empty() {
            token.clone()
        } else {
            content_text
        };

        let entry = self.config.table.get(&token);
        let url = match entry {
            Some(entry) => expand_url(entry, &visible),
            None => match &self.config.template {
                Some(template) => template.replace("{}", &token),
                None => {
                    ctx.unresolved_reference(
                        "links",
                        format!("No link table entry or template for `{token}`"),
                    );
                    return FilterReturn::Unchanged(Inline::Span(span));
                }
            },
        };
        let title = entry
            .and_then(|entry| entry.title.clone())
            .unwrap_or_default();

        let (_id, classes, attrs) = span.attr;
        let display = display_text(visible, &attrs, entry);

        tracing::debug!(
            token = token.as_str(),
            url = url.as_str(),
            "Resolved reference link"
        );
        let link = Inline::Link(Link {
            // marker id consumed; classes and attributes travel with the link
            attr: (String::new(), classes, attrs),
            content: vec![Inline::str(display)],
            target: (url, title),
        });
        FilterReturn::FilterResult(vec![link], false)
    }
}

impl InlineFilter for LinkFilter {
    fn name(&self) -> &'static str {
        "links"
    }

    fn mode(&self) -> TraversalMode {
        TraversalMode::PreOrder
    }

    fn filter_inline(&self, inline: Inline, ctx: &mut FilterContext) -> FilterReturn<Inline> {
        match inline {
            Inline::Span(span) if span.attr.0 == self.config.marker => self.resolve(span, ctx),
            other => FilterReturn::Unchanged(other),
        }
    }
}

/// The `type` attribute wins over the first class.
fn reference_token(attr: &Attr) -> Option<String> {
    let (_id, classes, attrs) = attr;
    attrs
        .get("type")
        .cloned()
        .or_else(|| classes.first().cloned())
}

/// Substitute the span text into the entry's URL placeholder. A URL
/// without a placeholder is used verbatim.
fn expand_url(entry: &LinkEntry, visible: &str) -> String {
    if !entry.url.contains("{}") {
        return entry.url.clone();
    }
    let slug = if entry.encode {
        quote_plus(visible)
    } else {
        visible.to_string()
    };
    entry.url.replace("{}", &slug)
}

fn quote_plus(input: &str) -> String {
    percent_encode(input.as_bytes(), QUOTE_PLUS)
        .to_string()
        .replace("%20", "+")
}

/// Apply the display pipeline: title replacement, then before/after
/// decorations. Span attributes override table entry fields.
fn display_text(
    visible: String,
    attrs: &LinkedHashMap<String, String>,
    entry: Option<&LinkEntry>,
) -> String {
    let mut display = match attrs.get("title") {
        Some(title) => title.clone(),
        None => visible,
    };
    let before = attrs
        .get("before")
        .cloned()
        .or_else(|| entry.and_then(|entry| entry.before.clone()));
    let after = attrs
        .get("after")
        .cloned()
        .or_else(|| entry.and_then(|entry| entry.after.clone()));
    if let Some(before) = before {
        display = format!("{before}{display}");
    }
    if let Some(after) = after {
        display.push_str(&after);
    }
    display
}
