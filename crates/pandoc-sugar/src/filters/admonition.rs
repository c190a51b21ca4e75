/*
 * admonition.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Filter that converts admonition Divs to format-appropriate output.
 */

//! Admonition conversion filter.
//!
//! This filter finds Div blocks whose classes carry an admonition keyword
//! (`note`, `warning`, `tip`, `caution` by default; the vocabulary comes
//! from `sugar.admonitions`) and rewrites them for the target format.
//!
//! ## Input Structure
//!
//! An admonition in the source document looks like:
//!
//! ```markdown
//! ::: {.warning}
//! ## Optional Title
//!
//! Body content here.
//! :::
//! ```
//!
//! This is parsed as a Div with class "warning" containing a Header and
//! Paragraph blocks. If the first child is a Header, its inlines become
//! the title and the header is removed from the body.
//!
//! ## Output Structure
//!
//! For `latex` and `beamer` the Div is replaced by a raw environment:
//!
//! ```text
//! \begin{warning}[Optional Title]
//! ...body...
//! \end{warning}
//! ```
//!
//! The bracketed argument is emitted only when a title header was present,
//! and a non-empty identifier is kept as a `\label` on the `\begin` line.
//! For every other format the Div survives with classes `admonition` and
//! `admonition-warning` and a bold title paragraph prepended, so a plain
//! CSS rule can style it.

use pandoc_sugar_ast::attr::Attr;
use pandoc_sugar_ast::block::{Block, Div};
use pandoc_sugar_ast::inline::{Inline, Strong};
use pandoc_sugar_ast::stringify::stringify_inlines;
use pandoc_sugar_ast::{Blocks, Inlines};

use crate::config::Config;
use crate::filter_context::FilterContext;
use crate::walk::{BlockFilter, FilterReturn, TraversalMode};

/// Filter that converts admonition Divs.
pub struct AdmonitionFilter {
    keywords: Vec<String>,
}

impl AdmonitionFilter {
    pub fn new(config: &Config) -> Self {
        AdmonitionFilter {
            keywords: config.admonitions.clone(),
        }
    }
}

impl BlockFilter for AdmonitionFilter {
    fn name(&self) -> &'static str {
        "admonitions"
    }

    fn mode(&self) -> TraversalMode {
        TraversalMode::PostOrder
    }

    fn filter_block(&self, block: Block, ctx: &mut FilterContext) -> FilterReturn<Block> {
        match block {
            Block::Div(div) => {
                let Some(keyword) = admonition_keyword(&div.attr, &self.keywords) else {
                    return FilterReturn::Unchanged(Block::Div(div));
                };
                tracing::debug!(keyword = keyword.as_str(), "Converting admonition div");
                let blocks = if ctx.format.is_latex() {
                    convert_div_to_environment(div, &keyword)
                } else {
                    vec![convert_div_to_styled(div, &keyword)]
                };
                FilterReturn::FilterResult(blocks, false)
            }
            other => FilterReturn::Unchanged(other),
        }
    }
}

/// Extract the admonition keyword from a Div's attributes.
///
/// Returns the first class that appears in the configured vocabulary,
/// or None if this is not an admonition div.
fn admonition_keyword(attr: &Attr, keywords: &[String]) -> Option<String> {
    let (_id, classes, _attrs) = attr;
    classes
        .iter()
        .find(|class| keywords.iter().any(|keyword| keyword == *class))
        .cloned()
}

/// Pull a leading Header out of the body to use as the title.
fn extract_title(content: &mut Blocks) -> Option<Inlines> {
    if let Some(Block::Header(header)) = content.first() {
        let title = header.content.clone();
        content.remove(0);
        return Some(title);
    }
    None
}

/// Replace the Div with a raw `\begin{kw}...\end{kw}` run; a non-empty
/// identifier becomes a `\label` on the `\begin` line.
fn convert_div_to_environment(mut div: Div, keyword: &str) -> Blocks {
    let title = extract_title(&mut div.content);

    let mut begin = format!("\\begin{{{keyword}}}");
    if let Some(title) = &title {
        begin.push_str(&format!("[{}]", stringify_inlines(title)));
    }
    let id = &div.attr.0;
    if !id.is_empty() {
        begin.push_str(&format!("\\label{{{id}}}"));
    }

    let mut blocks = vec![Block::raw("tex", begin)];
    blocks.extend(div.content);
    blocks.push(Block::raw("tex", format!("\\end{{{keyword}}}")));
    blocks
}

/// Rewrite the Div into the styled emulation used by non-LaTeX formats.
fn convert_div_to_styled(mut div: Div, keyword: &str) -> Block {
    let title = extract_title(&mut div.content)
        .unwrap_or_else(|| vec![Inline::str(capitalize(keyword))]);

    let (id, classes, attrs) = div.attr;
    let mut styled_classes = vec!["admonition".to_string(), format!("admonition-{keyword}")];
    // The trigger class is consumed; everything else the author wrote stays.
    styled_classes.extend(classes.into_iter().filter(|class| class != keyword));

    let mut content = vec![Block::para(vec![Inline::Strong(Strong { content: title })])];
    content.extend(div.content);

    Block::div((id, styled_classes, attrs), content)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
