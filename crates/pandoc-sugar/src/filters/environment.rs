/*
 * environment.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Filter that wraps classed Divs in raw LaTeX environments.
 */

//! LaTeX environment filter.
//!
//! On `latex` and `beamer` output, a Div whose first non-reserved class
//! names an environment is replaced by a raw `\begin{...}`/`\end{...}`
//! pair around its children. A `title` attribute becomes the bracketed
//! optional argument, other attributes become `key=value` entries in the
//! same brackets, and a non-empty identifier becomes a `\label`. The
//! `sugar.environments` table renames classes to environment names; a
//! class not in the table is used as-is. Classes claimed by the other
//! filters are never picked: admonition keywords and the column container
//! class are skipped, and a Div carrying a column marker or column class
//! is not claimed at all. On any other format the filter claims nothing.

use hashlink::LinkedHashMap;
use pandoc_sugar_ast::attr::Attr;
use pandoc_sugar_ast::block::Block;

use crate::config::Config;
use crate::filter_context::FilterContext;
use crate::walk::{BlockFilter, FilterReturn, TraversalMode};

/// Filter that converts classed Divs to LaTeX environments.
pub struct EnvironmentFilter {
    renames: LinkedHashMap<String, String>,
    reserved: Vec<String>,
    column_layout: Vec<String>,
}

impl EnvironmentFilter {
    pub fn new(config: &Config) -> Self {
        let mut reserved = config.admonitions.clone();
        reserved.push("admonition".to_string());
        reserved.push(config.columns.container.clone());
        let column_layout = vec![
            config.columns.begin.clone(),
            config.columns.next.clone(),
            config.columns.end.clone(),
            "columns".to_string(),
            "column".to_string(),
        ];
        EnvironmentFilter {
            renames: config.environments.clone(),
            reserved,
            column_layout,
        }
    }

    /// First class that no other filter lays claim to, if any.
    ///
    /// A Div carrying a column marker or column class is a layout node the
    /// columns filter owns outright: it is never an environment, whatever
    /// else it is classed with. The remaining reserved classes are merely
    /// skipped when picking.
    fn environment_class(&self, attr: &Attr) -> Option<String> {
        let (_id, classes, _attrs) = attr;
        if classes.iter().any(|class| self.column_layout.contains(class)) {
            return None;
        }
        classes
            .iter()
            .find(|class| !self.reserved.iter().any(|reserved| reserved == *class))
            .cloned()
    }
}

impl BlockFilter for EnvironmentFilter {
    fn name(&self) -> &'static str {
        "environments"
    }

    fn mode(&self) -> TraversalMode {
        TraversalMode::PostOrder
    }

    fn filter_block(&self, block: Block, ctx: &mut FilterContext) -> FilterReturn<Block> {
        if !ctx.format.is_latex() {
            return FilterReturn::Unchanged(block);
        }
        match block {
            Block::Div(div) => {
                let Some(class) = self.environment_class(&div.attr) else {
                    return FilterReturn::Unchanged(Block::Div(div));
                };
                let environment = self.renames.get(&class).cloned().unwrap_or(class);
                tracing::debug!(
                    environment = environment.as_str(),
                    "Wrapping div in a LaTeX environment"
                );
                let begin = begin_text(&div.attr, &environment);
                let mut blocks = vec![Block::raw("tex", begin)];
                blocks.extend(div.content);
                blocks.push(Block::raw("tex", format!("\\end{{{environment}}}")));
                FilterReturn::FilterResult(blocks, false)
            }
            other => FilterReturn::Unchanged(other),
        }
    }
}

/// Render the `\begin` line: optional arguments from the attributes
/// (title first), then a `\label` from the identifier.
fn begin_text(attr: &Attr, environment: &str) -> String {
    let (id, _classes, attrs) = attr;
    let mut text = format!("\\begin{{{environment}}}");

    let mut options: Vec<String> = Vec::new();
    if let Some(title) = attrs.get("title") {
        options.push(title.clone());
    }
    for (key, value) in attrs.iter() {
        if key != "title" {
            options.push(format!("{key}={value}"));
        }
    }
    if !options.is_empty() {
        text.push_str(&format!("[{}]", options.join(", ")));
    }
    if !id.is_empty() {
        text.push_str(&format!("\\label{{{id}}}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandoc_sugar_ast::Inline;
    use pandoc_sugar_ast::block::RawBlock;

    use crate::format::TargetFormat;

    fn classed_div(classes: &[&str], content: Vec<Block>) -> Block {
        Block::div(
            (
                String::new(),
                classes.iter().map(|c| c.to_string()).collect(),
                LinkedHashMap::new(),
            ),
            content,
        )
    }

    fn body() -> Vec<Block> {
        vec![Block::para(vec![Inline::str("body")])]
    }

    fn begin_of(filter: &EnvironmentFilter, ctx: &mut FilterContext, block: Block) -> String {
        match filter.filter_block(block, ctx) {
            FilterReturn::FilterResult(blocks, recurse) => {
                assert!(!recurse);
                match &blocks[0] {
                    Block::RawBlock(RawBlock { format, text }) => {
                        assert_eq!(format, "tex");
                        text.clone()
                    }
                    other => panic!("Expected a raw begin block, got {other:?}"),
                }
            }
            FilterReturn::Unchanged(_) => panic!("Expected the filter to claim the div"),
        }
    }

    #[test]
    fn test_non_latex_formats_claim_nothing() {
        let filter = EnvironmentFilter::new(&Config::default());
        let mut ctx = FilterContext::new(TargetFormat::new("html"));
        match filter.filter_block(classed_div(&["theorem"], body()), &mut ctx) {
            FilterReturn::Unchanged(_) => {}
            FilterReturn::FilterResult(..) => panic!("Expected no claim on html output"),
        }
    }

    #[test]
    fn test_simple_environment() {
        let filter = EnvironmentFilter::new(&Config::default());
        let mut ctx = FilterContext::new(TargetFormat::new("latex"));
        let input = classed_div(&["theorem"], body());
        match filter.filter_block(input, &mut ctx) {
            FilterReturn::FilterResult(blocks, _) => {
                assert_eq!(blocks.len(), 3);
                match (&blocks[0], &blocks[2]) {
                    (Block::RawBlock(begin), Block::RawBlock(end)) => {
                        assert_eq!(begin.text, "\\begin{theorem}");
                        assert_eq!(end.text, "\\end{theorem}");
                    }
                    _ => panic!("Expected raw begin and end blocks"),
                }
            }
            FilterReturn::Unchanged(_) => panic!("Expected the filter to claim the div"),
        }
    }

    #[test]
    fn test_title_and_attrs_become_options() {
        let filter = EnvironmentFilter::new(&Config::default());
        let mut ctx = FilterContext::new(TargetFormat::new("latex"));
        let mut attrs = LinkedHashMap::new();
        attrs.insert("number".to_string(), "2".to_string());
        attrs.insert("title".to_string(), "Euclid".to_string());
        let input = Block::div(
            (String::new(), vec!["theorem".to_string()], attrs),
            body(),
        );
        assert_eq!(
            begin_of(&filter, &mut ctx, input),
            "\\begin{theorem}[Euclid, number=2]"
        );
    }

    #[test]
    fn test_identifier_becomes_label() {
        let filter = EnvironmentFilter::new(&Config::default());
        let mut ctx = FilterContext::new(TargetFormat::new("beamer"));
        let input = Block::div(
            (
                "thm-1".to_string(),
                vec!["theorem".to_string()],
                LinkedHashMap::new(),
            ),
            body(),
        );
        assert_eq!(
            begin_of(&filter, &mut ctx, input),
            "\\begin{theorem}\\label{thm-1}"
        );
    }

    #[test]
    fn test_rename_table() {
        let mut environments = LinkedHashMap::new();
        environments.insert("proof".to_string(), "proofEnv".to_string());
        let config = Config {
            environments,
            ..Config::default()
        };
        let filter = EnvironmentFilter::new(&config);
        let mut ctx = FilterContext::new(TargetFormat::new("latex"));
        assert_eq!(
            begin_of(&filter, &mut ctx, classed_div(&["proof"], body())),
            "\\begin{proofEnv}"
        );
    }

    #[test]
    fn test_reserved_classes_are_skipped() {
        let filter = EnvironmentFilter::new(&Config::default());
        let mut ctx = FilterContext::new(TargetFormat::new("latex"));

        // admonition keywords and column classes never become environments
        match filter.filter_block(classed_div(&["note"], body()), &mut ctx) {
            FilterReturn::Unchanged(_) => {}
            FilterReturn::FilterResult(..) => panic!("Expected no claim on an admonition div"),
        }

        // the first non-reserved class wins
        assert_eq!(
            begin_of(&filter, &mut ctx, classed_div(&["twocol", "theorem"], body())),
            "\\begin{theorem}"
        );
    }

    #[test]
    fn test_column_layout_divs_are_not_claimed() {
        let filter = EnvironmentFilter::new(&Config::default());
        let mut ctx = FilterContext::new(TargetFormat::new("beamer"));

        // a decorated marker stays a marker for the columns filter to consume
        let marker = classed_div(&["column-begin", "shaded"], vec![]);
        match filter.filter_block(marker, &mut ctx) {
            FilterReturn::Unchanged(_) => {}
            FilterReturn::FilterResult(..) => panic!("Expected no claim on a column marker"),
        }

        // the columns filter's own output is never rewrapped
        let column = classed_div(&["column", "shaded"], body());
        match filter.filter_block(column, &mut ctx) {
            FilterReturn::Unchanged(_) => {}
            FilterReturn::FilterResult(..) => panic!("Expected no claim on a column div"),
        }
    }
}
