/*
 * pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! One-call document transformation.
//!
//! [`apply`] resolves the configuration from the document's metadata,
//! assembles the filter set, and runs a single traversal. The pipeline
//! value is built fresh per run; nothing is registered globally.

use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::filter_context::FilterContext;
use crate::filters::{build_filter_set, default_filter_set};
use crate::format::TargetFormat;
use crate::walk::traverse;
use pandoc_sugar_ast::Pandoc;

/// Rewrite one document for the given target format.
///
/// An empty `selection` runs the full built-in pipeline; otherwise the
/// named filters run in the order given. Returns the rewritten document
/// and the warnings collected along the way; only a structural error or
/// an unknown filter name fails the call.
pub fn apply(
    doc: Pandoc,
    format: TargetFormat,
    selection: &[String],
) -> Result<(Pandoc, Vec<Diagnostic>)> {
    let config = Config::from_meta(&doc.meta);
    let filters = if selection.is_empty() {
        default_filter_set(&config)
    } else {
        build_filter_set(selection, &config)?
    };
    tracing::debug!(filters = ?filters.names(), format = %format, "Applying filter pipeline");

    let mut ctx = FilterContext::new(format);
    let doc = traverse(doc, &filters, &mut ctx)?;
    Ok((doc, ctx.into_diagnostics()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashlink::LinkedHashMap;
    use pandoc_sugar_ast::{Block, Inline, Meta};
    use pretty_assertions::assert_eq;

    fn div(classes: &[&str], content: Vec<Block>) -> Block {
        Block::div(
            (
                String::new(),
                classes.iter().map(|c| c.to_string()).collect(),
                LinkedHashMap::new(),
            ),
            content,
        )
    }

    fn para(text: &str) -> Block {
        Block::para(vec![Inline::str(text)])
    }

    fn doc(blocks: Vec<Block>) -> Pandoc {
        Pandoc {
            meta: Meta::new(),
            blocks,
        }
    }

    #[test]
    fn test_whole_pipeline_is_idempotent() {
        let input = doc(vec![
            div(&["warning"], vec![para("Careful")]),
            div(
                &["twocol"],
                vec![
                    div(&["column-begin"], vec![]),
                    para("left"),
                    div(&["column-next"], vec![]),
                    para("right"),
                    div(&["column-end"], vec![]),
                ],
            ),
            Block::para(vec![Inline::span(
                ("l".to_string(), vec!["wiki".to_string()], LinkedHashMap::new()),
                vec![Inline::str("Rust")],
            )]),
        ]);

        let (once, warnings) = apply(input, TargetFormat::new("html"), &[]).unwrap();
        assert!(warnings.is_empty());
        let (twice, warnings) = apply(once.clone(), TargetFormat::new("html"), &[]).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_whole_pipeline_is_idempotent_for_beamer() {
        // labeled admonition, decorated columns, environment, and a
        // resolved link must all survive a second run unchanged
        let mut width = LinkedHashMap::new();
        width.insert("width".to_string(), "30%".to_string());
        let input = doc(vec![
            Block::div(
                ("warn-1".to_string(), vec!["warning".to_string()], LinkedHashMap::new()),
                vec![para("Careful")],
            ),
            div(
                &["twocol"],
                vec![
                    Block::div(
                        (
                            String::new(),
                            vec!["column-begin".to_string(), "shaded".to_string()],
                            width,
                        ),
                        vec![],
                    ),
                    para("left"),
                    div(&["column-next"], vec![]),
                    para("right"),
                    div(&["column-end"], vec![]),
                ],
            ),
            div(&["theorem"], vec![para("body")]),
            Block::para(vec![Inline::span(
                ("l".to_string(), vec!["wiki".to_string()], LinkedHashMap::new()),
                vec![Inline::str("Rust")],
            )]),
        ]);

        let (once, warnings) = apply(input, TargetFormat::new("beamer"), &[]).unwrap();
        assert!(warnings.is_empty());
        let (twice, warnings) = apply(once.clone(), TargetFormat::new("beamer"), &[]).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_admonitions_inner_first() {
        let input = doc(vec![div(
            &["warning"],
            vec![div(&["note"], vec![para("inner")])],
        )]);

        let (output, _) = apply(input, TargetFormat::new("html"), &[]).unwrap();
        match &output.blocks[0] {
            Block::Div(outer) => {
                assert_eq!(outer.attr.1[..2], ["admonition", "admonition-warning"]);
                // body after the generated title paragraph holds the
                // already-rewritten inner note
                match &outer.content[1] {
                    Block::Div(inner) => {
                        assert_eq!(inner.attr.1[..2], ["admonition", "admonition-note"]);
                    }
                    other => panic!("Expected the rewritten note div, got {other:?}"),
                }
            }
            other => panic!("Expected the rewritten warning div, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_container_passes_through() {
        let input = doc(vec![div(&["sidebar"], vec![para("text")])]);
        let (output, warnings) = apply(input.clone(), TargetFormat::new("html"), &[]).unwrap();
        assert_eq!(output, input);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_selection_restricts_the_pipeline() {
        let input = doc(vec![
            div(&["note"], vec![para("note body")]),
            Block::para(vec![Inline::span(
                ("l".to_string(), vec!["wiki".to_string()], LinkedHashMap::new()),
                vec![Inline::str("Rust")],
            )]),
        ]);

        // only the links filter runs: the note div must survive untouched
        let (output, _) =
            apply(input, TargetFormat::new("html"), &["links".to_string()]).unwrap();
        match &output.blocks[0] {
            Block::Div(div) => assert_eq!(div.attr.1, vec!["note"]),
            other => panic!("Expected the note div untouched, got {other:?}"),
        }
        match &output.blocks[1] {
            Block::Paragraph(p) => assert!(matches!(p.content[0], Inline::Link(_))),
            other => panic!("Expected the rewritten link, got {other:?}"),
        }
    }

    #[test]
    fn test_config_comes_from_document_meta() {
        use pandoc_sugar_ast::MetaValue;

        let mut links = LinkedHashMap::new();
        links.insert(
            "marker".to_string(),
            MetaValue::MetaString("ref".to_string()),
        );
        let mut sugar = LinkedHashMap::new();
        sugar.insert("links".to_string(), MetaValue::MetaMap(links));
        let mut meta = Meta::new();
        meta.insert("sugar".to_string(), MetaValue::MetaMap(sugar));

        let input = Pandoc {
            meta,
            blocks: vec![Block::para(vec![Inline::span(
                (
                    "ref".to_string(),
                    vec!["wiki".to_string()],
                    LinkedHashMap::new(),
                ),
                vec![Inline::str("Rust")],
            )])],
        };

        let (output, warnings) = apply(input, TargetFormat::new("html"), &[]).unwrap();
        assert!(warnings.is_empty());
        match &output.blocks[0] {
            Block::Paragraph(p) => assert!(matches!(p.content[0], Inline::Link(_))),
            other => panic!("Expected the rewritten link, got {other:?}"),
        }
    }
}
