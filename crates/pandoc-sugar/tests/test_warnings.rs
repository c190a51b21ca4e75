/*
 * test_warnings.rs
 * Copyright (c) 2025 Posit, PBC
 */

use hashlink::LinkedHashMap;
use pandoc_sugar::diagnostics::DiagnosticKind;
use pandoc_sugar::format::TargetFormat;
use pandoc_sugar::pipeline;
use pandoc_sugar_ast::{Block, Inline, Meta, Pandoc};

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
fn test_lone_begin_marker_warns_and_preserves_container() {
    let input = doc(vec![div(
        &["twocol"],
        vec![div(&["column-begin"], vec![]), para("body")],
    )]);

    let (output, diagnostics) =
        pipeline::apply(input.clone(), TargetFormat::new("html"), &[]).unwrap();

    // the container survives untouched, markers included
    assert_eq!(output, input);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Warning);
    assert_eq!(diagnostics[0].filter, "columns");
    assert!(diagnostics[0].message.contains("no matching end"));
}

#[test]
fn test_unresolved_link_token_preserves_span() {
    let input = doc(vec![Block::para(vec![Inline::span(
        (
            "l".to_string(),
            vec!["nope".to_string()],
            LinkedHashMap::new(),
        ),
        vec![Inline::str("text")],
    )])]);

    let (output, diagnostics) =
        pipeline::apply(input.clone(), TargetFormat::new("html"), &[]).unwrap();

    assert_eq!(output, input);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedReference);
    assert_eq!(diagnostics[0].filter, "links");
    assert!(diagnostics[0].message.contains("nope"));
}

#[test]
fn test_warnings_do_not_stop_other_rewrites() {
    let input = doc(vec![
        // malformed: next marker before any begin
        div(
            &["twocol"],
            vec![
                div(&["column-next"], vec![]),
                para("body"),
                div(&["column-end"], vec![]),
            ],
        ),
        div(&["note"], vec![para("still converted")]),
    ]);

    let (output, diagnostics) = pipeline::apply(input, TargetFormat::new("html"), &[]).unwrap();

    assert_eq!(diagnostics.len(), 1);
    match &output.blocks[0] {
        Block::Div(container) => assert_eq!(container.attr.1, vec!["twocol"]),
        other => panic!("Expected the malformed container untouched, got {other:?}"),
    }
    match &output.blocks[1] {
        Block::Div(note) => {
            assert_eq!(note.attr.1, vec!["admonition", "admonition-note"]);
        }
        other => panic!("Expected the converted admonition, got {other:?}"),
    }
}

#[test]
fn test_unparseable_width_warns_but_still_lays_out() {
    let mut attrs = LinkedHashMap::new();
    attrs.insert("width".to_string(), "wide".to_string());
    let begin = Block::div(
        (String::new(), vec!["column-begin".to_string()], attrs),
        vec![],
    );
    let input = doc(vec![div(
        &["twocol"],
        vec![begin, para("body"), div(&["column-end"], vec![])],
    )]);

    let (output, diagnostics) = pipeline::apply(input, TargetFormat::new("html"), &[]).unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("wide"));
    match &output.blocks[0] {
        Block::Div(columns) => {
            assert_eq!(columns.attr.1, vec!["columns"]);
            match &columns.content[0] {
                Block::Div(column) => {
                    assert_eq!(column.attr.2.get("width").map(String::as_str), Some("100%"));
                }
                other => panic!("Expected the lone column, got {other:?}"),
            }
        }
        other => panic!("Expected the columns div, got {other:?}"),
    }
}

#[test]
fn test_multiple_diagnostics_accumulate_in_order() {
    let input = doc(vec![
        div(
            &["twocol"],
            vec![div(&["column-begin"], vec![]), para("body")],
        ),
        Block::para(vec![Inline::span(
            (
                "l".to_string(),
                vec!["missing".to_string()],
                LinkedHashMap::new(),
            ),
            vec![Inline::str("x")],
        )]),
    ]);

    let (_, diagnostics) = pipeline::apply(input, TargetFormat::new("html"), &[]).unwrap();

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].filter, "columns");
    assert_eq!(diagnostics[1].filter, "links");
}
