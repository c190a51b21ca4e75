/*
 * json.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Writer for pandoc's JSON interchange format.
//!
//! The inverse of [`crate::readers::json`]: every node kind the reader
//! accepts is written back in the shape pandoc expects, so a document can
//! pass through the filter unchanged apart from the rewrites it asked for.

use pandoc_sugar_ast::attr::Attr;
use pandoc_sugar_ast::block::Block;
use pandoc_sugar_ast::caption::Caption;
use pandoc_sugar_ast::inline::{Citation, CitationMode, Inline, Inlines, MathType, QuoteType};
use pandoc_sugar_ast::list::{ListAttributes, ListNumberDelim, ListNumberStyle};
use pandoc_sugar_ast::meta::{Meta, MetaValue};
use pandoc_sugar_ast::pandoc::Pandoc;
use pandoc_sugar_ast::table::{
    Alignment, Cell, ColSpec, ColWidth, Row, TableBody, TableFoot, TableHead,
};
use serde_json::{Value, json};

fn write_attr(attr: &Attr) -> Value {
    json!([
        attr.0, // id
        attr.1, // classes
        attr.2
            .iter()
            .map(|(k, v)| json!([k, v]))
            .collect::<Vec<_>>() // key-value pairs
    ])
}

fn write_target(target: &(String, String)) -> Value {
    json!([target.0, target.1])
}

fn write_citation_mode(mode: &CitationMode) -> Value {
    match mode {
        CitationMode::NormalCitation => json!({"t": "NormalCitation"}),
        CitationMode::AuthorInText => json!({"t": "AuthorInText"}),
        CitationMode::SuppressAuthor => json!({"t": "SuppressAuthor"}),
    }
}

fn write_citation(citation: &Citation) -> Value {
    json!({
        "citationId": citation.id,
        "citationPrefix": write_inlines(&citation.prefix),
        "citationSuffix": write_inlines(&citation.suffix),
        "citationMode": write_citation_mode(&citation.mode),
        "citationNoteNum": citation.note_num,
        "citationHash": citation.hash
    })
}

fn write_inline(inline: &Inline) -> Value {
    match inline {
        Inline::Str(s) => json!({"t": "Str", "c": s.text}),
        Inline::Emph(e) => json!({"t": "Emph", "c": write_inlines(&e.content)}),
        Inline::Underline(u) => json!({"t": "Underline", "c": write_inlines(&u.content)}),
        Inline::Strong(s) => json!({"t": "Strong", "c": write_inlines(&s.content)}),
        Inline::Strikeout(s) => json!({"t": "Strikeout", "c": write_inlines(&s.content)}),
        Inline::Superscript(s) => json!({"t": "Superscript", "c": write_inlines(&s.content)}),
        Inline::Subscript(s) => json!({"t": "Subscript", "c": write_inlines(&s.content)}),
        Inline::SmallCaps(s) => json!({"t": "SmallCaps", "c": write_inlines(&s.content)}),
        Inline::Quoted(q) => {
            let quote_type = match q.quote_type {
                QuoteType::SingleQuote => json!({"t": "SingleQuote"}),
                QuoteType::DoubleQuote => json!({"t": "DoubleQuote"}),
            };
            json!({"t": "Quoted", "c": [quote_type, write_inlines(&q.content)]})
        }
        Inline::Cite(cite) => json!({
            "t": "Cite",
            "c": [
                cite.citations.iter().map(write_citation).collect::<Vec<_>>(),
                write_inlines(&cite.content)
            ]
        }),
        Inline::Code(c) => json!({"t": "Code", "c": [write_attr(&c.attr), c.text]}),
        Inline::Space => json!({"t": "Space"}),
        Inline::SoftBreak => json!({"t": "SoftBreak"}),
        Inline::LineBreak => json!({"t": "LineBreak"}),
        Inline::Math(m) => {
            let math_type = match m.math_type {
                MathType::InlineMath => json!({"t": "InlineMath"}),
                MathType::DisplayMath => json!({"t": "DisplayMath"}),
            };
            json!({"t": "Math", "c": [math_type, m.text]})
        }
        Inline::RawInline(raw) => json!({"t": "RawInline", "c": [raw.format, raw.text]}),
        Inline::Link(link) => json!({
            "t": "Link",
            "c": [write_attr(&link.attr), write_inlines(&link.content), write_target(&link.target)]
        }),
        Inline::Image(image) => json!({
            "t": "Image",
            "c": [write_attr(&image.attr), write_inlines(&image.content), write_target(&image.target)]
        }),
        Inline::Note(note) => json!({"t": "Note", "c": write_blocks(&note.content)}),
        Inline::Span(span) => json!({
            "t": "Span",
            "c": [write_attr(&span.attr), write_inlines(&span.content)]
        }),
    }
}

fn write_inlines(inlines: &Inlines) -> Value {
    json!(inlines.iter().map(write_inline).collect::<Vec<_>>())
}

fn write_list_attributes(attr: &ListAttributes) -> Value {
    let number_style = match attr.1 {
        ListNumberStyle::Default => json!({"t": "DefaultStyle"}),
        ListNumberStyle::Example => json!({"t": "Example"}),
        ListNumberStyle::Decimal => json!({"t": "Decimal"}),
        ListNumberStyle::LowerRoman => json!({"t": "LowerRoman"}),
        ListNumberStyle::UpperRoman => json!({"t": "UpperRoman"}),
        ListNumberStyle::LowerAlpha => json!({"t": "LowerAlpha"}),
        ListNumberStyle::UpperAlpha => json!({"t": "UpperAlpha"}),
    };
    let number_delim = match attr.2 {
        ListNumberDelim::Default => json!({"t": "DefaultDelim"}),
        ListNumberDelim::Period => json!({"t": "Period"}),
        ListNumberDelim::OneParen => json!({"t": "OneParen"}),
        ListNumberDelim::TwoParens => json!({"t": "TwoParens"}),
    };
    json!([attr.0, number_style, number_delim])
}

fn write_blockss(blockss: &[Vec<Block>]) -> Value {
    json!(
        blockss
            .iter()
            .map(|blocks| blocks.iter().map(write_block).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    )
}

/// An absent long caption is written as an empty block list; pandoc's own
/// writer never emits null there.
fn write_caption(caption: &Caption) -> Value {
    json!([
        caption.short.as_ref().map(write_inlines),
        caption
            .long
            .as_ref()
            .map(|long| write_blocks(long))
            .unwrap_or_else(|| json!([])),
    ])
}

fn write_alignment(alignment: &Alignment) -> Value {
    match alignment {
        Alignment::Left => json!({"t": "AlignLeft"}),
        Alignment::Center => json!({"t": "AlignCenter"}),
        Alignment::Right => json!({"t": "AlignRight"}),
        Alignment::Default => json!({"t": "AlignDefault"}),
    }
}

fn write_colwidth(colwidth: &ColWidth) -> Value {
    match colwidth {
        ColWidth::Default => json!({"t": "ColWidthDefault"}),
        ColWidth::Percentage(p) => json!({"t": "ColWidth", "c": p}),
    }
}

fn write_colspec(colspec: &ColSpec) -> Value {
    json!([write_alignment(&colspec.0), write_colwidth(&colspec.1)])
}

fn write_cell(cell: &Cell) -> Value {
    json!([
        write_attr(&cell.attr),
        write_alignment(&cell.alignment),
        cell.row_span,
        cell.col_span,
        write_blocks(&cell.content)
    ])
}

fn write_row(row: &Row) -> Value {
    json!([
        write_attr(&row.attr),
        row.cells.iter().map(write_cell).collect::<Vec<_>>()
    ])
}

fn write_table_head(head: &TableHead) -> Value {
    json!([
        write_attr(&head.attr),
        head.rows.iter().map(write_row).collect::<Vec<_>>()
    ])
}

fn write_table_body(body: &TableBody) -> Value {
    json!([
        write_attr(&body.attr),
        body.rowhead_columns,
        body.head.iter().map(write_row).collect::<Vec<_>>(),
        body.body.iter().map(write_row).collect::<Vec<_>>()
    ])
}

fn write_table_foot(foot: &TableFoot) -> Value {
    json!([
        write_attr(&foot.attr),
        foot.rows.iter().map(write_row).collect::<Vec<_>>()
    ])
}

fn write_block(block: &Block) -> Value {
    match block {
        Block::Plain(plain) => json!({"t": "Plain", "c": write_inlines(&plain.content)}),
        Block::Paragraph(para) => json!({"t": "Para", "c": write_inlines(&para.content)}),
        Block::LineBlock(lineblock) => json!({
            "t": "LineBlock",
            "c": lineblock.content.iter().map(write_inlines).collect::<Vec<_>>()
        }),
        Block::CodeBlock(codeblock) => json!({
            "t": "CodeBlock",
            "c": [write_attr(&codeblock.attr), codeblock.text]
        }),
        Block::RawBlock(raw) => json!({"t": "RawBlock", "c": [raw.format, raw.text]}),
        Block::BlockQuote(quote) => json!({"t": "BlockQuote", "c": write_blocks(&quote.content)}),
        Block::OrderedList(orderedlist) => json!({
            "t": "OrderedList",
            "c": [
                write_list_attributes(&orderedlist.attr),
                write_blockss(&orderedlist.content),
            ]
        }),
        Block::BulletList(bulletlist) => json!({
            "t": "BulletList",
            "c": write_blockss(&bulletlist.content)
        }),
        Block::DefinitionList(deflist) => json!({
            "t": "DefinitionList",
            "c": deflist.content
                .iter()
                .map(|(term, definitions)| {
                    json!([write_inlines(term), write_blockss(definitions)])
                })
                .collect::<Vec<_>>()
        }),
        Block::Header(header) => json!({
            "t": "Header",
            "c": [header.level, write_attr(&header.attr), write_inlines(&header.content)]
        }),
        Block::HorizontalRule => json!({"t": "HorizontalRule"}),
        Block::Table(table) => json!({
            "t": "Table",
            "c": [
                write_attr(&table.attr),
                write_caption(&table.caption),
                table.colspec.iter().map(write_colspec).collect::<Vec<_>>(),
                write_table_head(&table.head),
                table.bodies.iter().map(write_table_body).collect::<Vec<_>>(),
                write_table_foot(&table.foot)
            ]
        }),
        Block::Figure(figure) => json!({
            "t": "Figure",
            "c": [
                write_attr(&figure.attr),
                write_caption(&figure.caption),
                write_blocks(&figure.content)
            ]
        }),
        Block::Div(div) => json!({
            "t": "Div",
            "c": [write_attr(&div.attr), write_blocks(&div.content)]
        }),
    }
}

fn write_blocks(blocks: &[Block]) -> Value {
    json!(blocks.iter().map(write_block).collect::<Vec<_>>())
}

fn write_meta_value(value: &MetaValue) -> Value {
    match value {
        MetaValue::MetaString(s) => json!({"t": "MetaString", "c": s}),
        MetaValue::MetaBool(b) => json!({"t": "MetaBool", "c": b}),
        MetaValue::MetaInlines(content) => json!({
            "t": "MetaInlines",
            "c": write_inlines(content)
        }),
        MetaValue::MetaBlocks(content) => json!({
            "t": "MetaBlocks",
            "c": write_blocks(content)
        }),
        MetaValue::MetaList(items) => json!({
            "t": "MetaList",
            "c": items.iter().map(write_meta_value).collect::<Vec<_>>()
        }),
        MetaValue::MetaMap(entries) => {
            let map: serde_json::Map<String, Value> = entries
                .iter()
                .map(|(key, value)| (key.clone(), write_meta_value(value)))
                .collect();
            json!({"t": "MetaMap", "c": map})
        }
    }
}

fn write_meta(meta: &Meta) -> Value {
    let map: serde_json::Map<String, Value> = meta
        .iter()
        .map(|(key, value)| (key.clone(), write_meta_value(value)))
        .collect();
    Value::Object(map)
}

pub fn write_pandoc(pandoc: &Pandoc) -> Value {
    json!({
        "pandoc-api-version": [1, 23, 1],
        "meta": write_meta(&pandoc.meta),
        "blocks": write_blocks(&pandoc.blocks),
    })
}

pub fn write<W: std::io::Write>(pandoc: &Pandoc, writer: &mut W) -> serde_json::Result<()> {
    let json = write_pandoc(pandoc);
    serde_json::to_writer(writer, &json)?;
    Ok(())
}
