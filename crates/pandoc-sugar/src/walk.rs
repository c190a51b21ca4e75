/*
 * walk.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Depth-first document traversal with claim-based rewriting.
//!
//! Each node is offered to the enabled filters in declared priority order;
//! the first filter that claims a node consumes it exclusively. A filter
//! sees the node either before its children are visited (pre-order, where a
//! claim suppresses descent) or after they have been rewritten (post-order,
//! for constructs that aggregate already-transformed children). Replacement
//! subtrees are validated and then spliced; with the recurse flag unset they
//! are never re-walked in the same pass.

use crate::error::{Result, SugarError};
use crate::filter_context::FilterContext;
use pandoc_sugar_ast::{
    Block, BlockQuote, Blocks, BulletList, Caption, Cell, Citation, Cite, DefinitionList, Div,
    Emph, Figure, Header, Image, Inline, Inlines, LineBlock, Link, Note, OrderedList, Pandoc,
    Paragraph, Plain, Quoted, Row, SmallCaps, Span, Strikeout, Strong, Subscript, Superscript,
    Table, TableBody, TableFoot, TableHead, Underline,
};

// filters are destructive and take ownership of the input

pub enum FilterReturn<T> {
    /// The filter declined; the node is handed back for further offers.
    Unchanged(T),
    /// The filter claimed the node. The replacement is spliced into the
    /// parent; the flag asks the walker to traverse the replacement again
    /// (claiming filters that fully consume their trigger pass `false`).
    FilterResult(Vec<T>, bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// Offered the original node, children still untouched; a claim keeps
    /// the walker out of the claimed subtree.
    PreOrder,
    /// Offered the node after its children have been rewritten.
    PostOrder,
}

pub trait BlockFilter: Send + Sync {
    fn name(&self) -> &'static str;
    fn mode(&self) -> TraversalMode;
    fn filter_block(&self, block: Block, ctx: &mut FilterContext) -> FilterReturn<Block>;
}

pub trait InlineFilter: Send + Sync {
    fn name(&self) -> &'static str;
    fn mode(&self) -> TraversalMode;
    fn filter_inline(&self, inline: Inline, ctx: &mut FilterContext) -> FilterReturn<Inline>;
}

/// The ordered set of filters for one run.
///
/// Order is priority: earlier filters get first claim on every node.
#[derive(Default)]
pub struct FilterSet {
    blocks: Vec<Box<dyn BlockFilter>>,
    inlines: Vec<Box<dyn InlineFilter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_block(&mut self, filter: Box<dyn BlockFilter>) {
        self.blocks.push(filter);
    }

    pub fn push_inline(&mut self, filter: Box<dyn InlineFilter>) {
        self.inlines.push(filter);
    }

    pub fn len(&self) -> usize {
        self.blocks.len() + self.inlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.inlines.is_empty()
    }

    /// Filter names in priority order, block filters first.
    pub fn names(&self) -> Vec<&'static str> {
        self.blocks
            .iter()
            .map(|f| f.name())
            .chain(self.inlines.iter().map(|f| f.name()))
            .collect()
    }
}

/// Rewrite a whole document. Metadata is configuration input, not filter
/// territory, so only the block sequence is traversed.
pub fn traverse(doc: Pandoc, filters: &FilterSet, ctx: &mut FilterContext) -> Result<Pandoc> {
    let blocks = traverse_blocks(doc.blocks, filters, ctx)?;
    Ok(Pandoc {
        meta: doc.meta,
        blocks,
    })
}

pub fn traverse_blocks(
    blocks: Blocks,
    filters: &FilterSet,
    ctx: &mut FilterContext,
) -> Result<Blocks> {
    let mut result = Blocks::with_capacity(blocks.len());
    for block in blocks {
        result.extend(traverse_block(block, filters, ctx)?);
    }
    Ok(result)
}

pub fn traverse_inlines(
    inlines: Inlines,
    filters: &FilterSet,
    ctx: &mut FilterContext,
) -> Result<Inlines> {
    let mut result = Inlines::with_capacity(inlines.len());
    for inline in inlines {
        result.extend(traverse_inline(inline, filters, ctx)?);
    }
    Ok(result)
}

fn traverse_block(block: Block, filters: &FilterSet, ctx: &mut FilterContext) -> Result<Blocks> {
    let mut block = block;
    // A validated claim preserves its node's delimiter balance, so the
    // snapshot taken before descent still holds for the post-order offers.
    let prior_balance = block_raw_balance(&block);
    for filter in &filters.blocks {
        if filter.mode() != TraversalMode::PreOrder {
            continue;
        }
        match filter.filter_block(block, ctx) {
            FilterReturn::Unchanged(declined) => block = declined,
            FilterReturn::FilterResult(replacement, recurse) => {
                tracing::debug!(filter = filter.name(), "Claimed block");
                validate_block_replacement(filter.name(), prior_balance, &replacement)?;
                if recurse {
                    return traverse_blocks(replacement, filters, ctx);
                }
                return Ok(replacement);
            }
        }
    }

    let mut block = traverse_block_structure(block, filters, ctx)?;
    for filter in &filters.blocks {
        if filter.mode() != TraversalMode::PostOrder {
            continue;
        }
        match filter.filter_block(block, ctx) {
            FilterReturn::Unchanged(declined) => block = declined,
            FilterReturn::FilterResult(replacement, recurse) => {
                tracing::debug!(filter = filter.name(), "Claimed block");
                validate_block_replacement(filter.name(), prior_balance, &replacement)?;
                if recurse {
                    return traverse_blocks(replacement, filters, ctx);
                }
                return Ok(replacement);
            }
        }
    }
    Ok(vec![block])
}

fn traverse_inline(
    inline: Inline,
    filters: &FilterSet,
    ctx: &mut FilterContext,
) -> Result<Inlines> {
    let mut inline = inline;
    for filter in &filters.inlines {
        if filter.mode() != TraversalMode::PreOrder {
            continue;
        }
        match filter.filter_inline(inline, ctx) {
            FilterReturn::Unchanged(declined) => inline = declined,
            FilterReturn::FilterResult(replacement, recurse) => {
                tracing::debug!(filter = filter.name(), "Claimed inline");
                if recurse {
                    return traverse_inlines(replacement, filters, ctx);
                }
                return Ok(replacement);
            }
        }
    }

    let mut inline = traverse_inline_structure(inline, filters, ctx)?;
    for filter in &filters.inlines {
        if filter.mode() != TraversalMode::PostOrder {
            continue;
        }
        match filter.filter_inline(inline, ctx) {
            FilterReturn::Unchanged(declined) => inline = declined,
            FilterReturn::FilterResult(replacement, recurse) => {
                tracing::debug!(filter = filter.name(), "Claimed inline");
                if recurse {
                    return traverse_inlines(replacement, filters, ctx);
                }
                return Ok(replacement);
            }
        }
    }
    Ok(vec![inline])
}

fn traverse_block_structure(
    block: Block,
    filters: &FilterSet,
    ctx: &mut FilterContext,
) -> Result<Block> {
    Ok(match block {
        Block::Plain(p) => Block::Plain(Plain {
            content: traverse_inlines(p.content, filters, ctx)?,
        }),
        Block::Paragraph(p) => Block::Paragraph(Paragraph {
            content: traverse_inlines(p.content, filters, ctx)?,
        }),
        Block::LineBlock(l) => {
            let mut content = Vec::with_capacity(l.content.len());
            for line in l.content {
                content.push(traverse_inlines(line, filters, ctx)?);
            }
            Block::LineBlock(LineBlock { content })
        }
        Block::CodeBlock(c) => Block::CodeBlock(c),
        Block::RawBlock(r) => Block::RawBlock(r),
        Block::BlockQuote(b) => Block::BlockQuote(BlockQuote {
            content: traverse_blocks(b.content, filters, ctx)?,
        }),
        Block::OrderedList(l) => {
            let mut content = Vec::with_capacity(l.content.len());
            for item in l.content {
                content.push(traverse_blocks(item, filters, ctx)?);
            }
            Block::OrderedList(OrderedList {
                attr: l.attr,
                content,
            })
        }
        Block::BulletList(l) => {
            let mut content = Vec::with_capacity(l.content.len());
            for item in l.content {
                content.push(traverse_blocks(item, filters, ctx)?);
            }
            Block::BulletList(BulletList { content })
        }
        Block::DefinitionList(d) => {
            let mut content = Vec::with_capacity(d.content.len());
            for (term, defs) in d.content {
                let term = traverse_inlines(term, filters, ctx)?;
                let mut new_defs = Vec::with_capacity(defs.len());
                for def in defs {
                    new_defs.push(traverse_blocks(def, filters, ctx)?);
                }
                content.push((term, new_defs));
            }
            Block::DefinitionList(DefinitionList { content })
        }
        Block::Header(h) => Block::Header(Header {
            content: traverse_inlines(h.content, filters, ctx)?,
            ..h
        }),
        Block::HorizontalRule => Block::HorizontalRule,
        Block::Table(t) => Block::Table(traverse_table(t, filters, ctx)?),
        Block::Figure(f) => Block::Figure(Figure {
            attr: f.attr,
            caption: traverse_caption(f.caption, filters, ctx)?,
            content: traverse_blocks(f.content, filters, ctx)?,
        }),
        Block::Div(d) => Block::Div(Div {
            attr: d.attr,
            content: traverse_blocks(d.content, filters, ctx)?,
        }),
    })
}

fn traverse_inline_structure(
    inline: Inline,
    filters: &FilterSet,
    ctx: &mut FilterContext,
) -> Result<Inline> {
    Ok(match inline {
        Inline::Str(s) => Inline::Str(s),
        Inline::Emph(e) => Inline::Emph(Emph {
            content: traverse_inlines(e.content, filters, ctx)?,
        }),
        Inline::Underline(u) => Inline::Underline(Underline {
            content: traverse_inlines(u.content, filters, ctx)?,
        }),
        Inline::Strong(s) => Inline::Strong(Strong {
            content: traverse_inlines(s.content, filters, ctx)?,
        }),
        Inline::Strikeout(s) => Inline::Strikeout(Strikeout {
            content: traverse_inlines(s.content, filters, ctx)?,
        }),
        Inline::Superscript(s) => Inline::Superscript(Superscript {
            content: traverse_inlines(s.content, filters, ctx)?,
        }),
        Inline::Subscript(s) => Inline::Subscript(Subscript {
            content: traverse_inlines(s.content, filters, ctx)?,
        }),
        Inline::SmallCaps(s) => Inline::SmallCaps(SmallCaps {
            content: traverse_inlines(s.content, filters, ctx)?,
        }),
        Inline::Quoted(q) => Inline::Quoted(Quoted {
            content: traverse_inlines(q.content, filters, ctx)?,
            ..q
        }),
        Inline::Cite(c) => {
            let mut citations = Vec::with_capacity(c.citations.len());
            for citation in c.citations {
                citations.push(Citation {
                    prefix: traverse_inlines(citation.prefix, filters, ctx)?,
                    suffix: traverse_inlines(citation.suffix, filters, ctx)?,
                    ..citation
                });
            }
            Inline::Cite(Cite {
                citations,
                content: traverse_inlines(c.content, filters, ctx)?,
            })
        }
        Inline::Code(c) => Inline::Code(c),
        Inline::Space => Inline::Space,
        Inline::SoftBreak => Inline::SoftBreak,
        Inline::LineBreak => Inline::LineBreak,
        Inline::Math(m) => Inline::Math(m),
        Inline::RawInline(r) => Inline::RawInline(r),
        Inline::Link(l) => Inline::Link(Link {
            content: traverse_inlines(l.content, filters, ctx)?,
            ..l
        }),
        Inline::Image(i) => Inline::Image(Image {
            content: traverse_inlines(i.content, filters, ctx)?,
            ..i
        }),
        Inline::Note(n) => Inline::Note(Note {
            content: traverse_blocks(n.content, filters, ctx)?,
        }),
        Inline::Span(s) => Inline::Span(Span {
            content: traverse_inlines(s.content, filters, ctx)?,
            ..s
        }),
    })
}

fn traverse_caption(
    caption: Caption,
    filters: &FilterSet,
    ctx: &mut FilterContext,
) -> Result<Caption> {
    let short = match caption.short {
        Some(short) => Some(traverse_inlines(short, filters, ctx)?),
        None => None,
    };
    let long = match caption.long {
        Some(long) => Some(traverse_blocks(long, filters, ctx)?),
        None => None,
    };
    Ok(Caption { short, long })
}

fn traverse_row(row: Row, filters: &FilterSet, ctx: &mut FilterContext) -> Result<Row> {
    let mut cells = Vec::with_capacity(row.cells.len());
    for cell in row.cells {
        cells.push(Cell {
            content: traverse_blocks(cell.content, filters, ctx)?,
            ..cell
        });
    }
    Ok(Row {
        attr: row.attr,
        cells,
    })
}

fn traverse_rows(rows: Vec<Row>, filters: &FilterSet, ctx: &mut FilterContext) -> Result<Vec<Row>> {
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        result.push(traverse_row(row, filters, ctx)?);
    }
    Ok(result)
}

fn traverse_table(table: Table, filters: &FilterSet, ctx: &mut FilterContext) -> Result<Table> {
    let caption = traverse_caption(table.caption, filters, ctx)?;
    let head = TableHead {
        attr: table.head.attr,
        rows: traverse_rows(table.head.rows, filters, ctx)?,
    };
    let mut bodies = Vec::with_capacity(table.bodies.len());
    for body in table.bodies {
        bodies.push(TableBody {
            attr: body.attr,
            rowhead_columns: body.rowhead_columns,
            head: traverse_rows(body.head, filters, ctx)?,
            body: traverse_rows(body.body, filters, ctx)?,
        });
    }
    let foot = TableFoot {
        attr: table.foot.attr,
        rows: traverse_rows(table.foot.rows, filters, ctx)?,
    };
    Ok(Table {
        attr: table.attr,
        caption,
        colspec: table.colspec,
        head,
        bodies,
        foot,
    })
}

/// Reject ill-formed replacement subtrees before they are spliced.
///
/// A builder may wrap content that already carries raw TeX delimiters, so
/// the replacement is judged against the balance of the block it replaced:
/// the delimiters the filter itself added must pair up, while unpaired
/// delimiters the author wrote are carried through untouched. A `columns`
/// container with no `column` children is rejected outright. Pass-through
/// input is never validated; only what a claiming filter hands back.
fn validate_block_replacement(
    filter: &str,
    prior_balance: i64,
    replacement: &[Block],
) -> Result<()> {
    if raw_delimiter_balance(replacement) != prior_balance {
        return Err(SugarError::structural(format!(
            "Filter `{filter}` produced an unbalanced raw `\\begin`/`\\end` run"
        )));
    }
    check_columns_children(filter, replacement)
}

/// Net count of raw TeX `\begin`/`\end` delimiters under these blocks.
fn raw_delimiter_balance(blocks: &[Block]) -> i64 {
    blocks.iter().map(block_raw_balance).sum()
}

fn block_raw_balance(block: &Block) -> i64 {
    match block {
        Block::RawBlock(raw) if is_tex_format(&raw.format) => {
            raw.text.matches("\\begin{").count() as i64
                - raw.text.matches("\\end{").count() as i64
        }
        Block::Div(d) => raw_delimiter_balance(&d.content),
        Block::BlockQuote(b) => raw_delimiter_balance(&b.content),
        Block::Figure(f) => caption_raw_balance(&f.caption) + raw_delimiter_balance(&f.content),
        Block::OrderedList(l) => l.content.iter().map(|item| raw_delimiter_balance(item)).sum(),
        Block::BulletList(l) => l.content.iter().map(|item| raw_delimiter_balance(item)).sum(),
        Block::DefinitionList(l) => l
            .content
            .iter()
            .flat_map(|(_, definitions)| definitions.iter())
            .map(|definition| raw_delimiter_balance(definition))
            .sum(),
        Block::Table(t) => table_raw_balance(t),
        _ => 0,
    }
}

fn table_raw_balance(table: &Table) -> i64 {
    let mut balance = caption_raw_balance(&table.caption);
    balance += rows_raw_balance(&table.head.rows);
    for body in &table.bodies {
        balance += rows_raw_balance(&body.head);
        balance += rows_raw_balance(&body.body);
    }
    balance += rows_raw_balance(&table.foot.rows);
    balance
}

fn rows_raw_balance(rows: &[Row]) -> i64 {
    rows.iter()
        .flat_map(|row| row.cells.iter())
        .map(|cell| raw_delimiter_balance(&cell.content))
        .sum()
}

fn caption_raw_balance(caption: &Caption) -> i64 {
    match &caption.long {
        Some(long) => raw_delimiter_balance(long),
        None => 0,
    }
}

fn is_tex_format(format: &str) -> bool {
    format == "tex" || format == "latex"
}

fn check_columns_children(filter: &str, blocks: &[Block]) -> Result<()> {
    for block in blocks {
        if let Block::Div(d) = block {
            if d.attr.1.iter().any(|c| c == "columns") {
                let has_column = d.content.iter().any(|child| {
                    matches!(child, Block::Div(inner) if inner.attr.1.iter().any(|c| c == "column"))
                });
                if !has_column {
                    return Err(SugarError::structural(format!(
                        "Filter `{filter}` produced a `columns` container without `column` children"
                    )));
                }
            }
            check_columns_children(filter, &d.content)?;
        }
    }
    Ok(())
}
