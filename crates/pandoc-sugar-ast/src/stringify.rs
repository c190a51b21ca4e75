/*
 * stringify.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::Block;
use crate::inline::Inline;

/// Convert a single inline element to plain text
pub fn stringify_inline(inline: &Inline) -> String {
    match inline {
        Inline::Str(s) => s.text.clone(),
        Inline::Space => " ".to_string(),
        Inline::SoftBreak => "\n".to_string(),
        Inline::LineBreak => "\n".to_string(),
        Inline::Emph(e) => stringify_inlines(&e.content),
        Inline::Strong(s) => stringify_inlines(&s.content),
        Inline::Underline(u) => stringify_inlines(&u.content),
        Inline::Strikeout(s) => stringify_inlines(&s.content),
        Inline::Superscript(s) => stringify_inlines(&s.content),
        Inline::Subscript(s) => stringify_inlines(&s.content),
        Inline::SmallCaps(s) => stringify_inlines(&s.content),
        Inline::Quoted(q) => {
            let content = stringify_inlines(&q.content);
            format!("\"{}\"", content)
        }
        Inline::Code(c) => c.text.clone(),
        Inline::Math(m) => m.text.clone(),
        Inline::RawInline(_) => String::new(), // Raw content is dropped
        Inline::Link(l) => stringify_inlines(&l.content),
        Inline::Image(i) => stringify_inlines(&i.content),
        Inline::Span(s) => stringify_inlines(&s.content),
        Inline::Note(n) => stringify_blocks(&n.content),
        Inline::Cite(c) => stringify_inlines(&c.content),
    }
}

/// Convert a list of inline elements to plain text
pub fn stringify_inlines(inlines: &[Inline]) -> String {
    inlines.iter().map(stringify_inline).collect()
}

/// Convert a single block element to plain text
pub fn stringify_block(block: &Block) -> String {
    match block {
        Block::Paragraph(p) => stringify_inlines(&p.content),
        Block::Plain(p) => stringify_inlines(&p.content),
        Block::Header(h) => stringify_inlines(&h.content),
        Block::CodeBlock(c) => c.text.clone(),
        Block::RawBlock(_) => String::new(), // Raw content is dropped
        Block::BlockQuote(b) => stringify_blocks(&b.content),
        Block::BulletList(l) => l
            .content
            .iter()
            .map(|items| stringify_blocks(items))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::OrderedList(l) => l
            .content
            .iter()
            .map(|items| stringify_blocks(items))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::DefinitionList(d) => d
            .content
            .iter()
            .map(|(term, defs)| {
                let term_str = stringify_inlines(term);
                let defs_str = defs
                    .iter()
                    .map(|def| stringify_blocks(def))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{}: {}", term_str, defs_str)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Div(d) => stringify_blocks(&d.content),
        Block::LineBlock(l) => l
            .content
            .iter()
            .map(|line| stringify_inlines(line))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Table(t) => {
            let mut result = String::new();
            if let Some(ref long) = t.caption.long {
                result.push_str(&stringify_blocks(long));
            }
            result
        }
        Block::Figure(f) => {
            let mut result = stringify_blocks(&f.content);
            if let Some(ref long) = f.caption.long {
                result.push_str(&stringify_blocks(long));
            }
            result
        }
        Block::HorizontalRule => String::new(),
    }
}

/// Convert a list of block elements to plain text, one block per line
pub fn stringify_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(stringify_block)
        .collect::<Vec<_>>()
        .join("\n")
}
