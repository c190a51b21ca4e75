/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pandoc AST type definitions for pandoc-sugar.
 *
 * This crate provides pure data type definitions for the Pandoc AST,
 * mirroring the types from pandoc-types in Haskell. It has minimal
 * dependencies (serde, hashlink) and can be used by any crate that
 * needs to work with Pandoc AST structures.
 */

pub mod attr;
pub mod block;
pub mod caption;
pub mod inline;
pub mod list;
pub mod meta;
pub mod pandoc;
pub mod stringify;
pub mod table;

// Re-export commonly used types at the crate root
pub use attr::{Attr, empty_attr};
pub use block::{
    Block, BlockQuote, Blocks, BulletList, CodeBlock, DefinitionList, Div, Figure, Header,
    LineBlock, OrderedList, Paragraph, Plain, RawBlock,
};
pub use caption::Caption;
pub use inline::{
    Citation, CitationMode, Cite, Code, Emph, Image, Inline, Inlines, Link, Math, MathType, Note,
    QuoteType, Quoted, RawInline, SmallCaps, Span, Str, Strikeout, Strong, Subscript, Superscript,
    Target, Underline,
};
pub use list::{ListAttributes, ListNumberDelim, ListNumberStyle};
pub use meta::{Meta, MetaValue};
pub use pandoc::Pandoc;
pub use stringify::{stringify_block, stringify_blocks, stringify_inline, stringify_inlines};
pub use table::{Alignment, Cell, ColSpec, ColWidth, Row, Table, TableBody, TableFoot, TableHead};
