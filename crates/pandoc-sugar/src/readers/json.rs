/*
 * json.rs
 * Copyright (c) 2025 Posit, PBC
 */

use hashlink::LinkedHashMap;
use pandoc_sugar_ast::attr::Attr;
use pandoc_sugar_ast::block::{
    Block, BlockQuote, Blocks, BulletList, CodeBlock, DefinitionList, Div, Figure, Header,
    LineBlock, OrderedList, Paragraph, Plain, RawBlock,
};
use pandoc_sugar_ast::caption::Caption;
use pandoc_sugar_ast::inline::{
    Citation, CitationMode, Cite, Code, Emph, Image, Inline, Inlines, Link, Math, MathType, Note,
    QuoteType, Quoted, RawInline, SmallCaps, Span, Str, Strikeout, Strong, Subscript, Superscript,
    Target, Underline,
};
use pandoc_sugar_ast::list::{ListAttributes, ListNumberDelim, ListNumberStyle};
use pandoc_sugar_ast::meta::{Meta, MetaValue};
use pandoc_sugar_ast::pandoc::Pandoc;
use pandoc_sugar_ast::table::{
    Alignment, Cell, ColSpec, ColWidth, Row, Table, TableBody, TableFoot, TableHead,
};
use serde_json::Value;

#[derive(Debug)]
pub enum JsonReadError {
    InvalidJson(serde_json::Error),
    MissingField(String),
    InvalidType(String),
    UnsupportedVariant(String),
}

impl std::fmt::Display for JsonReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonReadError::InvalidJson(e) => write!(f, "Invalid JSON: {e}"),
            JsonReadError::MissingField(field) => write!(f, "Missing required field: {field}"),
            JsonReadError::InvalidType(msg) => write!(f, "Invalid type: {msg}"),
            JsonReadError::UnsupportedVariant(variant) => {
                write!(f, "Unsupported variant: {variant}")
            }
        }
    }
}

impl std::error::Error for JsonReadError {}

type Result<T> = std::result::Result<T, JsonReadError>;

/// Read a document from pandoc's JSON interchange format.
pub fn read<R: std::io::Read>(reader: &mut R) -> Result<Pandoc> {
    let mut buffer = String::new();
    reader
        .read_to_string(&mut buffer)
        .map_err(|e| JsonReadError::InvalidJson(serde_json::Error::io(e)))?;
    let json: Value = serde_json::from_str(&buffer).map_err(JsonReadError::InvalidJson)?;
    read_pandoc(&json)
}

fn read_pandoc(value: &Value) -> Result<Pandoc> {
    let obj = node(value, "Pandoc")?;

    // the api version is re-emitted on write, not validated here

    let meta = read_meta(
        obj.get("meta")
            .ok_or_else(|| JsonReadError::MissingField("meta".to_string()))?,
    )?;
    let blocks = read_blocks(
        obj.get("blocks")
            .ok_or_else(|| JsonReadError::MissingField("blocks".to_string()))?,
    )?;

    Ok(Pandoc { meta, blocks })
}

fn node<'a>(value: &'a Value, what: &str) -> Result<&'a serde_json::Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| JsonReadError::InvalidType(format!("Expected object for {what}")))
}

fn tag<'a>(obj: &'a serde_json::Map<String, Value>) -> Result<&'a str> {
    obj.get("t")
        .and_then(|v| v.as_str())
        .ok_or_else(|| JsonReadError::MissingField("t".to_string()))
}

fn content_field<'a>(obj: &'a serde_json::Map<String, Value>, t: &str) -> Result<&'a Value> {
    obj.get("c")
        .ok_or_else(|| JsonReadError::MissingField(format!("c in {t}")))
}

fn string_field(value: &Value, what: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| JsonReadError::InvalidType(format!("{what} must be a string")))
}

fn usize_field(value: &Value, what: &str) -> Result<usize> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| JsonReadError::InvalidType(format!("{what} must be a number")))
}

fn array_field<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| JsonReadError::InvalidType(format!("Expected array for {what}")))
}

fn fixed_array<'a>(value: &'a Value, len: usize, what: &str) -> Result<&'a [Value]> {
    let arr = array_field(value, what)?;
    if arr.len() != len {
        return Err(JsonReadError::InvalidType(format!(
            "{what} array must have {len} elements"
        )));
    }
    Ok(arr)
}

fn read_attr(value: &Value) -> Result<Attr> {
    let arr = fixed_array(value, 3, "Attr")?;
    let id = string_field(&arr[0], "Attr id")?;
    let classes = array_field(&arr[1], "Attr classes")?
        .iter()
        .map(|class| string_field(class, "Attr class"))
        .collect::<Result<Vec<_>>>()?;
    let mut attrs = LinkedHashMap::new();
    for pair in array_field(&arr[2], "Attr key-values")? {
        let pair = fixed_array(pair, 2, "Attr key-value pair")?;
        attrs.insert(
            string_field(&pair[0], "Attr key")?,
            string_field(&pair[1], "Attr value")?,
        );
    }
    Ok((id, classes, attrs))
}

fn read_target(value: &Value) -> Result<Target> {
    let arr = fixed_array(value, 2, "Target")?;
    Ok((
        string_field(&arr[0], "Target url")?,
        string_field(&arr[1], "Target title")?,
    ))
}

fn read_quote_type(value: &Value) -> Result<QuoteType> {
    match tag(node(value, "QuoteType")?)? {
        "SingleQuote" => Ok(QuoteType::SingleQuote),
        "DoubleQuote" => Ok(QuoteType::DoubleQuote),
        other => Err(JsonReadError::UnsupportedVariant(format!(
            "QuoteType: {other}"
        ))),
    }
}

fn read_math_type(value: &Value) -> Result<MathType> {
    match tag(node(value, "MathType")?)? {
        "DisplayMath" => Ok(MathType::DisplayMath),
        "InlineMath" => Ok(MathType::InlineMath),
        other => Err(JsonReadError::UnsupportedVariant(format!(
            "MathType: {other}"
        ))),
    }
}

fn read_citation_mode(value: &Value) -> Result<CitationMode> {
    match tag(node(value, "CitationMode")?)? {
        "AuthorInText" => Ok(CitationMode::AuthorInText),
        "SuppressAuthor" => Ok(CitationMode::SuppressAuthor),
        "NormalCitation" => Ok(CitationMode::NormalCitation),
        other => Err(JsonReadError::UnsupportedVariant(format!(
            "CitationMode: {other}"
        ))),
    }
}

fn read_citation(value: &Value) -> Result<Citation> {
    let obj = node(value, "Citation")?;
    let field = |name: &str| {
        obj.get(name)
            .ok_or_else(|| JsonReadError::MissingField(format!("{name} in Citation")))
    };
    Ok(Citation {
        id: string_field(field("citationId")?, "citationId")?,
        prefix: read_inlines(field("citationPrefix")?)?,
        suffix: read_inlines(field("citationSuffix")?)?,
        mode: read_citation_mode(field("citationMode")?)?,
        note_num: usize_field(field("citationNoteNum")?, "citationNoteNum")?,
        hash: usize_field(field("citationHash")?, "citationHash")?,
    })
}

fn read_inlines(value: &Value) -> Result<Inlines> {
    array_field(value, "Inlines")?.iter().map(read_inline).collect()
}

fn read_inline(value: &Value) -> Result<Inline> {
    let obj = node(value, "Inline")?;
    let t = tag(obj)?;

    match t {
        "Str" => Ok(Inline::Str(Str {
            text: string_field(content_field(obj, t)?, "Str content")?,
        })),
        "Emph" => Ok(Inline::Emph(Emph {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Underline" => Ok(Inline::Underline(Underline {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Strong" => Ok(Inline::Strong(Strong {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Strikeout" => Ok(Inline::Strikeout(Strikeout {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Superscript" => Ok(Inline::Superscript(Superscript {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Subscript" => Ok(Inline::Subscript(Subscript {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "SmallCaps" => Ok(Inline::SmallCaps(SmallCaps {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Quoted" => {
            let c = fixed_array(content_field(obj, t)?, 2, "Quoted content")?;
            Ok(Inline::Quoted(Quoted {
                quote_type: read_quote_type(&c[0])?,
                content: read_inlines(&c[1])?,
            }))
        }
        "Cite" => {
            let c = fixed_array(content_field(obj, t)?, 2, "Cite content")?;
            let citations = array_field(&c[0], "Cite citations")?
                .iter()
                .map(read_citation)
                .collect::<Result<Vec<_>>>()?;
            Ok(Inline::Cite(Cite {
                citations,
                content: read_inlines(&c[1])?,
            }))
        }
        "Code" => {
            let c = fixed_array(content_field(obj, t)?, 2, "Code content")?;
            Ok(Inline::Code(Code {
                attr: read_attr(&c[0])?,
                text: string_field(&c[1], "Code text")?,
            }))
        }
        "Space" => Ok(Inline::Space),
        "SoftBreak" => Ok(Inline::SoftBreak),
        "LineBreak" => Ok(Inline::LineBreak),
        "Math" => {
            let c = fixed_array(content_field(obj, t)?, 2, "Math content")?;
            Ok(Inline::Math(Math {
                math_type: read_math_type(&c[0])?,
                text: string_field(&c[1], "Math text")?,
            }))
        }
        "RawInline" => {
            let c = fixed_array(content_field(obj, t)?, 2, "RawInline content")?;
            Ok(Inline::RawInline(RawInline {
                format: string_field(&c[0], "RawInline format")?,
                text: string_field(&c[1], "RawInline text")?,
            }))
        }
        "Link" => {
            let c = fixed_array(content_field(obj, t)?, 3, "Link content")?;
            Ok(Inline::Link(Link {
                attr: read_attr(&c[0])?,
                content: read_inlines(&c[1])?,
                target: read_target(&c[2])?,
            }))
        }
        "Image" => {
            let c = fixed_array(content_field(obj, t)?, 3, "Image content")?;
            Ok(Inline::Image(Image {
                attr: read_attr(&c[0])?,
                content: read_inlines(&c[1])?,
                target: read_target(&c[2])?,
            }))
        }
        "Note" => Ok(Inline::Note(Note {
            content: read_blocks(content_field(obj, t)?)?,
        })),
        "Span" => {
            let c = fixed_array(content_field(obj, t)?, 2, "Span content")?;
            Ok(Inline::Span(Span {
                attr: read_attr(&c[0])?,
                content: read_inlines(&c[1])?,
            }))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!("Inline: {t}"))),
    }
}

fn read_blocks(value: &Value) -> Result<Blocks> {
    array_field(value, "Blocks")?.iter().map(read_block).collect()
}

fn read_blockss(value: &Value) -> Result<Vec<Blocks>> {
    array_field(value, "list items")?
        .iter()
        .map(read_blocks)
        .collect()
}

fn read_list_attributes(value: &Value) -> Result<ListAttributes> {
    let arr = fixed_array(value, 3, "ListAttributes")?;
    let start = usize_field(&arr[0], "ListAttributes start")?;
    let style = match tag(node(&arr[1], "ListNumberStyle")?)? {
        "DefaultStyle" => ListNumberStyle::Default,
        "Example" => ListNumberStyle::Example,
        "Decimal" => ListNumberStyle::Decimal,
        "LowerRoman" => ListNumberStyle::LowerRoman,
        "UpperRoman" => ListNumberStyle::UpperRoman,
        "LowerAlpha" => ListNumberStyle::LowerAlpha,
        "UpperAlpha" => ListNumberStyle::UpperAlpha,
        other => {
            return Err(JsonReadError::UnsupportedVariant(format!(
                "ListNumberStyle: {other}"
            )));
        }
    };
    let delim = match tag(node(&arr[2], "ListNumberDelim")?)? {
        "DefaultDelim" => ListNumberDelim::Default,
        "Period" => ListNumberDelim::Period,
        "OneParen" => ListNumberDelim::OneParen,
        "TwoParens" => ListNumberDelim::TwoParens,
        other => {
            return Err(JsonReadError::UnsupportedVariant(format!(
                "ListNumberDelim: {other}"
            )));
        }
    };
    Ok((start, style, delim))
}

fn read_caption(value: &Value) -> Result<Caption> {
    let arr = fixed_array(value, 2, "Caption")?;
    let short = if arr[0].is_null() {
        None
    } else {
        Some(read_inlines(&arr[0])?)
    };
    let long = if arr[1].is_null() {
        None
    } else {
        Some(read_blocks(&arr[1])?)
    };
    Ok(Caption { short, long })
}

fn read_alignment(value: &Value) -> Result<Alignment> {
    match tag(node(value, "Alignment")?)? {
        "AlignLeft" => Ok(Alignment::Left),
        "AlignCenter" => Ok(Alignment::Center),
        "AlignRight" => Ok(Alignment::Right),
        "AlignDefault" => Ok(Alignment::Default),
        other => Err(JsonReadError::UnsupportedVariant(format!(
            "Alignment: {other}"
        ))),
    }
}

fn read_colwidth(value: &Value) -> Result<ColWidth> {
    let obj = node(value, "ColWidth")?;
    match tag(obj)? {
        "ColWidthDefault" => Ok(ColWidth::Default),
        "ColWidth" => {
            let c = content_field(obj, "ColWidth")?;
            let percentage = c.as_f64().ok_or_else(|| {
                JsonReadError::InvalidType("ColWidth must be a number".to_string())
            })?;
            Ok(ColWidth::Percentage(percentage))
        }
        other => Err(JsonReadError::UnsupportedVariant(format!(
            "ColWidth: {other}"
        ))),
    }
}

fn read_colspec(value: &Value) -> Result<ColSpec> {
    let arr = fixed_array(value, 2, "ColSpec")?;
    Ok((read_alignment(&arr[0])?, read_colwidth(&arr[1])?))
}

fn read_cell(value: &Value) -> Result<Cell> {
    let arr = fixed_array(value, 5, "Cell")?;
    Ok(Cell {
        attr: read_attr(&arr[0])?,
        alignment: read_alignment(&arr[1])?,
        row_span: usize_field(&arr[2], "Cell row_span")?,
        col_span: usize_field(&arr[3], "Cell col_span")?,
        content: read_blocks(&arr[4])?,
    })
}

fn read_row(value: &Value) -> Result<Row> {
    let arr = fixed_array(value, 2, "Row")?;
    let cells = array_field(&arr[1], "Row cells")?
        .iter()
        .map(read_cell)
        .collect::<Result<Vec<_>>>()?;
    Ok(Row {
        attr: read_attr(&arr[0])?,
        cells,
    })
}

fn read_rows(value: &Value, what: &str) -> Result<Vec<Row>> {
    array_field(value, what)?.iter().map(read_row).collect()
}

fn read_table_head(value: &Value) -> Result<TableHead> {
    let arr = fixed_array(value, 2, "TableHead")?;
    Ok(TableHead {
        attr: read_attr(&arr[0])?,
        rows: read_rows(&arr[1], "TableHead rows")?,
    })
}

fn read_table_body(value: &Value) -> Result<TableBody> {
    let arr = fixed_array(value, 4, "TableBody")?;
    Ok(TableBody {
        attr: read_attr(&arr[0])?,
        rowhead_columns: usize_field(&arr[1], "TableBody rowhead_columns")?,
        head: read_rows(&arr[2], "TableBody head")?,
        body: read_rows(&arr[3], "TableBody body")?,
    })
}

fn read_table_foot(value: &Value) -> Result<TableFoot> {
    let arr = fixed_array(value, 2, "TableFoot")?;
    Ok(TableFoot {
        attr: read_attr(&arr[0])?,
        rows: read_rows(&arr[1], "TableFoot rows")?,
    })
}

fn read_block(value: &Value) -> Result<Block> {
    let obj = node(value, "Block")?;
    let t = tag(obj)?;

    match t {
        "Plain" => Ok(Block::Plain(Plain {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "Para" => Ok(Block::Paragraph(Paragraph {
            content: read_inlines(content_field(obj, t)?)?,
        })),
        "LineBlock" => {
            let lines = array_field(content_field(obj, t)?, "LineBlock content")?
                .iter()
                .map(read_inlines)
                .collect::<Result<Vec<_>>>()?;
            Ok(Block::LineBlock(LineBlock { content: lines }))
        }
        "CodeBlock" => {
            let c = fixed_array(content_field(obj, t)?, 2, "CodeBlock content")?;
            Ok(Block::CodeBlock(CodeBlock {
                attr: read_attr(&c[0])?,
                text: string_field(&c[1], "CodeBlock text")?,
            }))
        }
        "RawBlock" => {
            let c = fixed_array(content_field(obj, t)?, 2, "RawBlock content")?;
            Ok(Block::RawBlock(RawBlock {
                format: string_field(&c[0], "RawBlock format")?,
                text: string_field(&c[1], "RawBlock text")?,
            }))
        }
        "BlockQuote" => Ok(Block::BlockQuote(BlockQuote {
            content: read_blocks(content_field(obj, t)?)?,
        })),
        "OrderedList" => {
            let c = fixed_array(content_field(obj, t)?, 2, "OrderedList content")?;
            Ok(Block::OrderedList(OrderedList {
                attr: read_list_attributes(&c[0])?,
                content: read_blockss(&c[1])?,
            }))
        }
        "BulletList" => Ok(Block::BulletList(BulletList {
            content: read_blockss(content_field(obj, t)?)?,
        })),
        "DefinitionList" => {
            let items = array_field(content_field(obj, t)?, "DefinitionList content")?;
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                let item = fixed_array(item, 2, "DefinitionList item")?;
                let term = read_inlines(&item[0])?;
                let definitions = read_blockss(&item[1])?;
                entries.push((term, definitions));
            }
            Ok(Block::DefinitionList(DefinitionList { content: entries }))
        }
        "Header" => {
            let c = fixed_array(content_field(obj, t)?, 3, "Header content")?;
            Ok(Block::Header(Header {
                level: usize_field(&c[0], "Header level")?,
                attr: read_attr(&c[1])?,
                content: read_inlines(&c[2])?,
            }))
        }
        "HorizontalRule" => Ok(Block::HorizontalRule),
        "Table" => {
            let c = fixed_array(content_field(obj, t)?, 6, "Table content")?;
            let colspec = array_field(&c[2], "Table colspecs")?
                .iter()
                .map(read_colspec)
                .collect::<Result<Vec<_>>>()?;
            let bodies = array_field(&c[4], "Table bodies")?
                .iter()
                .map(read_table_body)
                .collect::<Result<Vec<_>>>()?;
            Ok(Block::Table(Table {
                attr: read_attr(&c[0])?,
                caption: read_caption(&c[1])?,
                colspec,
                head: read_table_head(&c[3])?,
                bodies,
                foot: read_table_foot(&c[5])?,
            }))
        }
        "Figure" => {
            let c = fixed_array(content_field(obj, t)?, 3, "Figure content")?;
            Ok(Block::Figure(Figure {
                attr: read_attr(&c[0])?,
                caption: read_caption(&c[1])?,
                content: read_blocks(&c[2])?,
            }))
        }
        "Div" => {
            let c = fixed_array(content_field(obj, t)?, 2, "Div content")?;
            Ok(Block::Div(Div {
                attr: read_attr(&c[0])?,
                content: read_blocks(&c[1])?,
            }))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!("Block: {t}"))),
    }
}

fn read_meta(value: &Value) -> Result<Meta> {
    let obj = node(value, "Meta")?;
    let mut meta = LinkedHashMap::new();
    for (key, val) in obj {
        meta.insert(key.clone(), read_meta_value(val)?);
    }
    Ok(meta)
}

fn read_meta_value(value: &Value) -> Result<MetaValue> {
    let obj = node(value, "MetaValue")?;
    let t = tag(obj)?;

    match t {
        "MetaString" => Ok(MetaValue::MetaString(string_field(
            content_field(obj, t)?,
            "MetaString content",
        )?)),
        "MetaBool" => {
            let c = content_field(obj, t)?;
            let value = c.as_bool().ok_or_else(|| {
                JsonReadError::InvalidType("MetaBool content must be a boolean".to_string())
            })?;
            Ok(MetaValue::MetaBool(value))
        }
        "MetaInlines" => Ok(MetaValue::MetaInlines(read_inlines(content_field(
            obj, t,
        )?)?)),
        "MetaBlocks" => Ok(MetaValue::MetaBlocks(read_blocks(content_field(obj, t)?)?)),
        "MetaList" => {
            let items = array_field(content_field(obj, t)?, "MetaList content")?;
            Ok(MetaValue::MetaList(
                items
                    .iter()
                    .map(read_meta_value)
                    .collect::<Result<Vec<_>>>()?,
            ))
        }
        "MetaMap" => {
            let entries = node(content_field(obj, t)?, "MetaMap content")?;
            let mut map = LinkedHashMap::new();
            for (key, val) in entries {
                map.insert(key.clone(), read_meta_value(val)?);
            }
            Ok(MetaValue::MetaMap(map))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!("MetaValue: {t}"))),
    }
}
