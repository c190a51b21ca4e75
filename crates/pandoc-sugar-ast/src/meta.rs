/*
 * meta.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::Blocks;
use crate::inline::Inlines;
use crate::stringify::{stringify_blocks, stringify_inlines};
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Document metadata values, mirroring pandoc's `MetaValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    MetaString(String),
    MetaBool(bool),
    MetaInlines(Inlines),
    MetaBlocks(Blocks),
    MetaList(Vec<MetaValue>),
    MetaMap(LinkedHashMap<String, MetaValue>),
}

pub type Meta = LinkedHashMap<String, MetaValue>;

impl Default for MetaValue {
    fn default() -> Self {
        MetaValue::MetaMap(LinkedHashMap::new())
    }
}

impl MetaValue {
    /// Best-effort plain text of a metadata leaf.
    ///
    /// YAML scalars arrive as MetaString or MetaInlines depending on how
    /// the reader parsed them, so both forms must be accepted wherever a
    /// string-valued option is looked up.
    pub fn as_text(&self) -> Option<String> {
        match self {
            MetaValue::MetaString(s) => Some(s.clone()),
            MetaValue::MetaBool(b) => Some(b.to_string()),
            MetaValue::MetaInlines(content) => Some(stringify_inlines(content)),
            MetaValue::MetaBlocks(content) => Some(stringify_blocks(content)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::MetaBool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&LinkedHashMap<String, MetaValue>> {
        match self {
            MetaValue::MetaMap(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MetaValue]> {
        match self {
            MetaValue::MetaList(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::Inline;

    #[test]
    fn test_as_text_accepts_inlines_and_strings() {
        let from_string = MetaValue::MetaString("wiki".to_string());
        let from_inlines =
            MetaValue::MetaInlines(vec![Inline::str("wiki"), Inline::Space, Inline::str("page")]);
        assert_eq!(from_string.as_text().as_deref(), Some("wiki"));
        assert_eq!(from_inlines.as_text().as_deref(), Some("wiki page"));
    }

    #[test]
    fn test_as_text_rejects_containers() {
        let map = MetaValue::default();
        assert_eq!(map.as_text(), None);
    }
}
