/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Filter configuration resolved from document metadata.
//!
//! All options live under the top-level `sugar` metadata key. Resolution
//! happens once per document, before traversal starts; the resulting
//! [`Config`] is read-only for the rest of the run. Malformed values are
//! logged and fall back to the built-in defaults, so a typo in the
//! frontmatter never aborts a render.

use hashlink::LinkedHashMap;
use pandoc_sugar_ast::{Meta, MetaValue};

/// Admonition keywords recognized when the document does not override them.
pub const DEFAULT_ADMONITIONS: &[&str] = &["note", "warning", "tip", "caution"];

/// Span identifier that marks a reference-link candidate.
pub const DEFAULT_LINK_MARKER: &str = "l";

/// One entry of the link resolution table.
///
/// A bare URL string in the metadata becomes an entry with only `url` set.
/// A `{}` placeholder in `url` is substituted with the link text at rewrite
/// time; a URL without a placeholder is used as-is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkEntry {
    pub url: String,
    /// Target title carried onto the emitted hyperlink
    pub title: Option<String>,
    /// Percent-encode the substituted text
    pub encode: bool,
    /// Literal text prepended to the visible link text
    pub before: Option<String>,
    /// Literal text appended to the visible link text
    pub after: Option<String>,
}

impl LinkEntry {
    pub fn url(url: impl Into<String>) -> Self {
        LinkEntry {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinksConfig {
    /// Span identifier that triggers the rewrite
    pub marker: String,
    /// Fallback URL template with a `{}` placeholder for the token
    pub template: Option<String>,
    /// Token -> entry resolution table
    pub table: LinkedHashMap<String, LinkEntry>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        LinksConfig {
            marker: DEFAULT_LINK_MARKER.to_string(),
            template: None,
            table: default_links_table(),
        }
    }
}

/// Built-in resolution table, matching the shorthands the filter has always
/// shipped with. Document metadata entries are merged over these.
fn default_links_table() -> LinkedHashMap<String, LinkEntry> {
    let mut table = LinkedHashMap::new();
    table.insert(
        "wiki".to_string(),
        LinkEntry {
            url: "https://en.wikipedia.org/wiki/{}".to_string(),
            encode: true,
            ..Default::default()
        },
    );
    table.insert(
        "pubmed".to_string(),
        LinkEntry {
            url: "https://pubmed.ncbi.nlm.nih.gov/{}".to_string(),
            before: Some("pubmed:".to_string()),
            ..Default::default()
        },
    );
    table.insert(
        "doi".to_string(),
        LinkEntry {
            url: "https://doi.org/{}".to_string(),
            before: Some("DOI:".to_string()),
            ..Default::default()
        },
    );
    table.insert(
        "github".to_string(),
        LinkEntry::url("https://github.com/{}"),
    );
    table.insert(
        "youtube".to_string(),
        LinkEntry::url("https://www.youtube.com/{}"),
    );
    table
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnsConfig {
    /// Class of the container div the column markers live in
    pub container: String,
    /// Marker class opening the first column
    pub begin: String,
    /// Marker class closing the current column and opening the next
    pub next: String,
    /// Marker class closing the last column
    pub end: String,
    /// Default width ratios, used when no marker carries an override.
    /// Kept as the raw strings from the metadata; the columns filter owns
    /// ratio parsing and normalization.
    pub widths: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        ColumnsConfig {
            container: "twocol".to_string(),
            begin: "column-begin".to_string(),
            next: "column-next".to_string(),
            end: "column-end".to_string(),
            widths: Vec::new(),
        }
    }
}

/// Resolved filter configuration for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Admonition keyword vocabulary
    pub admonitions: Vec<String>,
    pub links: LinksConfig,
    pub columns: ColumnsConfig,
    /// Div class -> LaTeX environment rename table (identity when absent)
    pub environments: LinkedHashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            admonitions: DEFAULT_ADMONITIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            links: LinksConfig::default(),
            columns: ColumnsConfig::default(),
            environments: LinkedHashMap::new(),
        }
    }
}

impl Config {
    /// Resolve the configuration from document metadata.
    ///
    /// Reads the `sugar` key. Anything missing keeps its default; anything
    /// malformed is logged at warn level and skipped.
    pub fn from_meta(meta: &Meta) -> Config {
        let mut config = Config::default();
        let Some(sugar) = meta.get("sugar") else {
            return config;
        };
        let Some(sugar) = sugar.as_map() else {
            tracing::warn!("Metadata key `sugar` is not a map, ignoring");
            return config;
        };

        if let Some(value) = sugar.get("admonitions") {
            match read_string_list(value) {
                Some(keywords) => config.admonitions = keywords,
                None => tracing::warn!("`sugar.admonitions` is not a list of strings, ignoring"),
            }
        }
        if let Some(value) = sugar.get("links") {
            read_links(value, &mut config.links);
        }
        if let Some(value) = sugar.get("columns") {
            read_columns(value, &mut config.columns);
        }
        if let Some(value) = sugar.get("environments") {
            match value.as_map() {
                Some(map) => {
                    for (class, env) in map.iter() {
                        match env.as_text() {
                            Some(env) => {
                                config.environments.insert(class.clone(), env);
                            }
                            None => tracing::warn!(
                                class = class.as_str(),
                                "`sugar.environments` value is not a string, ignoring"
                            ),
                        }
                    }
                }
                None => tracing::warn!("`sugar.environments` is not a map, ignoring"),
            }
        }
        config
    }
}

fn read_string_list(value: &MetaValue) -> Option<Vec<String>> {
    let items = value.as_list()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(item.as_text()?);
    }
    Some(out)
}

fn read_links(value: &MetaValue, links: &mut LinksConfig) {
    let Some(map) = value.as_map() else {
        tracing::warn!("`sugar.links` is not a map, ignoring");
        return;
    };
    if let Some(marker) = map.get("marker") {
        match marker.as_text() {
            Some(marker) => links.marker = marker,
            None => tracing::warn!("`sugar.links.marker` is not a string, ignoring"),
        }
    }
    if let Some(template) = map.get("template") {
        match template.as_text() {
            Some(template) => links.template = Some(template),
            None => tracing::warn!("`sugar.links.template` is not a string, ignoring"),
        }
    }
    if let Some(table) = map.get("table") {
        let Some(table) = table.as_map() else {
            tracing::warn!("`sugar.links.table` is not a map, ignoring");
            return;
        };
        for (token, entry) in table.iter() {
            match read_link_entry(entry) {
                Some(entry) => {
                    links.table.insert(token.clone(), entry);
                }
                None => tracing::warn!(
                    token = token.as_str(),
                    "`sugar.links.table` entry is neither a URL string nor a map with `url`, ignoring"
                ),
            }
        }
    }
}

fn read_link_entry(value: &MetaValue) -> Option<LinkEntry> {
    if let Some(url) = value.as_text() {
        return Some(LinkEntry::url(url));
    }
    let map = value.as_map()?;
    let url = map.get("url")?.as_text()?;
    let mut entry = LinkEntry::url(url);
    if let Some(title) = map.get("title") {
        entry.title = title.as_text();
    }
    if let Some(encode) = map.get("encode") {
        entry.encode = encode.as_bool().unwrap_or(false);
    }
    if let Some(before) = map.get("before") {
        entry.before = before.as_text();
    }
    if let Some(after) = map.get("after") {
        entry.after = after.as_text();
    }
    Some(entry)
}

fn read_columns(value: &MetaValue, columns: &mut ColumnsConfig) {
    let Some(map) = value.as_map() else {
        tracing::warn!("`sugar.columns` is not a map, ignoring");
        return;
    };
    read_class(map, "container", &mut columns.container);
    read_class(map, "begin", &mut columns.begin);
    read_class(map, "next", &mut columns.next);
    read_class(map, "end", &mut columns.end);
    if let Some(widths) = map.get("widths") {
        match read_string_list(widths) {
            Some(widths) => columns.widths = widths,
            None => tracing::warn!("`sugar.columns.widths` is not a list of strings, ignoring"),
        }
    }
}

fn read_class(map: &LinkedHashMap<String, MetaValue>, key: &str, slot: &mut String) {
    if let Some(value) = map.get(key) {
        match value.as_text() {
            Some(value) => *slot = value,
            None => tracing::warn!(key, "`sugar.columns` class name is not a string, ignoring"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandoc_sugar_ast::Inline;

    fn meta_str(text: &str) -> MetaValue {
        MetaValue::MetaString(text.to_string())
    }

    fn meta_map(entries: Vec<(&str, MetaValue)>) -> MetaValue {
        let mut map = LinkedHashMap::new();
        for (k, v) in entries {
            map.insert(k.to_string(), v);
        }
        MetaValue::MetaMap(map)
    }

    fn sugar_meta(value: MetaValue) -> Meta {
        let mut meta = Meta::new();
        meta.insert("sugar".to_string(), value);
        meta
    }

    #[test]
    fn test_defaults_without_sugar_key() {
        let config = Config::from_meta(&Meta::new());
        assert_eq!(config.admonitions, DEFAULT_ADMONITIONS);
        assert_eq!(config.links.marker, "l");
        assert_eq!(config.columns.container, "twocol");
        assert!(config.links.table.contains_key("wiki"));
        assert!(config.environments.is_empty());
    }

    #[test]
    fn test_admonition_vocabulary_override() {
        let meta = sugar_meta(meta_map(vec![(
            "admonitions",
            MetaValue::MetaList(vec![
                MetaValue::MetaInlines(vec![Inline::str("hint")]),
                meta_str("gotcha"),
            ]),
        )]));
        let config = Config::from_meta(&meta);
        assert_eq!(config.admonitions, vec!["hint", "gotcha"]);
    }

    #[test]
    fn test_link_table_merges_over_defaults() {
        let meta = sugar_meta(meta_map(vec![(
            "links",
            meta_map(vec![
                ("marker", meta_str("ref")),
                (
                    "table",
                    meta_map(vec![
                        ("ref1", meta_str("https://example.org")),
                        (
                            "other",
                            meta_map(vec![
                                ("url", meta_str("https://foo.com/{}")),
                                ("encode", MetaValue::MetaBool(true)),
                                ("before", meta_str("SOMETEXT:")),
                            ]),
                        ),
                    ]),
                ),
            ]),
        )]));
        let config = Config::from_meta(&meta);
        assert_eq!(config.links.marker, "ref");
        // defaults survive the merge
        assert!(config.links.table.contains_key("wiki"));
        assert_eq!(
            config.links.table.get("ref1"),
            Some(&LinkEntry::url("https://example.org"))
        );
        let other = config.links.table.get("other").unwrap();
        assert!(other.encode);
        assert_eq!(other.before.as_deref(), Some("SOMETEXT:"));
        assert_eq!(other.after, None);
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let meta = sugar_meta(meta_map(vec![(
            "links",
            meta_map(vec![(
                "table",
                meta_map(vec![(
                    "bad",
                    // a map without `url` is not a valid entry
                    meta_map(vec![("encode", MetaValue::MetaBool(true))]),
                )]),
            )]),
        )]));
        let config = Config::from_meta(&meta);
        assert!(!config.links.table.contains_key("bad"));
    }

    #[test]
    fn test_columns_classes_and_widths() {
        let meta = sugar_meta(meta_map(vec![(
            "columns",
            meta_map(vec![
                ("container", meta_str("split")),
                (
                    "widths",
                    MetaValue::MetaList(vec![meta_str("30%"), meta_str("70%")]),
                ),
            ]),
        )]));
        let config = Config::from_meta(&meta);
        assert_eq!(config.columns.container, "split");
        assert_eq!(config.columns.begin, "column-begin");
        assert_eq!(config.columns.widths, vec!["30%", "70%"]);
    }

    #[test]
    fn test_environment_rename_table() {
        let meta = sugar_meta(meta_map(vec![(
            "environments",
            meta_map(vec![("proof", meta_str("proofEnv"))]),
        )]));
        let config = Config::from_meta(&meta);
        assert_eq!(
            config.environments.get("proof").map(String::as_str),
            Some("proofEnv")
        );
    }
}
