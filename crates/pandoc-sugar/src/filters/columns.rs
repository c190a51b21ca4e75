/*
 * columns.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Filter that lays out marker-delimited column groups inside a container Div.
 */

//! Column layout filter.
//!
//! Inside a container Div (class `twocol` by default, configurable as
//! `sugar.columns.container`) the children are scanned for empty marker
//! Divs classed `column-begin`, `column-next`, and `column-end`. The
//! children between begin and end are split into groups at each next
//! marker; each group becomes a Div with class `column` and a percentage
//! `width` attribute. Children before begin or after end stay in place,
//! and the container's trigger class is rewritten to `columns`.
//!
//! Widths come from `width` attributes on the begin/next markers, given
//! either as percentages (`30%`) or ratios (`0.3`); a full set is rescaled
//! to sum to one, a partial set leaves the remainder to the unset columns,
//! and no set at all falls back to `sugar.columns.widths` or an equal
//! split. A malformed marker sequence never aborts the render: the filter
//! records a warning and leaves the container untouched.

use pandoc_sugar_ast::Blocks;
use pandoc_sugar_ast::attr::Attr;
use pandoc_sugar_ast::block::{Block, Div};

use crate::config::{ColumnsConfig, Config};
use crate::filter_context::FilterContext;
use crate::walk::{BlockFilter, FilterReturn, TraversalMode};

const RATIO_EPSILON: f64 = 1e-6;

/// Filter that converts a marker-delimited container into column Divs.
pub struct ColumnsFilter {
    config: ColumnsConfig,
}

impl ColumnsFilter {
    pub fn new(config: &Config) -> Self {
        ColumnsFilter {
            config: config.columns.clone(),
        }
    }

    fn build_columns(&self, div: Div, plan: MarkerPlan, ctx: &mut FilterContext) -> Block {
        let Div { attr, content } = div;
        let (id, classes, attrs) = attr;

        let mut pre = Vec::new();
        let mut post = Vec::new();
        let mut groups: Vec<Blocks> = Vec::new();
        let mut markers: Vec<Div> = Vec::new();

        for (index, child) in content.into_iter().enumerate() {
            if index < plan.begin {
                pre.push(child);
            } else if index == plan.begin || plan.nexts.contains(&index) {
                if let Block::Div(marker) = child {
                    markers.push(marker);
                    groups.push(Vec::new());
                }
            } else if index == plan.end {
                // the end marker is consumed
            } else if index > plan.end {
                post.push(child);
            } else if let Some(group) = groups.last_mut() {
                group.push(child);
            }
        }

        let overrides: Vec<Option<String>> = markers
            .iter()
            .map(|marker| marker.attr.2.get("width").cloned())
            .collect();
        let ratios = resolve_ratios(&overrides, &self.config.widths, ctx);

        let columns = markers
            .into_iter()
            .zip(groups)
            .zip(ratios)
            .map(|((marker, group), ratio)| self.column_div(marker, group, ratio));

        let container_classes: Vec<String> = classes
            .into_iter()
            .map(|class| {
                if class == self.config.container {
                    "columns".to_string()
                } else {
                    class
                }
            })
            .collect();

        let mut children = pre;
        children.extend(columns);
        children.extend(post);

        Block::div((id, container_classes, attrs), children)
    }

    /// Turn one column group into a `column` Div. The marker's extra
    /// classes and attributes are forwarded; its id is dropped.
    fn column_div(&self, marker: Div, content: Blocks, ratio: f64) -> Block {
        let (_id, classes, mut attrs) = marker.attr;
        let mut column_classes = vec!["column".to_string()];
        column_classes.extend(
            classes
                .into_iter()
                .filter(|class| !self.is_marker_class(class)),
        );
        attrs.insert("width".to_string(), format_percent(ratio));
        Block::div((String::new(), column_classes, attrs), content)
    }

    fn is_marker_class(&self, class: &str) -> bool {
        class == self.config.begin || class == self.config.next || class == self.config.end
    }
}

impl BlockFilter for ColumnsFilter {
    fn name(&self) -> &'static str {
        "columns"
    }

    fn mode(&self) -> TraversalMode {
        TraversalMode::PostOrder
    }

    fn filter_block(&self, block: Block, ctx: &mut FilterContext) -> FilterReturn<Block> {
        match block {
            Block::Div(div) if has_class(&div.attr, &self.config.container) => {
                match plan_markers(&self.config, &div.content) {
                    Ok(Some(plan)) => {
                        tracing::debug!(
                            columns = plan.nexts.len() + 1,
                            "Laying out column container"
                        );
                        let replacement = self.build_columns(div, plan, ctx);
                        FilterReturn::FilterResult(vec![replacement], false)
                    }
                    Ok(None) => {
                        tracing::debug!("Column container has no begin marker, leaving it alone");
                        FilterReturn::Unchanged(Block::Div(div))
                    }
                    Err(problem) => {
                        ctx.warn(
                            "columns",
                            format!("{problem}, leaving the container unchanged"),
                        );
                        FilterReturn::Unchanged(Block::Div(div))
                    }
                }
            }
            other => FilterReturn::Unchanged(other),
        }
    }
}

fn has_class(attr: &Attr, class: &str) -> bool {
    attr.1.iter().any(|c| c == class)
}

#[derive(Clone, Copy, PartialEq)]
enum Marker {
    Begin,
    Next,
    End,
}

/// Positions of the markers among the container's children.
struct MarkerPlan {
    begin: usize,
    nexts: Vec<usize>,
    end: usize,
}

fn classify_marker(config: &ColumnsConfig, block: &Block) -> Result<Option<Marker>, String> {
    let Block::Div(div) = block else {
        return Ok(None);
    };
    let (_id, classes, _attrs) = &div.attr;
    let mut marker = None;
    for (class, kind) in [
        (&config.begin, Marker::Begin),
        (&config.next, Marker::Next),
        (&config.end, Marker::End),
    ] {
        if classes.iter().any(|c| c == class) {
            if marker.is_some() {
                return Err("Marker div carries more than one marker class".to_string());
            }
            marker = Some(kind);
        }
    }
    if marker.is_some() && !div.content.is_empty() {
        return Err("Column marker div is not empty".to_string());
    }
    Ok(marker)
}

/// Scan the children for a well-formed begin/next/end marker run.
///
/// `Ok(None)` means no markers at all (the container is not claimed);
/// `Err` describes a malformed sequence.
fn plan_markers(config: &ColumnsConfig, children: &[Block]) -> Result<Option<MarkerPlan>, String> {
    let mut begin = None;
    let mut nexts = Vec::new();
    let mut end = None;
    for (index, child) in children.iter().enumerate() {
        let Some(marker) = classify_marker(config, child)? else {
            continue;
        };
        if end.is_some() {
            return Err("Column marker after the end marker".to_string());
        }
        match marker {
            Marker::Begin => {
                if begin.is_some() {
                    return Err("Second begin marker inside the column run".to_string());
                }
                begin = Some(index);
            }
            Marker::Next => {
                if begin.is_none() {
                    return Err("Next-column marker with no begin marker before it".to_string());
                }
                nexts.push(index);
            }
            Marker::End => {
                if begin.is_none() {
                    return Err("End marker with no begin marker before it".to_string());
                }
                end = Some(index);
            }
        }
    }
    match (begin, end) {
        (Some(begin), Some(end)) => Ok(Some(MarkerPlan { begin, nexts, end })),
        (Some(_), None) => Err("Begin marker with no matching end marker".to_string()),
        (None, _) => Ok(None),
    }
}

/// Resolve one width ratio per column from marker overrides, configured
/// defaults, and finally an equal split.
fn resolve_ratios(
    overrides: &[Option<String>],
    defaults: &[String],
    ctx: &mut FilterContext,
) -> Vec<f64> {
    let count = overrides.len();
    let mut ratios: Vec<Option<f64>> = Vec::with_capacity(count);
    for spec in overrides {
        match spec {
            Some(spec) => match parse_ratio(spec) {
                Some(ratio) => ratios.push(Some(ratio)),
                None => {
                    ctx.warn(
                        "columns",
                        format!("Cannot parse column width `{spec}`, treating it as unset"),
                    );
                    ratios.push(None);
                }
            },
            None => ratios.push(None),
        }
    }

    if ratios.iter().all(Option::is_none) && !defaults.is_empty() {
        match parse_defaults(defaults, count) {
            Some(parsed) => ratios = parsed,
            None => {
                ctx.warn(
                    "columns",
                    "Configured default column widths do not fit the column count, using an equal split",
                );
                return equal_split(count);
            }
        }
    }

    let set: Vec<f64> = ratios.iter().flatten().copied().collect();
    let set_sum: f64 = set.iter().sum();
    let unset_count = count - set.len();

    if unset_count == 0 {
        if set_sum <= 0.0 {
            ctx.warn("columns", "Column widths sum to zero, using an equal split");
            return equal_split(count);
        }
        if (set_sum - 1.0).abs() > RATIO_EPSILON {
            tracing::debug!(sum = set_sum, "Rescaling column widths to fill the page");
        }
        return ratios
            .into_iter()
            .flatten()
            .map(|ratio| ratio / set_sum)
            .collect();
    }

    if set.is_empty() {
        return equal_split(count);
    }

    // partial overrides: the unset columns share the remaining width
    if set_sum >= 1.0 - RATIO_EPSILON {
        ctx.warn(
            "columns",
            "Column width overrides leave no room for the remaining columns, using an equal split",
        );
        return equal_split(count);
    }
    let share = (1.0 - set_sum) / unset_count as f64;
    ratios
        .into_iter()
        .map(|ratio| ratio.unwrap_or(share))
        .collect()
}

fn parse_defaults(defaults: &[String], count: usize) -> Option<Vec<Option<f64>>> {
    if defaults.len() != count {
        return None;
    }
    let mut parsed = Vec::with_capacity(count);
    for spec in defaults {
        parsed.push(Some(parse_ratio(spec)?));
    }
    Some(parsed)
}

fn equal_split(count: usize) -> Vec<f64> {
    vec![1.0 / count as f64; count]
}

/// Parse `30%` or `0.3` into a ratio. Negative and non-numeric widths
/// are rejected.
fn parse_ratio(spec: &str) -> Option<f64> {
    let spec = spec.trim();
    let ratio = match spec.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => spec.parse::<f64>().ok()?,
    };
    if ratio.is_finite() && ratio >= 0.0 {
        Some(ratio)
    } else {
        None
    }
}

/// Render a ratio as the percentage string carried on the column Div.
fn format_percent(ratio: f64) -> String {
    let mut text = format!("{:.4}", ratio * 100.0);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text.push('%');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashlink::LinkedHashMap;
    use pandoc_sugar_ast::Inline;

    use crate::format::TargetFormat;

    fn filter() -> ColumnsFilter {
        ColumnsFilter::new(&Config::default())
    }

    fn ctx() -> FilterContext {
        FilterContext::new(TargetFormat::new("beamer"))
    }

    fn marker(class: &str) -> Block {
        Block::div(
            (String::new(), vec![class.to_string()], LinkedHashMap::new()),
            vec![],
        )
    }

    fn marker_with_width(class: &str, width: &str) -> Block {
        let mut attrs = LinkedHashMap::new();
        attrs.insert("width".to_string(), width.to_string());
        Block::div((String::new(), vec![class.to_string()], attrs), vec![])
    }

    fn container(children: Vec<Block>) -> Block {
        Block::div(
            (
                String::new(),
                vec!["twocol".to_string()],
                LinkedHashMap::new(),
            ),
            children,
        )
    }

    fn para(text: &str) -> Block {
        Block::para(vec![Inline::str(text)])
    }

    fn apply(block: Block, ctx: &mut FilterContext) -> Div {
        match filter().filter_block(block, ctx) {
            FilterReturn::FilterResult(mut blocks, recurse) => {
                assert!(!recurse);
                assert_eq!(blocks.len(), 1);
                match blocks.remove(0) {
                    Block::Div(div) => div,
                    _ => panic!("Expected the container div back"),
                }
            }
            FilterReturn::Unchanged(_) => panic!("Expected the filter to claim the container"),
        }
    }

    fn column_width(block: &Block) -> &str {
        match block {
            Block::Div(div) => {
                assert_eq!(div.attr.1[0], "column");
                div.attr.2.get("width").map(String::as_str).unwrap_or("")
            }
            other => panic!("Expected a column div, got {other:?}"),
        }
    }

    #[test]
    fn test_two_columns_equal_split() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                marker("column-begin"),
                para("left"),
                marker("column-next"),
                para("right"),
                marker("column-end"),
            ]),
            &mut ctx,
        );

        assert_eq!(div.attr.1, vec!["columns"]);
        assert_eq!(div.content.len(), 2);
        assert_eq!(column_width(&div.content[0]), "50%");
        assert_eq!(column_width(&div.content[1]), "50%");
        assert!(!ctx.has_diagnostics());
    }

    #[test]
    fn test_width_overrides() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                marker_with_width("column-begin", "30%"),
                para("left"),
                marker_with_width("column-next", "70%"),
                para("right"),
                marker("column-end"),
            ]),
            &mut ctx,
        );

        assert_eq!(column_width(&div.content[0]), "30%");
        assert_eq!(column_width(&div.content[1]), "70%");
    }

    #[test]
    fn test_weights_are_rescaled() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                marker_with_width("column-begin", "1"),
                para("left"),
                marker_with_width("column-next", "3"),
                para("right"),
                marker("column-end"),
            ]),
            &mut ctx,
        );

        assert_eq!(column_width(&div.content[0]), "25%");
        assert_eq!(column_width(&div.content[1]), "75%");
    }

    #[test]
    fn test_partial_override_gets_remainder() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                marker_with_width("column-begin", "0.25"),
                para("left"),
                marker("column-next"),
                para("right"),
                marker("column-end"),
            ]),
            &mut ctx,
        );

        assert_eq!(column_width(&div.content[0]), "25%");
        assert_eq!(column_width(&div.content[1]), "75%");
    }

    #[test]
    fn test_children_outside_markers_stay_in_place() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                para("intro"),
                marker("column-begin"),
                para("body"),
                marker("column-end"),
                para("outro"),
            ]),
            &mut ctx,
        );

        assert_eq!(div.content.len(), 3);
        assert_eq!(div.content[0], para("intro"));
        assert_eq!(column_width(&div.content[1]), "100%");
        assert_eq!(div.content[2], para("outro"));
    }

    #[test]
    fn test_marker_attrs_forwarded_to_column() {
        let mut ctx = ctx();
        let mut attrs = LinkedHashMap::new();
        attrs.insert("align".to_string(), "top".to_string());
        let begin = Block::div(
            (
                String::new(),
                vec!["column-begin".to_string(), "shaded".to_string()],
                attrs,
            ),
            vec![],
        );
        let div = apply(
            container(vec![begin, para("body"), marker("column-end")]),
            &mut ctx,
        );

        match &div.content[0] {
            Block::Div(column) => {
                assert_eq!(column.attr.1, vec!["column", "shaded"]);
                assert_eq!(column.attr.2.get("align").map(String::as_str), Some("top"));
                assert_eq!(column.attr.2.get("width").map(String::as_str), Some("100%"));
            }
            other => panic!("Expected a column div, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_end_marker_warns_and_declines() {
        let mut ctx = ctx();
        let input = container(vec![marker("column-begin"), para("body")]);
        match filter().filter_block(input, &mut ctx) {
            FilterReturn::Unchanged(Block::Div(div)) => {
                assert_eq!(div.attr.1, vec!["twocol"]);
            }
            _ => panic!("Expected the container to be left unchanged"),
        }
        assert!(ctx.has_diagnostics());
        assert!(ctx.diagnostics()[0].message.contains("no matching end"));
    }

    #[test]
    fn test_stray_next_marker_warns_and_declines() {
        let mut ctx = ctx();
        let input = container(vec![marker("column-next"), para("body"), marker("column-end")]);
        match filter().filter_block(input, &mut ctx) {
            FilterReturn::Unchanged(_) => {}
            FilterReturn::FilterResult(..) => panic!("Expected the filter to decline"),
        }
        assert!(ctx.has_diagnostics());
    }

    #[test]
    fn test_marker_with_content_warns_and_declines() {
        let mut ctx = ctx();
        let bad_marker = Block::div(
            (
                String::new(),
                vec!["column-begin".to_string()],
                LinkedHashMap::new(),
            ),
            vec![para("not empty")],
        );
        let input = container(vec![bad_marker, para("body"), marker("column-end")]);
        match filter().filter_block(input, &mut ctx) {
            FilterReturn::Unchanged(_) => {}
            FilterReturn::FilterResult(..) => panic!("Expected the filter to decline"),
        }
        assert!(ctx.has_diagnostics());
    }

    #[test]
    fn test_container_without_markers_is_not_claimed() {
        let mut ctx = ctx();
        let input = container(vec![para("just text")]);
        match filter().filter_block(input, &mut ctx) {
            FilterReturn::Unchanged(Block::Div(div)) => {
                assert_eq!(div.attr.1, vec!["twocol"]);
            }
            _ => panic!("Expected the container back unchanged"),
        }
        assert!(!ctx.has_diagnostics());
    }

    #[test]
    fn test_default_widths_from_config() {
        let config = Config {
            columns: ColumnsConfig {
                widths: vec!["30%".to_string(), "70%".to_string()],
                ..ColumnsConfig::default()
            },
            ..Config::default()
        };
        let filter = ColumnsFilter::new(&config);
        let mut ctx = ctx();
        let input = container(vec![
            marker("column-begin"),
            para("left"),
            marker("column-next"),
            para("right"),
            marker("column-end"),
        ]);
        match filter.filter_block(input, &mut ctx) {
            FilterReturn::FilterResult(blocks, _) => match &blocks[0] {
                Block::Div(div) => {
                    assert_eq!(column_width(&div.content[0]), "30%");
                    assert_eq!(column_width(&div.content[1]), "70%");
                }
                other => panic!("Expected the container div, got {other:?}"),
            },
            FilterReturn::Unchanged(_) => panic!("Expected the filter to claim the container"),
        }
    }

    #[test]
    fn test_overrides_filling_the_page_fall_back_to_equal() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                marker_with_width("column-begin", "100%"),
                para("left"),
                marker("column-next"),
                para("right"),
                marker("column-end"),
            ]),
            &mut ctx,
        );

        assert_eq!(column_width(&div.content[0]), "50%");
        assert_eq!(column_width(&div.content[1]), "50%");
        assert!(ctx.has_diagnostics());
    }

    #[test]
    fn test_unparseable_width_warns() {
        let mut ctx = ctx();
        let div = apply(
            container(vec![
                marker_with_width("column-begin", "wide"),
                para("left"),
                marker("column-end"),
            ]),
            &mut ctx,
        );

        assert_eq!(column_width(&div.content[0]), "100%");
        assert!(ctx.has_diagnostics());
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("30%"), Some(0.3));
        assert_eq!(parse_ratio("0.3"), Some(0.3));
        assert_eq!(parse_ratio(" 45 % "), Some(0.45));
        assert_eq!(parse_ratio("-1"), None);
        assert_eq!(parse_ratio("wide"), None);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50%");
        assert_eq!(format_percent(0.25), "25%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3333%");
        assert_eq!(format_percent(1.0), "100%");
    }
}
