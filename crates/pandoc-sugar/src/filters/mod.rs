/*
 * filters/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The built-in document filters.
 */

//! The built-in document filters.
//!
//! - [`AdmonitionFilter`] - Converts admonition Divs to styled output
//! - [`ColumnsFilter`] - Lays out marker-delimited column containers
//! - [`EnvironmentFilter`] - Wraps classed Divs in LaTeX environments
//! - [`LinkFilter`] - Expands marker Spans into resolved hyperlinks
//!
//! All of them implement [`BlockFilter`](crate::walk::BlockFilter) or
//! [`InlineFilter`](crate::walk::InlineFilter) and are assembled into a
//! [`FilterSet`](crate::walk::FilterSet) by [`build_filter_set`]. The
//! offer order within the set follows the selection order, so putting
//! `admonitions` before `environments` is what keeps admonition keywords
//! from being claimed as plain environments.

mod admonition;
mod columns;
mod environment;
mod links;

pub use admonition::AdmonitionFilter;
pub use columns::ColumnsFilter;
pub use environment::EnvironmentFilter;
pub use links::LinkFilter;

use crate::config::Config;
use crate::error::{Result, SugarError};
use crate::walk::FilterSet;

/// Names accepted by [`build_filter_set`], in default execution order.
pub const DEFAULT_FILTERS: &[&str] = &["admonitions", "columns", "environments", "links"];

/// Assemble a [`FilterSet`] from filter names.
///
/// Unknown names are an error; an empty selection yields an empty set,
/// which the walker treats as a plain pass-through.
pub fn build_filter_set(names: &[String], config: &Config) -> Result<FilterSet> {
    let mut set = FilterSet::new();
    for name in names {
        match name.as_str() {
            "admonitions" => set.push_block(Box::new(AdmonitionFilter::new(config))),
            "columns" => set.push_block(Box::new(ColumnsFilter::new(config))),
            "environments" => set.push_block(Box::new(EnvironmentFilter::new(config))),
            "links" => set.push_inline(Box::new(LinkFilter::new(config))),
            other => return Err(SugarError::UnknownFilter(other.to_string())),
        }
    }
    Ok(set)
}

/// The full built-in pipeline.
pub fn default_filter_set(config: &Config) -> FilterSet {
    let mut set = FilterSet::new();
    set.push_block(Box::new(AdmonitionFilter::new(config)));
    set.push_block(Box::new(ColumnsFilter::new(config)));
    set.push_block(Box::new(EnvironmentFilter::new(config)));
    set.push_inline(Box::new(LinkFilter::new(config)));
    set
}
