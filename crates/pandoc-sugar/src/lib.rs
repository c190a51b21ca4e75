/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filter_context;
pub mod filters;
pub mod format;
pub mod pipeline;
pub mod readers;
pub mod walk;
pub mod writers;
