/*
 * caption.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::Blocks;
use crate::inline::Inlines;
use serde::{Deserialize, Serialize};

/// A table or figure caption: optional short form plus the caption body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub short: Option<Inlines>,
    pub long: Option<Blocks>,
}
