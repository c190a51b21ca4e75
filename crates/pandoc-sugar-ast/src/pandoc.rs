/*
 * pandoc.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::Blocks;
use crate::meta::Meta;
use serde::{Deserialize, Serialize};

/*
 * A data structure that mimics Pandoc's `data Pandoc` type: document
 * metadata plus the top-level block sequence.
 */

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pandoc {
    pub meta: Meta,
    pub blocks: Blocks,
}
