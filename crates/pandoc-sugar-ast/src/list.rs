/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListNumberStyle {
    Default,
    Example,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListNumberDelim {
    Default,
    Period,
    OneParen,
    TwoParens,
}

/// (start number, numbering style, delimiter style)
pub type ListAttributes = (usize, ListNumberStyle, ListNumberDelim);
