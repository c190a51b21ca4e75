/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Target output format as passed by pandoc to its filters.
 */

/// The writer name pandoc hands to a JSON filter as its first argument.
///
/// Pandoc's format vocabulary is open-ended, so this wraps the raw string
/// rather than enumerating writers. Filters only ever branch on the LaTeX
/// family; everything else gets the portable rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetFormat(String);

impl TargetFormat {
    pub fn new(name: impl Into<String>) -> Self {
        TargetFormat(name.into())
    }

    /// Get the format name as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this format renders through LaTeX (latex or beamer)
    pub fn is_latex(&self) -> bool {
        matches!(self.0.as_str(), "latex" | "beamer")
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TargetFormat {
    fn from(name: &str) -> Self {
        TargetFormat(name.to_string())
    }
}
