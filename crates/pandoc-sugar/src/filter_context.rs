/*
 * filter_context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Context for filter execution, enabling diagnostics and format gating.

use crate::diagnostics::Diagnostic;
use crate::format::TargetFormat;

/// Context threaded through filter traversal.
///
/// Carries the target output format and accumulates the diagnostics that
/// filters emit along the way. Warnings never abort the run.
pub struct FilterContext {
    pub format: TargetFormat,
    diagnostics: Vec<Diagnostic>,
}

impl FilterContext {
    /// Create a new empty filter context for the given target format
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            diagnostics: Vec::new(),
        }
    }

    /// Add a warning
    pub fn warn(&mut self, filter: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(filter, message));
    }

    /// Add an unresolved-reference warning
    pub fn unresolved_reference(&mut self, filter: &str, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::unresolved_reference(filter, message));
    }

    /// Check if any diagnostics were collected
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Get reference to diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume context and return diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new(TargetFormat::default())
    }
}
