/*
 * diagnostics.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Warning diagnostics collected during filter execution.
//!
//! Filters never abort the run: anything short of a malformed document is
//! reported as a diagnostic and the offending node is left unchanged.

use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A warning that doesn't prevent completion but indicates a problem
    Warning,
    /// A reference lookup that found no table entry and no template
    UnresolvedReference,
}

/// A diagnostic emitted by a filter while rewriting the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the filter that emitted this diagnostic
    pub filter: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(filter: &str, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            filter: filter.to_string(),
            message: message.into(),
        }
    }

    pub fn unresolved_reference(filter: &str, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvedReference,
            filter: filter.to_string(),
            message: message.into(),
        }
    }

    /// Render as a single stderr line
    pub fn to_text(&self) -> String {
        format!("[{}] {}", self.filter, self.message)
    }

    /// Render as a JSON object for machine consumers
    pub fn to_json(&self) -> serde_json::Value {
        let kind = match self.kind {
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
        };
        serde_json::json!({
            "kind": kind,
            "filter": self.filter,
            "message": self.message,
        })
    }
}
