// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics for the Luma front-end.
//!
//! Both lexical problems (reported by the parser when it meets an
//! in-band error token) and syntactic problems use [`Diagnostic`].
//! Every diagnostic is an error: a parse either succeeds cleanly or
//! its tree must not be consumed. `Display` renders the canonical
//! single-line form written to stderr by the driver; the [`miette`]
//! integration adds a labeled span for rich terminal rendering.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;

use super::Span;

/// An error diagnostic with its source location.
///
/// # Examples
///
/// ```
/// use luma_core::source_analysis::{Diagnostic, Span};
///
/// let diag = Diagnostic::error("Expected expression.", 3, "end", Span::new(10, 13));
/// assert_eq!(diag.to_string(), "[line 3] Error at 'end': Expected expression.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("[line {line}] Error at '{found}': {message}")]
#[diagnostic()]
pub struct Diagnostic {
    /// The error message.
    pub message: EcoString,
    /// The 1-based source line of the offending token.
    pub line: u32,
    /// The offending token's text.
    pub found: EcoString,
    /// The source location.
    #[label("here")]
    pub span: Span,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(
        message: impl Into<EcoString>,
        line: u32,
        found: impl Into<EcoString>,
        span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            found: found.into(),
            span,
        }
    }
}
