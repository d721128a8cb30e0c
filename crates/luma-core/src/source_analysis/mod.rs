// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for Luma source code.
//!
//! This module contains the lexer, the parser, and their shared types.
//!
//! # Lexical Analysis
//!
//! [`tokenize`] converts source text into a stream of [`Token`]s ending
//! in exactly one EOF token. Each token carries its interned text, its
//! source line, and its byte [`Span`]. Invalid input becomes
//! [`TokenKind::Error`] tokens rather than stopping the lexer.
//!
//! ```
//! use luma_core::intern::StringPool;
//! use luma_core::source_analysis::{Lexer, tokenize};
//!
//! let mut pool = StringPool::new();
//! let tokens: Vec<_> = Lexer::new("x + 1", &mut pool).collect();
//! assert_eq!(tokens.len(), 3); // x, +, 1 (EOF excluded from iterator)
//! ```
//!
//! # Parsing
//!
//! [`parse`] converts tokens into a [`ParseTree`](crate::ast::ParseTree).
//! Expression precedence uses Pratt parsing; statements and types are
//! recursive descent. The parser always produces a tree; check
//! `success` (or the returned [`Diagnostic`]s) before consuming it.
//!
//! # Error Handling
//!
//! The parser reports through panic-mode recovery: the first error in a
//! statement is recorded, subsequent ones are suppressed until the
//! parser resynchronizes at a statement boundary. Rendering a
//! [`Diagnostic`] with `Display` yields the canonical
//! `[line L] Error at 'T': MSG` form.

mod error;
mod lexer;
mod parser;
mod span;
mod token;


pub use error::Diagnostic;
pub use lexer::{Lexer, tokenize};
pub use parser::parse;
pub use span::Span;
pub use token::{Token, TokenKind};
