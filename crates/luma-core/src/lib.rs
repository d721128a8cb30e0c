// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Luma compiler front-end.
//!
//! Luma is a small statically-typed, Lua-derived language with `struct`,
//! `trait`, and `impl` declarations. This crate contains the front half
//! of its compiler:
//!
//! - Lexical analysis (tokenization with in-band error recovery)
//! - Parsing (Pratt expression parser + recursive-descent statements)
//! - AST definitions backed by a typed node arena
//! - Debug dumps and an unparser for tooling and round-trip tests
//!
//! Semantic analysis, type checking, and code generation live elsewhere;
//! their only contract with this crate is: source text in, a
//! [`ParseTree`](ast::ParseTree) plus diagnostics out.
//!
//! # Example
//!
//! ```
//! use luma_core::intern::StringPool;
//! use luma_core::source_analysis::{parse, tokenize};
//!
//! let mut pool = StringPool::new();
//! let tokens = tokenize("local x: number = 42;", &mut pool);
//! let (tree, diagnostics) = parse(tokens, &pool);
//!
//! assert!(tree.success);
//! assert!(diagnostics.is_empty());
//! ```

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod dump;
pub mod intern;
pub mod source_analysis;
pub mod unparse;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{
        AstArena, Binding, Expr, ExprId, FuncSignature, GenericParam, Param, ParseTree, Stmt,
        StmtId, Type, TypeId,
    };
    pub use crate::intern::{StringPool, Symbol};
    pub use crate::source_analysis::{Diagnostic, Span, Token, TokenKind, parse, tokenize};
}
