// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type annotations and function signatures.
//!
//! ```text
//! type      := '[' type ']'                          -- array
//!            | 'function' funcsig                    -- function type
//!            | 'nil'
//!            | IDENT [ '<' type (',' type)* '>' ]    -- primitive or user type
//!
//! funcsig   := generics? '(' (param (',' param)*)? ')' ( ':' type (',' type)* )?
//! generics  := '<' generic (',' generic)* '>'
//! generic   := IDENT ( ':' type ('+' type)* )?
//! param     := IDENT ':' type
//! ```
//!
//! The identifiers `void`, `bool`, `number`, and `string` (and the
//! keyword `nil`) map to the primitive type variants; every other name
//! becomes [`Type::User`]. References to in-scope generic parameters
//! also parse as `User`; semantic analysis resolves them later.

use crate::ast::{Binding, FuncSigId, FuncSignature, GenericParam, Param, Type, TypeId, TypeList};
use crate::intern::Symbol;
use crate::source_analysis::TokenKind;

use super::Parser;

impl Parser<'_> {
    /// Parses a type annotation.
    ///
    /// On a malformed type this reports an error and yields a `Void`
    /// placeholder without consuming the offending token; the caller's
    /// recovery loop deals with it.
    pub(super) fn parse_type(&mut self) -> TypeId {
        let token = self.current_token();
        match token.kind() {
            TokenKind::LeftBracket => {
                self.advance();
                let inner = self.parse_type();
                self.consume(
                    TokenKind::RightBracket,
                    "Expected ']' after array element type.",
                );
                let span = token.span().merge(self.previous_token().span());
                self.arena.alloc_type(Type::Array(inner), span)
            }
            TokenKind::Function => {
                self.advance();
                let sig = self.parse_func_signature();
                let span = token.span().merge(self.previous_token().span());
                self.arena.alloc_type(Type::Function(sig), span)
            }
            TokenKind::Nil => {
                self.advance();
                self.arena.alloc_type(Type::Nil, token.span())
            }
            TokenKind::Identifier => {
                self.advance();
                let ty = match self.pool.resolve(token.text()) {
                    b"void" => Type::Void,
                    b"bool" => Type::Bool,
                    b"number" => Type::Number,
                    b"string" => Type::String,
                    _ => {
                        let args = if self.check(TokenKind::Less) {
                            self.parse_type_args()
                        } else {
                            TypeList::new()
                        };
                        Type::User {
                            name: token.text(),
                            args,
                        }
                    }
                };
                let span = token.span().merge(self.previous_token().span());
                self.arena.alloc_type(ty, span)
            }
            _ => {
                self.error_at_current("Expected type.");
                self.arena.alloc_type(Type::Void, token.span())
            }
        }
    }

    /// Parses a `<`-delimited type argument list: `<T, [U]>`.
    pub(super) fn parse_type_args(&mut self) -> TypeList {
        let mut args = TypeList::new();
        self.advance(); // '<'
        loop {
            args.push(self.parse_type());
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Greater, "Expected '>' after type arguments.");
        args
    }

    /// Parses a function signature: optional generics, parenthesized
    /// typed parameters, optional `:`-introduced return types.
    pub(super) fn parse_func_signature(&mut self) -> FuncSigId {
        let start = self.current_token().span();

        let generics = if self.check(TokenKind::Less) {
            self.parse_generics()
        } else {
            Vec::new()
        };

        let mut params = Vec::new();
        self.consume(TokenKind::LeftParen, "Expected '(' in function signature.");
        if !self.check(TokenKind::RightParen) && !self.is_at_end() {
            loop {
                params.push(self.parse_param());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters.");

        let mut returns = TypeList::new();
        if self.match_token(TokenKind::Colon) {
            loop {
                returns.push(self.parse_type());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_signature(
            FuncSignature {
                generics,
                params,
                returns,
            },
            span,
        )
    }

    /// Parses a generic parameter list: `<T, U: Show + Eq>`.
    pub(super) fn parse_generics(&mut self) -> Vec<GenericParam> {
        let mut generics = Vec::new();
        self.advance(); // '<'
        loop {
            let name = match self.consume(TokenKind::Identifier, "Expected generic parameter name.")
            {
                Some(token) => token.text(),
                None => Symbol::EMPTY,
            };
            let mut constraints = TypeList::new();
            if self.match_token(TokenKind::Colon) {
                loop {
                    constraints.push(self.parse_type());
                    if !self.match_token(TokenKind::Plus) {
                        break;
                    }
                }
            }
            generics.push(GenericParam { name, constraints });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Greater, "Expected '>' after generic parameters.");
        generics
    }

    /// Parses a typed parameter or struct field: `name: type`.
    pub(super) fn parse_param(&mut self) -> Param {
        let name = match self.consume(TokenKind::Identifier, "Expected parameter name.") {
            Some(token) => token.text(),
            None => Symbol::EMPTY,
        };
        self.consume(TokenKind::Colon, "Expected ':' after parameter name.");
        let ty = self.parse_type();
        Param { name, ty }
    }

    /// Parses a `local` binding: `name` with an optional annotation.
    pub(super) fn parse_binding(&mut self) -> Binding {
        let name = match self.consume(TokenKind::Identifier, "Expected variable name.") {
            Some(token) => token.text(),
            None => Symbol::EMPTY,
        };
        let ty = if self.match_token(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        Binding { name, ty }
    }
}
