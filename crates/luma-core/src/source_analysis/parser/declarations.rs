// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement and declaration parsing for Luma.
//!
//! Statements are dispatched on the current token:
//!
//! | Token | Production |
//! |-------|------------|
//! | `type` | type alias |
//! | `impl` | impl block, optional `for` clause |
//! | `trait` | trait declaration (signatures only) |
//! | `struct` | struct declaration |
//! | `function` | named function declaration |
//! | `local` | typed local binding |
//! | `for` | numeric or generic for (disambiguated on `=`) |
//! | `repeat` / `while` / `if` | control flow |
//! | `break` / `return` | jumps |
//! | anything else | expression or assignment statement |
//!
//! A block is a statement sequence ending at `end`, `else`, `elseif`,
//! `until`, or end of input. `local`, `return`, `break`, assignments
//! and expression statements require a terminating `;`; `end` never
//! takes one.

use crate::ast::{Stmt, StmtId, TraitMethod, TypeList};
use crate::intern::Symbol;
use crate::source_analysis::{Span, TokenKind};

use super::Parser;

impl Parser<'_> {
    /// Parses one statement.
    pub(super) fn parse_statement(&mut self) -> StmtId {
        match self.current_kind() {
            TokenKind::Type => self.parse_type_alias(),
            TokenKind::Impl => self.parse_impl(),
            TokenKind::Trait => self.parse_trait(),
            TokenKind::Struct => self.parse_struct(),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::Local => self.parse_local(),
            TokenKind::For => self.parse_for(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::While => self.parse_while(),
            TokenKind::If => self.parse_if(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Return => self.parse_return(),
            _ => self.parse_expr_statement(),
        }
    }

    /// Parses statements until a block terminator, wrapping them in a
    /// [`Stmt::Block`]. The terminator itself is left for the caller.
    pub(super) fn parse_block(&mut self) -> StmtId {
        let start = self.current_token().span();
        let mut stmts = Vec::new();

        while !self.current_kind().ends_block() {
            // A bare `;` is an empty statement.
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }
            stmts.push(self.parse_statement());
            if self.in_panic_mode() {
                self.synchronize();
            }
        }

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(Stmt::Block(stmts), span)
    }

    /// `type Name = type ;`
    fn parse_type_alias(&mut self) -> StmtId {
        let start = self.advance().span();
        let name = self.expect_name("Expected type alias name.");
        self.consume(TokenKind::Equal, "Expected '=' after type alias name.");
        let ty = self.parse_type();
        self.consume(TokenKind::Semicolon, "Expected ';' after type alias.");
        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(Stmt::TypeAlias { name, ty }, span)
    }

    /// `impl generics? Name typeargs? ('for' Name typeargs?)?
    /// function_decl* end`
    ///
    /// With a `for` clause the first name is the trait and the second
    /// the target; without one the single name is the target.
    fn parse_impl(&mut self) -> StmtId {
        let start = self.advance().span();

        let generics = if self.check(TokenKind::Less) {
            self.parse_generics()
        } else {
            Vec::new()
        };

        let first_name = self.expect_name("Expected type name after 'impl'.");
        let first_args = if self.check(TokenKind::Less) {
            self.parse_type_args()
        } else {
            TypeList::new()
        };

        let (trait_name, trait_args, target_name, target_args) =
            if self.match_token(TokenKind::For) {
                let target = self.expect_name("Expected target type name after 'for'.");
                let target_args = if self.check(TokenKind::Less) {
                    self.parse_type_args()
                } else {
                    TypeList::new()
                };
                (Some(first_name), first_args, target, target_args)
            } else {
                (None, TypeList::new(), first_name, first_args)
            };

        let mut functions = Vec::new();
        while self.check(TokenKind::Function) {
            functions.push(self.parse_function_decl());
            if self.in_panic_mode() {
                self.synchronize();
            }
        }
        self.consume(TokenKind::End, "Expected 'end' after impl block.");

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(
            Stmt::Impl {
                generics,
                target_name,
                target_args,
                trait_name,
                trait_args,
                functions,
            },
            span,
        )
    }

    /// `trait Name generics? ('function' Name funcsig)* end`
    fn parse_trait(&mut self) -> StmtId {
        let start = self.advance().span();
        let name = self.expect_name("Expected trait name.");

        let generics = if self.check(TokenKind::Less) {
            self.parse_generics()
        } else {
            Vec::new()
        };

        let mut methods = Vec::new();
        while self.match_token(TokenKind::Function) {
            let method_name = self.expect_name("Expected method name.");
            let signature = self.parse_func_signature();
            methods.push(TraitMethod {
                name: method_name,
                signature,
            });
            if self.in_panic_mode() {
                self.synchronize();
            }
        }
        self.consume(TokenKind::End, "Expected 'end' after trait declaration.");

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(
            Stmt::Trait {
                name,
                generics,
                methods,
            },
            span,
        )
    }

    /// `struct Name generics? (field (',' field)*)? end`
    fn parse_struct(&mut self) -> StmtId {
        let start = self.advance().span();
        let name = self.expect_name("Expected struct name.");

        let generics = if self.check(TokenKind::Less) {
            self.parse_generics()
        } else {
            Vec::new()
        };

        let mut fields = Vec::new();
        if !self.check(TokenKind::End) && !self.is_at_end() {
            loop {
                fields.push(self.parse_param());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::End, "Expected 'end' after struct declaration.");

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(
            Stmt::Struct {
                name,
                generics,
                fields,
            },
            span,
        )
    }

    /// `function Name funcsig block end`
    fn parse_function_decl(&mut self) -> StmtId {
        let start = self.advance().span();
        let name = self.expect_name("Expected function name.");
        let signature = self.parse_func_signature();
        let body = self.parse_block();
        self.consume(TokenKind::End, "Expected 'end' after function body.");

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(
            Stmt::Function {
                name,
                signature,
                body,
            },
            span,
        )
    }

    /// `local binding (',' binding)* ('=' expr (',' expr)*)? ;`
    fn parse_local(&mut self) -> StmtId {
        let start = self.advance().span();

        let mut decls = Vec::new();
        loop {
            decls.push(self.parse_binding());
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let mut values = Vec::new();
        if self.match_token(TokenKind::Equal) {
            loop {
                values.push(self.parse_expression());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::Semicolon, "Expected ';' after local declaration.");

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(Stmt::Local { decls, values }, span)
    }

    /// Numeric or generic `for`, disambiguated by the token after the
    /// first loop variable: `=` makes it numeric.
    fn parse_for(&mut self) -> StmtId {
        let start = self.advance().span();
        let first = self.expect_name("Expected loop variable name.");

        if self.match_token(TokenKind::Equal) {
            let start_expr = self.parse_expression();
            self.consume(TokenKind::Comma, "Expected ',' after for start value.");
            let end_expr = self.parse_expression();
            let step = if self.match_token(TokenKind::Comma) {
                Some(self.parse_expression())
            } else {
                None
            };
            self.consume(TokenKind::Do, "Expected 'do' after for range.");
            let body = self.parse_block();
            self.consume(TokenKind::End, "Expected 'end' after for body.");

            let span = start.merge(self.previous_token().span());
            self.arena.alloc_stmt(
                Stmt::ForNum {
                    name: first,
                    start: start_expr,
                    end: end_expr,
                    step,
                    body,
                },
                span,
            )
        } else {
            let mut names = vec![first];
            while self.match_token(TokenKind::Comma) {
                names.push(self.expect_name("Expected loop variable name."));
            }
            self.consume(TokenKind::In, "Expected 'in' after loop variables.");
            let iter = self.parse_expression();
            self.consume(TokenKind::Do, "Expected 'do' after for iterator.");
            let body = self.parse_block();
            self.consume(TokenKind::End, "Expected 'end' after for body.");

            let span = start.merge(self.previous_token().span());
            self.arena
                .alloc_stmt(Stmt::ForGen { names, iter, body }, span)
        }
    }

    /// `repeat block until expr`
    fn parse_repeat(&mut self) -> StmtId {
        let start = self.advance().span();
        let body = self.parse_block();
        self.consume(TokenKind::Until, "Expected 'until' after repeat body.");
        let condition = self.parse_expression();

        let span = start.merge(self.previous_token().span());
        self.arena
            .alloc_stmt(Stmt::Repeat { body, condition }, span)
    }

    /// `while expr do block end`
    fn parse_while(&mut self) -> StmtId {
        let start = self.advance().span();
        let condition = self.parse_expression();
        self.consume(TokenKind::Do, "Expected 'do' after while condition.");
        let body = self.parse_block();
        self.consume(TokenKind::End, "Expected 'end' after while body.");

        let span = start.merge(self.previous_token().span());
        self.arena
            .alloc_stmt(Stmt::While { condition, body }, span)
    }

    /// `if expr then block (elseif expr then block)* (else block)? end`
    ///
    /// Every `elseif` becomes a nested `If` in the else branch, so the
    /// else branch of an `If` is always absent, a further `If`, or a
    /// `Block`.
    fn parse_if(&mut self) -> StmtId {
        let start = self.advance().span();
        self.parse_if_tail(start)
    }

    /// The shared body of `if` and `elseif`; the introducing keyword is
    /// already consumed. Consumes the chain's single `end` at the
    /// innermost level.
    fn parse_if_tail(&mut self, start: Span) -> StmtId {
        let condition = self.parse_expression();
        self.consume(TokenKind::Then, "Expected 'then' after condition.");
        let then_branch = self.parse_block();

        let else_branch = if self.check(TokenKind::Elseif) {
            let elseif_start = self.advance().span();
            Some(self.parse_if_tail(elseif_start))
        } else if self.match_token(TokenKind::Else) {
            let block = self.parse_block();
            self.consume(TokenKind::End, "Expected 'end' after if statement.");
            Some(block)
        } else {
            self.consume(TokenKind::End, "Expected 'end' after if statement.");
            None
        };

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        )
    }

    /// `break ;`
    fn parse_break(&mut self) -> StmtId {
        let start = self.advance().span();
        self.consume(TokenKind::Semicolon, "Expected ';' after 'break'.");
        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(Stmt::Break, span)
    }

    /// `return (expr (',' expr)*)? ;`
    fn parse_return(&mut self) -> StmtId {
        let start = self.advance().span();

        let mut values = Vec::new();
        if !self.check(TokenKind::Semicolon) && !self.is_at_end() {
            loop {
                values.push(self.parse_expression());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::Semicolon, "Expected ';' after return statement.");

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(Stmt::Return(values), span)
    }

    /// An expression statement or a parallel assignment: a
    /// comma-separated expression list, promoted to [`Stmt::Assign`]
    /// when `=` follows.
    fn parse_expr_statement(&mut self) -> StmtId {
        let start = self.current_token().span();

        let mut exprs = vec![self.parse_expression()];
        while self.match_token(TokenKind::Comma) {
            exprs.push(self.parse_expression());
        }

        let stmt = if self.match_token(TokenKind::Equal) {
            let mut values = Vec::new();
            loop {
                values.push(self.parse_expression());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::Semicolon, "Expected ';' after assignment.");
            Stmt::Assign {
                targets: exprs,
                values,
            }
        } else {
            if exprs.len() > 1 {
                self.error_at_current("Expected '=' after expression list.");
            }
            self.consume(TokenKind::Semicolon, "Expected ';' after expression.");
            Stmt::Expr(exprs[0])
        };

        let span = start.merge(self.previous_token().span());
        self.arena.alloc_stmt(stmt, span)
    }

    /// Consumes an identifier and returns its symbol, or the empty
    /// symbol after reporting the given error.
    fn expect_name(&mut self, message: &str) -> Symbol {
        match self.consume(TokenKind::Identifier, message) {
            Some(token) => token.text(),
            None => Symbol::EMPTY,
        }
    }
}
