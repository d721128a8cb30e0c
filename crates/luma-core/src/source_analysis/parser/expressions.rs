// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing for Luma.
//!
//! This module contains the Pratt parser core and every expression
//! parselet:
//!
//! - Prefix: literals (`nil`, `true`, `false`, `...`), numbers,
//!   strings, variables, grouping, unary `-`/`not`/`#`, anonymous
//!   `function` literals, and the table constructor `{ ... }`
//! - Infix: binary arithmetic, comparison, `and`/`or`, right-
//!   associative `^` and `..`
//! - Postfix (at `Call` precedence): call `(`, index `[`, field `.`,
//!   and the struct initializer `{`
//!
//! [`Parser::parse_precedence`] consumes a prefix parselet for the
//! first token, then folds infix parselets while the next token's
//! precedence is at least the requested minimum.

use crate::ast::{BinaryOp, Expr, ExprId, TableEntry, UnaryOp};
use crate::intern::Symbol;
use crate::source_analysis::{Token, TokenKind};

use super::{Parser, Precedence, infix_precedence};

/// Maps an infix operator token to its AST operator.
const fn binary_op_for(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Caret => BinaryOp::Pow,
        TokenKind::DotDot => BinaryOp::Concat,
        TokenKind::EqualEqual => BinaryOp::Eq,
        TokenKind::NotEqual => BinaryOp::NotEq,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::LessEqual => BinaryOp::LtEq,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::GreaterEqual => BinaryOp::GtEq,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Parses any expression. Entry is at `Or`, the lowest level.
    pub(super) fn parse_expression(&mut self) -> ExprId {
        self.parse_precedence(Precedence::Or)
    }

    /// The Pratt core: parse a prefix expression, then fold infix
    /// operators while the lookahead binds at least as tightly as
    /// `min`.
    fn parse_precedence(&mut self, min: Precedence) -> ExprId {
        let token = self.advance();
        let Some(mut left) = self.parse_prefix(token) else {
            self.error_at(token, "Expected expression.");
            return self.arena.alloc_expr(Expr::Error, token.span());
        };

        while min <= infix_precedence(self.current_kind()) {
            let op_token = self.advance();
            left = self.parse_infix(op_token, left);
        }

        left
    }

    /// Dispatches on a prefix token. Returns `None` when the token
    /// cannot start an expression (including in-band lexer error
    /// tokens).
    fn parse_prefix(&mut self, token: Token) -> Option<ExprId> {
        let span = token.span();
        let expr = match token.kind() {
            TokenKind::Nil => self.arena.alloc_expr(Expr::Nil, span),
            TokenKind::True => self.arena.alloc_expr(Expr::Bool(true), span),
            TokenKind::False => self.arena.alloc_expr(Expr::Bool(false), span),
            TokenKind::DotDotDot => self.arena.alloc_expr(Expr::Vararg, span),
            TokenKind::Number => {
                let value = self.number_value(token);
                self.arena.alloc_expr(Expr::Number(value), span)
            }
            TokenKind::String => self.arena.alloc_expr(Expr::String(token.text()), span),
            TokenKind::Identifier => self.arena.alloc_expr(Expr::Variable(token.text()), span),
            TokenKind::LeftParen => {
                let inner = self.parse_expression();
                self.consume(TokenKind::RightParen, "Expected ')' after expression.");
                inner
            }
            TokenKind::Minus => self.parse_unary(token, UnaryOp::Negate, Precedence::Unary),
            TokenKind::Hash => self.parse_unary(token, UnaryOp::Len, Precedence::Unary),
            // `not` binds looser than comparisons so `not a == b`
            // negates the comparison.
            TokenKind::Not => self.parse_unary(token, UnaryOp::Not, Precedence::Comparison),
            TokenKind::Function => self.parse_function_literal(token),
            TokenKind::LeftBrace => self.parse_table(token),
            _ => return None,
        };
        Some(expr)
    }

    /// Converts a number token's lexeme with standard decimal-to-double
    /// conversion. The lexer guarantees the shape `digits[.digits]`.
    fn number_value(&self, token: Token) -> f64 {
        std::str::from_utf8(self.pool.resolve(token.text()))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// A unary operator applied to an operand parsed at `operand_min`.
    fn parse_unary(&mut self, token: Token, op: UnaryOp, operand_min: Precedence) -> ExprId {
        let operand = self.parse_precedence(operand_min);
        let span = token.span().merge(self.arena.expr_span(operand));
        self.arena.alloc_expr(Expr::Unary { op, operand }, span)
    }

    /// An anonymous function literal: `function(sig) block end`.
    fn parse_function_literal(&mut self, token: Token) -> ExprId {
        let signature = self.parse_func_signature();
        let body = self.parse_block();
        self.consume(TokenKind::End, "Expected 'end' after function body.");
        let span = token.span().merge(self.previous_token().span());
        self.arena.alloc_expr(Expr::Function { signature, body }, span)
    }

    /// A table constructor: `{ expr, key: expr, ... }`. Entries with an
    /// `IDENT ':'` head are keyed; the rest are positional.
    fn parse_table(&mut self, token: Token) -> ExprId {
        let mut entries = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let entry = if self.check(TokenKind::Identifier)
                    && self
                        .peek_at(1)
                        .is_some_and(|t| t.kind() == TokenKind::Colon)
                {
                    let key_token = self.advance();
                    let key = self
                        .arena
                        .alloc_expr(Expr::Variable(key_token.text()), key_token.span());
                    self.advance(); // ':'
                    let value = self.parse_expression();
                    TableEntry {
                        key: Some(key),
                        value,
                    }
                } else {
                    TableEntry {
                        key: None,
                        value: self.parse_expression(),
                    }
                };
                entries.push(entry);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after table constructor.");
        let span = token.span().merge(self.previous_token().span());
        self.arena.alloc_expr(Expr::Table { entries }, span)
    }

    /// Dispatches on an infix token. `left` is the already-parsed
    /// operand.
    fn parse_infix(&mut self, token: Token, left: ExprId) -> ExprId {
        match token.kind() {
            TokenKind::LeftParen => self.finish_call(left),
            TokenKind::LeftBracket => self.finish_index(left),
            TokenKind::Dot => self.finish_field(left),
            TokenKind::LeftBrace => self.finish_struct_init(left),
            kind => match binary_op_for(kind) {
                Some(op) => self.finish_binary(kind, op, left),
                // Unreachable: the precedence loop only dispatches
                // tokens with an infix entry.
                None => left,
            },
        }
    }

    /// A binary operator. `^` and `..` recurse at their own level
    /// (right-associative); everything else one level higher.
    fn finish_binary(&mut self, kind: TokenKind, op: BinaryOp, lhs: ExprId) -> ExprId {
        let precedence = infix_precedence(kind);
        let right_min = if matches!(kind, TokenKind::Caret | TokenKind::DotDot) {
            precedence
        } else {
            precedence.next()
        };
        let rhs = self.parse_precedence(right_min);
        let span = self.arena.expr_span(lhs).merge(self.arena.expr_span(rhs));
        self.arena.alloc_expr(Expr::Binary { op, lhs, rhs }, span)
    }

    /// A call: comma-separated arguments up to `)`.
    fn finish_call(&mut self, callee: ExprId) -> ExprId {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after arguments.");
        let span = self
            .arena
            .expr_span(callee)
            .merge(self.previous_token().span());
        self.arena.alloc_expr(Expr::Call { callee, args }, span)
    }

    /// An index operation: `target[index]`.
    fn finish_index(&mut self, target: ExprId) -> ExprId {
        let index = self.parse_expression();
        self.consume(TokenKind::RightBracket, "Expected ']' after index.");
        let span = self
            .arena
            .expr_span(target)
            .merge(self.previous_token().span());
        self.arena.alloc_expr(Expr::Index { target, index }, span)
    }

    /// A field access: `target.name`.
    fn finish_field(&mut self, target: ExprId) -> ExprId {
        let name = match self.consume(TokenKind::Identifier, "Expected field name after '.'.") {
            Some(token) => token.text(),
            None => Symbol::EMPTY,
        };
        let span = self
            .arena
            .expr_span(target)
            .merge(self.previous_token().span());
        self.arena.alloc_expr(Expr::Field { target, name }, span)
    }

    /// A struct initializer: `Name { field: expr, ... }`. The left
    /// operand (a variable or field path) becomes the initializer's
    /// name expression.
    fn finish_struct_init(&mut self, name: ExprId) -> ExprId {
        let mut entries = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let key = match self.consume(
                    TokenKind::Identifier,
                    "Expected field name in struct initializer.",
                ) {
                    Some(token) => self
                        .arena
                        .alloc_expr(Expr::Variable(token.text()), token.span()),
                    None => {
                        let span = self.current_token().span();
                        self.arena.alloc_expr(Expr::Error, span)
                    }
                };
                self.consume(TokenKind::Colon, "Expected ':' after field name.");
                let value = self.parse_expression();
                entries.push(TableEntry {
                    key: Some(key),
                    value,
                });
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(
            TokenKind::RightBrace,
            "Expected '}' after struct initializer.",
        );
        let span = self
            .arena
            .expr_span(name)
            .merge(self.previous_token().span());
        self.arena.alloc_expr(Expr::StructInit { name, entries }, span)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AstArena, BinaryOp, Expr, ExprId, ParseTree, Stmt, UnaryOp};
    use crate::intern::StringPool;
    use crate::source_analysis::{parse, tokenize};

    /// Parses `source` (a single expression statement) and returns the
    /// expression's id.
    fn expr_of(source: &str) -> (ParseTree, ExprId, StringPool) {
        let mut pool = StringPool::new();
        let tokens = tokenize(&format!("{source};"), &mut pool);
        let (tree, diagnostics) = parse(tokens, &pool);
        assert!(
            diagnostics.is_empty(),
            "unexpected errors for {source:?}: {diagnostics:?}"
        );
        let stmts = tree.root_block();
        assert_eq!(stmts.len(), 1);
        let Stmt::Expr(id) = tree.arena.stmt(stmts[0]) else {
            panic!("expected an expression statement");
        };
        let id = *id;
        (tree, id, pool)
    }

    /// Asserts the expression is `Binary(op, _, _)` and returns the
    /// operand ids.
    fn as_binary(arena: &AstArena, id: ExprId, op: BinaryOp) -> (ExprId, ExprId) {
        match arena.expr(id) {
            Expr::Binary {
                op: actual,
                lhs,
                rhs,
            } => {
                assert_eq!(*actual, op);
                (*lhs, *rhs)
            }
            other => panic!("expected binary {op:?}, got {other:?}"),
        }
    }

    fn as_number(arena: &AstArena, id: ExprId) -> f64 {
        match arena.expr(id) {
            Expr::Number(n) => *n,
            other => panic!("expected number, got {other:?}"),
        }
    }

    fn assert_variable(arena: &AstArena, pool: &StringPool, id: ExprId, name: &str) {
        match arena.expr(id) {
            Expr::Variable(sym) => assert_eq!(pool.resolve(*sym), name.as_bytes()),
            other => panic!("expected variable {name}, got {other:?}"),
        }
    }

    #[test]
    fn literals() {
        let (tree, id, _) = expr_of("nil");
        assert_eq!(tree.arena.expr(id), &Expr::Nil);

        let (tree, id, _) = expr_of("true");
        assert_eq!(tree.arena.expr(id), &Expr::Bool(true));

        let (tree, id, _) = expr_of("42");
        assert_eq!(as_number(&tree.arena, id), 42.0);

        let (tree, id, _) = expr_of("3.5");
        assert_eq!(as_number(&tree.arena, id), 3.5);

        let (tree, id, _) = expr_of("...");
        assert_eq!(tree.arena.expr(id), &Expr::Vararg);

        let (tree, id, pool) = expr_of("\"hi\"");
        match tree.arena.expr(id) {
            Expr::String(sym) => assert_eq!(pool.resolve(*sym), b"hi"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let (tree, id, _) = expr_of("1+2*3");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Add);
        assert_eq!(as_number(&tree.arena, lhs), 1.0);
        let (l, r) = as_binary(&tree.arena, rhs, BinaryOp::Mul);
        assert_eq!(as_number(&tree.arena, l), 2.0);
        assert_eq!(as_number(&tree.arena, r), 3.0);
    }

    #[test]
    fn subtraction_is_left_associative() {
        let (tree, id, pool) = expr_of("a-b-c");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Sub);
        assert_variable(&tree.arena, &pool, rhs, "c");
        let (l, r) = as_binary(&tree.arena, lhs, BinaryOp::Sub);
        assert_variable(&tree.arena, &pool, l, "a");
        assert_variable(&tree.arena, &pool, r, "b");
    }

    #[test]
    fn pow_is_right_associative() {
        let (tree, id, pool) = expr_of("a^b^c");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Pow);
        assert_variable(&tree.arena, &pool, lhs, "a");
        let (l, r) = as_binary(&tree.arena, rhs, BinaryOp::Pow);
        assert_variable(&tree.arena, &pool, l, "b");
        assert_variable(&tree.arena, &pool, r, "c");
    }

    #[test]
    fn concat_is_right_associative() {
        let (tree, id, pool) = expr_of("a..b..c");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Concat);
        assert_variable(&tree.arena, &pool, lhs, "a");
        let (l, r) = as_binary(&tree.arena, rhs, BinaryOp::Concat);
        assert_variable(&tree.arena, &pool, l, "b");
        assert_variable(&tree.arena, &pool, r, "c");
    }

    #[test]
    fn negation_binds_tighter_than_subtraction() {
        // `-a - b` is `(-a) - b`, not `-(a - b)`.
        let (tree, id, pool) = expr_of("-a-b");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Sub);
        assert_variable(&tree.arena, &pool, rhs, "b");
        match tree.arena.expr(lhs) {
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => assert_variable(&tree.arena, &pool, *operand, "a"),
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn pow_binds_tighter_than_negation() {
        // `-a^b` is `-(a^b)`.
        let (tree, id, pool) = expr_of("-a^b");
        match tree.arena.expr(id) {
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => {
                let (l, r) = as_binary(&tree.arena, *operand, BinaryOp::Pow);
                assert_variable(&tree.arena, &pool, l, "a");
                assert_variable(&tree.arena, &pool, r, "b");
            }
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn not_negates_a_comparison() {
        // `not a == b` is `not (a == b)`.
        let (tree, id, pool) = expr_of("not a == b");
        match tree.arena.expr(id) {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let (l, r) = as_binary(&tree.arena, *operand, BinaryOp::Eq);
                assert_variable(&tree.arena, &pool, l, "a");
                assert_variable(&tree.arena, &pool, r, "b");
            }
            other => panic!("expected `not`, got {other:?}"),
        }
    }

    #[test]
    fn not_stops_below_and() {
        // `not a and b` is `(not a) and b`.
        let (tree, id, pool) = expr_of("not a and b");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::And);
        assert_variable(&tree.arena, &pool, rhs, "b");
        assert!(matches!(
            tree.arena.expr(lhs),
            Expr::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn grouping_overrides_precedence() {
        let (tree, id, _) = expr_of("(1+2)*3");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Mul);
        assert_eq!(as_number(&tree.arena, rhs), 3.0);
        let (l, r) = as_binary(&tree.arena, lhs, BinaryOp::Add);
        assert_eq!(as_number(&tree.arena, l), 1.0);
        assert_eq!(as_number(&tree.arena, r), 2.0);
    }

    #[test]
    fn logical_operators_nest_or_below_and() {
        let (tree, id, pool) = expr_of("a or b and c");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Or);
        assert_variable(&tree.arena, &pool, lhs, "a");
        let (l, r) = as_binary(&tree.arena, rhs, BinaryOp::And);
        assert_variable(&tree.arena, &pool, l, "b");
        assert_variable(&tree.arena, &pool, r, "c");
    }

    #[test]
    fn comparison_of_concatenations() {
        // `..` binds tighter than `==`.
        let (tree, id, _) = expr_of("a .. b == c .. d");
        let (lhs, rhs) = as_binary(&tree.arena, id, BinaryOp::Eq);
        as_binary(&tree.arena, lhs, BinaryOp::Concat);
        as_binary(&tree.arena, rhs, BinaryOp::Concat);
    }

    #[test]
    fn call_with_arguments() {
        let (tree, id, pool) = expr_of("f(1, x)");
        match tree.arena.expr(id) {
            Expr::Call { callee, args } => {
                assert_variable(&tree.arena, &pool, *callee, "f");
                assert_eq!(args.len(), 2);
                assert_eq!(as_number(&tree.arena, args[0]), 1.0);
                assert_variable(&tree.arena, &pool, args[1], "x");
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn empty_call() {
        let (tree, id, _) = expr_of("f()");
        match tree.arena.expr(id) {
            Expr::Call { args, .. } => assert!(args.is_empty()),
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn chained_postfix_operators() {
        // `t.xs[1](2)` — field, then index, then call.
        let (tree, id, pool) = expr_of("t.xs[1](2)");
        let Expr::Call { callee, args } = tree.arena.expr(id) else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
        let Expr::Index { target, index } = tree.arena.expr(*callee) else {
            panic!("expected index");
        };
        assert_eq!(as_number(&tree.arena, *index), 1.0);
        let Expr::Field { target, name } = tree.arena.expr(*target) else {
            panic!("expected field");
        };
        assert_eq!(pool.resolve(*name), b"xs");
        assert_variable(&tree.arena, &pool, *target, "t");
    }

    #[test]
    fn call_binds_tighter_than_unary() {
        // `-f(x)` negates the call result.
        let (tree, id, _) = expr_of("-f(x)");
        match tree.arena.expr(id) {
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => assert!(matches!(tree.arena.expr(*operand), Expr::Call { .. })),
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn length_operator() {
        let (tree, id, pool) = expr_of("#xs");
        match tree.arena.expr(id) {
            Expr::Unary {
                op: UnaryOp::Len,
                operand,
            } => assert_variable(&tree.arena, &pool, *operand, "xs"),
            other => panic!("expected length, got {other:?}"),
        }
    }

    #[test]
    fn table_constructor() {
        let (tree, id, pool) = expr_of("{1, 2, label: 3}");
        let Expr::Table { entries } = tree.arena.expr(id) else {
            panic!("expected table");
        };
        assert_eq!(entries.len(), 3);
        assert!(entries[0].key.is_none());
        assert!(entries[1].key.is_none());
        let key = entries[2].key.expect("keyed entry");
        assert_variable(&tree.arena, &pool, key, "label");
        assert_eq!(as_number(&tree.arena, entries[2].value), 3.0);
    }

    #[test]
    fn empty_table() {
        let (tree, id, _) = expr_of("{}");
        assert!(matches!(
            tree.arena.expr(id),
            Expr::Table { entries } if entries.is_empty()
        ));
    }

    #[test]
    fn struct_initializer() {
        let (tree, id, pool) = expr_of("Point { x: 1, y: 2 }");
        let Expr::StructInit { name, entries } = tree.arena.expr(id) else {
            panic!("expected struct initializer");
        };
        assert_variable(&tree.arena, &pool, *name, "Point");
        assert_eq!(entries.len(), 2);
        let key = entries[0].key.expect("struct entries are keyed");
        assert_variable(&tree.arena, &pool, key, "x");
        assert_eq!(as_number(&tree.arena, entries[0].value), 1.0);
    }

    #[test]
    fn struct_initializer_with_field_path_name() {
        // A namespaced type name: `geo.Point { x: 1 }`.
        let (tree, id, pool) = expr_of("geo.Point { x: 1 }");
        let Expr::StructInit { name, .. } = tree.arena.expr(id) else {
            panic!("expected struct initializer");
        };
        let Expr::Field { target, name } = tree.arena.expr(*name) else {
            panic!("expected field path");
        };
        assert_eq!(pool.resolve(*name), b"Point");
        assert_variable(&tree.arena, &pool, *target, "geo");
    }

    #[test]
    fn function_literal() {
        let (tree, id, _) = expr_of("function(x: number): number return x; end");
        let Expr::Function { signature, body } = tree.arena.expr(id) else {
            panic!("expected function literal");
        };
        let sig = tree.arena.signature(*signature);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.returns.len(), 1);
        match tree.arena.stmt(*body) {
            Stmt::Block(stmts) => assert_eq!(stmts.len(), 1),
            other => panic!("expected block body, got {other:?}"),
        }
    }

    #[test]
    fn number_value_conversion() {
        let (tree, id, _) = expr_of("0.5");
        assert_eq!(as_number(&tree.arena, id), 0.5);
        let (tree, id, _) = expr_of("1000000");
        assert_eq!(as_number(&tree.arena, id), 1_000_000.0);
    }
}
