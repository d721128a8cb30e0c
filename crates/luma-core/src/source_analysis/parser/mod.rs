// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Luma source code.
//!
//! The parser builds a [`ParseTree`] from a stream of tokens. Statement
//! and type grammars are plain recursive descent; expression precedence
//! uses Pratt parsing (top-down operator precedence).
//!
//! # Design Philosophy
//!
//! - **Always produce a tree** — errors never abort; the returned
//!   tree's `success` flag says whether it may be consumed.
//! - **Panic-mode recovery** — the first error in a statement is
//!   reported, the rest are suppressed until the parser resynchronizes
//!   at a statement boundary (a statement-starting keyword, a block
//!   terminator, or past a `;`). This reports one diagnostic per
//!   mistake instead of a cascade.
//! - **One arena per parse** — every node of the tree lives in the
//!   [`AstArena`] returned inside the [`ParseTree`].
//!
//! # Expression Precedence
//!
//! Eleven levels, lowest to highest:
//!
//! | Level | Tokens |
//! |-------|--------|
//! | `None` | everything that is not an infix operator |
//! | `Or` | `or` |
//! | `And` | `and` |
//! | `Comparison` | `==` `~=` `<` `<=` `>` `>=` |
//! | `Concat` | `..` (right-associative) |
//! | `Term` | `+` `-` |
//! | `Factor` | `*` `/` `%` |
//! | `Unary` | prefix `-` `not` `#` |
//! | `Pow` | `^` (right-associative) |
//! | `Call` | postfix `(` `[` `.` `{` |
//! | `Primary` | the ceiling; nothing binds tighter |
//!
//! `None` is the floor the infix loop stops on, and `Primary` the level
//! left-associative `Call` recursion lands on. Left-associative
//! operators recurse one level higher for their right operand; `^` and
//! `..` recurse at their own level, which is what makes them
//! right-associative.
//!
//! # Usage
//!
//! ```
//! use luma_core::intern::StringPool;
//! use luma_core::source_analysis::{parse, tokenize};
//!
//! let mut pool = StringPool::new();
//! let tokens = tokenize("return 2^3^2;", &mut pool);
//! let (tree, diagnostics) = parse(tokens, &pool);
//!
//! assert!(tree.success);
//! assert!(diagnostics.is_empty());
//! assert_eq!(tree.root_block().len(), 1);
//! ```

use crate::ast::{AstArena, ParseTree, Stmt, StmtId};
use crate::intern::{StringPool, Symbol};
use crate::source_analysis::{Diagnostic, Span, Token, TokenKind};

mod declarations;
mod expressions;
mod types;


/// Expression precedence levels, lowest to highest.
///
/// `None` marks tokens that are not infix operators; the Pratt loop
/// stops on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    None,
    Or,
    And,
    Comparison,
    Concat,
    Term,
    Factor,
    Unary,
    Pow,
    Call,
    Primary,
}

impl Precedence {
    /// The next-higher level, used for left-associative recursion.
    pub(super) const fn next(self) -> Self {
        match self {
            Self::None => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Comparison,
            Self::Comparison => Self::Concat,
            Self::Concat => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Pow,
            Self::Pow => Self::Call,
            Self::Call | Self::Primary => Self::Primary,
        }
    }
}

/// The infix precedence of a token, or `Precedence::None` when the
/// token is not an infix operator.
pub(super) const fn infix_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::EqualEqual
        | TokenKind::NotEqual
        | TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual => Precedence::Comparison,
        TokenKind::DotDot => Precedence::Concat,
        TokenKind::Plus | TokenKind::Minus => Precedence::Term,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
        TokenKind::Caret => Precedence::Pow,
        TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::Dot | TokenKind::LeftBrace => {
            Precedence::Call
        }
        _ => Precedence::None,
    }
}

/// Parses a token stream into a [`ParseTree`].
///
/// This is the main entry point. It always returns a tree; when any
/// lexical or syntactic error was reported, `tree.success` is false and
/// the tree must not be consumed by later phases. The string pool is
/// the one the tokens were interned into.
#[must_use]
pub fn parse(tokens: Vec<Token>, pool: &StringPool) -> (ParseTree, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens, pool);
    let root = parser.parse_program();
    let tree = ParseTree {
        arena: parser.arena,
        root,
        success: !parser.had_error,
    };
    (tree, parser.diagnostics)
}

/// The parser state.
pub(super) struct Parser<'pool> {
    /// The tokens being parsed; ends with exactly one EOF.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// The pool the token texts live in (read-only during parsing).
    pool: &'pool StringPool,
    /// Storage for the nodes of this parse.
    pub(super) arena: AstArena,
    /// Set while suppressing cascade errors.
    panic_mode: bool,
    /// Set once any error has been reported.
    had_error: bool,
    /// Accumulated diagnostics.
    diagnostics: Vec<Diagnostic>,
}

impl<'pool> Parser<'pool> {
    /// Creates a new parser. A missing EOF terminator is appended
    /// defensively.
    fn new(mut tokens: Vec<Token>, pool: &'pool StringPool) -> Self {
        if tokens.last().is_none_or(|t| !t.kind().is_eof()) {
            let line = tokens.last().map_or(1, |t| t.line());
            let at = tokens.last().map_or(0, |t| t.span().end());
            tokens.push(Token::new(
                TokenKind::Eof,
                Symbol::EMPTY,
                line,
                Span::new(at, at),
            ));
        }
        Self {
            tokens,
            current: 0,
            pool,
            arena: AstArena::new(),
            panic_mode: false,
            had_error: false,
            diagnostics: Vec::new(),
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    pub(super) fn current_token(&self) -> Token {
        match self.tokens.get(self.current) {
            Some(token) => *token,
            // Past the end of the stream; fall back to the EOF token.
            None => *self.tokens.last().expect("token stream is never empty"),
        }
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> TokenKind {
        self.current_token().kind()
    }

    /// Returns the most recently consumed token.
    pub(super) fn previous_token(&self) -> Token {
        self.tokens[self.current.saturating_sub(1)]
    }

    /// Peeks at the token `offset` positions past the current one.
    pub(super) fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.current + offset).copied()
    }

    /// Checks if we're at the end of input.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Advances to the next token and returns the consumed one. At the
    /// end of input the cursor stays put and the EOF token is returned,
    /// so a prefix parselet that runs out of tokens reports its error
    /// at EOF instead of re-reading the previous token.
    pub(super) fn advance(&mut self) -> Token {
        if self.is_at_end() {
            return self.current_token();
        }
        self.current += 1;
        self.previous_token()
    }

    /// Checks if the current token matches the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it matches the given kind.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match `kind`, advancing if it does.
    ///
    /// Otherwise reports an error at the current token and does *not*
    /// advance.
    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error_at_current(message);
            None
        }
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Reports an error at the given token.
    ///
    /// While in panic mode all further reports are suppressed; the
    /// statement loop clears panic mode once it has resynchronized.
    pub(super) fn error_at(&mut self, token: Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        let found = self.pool.resolve_lossy(token.text());
        self.diagnostics.push(Diagnostic::error(
            message,
            token.line(),
            found.as_ref(),
            token.span(),
        ));
    }

    /// Reports an error at the current token.
    pub(super) fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current_token(), message);
    }

    /// Whether the parser is currently recovering from an error.
    pub(super) fn in_panic_mode(&self) -> bool {
        self.panic_mode
    }

    /// Synchronizes to a statement boundary and leaves panic mode.
    ///
    /// Skips tokens until just past a `;`, or until the cursor sits on
    /// a statement-starting keyword or a block terminator.
    pub(super) fn synchronize(&mut self) {
        self.panic_mode = false;

        while !self.is_at_end() {
            if self.current > 0 && self.previous_token().kind() == TokenKind::Semicolon {
                return;
            }
            let kind = self.current_kind();
            if kind.starts_statement() || kind.ends_block() {
                return;
            }
            self.advance();
        }
    }

    // ========================================================================
    // Program Parsing
    // ========================================================================

    /// Parses the whole token stream into the root block.
    fn parse_program(&mut self) -> StmtId {
        let start = self.current_token().span();
        let mut stmts = Vec::new();

        while !self.is_at_end() {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::tokenize;

    fn parse_source(source: &str) -> (ParseTree, Vec<Diagnostic>, StringPool) {
        let mut pool = StringPool::new();
        let tokens = tokenize(source, &mut pool);
        let (tree, diagnostics) = parse(tokens, &pool);
        (tree, diagnostics, pool)
    }

    fn parse_ok(source: &str) -> (ParseTree, StringPool) {
        let (tree, diagnostics, pool) = parse_source(source);
        assert!(
            diagnostics.is_empty(),
            "expected no errors for {source:?}, got: {diagnostics:?}"
        );
        assert!(tree.success);
        (tree, pool)
    }

    #[test]
    fn empty_source_parses_to_empty_block() {
        let (tree, _) = parse_ok("");
        assert!(tree.root_block().is_empty());

        let (tree, _) = parse_ok("   \n\t -- just a comment\n");
        assert!(tree.root_block().is_empty());
    }

    #[test]
    fn bare_semicolon_is_an_empty_statement() {
        let (tree, _) = parse_ok(";");
        assert!(tree.root_block().is_empty());

        let (tree, _) = parse_ok(";;;");
        assert!(tree.root_block().is_empty());
    }

    #[test]
    fn missing_expression_is_reported() {
        let (tree, diagnostics, _) = parse_source("local x = ;");
        assert!(!tree.success);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "[line 1] Error at ';': Expected expression."
        );
    }

    #[test]
    fn panic_mode_suppresses_cascades() {
        // The `)` and the dangling operator would each error without
        // panic mode; only the first problem in the statement is
        // reported.
        let (tree, diagnostics, _) = parse_source("local x = ) + ;");
        assert!(!tree.success);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn recovery_reports_independent_errors() {
        let source = "local x = ;\nlocal y = ;\n";
        let (tree, diagnostics, _) = parse_source(source);
        assert!(!tree.success);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 1);
        assert_eq!(diagnostics[1].line, 2);
    }

    #[test]
    fn lexical_error_token_fails_the_parse() {
        let (tree, diagnostics, _) = parse_source("local s = \"oops;\n");
        assert!(!tree.success);
        assert!(!diagnostics.is_empty());
        // The offending token's text is the lexer's message.
        assert!(diagnostics[0].found.contains("Unterminated string"));
    }

    #[test]
    fn error_tree_still_has_a_root_block() {
        let (tree, _, _) = parse_source("+");
        assert!(!tree.success);
        let stmts = tree.root_block();
        assert_eq!(stmts.len(), 1);
        match tree.arena.stmt(stmts[0]) {
            Stmt::Expr(e) => assert!(tree.arena.expr(*e).is_error()),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parser_appends_missing_eof() {
        // `parse` tolerates a stream that lost its EOF terminator.
        let mut pool = StringPool::new();
        let mut tokens = tokenize("break;", &mut pool);
        tokens.pop();
        let (tree, diagnostics) = parse(tokens, &pool);
        assert!(diagnostics.is_empty());
        assert_eq!(tree.root_block().len(), 1);
    }

    #[test]
    fn precedence_next_saturates() {
        assert_eq!(Precedence::Primary.next(), Precedence::Primary);
        assert_eq!(Precedence::Call.next(), Precedence::Primary);
        assert!(Precedence::None < Precedence::Or);
        assert!(Precedence::Unary < Precedence::Pow);
    }

    #[test]
    fn infix_precedence_table() {
        assert_eq!(infix_precedence(TokenKind::Or), Precedence::Or);
        assert_eq!(infix_precedence(TokenKind::Caret), Precedence::Pow);
        assert_eq!(infix_precedence(TokenKind::LeftBrace), Precedence::Call);
        assert_eq!(infix_precedence(TokenKind::Semicolon), Precedence::None);
        assert_eq!(infix_precedence(TokenKind::End), Precedence::None);
    }

    #[test]
    fn expr_ids_all_resolve_in_the_same_arena() {
        let (tree, _) = parse_ok("local p: Point = Point { x: 1 + 2, y: f(3)[4].z };");
        // Walking every allocated node must stay inside the arena; the
        // typed indices make out-of-arena references unrepresentable,
        // so it is enough that every stored id resolves.
        for i in 0..tree.arena.expr_count() {
            let raw = la_arena::RawIdx::from(u32::try_from(i).expect("node count fits u32"));
            let _ = tree.arena.expr(la_arena::Idx::from_raw(raw));
        }
    }

    #[test]
    fn diagnostics_render_the_driver_format() {
        let (_, diagnostics, _) = parse_source("return 1");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "[line 1] Error at '': Expected ';' after return statement."
        );
    }
}
