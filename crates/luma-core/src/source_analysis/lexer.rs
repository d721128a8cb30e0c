// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Luma source code.
//!
//! This module converts source text into a stream of [`Token`]s. The
//! lexer is hand-written for maximum control over error recovery.
//!
//! # Design Principles
//!
//! - **Error recovery**: never fail on malformed input; emit
//!   [`TokenKind::Error`] tokens (whose text is a human-readable
//!   message) and keep scanning.
//! - **Interning**: every lexeme goes through the [`StringPool`], so
//!   equal text shares one [`Symbol`].
//! - **Byte-oriented**: the grammar is ASCII-driven and string escapes
//!   can produce arbitrary bytes, so the scanner works on `&[u8]` and
//!   copies multi-byte UTF-8 content through verbatim.
//!
//! # String forms
//!
//! Quoted strings (`"` or `'`) support the C-style escape set plus
//! decimal byte escapes (`\65`, up to three digits) and escaped
//! newlines. Long-bracket strings (`[[ ... ]]`, `[==[ ... ]==]`) take
//! their content verbatim; the number of `=` signs is the *level* and
//! must match between opener and closer.
//!
//! # Example
//!
//! ```
//! use luma_core::intern::StringPool;
//! use luma_core::source_analysis::{Lexer, TokenKind, tokenize};
//!
//! let mut pool = StringPool::new();
//! let tokens = tokenize("x + 1", &mut pool);
//! assert_eq!(tokens.len(), 4); // x, +, 1, EOF
//! assert_eq!(tokens[3].kind(), TokenKind::Eof);
//! ```

use crate::intern::{StringPool, Symbol};

use super::{Span, Token, TokenKind};

/// A lexer that tokenizes Luma source code.
///
/// Implements [`Iterator`] for easy consumption; the iterator ends
/// *before* the EOF token. Use [`tokenize`] to get the full stream the
/// parser expects (terminated by exactly one EOF token).
pub struct Lexer<'src, 'pool> {
    /// The source text being lexed.
    source: &'src [u8],
    /// Byte offset where the current token started.
    start: usize,
    /// Current byte position in source.
    position: usize,
    /// Current 1-based line number.
    line: u32,
    /// Lexeme storage shared with the parser.
    pool: &'pool mut StringPool,
}

impl std::fmt::Debug for Lexer<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

impl<'src, 'pool> Lexer<'src, 'pool> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str, pool: &'pool mut StringPool) -> Self {
        Self {
            source: source.as_bytes(),
            start: 0,
            position: 0,
            line: 1,
            pool,
        }
    }

    /// Peeks at the next byte without consuming it.
    fn peek(&self) -> Option<u8> {
        self.source.get(self.position).copied()
    }

    /// Peeks `n` bytes past the next one (`peek_at(0)` == `peek()`).
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.source.get(self.position + n).copied()
    }

    /// Consumes the next byte and returns it, counting newlines.
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.position += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    /// Consumes bytes while the predicate holds.
    fn bump_while(&mut self, predicate: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    /// The lexeme of the token currently being formed.
    fn lexeme(&self) -> &'src [u8] {
        &self.source[self.start..self.position]
    }

    /// Lexes the next token. At end of input this returns the EOF
    /// token, over and over.
    pub(super) fn lex_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.position;
        let line = self.line;

        let (kind, text) = match self.peek() {
            None => (TokenKind::Eof, Some(Symbol::EMPTY)),
            Some(b) => self.scan(b),
        };

        let text = match text {
            Some(sym) => sym,
            None => self.pool.intern(&self.source[self.start..self.position]),
        };
        Token::new(kind, text, line, Span::from(self.start..self.position))
    }

    /// Skips whitespace and comments, counting newlines.
    ///
    /// `--` begins a comment: a long-bracket opener directly after it
    /// makes a long comment (terminated by the matching closer),
    /// anything else a line comment. An unterminated long comment
    /// silently runs to end of input.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.bump();
                    self.bump();
                    if let Some(level) = self.long_bracket_level() {
                        self.skip_long_comment(level);
                    } else {
                        self.bump_while(|b| b != b'\n');
                    }
                }
                _ => break,
            }
        }
    }

    /// If the scanner sits on a long-bracket opener (`[` + `=`* + `[`),
    /// returns its level (the number of `=` signs) without consuming.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek() != Some(b'[') {
            return None;
        }
        let mut level = 0;
        while self.peek_at(1 + level) == Some(b'=') {
            level += 1;
        }
        (self.peek_at(1 + level) == Some(b'[')).then_some(level)
    }

    /// Returns `true` if the scanner sits on the closer for a
    /// long bracket of the given level (`]` + `=`*level + `]`).
    fn at_long_bracket_close(&self, level: usize) -> bool {
        if self.peek() != Some(b']') {
            return false;
        }
        for i in 0..level {
            if self.peek_at(1 + i) != Some(b'=') {
                return false;
            }
        }
        self.peek_at(1 + level) == Some(b']')
    }

    /// Skips a long-bracket comment body, opener included.
    fn skip_long_comment(&mut self, level: usize) {
        for _ in 0..level + 2 {
            self.bump();
        }
        loop {
            if self.at_long_bracket_close(level) {
                for _ in 0..level + 2 {
                    self.bump();
                }
                return;
            }
            if self.bump().is_none() {
                return;
            }
        }
    }

    /// Dispatches on the first byte of a token.
    fn scan(&mut self, b: u8) -> (TokenKind, Option<Symbol>) {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => (self.lex_identifier_or_keyword(), None),
            b'0'..=b'9' => (self.lex_number(), None),
            b'"' | b'\'' => self.lex_quoted_string(b),

            b'[' => {
                if let Some(level) = self.long_bracket_level() {
                    self.lex_long_string(level)
                } else {
                    self.single(TokenKind::LeftBracket)
                }
            }

            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'{' => self.single(TokenKind::LeftBrace),
            b'}' => self.single(TokenKind::RightBrace),
            b']' => self.single(TokenKind::RightBracket),
            b',' => self.single(TokenKind::Comma),
            b':' => self.single(TokenKind::Colon),
            b';' => self.single(TokenKind::Semicolon),
            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Minus),
            b'*' => self.single(TokenKind::Star),
            b'/' => self.single(TokenKind::Slash),
            b'%' => self.single(TokenKind::Percent),
            b'^' => self.single(TokenKind::Caret),
            b'#' => self.single(TokenKind::Hash),
            b'|' => self.single(TokenKind::Pipe),

            b'=' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    (TokenKind::EqualEqual, None)
                } else {
                    (TokenKind::Equal, None)
                }
            }
            b'~' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    (TokenKind::NotEqual, None)
                } else {
                    self.error_token("Unexpected character '~'")
                }
            }
            b'<' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    (TokenKind::LessEqual, None)
                } else {
                    (TokenKind::Less, None)
                }
            }
            b'>' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    (TokenKind::GreaterEqual, None)
                } else {
                    (TokenKind::Greater, None)
                }
            }
            b'.' => {
                self.bump();
                if self.peek() == Some(b'.') {
                    self.bump();
                    if self.peek() == Some(b'.') {
                        self.bump();
                        (TokenKind::DotDotDot, None)
                    } else {
                        (TokenKind::DotDot, None)
                    }
                } else {
                    (TokenKind::Dot, None)
                }
            }

            _ => {
                self.bump();
                if b.is_ascii_graphic() {
                    let msg = format!("Unexpected character '{}'", b as char);
                    self.error_token(&msg)
                } else {
                    self.error_token("Unexpected character")
                }
            }
        }
    }

    /// Consumes one byte and yields a fixed token kind.
    fn single(&mut self, kind: TokenKind) -> (TokenKind, Option<Symbol>) {
        self.bump();
        (kind, None)
    }

    /// Interns an error message as the token text.
    fn error_token(&mut self, message: &str) -> (TokenKind, Option<Symbol>) {
        (TokenKind::Error, Some(self.pool.intern_str(message)))
    }

    /// Lexes an identifier, then checks the keyword table.
    fn lex_identifier_or_keyword(&mut self) -> TokenKind {
        self.bump_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        TokenKind::keyword(self.lexeme()).unwrap_or(TokenKind::Identifier)
    }

    /// Lexes a numeric literal: digits with an optional fractional
    /// part. The `.` is only consumed when a digit follows, and
    /// exponent notation is not recognized.
    fn lex_number(&mut self) -> TokenKind {
        self.bump_while(|b| b.is_ascii_digit());
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
            self.bump_while(|b| b.is_ascii_digit());
        }
        TokenKind::Number
    }

    /// Lexes a quoted string, decoding escapes into the token text.
    fn lex_quoted_string(&mut self, quote: u8) -> (TokenKind, Option<Symbol>) {
        self.bump();
        let mut content = Vec::new();

        loop {
            match self.peek() {
                None => return self.error_token("Unterminated string"),
                Some(q) if q == quote => {
                    self.bump();
                    break;
                }
                Some(b'\\') => {
                    self.bump();
                    match self.peek() {
                        None => return self.error_token("Unterminated string"),
                        Some(b'a') => {
                            self.bump();
                            content.push(0x07);
                        }
                        Some(b'b') => {
                            self.bump();
                            content.push(0x08);
                        }
                        Some(b'f') => {
                            self.bump();
                            content.push(0x0C);
                        }
                        Some(b'n') => {
                            self.bump();
                            content.push(b'\n');
                        }
                        Some(b'r') => {
                            self.bump();
                            content.push(b'\r');
                        }
                        Some(b't') => {
                            self.bump();
                            content.push(b'\t');
                        }
                        Some(b'v') => {
                            self.bump();
                            content.push(0x0B);
                        }
                        Some(b'0'..=b'9') => {
                            let mut value: u32 = 0;
                            let mut digits = 0;
                            while digits < 3 {
                                let Some(d @ b'0'..=b'9') = self.peek() else {
                                    break;
                                };
                                self.bump();
                                value = value * 10 + u32::from(d - b'0');
                                digits += 1;
                            }
                            if value > 255 {
                                return self.error_token("Decimal escape too large");
                            }
                            #[expect(
                                clippy::cast_possible_truncation,
                                reason = "value checked to fit a byte above"
                            )]
                            content.push(value as u8);
                        }
                        // An escaped line break is a literal newline.
                        Some(b'\n') => {
                            self.bump();
                            content.push(b'\n');
                        }
                        // Unknown escapes pass the character through.
                        Some(other) => {
                            self.bump();
                            content.push(other);
                        }
                    }
                }
                Some(c) => {
                    self.bump();
                    content.push(c);
                }
            }
        }

        (TokenKind::String, Some(self.pool.intern(&content)))
    }

    /// Lexes a long-bracket string of the given level. The scanner sits
    /// on a verified opener. Content is taken verbatim; a single
    /// newline directly after the opener is elided.
    fn lex_long_string(&mut self, level: usize) -> (TokenKind, Option<Symbol>) {
        for _ in 0..level + 2 {
            self.bump();
        }
        if self.peek() == Some(b'\n') {
            self.bump();
        }

        let mut content = Vec::new();
        loop {
            if self.at_long_bracket_close(level) {
                for _ in 0..level + 2 {
                    self.bump();
                }
                return (TokenKind::String, Some(self.pool.intern(&content)));
            }
            match self.bump() {
                None => return self.error_token("Unterminated long string"),
                Some(b) => content.push(b),
            }
        }
    }
}

impl Iterator for Lexer<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.lex_token();
        if token.kind().is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

/// Tokenizes a complete source buffer.
///
/// The returned stream always ends with exactly one [`TokenKind::Eof`]
/// token. Lexical errors appear in-band as [`TokenKind::Error`] tokens
/// and do not stop tokenization.
#[must_use]
pub fn tokenize(source: &str, pool: &mut StringPool) -> Vec<Token> {
    let mut lexer = Lexer::new(source, pool);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex_token();
        let is_eof = token.kind().is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut pool = StringPool::new();
        tokenize(source, &mut pool)
            .iter()
            .map(|t| t.kind())
            .collect()
    }

    fn texts(source: &str) -> Vec<Vec<u8>> {
        let mut pool = StringPool::new();
        tokenize(source, &mut pool)
            .iter()
            .map(|t| pool.resolve(t.text()).to_vec())
            .collect()
    }

    #[test]
    fn empty_source_is_one_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \t\r\n  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("local x elseif ends"),
            vec![
                TokenKind::Local,
                TokenKind::Identifier,
                TokenKind::Elseif,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("= == ~= < <= > >= .. ... . + - * / % ^ # |"),
            vec![
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::DotDot,
                TokenKind::DotDotDot,
                TokenKind::Dot,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Caret,
                TokenKind::Hash,
                TokenKind::Pipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lone_tilde_is_an_error() {
        let mut pool = StringPool::new();
        let tokens = tokenize("a ~ b", &mut pool);
        assert_eq!(tokens[1].kind(), TokenKind::Error);
        assert_eq!(pool.resolve(tokens[1].text()), b"Unexpected character '~'");
        // Tokenization continues past the error.
        assert_eq!(tokens[2].kind(), TokenKind::Identifier);
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 3.14 5."),
            vec![
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
        assert_eq!(texts("42 3.14")[0], b"42");
        assert_eq!(texts("42 3.14")[1], b"3.14");
    }

    #[test]
    fn number_dot_dot_is_concat() {
        // `1..2` must not swallow the dots into the number.
        assert_eq!(
            kinds("1..2"),
            vec![
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn quoted_strings_decode_escapes() {
        assert_eq!(texts(r#""a\nb""#)[0], b"a\nb");
        assert_eq!(texts(r#""tab\there""#)[0], b"tab\there");
        assert_eq!(texts(r#""q\"q""#)[0], b"q\"q");
        assert_eq!(texts(r"'it\'s'")[0], b"it's");
        // Unknown escapes pass through.
        assert_eq!(texts(r#""\q""#)[0], b"q");
        // The full single-character set.
        assert_eq!(
            texts(r#""\a\b\f\n\r\t\v\\""#)[0],
            vec![0x07, 0x08, 0x0C, b'\n', b'\r', b'\t', 0x0B, b'\\'],
        );
    }

    #[test]
    fn decimal_escapes() {
        assert_eq!(texts(r#""\65""#)[0], b"A");
        assert_eq!(texts(r#""\0659""#)[0], b"A9");
        assert_eq!(texts(r#""\255""#)[0], vec![255u8]);
        assert_eq!(texts(r#""\0""#)[0], vec![0u8]);

        let mut pool = StringPool::new();
        let tokens = tokenize(r#""\256""#, &mut pool);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert_eq!(pool.resolve(tokens[0].text()), b"Decimal escape too large");
    }

    #[test]
    fn escaped_newline_is_literal_newline() {
        let mut pool = StringPool::new();
        let tokens = tokenize("\"a\\\nb\" x", &mut pool);
        assert_eq!(tokens[0].kind(), TokenKind::String);
        assert_eq!(pool.resolve(tokens[0].text()), b"a\nb");
        // The line counter advanced past the escaped newline.
        assert_eq!(tokens[1].line(), 2);
    }

    #[test]
    fn bare_newline_inside_string_is_kept() {
        let mut pool = StringPool::new();
        let tokens = tokenize("\"a\nb\" x", &mut pool);
        assert_eq!(pool.resolve(tokens[0].text()), b"a\nb");
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].line(), 2);
    }

    #[test]
    fn unterminated_string() {
        let mut pool = StringPool::new();
        let tokens = tokenize("\"abc", &mut pool);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert_eq!(pool.resolve(tokens[0].text()), b"Unterminated string");
        assert_eq!(tokens[1].kind(), TokenKind::Eof);
    }

    #[test]
    fn long_strings() {
        assert_eq!(texts("[[hello]]")[0], b"hello");
        assert_eq!(texts("[=[a]b]=]")[0], b"a]b");
        // Inner closers of a different level do not terminate.
        assert_eq!(texts("[==[ hello ]=] ]==]")[0], b" hello ]=] ");
    }

    #[test]
    fn long_string_elides_first_newline() {
        assert_eq!(texts("[[\nhello]]")[0], b"hello");
        // Only the first one.
        assert_eq!(texts("[[\n\nhello]]")[0], b"\nhello");
    }

    #[test]
    fn unterminated_long_string() {
        let mut pool = StringPool::new();
        let tokens = tokenize("[=[abc]]", &mut pool);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert_eq!(pool.resolve(tokens[0].text()), b"Unterminated long string");
    }

    #[test]
    fn line_comments() {
        assert_eq!(
            kinds("a -- the rest is ignored ~ \" \nb"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn long_comments() {
        let mut pool = StringPool::new();
        let tokens = tokenize("a --[[ line\nline ]] b", &mut pool);
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].kind(), TokenKind::Identifier);
        assert_eq!(tokens[1].line(), 2);

        // A `--[` without a full opener is a plain line comment.
        assert_eq!(
            kinds("a --[ not long\nb"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_long_comment_runs_to_eof() {
        assert_eq!(
            kinds("a --[==[ never closed ]] ]=]"),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn line_numbers_are_monotonic() {
        let mut pool = StringPool::new();
        let source = "local a;\nlocal b;\n\nreturn a .. b;\n";
        let tokens = tokenize(source, &mut pool);
        for pair in tokens.windows(2) {
            assert!(pair[0].line() <= pair[1].line());
        }
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens.last().unwrap().line(), 5);
    }

    #[test]
    fn equal_lexemes_share_a_symbol() {
        let mut pool = StringPool::new();
        let tokens = tokenize("foo + foo", &mut pool);
        assert_eq!(tokens[0].text(), tokens[2].text());
        assert_ne!(tokens[0].text(), tokens[1].text());
    }

    #[test]
    fn string_and_identifier_with_same_content_share_a_symbol() {
        let mut pool = StringPool::new();
        let tokens = tokenize("abc \"abc\"", &mut pool);
        assert_eq!(tokens[0].text(), tokens[1].text());
    }

    #[test]
    fn iterator_excludes_eof() {
        let mut pool = StringPool::new();
        let tokens: Vec<_> = Lexer::new("x + 1", &mut pool).collect();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn eof_is_unique() {
        for source in ["", ";", "local x = 1;", "\"unterminated", "~"] {
            let mut pool = StringPool::new();
            let tokens = tokenize(source, &mut pool);
            let eof_count = tokens.iter().filter(|t| t.kind().is_eof()).count();
            assert_eq!(eof_count, 1, "source: {source:?}");
            assert!(tokens.last().unwrap().kind().is_eof());
        }
    }

    #[test]
    fn spans_slice_the_source() {
        let mut pool = StringPool::new();
        let source = "local answer = 42;";
        let tokens = tokenize(source, &mut pool);
        assert_eq!(&source[tokens[1].span().as_range()], "answer");
        assert_eq!(&source[tokens[3].span().as_range()], "42");
    }
}
