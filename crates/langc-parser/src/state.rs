use langc_common::{FileRange, Token, TokenKind};

use crate::error::ParseError;

pub type ParseResult<T> = Result<T, ParseError>;

/// A position over a module's token stream, the state every production
/// mutates (§4.3).
///
/// Trivia (`Comment`, `Whitespace`) never reaches here: the lexer's
/// `Mode::Ignore` elides it before the parser sees the stream. `Newline` and
/// `Semi` tokens *do* reach here and are handled explicitly where the
/// grammar needs them (statement separators inside blocks).
pub struct ParseState<'t> {
    tokens: &'t [Token],
    pos: usize,
    eof: Token,
}

/// An opaque snapshot of [`ParseState::pos`], restored on backtrack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

impl<'t> ParseState<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let eof_range = tokens
            .last()
            .map(|t| t.range.clone())
            .unwrap_or_else(|| FileRange::empty_at(langc_common::FilePosition::start_of("")));
        let eof = Token::new(TokenKind::Eof, eof_range, "");
        Self { tokens, pos: 0, eof }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    pub fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub fn nth(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub fn at_image(&self, image: &str) -> bool {
        self.current().image == image
    }

    pub fn is_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// Skip any run of `Newline`/`Semi` tokens (statement separators).
    pub fn skip_separators(&mut self) {
        while self.at(TokenKind::Newline) || self.at(TokenKind::Semi) {
            self.bump();
        }
    }

    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current().range.clone())
    }
}
