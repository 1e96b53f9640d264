//! Tokenizer for the language frontend.
//!
//! [`Lexer`] wraps a [`CharStream`] and implements
//! `Iterator<Item = Result<Token, LexError>>`, so callers can pull tokens
//! lazily or collect them with [`Lexer::tokenize`]. A lex error halts the
//! iterator: the next call to `next` returns `None` rather than retrying.

mod cursor;

use std::path::PathBuf;

use cursor::CharStream;
use langc_common::{is_reserved_word, FilePosition, FileRange, LexError, LexErrorKind, Token, TokenKind, TokenValue};

/// The leading characters of the fixed punctuation forms (§4.2 rule 7).
/// `;` is included here only for dispatch; it produces its own `Semi` kind.
const SYMBOL_CHARS: &str = ":{}()[],=`.;";

/// The full operator character set (§4.2 rule 8). `=` also appears in
/// [`SYMBOL_CHARS`] and is dispatched there first, per rule ordering.
const OPER_CHARS: &str = "~!$%^&*+-=|<>?/";

fn is_oper_char(c: char) -> bool {
    OPER_CHARS.contains(c)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `Comment`/`Whitespace` tokens are elided (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Default: elide `Comment` and `Whitespace`.
    Ignore,
    /// Every token, including trivia, is yielded (needed for property P1).
    Raw,
}

/// The tokenizer. Converts source text into a stream of tokens terminated
/// by a single `Eof`.
pub struct Lexer<'src> {
    stream: CharStream<'src>,
    mode: Mode,
    halted: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(file: impl Into<PathBuf>, source: &'src str, mode: Mode) -> Self {
        Self { stream: CharStream::new(file, source), mode, halted: false }
    }

    /// Tokenize `source` to completion, stopping at the first lex error.
    ///
    /// The returned vector includes the final `Eof` token on success.
    pub fn tokenize(file: impl Into<PathBuf>, source: &'src str, mode: Mode) -> Result<Vec<Token>, LexError> {
        Lexer::new(file, source, mode).collect()
    }

    fn adv(&mut self, image: &mut String) -> char {
        let c = self.advance_stream();
        image.push(c);
        c
    }

    fn advance_stream(&mut self) -> char {
        let (c, next) = self.stream.read().expect("advance_stream called at end-of-file");
        self.stream = next;
        c
    }

    fn range_from(&self, start: &FilePosition) -> FileRange {
        FileRange::new(start.clone(), self.stream.position().clone())
    }

    fn next_raw(&mut self) -> Option<Result<Token, LexError>> {
        if self.halted {
            return None;
        }
        if self.stream.is_eof() {
            self.halted = true;
            let pos = self.stream.position().clone();
            return Some(Ok(Token::new(TokenKind::Eof, FileRange::empty_at(pos), "")));
        }

        let start = self.stream.position().clone();
        let c = self.stream.first();

        let result = if c == '/' && self.stream.peek_second() == Some('/') {
            Ok(self.lex_line_comment(start))
        } else if c == '/' && self.stream.peek_second() == Some('*') {
            self.lex_block_comment(start)
        } else if is_ident_start(c) {
            Ok(self.lex_ident(start))
        } else if c.is_ascii_digit() {
            Ok(self.lex_number(start))
        } else if c == '"' {
            self.lex_string(start)
        } else if c == '\'' {
            self.lex_char(start)
        } else if SYMBOL_CHARS.contains(c) {
            Ok(self.lex_symbol_or_operator(start, c))
        } else if is_oper_char(c) {
            Ok(self.lex_operator(start, c))
        } else if c == '\n' || c == '\r' {
            Ok(self.lex_newline(start))
        } else if c == ' ' || c == '\t' {
            Ok(self.lex_whitespace(start))
        } else {
            self.advance_stream();
            Err(LexError::new(LexErrorKind::InvalidCharacter(c), self.range_from(&start)))
        };

        if result.is_err() {
            self.halted = true;
        }
        Some(result)
    }

    // ── Comments (rules 1, 2) ──────────────────────────────────────────

    fn lex_line_comment(&mut self, start: FilePosition) -> Token {
        let mut image = String::new();
        self.adv(&mut image);
        self.adv(&mut image);
        while let Some(c) = self.stream.peek() {
            if c == '\n' {
                break;
            }
            self.adv(&mut image);
        }
        Token::new(TokenKind::Comment, self.range_from(&start), image)
    }

    fn lex_block_comment(&mut self, start: FilePosition) -> Result<Token, LexError> {
        let mut image = String::new();
        self.adv(&mut image);
        self.adv(&mut image);
        loop {
            match self.stream.peek() {
                None => return Err(LexError::new(LexErrorKind::UnterminatedComment, self.range_from(&start))),
                Some('*') if self.stream.peek_second() == Some('/') => {
                    self.adv(&mut image);
                    self.adv(&mut image);
                    break;
                }
                Some(_) => {
                    self.adv(&mut image);
                }
            }
        }
        Ok(Token::new(TokenKind::Comment, self.range_from(&start), image))
    }

    // ── Identifiers and reserved words (rule 3) ────────────────────────

    fn lex_ident(&mut self, start: FilePosition) -> Token {
        let mut image = String::new();
        self.adv(&mut image);
        while let Some(c) = self.stream.peek() {
            if is_ident_continue(c) {
                self.adv(&mut image);
            } else {
                break;
            }
        }
        let kind = if is_reserved_word(&image) { TokenKind::Reserved } else { TokenKind::Ident };
        Token::new(kind, self.range_from(&start), image)
    }

    // ── Numeric literals (rule 4, §4.2.1) ──────────────────────────────

    fn lex_number(&mut self, start: FilePosition) -> Token {
        let first = self.advance_stream();

        if first == '0' {
            match self.stream.peek() {
                Some('x') | Some('X') => return self.lex_radix_int(start, |c| c.is_ascii_hexdigit(), 16),
                Some('b') | Some('B') => return self.lex_radix_int(start, |c| c == '0' || c == '1', 2),
                _ => {}
            }
        }

        let mut image = String::from(first);
        while let Some(c) = self.stream.peek() {
            if c.is_ascii_digit() {
                self.adv(&mut image);
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.stream.peek() == Some('.') && self.stream.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.adv(&mut image);
            while let Some(c) = self.stream.peek() {
                if c.is_ascii_digit() {
                    self.adv(&mut image);
                } else {
                    break;
                }
            }
        }
        if matches!(self.stream.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.adv(&mut image);
            if matches!(self.stream.peek(), Some('+') | Some('-')) {
                self.adv(&mut image);
            }
            while let Some(c) = self.stream.peek() {
                if c.is_ascii_digit() {
                    self.adv(&mut image);
                } else {
                    break;
                }
            }
        }

        let range = self.range_from(&start);
        if is_float {
            let value = image.parse::<f64>().unwrap_or(0.0);
            Token::new(TokenKind::FloatLiteral, range, image).with_value(TokenValue::Float(value))
        } else {
            let value = image.parse::<i128>().unwrap_or(0);
            Token::new(TokenKind::IntegerLiteral, range, image).with_value(TokenValue::Integer(value))
        }
    }

    fn lex_radix_int(&mut self, start: FilePosition, is_digit: impl Fn(char) -> bool, radix: u32) -> Token {
        let mut image = String::from(self.advance_stream());
        self.adv(&mut image);
        let mut digits = String::new();
        while let Some(c) = self.stream.peek() {
            if is_digit(c) {
                digits.push(c);
                self.adv(&mut image);
            } else {
                break;
            }
        }
        let value = i128::from_str_radix(&digits, radix).unwrap_or(0);
        Token::new(TokenKind::IntegerLiteral, self.range_from(&start), image).with_value(TokenValue::Integer(value))
    }

    // ── String and character literals (rules 5, 6, §4.2.2) ─────────────

    fn lex_string(&mut self, start: FilePosition) -> Result<Token, LexError> {
        let mut image = String::new();
        self.adv(&mut image);
        let mut value = String::new();
        loop {
            match self.stream.peek() {
                None => return Err(LexError::new(LexErrorKind::UnterminatedString, self.range_from(&start))),
                Some('"') => {
                    self.adv(&mut image);
                    break;
                }
                Some('\\') => {
                    self.adv(&mut image);
                    value.push(self.decode_escape(&mut image));
                }
                Some(_) => value.push(self.adv(&mut image)),
            }
        }
        let range = self.range_from(&start);
        Ok(Token::new(TokenKind::StringLiteral, range, image).with_value(TokenValue::Str(value)))
    }

    fn lex_char(&mut self, start: FilePosition) -> Result<Token, LexError> {
        let mut image = String::new();
        self.adv(&mut image);

        if self.stream.peek() == Some('\'') {
            self.adv(&mut image);
            return Err(LexError::new(LexErrorKind::EmptyCharacterLiteral, self.range_from(&start)));
        }

        let value = match self.stream.peek() {
            None => return Err(LexError::new(LexErrorKind::UnterminatedCharacter, self.range_from(&start))),
            Some('\\') => {
                self.adv(&mut image);
                self.decode_escape(&mut image)
            }
            Some(_) => self.adv(&mut image),
        };

        match self.stream.peek() {
            Some('\'') => {
                self.adv(&mut image);
                let range = self.range_from(&start);
                Ok(Token::new(TokenKind::CharacterLiteral, range, image).with_value(TokenValue::Char(value)))
            }
            // Either the literal is still open at EOF, or it holds more than
            // one character payload; both are an unterminated literal.
            _ => Err(LexError::new(LexErrorKind::UnterminatedCharacter, self.range_from(&start))),
        }
    }

    /// Decode one escape sequence (the introducing `\` has already been
    /// consumed into `image`); every character consumed is also appended to
    /// `image` so it stays a verbatim copy of the source.
    fn decode_escape(&mut self, image: &mut String) -> char {
        let Some(c) = self.stream.peek() else {
            return '\\';
        };
        match c {
            'n' => {
                self.adv(image);
                '\n'
            }
            'r' => {
                self.adv(image);
                '\r'
            }
            't' => {
                self.adv(image);
                '\t'
            }
            'f' => {
                self.adv(image);
                '\u{000C}'
            }
            'b' => {
                self.adv(image);
                '\u{0008}'
            }
            'v' => {
                self.adv(image);
                '\u{000B}'
            }
            'x' => {
                self.adv(image);
                let hex = self.eat_hex_digits(image, 2);
                u8::from_str_radix(&hex, 16).map(|b| b as char).unwrap_or('\u{FFFD}')
            }
            'u' => {
                self.adv(image);
                if self.stream.peek() == Some('{') {
                    self.adv(image);
                    let hex = self.eat_braced_hex_digits(image);
                    if self.stream.peek() == Some('}') {
                        self.adv(image);
                    }
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32).unwrap_or('\u{FFFD}')
                } else {
                    let hex = self.eat_hex_digits(image, 4);
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32).unwrap_or('\u{FFFD}')
                }
            }
            other => {
                self.adv(image);
                other
            }
        }
    }

    fn eat_hex_digits(&mut self, image: &mut String, n: usize) -> String {
        let mut digits = String::new();
        for _ in 0..n {
            match self.stream.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.adv(image);
                }
                _ => break,
            }
        }
        digits
    }

    fn eat_braced_hex_digits(&mut self, image: &mut String) -> String {
        let mut digits = String::new();
        while digits.len() < 6 {
            match self.stream.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.adv(image);
                }
                _ => break,
            }
        }
        digits
    }

    // ── Symbols and operators (rules 7, 8) ─────────────────────────────

    fn lex_symbol_or_operator(&mut self, start: FilePosition, c: char) -> Token {
        let mut image = String::new();
        self.adv(&mut image);

        if c == ';' {
            return Token::new(TokenKind::Semi, self.range_from(&start), image);
        }

        if c == '=' {
            match self.stream.peek() {
                Some('>') => {
                    self.adv(&mut image);
                    return Token::new(TokenKind::Symbol, self.range_from(&start), image);
                }
                Some(op) if op != '<' && op != '>' && is_oper_char(op) => {
                    self.eat_oper_run(&mut image);
                    return Token::new(TokenKind::Oper, self.range_from(&start), image);
                }
                _ => return Token::new(TokenKind::Symbol, self.range_from(&start), image),
            }
        }

        Token::new(TokenKind::Symbol, self.range_from(&start), image)
    }

    fn lex_operator(&mut self, start: FilePosition, first: char) -> Token {
        let mut image = String::new();
        self.adv(&mut image);
        if first != '<' && first != '>' {
            self.eat_oper_run(&mut image);
        }
        Token::new(TokenKind::Oper, self.range_from(&start), image)
    }

    /// Consume a maximal run of operator characters, excluding `<`/`>`
    /// (which are always lexed singly, rule 8), appending onto `image`.
    fn eat_oper_run(&mut self, image: &mut String) {
        while let Some(c) = self.stream.peek() {
            if c != '<' && c != '>' && is_oper_char(c) {
                self.adv(image);
            } else {
                break;
            }
        }
    }

    // ── Newlines and whitespace (rules 9, 10) ──────────────────────────

    fn lex_newline(&mut self, start: FilePosition) -> Token {
        let mut image = String::new();
        self.adv(&mut image);
        if image == "\r" && self.stream.peek() == Some('\n') {
            self.adv(&mut image);
        }
        Token::new(TokenKind::Newline, self.range_from(&start), image)
    }

    fn lex_whitespace(&mut self, start: FilePosition) -> Token {
        let mut image = String::new();
        while let Some(c) = self.stream.peek() {
            if c == ' ' || c == '\t' {
                self.adv(&mut image);
            } else {
                break;
            }
        }
        Token::new(TokenKind::Whitespace, self.range_from(&start), image)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.next_raw()?;
            match &next {
                Ok(tok) if self.mode == Mode::Ignore && tok.is_trivia() => continue,
                _ => return Some(next),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str, mode: Mode) -> Vec<TokenKind> {
        Lexer::tokenize("t.lang", source, mode).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_simple_declaration() {
        let ks = kinds("const x = 42", Mode::Ignore);
        assert_eq!(
            ks,
            vec![
                TokenKind::Reserved,
                TokenKind::Ident,
                TokenKind::Symbol,
                TokenKind::IntegerLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn ignore_mode_elides_comments_and_whitespace() {
        let ks = kinds("// hi\n   x", Mode::Ignore);
        assert_eq!(ks, vec![TokenKind::Newline, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn raw_mode_round_trips_the_source() {
        let source = "func f ( x : int ) { return x ; }\n";
        let tokens = Lexer::tokenize("t.lang", source, Mode::Raw).unwrap();
        let rebuilt: String = tokens.iter().filter(|t| t.kind != TokenKind::Eof).map(|t| t.image.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn angle_brackets_are_always_single_char_tokens() {
        let tokens = Lexer::tokenize("t.lang", "a<b>>c", Mode::Ignore).unwrap();
        let images: Vec<_> = tokens.iter().map(|t| t.image.as_str()).collect();
        assert_eq!(images, vec!["a", "<", "b", ">", ">", "c", ""]);
    }

    #[test]
    fn fat_arrow_is_one_symbol_token() {
        let tokens = Lexer::tokenize("t.lang", "x => y", Mode::Ignore).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Symbol);
        assert_eq!(tokens[1].image, "=>");
    }

    #[test]
    fn equals_followed_by_operator_char_falls_through_to_oper() {
        let tokens = Lexer::tokenize("t.lang", "x =~ y", Mode::Ignore).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Oper);
        assert_eq!(tokens[1].image, "=~");
    }

    #[test]
    fn bare_equals_is_a_symbol() {
        let tokens = Lexer::tokenize("t.lang", "x = y", Mode::Ignore).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Symbol);
        assert_eq!(tokens[1].image, "=");
    }

    #[test]
    fn semicolon_is_its_own_kind() {
        let tokens = Lexer::tokenize("t.lang", ";", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Semi);
    }

    #[test]
    fn operator_run_is_maximal_but_stops_before_angle_brackets() {
        let tokens = Lexer::tokenize("t.lang", "a !!<b", Mode::Ignore).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Oper);
        assert_eq!(tokens[1].image, "!!");
        assert_eq!(tokens[2].kind, TokenKind::Oper);
        assert_eq!(tokens[2].image, "<");
    }

    #[test]
    fn hex_and_binary_integer_literals() {
        let tokens = Lexer::tokenize("t.lang", "0xFF 0b101", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].value, Some(TokenValue::Integer(255)));
        assert_eq!(tokens[1].value, Some(TokenValue::Integer(5)));
    }

    #[test]
    fn float_literal_with_fraction_and_exponent() {
        let tokens = Lexer::tokenize("t.lang", "1.5e2", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[0].value, Some(TokenValue::Float(150.0)));
    }

    #[test]
    fn leading_zero_without_fraction_is_an_integer() {
        let tokens = Lexer::tokenize("t.lang", "0", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[0].value, Some(TokenValue::Integer(0)));
    }

    #[test]
    fn leading_zero_with_fraction_is_a_float() {
        let tokens = Lexer::tokenize("t.lang", "0.25", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[0].value, Some(TokenValue::Float(0.25)));
    }

    #[test]
    fn string_literal_decodes_escapes() {
        let tokens = Lexer::tokenize("t.lang", r#""a\nb\x41B""#, Mode::Ignore).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, Some(TokenValue::Str("a\nbAB".to_string())));
    }

    #[test]
    fn string_literal_unterminated_is_fatal() {
        let err = Lexer::tokenize("t.lang", "\"abc", Mode::Ignore).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn char_literal_with_braced_unicode_escape() {
        let tokens = Lexer::tokenize("t.lang", r"'\u{1F600}'", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].value, Some(TokenValue::Char('\u{1F600}')));
    }

    #[test]
    fn empty_char_literal_is_fatal() {
        let err = Lexer::tokenize("t.lang", "''", Mode::Ignore).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::EmptyCharacterLiteral);
    }

    #[test]
    fn char_literal_with_more_than_one_character_is_fatal() {
        let err = Lexer::tokenize("t.lang", "'ab'", Mode::Ignore).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedCharacter);
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = Lexer::tokenize("t.lang", "/* never closes", Mode::Ignore).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn invalid_character_is_fatal() {
        let err = Lexer::tokenize("t.lang", "x @ y", Mode::Ignore).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidCharacter('@'));
    }

    #[test]
    fn reserved_words_are_distinguished_from_idents() {
        let tokens = Lexer::tokenize("t.lang", "if foo", Mode::Ignore).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Reserved);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn lexer_halts_after_an_error() {
        let mut lexer = Lexer::new("t.lang", "@", Mode::Ignore);
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }
}
