use serde::Serialize;

use crate::span::FileRange;

/// The decoded payload a literal token carries alongside its raw image.
///
/// Computed once at lex time (§4.2) so the parser and checker never need to
/// re-parse the source text of a literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    Integer(i128),
    Float(f64),
    Str(String),
    Char(char),
}

/// Every kind of token the lexer produces.
///
/// `Reserved` covers all keywords; which keyword a `Reserved` token is can
/// always be recovered from its `image`, so there is no per-keyword variant
/// here (that would just duplicate [`RESERVED_WORDS`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Comment,
    Ident,
    Reserved,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    CharacterLiteral,
    /// A maximal run of operator characters (`~!$%^&*+-=|<>?/`), with `<`
    /// and `>` always lexed singly (§4.2 rule 8).
    Oper,
    /// One of the fixed single-character/two-character punctuation forms:
    /// `: { } ( ) [ ] , = \` . =>`.
    Symbol,
    Whitespace,
    Newline,
    /// `;`, split out of `Symbol` since the parser treats statement
    /// termination specially (§4.2 rule 7).
    Semi,
    Eof,
}

/// A single lexed token.
///
/// `image` is a verbatim copy of the source span the token covers (so
/// concatenating every token's image in `raw` mode reconstructs the source,
/// per testable property P1). `value` is populated only for literal kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub range: FileRange,
    pub image: String,
    pub value: Option<TokenValue>,
}

impl Token {
    pub fn new(kind: TokenKind, range: FileRange, image: impl Into<String>) -> Self {
        Self { kind, range, image: image.into(), value: None }
    }

    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether this token kind is trivia that `ignore` mode elides.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::Whitespace)
    }
}

/// The complete reserved-word vocabulary (§4.2 rule 3), grouped as the
/// spec groups them: type keywords, control keywords, declaration
/// keywords, and the two boolean literals.
pub const RESERVED_WORDS: &[&str] = &[
    // type keywords
    "int", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "byte", "short", "integer",
    "long", "f32", "f64", "float", "double", "char", "string", "bool", "void", "any",
    // control keywords
    "if", "else", "while", "do", "for", "in", "break", "continue", "return", "throw", "try",
    "catch", "finally",
    // declaration keywords
    "func", "type", "const", "import", "export", "default", "from", "as",
    // literals
    "true", "false",
];

/// Whether `word` is one of the language's reserved words.
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FilePosition;

    fn range(file: &str) -> FileRange {
        let start = FilePosition::start_of(file);
        let end = start.advance('x');
        FileRange::new(start, end)
    }

    #[test]
    fn token_carries_verbatim_image() {
        let tok = Token::new(TokenKind::Ident, range("a.lang"), "foo");
        assert_eq!(tok.image, "foo");
        assert!(tok.value.is_none());
    }

    #[test]
    fn with_value_attaches_parsed_payload() {
        let tok = Token::new(TokenKind::IntegerLiteral, range("a.lang"), "42")
            .with_value(TokenValue::Integer(42));
        assert_eq!(tok.value, Some(TokenValue::Integer(42)));
    }

    #[test]
    fn trivia_kinds_are_comment_and_whitespace_only() {
        assert!(Token::new(TokenKind::Comment, range("a.lang"), "# x").is_trivia());
        assert!(Token::new(TokenKind::Whitespace, range("a.lang"), " ").is_trivia());
        assert!(!Token::new(TokenKind::Newline, range("a.lang"), "\n").is_trivia());
        assert!(!Token::new(TokenKind::Ident, range("a.lang"), "x").is_trivia());
    }

    #[test]
    fn is_reserved_word_recognizes_all_categories() {
        for kw in ["int", "i64", "bool", "any", "if", "finally", "func", "from", "true", "false"] {
            assert!(is_reserved_word(kw), "{kw} should be reserved");
        }
        assert!(!is_reserved_word("foo"));
        assert!(!is_reserved_word(""));
    }

    #[test]
    fn reserved_words_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for word in RESERVED_WORDS {
            assert!(seen.insert(*word), "duplicate reserved word: {word}");
        }
    }
}
