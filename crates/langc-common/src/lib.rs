//! Shared types for the language frontend: source positions, diagnostics,
//! and the token vocabulary common to the lexer and parser.

pub mod error;
pub mod span;
pub mod token;

pub use error::{Diagnostic, LexError, LexErrorKind, Severity};
pub use span::{FilePosition, FileRange};
pub use token::{is_reserved_word, Token, TokenKind, TokenValue, RESERVED_WORDS};
