//! The four parser-combinator primitives plus `left_recursive` (§4.3).
//!
//! Every grammar production (`grammar/`) is built from these. A production
//! itself is just a `Fn(&mut ParseState) -> ParseResult<T>` — there's no
//! separate "parser" struct to wrap; Rust functions already are the
//! combinator primitives' natural representation.

use std::rc::Rc;

use crate::state::{Mark, ParseResult, ParseState};
use langc_common::{Token, TokenKind};

/// A boxed, clonable parse function, suitable for storing in the
/// forward-reference cells the mutually recursive grammar wiring needs
/// (`grammar::environment`).
pub type ParseFn<T> = Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>;

/// Consume one token of the given `kind`. Position is untouched on failure.
pub fn token(state: &mut ParseState, kind: TokenKind) -> ParseResult<Token> {
    if state.at(kind) {
        Ok(state.bump())
    } else {
        Err(state.error(format!("expected {kind:?}")))
    }
}

/// Consume one token whose verbatim image matches `literal` exactly (used
/// for reserved words and fixed symbols/operators, e.g. `token_image(s,
/// "func")`).
pub fn token_image(state: &mut ParseState, literal: &str) -> ParseResult<Token> {
    if state.at_image(literal) {
        Ok(state.bump())
    } else {
        Err(state.error(format!("expected `{literal}`")))
    }
}

/// Run `body`, restoring position if it fails. All grammar productions that
/// chain several sub-parses use this so a partial match never leaves the
/// cursor advanced past the entry point.
pub fn sequence<T>(state: &mut ParseState, body: impl FnOnce(&mut ParseState) -> ParseResult<T>) -> ParseResult<T> {
    let start = state.mark();
    body(state).map_err(|e| {
        state.reset(start);
        e
    })
}

/// Ordered choice: try each alternative in turn, returning the first
/// success. Position is restored between failed attempts.
pub fn select<T>(state: &mut ParseState, alternatives: &[&dyn Fn(&mut ParseState) -> ParseResult<T>]) -> ParseResult<T> {
    let start = state.mark();
    let mut last_err = None;
    for alt in alternatives {
        state.reset(start);
        match alt(state) {
            Ok(v) => return Ok(v),
            Err(e) => last_err = Some(e),
        }
    }
    state.reset(start);
    Err(last_err.unwrap_or_else(|| state.error("no alternative matched")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ZeroOrMore,
    OneOrMore,
}

/// Zero-or-more (`*`) or one-or-more (`+`) repetition of `item`, with an
/// optional separator (matched by verbatim image, e.g. `","`) required
/// between items.
pub fn repeat<T>(
    state: &mut ParseState,
    cardinality: Cardinality,
    separator: Option<&str>,
    item: impl Fn(&mut ParseState) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    let mut items = Vec::new();
    loop {
        let before = state.mark();
        match item(state) {
            Ok(v) => items.push(v),
            Err(e) => {
                state.reset(before);
                if items.is_empty() && cardinality == Cardinality::OneOrMore {
                    return Err(e);
                }
                break;
            }
        }
        if let Some(sep) = separator {
            let before_sep = state.mark();
            if token_image(state, sep).is_err() {
                state.reset(before_sep);
                break;
            }
        }
    }
    Ok(items)
}

/// Attempt `item`; on failure, produce `None` and consume nothing.
pub fn optional<T>(state: &mut ParseState, item: impl Fn(&mut ParseState) -> ParseResult<T>) -> Option<T> {
    let before = state.mark();
    match item(state) {
        Ok(v) => Some(v),
        Err(_) => {
            state.reset(before);
            None
        }
    }
}

/// Parse one of `bases`, then fold any number of `suffixes` onto it.
///
/// Each suffix is given the accumulated node and returns a replacement; the
/// loop stops the first time no suffix matches, or (P3) the first time a
/// successful suffix fails to advance the cursor, which guarantees
/// termination over any finite token stream regardless of grammar bugs.
pub fn left_recursive<T>(
    state: &mut ParseState,
    bases: &[&dyn Fn(&mut ParseState) -> ParseResult<T>],
    suffixes: &[&dyn Fn(&mut ParseState, &T) -> ParseResult<T>],
) -> ParseResult<T> {
    let mut node = select(state, bases)?;
    loop {
        let before = state.mark();
        let mut advanced = false;
        let mut matched = None;
        for suffix in suffixes {
            state.reset(before);
            if let Ok(next) = suffix(state, &node) {
                advanced = state.mark() != before;
                matched = Some(next);
                break;
            }
        }
        match matched {
            Some(next) if advanced => node = next,
            _ => {
                state.reset(before);
                break;
            }
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_common::{FilePosition, FileRange, TokenValue};

    fn ident_tokens(names: &[&str]) -> Vec<Token> {
        names
            .iter()
            .map(|n| {
                let start = FilePosition::start_of("t.lang");
                let end = start.advance('x');
                Token::new(TokenKind::Ident, FileRange::new(start, end), *n)
            })
            .collect()
    }

    #[test]
    fn token_succeeds_and_advances() {
        let tokens = ident_tokens(&["foo"]);
        let mut state = ParseState::new(&tokens);
        let tok = token(&mut state, TokenKind::Ident).unwrap();
        assert_eq!(tok.image, "foo");
        assert!(state.is_eof());
    }

    #[test]
    fn token_failure_does_not_advance() {
        let tokens = ident_tokens(&["foo"]);
        let mut state = ParseState::new(&tokens);
        assert!(token(&mut state, TokenKind::Symbol).is_err());
        assert!(token(&mut state, TokenKind::Ident).is_ok());
    }

    #[test]
    fn select_restores_position_on_each_failed_alternative() {
        let tokens = ident_tokens(&["foo"]);
        let mut state = ParseState::new(&tokens);
        let alt_symbol = |s: &mut ParseState| token(s, TokenKind::Symbol);
        let alt_ident = |s: &mut ParseState| token(s, TokenKind::Ident);
        let result = select(&mut state, &[&alt_symbol, &alt_ident]);
        assert_eq!(result.unwrap().image, "foo");
    }

    #[test]
    fn repeat_zero_or_more_stops_cleanly_at_end() {
        let tokens = ident_tokens(&["a", "b", "c"]);
        let mut state = ParseState::new(&tokens);
        let items = repeat(&mut state, Cardinality::ZeroOrMore, None, |s| token(s, TokenKind::Ident)).unwrap();
        assert_eq!(items.len(), 3);
        assert!(state.is_eof());
    }

    #[test]
    fn repeat_one_or_more_fails_on_zero_matches() {
        let tokens: Vec<Token> = Vec::new();
        let mut state = ParseState::new(&tokens);
        let result = repeat(&mut state, Cardinality::OneOrMore, None, |s| token(s, TokenKind::Ident));
        assert!(result.is_err());
    }

    #[test]
    fn optional_consumes_nothing_on_failure() {
        let tokens = ident_tokens(&["a"]);
        let mut state = ParseState::new(&tokens);
        let found = optional(&mut state, |s| token(s, TokenKind::Symbol));
        assert!(found.is_none());
        assert!(token(&mut state, TokenKind::Ident).is_ok());
    }

    #[test]
    fn left_recursive_terminates_when_no_suffix_advances() {
        // A pathological suffix that "succeeds" without consuming input must
        // not loop forever (P3).
        let tokens = ident_tokens(&["a"]);
        let mut state = ParseState::new(&tokens);
        let base = |s: &mut ParseState| token(s, TokenKind::Ident).map(|t| t.image);
        let noop_suffix = |_: &mut ParseState, acc: &String| -> ParseResult<String> { Ok(acc.clone()) };
        let result = left_recursive(&mut state, &[&base], &[&noop_suffix]);
        assert_eq!(result.unwrap(), "a");
    }

    #[test]
    fn left_recursive_folds_suffixes() {
        let tokens = ident_tokens(&["a", "b", "c"]);
        let mut state = ParseState::new(&tokens);
        let base = |s: &mut ParseState| token(s, TokenKind::Ident).map(|t| t.image);
        let suffix = |s: &mut ParseState, acc: &String| -> ParseResult<String> {
            let next = token(s, TokenKind::Ident)?;
            Ok(format!("{acc}{}", next.image))
        };
        let result = left_recursive(&mut state, &[&base], &[&suffix]);
        assert_eq!(result.unwrap(), "abc");
        assert!(state.is_eof());
    }

    #[test]
    fn token_value_is_preserved_through_bump() {
        let start = FilePosition::start_of("t.lang");
        let end = start.advance('1');
        let tok = Token::new(TokenKind::IntegerLiteral, FileRange::new(start, end), "1").with_value(TokenValue::Integer(1));
        let tokens = vec![tok];
        let mut state = ParseState::new(&tokens);
        let bumped = token(&mut state, TokenKind::IntegerLiteral).unwrap();
        assert_eq!(bumped.value, Some(TokenValue::Integer(1)));
    }
}
