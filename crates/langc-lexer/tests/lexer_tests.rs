use insta::assert_yaml_snapshot;
use langc_lexer::{Lexer, Mode};
use serde::Serialize;

/// A human-readable representation of a token for snapshot testing.
#[derive(Serialize)]
struct TokenSnapshot {
    kind: String,
    image: String,
}

fn tokenize_snapshot(source: &str, mode: Mode) -> Vec<TokenSnapshot> {
    Lexer::tokenize("snapshot.lang", source, mode)
        .expect("fixture must lex cleanly")
        .into_iter()
        .map(|tok| TokenSnapshot { kind: format!("{:?}", tok.kind), image: tok.image })
        .collect()
}

#[test]
fn test_reserved_words_and_idents() {
    let tokens = tokenize_snapshot("func add(x: int, y: int) int { return x + y; }", Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_numeric_literals() {
    let tokens = tokenize_snapshot("0 42 0x1F 0b1010 3.14 2e10 1.5e-3", Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_string_and_char_literals() {
    let tokens = tokenize_snapshot(r#""hi\n" 'a' '\t' '\u{1F600}'"#, Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_line_comment_elided_in_ignore_mode() {
    let tokens = tokenize_snapshot("// a comment\nx", Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_block_comment_raw_mode_keeps_trivia() {
    let tokens = tokenize_snapshot("/* block */ x", Mode::Raw);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_mixed_expression_operators() {
    let tokens = tokenize_snapshot("let result = add(1, 2) >= multiply(3, 4) && x != y", Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_generic_call_angle_brackets() {
    let tokens = tokenize_snapshot("identity<int>(1)", Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_fat_arrow_and_bare_equals() {
    let tokens = tokenize_snapshot("x = y => z", Mode::Ignore);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn test_raw_mode_round_trips_source() {
    let source = "const pi = 3.14 ; // approx\nfunc f ( ) { }\n";
    let tokens = Lexer::tokenize("t.lang", source, Mode::Raw).expect("lexes cleanly");
    let rebuilt: String = tokens.iter().filter(|t| t.kind != langc_common::TokenKind::Eof).map(|t| t.image.as_str()).collect();
    assert_eq!(rebuilt, source);
}

#[test]
fn test_unterminated_string_is_fatal() {
    let err = Lexer::tokenize("t.lang", "\"never closes", Mode::Ignore).unwrap_err();
    assert_eq!(err.kind, langc_common::LexErrorKind::UnterminatedString);
}
