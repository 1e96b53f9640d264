//! `Expression := Base Suffix*` (§4.4).
//!
//! Expressions recurse into [`TypeNode`] (call type-arguments, lambda
//! parameter types) directly — types never recurse back into expressions,
//! so there's no cycle there. They recurse into [`Statement`] only through
//! the forward-referenced `parse_statement` the environment supplies
//! (lambda bodies can be a block, and blocks contain expression statements,
//! closing the cycle `grammar::environment` exists to break).

use std::rc::Rc;

use langc_common::{TokenKind, TokenValue};

use crate::ast::{Expression, FunctionBody, Ident, LambdaParams, Param, Statement, TypeNode, TypeSlot};
use crate::combinators::{optional, repeat, select, token, token_image, Cardinality, ParseFn};
use crate::state::{ParseResult, ParseState};

pub struct ExpressionsApi {
    pub parse_expression: ParseFn<Expression>,
}

pub fn register(parse_type: ParseFn<TypeNode>, parse_statement: ParseFn<Statement>) -> ExpressionsApi {
    let parse_expression: ParseFn<Expression> =
        Rc::new(move |state: &mut ParseState| parse_expression_impl(state, &parse_type, &parse_statement));
    ExpressionsApi { parse_expression }
}

fn parse_expression_impl(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let base_int = |s: &mut ParseState| parse_integer_literal(s);
    let base_float = |s: &mut ParseState| parse_float_literal(s);
    let base_char = |s: &mut ParseState| parse_char_literal(s);
    let base_string = |s: &mut ParseState| parse_string_literal(s);
    let base_bool = |s: &mut ParseState| parse_bool_literal(s);
    let base_struct = |s: &mut ParseState| parse_struct_literal(s, parse_type, parse_statement);
    let base_array = |s: &mut ParseState| parse_array_literal(s, parse_type, parse_statement);
    // VarDeclaration before ShorthandLambda before bare Ident — all three
    // start with an Ident token.
    let base_var_decl = |s: &mut ParseState| parse_var_declaration(s, parse_type, parse_statement);
    let base_shorthand_lambda = |s: &mut ParseState| parse_shorthand_lambda(s, parse_statement);
    let base_identifier = |s: &mut ParseState| parse_identifier_expr(s);
    // LambdaExpression before ParenthesizedExpression before TupleLiteral —
    // all three start with `(`.
    let base_lambda = |s: &mut ParseState| parse_lambda_expression(s, parse_type, parse_statement);
    let base_parenthesized = |s: &mut ParseState| parse_parenthesized_expr(s, parse_type, parse_statement);
    let base_tuple = |s: &mut ParseState| parse_tuple_literal(s, parse_type, parse_statement);
    let base_if_else = |s: &mut ParseState| parse_if_else(s, parse_type, parse_statement);

    let bases: [&dyn Fn(&mut ParseState) -> ParseResult<Expression>; 13] = [
        &base_int,
        &base_float,
        &base_char,
        &base_string,
        &base_bool,
        &base_struct,
        &base_array,
        &base_var_decl,
        &base_shorthand_lambda,
        &base_identifier,
        &base_lambda,
        &base_parenthesized,
        &base_tuple,
    ];
    // `if`/`else` and prefix-unary are tried only after every
    // unambiguous-leading-token base has failed; both are cheap to attempt
    // last since no other base can start with their lead tokens reaching
    // this point.
    let node = match select(state, &bases) {
        Ok(n) => n,
        Err(_) => match base_if_else(state) {
            Ok(n) => n,
            Err(_) => parse_prefix_expr(state, parse_type, parse_statement)?,
        },
    };

    let suffix_call = |s: &mut ParseState, base: &Expression| parse_call_suffix(s, base, parse_type, parse_statement);
    let suffix_binary = |s: &mut ParseState, base: &Expression| parse_binary_suffix(s, base, parse_type, parse_statement);
    let suffix_postfix = |s: &mut ParseState, base: &Expression| parse_postfix_suffix(s, base);
    let suffix_array_access = |s: &mut ParseState, base: &Expression| parse_array_access_suffix(s, base, parse_type, parse_statement);
    let suffix_field_access = |s: &mut ParseState, base: &Expression| parse_field_access_suffix(s, base);
    let suffixes: [&dyn Fn(&mut ParseState, &Expression) -> ParseResult<Expression>; 5] =
        [&suffix_call, &suffix_binary, &suffix_postfix, &suffix_array_access, &suffix_field_access];

    Ok(fold_suffixes(state, node, &suffixes))
}

/// The suffix-folding half of `left_recursive` (§4.3 P3): stop the first
/// time no suffix matches, or the first time a matching suffix fails to
/// advance the cursor.
fn fold_suffixes(
    state: &mut ParseState,
    base: Expression,
    suffixes: &[&dyn Fn(&mut ParseState, &Expression) -> ParseResult<Expression>],
) -> Expression {
    let mut node = base;
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
    node
}

fn parse_integer_literal(state: &mut ParseState) -> ParseResult<Expression> {
    let tok = token(state, TokenKind::IntegerLiteral)?;
    let value = match tok.value {
        Some(TokenValue::Integer(v)) => v,
        _ => unreachable!("lexer always attaches an Integer value to IntegerLiteral"),
    };
    Ok(Expression::IntegerLiteral { value, range: tok.range, resolved: TypeSlot::new() })
}

fn parse_float_literal(state: &mut ParseState) -> ParseResult<Expression> {
    let tok = token(state, TokenKind::FloatLiteral)?;
    let value = match tok.value {
        Some(TokenValue::Float(v)) => v,
        _ => unreachable!("lexer always attaches a Float value to FloatLiteral"),
    };
    Ok(Expression::FloatLiteral { value, range: tok.range, resolved: TypeSlot::new() })
}

fn parse_char_literal(state: &mut ParseState) -> ParseResult<Expression> {
    let tok = token(state, TokenKind::CharacterLiteral)?;
    let value = match tok.value {
        Some(TokenValue::Char(v)) => v,
        _ => unreachable!("lexer always attaches a Char value to CharacterLiteral"),
    };
    Ok(Expression::CharLiteral { value, range: tok.range, resolved: TypeSlot::new() })
}

fn parse_string_literal(state: &mut ParseState) -> ParseResult<Expression> {
    let tok = token(state, TokenKind::StringLiteral)?;
    let value = match tok.value.clone() {
        Some(TokenValue::Str(v)) => v,
        _ => unreachable!("lexer always attaches a Str value to StringLiteral"),
    };
    Ok(Expression::StringLiteral { value, range: tok.range, resolved: TypeSlot::new() })
}

fn parse_bool_literal(state: &mut ParseState) -> ParseResult<Expression> {
    if !(state.at_image("true") || state.at_image("false")) {
        return Err(state.error("expected `true` or `false`"));
    }
    let tok = token(state, TokenKind::Reserved)?;
    Ok(Expression::BoolLiteral { value: tok.image == "true", range: tok.range, resolved: TypeSlot::new() })
}

fn parse_identifier_expr(state: &mut ParseState) -> ParseResult<Expression> {
    let tok = token(state, TokenKind::Ident)?;
    Ok(Expression::Identifier { name: Ident::new(tok.image, tok.range), resolved: TypeSlot::new() })
}

fn parse_var_declaration(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let name_tok = token(state, TokenKind::Ident)?;
    if let Err(e) = token_image(state, "=") {
        state.reset(start);
        return Err(e);
    }
    let value = parse_expression_impl(state, parse_type, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = name_tok.range.merge(value.range());
    Ok(Expression::VarDeclaration {
        name: Ident::new(name_tok.image, name_tok.range),
        value: Box::new(value),
        range,
        resolved: TypeSlot::new(),
    })
}

fn parse_shorthand_lambda(state: &mut ParseState, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let name_tok = token(state, TokenKind::Ident)?;
    if let Err(e) = token_image(state, "=>") {
        state.reset(start);
        return Err(e);
    }
    let body = parse_function_body(state, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = name_tok.range.merge(function_body_range(&body));
    Ok(Expression::Lambda {
        params: LambdaParams::Shorthand(Ident::new(name_tok.image, name_tok.range)),
        body: Box::new(body),
        range,
        resolved: TypeSlot::new(),
    })
}

fn parse_lambda_expression(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let open = token_image(state, "(").map_err(|e| {
        state.reset(start);
        e
    })?;
    let params = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_param(s, parse_type)).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, ")") {
        state.reset(start);
        return Err(e);
    }
    if let Err(e) = token_image(state, "=>") {
        state.reset(start);
        return Err(e);
    }
    let body = parse_function_body(state, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(function_body_range(&body));
    Ok(Expression::Lambda { params: LambdaParams::Named(params), body: Box::new(body), range, resolved: TypeSlot::new() })
}

fn parse_param(state: &mut ParseState, parse_type: &ParseFn<TypeNode>) -> ParseResult<Param> {
    let ty = parse_type(state)?;
    let name_tok = token(state, TokenKind::Ident)?;
    Ok(Param { name: Ident::new(name_tok.image, name_tok.range), ty })
}

fn parse_parenthesized_expr(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let open = token_image(state, "(").map_err(|e| {
        state.reset(start);
        e
    })?;
    let inner = parse_expression_impl(state, parse_type, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, ")").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(Expression::Parenthesized { inner: Box::new(inner), range })
}

fn parse_tuple_literal(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let open = token_image(state, "(").map_err(|e| {
        state.reset(start);
        e
    })?;
    let members = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_expression_impl(s, parse_type, parse_statement)).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, ")").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(Expression::TupleLiteral { members, range, resolved: TypeSlot::new() })
}

fn parse_struct_literal(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let open = token_image(state, "{").map_err(|e| {
        state.reset(start);
        e
    })?;
    let fields = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_struct_field(s, parse_type, parse_statement)).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, "}").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(Expression::StructLiteral { fields, range, resolved: TypeSlot::new() })
}

fn parse_struct_field(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<(Ident, Expression)> {
    let name_tok = token(state, TokenKind::Ident)?;
    token_image(state, ":")?;
    let value = parse_expression_impl(state, parse_type, parse_statement)?;
    Ok((Ident::new(name_tok.image, name_tok.range), value))
}

fn parse_array_literal(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let open = token_image(state, "[").map_err(|e| {
        state.reset(start);
        e
    })?;
    let elements = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_expression_impl(s, parse_type, parse_statement)).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, "]").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(Expression::ArrayLiteral { elements, range, resolved: TypeSlot::new() })
}

fn parse_prefix_expr(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let op_tok = token(state, TokenKind::Oper).map_err(|e| {
        state.reset(start);
        e
    })?;
    let operand = parse_expression_impl(state, parse_type, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = op_tok.range.merge(operand.range());
    Ok(Expression::Unary { op: op_tok.image, operand: Box::new(operand), is_postfix: false, range, resolved: TypeSlot::new() })
}

fn parse_if_else(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let if_tok = token_image(state, "if").map_err(|e| {
        state.reset(start);
        e
    })?;
    let condition = parse_expression_impl(state, parse_type, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let then_branch = parse_if_body(state, parse_type, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let else_branch = optional(state, |s| {
        token_image(s, "else")?;
        parse_if_body(s, parse_type, parse_statement)
    });
    let end_range = else_branch.as_ref().map(|e| e.range().clone()).unwrap_or_else(|| then_branch.range().clone());
    let range = if_tok.range.merge(&end_range);
    Ok(Expression::IfElse {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
        range,
        resolved: TypeSlot::new(),
    })
}

/// An `if`/`else` branch body: a brace-delimited block of statements, or a
/// single bare expression. The block form is tried first so `{ ... }` is
/// never misparsed as a struct literal in this position.
fn parse_if_body(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    match optional(state, |s| parse_block_expr(s, parse_statement)) {
        Some(block) => Ok(block),
        None => parse_expression_impl(state, parse_type, parse_statement),
    }
}

fn parse_block_expr(state: &mut ParseState, parse_statement: &ParseFn<Statement>) -> ParseResult<Expression> {
    let start = state.mark();
    let open = token_image(state, "{").map_err(|e| {
        state.reset(start);
        e
    })?;
    state.skip_separators();
    let mut statements = Vec::new();
    while !state.at_image("}") && !state.is_eof() {
        let stmt = parse_statement(state).map_err(|e| {
            state.reset(start);
            e
        })?;
        statements.push(stmt);
        state.skip_separators();
    }
    let close = token_image(state, "}").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(Expression::Block { statements, range, resolved: TypeSlot::new() })
}

/// `FunctionBody := Block | Expression | Statement` (§4.4): a lambda body,
/// which unlike an `if`/`else` branch can also be a bare non-expression
/// statement (`return ...`, `for ...`, etc).
fn parse_function_body(state: &mut ParseState, parse_statement: &ParseFn<Statement>) -> ParseResult<FunctionBody> {
    let start = state.mark();
    match parse_statement(state) {
        Ok(Statement::ExpressionStatement { expr, .. }) => Ok(FunctionBody::Expression(expr)),
        Ok(block @ Statement::Block { .. }) => Ok(FunctionBody::Block(block)),
        Ok(other) => Ok(FunctionBody::Statement(other)),
        Err(e) => {
            state.reset(start);
            Err(e)
        }
    }
}

fn function_body_range(body: &FunctionBody) -> &langc_common::FileRange {
    match body {
        FunctionBody::Block(s) | FunctionBody::Statement(s) => s.range(),
        FunctionBody::Expression(e) => e.range(),
    }
}

fn parse_call_suffix(
    state: &mut ParseState,
    base: &Expression,
    parse_type: &ParseFn<TypeNode>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<Expression> {
    let type_args = optional(state, |s| {
        token_image(s, "<")?;
        let args = repeat(s, Cardinality::OneOrMore, Some(","), |s2| parse_type(s2))?;
        token_image(s, ">")?;
        // Only counts as the call's type-argument list if it's immediately
        // followed by the argument list; otherwise this wasn't a call at
        // all (e.g. a chained comparison), and the caller backtracks.
        if s.at_image("(") {
            Ok(args)
        } else {
            Err(s.error("not a call's type-argument list"))
        }
    });
    token_image(state, "(")?;
    let args = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_expression_impl(s, parse_type, parse_statement))?;
    let close = token_image(state, ")")?;
    let range = base.range().merge(&close.range);
    Ok(Expression::Call { callee: Box::new(base.clone()), type_args, args, range, resolved: TypeSlot::new() })
}

fn parse_binary_suffix(
    state: &mut ParseState,
    base: &Expression,
    parse_type: &ParseFn<TypeNode>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<Expression> {
    let op_tok = token(state, TokenKind::Oper)?;
    let rhs = parse_expression_impl(state, parse_type, parse_statement)?;
    let range = base.range().merge(rhs.range());
    Ok(Expression::Binary { op: op_tok.image, left: Box::new(base.clone()), right: Box::new(rhs), range, resolved: TypeSlot::new() })
}

fn parse_postfix_suffix(state: &mut ParseState, base: &Expression) -> ParseResult<Expression> {
    let op_tok = token(state, TokenKind::Oper)?;
    let range = base.range().merge(&op_tok.range);
    Ok(Expression::Unary { op: op_tok.image, operand: Box::new(base.clone()), is_postfix: true, range, resolved: TypeSlot::new() })
}

fn parse_array_access_suffix(
    state: &mut ParseState,
    base: &Expression,
    parse_type: &ParseFn<TypeNode>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<Expression> {
    token_image(state, "[")?;
    let index = parse_expression_impl(state, parse_type, parse_statement)?;
    let close = token_image(state, "]")?;
    let range = base.range().merge(&close.range);
    Ok(Expression::ArrayAccess { base: Box::new(base.clone()), index: Box::new(index), range, resolved: TypeSlot::new() })
}

fn parse_field_access_suffix(state: &mut ParseState, base: &Expression) -> ParseResult<Expression> {
    token_image(state, ".")?;
    let member_tok = token(state, TokenKind::Ident)?;
    let range = base.range().merge(&member_tok.range);
    Ok(Expression::FieldAccess {
        base: Box::new(base.clone()),
        field: Ident::new(member_tok.image, member_tok.range),
        range,
        resolved: TypeSlot::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_lexer::{Lexer, Mode};

    /// A statement stub sufficient for expression-only tests: it accepts a
    /// single expression as an `ExpressionStatement` and nothing else,
    /// since none of these tests exercise a lambda/if body that is a real
    /// block or control-flow statement.
    fn stub_statement(state: &mut ParseState, parse_type: &ParseFn<TypeNode>) -> ParseResult<Statement> {
        let inert: ParseFn<Statement> = Rc::new(|s: &mut ParseState| Err(s.error("no nested statements in this test")));
        let expr = parse_expression_impl(state, parse_type, &inert)?;
        let range = expr.range().clone();
        Ok(Statement::ExpressionStatement { expr, range })
    }

    fn parse(src: &str) -> Expression {
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex ok");
        let mut state = ParseState::new(&tokens);
        let parse_type = crate::grammar::types::register().parse_type;
        let parse_type_for_stmt = parse_type.clone();
        let parse_statement: ParseFn<Statement> = Rc::new(move |s: &mut ParseState| stub_statement(s, &parse_type_for_stmt));
        parse_expression_impl(&mut state, &parse_type, &parse_statement).expect("parse ok")
    }

    #[test]
    fn parses_integer_literal() {
        assert!(matches!(parse("42"), Expression::IntegerLiteral { value: 42, .. }));
    }

    #[test]
    fn parses_identifier() {
        assert!(matches!(parse("foo"), Expression::Identifier { .. }));
    }

    #[test]
    fn parses_var_declaration_before_shorthand_lambda() {
        assert!(matches!(parse("x = 1"), Expression::VarDeclaration { .. }));
    }

    #[test]
    fn parses_shorthand_lambda() {
        match parse("x => x") {
            Expression::Lambda { params: LambdaParams::Shorthand(_), .. } => {}
            other => panic!("expected shorthand lambda, got {other:?}"),
        }
    }

    #[test]
    fn parses_binary_expression() {
        match parse("1 + 2") {
            Expression::Binary { op, .. } => assert_eq!(op, "+"),
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn parses_postfix_when_no_rhs_follows() {
        match parse("x ++") {
            Expression::Unary { is_postfix: true, .. } => {}
            other => panic!("expected postfix unary, got {other:?}"),
        }
    }

    #[test]
    fn parses_field_access_chain() {
        match parse("a.b.c") {
            Expression::FieldAccess { .. } => {}
            other => panic!("expected field access, got {other:?}"),
        }
    }

    #[test]
    fn parses_call_with_explicit_type_args() {
        match parse("identity<i32>(1)") {
            Expression::Call { type_args: Some(args), args: call_args, .. } => {
                assert_eq!(args.len(), 1);
                assert_eq!(call_args.len(), 1);
            }
            other => panic!("expected call with type args, got {other:?}"),
        }
    }

    #[test]
    fn parses_tuple_literal() {
        match parse("(1, 2)") {
            Expression::TupleLiteral { members, .. } => assert_eq!(members.len(), 2),
            other => panic!("expected tuple literal, got {other:?}"),
        }
    }

    #[test]
    fn parses_parenthesized_single_expression() {
        assert!(matches!(parse("(1)"), Expression::Parenthesized { .. }));
    }

    #[test]
    fn parses_if_else_with_block_bodies() {
        match parse("if true { 1 } else { 2 }") {
            Expression::IfElse { then_branch, else_branch, .. } => {
                assert!(matches!(*then_branch, Expression::Block { .. }));
                assert!(else_branch.is_some());
            }
            other => panic!("expected if/else, got {other:?}"),
        }
    }
}
