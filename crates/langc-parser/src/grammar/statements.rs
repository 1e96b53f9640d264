//! `Statement := Block | ExpressionStatement | For | While | DoWhile |
//! TryCatch | Return | Throw | Break | Continue` (§4.4).
//!
//! Every keyword-led form is tried before `Block`, and `Block` before
//! `ExpressionStatement`, since a bare `{` could otherwise be misparsed as
//! the start of a struct-literal expression statement.

use std::rc::Rc;

use langc_common::TokenKind;

use crate::ast::{Expression, Ident, Param, Statement, TypeNode, TypeSlot};
use crate::combinators::{optional, select, token, token_image, ParseFn};
use crate::state::{ParseResult, ParseState};

pub struct StatementsApi {
    pub parse_statement: ParseFn<Statement>,
}

pub fn register(parse_type: ParseFn<TypeNode>, parse_expression: ParseFn<Expression>) -> StatementsApi {
    let parse_statement: ParseFn<Statement> =
        Rc::new(move |state: &mut ParseState| parse_statement_impl(state, &parse_type, &parse_expression));
    StatementsApi { parse_statement }
}

fn parse_statement_impl(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let base_for = |s: &mut ParseState| parse_for(s, parse_type, parse_expression);
    let base_while = |s: &mut ParseState| parse_while(s, parse_type, parse_expression);
    let base_do_while = |s: &mut ParseState| parse_do_while(s, parse_type, parse_expression);
    let base_try_catch = |s: &mut ParseState| parse_try_catch(s, parse_type, parse_expression);
    let base_return = |s: &mut ParseState| parse_return(s, parse_expression);
    let base_throw = |s: &mut ParseState| parse_throw(s, parse_expression);
    let base_break = |s: &mut ParseState| parse_break(s);
    let base_continue = |s: &mut ParseState| parse_continue(s);
    let base_block = |s: &mut ParseState| parse_block(s, parse_type, parse_expression);
    let base_expr_stmt = |s: &mut ParseState| parse_expression_statement(s, parse_expression);

    let bases: [&dyn Fn(&mut ParseState) -> ParseResult<Statement>; 10] = [
        &base_for,
        &base_while,
        &base_do_while,
        &base_try_catch,
        &base_return,
        &base_throw,
        &base_break,
        &base_continue,
        &base_block,
        &base_expr_stmt,
    ];
    select(state, &bases)
}

fn parse_block(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let start = state.mark();
    let open = token_image(state, "{").map_err(|e| {
        state.reset(start);
        e
    })?;
    state.skip_separators();
    let mut statements = Vec::new();
    while !state.at_image("}") && !state.is_eof() {
        let stmt = parse_statement_impl(state, parse_type, parse_expression).map_err(|e| {
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
    Ok(Statement::Block { statements, range, resolved: TypeSlot::new() })
}

fn parse_expression_statement(state: &mut ParseState, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let expr = parse_expression(state)?;
    let range = expr.range().clone();
    Ok(Statement::ExpressionStatement { expr, range })
}

fn parse_for(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let start = state.mark();
    let for_tok = token_image(state, "for").map_err(|e| {
        state.reset(start);
        e
    })?;
    let binding_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "in") {
        state.reset(start);
        return Err(e);
    }
    let iterable = parse_expression(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let body = parse_block(state, parse_type, parse_expression).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = for_tok.range.merge(body.range());
    Ok(Statement::For { binding: Ident::new(binding_tok.image, binding_tok.range), iterable, body: Box::new(body), range })
}

fn parse_while(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let start = state.mark();
    let while_tok = token_image(state, "while").map_err(|e| {
        state.reset(start);
        e
    })?;
    let condition = parse_expression(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let body = parse_block(state, parse_type, parse_expression).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = while_tok.range.merge(body.range());
    Ok(Statement::While { condition, body: Box::new(body), range })
}

fn parse_do_while(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let start = state.mark();
    let do_tok = token_image(state, "do").map_err(|e| {
        state.reset(start);
        e
    })?;
    let body = parse_block(state, parse_type, parse_expression).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "while") {
        state.reset(start);
        return Err(e);
    }
    let condition = parse_expression(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = do_tok.range.merge(condition.range());
    Ok(Statement::DoWhile { body: Box::new(body), condition, range })
}

fn parse_try_catch(state: &mut ParseState, parse_type: &ParseFn<TypeNode>, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let start = state.mark();
    let try_tok = token_image(state, "try").map_err(|e| {
        state.reset(start);
        e
    })?;
    let try_block = parse_block(state, parse_type, parse_expression).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "catch") {
        state.reset(start);
        return Err(e);
    }
    let catch_param = optional(state, |s| {
        token_image(s, "(")?;
        let ty = parse_type(s)?;
        let name_tok = token(s, TokenKind::Ident)?;
        token_image(s, ")")?;
        Ok(Param { name: Ident::new(name_tok.image, name_tok.range), ty })
    });
    let catch_block = parse_block(state, parse_type, parse_expression).map_err(|e| {
        state.reset(start);
        e
    })?;
    let finally_block = optional(state, |s| {
        token_image(s, "finally")?;
        parse_block(s, parse_type, parse_expression)
    });
    let end_range = finally_block.as_ref().map(|b| b.range().clone()).unwrap_or_else(|| catch_block.range().clone());
    let range = try_tok.range.merge(&end_range);
    Ok(Statement::TryCatch {
        try_block: Box::new(try_block),
        catch_param,
        catch_block: Box::new(catch_block),
        finally_block: finally_block.map(Box::new),
        range,
    })
}

fn parse_return(state: &mut ParseState, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let return_tok = token_image(state, "return")?;
    let value = optional(state, |s| parse_expression(s));
    let range = value.as_ref().map(|v| return_tok.range.merge(v.range())).unwrap_or_else(|| return_tok.range.clone());
    Ok(Statement::Return { value, range })
}

fn parse_throw(state: &mut ParseState, parse_expression: &ParseFn<Expression>) -> ParseResult<Statement> {
    let start = state.mark();
    let throw_tok = token_image(state, "throw").map_err(|e| {
        state.reset(start);
        e
    })?;
    let value = parse_expression(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = throw_tok.range.merge(value.range());
    Ok(Statement::Throw { value, range })
}

fn parse_break(state: &mut ParseState) -> ParseResult<Statement> {
    let tok = token_image(state, "break")?;
    Ok(Statement::Break { range: tok.range })
}

fn parse_continue(state: &mut ParseState) -> ParseResult<Statement> {
    let tok = token_image(state, "continue")?;
    Ok(Statement::Continue { range: tok.range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_lexer::{Lexer, Mode};

    fn parse_expr_fn() -> ParseFn<Expression> {
        Rc::new(|s: &mut ParseState| {
            let types_api = crate::grammar::types::register();
            let inert: ParseFn<Statement> = Rc::new(|s2: &mut ParseState| Err(s2.error("no nested statements in this test")));
            crate::grammar::expressions::register(types_api.parse_type, inert).parse_expression.as_ref()(s)
        })
    }

    fn parse(src: &str) -> Statement {
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex ok");
        let mut state = ParseState::new(&tokens);
        let types_api = crate::grammar::types::register();
        parse_statement_impl(&mut state, &types_api.parse_type, &parse_expr_fn()).expect("parse ok")
    }

    #[test]
    fn parses_block() {
        assert!(matches!(parse("{ 1 2 }"), Statement::Block { .. }));
    }

    #[test]
    fn parses_expression_statement() {
        assert!(matches!(parse("1 + 2"), Statement::ExpressionStatement { .. }));
    }

    #[test]
    fn parses_for_loop() {
        match parse("for x in xs { x }") {
            Statement::For { .. } => {}
            other => panic!("expected for loop, got {other:?}"),
        }
    }

    #[test]
    fn parses_while_loop() {
        assert!(matches!(parse("while true { }"), Statement::While { .. }));
    }

    #[test]
    fn parses_do_while_loop() {
        assert!(matches!(parse("do { 1 } while true"), Statement::DoWhile { .. }));
    }

    #[test]
    fn parses_try_catch_finally() {
        match parse("try { 1 } catch (i32 e) { 2 } finally { 3 }") {
            Statement::TryCatch { catch_param: Some(_), finally_block: Some(_), .. } => {}
            other => panic!("expected try/catch/finally, got {other:?}"),
        }
    }

    #[test]
    fn parses_return_with_value() {
        match parse("return 1") {
            Statement::Return { value: Some(_), .. } => {}
            other => panic!("expected return with value, got {other:?}"),
        }
    }

    #[test]
    fn parses_bare_return() {
        match parse("return") {
            Statement::Return { value: None, .. } => {}
            other => panic!("expected bare return, got {other:?}"),
        }
    }

    #[test]
    fn parses_break_and_continue() {
        assert!(matches!(parse("break"), Statement::Break { .. }));
        assert!(matches!(parse("continue"), Statement::Continue { .. }));
    }
}
