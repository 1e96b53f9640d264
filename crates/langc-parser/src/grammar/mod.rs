//! Wires the four grammar fragments (types, expressions, statements,
//! declarations) into one [`Environment`] (§4.4, §9).
//!
//! `types` is a true leaf: it never recurses into the other three, so it
//! needs no forward reference. `expressions` and `statements` form a
//! genuine cycle (a lambda body can be a statement block; a block's
//! expression-statements contain expressions), broken here with a pair of
//! `Rc<RefCell<Option<ParseFn<T>>>>` cells filled in after each side is
//! built. `declarations` depends on all three but nothing depends back on
//! it, so it's built last from already-resolved functions.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expression, ModuleRoot, Statement, TypeNode};
use crate::combinators::ParseFn;
use crate::state::{ParseResult, ParseState};

pub mod declarations;
pub mod expressions;
pub mod statements;
pub mod types;

pub struct Environment {
    pub parse_type: ParseFn<TypeNode>,
    pub parse_expression: ParseFn<Expression>,
    pub parse_statement: ParseFn<Statement>,
    pub parse_module: ParseFn<ModuleRoot>,
}

/// Build a forward-referencing [`ParseFn`] over a not-yet-filled cell: every
/// call indirects through the `Rc<RefCell<..>>`, so it can be handed to a
/// dependent's `register()` before the dependency itself exists yet.
fn deferred<T: 'static>(cell: Rc<RefCell<Option<ParseFn<T>>>>) -> ParseFn<T> {
    Rc::new(move |state: &mut ParseState| -> ParseResult<T> {
        let resolved = cell.borrow().clone().expect("grammar::environment wires every cell before parsing starts");
        resolved(state)
    })
}

pub fn environment() -> Environment {
    let types_api = types::register();

    let statement_cell: Rc<RefCell<Option<ParseFn<Statement>>>> = Rc::new(RefCell::new(None));
    let expression_cell: Rc<RefCell<Option<ParseFn<Expression>>>> = Rc::new(RefCell::new(None));

    let expressions_api = expressions::register(types_api.parse_type.clone(), deferred(statement_cell.clone()));
    *expression_cell.borrow_mut() = Some(expressions_api.parse_expression.clone());

    let statements_api = statements::register(types_api.parse_type.clone(), expressions_api.parse_expression.clone());
    *statement_cell.borrow_mut() = Some(statements_api.parse_statement.clone());

    let declarations_api = declarations::register(
        types_api.parse_type.clone(),
        expressions_api.parse_expression.clone(),
        statements_api.parse_statement.clone(),
    );

    Environment {
        parse_type: types_api.parse_type,
        parse_expression: expressions_api.parse_expression,
        parse_statement: statements_api.parse_statement,
        parse_module: declarations_api.parse_module,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_lexer::{Lexer, Mode};

    #[test]
    fn environment_parses_a_small_module() {
        let src = "func i32 add(i32 x, i32 y) => x + y\nexport add\n";
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex ok");
        let env = environment();
        let mut state = ParseState::new(&tokens);
        let root = (env.parse_module)(&mut state).expect("parse ok");
        assert_eq!(root.items.len(), 2);
    }

    #[test]
    fn environment_resolves_the_expression_statement_cycle() {
        // A lambda whose body is a block containing an expression
        // statement only type-checks this crate's wiring if the
        // expression/statement cycle is actually resolved, not just
        // deferred forever.
        let src = "const f = (i32 x) => { x + 1 }\n";
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex ok");
        let env = environment();
        let mut state = ParseState::new(&tokens);
        let root = (env.parse_module)(&mut state).expect("parse ok");
        assert_eq!(root.items.len(), 1);
    }
}
