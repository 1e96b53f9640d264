//! Recursive-descent parser and syntax tree for the language frontend
//! (§4.3, §4.4).
//!
//! Parsing is built from the combinator primitives in [`combinators`]; the
//! mutually recursive grammar (types, expressions, statements,
//! declarations) is wired together in [`grammar::environment`] to avoid
//! cyclic static initialization. [`ast`] holds the typed syntax tree the
//! grammar productions build.

pub mod ast;
pub mod combinators;
pub mod error;
pub mod grammar;
pub mod state;

pub use ast::ModuleRoot;
pub use error::ParseError;
pub use state::{ParseResult, ParseState};

use langc_common::Token;

/// Parse a single module's token stream into a [`ModuleRoot`].
///
/// On the first syntax error, parsing of the offending production halts
/// (§7 policy); whatever declarations parsed before it are kept so the
/// module loader can still traverse its imports.
pub fn parse_module(tokens: &[Token]) -> (ModuleRoot, Option<ParseError>) {
    let env = grammar::environment();
    let mut state = ParseState::new(tokens);
    match (env.parse_module)(&mut state) {
        Ok(root) => (root, None),
        Err(e) => {
            let range = e.range.clone();
            (ast::ModuleRoot { imports: Vec::new(), items: Vec::new(), range }, Some(e))
        }
    }
}
