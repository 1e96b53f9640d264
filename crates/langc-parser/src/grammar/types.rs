//! `Type := Base Suffix*` (§4.4).
//!
//! Types never recurse into expressions or statements, so unlike the other
//! three grammar files this one needs no forward-referenced dependency: it
//! recurses into itself with ordinary Rust function calls.

use std::rc::Rc;

use langc_common::TokenKind;

use crate::ast::{BuiltIn, Ident, TypeNode, TypeParamNode, TypeSlot};
use crate::combinators::{left_recursive, optional, repeat, token, token_image, Cardinality, ParseFn};
use crate::state::{ParseResult, ParseState};

pub struct TypesApi {
    pub parse_type: ParseFn<TypeNode>,
}

pub fn register() -> TypesApi {
    TypesApi { parse_type: Rc::new(parse_type) }
}

pub fn parse_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    let base_builtin = |s: &mut ParseState| parse_builtin_type(s);
    let base_function = |s: &mut ParseState| parse_function_type(s);
    let base_parenthesized = |s: &mut ParseState| parse_parenthesized_type(s);
    let base_tuple = |s: &mut ParseState| parse_tuple_type(s);
    let base_struct = |s: &mut ParseState| parse_struct_type(s);
    let base_identifier = |s: &mut ParseState| parse_identifier_type(s);
    // Function before Parenthesized before Tuple (all start with `(`); the
    // rest don't conflict so their relative order is unconstrained.
    let bases: [&dyn Fn(&mut ParseState) -> ParseResult<TypeNode>; 6] =
        [&base_function, &base_parenthesized, &base_tuple, &base_builtin, &base_struct, &base_identifier];

    let suffix_array = |s: &mut ParseState, base: &TypeNode| parse_array_suffix(s, base);
    let suffix_union = |s: &mut ParseState, base: &TypeNode| parse_union_suffix(s, base);
    let suffix_specific = |s: &mut ParseState, base: &TypeNode| parse_specific_suffix(s, base);
    let suffix_namespace = |s: &mut ParseState, base: &TypeNode| parse_namespace_access_suffix(s, base);
    let suffixes: [&dyn Fn(&mut ParseState, &TypeNode) -> ParseResult<TypeNode>; 4] =
        [&suffix_array, &suffix_union, &suffix_specific, &suffix_namespace];

    left_recursive(state, &bases, &suffixes)
}

fn parse_builtin_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    if !state.at(TokenKind::Reserved) {
        return Err(state.error("expected a built-in type"));
    }
    let image = state.current().image.clone();
    let Some(kind) = BuiltIn::from_keyword(&image) else {
        return Err(state.error("expected a built-in type"));
    };
    let tok = token(state, TokenKind::Reserved)?;
    Ok(TypeNode::BuiltIn { kind, range: tok.range, resolved: TypeSlot::new() })
}

fn parse_identifier_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    let tok = token(state, TokenKind::Ident)?;
    Ok(TypeNode::Identifier { name: Ident::new(tok.image, tok.range), resolved: TypeSlot::new() })
}

fn parse_function_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    let start = state.mark();
    let open = token_image(state, "(").map_err(|e| {
        state.reset(start);
        e
    })?;
    let params = repeat(state, Cardinality::ZeroOrMore, Some(","), parse_type).map_err(|e| {
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
    let ret = parse_type(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(ret.range());
    Ok(TypeNode::Function { params, ret: Box::new(ret), range, resolved: TypeSlot::new() })
}

fn parse_parenthesized_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    let start = state.mark();
    let open = token_image(state, "(").map_err(|e| {
        state.reset(start);
        e
    })?;
    let inner = parse_type(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, ")").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(TypeNode::Parenthesized { inner: Box::new(inner), range })
}

fn parse_tuple_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    let start = state.mark();
    let open = token_image(state, "(").map_err(|e| {
        state.reset(start);
        e
    })?;
    let members = repeat(state, Cardinality::ZeroOrMore, Some(","), parse_type).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, ")").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(TypeNode::Tuple { members, range, resolved: TypeSlot::new() })
}

fn parse_struct_type(state: &mut ParseState) -> ParseResult<TypeNode> {
    let start = state.mark();
    let open = token_image(state, "{").map_err(|e| {
        state.reset(start);
        e
    })?;
    let fields = repeat(state, Cardinality::ZeroOrMore, Some(","), parse_struct_field).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, "}").map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = open.range.merge(&close.range);
    Ok(TypeNode::Struct { fields, range, resolved: TypeSlot::new() })
}

fn parse_struct_field(state: &mut ParseState) -> ParseResult<(Ident, TypeNode)> {
    let name_tok = token(state, TokenKind::Ident)?;
    token_image(state, ":")?;
    let ty = parse_type(state)?;
    Ok((Ident::new(name_tok.image, name_tok.range), ty))
}

fn parse_array_suffix(state: &mut ParseState, base: &TypeNode) -> ParseResult<TypeNode> {
    token_image(state, "[")?;
    let close = token_image(state, "]")?;
    let range = base.range().merge(&close.range);
    Ok(TypeNode::Array { element: Box::new(base.clone()), range, resolved: TypeSlot::new() })
}

fn parse_union_suffix(state: &mut ParseState, base: &TypeNode) -> ParseResult<TypeNode> {
    token_image(state, "|")?;
    let rhs = parse_type(state)?;
    let range = base.range().merge(rhs.range());
    let members = match base {
        TypeNode::Union { members, .. } => {
            let mut members = members.clone();
            members.push(rhs);
            members
        }
        other => vec![other.clone(), rhs],
    };
    Ok(TypeNode::Union { members, range, resolved: TypeSlot::new() })
}

fn parse_specific_suffix(state: &mut ParseState, base: &TypeNode) -> ParseResult<TypeNode> {
    token_image(state, "<")?;
    let args = repeat(state, Cardinality::OneOrMore, Some(","), parse_type)?;
    let close = token_image(state, ">")?;
    let range = base.range().merge(&close.range);
    Ok(TypeNode::Specific { base: Box::new(base.clone()), type_args: args, range, resolved: TypeSlot::new() })
}

fn parse_namespace_access_suffix(state: &mut ParseState, base: &TypeNode) -> ParseResult<TypeNode> {
    token_image(state, ".")?;
    let member_tok = token(state, TokenKind::Ident)?;
    let member = Ident::new(member_tok.image, member_tok.range.clone());
    let range = base.range().merge(&member_tok.range);
    Ok(TypeNode::NamespaceAccess { base: Box::new(base.clone()), member, range, resolved: TypeSlot::new() })
}

/// `'<' TypeParam (',' TypeParam)+ '>'`; `TypeParam := ('+'|'-')? Ident (':'
/// Type)?` (§4.4).
pub fn parse_type_param_list(state: &mut ParseState) -> ParseResult<Vec<TypeParamNode>> {
    token_image(state, "<")?;
    let params = repeat(state, Cardinality::OneOrMore, Some(","), parse_type_param)?;
    token_image(state, ">")?;
    Ok(params)
}

fn parse_type_param(state: &mut ParseState) -> ParseResult<TypeParamNode> {
    use langc_types::Variance;

    let variance_tok = if state.at_image("+") {
        Some(state.bump())
    } else if state.at_image("-") {
        Some(state.bump())
    } else {
        None
    };
    let variance = match variance_tok.as_ref().map(|t| t.image.as_str()) {
        Some("+") => Variance::Covariant,
        Some("-") => Variance::Contravariant,
        _ => Variance::Invariant,
    };
    let name_tok = token(state, TokenKind::Ident)?;
    let name = Ident::new(name_tok.image, name_tok.range.clone());
    let constraint = optional(state, |s| {
        token_image(s, ":")?;
        parse_type(s)
    });
    let start_range = variance_tok.as_ref().map(|t| t.range.clone()).unwrap_or_else(|| name_tok.range.clone());
    let end_range = constraint.as_ref().map(|c| c.range().clone()).unwrap_or(name_tok.range.clone());
    let range = start_range.merge(&end_range);
    Ok(TypeParamNode { variance, name, constraint, range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_lexer::{Lexer, Mode};

    fn parse(src: &str) -> TypeNode {
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex ok");
        let mut state = ParseState::new(&tokens);
        parse_type(&mut state).expect("parse ok")
    }

    #[test]
    fn parses_builtin_type() {
        assert!(matches!(parse("i32"), TypeNode::BuiltIn { kind: BuiltIn::I32, .. }));
    }

    #[test]
    fn parses_identifier_type() {
        assert!(matches!(parse("Foo"), TypeNode::Identifier { .. }));
    }

    #[test]
    fn parses_array_suffix() {
        assert!(matches!(parse("i32[]"), TypeNode::Array { .. }));
    }

    #[test]
    fn parses_union_and_flattens_chain() {
        match parse("int | bool | char") {
            TypeNode::Union { members, .. } => assert_eq!(members.len(), 3),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn parses_function_type_before_parenthesized() {
        match parse("(i32, i32) => f32") {
            TypeNode::Function { params, .. } => assert_eq!(params.len(), 2),
            other => panic!("expected function type, got {other:?}"),
        }
    }

    #[test]
    fn parses_parenthesized_single_type() {
        assert!(matches!(parse("(i32)"), TypeNode::Parenthesized { .. }));
    }

    #[test]
    fn parses_tuple_type() {
        match parse("(i32, bool)") {
            TypeNode::Tuple { members, .. } => assert_eq!(members.len(), 2),
            other => panic!("expected tuple type, got {other:?}"),
        }
    }

    #[test]
    fn parses_specific_suffix() {
        match parse("Box<i32>") {
            TypeNode::Specific { type_args, .. } => assert_eq!(type_args.len(), 1),
            other => panic!("expected specific type, got {other:?}"),
        }
    }

    #[test]
    fn parses_namespace_access_suffix() {
        assert!(matches!(parse("ns.Foo"), TypeNode::NamespaceAccess { .. }));
    }

    #[test]
    fn parses_type_param_list() {
        let tokens = Lexer::tokenize("t.lang", "<+T: i32, -U>", Mode::Ignore).expect("lex ok");
        let mut state = ParseState::new(&tokens);
        let params = parse_type_param_list(&mut state).expect("parse ok");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name.name, "T");
        assert_eq!(params[0].variance, langc_types::Variance::Covariant);
        assert!(params[0].constraint.is_some());
        assert_eq!(params[1].variance, langc_types::Variance::Contravariant);
    }
}
