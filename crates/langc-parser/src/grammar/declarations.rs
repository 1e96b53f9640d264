//! Declarations, imports, exports, and the top-level module production
//! (§4.4, §4.5). Nothing in the grammar recurses back into a declaration,
//! so unlike [`crate::grammar::expressions`] and [`crate::grammar::statements`]
//! this module needs no forward-reference cell of its own — it's the
//! terminal consumer of the other three.

use langc_common::TokenKind;

use crate::ast::{
    AnonymousFunctionDeclaration, AnonymousTypeDeclaration, ConstantDeclaration, Declaration, Expression, ExportDeclaration,
    ExportForwardDeclaration, FunctionDeclaration, Ident, ImportDeclaration, ImportItem, ModuleItem, ModuleRoot, NamespaceDeclaration, Param,
    Statement, TypeDeclaration, TypeNode, TypeParamNode, TypeSlot,
};
use crate::combinators::{optional, repeat, select, token, token_image, Cardinality, ParseFn};
use crate::grammar::types::parse_type_param_list;
use crate::state::{ParseResult, ParseState};

pub struct DeclarationsApi {
    pub parse_module: ParseFn<ModuleRoot>,
}

pub fn register(parse_type: ParseFn<TypeNode>, parse_expression: ParseFn<Expression>, parse_statement: ParseFn<Statement>) -> DeclarationsApi {
    let pt = parse_type.clone();
    let pe = parse_expression.clone();
    let ps = parse_statement.clone();
    let parse_module: ParseFn<ModuleRoot> = std::rc::Rc::new(move |state: &mut ParseState| parse_module_impl(state, &pt, &pe, &ps));
    DeclarationsApi { parse_module }
}

/// `ModuleRoot := ImportDeclaration* (Declaration | ExportDeclaration |
/// ExportForwardDeclaration)* EOF` (§4.4).
fn parse_module_impl(
    state: &mut ParseState,
    parse_type: &ParseFn<TypeNode>,
    parse_expression: &ParseFn<Expression>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<ModuleRoot> {
    let start_pos = state.current().range.start.clone();
    state.skip_separators();
    let imports = repeat(state, Cardinality::ZeroOrMore, None, |s| {
        let item = parse_import(s)?;
        s.skip_separators();
        Ok(item)
    })?;

    let mut items = Vec::new();
    state.skip_separators();
    while !state.is_eof() {
        let item = parse_module_item(state, parse_type, parse_expression, parse_statement)?;
        items.push(item);
        state.skip_separators();
    }
    let range = langc_common::FileRange::new(start_pos, state.current().range.start.clone());
    Ok(ModuleRoot { imports, items, range })
}

fn parse_module_item(
    state: &mut ParseState,
    parse_type: &ParseFn<TypeNode>,
    parse_expression: &ParseFn<Expression>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<ModuleItem> {
    if state.at_image("export") {
        return parse_export_or_forward(state, parse_type, parse_expression, parse_statement);
    }
    let decl = parse_declaration(state, parse_type, parse_expression, parse_statement)?;
    Ok(ModuleItem::Declaration(decl))
}

/// `TypeDeclaration | FunctionDeclaration | ConstantDeclaration |
/// NamespaceDeclaration` (§4.4). All four forms are keyword-led (`type`,
/// `const`, `namespace`, `func`) and unambiguous by lookahead.
fn parse_declaration(
    state: &mut ParseState,
    parse_type: &ParseFn<TypeNode>,
    parse_expression: &ParseFn<Expression>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<Declaration> {
    let base_type = |s: &mut ParseState| parse_type_declaration(s, parse_type).map(Declaration::Type);
    let base_const = |s: &mut ParseState| parse_constant_declaration(s, parse_expression).map(Declaration::Constant);
    let base_namespace =
        |s: &mut ParseState| parse_namespace_declaration(s, parse_type, parse_expression, parse_statement).map(Declaration::Namespace);
    let base_function = |s: &mut ParseState| parse_function_declaration(s, parse_type, parse_statement).map(Declaration::Function);
    let bases: [&dyn Fn(&mut ParseState) -> ParseResult<Declaration>; 4] = [&base_type, &base_const, &base_namespace, &base_function];
    select(state, &bases)
}

fn parse_type_declaration(state: &mut ParseState, parse_type: &ParseFn<TypeNode>) -> ParseResult<TypeDeclaration> {
    let start = state.mark();
    let type_tok = token_image(state, "type").map_err(|e| {
        state.reset(start);
        e
    })?;
    let name_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    let type_params = optional(state, |s| parse_type_param_list(s)).unwrap_or_default();
    if let Err(e) = token_image(state, "=") {
        state.reset(start);
        return Err(e);
    }
    let ty = parse_type(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = type_tok.range.merge(ty.range());
    Ok(TypeDeclaration { name: Ident::new(name_tok.image, name_tok.range), type_params, ty, range, resolved: TypeSlot::new() })
}

fn parse_constant_declaration(state: &mut ParseState, parse_expression: &ParseFn<Expression>) -> ParseResult<ConstantDeclaration> {
    let start = state.mark();
    let const_tok = token_image(state, "const").map_err(|e| {
        state.reset(start);
        e
    })?;
    let name_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "=") {
        state.reset(start);
        return Err(e);
    }
    let value = parse_expression(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = const_tok.range.merge(value.range());
    Ok(ConstantDeclaration { name: Ident::new(name_tok.image, name_tok.range), value, range, resolved: TypeSlot::new() })
}

fn parse_namespace_declaration(
    state: &mut ParseState,
    parse_type: &ParseFn<TypeNode>,
    parse_expression: &ParseFn<Expression>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<NamespaceDeclaration> {
    let start = state.mark();
    let ns_tok = token_image(state, "namespace").map_err(|e| {
        state.reset(start);
        e
    })?;
    let name_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    let open = token_image(state, "{").map_err(|e| {
        state.reset(start);
        e
    })?;
    state.skip_separators();
    let imports = repeat(state, Cardinality::ZeroOrMore, None, |s| {
        let item = parse_import(s)?;
        s.skip_separators();
        Ok(item)
    })
    .map_err(|e| {
        state.reset(start);
        e
    })?;
    let mut items = Vec::new();
    while !state.at_image("}") && !state.is_eof() {
        let item = parse_module_item(state, parse_type, parse_expression, parse_statement).map_err(|e| {
            state.reset(start);
            e
        })?;
        items.push(item);
        state.skip_separators();
    }
    let close = token_image(state, "}").map_err(|e| {
        state.reset(start);
        e
    })?;
    let _ = open;
    let range = ns_tok.range.merge(&close.range);
    Ok(NamespaceDeclaration { name: Ident::new(name_tok.image, name_tok.range), imports, items, range })
}

fn parse_function_declaration(
    state: &mut ParseState,
    parse_type: &ParseFn<TypeNode>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<FunctionDeclaration> {
    let start = state.mark();
    let func_tok = token_image(state, "func").map_err(|e| {
        state.reset(start);
        e
    })?;
    let return_type = parse_type(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let name_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    let type_params = optional(state, |s| parse_type_param_list(s)).unwrap_or_default();
    if let Err(e) = token_image(state, "(") {
        state.reset(start);
        return Err(e);
    }
    let params = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_function_param(s, parse_type)).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, ")") {
        state.reset(start);
        return Err(e);
    }
    let body = parse_function_body_decl(state, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = func_tok.range.merge(body_range(&body));
    Ok(FunctionDeclaration { return_type, name: Ident::new(name_tok.image, name_tok.range), type_params, params, body, range, resolved: TypeSlot::new() })
}

fn parse_function_param(state: &mut ParseState, parse_type: &ParseFn<TypeNode>) -> ParseResult<Param> {
    let ty = parse_type(state)?;
    let name_tok = token(state, TokenKind::Ident)?;
    Ok(Param { name: Ident::new(name_tok.image, name_tok.range), ty })
}

/// A function/anonymous-function body: `'=>' Expression` shorthand, or a
/// brace block produced by `parse_statement`.
fn parse_function_body_decl(state: &mut ParseState, parse_statement: &ParseFn<Statement>) -> ParseResult<crate::ast::FunctionBody> {
    if token_image(state, "=>").is_ok() {
        let stmt = parse_statement(state)?;
        return match stmt {
            Statement::ExpressionStatement { expr, .. } => Ok(crate::ast::FunctionBody::Expression(expr)),
            other => Ok(crate::ast::FunctionBody::Statement(other)),
        };
    }
    let stmt = parse_statement(state)?;
    match stmt {
        block @ Statement::Block { .. } => Ok(crate::ast::FunctionBody::Block(block)),
        other => Ok(crate::ast::FunctionBody::Statement(other)),
    }
}

fn body_range(body: &crate::ast::FunctionBody) -> &langc_common::FileRange {
    match body {
        crate::ast::FunctionBody::Block(s) | crate::ast::FunctionBody::Statement(s) => s.range(),
        crate::ast::FunctionBody::Expression(e) => e.range(),
    }
}

/// `ImportDeclaration := 'import' 'from' StringLiteral ':' (ImportItemList |
/// Ident)` (§4.4, §4.5). The bare-identifier form is sugar for importing
/// the default export, desugared here into the uniform brace form (see
/// [`ImportItem`]'s doc comment).
fn parse_import(state: &mut ParseState) -> ParseResult<ImportDeclaration> {
    let start = state.mark();
    let import_tok = token_image(state, "import").map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "from") {
        state.reset(start);
        return Err(e);
    }
    let module_tok = token(state, TokenKind::StringLiteral).map_err(|e| {
        state.reset(start);
        e
    })?;
    let module_name = match module_tok.value.clone() {
        Some(langc_common::TokenValue::Str(s)) => s,
        _ => unreachable!("lexer always attaches a Str value to StringLiteral"),
    };
    if let Err(e) = token_image(state, ":") {
        state.reset(start);
        return Err(e);
    }
    let items = if state.at_image("{") {
        parse_import_item_list(state).map_err(|e| {
            state.reset(start);
            e
        })?
    } else {
        let name_tok = token(state, TokenKind::Ident).map_err(|e| {
            state.reset(start);
            e
        })?;
        let alias = Ident::new(name_tok.image, name_tok.range.clone());
        vec![ImportItem { name: Ident::new("default", name_tok.range.clone()), alias: Some(alias) }]
    };
    let last_range = items.last().map(|i| i.alias.as_ref().unwrap_or(&i.name).range.clone()).unwrap_or_else(|| module_tok.range.clone());
    let range = import_tok.range.merge(&last_range);
    Ok(ImportDeclaration { module_name, module_range: module_tok.range, items, range })
}

fn parse_import_item_list(state: &mut ParseState) -> ParseResult<Vec<ImportItem>> {
    token_image(state, "{")?;
    let items = repeat(state, Cardinality::ZeroOrMore, Some(","), parse_import_item)?;
    token_image(state, "}")?;
    Ok(items)
}

fn parse_import_item(state: &mut ParseState) -> ParseResult<ImportItem> {
    let name_tok = token(state, TokenKind::Ident)?;
    let alias = optional(state, |s| {
        token_image(s, "as")?;
        let alias_tok = token(s, TokenKind::Ident)?;
        Ok(Ident::new(alias_tok.image, alias_tok.range))
    });
    Ok(ImportItem { name: Ident::new(name_tok.image, name_tok.range), alias })
}

/// The six `export` cases plus the four `export ... from` forwarding sugar
/// forms (§4.4, §9 open question (iii)). The inline-declaration case is
/// tried first since it's the only one requiring more than a couple of
/// tokens' lookahead to rule out.
fn parse_export_or_forward(
    state: &mut ParseState,
    parse_type: &ParseFn<TypeNode>,
    parse_expression: &ParseFn<Expression>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<ModuleItem> {
    let start = state.mark();
    token_image(state, "export").map_err(|e| {
        state.reset(start);
        e
    })?;

    if let Some(item) = optional(state, |s| {
        let decl = parse_declaration(s, parse_type, parse_expression, parse_statement)?;
        Ok(ModuleItem::Export(ExportDeclaration::Inline(decl)))
    }) {
        return Ok(item);
    }

    if state.at_image("default") {
        return parse_export_default(state, start, parse_type, parse_statement);
    }
    if state.at_image("*") {
        return parse_export_wildcard(state, start);
    }
    if state.at_image("{") {
        return parse_export_braced(state, start);
    }

    // `export name` / `export name as alias` / `export name default from "m"`.
    let name_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    let name = Ident::new(name_tok.image, name_tok.range.clone());
    if state.at_image("default") {
        state.bump();
        if let Err(e) = token_image(state, "from") {
            state.reset(start);
            return Err(e);
        }
        let module_tok = token(state, TokenKind::StringLiteral).map_err(|e| {
            state.reset(start);
            e
        })?;
        let module_name = string_value(&module_tok);
        let range = name_tok.range.merge(&module_tok.range);
        return Ok(ModuleItem::ExportForward(ExportForwardDeclaration::DefaultToNamed { module_name, name, range }));
    }
    let alias = optional(state, |s| {
        token_image(s, "as")?;
        let alias_tok = token(s, TokenKind::Ident)?;
        Ok(Ident::new(alias_tok.image, alias_tok.range))
    });
    let end_range = alias.as_ref().map(|a| a.range.clone()).unwrap_or_else(|| name.range.clone());
    let range = name_tok.range.merge(&end_range);
    Ok(ModuleItem::Export(ExportDeclaration::Named { name, alias, range }))
}

fn parse_export_default(
    state: &mut ParseState,
    start: crate::state::Mark,
    parse_type: &ParseFn<TypeNode>,
    parse_statement: &ParseFn<Statement>,
) -> ParseResult<ModuleItem> {
    let default_tok = token_image(state, "default").map_err(|e| {
        state.reset(start);
        e
    })?;

    if state.at_image("from") {
        state.bump();
        let module_tok = token(state, TokenKind::StringLiteral).map_err(|e| {
            state.reset(start);
            e
        })?;
        let module_name = string_value(&module_tok);
        let range = default_tok.range.merge(&module_tok.range);
        return Ok(ModuleItem::ExportForward(ExportForwardDeclaration::DefaultToDefault { module_name, range }));
    }

    if state.at_image("type") {
        let type_tok = state.bump();
        let type_params = optional(state, |s| parse_type_param_list(s)).unwrap_or_default();
        if let Err(e) = token_image(state, "=") {
            state.reset(start);
            return Err(e);
        }
        let ty = parse_type(state).map_err(|e| {
            state.reset(start);
            e
        })?;
        let range = type_tok.range.merge(ty.range());
        return Ok(ModuleItem::Export(ExportDeclaration::DefaultAnonymousType(AnonymousTypeDeclaration {
            type_params,
            ty,
            range,
            resolved: TypeSlot::new(),
        })));
    }

    // A lone identifier with nothing else following is `export default
    // name`; anything more (a return type that's part of a function
    // signature) is the anonymous-function form.
    if state.at(TokenKind::Ident) {
        if let Some(item) = optional(state, |s| {
            let name_tok = token(s, TokenKind::Ident)?;
            Ok(Ident::new(name_tok.image, name_tok.range))
        }) {
            if !state.at_image("(") && !state.at(TokenKind::Ident) {
                let range = default_tok.range.merge(&item.range);
                return Ok(ModuleItem::Export(ExportDeclaration::DefaultNamed { name: item, range }));
            }
        }
    }

    if let Err(e) = token_image(state, "func") {
        state.reset(start);
        return Err(e);
    }
    let return_type = parse_type(state).map_err(|e| {
        state.reset(start);
        e
    })?;
    let type_params = optional(state, |s| parse_type_param_list(s)).unwrap_or_default();
    if let Err(e) = token_image(state, "(") {
        state.reset(start);
        return Err(e);
    }
    let params = repeat(state, Cardinality::ZeroOrMore, Some(","), |s| parse_function_param(s, parse_type)).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, ")") {
        state.reset(start);
        return Err(e);
    }
    let body = parse_function_body_decl(state, parse_statement).map_err(|e| {
        state.reset(start);
        e
    })?;
    let range = default_tok.range.merge(body_range(&body));
    Ok(ModuleItem::Export(ExportDeclaration::DefaultAnonymousFunction(AnonymousFunctionDeclaration {
        return_type,
        type_params,
        params,
        body,
        range,
        resolved: TypeSlot::new(),
    })))
}

fn parse_export_wildcard(state: &mut ParseState, start: crate::state::Mark) -> ParseResult<ModuleItem> {
    let star_tok = token_image(state, "*").map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "as") {
        state.reset(start);
        return Err(e);
    }
    let alias_tok = token(state, TokenKind::Ident).map_err(|e| {
        state.reset(start);
        e
    })?;
    if let Err(e) = token_image(state, "from") {
        state.reset(start);
        return Err(e);
    }
    let module_tok = token(state, TokenKind::StringLiteral).map_err(|e| {
        state.reset(start);
        e
    })?;
    let module_name = string_value(&module_tok);
    let range = star_tok.range.merge(&module_tok.range);
    Ok(ModuleItem::ExportForward(ExportForwardDeclaration::Wildcard {
        module_name,
        alias: Ident::new(alias_tok.image, alias_tok.range),
        range,
    }))
}

/// `export { a, b as c }` (Bundle) or `export { a, b as c } from "m"`
/// (NamedToNamed forward); the brace list is shared and only the trailing
/// `from` clause tells them apart.
fn parse_export_braced(state: &mut ParseState, start: crate::state::Mark) -> ParseResult<ModuleItem> {
    let open = token_image(state, "{").map_err(|e| {
        state.reset(start);
        e
    })?;
    let items = repeat(state, Cardinality::ZeroOrMore, Some(","), parse_bundle_item).map_err(|e| {
        state.reset(start);
        e
    })?;
    let close = token_image(state, "}").map_err(|e| {
        state.reset(start);
        e
    })?;
    if state.at_image("from") {
        state.bump();
        let module_tok = token(state, TokenKind::StringLiteral).map_err(|e| {
            state.reset(start);
            e
        })?;
        let module_name = string_value(&module_tok);
        let range = open.range.merge(&module_tok.range);
        return Ok(ModuleItem::ExportForward(ExportForwardDeclaration::NamedToNamed { module_name, items, range }));
    }
    let range = open.range.merge(&close.range);
    Ok(ModuleItem::Export(ExportDeclaration::Bundle { items, range }))
}

fn parse_bundle_item(state: &mut ParseState) -> ParseResult<(Ident, Option<Ident>)> {
    let name_tok = token(state, TokenKind::Ident)?;
    let alias = optional(state, |s| {
        token_image(s, "as")?;
        let alias_tok = token(s, TokenKind::Ident)?;
        Ok(Ident::new(alias_tok.image, alias_tok.range))
    });
    Ok((Ident::new(name_tok.image, name_tok.range), alias))
}

fn string_value(tok: &langc_common::Token) -> String {
    match &tok.value {
        Some(langc_common::TokenValue::Str(s)) => s.clone(),
        _ => unreachable!("lexer always attaches a Str value to StringLiteral"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_lexer::{Lexer, Mode};
    use std::rc::Rc;

    fn environment() -> (ParseFn<TypeNode>, ParseFn<Expression>, ParseFn<Statement>) {
        let types_api = crate::grammar::types::register();
        let stmt_cell: std::rc::Rc<std::cell::RefCell<Option<ParseFn<Statement>>>> = std::rc::Rc::new(std::cell::RefCell::new(None));
        let stmt_cell_for_expr = stmt_cell.clone();
        let deferred_statement: ParseFn<Statement> = Rc::new(move |s: &mut ParseState| {
            let f = stmt_cell_for_expr.borrow().clone().expect("statement grammar registered");
            f(s)
        });
        let expr_api = crate::grammar::expressions::register(types_api.parse_type.clone(), deferred_statement);
        let stmt_api = crate::grammar::statements::register(types_api.parse_type.clone(), expr_api.parse_expression.clone());
        *stmt_cell.borrow_mut() = Some(stmt_api.parse_statement.clone());
        (types_api.parse_type, expr_api.parse_expression, stmt_api.parse_statement)
    }

    fn parse(src: &str) -> ModuleRoot {
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex ok");
        let mut state = ParseState::new(&tokens);
        let (parse_type, parse_expression, parse_statement) = environment();
        parse_module_impl(&mut state, &parse_type, &parse_expression, &parse_statement).expect("parse ok")
    }

    #[test]
    fn parses_bare_default_import() {
        let root = parse("import from \"mod\": x\n");
        assert_eq!(root.imports.len(), 1);
        assert_eq!(root.imports[0].items[0].name.name, "default");
        assert_eq!(root.imports[0].items[0].bound_name().name, "x");
    }

    #[test]
    fn parses_braced_import_with_alias() {
        let root = parse("import from \"mod\": { a, b as c }\n");
        assert_eq!(root.imports[0].items.len(), 2);
        assert_eq!(root.imports[0].items[1].bound_name().name, "c");
    }

    #[test]
    fn parses_type_declaration() {
        let root = parse("type Foo = i32\n");
        match &root.items[0] {
            ModuleItem::Declaration(Declaration::Type(d)) => assert_eq!(d.name.name, "Foo"),
            other => panic!("expected type declaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_constant_declaration() {
        let root = parse("const X = 1\n");
        match &root.items[0] {
            ModuleItem::Declaration(Declaration::Constant(d)) => assert_eq!(d.name.name, "X"),
            other => panic!("expected constant declaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_function_declaration_with_expression_body() {
        let root = parse("func i32 add(i32 x, i32 y) => x + y\n");
        match &root.items[0] {
            ModuleItem::Declaration(Declaration::Function(d)) => {
                assert_eq!(d.name.name, "add");
                assert_eq!(d.params.len(), 2);
            }
            other => panic!("expected function declaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_namespace_declaration() {
        let root = parse("namespace ns {\n const X = 1\n}\n");
        match &root.items[0] {
            ModuleItem::Declaration(Declaration::Namespace(d)) => assert_eq!(d.items.len(), 1),
            other => panic!("expected namespace declaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_inline_export() {
        let root = parse("export const X = 1\n");
        match &root.items[0] {
            ModuleItem::Export(ExportDeclaration::Inline(Declaration::Constant(d))) => assert_eq!(d.name.name, "X"),
            other => panic!("expected inline export, got {other:?}"),
        }
    }

    #[test]
    fn parses_named_export() {
        let root = parse("const X = 1\nexport X as Y\n");
        match &root.items[1] {
            ModuleItem::Export(ExportDeclaration::Named { name, alias: Some(alias), .. }) => {
                assert_eq!(name.name, "X");
                assert_eq!(alias.name, "Y");
            }
            other => panic!("expected named export, got {other:?}"),
        }
    }

    #[test]
    fn parses_default_named_export() {
        let root = parse("const X = 1\nexport default X\n");
        match &root.items[1] {
            ModuleItem::Export(ExportDeclaration::DefaultNamed { name, .. }) => assert_eq!(name.name, "X"),
            other => panic!("expected default-named export, got {other:?}"),
        }
    }

    #[test]
    fn parses_export_bundle() {
        let root = parse("const X = 1\nconst Y = 2\nexport { X, Y as Z }\n");
        match &root.items[2] {
            ModuleItem::Export(ExportDeclaration::Bundle { items, .. }) => assert_eq!(items.len(), 2),
            other => panic!("expected export bundle, got {other:?}"),
        }
    }

    #[test]
    fn parses_default_to_default_forward() {
        let root = parse("export default from \"mod\"\n");
        assert!(matches!(root.items[0], ModuleItem::ExportForward(ExportForwardDeclaration::DefaultToDefault { .. })));
    }

    #[test]
    fn parses_named_to_named_forward() {
        let root = parse("export { a, b as c } from \"mod\"\n");
        match &root.items[0] {
            ModuleItem::ExportForward(ExportForwardDeclaration::NamedToNamed { items, .. }) => assert_eq!(items.len(), 2),
            other => panic!("expected named-to-named forward, got {other:?}"),
        }
    }

    #[test]
    fn parses_wildcard_forward() {
        let root = parse("export * as ns from \"mod\"\n");
        assert!(matches!(root.items[0], ModuleItem::ExportForward(ExportForwardDeclaration::Wildcard { .. })));
    }
}
