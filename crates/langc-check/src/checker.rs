//! The visitor itself (§4.6): walks declarations in module order, writes
//! each node's [`TypeSlot`] exactly once, and collects non-fatal
//! [`CheckError`]s as it goes instead of halting (§7 policy).
//!
//! Declarations are checked in four passes per scope level (module root, or
//! one `namespace { ... }` body): predeclare type names (so recursive and
//! forward type references resolve), hoist function signatures (so mutual
//! recursion between functions works), resolve each type declaration's
//! body, then check everything — function/lambda bodies, constant values,
//! nested namespaces — in source order. Constants are deliberately *not*
//! hoisted: a constant can only reference declarations that precede it,
//! which keeps "what's in scope" simple without needing a value-level
//! dependency analysis the source spec never asked for.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use langc_common::FileRange;
use langc_parser::ast::{
    AnonymousFunctionDeclaration, AnonymousTypeDeclaration, BuiltIn, Declaration, Expression, ExportDeclaration,
    ExportForwardDeclaration, FunctionBody, FunctionDeclaration, Ident, LambdaParams, ModuleItem, ModuleRoot,
    Statement, TypeNode, TypeParamNode,
};
use langc_types::ops::{DeclResolver, TypeOpError};
use langc_types::{DeclId, FloatSize, IntSize, Type, TypeParam, Variance};

use crate::error::CheckErrorKind;
use crate::operators;
use crate::scope::ScopeStack;

/// Resolves `Recursive(id)` against the decl table this checker run has
/// built up so far (§9 "module ownership via ids, not pointers").
struct Resolver<'a>(&'a FxHashMap<DeclId, Type>);

impl<'a> DeclResolver for Resolver<'a> {
    fn resolve_recursive(&self, id: DeclId) -> Type {
        self.0.get(&id).cloned().unwrap_or(Type::Unknown)
    }
}

pub struct Checker {
    scope: ScopeStack,
    diagnostics: Vec<crate::error::CheckError>,
    /// Module-level `type` declarations, by name — not scope-stack-frame
    /// local, since a `type` declaration is visible for the whole enclosing
    /// scope level regardless of where it appears in source order.
    named_types: FxHashMap<String, Type>,
    type_decl_ids: FxHashMap<String, DeclId>,
    decl_resolver: FxHashMap<DeclId, Type>,
    next_decl_id: u32,
    next_namespace_id: u32,
    forwards: Vec<ExportForwardDeclaration>,
}

impl Checker {
    pub fn new() -> Self {
        Self {
            scope: ScopeStack::new(),
            diagnostics: Vec::new(),
            named_types: FxHashMap::default(),
            type_decl_ids: FxHashMap::default(),
            decl_resolver: FxHashMap::default(),
            next_decl_id: 0,
            next_namespace_id: 0,
            forwards: Vec::new(),
        }
    }

    pub fn declare_import(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        self.scope.declare_value(name.clone(), ty.clone());
        self.named_types.insert(name, ty);
    }

    pub fn check_module(&mut self, module: &ModuleRoot) -> IndexMap<String, Type> {
        self.check_items(&module.items)
    }

    pub fn into_parts(self) -> (Vec<crate::error::CheckError>, Vec<ExportForwardDeclaration>) {
        (self.diagnostics, self.forwards)
    }

    fn error(&mut self, kind: CheckErrorKind, range: &FileRange) {
        self.diagnostics.push(crate::error::CheckError::new(kind, range.clone()));
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver(&self.decl_resolver)
    }

    fn assignable(&self, to: &Type, from: &Type) -> bool {
        to.assignable_from(from, &self.resolver())
    }

    fn fresh_decl_id(&mut self) -> DeclId {
        let id = DeclId(self.next_decl_id);
        self.next_decl_id += 1;
        id
    }

    fn fresh_namespace_id(&mut self) -> u32 {
        let id = self.next_namespace_id;
        self.next_namespace_id += 1;
        id
    }

    // ── Per-scope-level driver ───────────────────────────────────────────

    fn check_items(&mut self, items: &[ModuleItem]) -> IndexMap<String, Type> {
        self.check_duplicate_names(items);
        self.predeclare_types(items);
        self.hoist_function_signatures(items);
        self.resolve_type_declarations(items);

        let mut exports: IndexMap<String, Type> = IndexMap::new();
        for item in items {
            match item {
                ModuleItem::Declaration(d) => {
                    self.check_declaration(d);
                }
                ModuleItem::Export(ExportDeclaration::Inline(d)) => {
                    let ty = self.check_declaration(d);
                    if let Some(name) = d.name() {
                        self.insert_export(&mut exports, name.name.clone(), ty, &name.range);
                    }
                }
                ModuleItem::Export(ExportDeclaration::Named { name, alias, range }) => {
                    let ty = self.lookup_declared_or_error(name, range);
                    let export_name = alias.as_ref().map(|a| a.name.clone()).unwrap_or_else(|| name.name.clone());
                    self.insert_export(&mut exports, export_name, ty, range);
                }
                ModuleItem::Export(ExportDeclaration::DefaultNamed { name, range }) => {
                    let ty = self.lookup_declared_or_error(name, range);
                    self.insert_export(&mut exports, "default".to_string(), ty, range);
                }
                ModuleItem::Export(ExportDeclaration::Bundle { items: bundle, range }) => {
                    for (name, alias) in bundle {
                        let ty = self.lookup_declared_or_error(name, range);
                        let export_name = alias.as_ref().map(|a| a.name.clone()).unwrap_or_else(|| name.name.clone());
                        self.insert_export(&mut exports, export_name, ty, range);
                    }
                }
                ModuleItem::Export(ExportDeclaration::DefaultAnonymousFunction(afd)) => {
                    let ty = self.check_anonymous_function(afd);
                    self.insert_export(&mut exports, "default".to_string(), ty, &afd.range);
                }
                ModuleItem::Export(ExportDeclaration::DefaultAnonymousType(atd)) => {
                    let ty = self.check_anonymous_type(atd);
                    self.insert_export(&mut exports, "default".to_string(), ty, &atd.range);
                }
                ModuleItem::ExportForward(fwd) => {
                    // Resolving these needs another module's export table,
                    // which only the loader has (§4.5) — surfaced for it
                    // to finish rather than handled here.
                    self.forwards.push(fwd.clone());
                }
            }
        }
        exports
    }

    fn insert_export(&mut self, exports: &mut IndexMap<String, Type>, name: String, ty: Type, range: &FileRange) {
        if exports.contains_key(&name) {
            self.error(CheckErrorKind::ExportNameClash { name: name.clone() }, range);
        }
        exports.insert(name, ty);
    }

    fn lookup_declared_or_error(&mut self, name: &Ident, range: &FileRange) -> Type {
        self.lookup_declared(&name.name).unwrap_or_else(|| {
            self.error(CheckErrorKind::NameNotDefined { name: name.name.clone() }, range);
            Type::Unknown
        })
    }

    fn lookup_declared(&self, name: &str) -> Option<Type> {
        self.scope.lookup_value(name).cloned().or_else(|| self.named_types.get(name).cloned())
    }

    fn check_duplicate_names(&mut self, items: &[ModuleItem]) {
        let mut seen: FxHashMap<String, ()> = FxHashMap::default();
        for item in items {
            if let Some(name) = declaration_of(item).and_then(Declaration::name) {
                if seen.contains_key(&name.name) {
                    self.error(CheckErrorKind::ExportNameClash { name: name.name.clone() }, &name.range);
                } else {
                    seen.insert(name.name.clone(), ());
                }
            }
        }
    }

    // ── Pass 1: predeclare type names ────────────────────────────────────

    fn predeclare_types(&mut self, items: &[ModuleItem]) {
        for item in items {
            if let Some(Declaration::Type(td)) = declaration_of(item) {
                let id = self.fresh_decl_id();
                self.type_decl_ids.insert(td.name.name.clone(), id);
                self.decl_resolver.insert(id, Type::Recursive(id));
                self.named_types.insert(td.name.name.clone(), Type::Recursive(id));
            }
        }
    }

    // ── Pass 2: hoist function signatures ────────────────────────────────

    fn hoist_function_signatures(&mut self, items: &[ModuleItem]) {
        for item in items {
            if let Some(Declaration::Function(fd)) = declaration_of(item) {
                let sig = self.resolve_function_signature(fd);
                self.scope.declare_value(fd.name.name.clone(), sig);
            }
        }
    }

    fn resolve_function_signature(&mut self, fd: &FunctionDeclaration) -> Type {
        self.scope.push();
        let type_params = self.resolve_type_params(&fd.type_params);
        let param_types: Vec<Type> = fd.params.iter().map(|p| self.resolve_type_node(&p.ty)).collect();
        let ret = self.resolve_type_node(&fd.return_type);
        self.scope.pop();
        Type::function(param_types, ret, type_params)
    }

    fn resolve_type_params(&mut self, nodes: &[TypeParamNode]) -> IndexMap<String, TypeParam> {
        let mut type_params = IndexMap::new();
        for tp in nodes {
            let constraint = tp.constraint.as_ref().map(|c| self.resolve_type_node(c)).unwrap_or(Type::Any);
            self.scope.declare_type_param(tp.name.name.clone(), Type::param(tp.name.name.clone(), tp.variance, constraint.clone()));
            type_params.insert(tp.name.name.clone(), TypeParam::new(tp.name.name.clone(), tp.variance, constraint));
        }
        type_params
    }

    // ── Pass 3: resolve type declaration bodies ──────────────────────────

    fn resolve_type_declarations(&mut self, items: &[ModuleItem]) {
        for item in items {
            if let Some(Declaration::Type(td)) = declaration_of(item) {
                let id = *self.type_decl_ids.get(&td.name.name).expect("predeclared in pass 1");
                self.scope.push();
                let type_params = self.resolve_type_params(&td.type_params);
                let body = self.resolve_type_node(&td.ty);
                self.scope.pop();
                let ty = if type_params.is_empty() { body } else { Type::generic(type_params, body) };
                td.resolved.set(ty.clone());
                self.decl_resolver.insert(id, ty.clone());
                self.named_types.insert(td.name.name.clone(), ty);
            }
        }
    }

    // ── Pass 4: check everything ──────────────────────────────────────────

    fn check_declaration(&mut self, d: &Declaration) -> Type {
        match d {
            Declaration::Type(td) => td.resolved.get().expect("resolved in pass 3"),
            Declaration::Function(fd) => {
                let sig = self.scope.lookup_value(&fd.name.name).cloned().expect("hoisted in pass 2");
                let (param_types, ret_type, type_params) = match &sig {
                    Type::Function { params, ret, type_params } => (params.clone(), (**ret).clone(), type_params.clone()),
                    _ => unreachable!("function signatures are always Type::Function"),
                };
                self.scope.push();
                for (name, tparam) in &type_params {
                    self.scope.declare_type_param(name.clone(), Type::param(name.clone(), tparam.variance, (*tparam.constraint).clone()));
                }
                for (param, ty) in fd.params.iter().zip(param_types.iter()) {
                    self.scope.declare_value(param.name.name.clone(), ty.clone());
                }
                let body_ty = self.check_function_body(&fd.body);
                self.scope.pop();
                if !self.assignable(&ret_type, &body_ty) && !body_ty.is_bottom_like() {
                    self.error(CheckErrorKind::TypeMismatch { expected: ret_type.clone(), found: body_ty }, &fd.range);
                }
                fd.resolved.set(sig.clone());
                sig
            }
            Declaration::Constant(cd) => {
                let vt = self.check_expression(&cd.value);
                cd.resolved.set(vt.clone());
                self.scope.declare_value(cd.name.name.clone(), vt.clone());
                vt
            }
            Declaration::Namespace(nd) => self.check_namespace(nd),
            Declaration::AnonymousFunction(afd) => self.check_anonymous_function(afd),
            Declaration::AnonymousType(atd) => self.check_anonymous_type(atd),
        }
    }

    fn check_namespace(&mut self, nd: &langc_parser::ast::NamespaceDeclaration) -> Type {
        self.scope.push();
        let exports = self.check_items(&nd.items);
        self.scope.pop();
        let id = self.fresh_namespace_id();
        let ty = Type::Namespace { module_id: id, exports };
        self.scope.declare_value(nd.name.name.clone(), ty.clone());
        self.named_types.insert(nd.name.name.clone(), ty.clone());
        ty
    }

    fn check_anonymous_function(&mut self, afd: &AnonymousFunctionDeclaration) -> Type {
        self.scope.push();
        let type_params = self.resolve_type_params(&afd.type_params);
        let param_types: Vec<Type> = afd.params.iter().map(|p| self.resolve_type_node(&p.ty)).collect();
        for (p, ty) in afd.params.iter().zip(param_types.iter()) {
            self.scope.declare_value(p.name.name.clone(), ty.clone());
        }
        let ret_type = self.resolve_type_node(&afd.return_type);
        let body_ty = self.check_function_body(&afd.body);
        self.scope.pop();
        if !self.assignable(&ret_type, &body_ty) && !body_ty.is_bottom_like() {
            self.error(CheckErrorKind::TypeMismatch { expected: ret_type.clone(), found: body_ty }, &afd.range);
        }
        let sig = Type::function(param_types, ret_type, type_params);
        afd.resolved.set(sig.clone());
        sig
    }

    fn check_anonymous_type(&mut self, atd: &AnonymousTypeDeclaration) -> Type {
        self.scope.push();
        let type_params = self.resolve_type_params(&atd.type_params);
        let body = self.resolve_type_node(&atd.ty);
        self.scope.pop();
        let ty = if type_params.is_empty() { body } else { Type::generic(type_params, body) };
        atd.resolved.set(ty.clone());
        ty
    }

    fn check_function_body(&mut self, body: &FunctionBody) -> Type {
        match body {
            FunctionBody::Block(stmt) | FunctionBody::Statement(stmt) => self.check_statement(stmt),
            FunctionBody::Expression(expr) => self.check_expression(expr),
        }
    }

    // ── Statements ────────────────────────────────────────────────────────

    fn check_block_statements(&mut self, statements: &[Statement]) -> Type {
        let mut ty = Type::Tuple(vec![]);
        for stmt in statements {
            let t = self.check_statement(stmt);
            ty = langc_types::ops::general(&ty, &t);
        }
        ty
    }

    fn check_statement(&mut self, stmt: &Statement) -> Type {
        match stmt {
            Statement::Block { statements, resolved, .. } => {
                let ty = self.check_block_statements(statements);
                resolved.set(ty.clone());
                ty
            }
            Statement::ExpressionStatement { expr, .. } => self.check_expression(expr),
            Statement::For { binding, iterable, body, range } => {
                let it = self.check_expression(iterable);
                let elem = it.get_base_type().unwrap_or_else(|_| {
                    if !it.is_bottom_like() {
                        self.error(CheckErrorKind::NotArray { found: it.clone() }, range);
                    }
                    Type::Unknown
                });
                self.scope.push_loop();
                self.scope.declare_value(binding.name.clone(), elem);
                self.check_statement(body);
                self.scope.pop();
                Type::Tuple(vec![])
            }
            Statement::While { condition, body, range } => {
                self.check_bool_condition(condition, range);
                self.scope.push_loop();
                self.check_statement(body);
                self.scope.pop();
                Type::Tuple(vec![])
            }
            Statement::DoWhile { body, condition, range } => {
                self.scope.push_loop();
                self.check_statement(body);
                self.scope.pop();
                self.check_bool_condition(condition, range);
                Type::Tuple(vec![])
            }
            Statement::TryCatch { try_block, catch_param, catch_block, finally_block, .. } => {
                let tt = self.check_statement(try_block);
                self.scope.push();
                if let Some(p) = catch_param {
                    let pt = self.resolve_type_node(&p.ty);
                    self.scope.declare_value(p.name.name.clone(), pt);
                }
                let ct = self.check_statement(catch_block);
                self.scope.pop();
                let merged = langc_types::ops::general(&tt, &ct);
                match finally_block {
                    Some(f) => {
                        let ft = self.check_statement(f);
                        langc_types::ops::general(&merged, &ft)
                    }
                    None => merged,
                }
            }
            Statement::Return { value, .. } => {
                if let Some(v) = value {
                    self.check_expression(v);
                }
                Type::Never
            }
            Statement::Throw { value, .. } => {
                self.check_expression(value);
                Type::Never
            }
            Statement::Break { range } => {
                if !self.scope.in_loop() {
                    self.error(CheckErrorKind::InvalidBreakOutsideLoop, range);
                }
                Type::Never
            }
            Statement::Continue { range } => {
                if !self.scope.in_loop() {
                    self.error(CheckErrorKind::InvalidContinueOutsideLoop, range);
                }
                Type::Never
            }
        }
    }

    fn check_bool_condition(&mut self, condition: &Expression, range: &FileRange) {
        let ct = self.check_expression(condition);
        if !matches!(ct, Type::Bool) && !ct.is_bottom_like() {
            self.error(CheckErrorKind::TypeMismatch { expected: Type::Bool, found: ct }, range);
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────

    fn check_expression(&mut self, expr: &Expression) -> Type {
        match expr {
            Expression::IntegerLiteral { value, resolved, .. } => {
                let ty = integer_literal_type(*value);
                resolved.set(ty.clone());
                ty
            }
            Expression::FloatLiteral { resolved, .. } => {
                let ty = Type::Float(FloatSize::S64);
                resolved.set(ty.clone());
                ty
            }
            Expression::CharLiteral { resolved, .. } => {
                resolved.set(Type::Char);
                Type::Char
            }
            Expression::BoolLiteral { resolved, .. } => {
                resolved.set(Type::Bool);
                Type::Bool
            }
            Expression::StringLiteral { resolved, .. } => {
                let ty = Type::Array(Box::new(Type::Char));
                resolved.set(ty.clone());
                ty
            }
            Expression::StructLiteral { fields, resolved, .. } => {
                let mut field_types = IndexMap::new();
                for (name, value) in fields {
                    let vt = self.check_expression(value);
                    field_types.insert(name.name.clone(), vt);
                }
                let ty = Type::Struct(field_types);
                resolved.set(ty.clone());
                ty
            }
            Expression::TupleLiteral { members, resolved, .. } => {
                let mut types = Vec::with_capacity(members.len());
                for m in members {
                    types.push(self.check_expression(m));
                }
                let ty = Type::Tuple(types);
                resolved.set(ty.clone());
                ty
            }
            Expression::ArrayLiteral { elements, resolved, .. } => {
                let mut elem_ty = Type::Never;
                for e in elements {
                    let t = self.check_expression(e);
                    elem_ty = langc_types::ops::general(&elem_ty, &t);
                }
                let ty = Type::Array(Box::new(elem_ty));
                resolved.set(ty.clone());
                ty
            }
            Expression::Identifier { name, resolved } => {
                let ty = self.scope.lookup_value(&name.name).cloned().unwrap_or_else(|| {
                    self.error(CheckErrorKind::NameNotDefined { name: name.name.clone() }, &name.range);
                    Type::Unknown
                });
                resolved.set(ty.clone());
                ty
            }
            Expression::Parenthesized { inner, .. } => self.check_expression(inner),
            Expression::VarDeclaration { name, value, resolved, .. } => {
                let vt = self.check_expression(value);
                self.scope.declare_value(name.name.clone(), vt.clone());
                resolved.set(vt.clone());
                vt
            }
            Expression::Unary { op, operand, is_postfix, resolved, range } => {
                let ot = self.check_expression(operand);
                let ty = operators::resolve_unary(op, *is_postfix, &ot).unwrap_or_else(|| {
                    if !ot.is_bottom_like() {
                        self.error(CheckErrorKind::InvalidOperator { symbol: op.clone(), operand_a: ot.clone(), operand_b: None }, range);
                    }
                    Type::Unknown
                });
                resolved.set(ty.clone());
                ty
            }
            Expression::Binary { op, left, right, resolved, range } => {
                let lt = self.check_expression(left);
                let rt = self.check_expression(right);
                let ty = operators::resolve_binary(op, &lt, &rt).unwrap_or_else(|| {
                    if !lt.is_bottom_like() && !rt.is_bottom_like() {
                        self.error(
                            CheckErrorKind::InvalidOperator { symbol: op.clone(), operand_a: lt.clone(), operand_b: Some(rt.clone()) },
                            range,
                        );
                    }
                    Type::Unknown
                });
                resolved.set(ty.clone());
                ty
            }
            Expression::Call { callee, type_args, args, resolved, range } => {
                let ty = self.check_call(callee, type_args.as_deref(), args, range);
                resolved.set(ty.clone());
                ty
            }
            Expression::ArrayAccess { base, index, resolved, range } => {
                let bt = self.check_expression(base);
                self.check_expression(index);
                let ty = bt.get_base_type().unwrap_or_else(|_| {
                    if !bt.is_bottom_like() {
                        self.error(CheckErrorKind::NotArray { found: bt.clone() }, range);
                    }
                    Type::Unknown
                });
                resolved.set(ty.clone());
                ty
            }
            Expression::FieldAccess { base, field, resolved, range } => {
                let bt = self.check_expression(base);
                let ty = self.resolve_struct_or_namespace_field(&bt, field, range);
                resolved.set(ty.clone());
                ty
            }
            Expression::IfElse { condition, then_branch, else_branch, resolved, range } => {
                self.check_bool_condition(condition, range);
                let tt = self.check_expression(then_branch);
                let et = match else_branch {
                    Some(e) => self.check_expression(e),
                    None => Type::Tuple(vec![]),
                };
                let ty = langc_types::ops::general(&tt, &et);
                resolved.set(ty.clone());
                ty
            }
            Expression::Lambda { params, body, resolved, range } => self.check_lambda(params, body, resolved, range, None),
            Expression::Block { statements, resolved, .. } => {
                let ty = self.check_block_statements(statements);
                resolved.set(ty.clone());
                ty
            }
        }
    }

    fn resolve_struct_or_namespace_field(&mut self, base: &Type, field: &Ident, range: &FileRange) -> Type {
        if let Type::Namespace { exports, .. } = base {
            return exports.get(&field.name).cloned().unwrap_or_else(|| {
                self.error(
                    CheckErrorKind::ModuleDoesNotExportName { module_name: "<namespace>".to_string(), name: field.name.clone() },
                    range,
                );
                Type::Unknown
            });
        }
        match base.get_field(&field.name) {
            Ok(ty) => ty,
            Err(TypeOpError::NoSuchField(name)) => {
                self.error(CheckErrorKind::NoSuchField { ty: base.clone(), field: name }, range);
                Type::Unknown
            }
            Err(_) => {
                if !base.is_bottom_like() {
                    self.error(CheckErrorKind::NotStruct { found: base.clone() }, range);
                }
                Type::Unknown
            }
        }
    }

    /// Lambda two-phase resolution (§4.6, §9 open question): with no
    /// `expected` signature, a lambda with a shorthand (untyped) parameter
    /// resolves to a `Function(Inferred, Inferred)` skeleton and its body is
    /// left unchecked — there's nothing to check it against yet, and no
    /// second visit of this node will ever happen. When a call site *does*
    /// supply a concrete expected parameter type (see `check_call`), this
    /// runs once, already complete: the Inferred slot never gets written.
    fn check_lambda(
        &mut self,
        params: &LambdaParams,
        body: &FunctionBody,
        resolved: &langc_parser::ast::TypeSlot,
        range: &FileRange,
        expected: Option<&Type>,
    ) -> Type {
        let expected_fn = expected.and_then(|t| match t {
            Type::Function { params, ret, .. } => Some((params.clone(), (**ret).clone())),
            _ => None,
        });

        let param_types: Vec<Type> = match params {
            LambdaParams::Named(list) => list.iter().map(|p| self.resolve_type_node(&p.ty)).collect(),
            LambdaParams::Shorthand(_) => {
                vec![expected_fn.as_ref().and_then(|(ep, _)| ep.first().cloned()).unwrap_or(Type::Inferred)]
            }
        };

        if param_types.iter().any(|t| matches!(t, Type::Inferred)) {
            let ty = Type::function(param_types, Type::Inferred, IndexMap::new());
            resolved.set(ty.clone());
            return ty;
        }

        self.scope.push();
        let names: Vec<String> = match params {
            LambdaParams::Named(list) => list.iter().map(|p| p.name.name.clone()).collect(),
            LambdaParams::Shorthand(ident) => vec![ident.name.clone()],
        };
        for (name, ty) in names.iter().zip(param_types.iter()) {
            self.scope.declare_value(name.clone(), ty.clone());
        }
        let body_ty = self.check_function_body(body);
        self.scope.pop();

        let ret = match expected_fn {
            Some((_, expected_ret)) => {
                if !self.assignable(&expected_ret, &body_ty) && !body_ty.is_bottom_like() {
                    self.error(CheckErrorKind::TypeMismatch { expected: expected_ret.clone(), found: body_ty }, range);
                }
                expected_ret
            }
            None => body_ty,
        };
        let ty = Type::function(param_types, ret, IndexMap::new());
        resolved.set(ty.clone());
        ty
    }

    /// Function application, including generic application's three cases
    /// (§4.6): no explicit type arguments (infer them), explicit type
    /// arguments (validate arity and constraints), and explicit type
    /// arguments on a non-generic callee (reject).
    fn check_call(&mut self, callee: &Expression, type_args: Option<&[TypeNode]>, args: &[Expression], range: &FileRange) -> Type {
        let callee_ty = self.check_expression(callee);
        let (param_types, ret_type, type_params) = match &callee_ty {
            Type::Function { params, ret, type_params } => (params.clone(), (**ret).clone(), type_params.clone()),
            _ => {
                if !callee_ty.is_bottom_like() {
                    self.error(CheckErrorKind::NotInvokable { found: callee_ty.clone() }, range);
                }
                for a in args {
                    self.check_expression(a);
                }
                return Type::Unknown;
            }
        };

        let is_generic = !type_params.is_empty();
        let explicit_arg_types: Option<Vec<Type>> = type_args.map(|nodes| nodes.iter().map(|n| self.resolve_type_node(n)).collect());

        if !is_generic && explicit_arg_types.is_some() {
            self.error(CheckErrorKind::NotGenericFunction { found: callee_ty.clone() }, range);
        }

        // Check arguments, propagating the (non-generic) declared parameter
        // type into lambda literals so their Inferred slots can be filled.
        let arg_types: Vec<Type> = args
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let expected = if is_generic { None } else { param_types.get(i) };
                match (a, expected) {
                    (Expression::Lambda { params, body, resolved, range }, Some(expected)) => {
                        self.check_lambda(params, body, resolved, range, Some(expected))
                    }
                    _ => self.check_expression(a),
                }
            })
            .collect();

        if param_types.len() != args.len() {
            self.error(CheckErrorKind::InvalidArgCount { expected: param_types.len(), found: args.len() }, range);
        }

        let bindings: FxHashMap<String, Type> = if is_generic {
            match explicit_arg_types {
                Some(explicit) => {
                    if explicit.len() != type_params.len() {
                        self.error(CheckErrorKind::InvalidTypeArgCount { expected: type_params.len(), found: explicit.len() }, range);
                    }
                    let mut map = FxHashMap::default();
                    for ((pname, tparam), arg) in type_params.iter().zip(explicit.iter()) {
                        if !self.assignable(&tparam.constraint, arg) {
                            self.error(CheckErrorKind::InvalidTypeArg { constraint: (*tparam.constraint).clone(), found: arg.clone() }, range);
                        }
                        map.insert(pname.clone(), Type::arg(tparam.variance, arg.clone()));
                    }
                    map
                }
                None => {
                    let inferred = callee_ty.infer_type_arguments(&arg_types);
                    inferred
                        .into_iter()
                        .map(|(name, ty)| {
                            let variance = type_params.get(&name).map(|tp| tp.variance).unwrap_or(Variance::Invariant);
                            (name, Type::arg(variance, ty))
                        })
                        .collect()
                }
            }
        } else {
            FxHashMap::default()
        };

        for (expected, found) in param_types.iter().zip(arg_types.iter()) {
            let specified_expected = expected.specify(&bindings);
            if !self.assignable(&specified_expected, found) && !found.is_bottom_like() {
                self.error(CheckErrorKind::TypeMismatch { expected: strip_arg(specified_expected), found: found.clone() }, range);
            }
        }

        strip_arg(ret_type.specify(&bindings))
    }

    // ── Type nodes ────────────────────────────────────────────────────────

    fn resolve_type_node(&mut self, node: &TypeNode) -> Type {
        match node {
            TypeNode::BuiltIn { kind, resolved, .. } => {
                let ty = builtin_to_type(*kind);
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Identifier { name, resolved } => {
                let ty = self
                    .scope
                    .lookup_type_param(&name.name)
                    .cloned()
                    .or_else(|| self.named_types.get(&name.name).cloned())
                    .unwrap_or_else(|| {
                        self.error(CheckErrorKind::TypeNotDefined { name: name.name.clone() }, &name.range);
                        Type::Unknown
                    });
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Struct { fields, resolved, .. } => {
                let mut map = IndexMap::new();
                for (name, ty_node) in fields {
                    let ty = self.resolve_type_node(ty_node);
                    map.insert(name.name.clone(), ty);
                }
                let ty = Type::Struct(map);
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Tuple { members, resolved, .. } => {
                let mut types = Vec::with_capacity(members.len());
                for m in members {
                    types.push(self.resolve_type_node(m));
                }
                let ty = Type::Tuple(types);
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Array { element, resolved, .. } => {
                let elem = self.resolve_type_node(element);
                let ty = Type::Array(Box::new(elem));
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Function { params, ret, resolved, .. } => {
                let param_types: Vec<Type> = params.iter().map(|p| self.resolve_type_node(p)).collect();
                let ret_type = self.resolve_type_node(ret);
                let ty = Type::function(param_types, ret_type, IndexMap::new());
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Union { members, resolved, .. } => {
                let mut types = Vec::with_capacity(members.len());
                for m in members {
                    types.push(self.resolve_type_node(m));
                }
                let ty = Type::Union(types);
                resolved.set(ty.clone());
                ty
            }
            TypeNode::Parenthesized { inner, .. } => self.resolve_type_node(inner),
            TypeNode::Specific { base, type_args, resolved, range } => {
                let base_ty = self.resolve_type_node(base);
                let arg_types: Vec<Type> = type_args.iter().map(|a| self.resolve_type_node(a)).collect();
                let ty = self.apply_specific(&base_ty, arg_types, range);
                resolved.set(ty.clone());
                ty
            }
            TypeNode::NamespaceAccess { base, member, resolved, range } => {
                let base_ty = self.resolve_type_node(base);
                let ty = self.resolve_namespace_member(&base_ty, member, range);
                resolved.set(ty.clone());
                ty
            }
        }
    }

    fn apply_specific(&mut self, base: &Type, args: Vec<Type>, range: &FileRange) -> Type {
        match base {
            Type::Generic { type_params, body } => {
                if type_params.len() != args.len() {
                    self.error(CheckErrorKind::InvalidTypeArgCount { expected: type_params.len(), found: args.len() }, range);
                    return Type::Unknown;
                }
                let mut bindings = FxHashMap::default();
                for ((pname, tparam), arg) in type_params.iter().zip(args.iter()) {
                    if !self.assignable(&tparam.constraint, arg) {
                        self.error(CheckErrorKind::InvalidTypeArg { constraint: (*tparam.constraint).clone(), found: arg.clone() }, range);
                    }
                    bindings.insert(pname.clone(), Type::arg(tparam.variance, arg.clone()));
                }
                strip_arg(body.specify(&bindings))
            }
            _ => {
                if !base.is_bottom_like() {
                    self.error(CheckErrorKind::NotGeneric { found: base.clone() }, range);
                }
                Type::Unknown
            }
        }
    }

    fn resolve_namespace_member(&mut self, base: &Type, member: &Ident, range: &FileRange) -> Type {
        match base {
            Type::Namespace { exports, .. } => exports.get(&member.name).cloned().unwrap_or_else(|| {
                self.error(
                    CheckErrorKind::ModuleDoesNotExportName { module_name: "<namespace>".to_string(), name: member.name.clone() },
                    range,
                );
                Type::Unknown
            }),
            _ if base.is_bottom_like() => Type::Unknown,
            _ => {
                self.error(CheckErrorKind::NotANamespace { name: member.name.clone() }, range);
                Type::Unknown
            }
        }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

fn declaration_of(item: &ModuleItem) -> Option<&Declaration> {
    match item {
        ModuleItem::Declaration(d) => Some(d),
        ModuleItem::Export(ExportDeclaration::Inline(d)) => Some(d),
        _ => None,
    }
}

/// `i32`/`u8`/etc. built-in keyword to concrete `Type` (§4.6, §9 aliases):
/// `byte` is the unsigned-octet convention, `short`/`int`/`integer`/`long`
/// follow the signed C/Java convention.
fn builtin_to_type(kind: BuiltIn) -> Type {
    match kind {
        BuiltIn::I8 => Type::integer(IntSize::S8, true),
        BuiltIn::I16 => Type::integer(IntSize::S16, true),
        BuiltIn::I32 => Type::integer(IntSize::S32, true),
        BuiltIn::I64 => Type::integer(IntSize::S64, true),
        BuiltIn::U8 => Type::integer(IntSize::S8, false),
        BuiltIn::U16 => Type::integer(IntSize::S16, false),
        BuiltIn::U32 => Type::integer(IntSize::S32, false),
        BuiltIn::U64 => Type::integer(IntSize::S64, false),
        BuiltIn::Byte => Type::integer(IntSize::S8, false),
        BuiltIn::Short => Type::integer(IntSize::S16, true),
        BuiltIn::Int | BuiltIn::Integer => Type::integer(IntSize::S32, true),
        BuiltIn::Long => Type::integer(IntSize::S64, true),
        BuiltIn::F32 | BuiltIn::Float => Type::Float(FloatSize::S32),
        BuiltIn::F64 | BuiltIn::Double => Type::Float(FloatSize::S64),
        BuiltIn::Char => Type::Char,
        BuiltIn::Str => Type::Array(Box::new(Type::Char)),
        BuiltIn::Bool => Type::Bool,
        BuiltIn::Void => Type::Tuple(vec![]),
        BuiltIn::Any => Type::Any,
    }
}

/// Strips `Arg` variance markers out of a type produced by [`Type::specify`].
/// `Arg` exists so `assignable_from` can apply declared variance while
/// comparing two instantiations of the same generic; once a call or
/// `TypeNode::Specific` has fully applied its type arguments, the result
/// handed back to the rest of the checker (stored in a `TypeSlot`, compared
/// with `is_integer`, indexed with `get_field`, ...) needs to be a plain
/// concrete type again, not a `specify` implementation detail.
fn strip_arg(ty: Type) -> Type {
    match ty {
        Type::Arg { underlying, .. } => strip_arg(*underlying),
        Type::Array(elem) => Type::Array(Box::new(strip_arg(*elem))),
        Type::Struct(fields) => Type::Struct(fields.into_iter().map(|(name, ty)| (name, strip_arg(ty))).collect()),
        Type::Tuple(members) => Type::Tuple(members.into_iter().map(strip_arg).collect()),
        Type::Function { params, ret, type_params } => {
            Type::Function { params: params.into_iter().map(strip_arg).collect(), ret: Box::new(strip_arg(*ret)), type_params }
        }
        Type::Generic { type_params, body } => Type::Generic { type_params, body: Box::new(strip_arg(*body)) },
        Type::Union(members) => Type::Union(members.into_iter().map(strip_arg).collect()),
        other => other,
    }
}

/// Integer-literal typing (§4.6, P7): the smallest signed/unsigned width
/// that fits, widening 8→16→32→64→unbounded. Negative values are signed;
/// non-negative values are unsigned.
fn integer_literal_type(value: i128) -> Type {
    let signed = value < 0;
    let size = if signed {
        if value >= i8::MIN as i128 {
            IntSize::S8
        } else if value >= i16::MIN as i128 {
            IntSize::S16
        } else if value >= i32::MIN as i128 {
            IntSize::S32
        } else if value >= i64::MIN as i128 {
            IntSize::S64
        } else {
            IntSize::Unbounded
        }
    } else if value <= u8::MAX as i128 {
        IntSize::S8
    } else if value <= u16::MAX as i128 {
        IntSize::S16
    } else if value <= u32::MAX as i128 {
        IntSize::S32
    } else if value <= u64::MAX as i128 {
        IntSize::S64
    } else {
        IntSize::Unbounded
    };
    Type::integer(size, signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_lexer::{Lexer, Mode};

    fn check_source(src: &str) -> (IndexMap<String, Type>, Vec<crate::error::CheckError>) {
        let tokens = Lexer::tokenize("t.lang", src, Mode::Ignore).expect("lex");
        let (module, parse_err) = langc_parser::parse_module(&tokens);
        assert!(parse_err.is_none(), "unexpected parse error: {parse_err:?}");
        let mut checker = Checker::new();
        let exports = checker.check_module(&module);
        let (diagnostics, _) = checker.into_parts();
        (exports, diagnostics)
    }

    #[test]
    fn integer_literal_picks_smallest_fitting_width() {
        let (exports, diags) = check_source("export const x = 5\n");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(exports.get("x"), Some(&Type::integer(IntSize::S8, false)));
    }

    #[test]
    fn negative_integer_literal_is_signed() {
        let (exports, diags) = check_source("export const x = -5\n");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(exports.get("x"), Some(&Type::integer(IntSize::S8, true)));
    }

    #[test]
    fn function_body_must_be_assignable_to_declared_return_type() {
        let (_, diags) = check_source("export func bool bad() => 5\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), "T0001");
    }

    #[test]
    fn mutually_recursive_functions_resolve_via_hoisting() {
        let (_, diags) = check_source(
            "func bool isEven(i32 n) => if n == 0 { true } else { isOdd(n - 1) }\nfunc bool isOdd(i32 n) => if n == 0 { false } else { isEven(n - 1) }\n",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let src = "func void f() => { break }\n";
        let (_, diags) = check_source(src);
        assert_eq!(diags.iter().filter(|d| d.code() == "T0011").count(), 1);
    }

    #[test]
    fn break_inside_for_loop_is_valid() {
        let src = "func void f(i32[] xs) => { for x in xs { break } }\n";
        let (_, diags) = check_source(src);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn undefined_name_is_reported_and_typed_unknown() {
        let (_, diags) = check_source("export const x = y\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), "R0004");
    }

    #[test]
    fn generic_identity_function_infers_type_argument() {
        let src = "func T identity<T>(T x) => x\nexport const n = identity(5)\n";
        let (exports, diags) = check_source(src);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(exports.get("n"), Some(&Type::integer(IntSize::S8, false)));
    }
}
