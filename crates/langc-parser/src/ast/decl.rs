use langc_common::FileRange;

use crate::ast::expr::FunctionBody;
use crate::ast::{Ident, Param, TypeNode, TypeParamNode, TypeSlot};

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub name: Ident,
    pub type_params: Vec<TypeParamNode>,
    pub ty: TypeNode,
    pub range: FileRange,
    pub resolved: TypeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub return_type: TypeNode,
    pub name: Ident,
    pub type_params: Vec<TypeParamNode>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub range: FileRange,
    pub resolved: TypeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDeclaration {
    pub name: Ident,
    pub value: crate::ast::Expression,
    pub range: FileRange,
    pub resolved: TypeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDeclaration {
    pub name: Ident,
    pub imports: Vec<ImportDeclaration>,
    pub items: Vec<ModuleItem>,
    pub range: FileRange,
}

/// An anonymous function declaration: the `Non-goals`-adjacent case spec
/// §9 open question (iv) calls for — a `default`-exported function with no
/// declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousFunctionDeclaration {
    pub return_type: TypeNode,
    pub type_params: Vec<TypeParamNode>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub range: FileRange,
    pub resolved: TypeSlot,
}

/// The type-declaration analogue of [`AnonymousFunctionDeclaration`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousTypeDeclaration {
    pub type_params: Vec<TypeParamNode>,
    pub ty: TypeNode,
    pub range: FileRange,
    pub resolved: TypeSlot,
}

/// The tagged union of declaration forms (§3 Data Model).
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeDeclaration),
    Function(FunctionDeclaration),
    Constant(ConstantDeclaration),
    Namespace(NamespaceDeclaration),
    AnonymousFunction(AnonymousFunctionDeclaration),
    AnonymousType(AnonymousTypeDeclaration),
}

impl Declaration {
    pub fn range(&self) -> &FileRange {
        match self {
            Declaration::Type(d) => &d.range,
            Declaration::Function(d) => &d.range,
            Declaration::Constant(d) => &d.range,
            Declaration::Namespace(d) => &d.range,
            Declaration::AnonymousFunction(d) => &d.range,
            Declaration::AnonymousType(d) => &d.range,
        }
    }

    /// The declared name, when this declaration has one (every variant but
    /// the two anonymous ones, which exist only inside a default-export
    /// context and are named by their export, not themselves).
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Declaration::Type(d) => Some(&d.name),
            Declaration::Function(d) => Some(&d.name),
            Declaration::Constant(d) => Some(&d.name),
            Declaration::Namespace(d) => Some(&d.name),
            Declaration::AnonymousFunction(_) | Declaration::AnonymousType(_) => None,
        }
    }
}

/// One entry of an import's item list: `Ident ('as' Ident)?`.
///
/// A bare `import from "m": x` (no braces) is sugar for importing the
/// default export; it is desugared at parse time into a single item whose
/// `name` is the synthetic `"default"` slot and whose `alias` is the
/// written identifier, so the loader (§4.5) only ever has to handle the
/// brace form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: Ident,
    pub alias: Option<Ident>,
}

impl ImportItem {
    /// The name imports bind under: the alias when present, else the
    /// imported name itself.
    pub fn bound_name(&self) -> &Ident {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub module_name: String,
    pub module_range: FileRange,
    pub items: Vec<ImportItem>,
    pub range: FileRange,
}

/// The six export cases (§3, §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDeclaration {
    /// `export <decl>`: the declaration is exported under its own name.
    Inline(Declaration),
    /// `export name` / `export name as alias`: re-export an existing
    /// in-module declaration, optionally under a different name.
    Named { name: Ident, alias: Option<Ident>, range: FileRange },
    /// `export default func ...`
    DefaultAnonymousFunction(AnonymousFunctionDeclaration),
    /// `export default type ...`
    DefaultAnonymousType(AnonymousTypeDeclaration),
    /// `export default name`: an existing declaration becomes the module's
    /// default export.
    DefaultNamed { name: Ident, range: FileRange },
    /// `export { a, b as c }`: bundle several named exports in one
    /// declaration.
    Bundle { items: Vec<(Ident, Option<Ident>)>, range: FileRange },
}

impl ExportDeclaration {
    pub fn range(&self) -> &FileRange {
        match self {
            ExportDeclaration::Inline(d) => d.range(),
            ExportDeclaration::Named { range, .. } => range,
            ExportDeclaration::DefaultAnonymousFunction(d) => &d.range,
            ExportDeclaration::DefaultAnonymousType(d) => &d.range,
            ExportDeclaration::DefaultNamed { range, .. } => range,
            ExportDeclaration::Bundle { range, .. } => range,
        }
    }
}

/// Re-export sugar for default-to-default, default-to-named, named-to-named,
/// and wildcard forms (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum ExportForwardDeclaration {
    /// `export default from "m"`.
    DefaultToDefault { module_name: String, range: FileRange },
    /// `export name default from "m"`: re-export `m`'s default export
    /// under a local name.
    DefaultToNamed { module_name: String, name: Ident, range: FileRange },
    /// `export { a, b as c } from "m"`.
    NamedToNamed { module_name: String, items: Vec<(Ident, Option<Ident>)>, range: FileRange },
    /// `export * as ns from "m"`.
    Wildcard { module_name: String, alias: Ident, range: FileRange },
}

impl ExportForwardDeclaration {
    pub fn range(&self) -> &FileRange {
        match self {
            ExportForwardDeclaration::DefaultToDefault { range, .. }
            | ExportForwardDeclaration::DefaultToNamed { range, .. }
            | ExportForwardDeclaration::NamedToNamed { range, .. }
            | ExportForwardDeclaration::Wildcard { range, .. } => range,
        }
    }
}

/// One top-level (or namespace-level) item: a declaration or one of the two
/// export forms (§4.4 `(Declaration | ExportDeclaration |
/// ExportForwardDeclaration)*`).
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    Declaration(Declaration),
    Export(ExportDeclaration),
    ExportForward(ExportForwardDeclaration),
}

/// The parsed form of an entire module (§3 Data Model).
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRoot {
    pub imports: Vec<ImportDeclaration>,
    pub items: Vec<ModuleItem>,
    pub range: FileRange,
}
