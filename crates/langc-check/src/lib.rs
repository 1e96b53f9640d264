//! Visitor-based type checker (§4.6) over a parsed [`ModuleRoot`].
//!
//! [`check_module`] is the single entry point: it takes a module's already
//! parsed syntax tree plus the concrete types of whatever it imports (§4.5
//! says resolving *which* module an import name comes from, and walking the
//! filesystem to find it, is the loader's job — this crate only needs the
//! resulting bindings) and returns every diagnostic raised, the module's
//! export table, and any `ExportForwardDeclaration`s it couldn't resolve on
//! its own (those need another module's export table, which only the loader
//! has).

mod checker;
mod error;
mod operators;
mod scope;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use langc_common::Diagnostic;
use langc_parser::ast::{ExportForwardDeclaration, ModuleRoot};
use langc_types::Type;

pub use checker::Checker;
pub use error::{CheckError, CheckErrorKind};

/// The result of checking one module: diagnostics raised along the way, the
/// types of its named exports, and any `export * from "..."` /
/// `export { x } from "..."` forwards left for the loader to resolve.
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub exports: IndexMap<String, Type>,
    pub forwards: Vec<ExportForwardDeclaration>,
}

/// Check one module's syntax tree. `imports` binds each name the module's
/// `import` declarations brought into scope to its already-resolved type —
/// the loader builds this map by resolving each `ImportDeclaration` against
/// the exports of the module it names.
pub fn check_module(module: &ModuleRoot, imports: &FxHashMap<String, Type>) -> CheckResult {
    let mut checker = Checker::new();
    for (name, ty) in imports {
        checker.declare_import(name.clone(), ty.clone());
    }
    let exports = checker.check_module(module);
    let (diagnostics, forwards) = checker.into_parts();
    CheckResult { diagnostics: diagnostics.into_iter().map(CheckError::into_diagnostic).collect(), exports, forwards }
}
