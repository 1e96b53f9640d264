//! The loader's output (§6 "Produced program", §9 "ownership of modules"):
//! modules own their syntax tree and export table and are referenced by a
//! stable id rather than a pointer, so mutual imports don't need cyclic
//! ownership.

use std::path::PathBuf;

use indexmap::IndexMap;

use langc_common::Diagnostic;
use langc_parser::ast::ModuleRoot;
use langc_types::Type;

/// The id of a loaded [`Module`]: its index in `Program::modules`, assigned
/// in first-reach order during the load DFS (§4.5 step 2, §5 ordering
/// guarantee (ii)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// One loaded, parsed, and checked module.
pub struct Module {
    pub id: ModuleId,
    pub path: PathBuf,
    pub root: ModuleRoot,
    /// Every name this module makes available to importers: its own
    /// exports plus whatever `export ... from "..."` forwards resolved to.
    pub exports: IndexMap<String, Type>,
}

/// The result of compiling from an entry point (§6): every module reached
/// transitively through imports, in first-reach order, plus every
/// diagnostic raised anywhere, sorted by module id then source position
/// (§7).
pub struct Program {
    pub modules: Vec<Module>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }
}
