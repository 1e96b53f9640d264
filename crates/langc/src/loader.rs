//! The module loader (§4.5): DFS-loads a module and its transitive
//! imports, wires each `import` and `export ... from "..."` forward to the
//! module it references, then hands each module's syntax tree to
//! `langc_check::check_module` in an order where every import it needs is
//! already resolved.
//!
//! The load pass's cycle protection mirrors the grounding workspace's
//! dependency resolver (`mesh-pkg::resolver::ResolveCtx`, whose `visiting`
//! set stops a dependency DFS from recursing into a package still being
//! resolved): a module's id is recorded the moment it's first reached,
//! before its own imports are walked, so a cycle back to it reuses that id
//! instead of looping. §9 calls this out directly — modules are owned by
//! the `Program` and referenced by id, "removing cycles introduced by
//! mutual imports."

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use langc_check::{CheckError, CheckErrorKind};
use langc_common::{Diagnostic, FilePosition, FileRange};
use langc_lexer::{Lexer, Mode};
use langc_parser::ast::{Declaration, ExportDeclaration, ExportForwardDeclaration, ImportDeclaration, ModuleItem, ModuleRoot};
use langc_types::Type;

use crate::fs::{PackageRoots, SourceFileSystem};
use crate::module::{Module, ModuleId, Program};

/// A module as the load pass leaves it: parsed, with every import and
/// export-forward reference resolved to a target id (or `None`, when the
/// diagnostic is deferred to the binding pass, which knows which name was
/// actually being requested).
struct LoadedModule {
    path: PathBuf,
    root: ModuleRoot,
    /// Whether `fs.read_to_string` actually found this module. `false` only
    /// for the entry point itself — every other module only reaches this
    /// struct by resolving successfully (an import/forward whose path can't
    /// be read is recorded as `None` in the *referencing* module's target
    /// list instead, and never gets a `LoadedModule` of its own).
    found: bool,
    import_targets: Vec<Option<ModuleId>>,
    forwards: Vec<ExportForwardDeclaration>,
    forward_targets: Vec<Option<ModuleId>>,
}

fn empty_root(path: &Path) -> ModuleRoot {
    ModuleRoot { imports: Vec::new(), items: Vec::new(), range: FileRange::empty_at(FilePosition::start_of(path)) }
}

fn placeholder(path: PathBuf) -> LoadedModule {
    let root = empty_root(&path);
    LoadedModule { path, root, found: true, import_targets: Vec::new(), forwards: Vec::new(), forward_targets: Vec::new() }
}

fn forward_module_name(fwd: &ExportForwardDeclaration) -> &str {
    match fwd {
        ExportForwardDeclaration::DefaultToDefault { module_name, .. }
        | ExportForwardDeclaration::DefaultToNamed { module_name, .. }
        | ExportForwardDeclaration::NamedToNamed { module_name, .. }
        | ExportForwardDeclaration::Wildcard { module_name, .. } => module_name,
    }
}

/// Collect every `export ... from "..."` forward reachable from `items`,
/// recursing into `namespace` bodies (plain or exported-inline) the same
/// way `langc_check::Checker::check_namespace` does, so this list lines up
/// positionally with what `CheckResult::forwards` later returns for the
/// same module.
fn collect_forwards(items: &[ModuleItem], out: &mut Vec<ExportForwardDeclaration>) {
    for item in items {
        match item {
            ModuleItem::ExportForward(fwd) => out.push(fwd.clone()),
            ModuleItem::Declaration(Declaration::Namespace(nd))
            | ModuleItem::Export(ExportDeclaration::Inline(Declaration::Namespace(nd))) => {
                collect_forwards(&nd.items, out);
            }
            _ => {}
        }
    }
}

/// DFS-load `entry` and every module reachable transitively through
/// imports and export-forwards (§4.5 steps 1–2, §5 ordering guarantee
/// (ii)). The returned vector's index is each module's [`ModuleId`].
fn load_graph(entry: &Path, fs: &dyn SourceFileSystem, roots: &PackageRoots) -> Vec<LoadedModule> {
    let mut loaded: FxHashMap<PathBuf, ModuleId> = FxHashMap::default();
    let mut modules: Vec<LoadedModule> = Vec::new();
    load_one(entry.to_path_buf(), fs, roots, &mut loaded, &mut modules);
    modules
}

fn load_one(
    path: PathBuf,
    fs: &dyn SourceFileSystem,
    roots: &PackageRoots,
    loaded: &mut FxHashMap<PathBuf, ModuleId>,
    modules: &mut Vec<LoadedModule>,
) -> ModuleId {
    if let Some(&id) = loaded.get(&path) {
        return id;
    }

    let id = ModuleId(modules.len() as u32);
    loaded.insert(path.clone(), id);
    modules.push(placeholder(path.clone()));

    let source = fs.read_to_string(&path);
    let found = source.is_some();
    let root = match source {
        Some(source) => match Lexer::tokenize(path.clone(), &source, Mode::Ignore) {
            Ok(tokens) => langc_parser::parse_module(&tokens).0,
            Err(_lex_err) => empty_root(&path),
        },
        None => empty_root(&path),
    };

    let import_targets = root
        .imports
        .iter()
        .map(|imp| fs.resolve_import(&path, &imp.module_name, roots).map(|p| load_one(p, fs, roots, loaded, modules)))
        .collect();

    let mut forwards = Vec::new();
    collect_forwards(&root.items, &mut forwards);
    let forward_targets = forwards
        .iter()
        .map(|fwd| fs.resolve_import(&path, forward_module_name(fwd), roots).map(|p| load_one(p, fs, roots, loaded, modules)))
        .collect();

    modules[id.0 as usize] = LoadedModule { path, root, found, import_targets, forwards, forward_targets };
    id
}

/// A postorder DFS over the import/forward graph: by the time a module is
/// appended to `order`, every module it depends on already precedes it —
/// except across an import cycle, where `on_stack` breaks the recursion and
/// the cycle partner is simply checked without that one dependency ready
/// (§9 accepts this; see DESIGN.md).
fn check_order(modules: &[LoadedModule]) -> Vec<ModuleId> {
    let n = modules.len();
    let mut order = Vec::with_capacity(n);
    let mut done = vec![false; n];
    let mut on_stack = vec![false; n];
    for i in 0..n {
        visit(ModuleId(i as u32), modules, &mut done, &mut on_stack, &mut order);
    }
    order
}

fn visit(id: ModuleId, modules: &[LoadedModule], done: &mut [bool], on_stack: &mut [bool], order: &mut Vec<ModuleId>) {
    let idx = id.0 as usize;
    if done[idx] || on_stack[idx] {
        return;
    }
    on_stack[idx] = true;
    let m = &modules[idx];
    for target in m.import_targets.iter().copied().chain(m.forward_targets.iter().copied()).flatten() {
        visit(target, modules, done, on_stack, order);
    }
    on_stack[idx] = false;
    done[idx] = true;
    order.push(id);
}

fn module_not_found(module_name: &str, range: FileRange) -> Diagnostic {
    CheckError::new(CheckErrorKind::ModuleNotFound { module_name: module_name.to_string() }, range).into_diagnostic()
}

/// Resolve one module's imports against the already-checked export tables
/// of the modules it names (§4.5 step 4), binding every requested name —
/// found or not — so the checker always has something to look up (§4.5
/// "Failure behavior").
fn bind_imports(
    m: &LoadedModule,
    owner: ModuleId,
    export_tables: &FxHashMap<ModuleId, IndexMap<String, Type>>,
    diagnostics: &mut Vec<(ModuleId, Diagnostic)>,
) -> FxHashMap<String, Type> {
    let mut imports = FxHashMap::default();
    for (imp, target) in m.root.imports.iter().zip(&m.import_targets) {
        bind_one_import(imp, *target, export_tables, &mut imports, diagnostics, owner);
    }
    imports
}

fn bind_one_import(
    imp: &ImportDeclaration,
    target: Option<ModuleId>,
    export_tables: &FxHashMap<ModuleId, IndexMap<String, Type>>,
    imports: &mut FxHashMap<String, Type>,
    diagnostics: &mut Vec<(ModuleId, Diagnostic)>,
    owner: ModuleId,
) {
    let target_exports = target.and_then(|t| export_tables.get(&t));
    let Some(target_exports) = target_exports else {
        // Either the path never resolved, or (an import cycle) the target
        // hasn't been checked yet — only the former is the "module not
        // found" case §4.5 names; the latter is the accepted single-pass
        // limitation noted above and raises no diagnostic of its own.
        if target.is_none() {
            diagnostics.push((owner, module_not_found(&imp.module_name, imp.module_range.clone())));
        }
        for item in &imp.items {
            imports.insert(item.bound_name().name.clone(), Type::Unknown);
        }
        return;
    };
    for item in &imp.items {
        match target_exports.get(&item.name.name) {
            Some(ty) => {
                imports.insert(item.bound_name().name.clone(), ty.clone());
            }
            None => {
                let kind = CheckErrorKind::ModuleDoesNotExportName {
                    module_name: imp.module_name.clone(),
                    name: item.name.name.clone(),
                };
                diagnostics.push((owner, CheckError::new(kind, item.name.range.clone()).into_diagnostic()));
                imports.insert(item.bound_name().name.clone(), Type::Unknown);
            }
        }
    }
}

/// Resolve one module's `export ... from "..."` forwards into its final
/// export table, merging them into `exports` (already the module's own
/// checked exports). A missing module or a re-export of a name the target
/// doesn't have each raise a diagnostic and bind that alias to `Unknown`
/// (§4.5 "Failure behavior" names both explicitly).
fn apply_forwards(
    m: &LoadedModule,
    owner: ModuleId,
    exports: &mut IndexMap<String, Type>,
    export_tables: &FxHashMap<ModuleId, IndexMap<String, Type>>,
    diagnostics: &mut Vec<(ModuleId, Diagnostic)>,
) {
    for (fwd, target) in m.forwards.iter().zip(&m.forward_targets) {
        let target_exports = target.and_then(|t| export_tables.get(&t));
        let module_name = forward_module_name(fwd).to_string();
        if target_exports.is_none() {
            diagnostics.push((owner, module_not_found(&module_name, fwd.range().clone())));
        }
        match fwd {
            ExportForwardDeclaration::DefaultToDefault { range, .. } => {
                insert_forwarded(exports, "default", "default", target_exports, &module_name, range, owner, diagnostics);
            }
            ExportForwardDeclaration::DefaultToNamed { name, range, .. } => {
                insert_forwarded(exports, &name.name, "default", target_exports, &module_name, range, owner, diagnostics);
            }
            ExportForwardDeclaration::NamedToNamed { items, range, .. } => {
                for (name, alias) in items {
                    let bound = alias.as_ref().unwrap_or(name);
                    insert_forwarded(exports, &bound.name, &name.name, target_exports, &module_name, range, owner, diagnostics);
                }
            }
            ExportForwardDeclaration::Wildcard { alias, .. } => {
                let ty = match (target, target_exports) {
                    (Some(id), Some(target_exports)) => Type::Namespace { module_id: id.0, exports: target_exports.clone() },
                    _ => Type::Unknown,
                };
                exports.insert(alias.name.clone(), ty);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_forwarded(
    exports: &mut IndexMap<String, Type>,
    local_name: &str,
    source_name: &str,
    target_exports: Option<&IndexMap<String, Type>>,
    module_name: &str,
    range: &FileRange,
    owner: ModuleId,
    diagnostics: &mut Vec<(ModuleId, Diagnostic)>,
) {
    let ty = match target_exports.and_then(|t| t.get(source_name)) {
        Some(ty) => ty.clone(),
        None => {
            if target_exports.is_some() {
                let kind =
                    CheckErrorKind::ModuleDoesNotExportName { module_name: module_name.to_string(), name: source_name.to_string() };
                diagnostics.push((owner, CheckError::new(kind, range.clone()).into_diagnostic()));
            }
            Type::Unknown
        }
    };
    exports.insert(local_name.to_string(), ty);
}

/// Compile from `entry`: load, check, and link every module reachable
/// through its imports (§6 "Produced program" — the single top-level API).
pub fn compile(entry: &Path, roots: &PackageRoots, fs: &dyn SourceFileSystem) -> Program {
    let modules = load_graph(entry, fs, roots);
    let order = check_order(&modules);

    let mut export_tables: FxHashMap<ModuleId, IndexMap<String, Type>> = FxHashMap::default();
    let mut tagged: Vec<(ModuleId, Diagnostic)> = Vec::new();

    if !modules[0].found {
        tagged.push((ModuleId(0), module_not_found(&modules[0].path.display().to_string(), modules[0].root.range.clone())));
    }

    for id in order {
        let m = &modules[id.0 as usize];
        let imports = bind_imports(m, id, &export_tables, &mut tagged);

        let result = langc_check::check_module(&m.root, &imports);
        tagged.extend(result.diagnostics.into_iter().map(|d| (id, d)));

        let mut exports = result.exports;
        apply_forwards(m, id, &mut exports, &export_tables, &mut tagged);
        export_tables.insert(id, exports);
    }

    tagged.sort_by(|(a_id, a), (b_id, b)| {
        a_id.cmp(b_id).then_with(|| (a.range.start.line, a.range.start.column).cmp(&(b.range.start.line, b.range.start.column)))
    });
    let diagnostics = tagged.into_iter().map(|(_, d)| d).collect();

    let modules = modules
        .into_iter()
        .enumerate()
        .map(|(i, m)| {
            let id = ModuleId(i as u32);
            let exports = export_tables.remove(&id).unwrap_or_default();
            Module { id, path: m.path, root: m.root, exports }
        })
        .collect();

    Program { modules, diagnostics }
}
