//! The facade crate: `Module`/`Program` (§6), the module loader (§4.5),
//! the `SourceFileSystem` external interface (§6), and the single
//! `compile` entry point this workspace exposes to a caller.
//!
//! Everything upstream of this crate — lexing, parsing, type checking — is
//! a pure function of a single module's text. This crate is where those
//! pieces become a program: walking imports to discover which modules
//! exist, deciding what order to check them in, and wiring each module's
//! imports to the export table of the module it names.

mod fs;
mod loader;
mod module;

use std::path::Path;

pub use fs::{MemoryFileSystem, PackageRoots, RealFileSystem, SourceFileSystem};
pub use module::{Module, ModuleId, Program};

/// Compile the program rooted at `entry` (§6 "Produced program"): load it
/// and every module its imports reach transitively, type-check each one,
/// and return the full module list plus every diagnostic raised, sorted by
/// module id then source position (§7).
///
/// `roots` resolves package-rooted import strings (any import not starting
/// with `.` or `..`); `fs` supplies the two operations §6 asks of the
/// outside world: reading a file and resolving an import string to a path.
pub fn compile(entry: impl AsRef<Path>, roots: &PackageRoots, fs: &dyn SourceFileSystem) -> Program {
    loader::compile(entry.as_ref(), roots, fs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_types::Type;

    fn compile_memory(files: &[(&str, &str)], entry: &str) -> Program {
        let mut mem = MemoryFileSystem::new();
        for (path, source) in files {
            mem.add(*path, *source);
        }
        compile(entry, &PackageRoots::new(), &mem)
    }

    #[test]
    fn single_module_with_no_imports_compiles_clean() {
        let program = compile_memory(&[("/a.lang", "export func i32 answer() => 42")], "/a.lang");
        assert_eq!(program.modules.len(), 1);
        assert!(program.diagnostics.is_empty());
        assert!(program.modules[0].exports.contains_key("answer"));
    }

    #[test]
    fn import_binds_the_exported_type() {
        let program = compile_memory(
            &[
                ("/util.lang", "export func i32 answer() => 42"),
                ("/main.lang", "import from \"./util\": { answer }\nexport func i32 main() => answer()"),
            ],
            "/main.lang",
        );
        assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
        assert_eq!(program.modules.len(), 2);
        // entry point is always module 0 (§4.5 step 1).
        assert_eq!(program.modules[0].path, std::path::PathBuf::from("/main.lang"));
    }

    #[test]
    fn importing_a_missing_module_binds_unknown_and_diagnoses() {
        let program = compile_memory(&[("/main.lang", "import from \"./missing\": { thing }")], "/main.lang");
        assert!(!program.diagnostics.is_empty());
        assert!(program.diagnostics[0].message.contains("module not found"));
    }

    #[test]
    fn importing_an_unexported_name_binds_unknown_and_diagnoses() {
        let program = compile_memory(
            &[
                ("/util.lang", "func i32 hidden() => 1"),
                ("/main.lang", "import from \"./util\": { hidden }"),
            ],
            "/main.lang",
        );
        assert!(program.diagnostics.iter().any(|d| d.message.contains("does not export")));
    }

    #[test]
    fn wildcard_forward_exposes_a_namespace_type() {
        let program = compile_memory(
            &[
                ("/util.lang", "export func i32 answer() => 42"),
                ("/lib.lang", "export * as util from \"./util\""),
            ],
            "/lib.lang",
        );
        assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
        match program.modules[0].exports.get("util") {
            Some(Type::Namespace { exports, .. }) => assert!(exports.contains_key("answer")),
            other => panic!("expected a namespace export, got {other:?}"),
        }
    }

    #[test]
    fn mutual_imports_do_not_infinite_loop() {
        let program = compile_memory(
            &[
                ("/a.lang", "import from \"./b\": { b_value }\nexport func i32 a_value() => 1"),
                ("/b.lang", "import from \"./a\": { a_value }\nexport func i32 b_value() => 2"),
            ],
            "/a.lang",
        );
        assert_eq!(program.modules.len(), 2);
    }
}
