//! Integration tests exercising the loader's `RealFileSystem` against
//! actual files on disk (§4.5 import resolution), the way the grounding
//! workspace's `mesh-pkg` tests a real dependency resolution walk against
//! a `tempfile::TempDir`.

use std::path::Path;

use langc::{compile, PackageRoots, RealFileSystem};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, source: &str) {
    std::fs::write(dir.join(name), source).unwrap();
}

#[test]
fn relative_import_resolves_against_a_real_directory() {
    let root = TempDir::new().unwrap();
    write(root.path(), "util.lang", "export func i32 answer() => 42");
    write(
        root.path(),
        "main.lang",
        "import from \"./util\": { answer }\nexport func i32 main() => answer()",
    );

    let program = compile(root.path().join("main.lang"), &PackageRoots::new(), &RealFileSystem::new());

    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
    assert_eq!(program.modules.len(), 2);
    assert!(program.modules[0].exports.contains_key("main"));
}

#[test]
fn package_rooted_import_resolves_through_the_registry() {
    let root = TempDir::new().unwrap();
    let pkg_dir = root.path().join("libs").join("collections");
    std::fs::create_dir_all(&pkg_dir).unwrap();
    write(&pkg_dir, "list.lang", "export func i32 len() => 0");
    write(root.path(), "main.lang", "import from \"collections/list\": { len }\nexport func i32 main() => len()");

    let mut roots = PackageRoots::new();
    roots.insert("collections", pkg_dir);

    let program = compile(root.path().join("main.lang"), &roots, &RealFileSystem::new());

    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
    assert_eq!(program.modules.len(), 2);
}

#[test]
fn missing_entry_point_produces_an_empty_module_and_a_diagnostic() {
    let root = TempDir::new().unwrap();
    let program = compile(root.path().join("nowhere.lang"), &PackageRoots::new(), &RealFileSystem::new());

    assert_eq!(program.modules.len(), 1);
    assert!(program.modules[0].root.items.is_empty());
}

#[test]
fn diagnostics_are_sorted_by_module_then_position() {
    let root = TempDir::new().unwrap();
    write(root.path(), "util.lang", "func i32 hidden() => 1");
    write(
        root.path(),
        "main.lang",
        "import from \"./util\": { hidden, alsoMissing }\nexport func i32 main() => 0",
    );

    let program = compile(root.path().join("main.lang"), &PackageRoots::new(), &RealFileSystem::new());

    assert_eq!(program.diagnostics.len(), 2);
    let positions: Vec<_> = program.diagnostics.iter().map(|d| (d.range.start.line, d.range.start.column)).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}
