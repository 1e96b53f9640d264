//! The filesystem abstraction the loader consumes (§6): reading a file's
//! contents and resolving an import-module token to a path, each left to
//! the caller rather than hard-coded to `std::fs` (the core does no real
//! filesystem walking beyond what these two operations ask for).

use std::collections::HashMap as StdHashMap;
use std::path::{Path, PathBuf};

/// Name → base-path table for package-rooted imports (§6 resolution
/// rules): a module string that does not start with `.` or `..` names a
/// package under this registry rather than a path relative to the
/// importer.
#[derive(Debug, Clone, Default)]
pub struct PackageRoots(StdHashMap<String, PathBuf>);

impl PackageRoots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> &mut Self {
        self.0.insert(name.into(), root.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.0.get(name).map(PathBuf::as_path)
    }
}

impl FromIterator<(String, PathBuf)> for PackageRoots {
    fn from_iter<T: IntoIterator<Item = (String, PathBuf)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The two operations the loader needs from the outside world (§6): read a
/// file and resolve an import string to a concrete path. Neither walks a
/// directory tree; `resolve_import` only ever produces the one path a
/// single import string names.
pub trait SourceFileSystem {
    /// The full contents of the file at `path`, or `None` if it can't be
    /// read (missing, unreadable, etc. — the loader reports all of these
    /// uniformly as "module not found").
    fn read_to_string(&self, path: &Path) -> Option<String>;

    /// Resolve `module_name` (as written in an `import`/export-forward
    /// string) to a path, relative to `importer` when it starts with `.`
    /// or `..`, else as a package name looked up in `roots`. `None` means
    /// the string can't be resolved at all (malformed relative path, or an
    /// unregistered package name) — distinct from a resolved path that
    /// turns out not to exist, which `read_to_string` reports instead.
    fn resolve_import(&self, importer: &Path, module_name: &str, roots: &PackageRoots) -> Option<PathBuf>;
}

fn is_relative_module(module_name: &str) -> bool {
    module_name.starts_with('.') || module_name.starts_with("..")
}

fn with_default_extension(mut path: PathBuf) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension("lang");
    }
    path
}

/// Shared resolution logic (§6) between [`RealFileSystem`] and
/// [`MemoryFileSystem`]: only the existence check at the end differs.
fn resolve_path(importer: &Path, module_name: &str, roots: &PackageRoots) -> Option<PathBuf> {
    if is_relative_module(module_name) {
        let base = importer.parent().unwrap_or_else(|| Path::new(""));
        Some(with_default_extension(base.join(module_name)))
    } else {
        let mut parts = module_name.splitn(2, '/');
        let package = parts.next()?;
        let rest = parts.next().unwrap_or("");
        let root = roots.get(package)?;
        let path = if rest.is_empty() { root.to_path_buf() } else { root.join(rest) };
        Some(with_default_extension(path))
    }
}

/// Reads modules from disk via `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl SourceFileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn resolve_import(&self, importer: &Path, module_name: &str, roots: &PackageRoots) -> Option<PathBuf> {
        let path = resolve_path(importer, module_name, roots)?;
        path.is_file().then_some(path)
    }
}

/// An in-memory filesystem for tests that exercise the loader's import
/// resolution without touching real files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem(StdHashMap<PathBuf, String>);

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> &mut Self {
        self.0.insert(path.into(), source.into());
        self
    }
}

impl SourceFileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Option<String> {
        self.0.get(path).cloned()
    }

    fn resolve_import(&self, importer: &Path, module_name: &str, roots: &PackageRoots) -> Option<PathBuf> {
        let path = resolve_path(importer, module_name, roots)?;
        self.0.contains_key(&path).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_import_resolves_against_importer_directory() {
        let mut fs = MemoryFileSystem::new();
        fs.add("/proj/a.lang", "").add("/proj/util.lang", "");
        let roots = PackageRoots::new();
        let resolved = fs.resolve_import(Path::new("/proj/a.lang"), "./util", &roots);
        assert_eq!(resolved, Some(PathBuf::from("/proj/util.lang")));
    }

    #[test]
    fn package_import_resolves_against_registry() {
        let mut fs = MemoryFileSystem::new();
        fs.add("/pkgs/collections/list.lang", "");
        let mut roots = PackageRoots::new();
        roots.insert("collections", "/pkgs/collections");
        let resolved = fs.resolve_import(Path::new("/proj/a.lang"), "collections/list", &roots);
        assert_eq!(resolved, Some(PathBuf::from("/pkgs/collections/list.lang")));
    }

    #[test]
    fn unregistered_package_name_is_unresolved() {
        let fs = MemoryFileSystem::new();
        let roots = PackageRoots::new();
        assert_eq!(fs.resolve_import(Path::new("/proj/a.lang"), "nope/thing", &roots), None);
    }

    #[test]
    fn resolved_path_that_does_not_exist_is_unresolved() {
        let fs = MemoryFileSystem::new();
        let roots = PackageRoots::new();
        assert_eq!(fs.resolve_import(Path::new("/proj/a.lang"), "./missing", &roots), None);
    }
}
