//! Search path - ordered roots and filesystem probes
//!
//! The search path answers three questions for the resolver:
//! - does a short name exist under a directory as a package,
//!   namespace package, or regular module file?
//! - is a name a known builtin/standard module?
//! - what is the source text of a found module?
//!
//! The namespace-package predicate is a pure function of the directory
//! and is memoized to avoid repeated filesystem probing.

use crate::{Error, Result};
use crate::module::ModuleKind;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

const INIT_UNIT: &str = "__init__.py";
const SOURCE_EXT: &str = "py";

/// Names resolved before the filesystem is consulted.
///
/// Covers the compiled-in modules of a typical CPython plus `__future__`,
/// which every conforming interpreter provides. Builtins are opaque
/// leaves: they contribute no further edges.
const DEFAULT_BUILTINS: &[&str] = &[
    "__future__",
    "_abc",
    "_ast",
    "_codecs",
    "_collections",
    "_functools",
    "_imp",
    "_io",
    "_locale",
    "_operator",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "_symtable",
    "_thread",
    "_tokenize",
    "_tracemalloc",
    "_warnings",
    "_weakref",
    "atexit",
    "builtins",
    "errno",
    "faulthandler",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "pwd",
    "sys",
    "time",
];

/// Registry of builtin/standard module names.
#[derive(Debug, Clone)]
pub struct BuiltinRegistry {
    names: BTreeSet<String>,
}

impl BuiltinRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self { names: BTreeSet::new() }
    }

    /// Check whether a top-level name is a builtin
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Register an additional builtin name
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self {
            names: DEFAULT_BUILTINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// What a filesystem probe found for one short name under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    /// How the name exists on disk
    pub kind: ModuleKind,
    /// Package directory (packages and namespace packages)
    pub package_dir: Option<PathBuf>,
    /// Source unit to scan (`__init__.py` or the module file itself);
    /// `None` for namespace packages
    pub source_path: Option<PathBuf>,
}

/// Ordered list of root directories plus the builtin registry.
#[derive(Debug)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
    builtins: BuiltinRegistry,
    // Memoized namespace-package probes, keyed by directory.
    namespace_cache: RefCell<HashMap<PathBuf, bool>>,
}

impl SearchPath {
    /// Create a search path over the given roots with default builtins
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            builtins: BuiltinRegistry::default(),
            namespace_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Replace the builtin registry
    pub fn with_builtins(mut self, builtins: BuiltinRegistry) -> Self {
        self.builtins = builtins;
        self
    }

    /// Register an additional builtin name
    pub fn add_builtin(&mut self, name: impl Into<String>) {
        self.builtins.insert(name);
    }

    /// The ordered roots
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Check whether a top-level name is a builtin
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }

    /// Verify every root exists and is a directory.
    ///
    /// This is the only fatal condition of a run; it is checked before
    /// traversal begins.
    pub fn validate(&self) -> Result<()> {
        for root in &self.roots {
            if !root.is_dir() {
                return Err(Error::SearchPath(format!(
                    "{} is not a directory",
                    root.display()
                )));
            }
        }
        Ok(())
    }

    /// Probe one directory for a short name.
    ///
    /// Lookup order: package (directory containing an init unit), then
    /// namespace package (directory exists, no shadowing regular module,
    /// at least one resolvable entry), then regular module file.
    pub fn probe(&self, dir: &Path, name: &str) -> Option<Found> {
        let pkg_dir = dir.join(name);
        let module_file = dir.join(format!("{}.{}", name, SOURCE_EXT));

        if pkg_dir.is_dir() {
            let init = pkg_dir.join(INIT_UNIT);
            if init.is_file() {
                return Some(Found {
                    kind: ModuleKind::Package,
                    package_dir: Some(pkg_dir),
                    source_path: Some(init),
                });
            }
            if !module_file.is_file() && self.is_namespace_dir(&pkg_dir) {
                return Some(Found {
                    kind: ModuleKind::NamespacePackage,
                    package_dir: Some(pkg_dir),
                    source_path: None,
                });
            }
        }

        if module_file.is_file() {
            return Some(Found {
                kind: ModuleKind::Regular,
                package_dir: None,
                source_path: Some(module_file),
            });
        }

        None
    }

    /// Probe every root in order for a top-level short name; first match
    /// wins.
    pub fn probe_roots(&self, name: &str) -> Option<(PathBuf, Found)> {
        self.roots
            .iter()
            .find_map(|root| self.probe(root, name).map(|f| (root.clone(), f)))
    }

    /// Read the source text of a found module
    pub fn read_source(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Memoized namespace-package predicate: the directory holds at
    /// least one source unit or subdirectory.
    fn is_namespace_dir(&self, dir: &Path) -> bool {
        if let Some(&cached) = self.namespace_cache.borrow().get(dir) {
            return cached;
        }
        let result = std::fs::read_dir(dir)
            .map(|entries| {
                entries.filter_map(|e| e.ok()).any(|entry| {
                    let path = entry.path();
                    path.is_dir()
                        || path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT)
                })
            })
            .unwrap_or(false);
        self.namespace_cache
            .borrow_mut()
            .insert(dir.to_path_buf(), result);
        result
    }
}
