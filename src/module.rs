//! Module types - nodes of the import graph
//!
//! Every discovered name maps to exactly one of five module kinds:
//! - `Regular`: a plain source file (`a/module.py`)
//! - `Package`: a directory with an `__init__.py`
//! - `NamespacePackage`: a package directory with no initializer
//! - `Builtin`: a compiled-in standard module (opaque leaf)
//! - `Unresolved`: a placeholder whose lookup never succeeded

use crate::{Error, Result};
use crate::name::ModuleName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

/// The kind of a module node.
///
/// A module starts life as `Unresolved` the first time any declaration
/// mentions its name, and is promoted to a concrete kind once lookup
/// against the search path succeeds. A terminal `Unresolved` is what the
/// diagnostics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Plain source file
    Regular,
    /// Directory with an initializer unit
    Package,
    /// Package aggregated from directory presence alone
    NamespacePackage,
    /// Compiled-in standard module - contributes no further edges
    Builtin,
    /// Placeholder whose lookup failed (or has not happened yet)
    Unresolved,
}

impl ModuleKind {
    /// Get the string representation of the module kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Regular => "regular",
            ModuleKind::Package => "package",
            ModuleKind::NamespacePackage => "namespace_package",
            ModuleKind::Builtin => "builtin",
            ModuleKind::Unresolved => "unresolved",
        }
    }

    /// Get all module kinds
    pub fn all() -> &'static [ModuleKind] {
        &[
            ModuleKind::Regular,
            ModuleKind::Package,
            ModuleKind::NamespacePackage,
            ModuleKind::Builtin,
            ModuleKind::Unresolved,
        ]
    }

    /// Check if this kind can contain submodules
    pub fn is_package(&self) -> bool {
        matches!(self, ModuleKind::Package | ModuleKind::NamespacePackage)
    }

    /// Check if this kind counts toward the `found` set of the report
    pub fn is_concrete(&self) -> bool {
        !matches!(self, ModuleKind::Unresolved)
    }
}

impl FromStr for ModuleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "regular" | "module" => Ok(ModuleKind::Regular),
            "package" | "pkg" => Ok(ModuleKind::Package),
            "namespace_package" | "namespace" => Ok(ModuleKind::NamespacePackage),
            "builtin" => Ok(ModuleKind::Builtin),
            "unresolved" | "missing" => Ok(ModuleKind::Unresolved),
            _ => Err(Error::InvalidName(format!("Unknown module kind: {}", s))),
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the namespace hierarchy.
///
/// Exactly one `Module` exists per qualified name; the graph's module
/// table enforces the invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Qualified dotted name, the unique key
    pub name: ModuleName,
    /// Current kind (placeholder until lookup succeeds)
    pub kind: ModuleKind,
    /// The search-path root that provided this module, if found
    pub search_root: Option<PathBuf>,
    /// Directory of the package (for packages and namespace packages)
    pub package_dir: Option<PathBuf>,
    /// Path of the source unit (`.py` file) that was scanned, if any
    pub source_path: Option<PathBuf>,
    /// Future flag: treat bare imports as absolute.
    ///
    /// Resolved once at scan time from the module's own source, never
    /// propagated across modules.
    pub absolute_imports: bool,
    /// Names bound at the module's top level (defs, classes, assignment
    /// targets, names bound by imports)
    pub global_names: BTreeSet<String>,
    /// Whether the module performs a top-level `from X import *`,
    /// making its export set unknowable
    pub has_star_import: bool,
}

impl Module {
    /// Create a placeholder module awaiting lookup
    pub fn placeholder(name: ModuleName) -> Self {
        Self {
            name,
            kind: ModuleKind::Unresolved,
            search_root: None,
            package_dir: None,
            source_path: None,
            absolute_imports: false,
            global_names: BTreeSet::new(),
            has_star_import: false,
        }
    }

    /// Create a builtin module (opaque leaf)
    pub fn builtin(name: ModuleName) -> Self {
        Self {
            kind: ModuleKind::Builtin,
            ..Self::placeholder(name)
        }
    }

    /// The enclosing package's qualified name, or `None` for top-level
    pub fn parent(&self) -> Option<ModuleName> {
        self.name.parent()
    }

    /// Check if this module can contain submodules
    pub fn is_package(&self) -> bool {
        self.kind.is_package()
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Module {}

impl std::hash::Hash for Module {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
