//! Import graph - the grow-only module table and its edges
//!
//! Maps every qualified name to exactly one `Module`, records the
//! ordered declarations each scanned module produced, and keeps a
//! deduplicated edge list in first-encounter order. Entities are never
//! removed; the graph only grows during a run.

use std::collections::{HashMap, HashSet};
use crate::decl::ImportDeclaration;
use crate::module::{Module, ModuleKind};
use crate::name::ModuleName;

/// In-memory import graph built during traversal.
///
/// Exclusively owned by the `GraphBuilder`; the resolver and diagnostics
/// only see it through borrowed access.
#[derive(Debug, Default)]
pub struct ImportGraph {
    /// All modules indexed by qualified name
    modules: HashMap<ModuleName, Module>,
    /// First-encounter order of module names (deterministic traversal)
    order: Vec<ModuleName>,
    /// Ordered declarations each module produced when scanned
    declarations: HashMap<ModuleName, Vec<ImportDeclaration>>,
    /// Dependency edges in first-encounter order, deduplicated
    edges: Vec<(ModuleName, ModuleName)>,
    edge_set: HashSet<(ModuleName, ModuleName)>,
}

impl ImportGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module.
    ///
    /// The first insertion for a name wins; resolving the same name twice
    /// must never create a duplicate entity.
    pub fn insert(&mut self, module: Module) -> &Module {
        let name = module.name.clone();
        if !self.modules.contains_key(&name) {
            self.order.push(name.clone());
            self.modules.insert(name.clone(), module);
        }
        &self.modules[&name]
    }

    /// Get a module by qualified name
    pub fn get(&self, name: &ModuleName) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Check whether a name has been looked up already
    pub fn contains(&self, name: &ModuleName) -> bool {
        self.modules.contains_key(name)
    }

    /// Record the ordered declarations a module's scan produced
    pub fn set_declarations(&mut self, name: ModuleName, decls: Vec<ImportDeclaration>) {
        self.declarations.insert(name, decls);
    }

    /// The declarations a module produced (empty if never scanned)
    pub fn declarations(&self, name: &ModuleName) -> &[ImportDeclaration] {
        self.declarations
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Add a dependency edge; duplicates are ignored
    pub fn add_edge(&mut self, from: ModuleName, to: ModuleName) {
        let key = (from, to);
        if self.edge_set.insert(key.clone()) {
            self.edges.push(key);
        }
    }

    /// All edges in first-encounter order
    pub fn edges(&self) -> &[(ModuleName, ModuleName)] {
        &self.edges
    }

    /// All modules in first-encounter order
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.order.iter().filter_map(|name| self.modules.get(name))
    }

    /// Qualified names of all concrete (found) modules,
    /// in first-encounter order
    pub fn found(&self) -> impl Iterator<Item = &ModuleName> {
        self.modules().filter(|m| m.kind.is_concrete()).map(|m| &m.name)
    }

    /// Direct dependencies of a module, in edge order
    pub fn dependencies(&self, name: &ModuleName) -> Vec<&ModuleName> {
        self.edges
            .iter()
            .filter(|(from, _)| from == name)
            .map(|(_, to)| to)
            .collect()
    }

    /// Modules that directly depend on a module
    pub fn dependents(&self, name: &ModuleName) -> Vec<&ModuleName> {
        self.edges
            .iter()
            .filter(|(_, to)| to == name)
            .map(|(from, _)| from)
            .collect()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            total_modules: self.modules.len(),
            total_edges: self.edges.len(),
            ..GraphStats::default()
        };
        for module in self.modules.values() {
            match module.kind {
                ModuleKind::Regular => stats.regular += 1,
                ModuleKind::Package => stats.packages += 1,
                ModuleKind::NamespacePackage => stats.namespace_packages += 1,
                ModuleKind::Builtin => stats.builtins += 1,
                ModuleKind::Unresolved => stats.unresolved += 1,
            }
        }
        stats
    }
}

/// Statistics about an import graph
#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub total_modules: usize,
    pub total_edges: usize,
    pub regular: usize,
    pub packages: usize,
    pub namespace_packages: usize,
    pub builtins: usize,
    pub unresolved: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Import Graph Statistics:")?;
        writeln!(f, "  Modules: {}", self.total_modules)?;
        writeln!(
            f,
            "  Found: {} (regular: {}, packages: {}, namespace: {}, builtin: {})",
            self.total_modules - self.unresolved,
            self.regular,
            self.packages,
            self.namespace_packages,
            self.builtins
        )?;
        writeln!(f, "  Unresolved: {}", self.unresolved)?;
        write!(f, "  Edges: {}", self.total_edges)
    }
}
