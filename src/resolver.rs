//! Import resolution
//!
//! Turns one import declaration into zero or more qualified module
//! names, looking them up against the builtin registry and the search
//! path, and feeding every failure to the diagnostics sink.
//!
//! Lookup rules:
//! - absolute dotted names resolve component-by-component; every prefix
//!   must itself be a package before the next component is attempted
//! - without the `absolute_import` future flag, a bare import from
//!   inside a package first tries the enclosing package, then the
//!   absolute name (the legacy fallback)
//! - relative targets strip ancestors from the requester's package
//!   chain and are reported under the computed absolute name; escaping
//!   past the top is a missing resolution keyed by its textual form
//! - wildcard imports on an unresolved source are maybe-missing
//!   regardless of conditionality
//! - named imports from a package probe submodules first, then the
//!   package's module-scope bindings

use crate::decl::{BoundNames, ImportDeclaration, ImportTarget};
use crate::graph::ImportGraph;
use crate::module::{Module, ModuleKind};
use crate::name::ModuleName;
use crate::report::Diagnostics;
use crate::scanner::Scanner;
use crate::search::SearchPath;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Resolves declarations against the search path, creating module
/// entries in the graph as lookups succeed or terminally fail.
///
/// The resolver holds no graph of its own; it mutates the builder's
/// graph through borrowed access only.
pub struct Resolver<'a> {
    search: &'a SearchPath,
    scanner: &'a Scanner,
    excludes: &'a BTreeSet<String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a search path and scanner
    pub fn new(
        search: &'a SearchPath,
        scanner: &'a Scanner,
        excludes: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            search,
            scanner,
            excludes,
        }
    }

    /// Resolve one declaration, recording edges, failures, and newly
    /// discovered modules (pushed onto `discovered` in first-discovery
    /// order).
    pub fn resolve_declaration(
        &self,
        graph: &mut ImportGraph,
        diagnostics: &mut Diagnostics,
        decl: &ImportDeclaration,
        discovered: &mut Vec<ModuleName>,
    ) {
        let lookup = match &decl.target {
            ImportTarget::Absolute(target) => {
                self.resolve_level0(graph, diagnostics, decl, target, discovered)
            }
            ImportTarget::Relative { level, name } => {
                self.resolve_relative(graph, diagnostics, decl, *level, name.as_ref(), discovered)
            }
        };

        let resolved = match lookup {
            Lookup::Found(resolved) => resolved,
            Lookup::NotFound(key) => {
                let tolerated = decl.bound.is_wildcard() || decl.is_conditional;
                diagnostics.record_failure(key, tolerated);
                return;
            }
        };

        // A package's relative import of its own submodule resolves to
        // the package itself; a self-edge carries no information.
        if resolved != decl.requester {
            graph.add_edge(decl.requester.clone(), resolved.clone());
        }
        self.resolve_bound_names(graph, diagnostics, decl, &resolved, discovered);
    }

    /// Load a module by absolute qualified name, component by component.
    ///
    /// Creates a graph entry for every prefix it attempts: a concrete
    /// module on success, a terminal placeholder on failure. Lookups are
    /// idempotent; an existing entry short-circuits the probe.
    pub fn load_absolute(
        &self,
        graph: &mut ImportGraph,
        diagnostics: &mut Diagnostics,
        name: &ModuleName,
        use_builtins: bool,
        discovered: &mut Vec<ModuleName>,
    ) -> ModuleKind {
        let prefixes = name.prefixes();
        let last = prefixes.len() - 1;
        let mut parent_dir: Option<PathBuf> = None;
        let mut kind = ModuleKind::Unresolved;

        for (i, prefix) in prefixes.iter().enumerate() {
            if let Some(existing) = graph.get(prefix) {
                kind = existing.kind;
                parent_dir = existing.package_dir.clone();
            } else {
                kind = self.load_component(
                    graph,
                    diagnostics,
                    prefix,
                    parent_dir.as_deref(),
                    i == 0 && use_builtins,
                    discovered,
                );
                parent_dir = graph.get(prefix).and_then(|m| m.package_dir.clone());
            }

            if kind == ModuleKind::Unresolved {
                return ModuleKind::Unresolved;
            }
            // Builtins and regular modules are leaves; a deeper component
            // cannot resolve through them.
            if i < last && !kind.is_package() {
                return ModuleKind::Unresolved;
            }
        }

        kind
    }

    /// Probe and load a single not-yet-attempted component
    fn load_component(
        &self,
        graph: &mut ImportGraph,
        diagnostics: &mut Diagnostics,
        name: &ModuleName,
        parent_dir: Option<&std::path::Path>,
        use_builtins: bool,
        discovered: &mut Vec<ModuleName>,
    ) -> ModuleKind {
        if self.excludes.contains(name.as_str()) {
            tracing::debug!(module = %name, "excluded from resolution");
            graph.insert(Module::placeholder(name.clone()));
            return ModuleKind::Unresolved;
        }

        if use_builtins && self.search.is_builtin(name.as_str()) {
            tracing::debug!(module = %name, "resolved as builtin");
            graph.insert(Module::builtin(name.clone()));
            discovered.push(name.clone());
            return ModuleKind::Builtin;
        }

        let probed = match parent_dir {
            Some(dir) => self
                .search
                .probe(dir, name.basename())
                .map(|found| (None, found)),
            None => self
                .search
                .probe_roots(name.basename())
                .map(|(root, found)| (Some(root), found)),
        };

        let Some((root, found)) = probed else {
            graph.insert(Module::placeholder(name.clone()));
            return ModuleKind::Unresolved;
        };

        let mut module = Module::placeholder(name.clone());
        module.kind = found.kind;
        module.search_root = root;
        module.package_dir = found.package_dir;
        module.source_path = found.source_path.clone();

        if let Some(source_path) = &found.source_path {
            let scanned = self
                .search
                .read_source(source_path)
                .and_then(|text| self.scanner.scan(name, &text));
            match scanned {
                Ok(result) => {
                    module.absolute_imports = result.absolute_imports;
                    module.global_names = result.global_names;
                    module.has_star_import = result.has_star_import;
                    graph.set_declarations(name.clone(), result.declarations);
                }
                Err(e) => {
                    // Found on disk but unscannable: terminal
                    // placeholder, zero declarations, one diagnostic.
                    diagnostics.record_scan_failure(name.to_string(), e.to_string());
                    module.kind = ModuleKind::Unresolved;
                }
            }
        }

        let kind = module.kind;
        graph.insert(module);
        if kind.is_concrete() {
            tracing::debug!(module = %name, %kind, "discovered");
            discovered.push(name.clone());
        }
        kind
    }

    /// Level-0 lookup, with the legacy parent-package fallback when the
    /// requester has not opted into absolute imports
    fn resolve_level0(
        &self,
        graph: &mut ImportGraph,
        diagnostics: &mut Diagnostics,
        decl: &ImportDeclaration,
        target: &ModuleName,
        discovered: &mut Vec<ModuleName>,
    ) -> Lookup {
        let requester = graph.get(&decl.requester);
        let absolute_only = requester.map(|m| m.absolute_imports).unwrap_or(false);
        let legacy_base = if absolute_only {
            None
        } else {
            requester.and_then(relative_base)
        };

        if let Some(base) = legacy_base {
            let candidate = base.join_dotted(target);
            if self
                .load_absolute(graph, diagnostics, &candidate, false, discovered)
                .is_concrete()
            {
                return Lookup::Found(candidate);
            }
        }

        if self
            .load_absolute(graph, diagnostics, target, true, discovered)
            .is_concrete()
        {
            Lookup::Found(target.clone())
        } else {
            Lookup::NotFound(target.to_string())
        }
    }

    /// Relative-level arithmetic: one dot is the current package, each
    /// further dot strips one ancestor. No builtin fallback.
    fn resolve_relative(
        &self,
        graph: &mut ImportGraph,
        diagnostics: &mut Diagnostics,
        decl: &ImportDeclaration,
        level: u32,
        suffix: Option<&ModuleName>,
        discovered: &mut Vec<ModuleName>,
    ) -> Lookup {
        // Escaping past the top of the namespace has no absolute name;
        // that failure alone keeps the textual dotted form as its key.
        let Some(base) = graph.get(&decl.requester).and_then(relative_base) else {
            return Lookup::NotFound(decl.target.render());
        };
        let Some(base) = base.ancestor(level as usize - 1) else {
            return Lookup::NotFound(decl.target.render());
        };
        let target = match suffix {
            Some(suffix) => base.join_dotted(suffix),
            None => base,
        };

        if self
            .load_absolute(graph, diagnostics, &target, false, discovered)
            .is_concrete()
        {
            Lookup::Found(target)
        } else {
            Lookup::NotFound(target.to_string())
        }
    }

    /// `from X import a, b` once `X` resolved: submodules first, then
    /// `X`'s module-scope bindings, then the missing/maybe policy
    fn resolve_bound_names(
        &self,
        graph: &mut ImportGraph,
        diagnostics: &mut Diagnostics,
        decl: &ImportDeclaration,
        resolved: &ModuleName,
        discovered: &mut Vec<ModuleName>,
    ) {
        let BoundNames::Names(names) = &decl.bound else {
            // `import X` binds the module itself; a resolved wildcard
            // contributes no edges beyond `X`.
            return;
        };

        let Some(target) = graph.get(resolved) else {
            return;
        };
        // Regular modules and builtins cannot have submodules; their
        // bound names are plain attributes, never checked.
        if !target.kind.is_package() {
            return;
        }
        let global_names = target.global_names.clone();
        let has_star_import = target.has_star_import;

        for name in names {
            let sub = resolved.join(name);
            if self
                .load_absolute(graph, diagnostics, &sub, false, discovered)
                .is_concrete()
            {
                graph.add_edge(decl.requester.clone(), sub);
                continue;
            }
            if global_names.contains(name) {
                continue;
            }
            // A star import makes the package's export set unknowable.
            let tolerated = decl.is_conditional || has_star_import;
            diagnostics.record_failure(sub.to_string(), tolerated);
        }
    }
}

/// Outcome of a target lookup: the resolved qualified name, or the key
/// the failure is recorded under (the computed absolute name, except for
/// relative imports that never acquire one).
enum Lookup {
    Found(ModuleName),
    NotFound(String),
}

/// The base package for relative arithmetic and the legacy fallback: a
/// package is its own base; a module's base is its enclosing package.
fn relative_base(module: &Module) -> Option<ModuleName> {
    if module.is_package() {
        Some(module.name.clone())
    } else {
        module.parent()
    }
}
