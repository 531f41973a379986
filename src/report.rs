//! Diagnostics and the final report
//!
//! Every resolution failure is classified exactly once:
//! - maybe-missing when the failing declaration is conditionally guarded,
//!   or when a wildcard's source module itself failed to resolve
//! - missing otherwise
//!
//! A name may appear in both sets when different declarations reference
//! it under different conditionality; presence in `missing` is
//! authoritative for consumers.

use crate::graph::ImportGraph;
use crate::module::ModuleKind;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Passive sink fed by the resolver during traversal.
#[derive(Debug, Default)]
pub struct Diagnostics {
    missing: BTreeSet<String>,
    maybe_missing: BTreeSet<String>,
    scan_failures: BTreeMap<String, String>,
}

impl Diagnostics {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one resolution failure.
    ///
    /// Repeated failures against the same key collapse into a single
    /// entry per set.
    pub fn record_failure(&mut self, key: impl Into<String>, tolerated: bool) {
        let key = key.into();
        tracing::debug!(target = %key, tolerated, "resolution failure");
        if tolerated {
            self.maybe_missing.insert(key);
        } else {
            self.missing.insert(key);
        }
    }

    /// Attach a scan diagnostic to a module whose source could not be
    /// parsed
    pub fn record_scan_failure(&mut self, name: impl Into<String>, message: impl Into<String>) {
        let name = name.into();
        let message = message.into();
        tracing::warn!(module = %name, %message, "scan failure");
        self.scan_failures.insert(name, message);
    }

    /// Names classified as definitely missing
    pub fn missing(&self) -> &BTreeSet<String> {
        &self.missing
    }

    /// Names classified as possibly missing
    pub fn maybe_missing(&self) -> &BTreeSet<String> {
        &self.maybe_missing
    }
}

/// Final report of a resolver run.
///
/// `found`, `missing`, and `maybe_missing` are order-independent sets
/// (sorted here for stable presentation); `edges` preserves
/// first-encounter order so tooling can reconstruct the graph.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Concrete modules by qualified name, with their kinds
    pub found: BTreeMap<String, ModuleKind>,
    /// Unconditional import targets that could not be found
    pub missing: BTreeSet<String>,
    /// Targets whose absence is tolerated, or unresolvable wildcards
    pub maybe_missing: BTreeSet<String>,
    /// Ordered `(from, to)` dependency pairs
    pub edges: Vec<(String, String)>,
    /// Modules whose source could not be parsed, with the parse message
    pub scan_failures: BTreeMap<String, String>,
}

impl Report {
    /// Assemble the report from the finished graph and diagnostics
    pub fn from_run(graph: &ImportGraph, diagnostics: Diagnostics) -> Self {
        let found = graph
            .modules()
            .filter(|m| m.kind.is_concrete())
            .map(|m| (m.name.to_string(), m.kind))
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            found,
            missing: diagnostics.missing,
            maybe_missing: diagnostics.maybe_missing,
            edges,
            scan_failures: diagnostics.scan_failures,
        }
    }

    /// Sorted qualified names of all found modules
    pub fn found_names(&self) -> Vec<&str> {
        self.found.keys().map(|s| s.as_str()).collect()
    }

    /// Check the completeness guarantee consumers rely on: a name is
    /// accounted for when it is found, missing, or maybe-missing
    pub fn accounts_for(&self, name: &str) -> bool {
        self.found.contains_key(name)
            || self.missing.contains(name)
            || self.maybe_missing.contains(name)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Found modules ({}):", self.found.len())?;
        for (name, kind) in &self.found {
            writeln!(f, "  {} ({})", name, kind)?;
        }

        if !self.missing.is_empty() {
            writeln!(f, "Missing modules ({}):", self.missing.len())?;
            for name in &self.missing {
                writeln!(f, "  {}", name)?;
            }
        }

        if !self.maybe_missing.is_empty() {
            writeln!(f, "Maybe-missing modules ({}):", self.maybe_missing.len())?;
            for name in &self.maybe_missing {
                writeln!(f, "  {}", name)?;
            }
        }

        if !self.scan_failures.is_empty() {
            writeln!(f, "Scan failures ({}):", self.scan_failures.len())?;
            for (name, message) in &self.scan_failures {
                writeln!(f, "  {}: {}", name, message)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::name::ModuleName;

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    #[test]
    fn test_failure_classification() {
        let mut diag = Diagnostics::new();
        diag.record_failure("c", false);
        diag.record_failure("q", true);
        diag.record_failure("c", false);

        assert_eq!(diag.missing().len(), 1);
        assert!(diag.missing().contains("c"));
        assert!(diag.maybe_missing().contains("q"));
    }

    #[test]
    fn test_same_name_in_both_sets() {
        let mut diag = Diagnostics::new();
        diag.record_failure("dual", true);
        diag.record_failure("dual", false);

        assert!(diag.missing().contains("dual"));
        assert!(diag.maybe_missing().contains("dual"));
    }

    #[test]
    fn test_report_assembly() {
        let mut graph = ImportGraph::new();
        let mut pkg = Module::placeholder(name("a"));
        pkg.kind = ModuleKind::Package;
        graph.insert(pkg);
        graph.insert(Module::placeholder(name("c")));
        graph.add_edge(name("a"), name("c"));

        let mut diag = Diagnostics::new();
        diag.record_failure("c", false);

        let report = Report::from_run(&graph, diag);
        assert_eq!(report.found_names(), vec!["a"]);
        assert!(report.missing.contains("c"));
        assert_eq!(report.edges, vec![("a".to_string(), "c".to_string())]);
        assert!(report.accounts_for("a"));
        assert!(report.accounts_for("c"));
        assert!(!report.accounts_for("never_seen"));
    }

    #[test]
    fn test_display_is_sorted() {
        let mut graph = ImportGraph::new();
        for n in ["zeta", "alpha"] {
            let mut m = Module::placeholder(name(n));
            m.kind = ModuleKind::Regular;
            graph.insert(m);
        }
        let report = Report::from_run(&graph, Diagnostics::new());
        let text = report.to_string();
        let alpha = text.find("alpha").unwrap();
        let zeta = text.find("zeta").unwrap();
        assert!(alpha < zeta);
    }
}
