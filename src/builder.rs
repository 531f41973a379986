//! Graph builder - worklist traversal
//!
//! Owns the graph and drives discovery: seed the worklist with the entry
//! name, then for each pending module walk its scanned declarations in
//! order, enqueueing every newly discovered module. Cycles terminate
//! through the "already present" check on the module table; there is no
//! recursion.

use crate::{Result, name::ModuleName};
use crate::graph::ImportGraph;
use crate::report::{Diagnostics, Report};
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::search::SearchPath;
use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

/// Builds the transitive import graph for an entry module.
pub struct GraphBuilder {
    search: SearchPath,
    scanner: Scanner,
    excludes: BTreeSet<String>,
    deadline: Option<Instant>,
}

impl GraphBuilder {
    /// Create a builder over a search path
    pub fn new(search: SearchPath) -> Result<Self> {
        Ok(Self {
            search,
            scanner: Scanner::new()?,
            excludes: BTreeSet::new(),
            deadline: None,
        })
    }

    /// Treat a name as not-found during resolution
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excludes.insert(name.into());
        self
    }

    /// Abort the worklist loop once the deadline passes, reporting the
    /// partial sets gathered so far
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run the traversal and return the best-effort report.
    ///
    /// The only fatal condition is an invalid search-path root, checked
    /// before traversal begins; every other failure lands in the report.
    pub fn build(&self, entry: &ModuleName) -> Result<Report> {
        self.search.validate()?;

        let mut graph = ImportGraph::new();
        let mut diagnostics = Diagnostics::new();
        let mut discovered = Vec::new();
        let mut worklist = VecDeque::new();
        let resolver = Resolver::new(&self.search, &self.scanner, &self.excludes);

        tracing::info!(entry = %entry, "building import graph");

        // The entry's own identity is a plain absolute lookup.
        let kind = resolver.load_absolute(
            &mut graph,
            &mut diagnostics,
            entry,
            true,
            &mut discovered,
        );
        if !kind.is_concrete() {
            diagnostics.record_failure(entry.to_string(), false);
        }
        worklist.extend(discovered.drain(..));

        while let Some(current) = worklist.pop_front() {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    tracing::warn!(
                        pending = worklist.len() + 1,
                        "deadline reached, reporting partial sets"
                    );
                    break;
                }
            }

            let declarations = graph.declarations(&current).to_vec();
            tracing::debug!(module = %current, count = declarations.len(), "processing declarations");
            for decl in &declarations {
                resolver.resolve_declaration(&mut graph, &mut diagnostics, decl, &mut discovered);
                worklist.extend(discovered.drain(..));
            }
        }

        tracing::info!("{}", graph.stats());
        Ok(Report::from_run(&graph, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    fn build(files: &[(&str, &str)], entry: &str) -> Report {
        let tmp = tempfile::tempdir().unwrap();
        for (path, content) in files {
            write(&tmp.path().join(path), content);
        }
        let builder = GraphBuilder::new(SearchPath::new(vec![tmp.path().to_path_buf()])).unwrap();
        builder.build(&name(entry)).unwrap()
    }

    #[test]
    fn test_invalid_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let builder =
            GraphBuilder::new(SearchPath::new(vec![tmp.path().join("nope")])).unwrap();
        assert!(builder.build(&name("anything")).is_err());
    }

    #[test]
    fn test_missing_entry_is_reported_not_fatal() {
        let report = build(&[], "ghost");
        assert!(report.found.is_empty());
        assert!(report.missing.contains("ghost"));
    }

    #[test]
    fn test_cyclic_imports_terminate() {
        let report = build(
            &[
                ("p/__init__.py", ""),
                ("p/one.py", "from p import two\n"),
                ("p/two.py", "from p import one\n"),
            ],
            "p.one",
        );
        assert_eq!(report.found_names(), vec!["p", "p.one", "p.two"]);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_package_importing_own_submodule_cycle() {
        let report = build(
            &[
                ("p/__init__.py", "from p import sub\n"),
                ("p/sub.py", "import p\n"),
            ],
            "p.sub",
        );
        assert_eq!(report.found_names(), vec!["p", "p.sub"]);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_determinism_across_runs() {
        let files: &[(&str, &str)] = &[
            ("a/__init__.py", ""),
            ("a/module.py", "from b import something\nfrom c import something\n"),
            ("b/__init__.py", "from sys import *\n"),
        ];
        let first = build(files, "a.module");
        let second = build(files, "a.module");

        assert_eq!(first.found_names(), second.found_names());
        assert_eq!(first.missing, second.missing);
        assert_eq!(first.maybe_missing, second.maybe_missing);
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn test_excluded_module_goes_missing() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("top.py"), "import helper\n");
        write(&tmp.path().join("helper.py"), "");

        let builder = GraphBuilder::new(SearchPath::new(vec![tmp.path().to_path_buf()]))
            .unwrap()
            .exclude("helper");
        let report = builder.build(&name("top")).unwrap();

        assert_eq!(report.found_names(), vec!["top"]);
        assert!(report.missing.contains("helper"));
    }

    #[test]
    fn test_expired_deadline_reports_partial_sets() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("top.py"), "import other\n");
        write(&tmp.path().join("other.py"), "");

        let builder = GraphBuilder::new(SearchPath::new(vec![tmp.path().to_path_buf()]))
            .unwrap()
            .with_deadline(Instant::now());
        let report = builder.build(&name("top")).unwrap();

        // The entry is loaded before the worklist loop; its declarations
        // are never processed.
        assert_eq!(report.found_names(), vec!["top"]);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_scan_failure_does_not_stop_traversal() {
        let report = build(
            &[
                ("top.py", "import broken\nimport fine\n"),
                ("broken.py", "def broken(:\n"),
                ("fine.py", ""),
            ],
            "top",
        );
        assert_eq!(report.found_names(), vec!["fine", "top"]);
        assert!(report.missing.contains("broken"));
        assert!(report.scan_failures.contains_key("broken"));
    }
}
