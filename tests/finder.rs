//! End-to-end finder scenarios over synthetic package trees.
//!
//! Each case materializes a small package hierarchy in a temp directory,
//! resolves an entry module against it, and checks the exact found /
//! missing / maybe-missing sets.

use modgraph::{GraphBuilder, ModuleName, Report, SearchPath};
use std::fs;
use std::path::Path;

/// Create a package tree from a compact listing: unindented lines name
/// files, lines indented by four spaces are content appended to the
/// preceding file (deeper indentation is kept, so nested Python blocks
/// survive).
fn create_package(dir: &Path, listing: &str) {
    let mut current: Option<std::path::PathBuf> = None;
    for line in listing.lines() {
        if line.starts_with(' ') {
            let path = current.as_ref().expect("content before any file line");
            let mut content = fs::read_to_string(path).unwrap();
            content.push_str(line.strip_prefix("    ").unwrap_or(line));
            content.push('\n');
            fs::write(path, content).unwrap();
        } else if !line.trim().is_empty() {
            let path = dir.join(line.trim());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "").unwrap();
            current = Some(path);
        }
    }
}

fn resolve(entry: &str, listing: &str) -> Report {
    let tmp = tempfile::tempdir().unwrap();
    create_package(tmp.path(), listing);
    let builder = GraphBuilder::new(SearchPath::new(vec![tmp.path().to_path_buf()])).unwrap();
    builder.build(&ModuleName::parse(entry).unwrap()).unwrap()
}

fn assert_report(report: &Report, found: &[&str], missing: &[&str], maybe: &[&str]) {
    let mut expected_found: Vec<&str> = found.to_vec();
    expected_found.sort_unstable();
    assert_eq!(report.found_names(), expected_found, "found set");

    let got_missing: Vec<&str> = report.missing.iter().map(|s| s.as_str()).collect();
    assert_eq!(got_missing, missing, "missing set");

    let got_maybe: Vec<&str> = report.maybe_missing.iter().map(|s| s.as_str()).collect();
    assert_eq!(got_maybe, maybe, "maybe-missing set");
}

#[test]
fn maybe_missing_behind_star_import() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
a/module.py
    from b import something
    from c import something
b/__init__.py
    from sys import *
",
    );
    assert_report(
        &report,
        &["a", "a.module", "b", "sys"],
        &["c"],
        &["b.something"],
    );
}

#[test]
fn maybe_missing_with_future_import() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
a/module.py
    from b import something
    from c import something
b/__init__.py
    from __future__ import absolute_import
    from sys import *
",
    );
    assert_report(
        &report,
        &["a", "a.module", "b", "sys", "__future__"],
        &["c"],
        &["b.something"],
    );
}

#[test]
fn package_resolution() {
    let report = resolve(
        "a.module",
        "\
mymodule.py
a/__init__.py
    from __future__ import absolute_import
    import blahblah
    from a import b
    import c
a/module.py
    import sys
    from a import b as x
    from a.c import sillyname
a/b.py
a/c.py
    from a.module import x
    import mymodule as sillyname
    from sys import version_info
",
    );
    assert_report(
        &report,
        &["__future__", "a", "a.b", "a.c", "a.module", "mymodule", "sys"],
        &["blahblah", "c"],
        &[],
    );
}

#[test]
fn namespace_package_resolution() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
    from a import b
a/module.py
    import sys
    from a import b as x
    from a.c import sillyname
    from q import pkg
    import blahblah
a/b.py
a/c.py
    from a.module import x
    from sys import version_info
q/pkg.py
    import z
",
    );
    assert_report(
        &report,
        &["a", "a.b", "a.c", "a.module", "sys", "q", "q.pkg"],
        &["blahblah", "z"],
        &[],
    );
    assert_eq!(
        report.found.get("q").copied(),
        Some(modgraph::ModuleKind::NamespacePackage)
    );
}

#[test]
fn absolute_imports_skip_package_shadows() {
    let report = resolve(
        "a.module",
        "\
mymodule.py
a/__init__.py
a/module.py
    from __future__ import absolute_import
    import sys
    import blahblah
    import z
    import gc
    import b.x
    from b import y
    from b.z import *
a/gc.py
a/sys.py
    import mymodule
b/__init__.py
    from . import z
b/unused.py
b/x.py
b/y.py
b/z.py
",
    );
    // With absolute imports in force, `a/sys.py` and `a/gc.py` shadow
    // nothing; the builtins win and `a/sys.py` is never even scanned.
    assert_report(
        &report,
        &[
            "__future__", "a", "a.module", "b", "b.x", "b.y", "b.z", "gc", "sys",
        ],
        &["blahblah", "z"],
        &[],
    );
}

#[test]
fn legacy_fallback_prefers_package_siblings() {
    let report = resolve(
        "a.module",
        "\
mymodule.py
a/__init__.py
a/module.py
    import sys
a/sys.py
    import mymodule
",
    );
    // Without the future flag, `import sys` inside package `a` finds the
    // sibling `a/sys.py` before the builtin.
    assert_report(&report, &["a", "a.module", "a.sys", "mymodule"], &[], &[]);
}

#[test]
fn relative_imports() {
    let report = resolve(
        "a.module",
        "\
mymodule.py
a/__init__.py
    from .b import y, z
a/module.py
    from __future__ import absolute_import
    import gc
a/gc.py
a/sys.py
a/b/__init__.py
    from ..b import x
    from .c import moduleC
a/b/x.py
a/b/y.py
a/b/z.py
a/b/g.py
a/b/c/__init__.py
    from ..c import e
a/b/c/moduleC.py
    from ..c import d
a/b/c/d.py
a/b/c/e.py
a/b/c/x.py
",
    );
    assert_report(
        &report,
        &[
            "__future__",
            "a",
            "a.module",
            "a.b",
            "a.b.y",
            "a.b.z",
            "a.b.c",
            "a.b.c.moduleC",
            "a.b.c.d",
            "a.b.c.e",
            "a.b.x",
            "gc",
        ],
        &[],
        &[],
    );
}

#[test]
fn relative_imports_deep_levels() {
    let report = resolve(
        "a.module",
        "\
mymodule.py
a/__init__.py
    from . import sys
a/another.py
a/module.py
    from .b import y, z
a/gc.py
a/sys.py
a/b/__init__.py
    from .c import moduleC
    from .c import d
a/b/x.py
a/b/y.py
a/b/z.py
a/b/c/__init__.py
    from . import e
a/b/c/moduleC.py
    from . import f
    from .. import x
    from ... import another
a/b/c/d.py
a/b/c/e.py
a/b/c/f.py
",
    );
    assert_report(
        &report,
        &[
            "a",
            "a.module",
            "a.sys",
            "a.b",
            "a.b.y",
            "a.b.z",
            "a.b.c",
            "a.b.c.d",
            "a.b.c.e",
            "a.b.c.moduleC",
            "a.b.c.f",
            "a.b.x",
            "a.another",
        ],
        &[],
        &[],
    );
}

#[test]
fn relative_import_of_attribute_and_absent_name() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
    def foo(): pass
a/module.py
    from . import foo
    from . import bar
",
    );
    // `foo` is bound at a's module scope; `bar` is neither a submodule
    // nor a binding, and nothing tolerates its absence.
    assert_report(&report, &["a", "a.module"], &["a.bar"], &[]);
}

#[test]
fn package_relative_imports_resolve_from_the_package_itself() {
    let report = resolve(
        "a.b.c",
        "\
a/__init__.py
a/another.py
a/b/__init__.py
a/b/x.py
a/b/c/__init__.py
    from . import e
    from .. import x
    from ... import another
a/b/c/e.py
",
    );
    assert_report(
        &report,
        &["a", "a.another", "a.b", "a.b.c", "a.b.c.e", "a.b.x"],
        &[],
        &[],
    );
}

#[test]
fn failing_relative_target_reports_the_qualified_name() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
a/module.py
    from .absent import x
",
    );
    assert_report(&report, &["a", "a.module"], &["a.absent"], &[]);
}

#[test]
fn relative_import_escaping_the_namespace_top() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
a/module.py
    from .... import way_out
",
    );
    assert_report(&report, &["a", "a.module"], &["....way_out"], &[]);
}

#[test]
fn wildcard_from_absent_module_is_maybe_missing() {
    let report = resolve(
        "top",
        "\
top.py
    from q import *
",
    );
    assert_report(&report, &["top"], &[], &["q"]);
    assert!(!report.missing.contains("q"));
}

#[test]
fn conditional_imports_are_maybe_missing() {
    let report = resolve(
        "top",
        "\
top.py
    try:
        import optional_speedups
    except ImportError:
        optional_speedups = None
    import hard_requirement
",
    );
    assert_report(
        &report,
        &["top"],
        &["hard_requirement"],
        &["optional_speedups"],
    );
}

#[test]
fn same_name_can_be_missing_and_maybe_missing() {
    let report = resolve(
        "top",
        "\
top.py
    try:
        import dual
    except ImportError:
        pass
    import dual
",
    );
    assert_report(&report, &["top"], &["dual"], &["dual"]);
}

#[test]
fn duplicate_search_path_roots_do_not_change_the_report() {
    let tmp = tempfile::tempdir().unwrap();
    create_package(
        tmp.path(),
        "\
a/__init__.py
a/module.py
    from b import something
b/__init__.py
",
    );
    let entry = ModuleName::parse("a.module").unwrap();

    let single = GraphBuilder::new(SearchPath::new(vec![tmp.path().to_path_buf()]))
        .unwrap()
        .build(&entry)
        .unwrap();
    let doubled = GraphBuilder::new(SearchPath::new(vec![
        tmp.path().to_path_buf(),
        tmp.path().to_path_buf(),
    ]))
    .unwrap()
    .build(&entry)
    .unwrap();

    assert_eq!(single.found_names(), doubled.found_names());
    assert_eq!(single.missing, doubled.missing);
    assert_eq!(single.maybe_missing, doubled.maybe_missing);
    assert_eq!(single.edges, doubled.edges);
}

#[test]
fn every_target_is_accounted_for() {
    let report = resolve(
        "top",
        "\
top.py
    import present
    import absent
    try:
        import shaky
    except ImportError:
        pass
present.py
    from q import *
",
    );
    for name in ["top", "present", "absent", "shaky", "q"] {
        assert!(report.accounts_for(name), "{} dropped silently", name);
    }
}

#[test]
fn edges_reconstruct_the_dependency_graph() {
    let report = resolve(
        "a.module",
        "\
a/__init__.py
a/module.py
    import sys
    from a import helper
a/helper.py
",
    );
    let edges: Vec<(&str, &str)> = report
        .edges
        .iter()
        .map(|(f, t)| (f.as_str(), t.as_str()))
        .collect();
    assert!(edges.contains(&("a.module", "sys")));
    assert!(edges.contains(&("a.module", "a")));
    assert!(edges.contains(&("a.module", "a.helper")));
}

#[test]
fn package_importing_its_own_submodule_emits_no_self_edge() {
    let report = resolve(
        "b",
        "\
b/__init__.py
    from . import z
b/z.py
",
    );
    assert!(report.edges.iter().all(|(from, to)| from != to));
    assert!(report
        .edges
        .contains(&("b".to_string(), "b.z".to_string())));
}

#[test]
fn increasing_level_strips_one_package_at_a_time() {
    let listing = "\
p0/__init__.py
p0/p1/__init__.py
p0/p1/p2/__init__.py
p0/p1/p2/m.py
    from . import s2
    from .. import s1
    from ... import s0
p0/p1/p2/s2.py
p0/p1/s1.py
p0/s0.py
";
    let report = resolve("p0.p1.p2.m", listing);
    assert_report(
        &report,
        &[
            "p0",
            "p0.p1",
            "p0.p1.p2",
            "p0.p1.p2.m",
            "p0.p1.p2.s2",
            "p0.p1.s1",
            "p0.s0",
        ],
        &[],
        &[],
    );
}
