//! Import scanner
//!
//! Extracts import declarations from Python source using tree-sitter.
//! The scanner is a pure function of its input: it never touches the
//! graph, never resolves anything, and reads no files.
//!
//! Besides the ordered declarations it reports three pieces of
//! per-module metadata the resolver needs:
//! - the `absolute_import` future flag (first statement only)
//! - the set of names bound at module scope (defs, classes, assignment
//!   targets, import bindings)
//! - whether the module performs a top-level `from X import *`

use crate::{Error, Result};
use crate::decl::{ImportDeclaration, ImportTarget};
use crate::name::ModuleName;
use std::collections::BTreeSet;
use tree_sitter::{Node, Parser};

/// Everything scanning one module's source produces.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Import declarations in source order
    pub declarations: Vec<ImportDeclaration>,
    /// `from __future__ import absolute_import` was the first statement
    pub absolute_imports: bool,
    /// Names bound at module scope
    pub global_names: BTreeSet<String>,
    /// A top-level wildcard import makes the export set unknowable
    pub has_star_import: bool,
}

/// Python import scanner backed by tree-sitter.
pub struct Scanner {
    parser: std::sync::Mutex<Parser>,
}

impl Scanner {
    /// Create a new scanner with the Python grammar loaded
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Parse(format!("loading python grammar: {}", e)))?;
        Ok(Self {
            parser: std::sync::Mutex::new(parser),
        })
    }

    /// Scan one module's source into an ordered sequence of declarations.
    ///
    /// A source that cannot be parsed (no tree, or syntax errors in the
    /// root) is a scan failure: the caller marks the module unresolved
    /// and traversal continues.
    pub fn scan(&self, module: &ModuleName, source: &str) -> Result<ScanResult> {
        let tree = {
            let mut parser = self
                .parser
                .lock()
                .map_err(|_| Error::Parse("scanner parser poisoned".to_string()))?;
            parser
                .parse(source, None)
                .ok_or_else(|| Error::Parse(format!("no parse tree for {}", module)))?
        };

        let root = tree.root_node();
        if root.has_error() {
            return Err(Error::Parse(format!("syntax errors in {}", module)));
        }

        let mut walker = Walker {
            module,
            source,
            result: ScanResult::default(),
        };
        walker.scan_module(root);
        Ok(walker.result)
    }
}

struct Walker<'a> {
    module: &'a ModuleName,
    source: &'a str,
    result: ScanResult,
}

impl<'a> Walker<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn line(&self, node: Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    /// Walk the module body. The future flag is honored only when the
    /// future import is the first statement (a leading docstring does
    /// not count).
    fn scan_module(&mut self, root: Node) {
        let mut cursor = root.walk();
        let mut seen_code = false;

        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "comment" => continue,
                "expression_statement" if !seen_code && is_docstring(child) => continue,
                "future_import_statement" => {
                    let first = !seen_code;
                    self.extract_future_import(child, first);
                    seen_code = true;
                }
                _ => {
                    self.walk_stmt(child, false, true);
                    seen_code = true;
                }
            }
        }
    }

    /// Walk one statement (or statement body), collecting declarations.
    ///
    /// `guarded` is true inside error-tolerant constructs; `module_scope`
    /// stays true through module-level control flow but turns false
    /// inside function and class bodies.
    fn walk_stmt(&mut self, node: Node, guarded: bool, module_scope: bool) {
        match node.kind() {
            "import_statement" => {
                self.extract_import(node, guarded, module_scope);
            }
            "import_from_statement" => {
                self.extract_import_from(node, guarded, module_scope);
            }
            "future_import_statement" => {
                // Past the first statement the flag is ignored, but the
                // declaration is still emitted.
                self.extract_future_import(node, false);
            }
            "function_definition" | "class_definition" => {
                if module_scope {
                    if let Some(name) = node.child_by_field_name("name") {
                        let name = self.text(name).to_string();
                        self.result.global_names.insert(name);
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_children(body, guarded, false);
                }
            }
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.walk_stmt(definition, guarded, module_scope);
                }
            }
            "try_statement" => {
                // Only the body and the except handlers are
                // failure-tolerant; else/finally clauses run after the
                // handlers no longer apply.
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "block" | "except_clause" | "except_group_clause" => {
                            self.walk_children(child, true, module_scope);
                        }
                        "else_clause" | "finally_clause" => {
                            self.walk_children(child, guarded, module_scope);
                        }
                        _ => {}
                    }
                }
            }
            "if_statement" => {
                let platform_guard = node
                    .child_by_field_name("condition")
                    .map(|c| is_platform_condition(self.text(c)))
                    .unwrap_or(false);
                self.walk_children(node, guarded || platform_guard, module_scope);
            }
            "expression_statement" => {
                if module_scope {
                    self.collect_assignment_targets(node);
                }
            }
            _ => {
                self.walk_children(node, guarded, module_scope);
            }
        }
    }

    fn walk_children(&mut self, node: Node, guarded: bool, module_scope: bool) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "comment" {
                continue;
            }
            self.walk_stmt(child, guarded, module_scope);
        }
    }

    /// `import a.b.c` / `import a.b.c as alias` - one declaration per
    /// comma-separated target, binding the module itself.
    fn extract_import(&mut self, node: Node, guarded: bool, module_scope: bool) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let (name_node, alias) = match child.kind() {
                "dotted_name" => (Some(child), None),
                "aliased_import" => (
                    child.child_by_field_name("name"),
                    child
                        .child_by_field_name("alias")
                        .map(|a| self.text(a).to_string()),
                ),
                _ => continue,
            };
            let Some(name_node) = name_node else { continue };
            let Ok(target) = ModuleName::parse(self.text(name_node)) else {
                continue;
            };

            if module_scope {
                // `import a.b.c` binds the top package; an alias binds
                // the full target under the alias name.
                let bound = alias.clone().unwrap_or_else(|| {
                    target.components().next().unwrap_or_default().to_string()
                });
                self.result.global_names.insert(bound);
            }

            self.result.declarations.push(
                ImportDeclaration::module(
                    self.module.clone(),
                    ImportTarget::Absolute(target),
                    self.line(node),
                )
                .conditional(guarded),
            );
        }
    }

    /// `from X import a, b` / `from X import *` / relative forms
    fn extract_import_from(&mut self, node: Node, guarded: bool, module_scope: bool) {
        let Some(target) = self.extract_from_target(node) else {
            return;
        };

        // Wildcard: `from X import *`
        let mut cursor = node.walk();
        let has_wildcard = node
            .named_children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import");
        if has_wildcard {
            if module_scope {
                self.result.has_star_import = true;
            }
            self.result.declarations.push(
                ImportDeclaration::wildcard(self.module.clone(), target, self.line(node))
                    .conditional(guarded),
            );
            return;
        }

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if node.child_by_field_name("module_name") == Some(child) {
                continue;
            }
            match child.kind() {
                "dotted_name" => {
                    let name = self.text(child).to_string();
                    if module_scope {
                        self.result.global_names.insert(name.clone());
                    }
                    names.push(name);
                }
                "aliased_import" => {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        let name = self.text(name_node).to_string();
                        if module_scope {
                            let bound = child
                                .child_by_field_name("alias")
                                .map(|a| self.text(a).to_string())
                                .unwrap_or_else(|| name.clone());
                            self.result.global_names.insert(bound);
                        }
                        names.push(name);
                    }
                }
                _ => {}
            }
        }

        self.result.declarations.push(
            ImportDeclaration::names(self.module.clone(), target, names, self.line(node))
                .conditional(guarded),
        );
    }

    /// The `X` of `from X import ...`: absolute dotted name or a
    /// relative form captured as (level, optional dotted suffix).
    fn extract_from_target(&self, node: Node) -> Option<ImportTarget> {
        let module_name = node.child_by_field_name("module_name")?;
        match module_name.kind() {
            "dotted_name" => {
                let name = ModuleName::parse(self.text(module_name)).ok()?;
                Some(ImportTarget::Absolute(name))
            }
            "relative_import" => {
                let mut level = 0u32;
                let mut suffix = None;
                let mut cursor = module_name.walk();
                for part in module_name.named_children(&mut cursor) {
                    match part.kind() {
                        "import_prefix" => {
                            level = self.text(part).chars().filter(|&c| c == '.').count() as u32;
                        }
                        "dotted_name" => {
                            suffix = ModuleName::parse(self.text(part)).ok();
                        }
                        _ => {}
                    }
                }
                if level == 0 {
                    return None;
                }
                Some(ImportTarget::Relative { level, name: suffix })
            }
            _ => None,
        }
    }

    /// `from __future__ import absolute_import, ...`
    ///
    /// Emits a normal declaration targeting `__future__`; the flag is set
    /// only when this is the first statement of the module.
    fn extract_future_import(&mut self, node: Node, first_statement: bool) {
        let Ok(future) = ModuleName::parse("__future__") else {
            return;
        };
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "dotted_name" => names.push(self.text(child).to_string()),
                "aliased_import" => {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        names.push(self.text(name_node).to_string());
                    }
                }
                _ => {}
            }
        }

        if first_statement && names.iter().any(|n| n == "absolute_import") {
            self.result.absolute_imports = true;
        }
        for name in &names {
            self.result.global_names.insert(name.clone());
        }

        self.result.declarations.push(ImportDeclaration::names(
            self.module.clone(),
            ImportTarget::Absolute(future),
            names,
            self.line(node),
        ));
    }

    /// Top-level assignment targets count as module globals
    fn collect_assignment_targets(&mut self, stmt: Node) {
        let mut cursor = stmt.walk();
        for child in stmt.named_children(&mut cursor) {
            if child.kind() != "assignment" {
                continue;
            }
            if let Some(left) = child.child_by_field_name("left") {
                self.collect_pattern_names(left);
            }
        }
    }

    fn collect_pattern_names(&mut self, node: Node) {
        match node.kind() {
            "identifier" => {
                let name = self.text(node).to_string();
                self.result.global_names.insert(name);
            }
            "tuple_pattern" | "list_pattern" | "pattern_list" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.collect_pattern_names(child);
                }
            }
            _ => {}
        }
    }
}

/// A bare string expression, e.g. a module docstring
fn is_docstring(stmt: Node) -> bool {
    stmt.named_child(0).map(|c| c.kind() == "string").unwrap_or(false)
}

/// Lexical check for platform/version conditionals whose failing branch
/// is expected to be tolerated
fn is_platform_condition(condition: &str) -> bool {
    condition.contains("sys.platform")
        || condition.contains("sys.version")
        || condition.contains("os.name")
}
