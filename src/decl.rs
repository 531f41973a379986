//! Import declarations - one import statement's effect on the graph
//!
//! The scanner reduces every recognized statement to an
//! `ImportDeclaration`:
//! - `import a.b.c` / `import a.b.c as alias` - absolute target, binds
//!   the module itself
//! - `from a.b import c, d` - absolute target with bound names
//! - `from a.b import *` - absolute target with a wildcard marker
//! - `from .. import x` - relative target with a leading-dot level

use crate::name::ModuleName;
use serde::{Deserialize, Serialize};

/// The target of an import declaration: either an absolute dotted name,
/// or a relative form captured as a level plus an optional suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportTarget {
    /// `import a.b.c` or `from a.b import x`
    Absolute(ModuleName),
    /// `from .pkg import x` - `level` counts leading dots, `name` is the
    /// dotted suffix after them (`None` for bare `from . import x`)
    Relative {
        level: u32,
        name: Option<ModuleName>,
    },
}

impl ImportTarget {
    /// Relative-import level: 0 for absolute targets
    pub fn level(&self) -> u32 {
        match self {
            ImportTarget::Absolute(_) => 0,
            ImportTarget::Relative { level, .. } => *level,
        }
    }

    /// Textual form of the target as written in source
    /// (leading dots preserved for relative targets)
    pub fn render(&self) -> String {
        match self {
            ImportTarget::Absolute(name) => name.to_string(),
            ImportTarget::Relative { level, name } => {
                let dots = ".".repeat(*level as usize);
                match name {
                    Some(n) => format!("{}{}", dots, n),
                    None => dots,
                }
            }
        }
    }
}

impl std::fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// The names a declaration binds in the requesting module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundNames {
    /// `import X` - binds the module itself
    Module,
    /// `from X import a, b` - specific attributes/submodules
    Names(Vec<String>),
    /// `from X import *`
    Wildcard,
}

impl BoundNames {
    /// Check whether this is a wildcard import
    pub fn is_wildcard(&self) -> bool {
        matches!(self, BoundNames::Wildcard)
    }
}

/// One import statement, as emitted by the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDeclaration {
    /// Qualified name of the module containing the statement
    pub requester: ModuleName,
    /// What the statement imports
    pub target: ImportTarget,
    /// The names it binds
    pub bound: BoundNames,
    /// True when the statement is lexically guarded by an error-tolerant
    /// construct (try/except, platform/version conditionals)
    pub is_conditional: bool,
    /// Line number of the statement (1-indexed)
    pub line: u32,
}

impl ImportDeclaration {
    /// Create a declaration binding the target module itself
    pub fn module(requester: ModuleName, target: ImportTarget, line: u32) -> Self {
        Self {
            requester,
            target,
            bound: BoundNames::Module,
            is_conditional: false,
            line,
        }
    }

    /// Create a `from X import a, b` declaration
    pub fn names(
        requester: ModuleName,
        target: ImportTarget,
        names: Vec<String>,
        line: u32,
    ) -> Self {
        Self {
            requester,
            target,
            bound: BoundNames::Names(names),
            is_conditional: false,
            line,
        }
    }

    /// Create a `from X import *` declaration
    pub fn wildcard(requester: ModuleName, target: ImportTarget, line: u32) -> Self {
        Self {
            requester,
            target,
            bound: BoundNames::Wildcard,
            is_conditional: false,
            line,
        }
    }

    /// Mark the declaration as guarded by an error-tolerant construct
    pub fn conditional(mut self, conditional: bool) -> Self {
        self.is_conditional = conditional;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    #[test]
    fn test_target_levels() {
        let abs = ImportTarget::Absolute(name("a.b"));
        assert_eq!(abs.level(), 0);

        let rel = ImportTarget::Relative { level: 2, name: Some(name("pkg")) };
        assert_eq!(rel.level(), 2);
    }

    #[test]
    fn test_target_render() {
        assert_eq!(ImportTarget::Absolute(name("a.b.c")).render(), "a.b.c");
        assert_eq!(
            ImportTarget::Relative { level: 1, name: None }.render(),
            "."
        );
        assert_eq!(
            ImportTarget::Relative { level: 3, name: Some(name("x.y")) }.render(),
            "...x.y"
        );
    }

    #[test]
    fn test_conditional_builder() {
        let decl = ImportDeclaration::module(
            name("a.module"),
            ImportTarget::Absolute(name("b")),
            10,
        )
        .conditional(true);
        assert!(decl.is_conditional);
        assert_eq!(decl.bound, BoundNames::Module);
    }
}
