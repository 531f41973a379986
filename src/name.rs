//! Qualified module names - stable identity for every module
//!
//! Format: dot-separated identifier components, e.g. `a.b.module`.
//!
//! A `ModuleName` is the primary key for:
//! - Modules in the import graph
//! - Edges
//! - Report entries

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dot-separated qualified module name, the unique key of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(String);

impl ModuleName {
    /// Parse a qualified name, validating each dotted component.
    ///
    /// Components must be non-empty and consist of identifier characters
    /// (letters, digits, underscores, not starting with a digit).
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidName("empty name".to_string()));
        }
        for part in name.split('.') {
            if !is_identifier(part) {
                return Err(Error::InvalidName(format!(
                    "invalid component {:?} in {:?}",
                    part, name
                )));
            }
        }
        Ok(Self(name.to_string()))
    }

    /// The full dotted name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dotted components
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Number of dotted components
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }

    /// The last component (the module's own short name)
    pub fn basename(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The enclosing package's qualified name, or `None` for top-level.
    ///
    /// This is a weak relation used for relative-import arithmetic, not
    /// ownership.
    pub fn parent(&self) -> Option<ModuleName> {
        self.0.rsplit_once('.').map(|(head, _)| Self(head.to_string()))
    }

    /// Append a child component, producing `self.child`
    pub fn join(&self, child: &str) -> ModuleName {
        Self(format!("{}.{}", self.0, child))
    }

    /// Append a dotted suffix, producing `self.suffix` (suffix may itself
    /// contain dots)
    pub fn join_dotted(&self, suffix: &ModuleName) -> ModuleName {
        Self(format!("{}.{}", self.0, suffix.0))
    }

    /// Strip `n` trailing components, walking up the parent chain.
    ///
    /// Returns `None` when fewer than `n` ancestors exist.
    pub fn ancestor(&self, n: usize) -> Option<ModuleName> {
        let mut current = self.clone();
        for _ in 0..n {
            current = current.parent()?;
        }
        Some(current)
    }

    /// All prefixes of the name, shortest first: `a`, `a.b`, `a.b.c`
    pub fn prefixes(&self) -> Vec<ModuleName> {
        let mut out = Vec::new();
        let mut acc = String::new();
        for part in self.components() {
            if !acc.is_empty() {
                acc.push('.');
            }
            acc.push_str(part);
            out.push(Self(acc.clone()));
        }
        out
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModuleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ModuleName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
