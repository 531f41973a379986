//! # Modgraph - Import graph resolver for Python bundling
//!
//! Determines, for an entry module of a dotted Python namespace, the
//! complete transitive set of modules it depends on, so a packaging tool
//! can bundle exactly what is needed for standalone distribution.
//!
//! Modgraph provides:
//! - Tree-sitter based scanning of import declarations
//! - Resolution under package / namespace-package / relative-import rules
//! - Deduplicated worklist discovery of the dependency graph
//! - Classification of every unresolved reference as missing or
//!   maybe-missing

pub mod name;
pub mod module;
pub mod decl;
pub mod scanner;
pub mod search;
pub mod resolver;
pub mod graph;
pub mod builder;
pub mod report;
pub mod config;

// Re-exports for convenient access
pub use name::ModuleName;
pub use module::{Module, ModuleKind};
pub use decl::{BoundNames, ImportDeclaration, ImportTarget};
pub use search::SearchPath;
pub use graph::ImportGraph;
pub use builder::GraphBuilder;
pub use report::Report;

/// Result type alias for Modgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Modgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid module name: {0}")]
    InvalidName(String),

    #[error("Invalid search path root: {0}")]
    SearchPath(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
