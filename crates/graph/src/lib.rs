//! # Context Graph
//!
//! File-level dependency analysis for source trees.
//!
//! ## Architecture
//!
//! ```text
//! Source files + project root
//!     │
//!     ├──> LanguageResolver (per language, in parallel)
//!     │      ├─ Capture imports / type usages (tree-sitter queries)
//!     │      └─ Map them to project files that exist on disk
//!     │
//!     ├──> DependencyGraph (petgraph)
//!     │      ├─ Nodes: interned file paths
//!     │      └─ Edges: depends-on, in discovery order
//!     │
//!     └──> ProcessingOrder
//!            ├─ Dependencies before dependents
//!            └─ Cycles broken deterministically
//! ```
//!
//! Supported strategies: Python (module paths) and Java (packages and
//! classpath layouts). Files in other languages become isolated nodes.

mod builder;
mod error;
mod order;
mod resolver;
mod scanner;
mod types;

pub use builder::{BuildDiagnostic, BuildOutput, DependencyGraphBuilder};
pub use error::{GraphError, Result};
pub use order::{ProcessingOrder, VisitState};
pub use resolver::{JavaResolver, LanguageResolver, PythonResolver};
pub use scanner::FileScanner;
pub use types::{DependencyGraph, ImportKind, ImportReference};
