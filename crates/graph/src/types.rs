use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What a captured syntax node says about a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImportKind {
    /// `import a.b.C` / `import pkg.sub` / `from pkg import name`
    DirectImport,

    /// `import a.b.*` / `from pkg import *`
    WildcardImport,

    /// `import static a.B.m` / `import static a.B.*`
    StaticImport,

    /// `package a.b;`
    PackageDecl,

    /// A type name used anywhere in the file
    TypeUsage,

    /// `new X(...)`
    Instantiation,
}

/// Raw dependency token captured from a file, before resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReference {
    pub kind: ImportKind,

    /// Captured text, normalized (no whitespace, no trailing `.*` or `;`)
    pub text: String,

    /// File the reference was found in
    pub file: PathBuf,

    /// Line of the capture (1-indexed)
    pub line: usize,
}

impl ImportReference {
    pub fn new(kind: ImportKind, text: impl Into<String>, file: &Path, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            file: file.to_path_buf(),
            line,
        }
    }
}

/// File-level dependency graph
///
/// Nodes are interned file paths; an edge `a -> b` means `a` depends on `b`.
/// Edges are deduplicated, never self-referential, and only connect files that
/// were added to the graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PathBuf, ()>,
    path_index: HashMap<PathBuf, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file node, returning the existing index if already present
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> NodeIndex {
        let path = path.into();
        if let Some(&idx) = self.path_index.get(&path) {
            return idx;
        }
        let idx = self.graph.add_node(path.clone());
        self.path_index.insert(path, idx);
        idx
    }

    /// Record that `from` depends on `to`
    ///
    /// Returns `false` when the edge was not added: either endpoint is not a
    /// file of this graph, it would be a self-edge, or it already exists.
    pub fn add_dependency(&mut self, from: &Path, to: &Path) -> bool {
        let (Some(&a), Some(&b)) = (self.path_index.get(from), self.path_index.get(to)) else {
            return false;
        };
        if a == b || self.graph.contains_edge(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.path_index.contains_key(path)
    }

    pub fn index_of(&self, path: &Path) -> Option<NodeIndex> {
        self.path_index.get(path).copied()
    }

    pub fn path_of(&self, idx: NodeIndex) -> Option<&Path> {
        self.graph.node_weight(idx).map(PathBuf::as_path)
    }

    /// All files, in the order they were added
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.path_of(idx))
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Direct dependencies of a node, in insertion order
    pub(crate) fn dependency_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph walks adjacency lists newest-first
        let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).collect();
        edges.sort_by_key(|edge| edge.id().index());
        edges.into_iter().map(|edge| edge.target()).collect()
    }

    /// Direct dependencies of a file, in insertion order
    pub fn dependencies(&self, path: &Path) -> Vec<&Path> {
        self.index_of(path)
            .map(|idx| {
                self.dependency_indices(idx)
                    .into_iter()
                    .filter_map(|dep| self.path_of(dep))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Files that depend directly on `path`
    pub fn dependents(&self, path: &Path) -> Vec<&Path> {
        let Some(idx) = self.index_of(path) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Incoming).collect();
        edges.sort_by_key(|edge| edge.id().index());
        edges
            .into_iter()
            .filter_map(|edge| self.path_of(edge.source()))
            .collect()
    }

    /// All edges as `(dependent, dependency)`, in insertion order
    pub fn edges(&self) -> Vec<(&Path, &Path)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .filter_map(|(a, b)| Some((self.path_of(a)?, self.path_of(b)?)))
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
