use crate::types::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::path::{Path, PathBuf};

/// Per-file traversal marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Dependencies-first ordering of every file in a graph
///
/// Depth-first postorder: roots in graph insertion order, dependencies in
/// edge insertion order. An edge leading back to a file still on the
/// traversal stack closes a cycle; it is skipped and reported through
/// [`ProcessingOrder::deferred_edges`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingOrder {
    files: Vec<PathBuf>,
    deferred: Vec<(PathBuf, PathBuf)>,
}

impl ProcessingOrder {
    pub fn compute(graph: &DependencyGraph) -> Self {
        let node_count = graph.file_count();
        let mut state = vec![VisitState::Unvisited; node_count];
        let mut order: Vec<NodeIndex> = Vec::with_capacity(node_count);
        let mut deferred: Vec<(NodeIndex, NodeIndex)> = Vec::new();

        // (node, its dependencies, next dependency to visit)
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();

        for root in graph.node_indices() {
            if state[root.index()] != VisitState::Unvisited {
                continue;
            }
            state[root.index()] = VisitState::InProgress;
            stack.push((root, graph.dependency_indices(root), 0));

            while let Some((node, deps, next)) = stack.last_mut() {
                let node = *node;
                if let Some(&dep) = deps.get(*next) {
                    *next += 1;
                    match state[dep.index()] {
                        VisitState::Unvisited => {
                            state[dep.index()] = VisitState::InProgress;
                            stack.push((dep, graph.dependency_indices(dep), 0));
                        }
                        VisitState::InProgress => deferred.push((node, dep)),
                        VisitState::Done => {}
                    }
                } else {
                    state[node.index()] = VisitState::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }

        let to_path = |idx: NodeIndex| graph.path_of(idx).map(Path::to_path_buf);
        let files: Vec<PathBuf> = order.into_iter().filter_map(to_path).collect();
        let deferred: Vec<(PathBuf, PathBuf)> = deferred
            .into_iter()
            .filter_map(|(a, b)| Some((to_path(a)?, to_path(b)?)))
            .collect();

        if !deferred.is_empty() {
            log::debug!("Broke {} cyclic dependency edge(s)", deferred.len());
        }

        Self { files, deferred }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.files.iter().position(|file| file == path)
    }

    /// Edges `(dependent, dependency)` skipped to break cycles
    pub fn deferred_edges(&self) -> &[(PathBuf, PathBuf)] {
        &self.deferred
    }
}

impl<'a> IntoIterator for &'a ProcessingOrder {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(files: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for file in files {
            graph.add_file(*file);
        }
        for (a, b) in edges {
            graph.add_dependency(Path::new(a), Path::new(b));
        }
        graph
    }

    fn names(order: &ProcessingOrder) -> Vec<&str> {
        order.iter().filter_map(Path::to_str).collect()
    }

    #[test]
    fn chain_is_dependencies_first() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let order = ProcessingOrder::compute(&g);
        assert_eq!(names(&order), vec!["c", "b", "a"]);
        assert!(order.deferred_edges().is_empty());
    }

    #[test]
    fn diamond_visits_shared_dependency_once() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let order = ProcessingOrder::compute(&g);
        assert_eq!(names(&order), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn two_cycle_terminates_deterministically() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let first = ProcessingOrder::compute(&g);
        let second = ProcessingOrder::compute(&g);

        assert_eq!(names(&first), vec!["b", "a"]);
        assert_eq!(first, second);
        assert_eq!(
            first.deferred_edges(),
            &[(PathBuf::from("b"), PathBuf::from("a"))]
        );
    }

    #[test]
    fn isolated_files_keep_input_order() {
        let g = graph(&["x", "y", "z"], &[]);
        let order = ProcessingOrder::compute(&g);
        assert_eq!(names(&order), vec!["x", "y", "z"]);
        assert_eq!(order.position(Path::new("y")), Some(1));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let files: Vec<String> = (0..50_000).map(|i| format!("f{i}")).collect();
        let mut g = DependencyGraph::new();
        for file in &files {
            g.add_file(file.as_str());
        }
        for pair in files.windows(2) {
            g.add_dependency(Path::new(&pair[0]), Path::new(&pair[1]));
        }

        let order = ProcessingOrder::compute(&g);
        assert_eq!(order.len(), files.len());
        assert_eq!(order.files()[0], PathBuf::from("f49999"));
        assert_eq!(order.files()[files.len() - 1], PathBuf::from("f0"));
    }
}
