use crate::error::{GraphError, Result};
use crate::order::ProcessingOrder;
use crate::resolver::LanguageResolver;
use crate::types::DependencyGraph;
use context_syntax::{normalize_path, Language, SourceFile};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A file whose dependencies could not be resolved
///
/// The file is still part of the graph, with no outgoing edges.
#[derive(Debug)]
pub struct BuildDiagnostic {
    pub file: PathBuf,
    pub error: GraphError,
}

/// Result of a graph build
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: DependencyGraph,
    pub order: ProcessingOrder,
    pub diagnostics: Vec<BuildDiagnostic>,
}

/// Builds the file dependency graph and its processing order
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder;

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every file against `project_root`
    ///
    /// Files are resolved in parallel; edges are inserted in input order so the
    /// result does not depend on thread timing. Dependencies outside `files`
    /// are dropped. Per-file failures become diagnostics; any other failure
    /// aborts the build.
    pub fn build<P: AsRef<Path>>(&self, files: &[P], project_root: &Path) -> Result<BuildOutput> {
        let root = normalize_path(project_root);
        if !root.is_dir() {
            return Err(GraphError::InvalidRoot(project_root.display().to_string()));
        }

        let mut seen = HashSet::new();
        let sources: Vec<SourceFile> = files
            .iter()
            .map(|file| SourceFile::new(file))
            .filter(|source| seen.insert(source.path().to_path_buf()))
            .collect();

        let mut graph = DependencyGraph::new();
        for source in &sources {
            graph.add_file(source.path());
        }

        let resolvers = Self::resolvers_for(&sources)?;

        let results: Vec<Result<Vec<PathBuf>>> = sources
            .par_iter()
            .map(|source| match resolvers.get(&source.language()) {
                Some(resolver) => resolver.resolve(source, &root),
                None => Err(GraphError::unsupported_language(source.language().as_str())),
            })
            .collect();

        let mut diagnostics = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(dependencies) => {
                    for dependency in dependencies {
                        if !graph.add_dependency(source.path(), &dependency) {
                            log::trace!(
                                "{}: dropping dependency outside the input set: {}",
                                source.path().display(),
                                dependency.display()
                            );
                        }
                    }
                }
                Err(error) if !error.is_per_file() => return Err(error),
                Err(error) => {
                    log::warn!("Failed to resolve {}: {error}", source.path().display());
                    diagnostics.push(BuildDiagnostic {
                        file: source.path().to_path_buf(),
                        error,
                    });
                }
            }
        }

        let order = ProcessingOrder::compute(&graph);

        log::info!(
            "Dependency graph: {} files, {} edges, {} deferred cycle edge(s), {} failure(s)",
            graph.file_count(),
            graph.edge_count(),
            order.deferred_edges().len(),
            diagnostics.len()
        );

        Ok(BuildOutput {
            graph,
            order,
            diagnostics,
        })
    }

    /// One resolver per language present; languages without a strategy are left out
    fn resolvers_for(sources: &[SourceFile]) -> Result<HashMap<Language, LanguageResolver>> {
        let mut resolvers = HashMap::new();
        for source in sources {
            let language = source.language();
            if resolvers.contains_key(&language) {
                continue;
            }
            match LanguageResolver::for_language(language) {
                Ok(resolver) => {
                    resolvers.insert(language, resolver);
                }
                Err(GraphError::UnsupportedLanguage(_)) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(resolvers)
    }
}
