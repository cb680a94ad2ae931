use crate::cache::SummaryCache;
use crate::error::Result;
use context_graph::{DependencyGraph, ProcessingOrder};
use context_syntax::{normalize_path, Language};
use context_vector_store::{EmbeddingService, SummaryIndex, SummaryMetadata};
use std::path::Path;

/// Embed every cached file summary and upsert it into `index`
///
/// Files are published in processing order and keyed by their path relative
/// to `project_root`. Uncached files are left out. Returns the number of
/// entries written; the first embedding or index error stops publishing.
pub async fn publish_summaries(
    graph: &DependencyGraph,
    order: &ProcessingOrder,
    cache: &SummaryCache,
    project_root: &Path,
    embedder: &dyn EmbeddingService,
    index: &dyn SummaryIndex,
) -> Result<usize> {
    let root = normalize_path(project_root);
    let mut published = 0;

    for path in order {
        let Some(summary) = cache.get(path) else {
            log::debug!("Not publishing {} (no summary)", path.display());
            continue;
        };

        let id = relative_id(path, &root);
        let metadata = SummaryMetadata {
            path: id.clone(),
            language: Language::from_path(path).as_str().to_string(),
            dependencies: graph
                .dependencies(path)
                .into_iter()
                .map(|dependency| relative_id(dependency, &root))
                .collect(),
            summary,
        };

        let vector = embedder.embed(&metadata.summary).await?;
        index.upsert(&id, vector, metadata).await?;
        published += 1;
    }

    log::info!("Published {published} file summaries");
    Ok(published)
}

fn relative_id(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
