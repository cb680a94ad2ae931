use crate::embeddings::cosine_similarity;
use crate::error::{Result, VectorStoreError};
use crate::types::{SearchResult, StoredSummary, SummaryMetadata};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Similarity index holding one vector per summarized file
#[async_trait]
pub trait SummaryIndex: Send + Sync {
    /// Insert or replace the entry for `id`
    async fn upsert(&self, id: &str, vector: Vec<f32>, metadata: SummaryMetadata) -> Result<()>;

    /// Entries most similar to `vector`, best first
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchResult>>;
}

/// In-process [`SummaryIndex`] with exact cosine search
pub struct InMemoryIndex {
    dimension: usize,
    entries: RwLock<BTreeMap<String, StoredSummary>>,
}

impl InMemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn get(&self, id: &str) -> Option<StoredSummary> {
        self.entries.read().await.get(id).cloned()
    }

    pub async fn ids(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Write all entries as JSON (temp file + rename)
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Saving summary index to {}", path.display());
        let entries: Vec<StoredSummary> = self.entries.read().await.values().cloned().collect();
        let data = serde_json::to_vec_pretty(&entries)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data).await?;
        if let Err(err) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let entries: Vec<StoredSummary> = serde_json::from_slice(&data)?;

        let index = Self::new(dimension);
        {
            let mut map = index.entries.write().await;
            for entry in entries {
                index.check_dimension(&entry.vector)?;
                map.insert(entry.id.clone(), entry);
            }
        }
        log::info!("Loaded {} summaries from {}", index.len().await, path.display());
        Ok(index)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SummaryIndex for InMemoryIndex {
    async fn upsert(&self, id: &str, vector: Vec<f32>, metadata: SummaryMetadata) -> Result<()> {
        self.check_dimension(&vector)?;
        let entry = StoredSummary {
            id: id.to_string(),
            vector,
            metadata,
        };
        self.entries.write().await.insert(id.to_string(), entry);
        log::debug!("Upserted summary vector for {id}");
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(vector)?;
        let entries = self.entries.read().await;

        let mut results: Vec<SearchResult> = entries
            .values()
            .map(|entry| SearchResult {
                id: entry.id.clone(),
                score: cosine_similarity(vector, &entry.vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // ties keep id order (BTreeMap iteration + stable sort)
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{EmbeddingService, StubEmbedder};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn metadata(path: &str, summary: &str) -> SummaryMetadata {
        SummaryMetadata {
            path: path.to_string(),
            language: "python".to_string(),
            dependencies: Vec::new(),
            summary: summary.to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_and_search_ranks() {
        let embedder = StubEmbedder::new(32).unwrap();
        let index = InMemoryIndex::new(32);

        let a = embedder.embed("loads settings").await.unwrap();
        let b = embedder.embed("draws charts").await.unwrap();
        index.upsert("a.py", a.clone(), metadata("a.py", "old")).await.unwrap();
        index.upsert("a.py", a.clone(), metadata("a.py", "loads settings")).await.unwrap();
        index.upsert("b.py", b, metadata("b.py", "draws charts")).await.unwrap();

        assert_eq!(index.len().await, 2);
        let results = index.search(&a, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a.py");
        assert_eq!(results[0].metadata.summary, "loads settings");
        assert!((results[0].score - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected() {
        let index = InMemoryIndex::new(4);
        let err = index
            .upsert("x", vec![1.0; 3], metadata("x", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::InvalidDimension {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index").join("summaries.json");

        let index = InMemoryIndex::new(2);
        index.upsert("a.py", vec![1.0, 0.0], metadata("a.py", "a")).await.unwrap();
        index.save(&path).await.unwrap();

        let loaded = InMemoryIndex::load(&path, 2).await.unwrap();
        assert_eq!(loaded.ids().await, vec!["a.py".to_string()]);
        assert!(InMemoryIndex::load(&path, 3).await.is_err());
    }
}
