use crate::error::Result;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File path -> combined file summary
///
/// Shared between concurrent summarization tasks. Entries are written once and
/// never replaced, so a summary read as context never changes afterwards.
#[derive(Debug, Default)]
pub struct SummaryCache {
    entries: DashMap<PathBuf, String>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a summary; returns `false` (keeping the old value) if one exists
    pub fn insert(&self, path: impl Into<PathBuf>, summary: impl Into<String>) -> bool {
        match self.entries.entry(path.into()) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                log::debug!("Summary for {} already cached", existing.key().display());
                false
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(summary.into());
                true
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted copy of all entries
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Persist as JSON (temp file + rename) so a later run can resume
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_vec_pretty(&self.snapshot())?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data).await?;
        if let Err(err) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        log::info!("Saved {} summaries to {}", self.len(), path.display());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let entries: BTreeMap<PathBuf, String> = serde_json::from_slice(&data)?;

        let cache = Self::new();
        for (file, summary) in entries {
            cache.insert(file, summary);
        }
        log::info!("Loaded {} summaries from {}", cache.len(), path.display());
        Ok(cache)
    }

    /// Load if the file exists, otherwise start empty
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            Ok(Self::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn entries_are_written_once() {
        let cache = SummaryCache::new();
        assert!(cache.insert("/p/a.py", "first"));
        assert!(!cache.insert("/p/a.py", "second"));
        assert_eq!(cache.get(Path::new("/p/a.py")).as_deref(), Some("first"));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(Path::new("/p/b.py")));
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("summaries.json");

        let cache = SummaryCache::new();
        cache.insert("/p/a.py", "A");
        cache.insert("/p/b.py", "B");
        cache.save(&path).await.unwrap();

        let loaded = SummaryCache::load(&path).await.unwrap();
        assert_eq!(loaded.snapshot(), cache.snapshot());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let temp = TempDir::new().unwrap();
        let cache = SummaryCache::load_or_default(temp.path().join("none.json"))
            .await
            .unwrap();
        assert!(cache.is_empty());
    }
}
