use serde::{Deserialize, Serialize};

/// Metadata stored next to a file summary vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Path relative to the project root
    pub path: String,
    pub language: String,
    /// Direct dependencies, relative to the project root
    pub dependencies: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSummary {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: SummaryMetadata,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub metadata: SummaryMetadata,
}
