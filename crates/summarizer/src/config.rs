use crate::error::{Result, SummaryError};
use crate::prompt::PromptTemplates;
use context_code_chunker::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_CHUNK_SIZE: &str = "CONTEXT_DIGEST_CHUNK_SIZE";
pub const ENV_CHUNK_OVERLAP: &str = "CONTEXT_DIGEST_CHUNK_OVERLAP";
pub const ENV_MAX_IN_FLIGHT: &str = "CONTEXT_DIGEST_MAX_IN_FLIGHT";
pub const ENV_COMPLETION_TIMEOUT_MS: &str = "CONTEXT_DIGEST_COMPLETION_TIMEOUT_MS";

const MAX_IN_FLIGHT_LIMIT: usize = 64;

/// Summarization settings
///
/// ```toml
/// chunk_size = 1024
/// chunk_overlap = 128
/// max_in_flight = 4
/// completion_timeout_ms = 120000
///
/// [prompts]
/// chunk = "Summarize {path}:\n{chunk}\nDependencies:\n{context}"
/// combine = "Combine the parts of {path}:\n{summaries}"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Window size in tokens
    pub chunk_size: usize,

    /// Tokens shared by adjacent windows
    pub chunk_overlap: usize,

    /// Files summarized at once by `run_concurrent`
    pub max_in_flight: usize,

    /// Upper bound for a single completion call
    pub completion_timeout_ms: u64,

    pub prompts: PromptTemplates,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        let chunker = ChunkerConfig::for_llm_context();
        Self {
            chunk_size: chunker.chunk_size,
            chunk_overlap: chunker.chunk_overlap,
            max_in_flight: 4,
            completion_timeout_ms: 120_000,
            prompts: PromptTemplates::default(),
        }
    }
}

impl SummarizerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|err| SummaryError::invalid_config(format!("Invalid summarizer TOML: {err}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|err| {
            SummaryError::invalid_config(format!("Invalid summarizer TOML in {}: {err}", path.display()))
        })
    }

    /// Apply `CONTEXT_DIGEST_*` environment overrides
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; unparsable values keep the current setting
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.chunk_size = parse_override(lookup(ENV_CHUNK_SIZE).as_deref(), self.chunk_size);
        self.chunk_overlap =
            parse_override(lookup(ENV_CHUNK_OVERLAP).as_deref(), self.chunk_overlap);
        self.max_in_flight = parse_override(lookup(ENV_MAX_IN_FLIGHT).as_deref(), self.max_in_flight)
            .clamp(1, MAX_IN_FLIGHT_LIMIT);
        self.completion_timeout_ms = parse_override(
            lookup(ENV_COMPLETION_TIMEOUT_MS).as_deref(),
            self.completion_timeout_ms,
        );
        self
    }

    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::new(self.chunk_size, self.chunk_overlap)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.chunker_config()
            .validate()
            .map_err(SummaryError::invalid_config)?;
        if self.max_in_flight == 0 {
            return Err(SummaryError::invalid_config("max_in_flight must be > 0"));
        }
        if self.completion_timeout_ms == 0 {
            return Err(SummaryError::invalid_config(
                "completion_timeout_ms must be > 0",
            ));
        }
        self.prompts.validate().map_err(SummaryError::invalid_config)
    }
}

fn parse_override<T: std::str::FromStr + Copy>(raw: Option<&str>, current: T) -> T {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(current)
}
