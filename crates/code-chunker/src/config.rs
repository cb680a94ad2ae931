use serde::{Deserialize, Serialize};

/// Configuration for token-window chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Window size in tokens
    pub chunk_size: usize,

    /// Tokens shared by adjacent windows (must be < chunk_size)
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 64,
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Create config with larger windows for LLM context
    pub fn for_llm_context() -> Self {
        Self {
            chunk_size: 2048,
            chunk_overlap: 128,
        }
    }

    /// Distance in tokens between the starts of adjacent windows
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stride(), 448);
    }

    #[test]
    fn test_preset_configs_valid() {
        assert!(ChunkerConfig::for_llm_context().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        // Invalid: overlap == size
        assert!(ChunkerConfig::new(10, 10).validate().is_err());

        // Invalid: overlap > size
        assert!(ChunkerConfig::new(10, 11).validate().is_err());

        // Invalid: size = 0
        assert!(ChunkerConfig::new(0, 0).validate().is_err());

        // Valid configuration
        assert!(ChunkerConfig::new(10, 9).validate().is_ok());
        assert!(ChunkerConfig::new(1, 0).validate().is_ok());
    }
}
