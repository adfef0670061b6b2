use crate::error::{ChunkerError, Result};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const DEFAULT_BATCH_CONCURRENCY: usize = 10;
const MAX_BATCH_CONCURRENCY: usize = 64;

/// How much structural context is attached to each chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Every context collection is left empty
    None,
    /// Scope chain and entities in the chunk only
    Minimal,
    #[default]
    Full,
}

/// Detail recorded for neighbouring entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingDetail {
    /// No siblings are collected
    None,
    Names,
    #[default]
    Signatures,
}

/// Options for chunking a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOptions {
    /// Budget per chunk in non-whitespace characters
    pub max_chunk_size: usize,

    pub context_mode: ContextMode,

    pub sibling_detail: SiblingDetail,

    /// Keep only imports referenced by the chunk's entities
    pub filter_imports: bool,

    /// Overrides detection from the file path
    pub language: Option<Language>,

    /// Trailing lines of the previous chunk repeated before each chunk (0 disables)
    pub overlap_lines: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1500,
            context_mode: ContextMode::Full,
            sibling_detail: SiblingDetail::Signatures,
            filter_imports: false,
            language: None,
            overlap_lines: 10,
        }
    }
}

impl ChunkOptions {
    /// Smaller, focused chunks for embedding models
    pub fn for_embeddings() -> Self {
        Self {
            max_chunk_size: 1000,
            filter_imports: true,
            overlap_lines: 5,
            ..Default::default()
        }
    }

    /// Larger chunks with generous overlap for prompt assembly
    pub fn for_llm_context() -> Self {
        Self {
            max_chunk_size: 4000,
            overlap_lines: 20,
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(ChunkerError::invalid_config("max_chunk_size must be > 0"));
        }
        Ok(())
    }
}

/// Progress report emitted once per finished file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub filepath: String,
    pub success: bool,
}

pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

/// Options for chunking many files concurrently
#[derive(Clone)]
pub struct BatchOptions {
    /// Defaults for files that carry no options of their own
    pub chunk: ChunkOptions,

    /// Number of files processed at once
    pub concurrency: usize,

    pub on_progress: Option<ProgressCallback>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk: ChunkOptions::default(),
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            on_progress: None,
        }
    }
}

impl fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("chunk", &self.chunk)
            .field("concurrency", &self.concurrency)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl BatchOptions {
    /// Defaults with concurrency taken from `CODE_CHUNK_CONCURRENCY`
    pub fn from_env() -> Self {
        let raw = std::env::var("CODE_CHUNK_CONCURRENCY").ok();
        Self {
            concurrency: parse_concurrency(raw.as_deref(), DEFAULT_BATCH_CONCURRENCY),
            ..Self::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress(mut self, callback: impl Fn(BatchProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ChunkerError::invalid_config("concurrency must be > 0"));
        }
        self.chunk.validate()
    }
}

fn parse_concurrency(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_BATCH_CONCURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options_valid() {
        let options = ChunkOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.max_chunk_size, 1500);
        assert_eq!(options.overlap_lines, 10);
        assert_eq!(options.context_mode, ContextMode::Full);
    }

    #[test]
    fn test_presets_valid() {
        assert!(ChunkOptions::for_embeddings().validate().is_ok());
        assert!(ChunkOptions::for_llm_context().validate().is_ok());
        assert!(BatchOptions::default().validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let options = ChunkOptions::default().with_max_chunk_size(0);
        assert!(matches!(options.validate(), Err(ChunkerError::InvalidConfig(_))));

        let batch = BatchOptions::default().with_concurrency(0);
        assert!(batch.validate().is_err());
    }

    #[test]
    fn test_partial_options_deserialize_with_defaults() {
        let options: ChunkOptions =
            serde_json::from_str(r#"{"max_chunk_size": 200, "context_mode": "minimal", "language": "go"}"#).unwrap();
        assert_eq!(options.max_chunk_size, 200);
        assert_eq!(options.context_mode, ContextMode::Minimal);
        assert_eq!(options.language, Some(Language::Go));
        assert_eq!(options.sibling_detail, SiblingDetail::Signatures);
        assert_eq!(options.overlap_lines, 10);
    }

    #[test]
    fn test_parse_concurrency() {
        assert_eq!(parse_concurrency(None, 10), 10);
        assert_eq!(parse_concurrency(Some(""), 10), 10);
        assert_eq!(parse_concurrency(Some(" 4 "), 10), 4);
        assert_eq!(parse_concurrency(Some("zero"), 10), 10);
        assert_eq!(parse_concurrency(Some("0"), 10), 1);
        assert_eq!(parse_concurrency(Some("1000"), 10), MAX_BATCH_CONCURRENCY);
    }

    #[test]
    fn test_batch_debug_hides_callback() {
        let options = BatchOptions::default().with_progress(|_| {});
        let debug = format!("{options:?}");
        assert!(debug.contains("on_progress: true"));
    }
}
