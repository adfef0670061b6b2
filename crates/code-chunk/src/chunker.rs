use crate::config::ChunkOptions;
use crate::context::{build_context, FileContext};
use crate::error::{ChunkerError, Result};
use crate::extract::extract_from_tree;
use crate::format::{format_chunk_with_context, trailing_lines};
use crate::language::Language;
use crate::parser::parse;
use crate::scope::ScopeTree;
use crate::types::{CodeChunk, ParseError};
use crate::window::{merge, nws_len, pack, rebuild, NwsIndex, Rebuilt};
use std::path::Path;

/// Reusable chunker holding default options
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    options: ChunkOptions,
}

impl Chunker {
    /// Create a chunker, rejecting invalid options up front
    pub fn new(options: ChunkOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ChunkOptions {
        &self.options
    }

    /// Chunk `code`; `filepath` selects the language unless the options override it
    pub fn chunk(&self, filepath: &str, code: &str) -> Result<Vec<CodeChunk>> {
        let mut chunks: Vec<CodeChunk> = self.chunk_stream(filepath, code)?.collect();
        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.total_chunks = Some(total);
        }
        Ok(chunks)
    }

    /// Chunk lazily. Parsing and packing happen here, so errors surface
    /// before the first item; context and formatting happen per item.
    pub fn chunk_stream(&self, filepath: &str, code: &str) -> Result<ChunkStream> {
        let language = resolve_language(filepath, self.options.language)?;
        let parsed = parse(code, language)?;
        let root = parsed.tree.root_node();

        let entities = extract_from_tree(root, language, code);
        let tree = ScopeTree::build(entities);

        let budget = self.options.max_chunk_size;
        let index = NwsIndex::new(code);
        let mut cursor = root.walk();
        let top_level: Vec<_> = root.children(&mut cursor).collect();
        let windows = merge(pack(top_level, &index, budget), budget);

        let pieces: Vec<Rebuilt> = windows
            .iter()
            .map(|window| rebuild(window, code, &index))
            .filter(|piece| !piece.text.is_empty())
            .collect();

        log::debug!(
            "Chunking {filepath} as {language}: {} entities, {} windows, {} chunks",
            tree.entities().len(),
            windows.len(),
            pieces.len()
        );

        Ok(ChunkStream {
            pieces: pieces.into_iter(),
            tree,
            options: self.options.clone(),
            filepath: (!filepath.is_empty()).then(|| filepath.to_string()),
            language,
            parse_error: parsed.error,
            next_index: 0,
            overlap: None,
        })
    }

    /// Read and chunk a file from disk
    pub fn chunk_file(&self, path: impl AsRef<Path>) -> Result<Vec<CodeChunk>> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path)?;
        self.chunk(&path.to_string_lossy(), &code)
    }
}

/// Language from the override, else from the path's extension, else from the
/// path read as a language name (`"go"`)
fn resolve_language(filepath: &str, language: Option<Language>) -> Result<Language> {
    if let Some(language) = language {
        return Ok(language);
    }
    Language::from_path(filepath)
        .or_else(|| filepath.parse().ok())
        .ok_or_else(|| ChunkerError::unsupported_language(filepath))
}

/// Lazily contextualized chunks of one file.
///
/// `total_chunks` is `None` on every item.
#[derive(Debug)]
pub struct ChunkStream {
    pieces: std::vec::IntoIter<Rebuilt>,
    tree: ScopeTree,
    options: ChunkOptions,
    filepath: Option<String>,
    language: Language,
    parse_error: Option<ParseError>,
    next_index: usize,
    /// Trailing lines of the previous chunk
    overlap: Option<String>,
}

impl ChunkStream {
    /// Entities and scopes of the file being streamed
    pub fn scope_tree(&self) -> &ScopeTree {
        &self.tree
    }
}

impl Iterator for ChunkStream {
    type Item = CodeChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let piece = self.pieces.next()?;

        let file = FileContext {
            filepath: self.filepath.as_deref(),
            language: self.language,
            parse_error: self.parse_error.as_ref(),
        };
        let context = build_context(piece.byte_range, &self.tree, file, &self.options);
        let contextualized_text =
            format_chunk_with_context(&piece.text, &context, self.overlap.as_deref());

        if self.options.overlap_lines > 0 {
            self.overlap = Some(trailing_lines(&piece.text, self.options.overlap_lines));
        }

        let index = self.next_index;
        self.next_index += 1;

        Some(CodeChunk {
            text: piece.text,
            contextualized_text,
            byte_range: piece.byte_range,
            line_range: piece.line_range,
            context,
            index,
            total_chunks: None,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pieces.size_hint()
    }
}

impl ExactSizeIterator for ChunkStream {}

/// Chunk `code` with `options` (defaults when `None`)
pub fn chunk(filepath: &str, code: &str, options: Option<&ChunkOptions>) -> Result<Vec<CodeChunk>> {
    Chunker::new(options.cloned().unwrap_or_default())?.chunk(filepath, code)
}

/// Streaming variant of [`chunk`]
pub fn chunk_stream(filepath: &str, code: &str, options: Option<&ChunkOptions>) -> Result<ChunkStream> {
    Chunker::new(options.cloned().unwrap_or_default())?.chunk_stream(filepath, code)
}

/// Read `path` from disk and chunk it
pub fn chunk_file(path: impl AsRef<Path>, options: Option<&ChunkOptions>) -> Result<Vec<CodeChunk>> {
    Chunker::new(options.cloned().unwrap_or_default())?.chunk_file(path)
}

/// Statistics about chunking results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_lines: usize,
    /// Non-whitespace characters across all chunks
    pub total_size: usize,
    pub avg_size: usize,
    pub min_size: usize,
    pub max_size: usize,
}

impl ChunkingStats {
    pub fn from_chunks(chunks: &[CodeChunk]) -> Self {
        let sizes: Vec<usize> = chunks.iter().map(|c| nws_len(&c.text)).collect();
        let total_size: usize = sizes.iter().sum();
        Self {
            total_chunks: chunks.len(),
            total_lines: chunks.iter().map(CodeChunk::line_count).sum(),
            total_size,
            avg_size: total_size.checked_div(chunks.len()).unwrap_or(0),
            min_size: sizes.iter().copied().min().unwrap_or(0),
            max_size: sizes.iter().copied().max().unwrap_or(0),
        }
    }
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Lines: {} | Size: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_lines,
            self.total_size,
            self.avg_size,
            self.min_size,
            self.max_size
        )
    }
}
