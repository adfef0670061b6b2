//! # Code Chunk
//!
//! AST-aware code chunking for retrieval pipelines.
//!
//! Source files are cut into chunks bounded by a non-whitespace character
//! budget. Boundaries follow the syntax tree, so a function or class is only
//! split when it cannot fit on its own, and every chunk carries the structure
//! around it: enclosing scopes, the entities it defines, neighbouring
//! entities and the imports it uses.
//!
//! ## Architecture
//!
//! ```text
//! Source Code
//!     │
//!     ├──> Language Detection (override, extension, or language name)
//!     │
//!     ├──> Tree-sitter Parsing → syntax tree (+ recoverable error note)
//!     │
//!     ├──> Entity Extraction
//!     │    ├─> Names, signatures, docstrings
//!     │    └─> One entity per imported symbol
//!     │
//!     ├──> Scope Tree (containment forest over entities)
//!     │
//!     ├──> Windowing
//!     │    ├─> Greedy NWS packing over syntax nodes
//!     │    ├─> Descend into / line-split oversized nodes
//!     │    └─> Merge small neighbours, rebuild text
//!     │
//!     └──> Context + Formatting
//!          ├─> Scope chain, entities, siblings, imports
//!          ├─> Header and overlap block
//!          └─> Emit CodeChunk[]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use code_chunk::{chunk, ChunkOptions};
//!
//! let code = r#"
//! fn process_data(input: &str) -> String {
//!     input.trim().to_uppercase()
//! }
//! "#;
//!
//! let options = ChunkOptions::default().with_max_chunk_size(500);
//! let chunks = chunk("src/example.rs", code, Some(&options)).unwrap();
//! for chunk in &chunks {
//!     println!(
//!         "Chunk {} at lines {}-{}",
//!         chunk.index, chunk.line_range.start, chunk.line_range.end
//!     );
//! }
//! assert_eq!(chunks[0].context.entities[0].name, "process_data");
//! ```

mod batch;
mod chunker;
mod config;
mod context;
mod docstring;
mod error;
mod extract;
mod format;
mod grammar;
mod imports;
mod language;
mod parser;
mod scope;
mod signature;
mod types;
mod window;

pub use batch::{
    chunk_batch, chunk_batch_stream, chunk_batch_stream_with_cancel, chunk_batch_with_cancel,
    BatchResult, FileInput,
};
pub use chunker::{chunk, chunk_file, chunk_stream, ChunkStream, Chunker, ChunkingStats};
pub use config::{
    BatchOptions, BatchProgress, ChunkOptions, ContextMode, ProgressCallback, SiblingDetail,
};
pub use docstring::clean_doc_comment;
pub use error::{ChunkerError, Result};
pub use extract::{extract_entities, ANONYMOUS_NAME};
pub use format::{format_chunk_with_context, last_path_segments};
pub use grammar::{cached_grammar_count, clear_grammar_cache};
pub use language::{DocstringStyle, ImportSyntax, Language, LanguageConfig};
pub use scope::{ScopeId, ScopeNode, ScopeTree};
pub use signature::clean_signature;
pub use types::{
    ByteRange, ChunkContext, ChunkEntityInfo, CodeChunk, Entity, EntityInfo, EntityKind,
    ImportInfo, LineRange, ParseError, SiblingInfo, SiblingPosition,
};
pub use window::nws_len;
pub use tokio_util::sync::CancellationToken;
