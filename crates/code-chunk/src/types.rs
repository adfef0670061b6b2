use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Kind of a syntactic construct extracted from source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Method,
    Class,
    Interface,
    Type,
    Enum,
    Import,
    Export,
}

impl EntityKind {
    /// Map an exact grammar node kind to an entity kind
    #[must_use]
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        let entity = match kind {
            "function_declaration"
            | "function_definition"
            | "function_item"
            | "generator_function_declaration"
            | "arrow_function" => Self::Function,
            "method_definition" | "method_declaration" | "constructor_declaration" => {
                Self::Method
            }
            "class_declaration"
            | "class_definition"
            | "abstract_class_declaration"
            | "impl_item" => Self::Class,
            "interface_declaration" | "trait_item" => Self::Interface,
            "type_alias_declaration" | "type_item" | "type_declaration" | "struct_item" => {
                Self::Type
            }
            "enum_declaration" | "enum_item" => Self::Enum,
            "import_statement"
            | "import_declaration"
            | "import_from_statement"
            | "use_declaration" => Self::Import,
            "export_statement" => Self::Export,
            _ => return None,
        };
        Some(entity)
    }

    /// Guess an entity kind from the spelling of a node kind.
    ///
    /// Used only for node kinds a language lists as entities but the exact
    /// table does not know about.
    #[must_use]
    pub fn infer_from_node_kind(kind: &str) -> Option<Self> {
        let kind = kind.to_lowercase();
        let has = |needle: &str| kind.contains(needle);

        if has("function") || has("arrow") {
            Some(Self::Function)
        } else if has("method") {
            Some(Self::Method)
        } else if has("class") {
            Some(Self::Class)
        } else if has("interface") || has("trait") {
            Some(Self::Interface)
        } else if has("type") || has("struct") {
            Some(Self::Type)
        } else if has("enum") {
            Some(Self::Enum)
        } else if has("import") || has("use") {
            Some(Self::Import)
        } else if has("export") {
            Some(Self::Export)
        } else {
            None
        }
    }

    /// Entities of these kinds become the parent of anything nested inside them
    #[must_use]
    pub const fn opens_scope(self) -> bool {
        matches!(
            self,
            Self::Function | Self::Method | Self::Class | Self::Interface
        )
    }

    /// Imports and exports are bucketed separately from the scope tree
    #[must_use]
    pub const fn is_import_or_export(self) -> bool {
        matches!(self, Self::Import | Self::Export)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Import => "import",
            Self::Export => "export",
        }
    }
}

/// Byte range `[start, end)` in the original source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// `self` fully contains `inner` (shared boundaries count)
    #[must_use]
    pub const fn contains_range(&self, inner: &Self) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// Half-open membership test for a single offset
    #[must_use]
    pub const fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Open-interval overlap: touching ranges do not overlap
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Inclusive, 0-indexed line range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One syntactic construct of interest (function, class, import symbol, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub name: String,
    /// One-line signature with whitespace collapsed
    pub signature: String,
    pub docstring: Option<String>,
    pub byte_range: ByteRange,
    pub line_range: LineRange,
    /// Name of the nearest enclosing function, method, class or interface
    pub parent: Option<String>,
    /// Module path an import symbol comes from
    pub source: Option<String>,
}

/// Non-fatal note attached to chunks of a file whose tree contains error nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub recoverable: bool,
}

impl ParseError {
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: true,
        }
    }
}

/// Entity summary used in scope chains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub name: String,
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

/// Entity overlapping a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEntityInfo {
    pub name: String,
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub line_range: LineRange,
    /// The entity extends beyond the chunk on at least one side
    #[serde(default)]
    pub is_partial: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    Before,
    After,
}

/// Nearby entity outside the chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingInfo {
    pub name: String,
    pub kind: EntityKind,
    pub position: SiblingPosition,
    /// 1-based distance, 1 being the nearest entity on that side
    pub distance: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Imported symbol relevant to a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    pub name: String,
    #[serde(default)]
    pub source: String,
}

/// Structural context attached to a chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    /// Enclosing scopes, innermost first
    pub scope: Vec<EntityInfo>,
    pub entities: Vec<ChunkEntityInfo>,
    pub siblings: Vec<SiblingInfo>,
    pub imports: Vec<ImportInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<ParseError>,
}

/// A size-bounded piece of a source file with its structural context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    /// Raw source text of the chunk
    pub text: String,
    /// Text with the context header (and overlap block) prepended
    pub contextualized_text: String,
    pub byte_range: ByteRange,
    pub line_range: LineRange,
    pub context: ChunkContext,
    /// 0-based position within the file
    pub index: usize,
    /// Number of chunks in the file; `None` when streaming
    pub total_chunks: Option<usize>,
}

impl CodeChunk {
    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_range.end.saturating_sub(self.line_range.start) + 1
    }

    /// Check if chunk contains a specific (0-indexed) line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.line_range.start && line <= self.line_range.end
    }
}
