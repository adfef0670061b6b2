use crate::error::ChunkerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
}

impl Language {
    pub const ALL: [Self; 6] = [
        Self::TypeScript,
        Self::JavaScript,
        Self::Python,
        Self::Rust,
        Self::Go,
        Self::Java,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "py" | "pyi" => Self::Python,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "java" => Self::Java,
            _ => return None,
        };
        Some(lang)
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get language name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
        }
    }

    /// Static lookup tables for this language
    pub const fn config(self) -> &'static LanguageConfig {
        match self {
            Self::TypeScript => &TYPESCRIPT,
            Self::JavaScript => &JAVASCRIPT,
            Self::Python => &PYTHON,
            Self::Rust => &RUST,
            Self::Go => &GO,
            Self::Java => &JAVA,
        }
    }

    /// Load the tree-sitter grammar. Callers go through the grammar cache.
    pub(crate) fn load_grammar(self) -> tree_sitter::Language {
        match self {
            // The TSX grammar accepts plain TypeScript as well as JSX syntax.
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ChunkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == normalized)
            .ok_or_else(|| ChunkerError::unsupported_language(s))
    }
}

/// Where a language keeps its documentation text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocstringStyle {
    /// Comment node immediately preceding the declaration
    LeadingComment,
    /// String literal as the first statement of the body
    BodyString,
}

/// Shape of import statements, selects the symbol expansion routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSyntax {
    EcmaScript,
    Python,
    Rust,
    Go,
    Java,
}

/// Per-language lookup data driving extraction
#[derive(Debug)]
pub struct LanguageConfig {
    /// Node kinds that produce entities
    pub entity_node_kinds: &'static [&'static str],
    /// Comment prefixes that mark documentation
    pub doc_comment_prefixes: &'static [&'static str],
    /// Character that opens a declaration body
    pub body_delimiter: u8,
    pub docstring_style: DocstringStyle,
    pub import_syntax: ImportSyntax,
}

impl LanguageConfig {
    pub fn is_entity_node_kind(&self, kind: &str) -> bool {
        self.entity_node_kinds.contains(&kind)
    }

    /// Bodies are introduced by `:` and indentation rather than braces
    pub const fn is_indentation_based(&self) -> bool {
        self.body_delimiter == b':'
    }

    pub fn is_doc_comment(&self, text: &str) -> bool {
        let text = text.trim();
        self.doc_comment_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix))
    }
}

const TYPESCRIPT: LanguageConfig = LanguageConfig {
    entity_node_kinds: &[
        "function_declaration",
        "method_definition",
        "class_declaration",
        "abstract_class_declaration",
        "interface_declaration",
        "type_alias_declaration",
        "enum_declaration",
        "import_statement",
        "export_statement",
    ],
    doc_comment_prefixes: &["/**", "///"],
    body_delimiter: b'{',
    docstring_style: DocstringStyle::LeadingComment,
    import_syntax: ImportSyntax::EcmaScript,
};

const JAVASCRIPT: LanguageConfig = LanguageConfig {
    entity_node_kinds: &[
        "function_declaration",
        "generator_function_declaration",
        "method_definition",
        "class_declaration",
        "import_statement",
        "export_statement",
    ],
    doc_comment_prefixes: &["/**", "///"],
    body_delimiter: b'{',
    docstring_style: DocstringStyle::LeadingComment,
    import_syntax: ImportSyntax::EcmaScript,
};

const PYTHON: LanguageConfig = LanguageConfig {
    entity_node_kinds: &[
        "function_definition",
        "class_definition",
        "import_statement",
        "import_from_statement",
    ],
    doc_comment_prefixes: &["\"\"\"", "'''"],
    body_delimiter: b':',
    docstring_style: DocstringStyle::BodyString,
    import_syntax: ImportSyntax::Python,
};

const RUST: LanguageConfig = LanguageConfig {
    entity_node_kinds: &[
        "function_item",
        "impl_item",
        "struct_item",
        "enum_item",
        "trait_item",
        "type_item",
        "use_declaration",
    ],
    doc_comment_prefixes: &["///", "//!", "/**", "/*!"],
    body_delimiter: b'{',
    docstring_style: DocstringStyle::LeadingComment,
    import_syntax: ImportSyntax::Rust,
};

const GO: LanguageConfig = LanguageConfig {
    entity_node_kinds: &[
        "function_declaration",
        "method_declaration",
        "type_declaration",
        "import_declaration",
    ],
    doc_comment_prefixes: &["//", "/*"],
    body_delimiter: b'{',
    docstring_style: DocstringStyle::LeadingComment,
    import_syntax: ImportSyntax::Go,
};

const JAVA: LanguageConfig = LanguageConfig {
    entity_node_kinds: &[
        "method_declaration",
        "constructor_declaration",
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "import_declaration",
    ],
    doc_comment_prefixes: &["/**", "///"],
    body_delimiter: b'{',
    docstring_style: DocstringStyle::LeadingComment,
    import_syntax: ImportSyntax::Java,
};
