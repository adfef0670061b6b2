use crate::error::{ChunkerError, Result};
use crate::grammar;
use crate::language::Language;
use crate::types::ParseError;
use tree_sitter::{Parser, Tree};

/// A parsed source file
pub(crate) struct ParsedSource {
    pub tree: Tree,
    /// Set when the tree contains error or missing nodes
    pub error: Option<ParseError>,
}

/// Parse `source` with the grammar for `language`.
///
/// Trees containing error nodes are returned normally with a recoverable
/// note; only a parser that cannot run at all is an error.
pub(crate) fn parse(source: &str, language: Language) -> Result<ParsedSource> {
    let grammar = grammar::grammar_for(language);
    let mut parser = Parser::new();
    parser.set_language(&grammar).map_err(|e| {
        ChunkerError::parse_failed(format!("failed to set {language} grammar: {e}"))
    })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ChunkerError::parse_failed("parser returned no tree"))?;

    let error = if tree.root_node().has_error() {
        log::warn!("{language} source contains syntax errors, chunking the recovered tree");
        Some(ParseError::recoverable("parse error in source code"))
    } else {
        None
    };

    Ok(ParsedSource { tree, error })
}
