use crate::language::{DocstringStyle, Language};
use crate::signature::{find_body, node_text};
use tree_sitter::Node;

/// Node kinds that may carry a leading documentation comment
const COMMENT_NODE_KINDS: &[&str] = &[
    "comment",
    "line_comment",
    "block_comment",
    "documentation_comment",
    "string",
    "string_literal",
    "expression_statement",
];

/// Comment openers stripped from each line, longest first
const COMMENT_OPENERS: &[&str] = &["/**", "/*!", "///", "//!", "//", "/*"];

/// Extract the documentation attached to an entity node
pub(crate) fn extract_docstring(node: Node<'_>, language: Language, source: &str) -> Option<String> {
    match language.config().docstring_style {
        DocstringStyle::BodyString => body_docstring(node, source),
        DocstringStyle::LeadingComment => leading_comment(node, language, source),
    }
}

/// First statement of the body, when it is a bare string literal
fn body_docstring(node: Node<'_>, source: &str) -> Option<String> {
    let body = find_body(node)?;
    let first = body.child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let literal = first.child(0)?;
    if literal.kind() != "string" {
        return None;
    }

    let doc = strip_string_delimiters(node_text(literal, source)).trim();
    (!doc.is_empty()).then(|| doc.to_string())
}

fn strip_string_delimiters(text: &str) -> &str {
    let text = text
        .strip_prefix("\"\"\"")
        .or_else(|| text.strip_prefix("'''"))
        .unwrap_or(text);
    text.strip_suffix("\"\"\"")
        .or_else(|| text.strip_suffix("'''"))
        .unwrap_or(text)
}

/// Comment node immediately preceding the entity
fn leading_comment(node: Node<'_>, language: Language, source: &str) -> Option<String> {
    let prev = node.prev_sibling()?;
    if !COMMENT_NODE_KINDS.contains(&prev.kind()) {
        return None;
    }

    let config = language.config();
    if !config.is_doc_comment(node_text(prev, source)) {
        return None;
    }

    // `///` and `//` docs come as one node per line
    let mut first = prev;
    while is_line_comment(first, source) {
        let Some(earlier) = first.prev_sibling() else {
            break;
        };
        if !is_line_comment(earlier, source)
            || !config.is_doc_comment(node_text(earlier, source))
            || !on_adjacent_lines(earlier, first, source)
        {
            break;
        }
        first = earlier;
    }

    let text = source.get(first.start_byte()..prev.end_byte()).unwrap_or("");
    let doc = clean_doc_comment(text);
    (!doc.is_empty()).then_some(doc)
}

fn is_line_comment(node: Node<'_>, source: &str) -> bool {
    matches!(node.kind(), "comment" | "line_comment")
        && node_text(node, source).trim_start().starts_with("//")
}

/// Only whitespace and a single line break separate the two nodes
fn on_adjacent_lines(earlier: Node<'_>, later: Node<'_>, source: &str) -> bool {
    let gap = source.get(earlier.end_byte()..later.start_byte()).unwrap_or("");
    let breaks = gap.matches('\n').count() + usize::from(node_text(earlier, source).ends_with('\n'));
    gap.trim().is_empty() && breaks <= 1
}

/// Strip comment markers line by line and join the remaining text
pub fn clean_doc_comment(text: &str) -> String {
    text.trim()
        .lines()
        .map(clean_comment_line)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn clean_comment_line(line: &str) -> &str {
    let mut line = line.trim();
    if let Some(opener) = COMMENT_OPENERS.iter().find(|o| line.starts_with(**o)) {
        line = &line[opener.len()..];
    }
    line = line.trim_end();
    line = line.strip_suffix("*/").unwrap_or(line).trim();
    line.strip_prefix('*').unwrap_or(line).trim()
}
