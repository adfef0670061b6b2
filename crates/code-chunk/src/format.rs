use crate::types::{ChunkContext, EntityKind, SiblingPosition};

/// Import names listed in a chunk header
const MAX_HEADER_IMPORTS: usize = 10;

/// Path segments shown in a chunk header
const HEADER_PATH_SEGMENTS: usize = 3;

const OVERLAP_START: &str = "# ...";
const OVERLAP_END: &str = "# ---";

/// Last `n` `/`-separated segments of `path`
pub fn last_path_segments(path: &str, n: usize) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments[segments.len().saturating_sub(n)..].join("/")
}

/// Prepend the context header and the optional overlap block to `text`.
///
/// Returns `text` unchanged when neither has any content.
pub fn format_chunk_with_context(text: &str, context: &ChunkContext, overlap: Option<&str>) -> String {
    let mut lines = header_lines(context);
    if !lines.is_empty() {
        lines.push(String::new());
    }

    let overlap = overlap.filter(|o| !o.is_empty());
    if lines.is_empty() && overlap.is_none() {
        return text.to_string();
    }

    if let Some(overlap) = overlap {
        lines.push(OVERLAP_START.to_string());
        lines.push(overlap.to_string());
        lines.push(OVERLAP_END.to_string());
    }
    lines.push(text.to_string());
    lines.join("\n")
}

fn header_lines(context: &ChunkContext) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(path) = context.filepath.as_deref() {
        let shown = last_path_segments(path, HEADER_PATH_SEGMENTS);
        if !shown.is_empty() {
            lines.push(format!("# {shown}"));
        }
    }

    if !context.scope.is_empty() {
        let chain: Vec<&str> = context.scope.iter().rev().map(|s| s.name.as_str()).collect();
        lines.push(format!("# Scope: {}", chain.join(" > ")));
    }

    let defines: Vec<&str> = context
        .entities
        .iter()
        .filter(|e| e.kind != EntityKind::Import && !e.signature.is_empty())
        .map(|e| e.signature.as_str())
        .collect();
    if !defines.is_empty() {
        lines.push(format!("# Defines: {}", defines.join(", ")));
    }

    if !context.imports.is_empty() {
        let uses: Vec<&str> = context
            .imports
            .iter()
            .take(MAX_HEADER_IMPORTS)
            .map(|i| i.name.as_str())
            .collect();
        lines.push(format!("# Uses: {}", uses.join(", ")));
    }

    let sibling_names = |position: SiblingPosition| {
        context
            .siblings
            .iter()
            .filter(|s| s.position == position)
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
    };

    // The chunk comes after the entities that precede it, and before the rest
    let preceding = sibling_names(SiblingPosition::Before);
    if !preceding.is_empty() {
        lines.push(format!("# After: {}", preceding.join(", ")));
    }
    let following = sibling_names(SiblingPosition::After);
    if !following.is_empty() {
        lines.push(format!("# Before: {}", following.join(", ")));
    }

    lines
}

/// Trailing `n` lines of `text`
pub(crate) fn trailing_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
