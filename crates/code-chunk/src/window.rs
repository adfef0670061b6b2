//! Greedy packing of syntax nodes into windows bounded by non-whitespace size.
//!
//! Sizes are measured in non-whitespace characters (NWS) so indentation style
//! does not change how much code fits in a chunk. A prefix-sum array makes the
//! size of any byte range a single subtraction.

use crate::types::{ByteRange, LineRange};
use tree_sitter::Node;

#[inline]
fn is_nws_byte(b: u8) -> bool {
    // UTF-8 continuation bytes belong to the char already counted
    !matches!(b, b' ' | b'\t' | b'\n' | b'\r') && (b & 0xC0) != 0x80
}

/// Number of non-whitespace characters in `text`
pub fn nws_len(text: &str) -> usize {
    text.bytes().filter(|&b| is_nws_byte(b)).count()
}

/// Prefix sums of NWS characters and line start offsets for one source file
pub(crate) struct NwsIndex<'s> {
    source: &'s [u8],
    cumsum: Vec<usize>,
    line_starts: Vec<usize>,
}

impl<'s> NwsIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let bytes = source.as_bytes();
        let mut cumsum = Vec::with_capacity(bytes.len() + 1);
        let mut line_starts = vec![0];
        let mut total = 0;
        cumsum.push(0);
        for (i, &b) in bytes.iter().enumerate() {
            if is_nws_byte(b) {
                total += 1;
            }
            cumsum.push(total);
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            source: bytes,
            cumsum,
            line_starts,
        }
    }

    /// NWS size of `range`, clamped to the source
    pub fn nws(&self, range: ByteRange) -> usize {
        let last = self.cumsum.len() - 1;
        let end = range.end.min(last);
        let start = range.start.min(end);
        self.cumsum[end] - self.cumsum[start]
    }

    /// 0-indexed line containing `offset`
    pub fn line_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }

    /// `range` with trailing newline characters removed
    pub fn trim_trailing_newlines(&self, range: ByteRange) -> ByteRange {
        let mut end = range.end.min(self.source.len());
        while end > range.start && matches!(self.source[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        ByteRange::new(range.start, end)
    }

    /// Inclusive line range covered by `range` once trailing newlines are dropped
    pub fn line_span(&self, range: ByteRange) -> LineRange {
        let trimmed = self.trim_trailing_newlines(range);
        let last_byte = trimmed.end.saturating_sub(1).max(trimmed.start);
        LineRange::new(self.line_at(trimmed.start), self.line_at(last_byte))
    }

    /// Line start offsets strictly inside `range`
    fn line_starts_within(&self, range: ByteRange) -> &[usize] {
        let from = self.line_starts.partition_point(|&s| s <= range.start);
        let to = self.line_starts.partition_point(|&s| s < range.end);
        &self.line_starts[from..to.max(from)]
    }
}

/// Transient packing unit: the byte spans of the nodes that will form one chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Window {
    pub spans: Vec<ByteRange>,
    pub size: usize,
    /// Holds a line-split piece of a node rather than whole nodes only
    pub is_partial: bool,
    /// One entry per span; authoritative for the line range of partial windows
    pub line_ranges: Vec<LineRange>,
}

impl Window {
    fn push(&mut self, span: ByteRange, size: usize, index: &NwsIndex<'_>) {
        self.spans.push(span);
        self.line_ranges.push(index.line_span(span));
        self.size += size;
    }

    fn partial_piece(span: ByteRange, index: &NwsIndex<'_>) -> Self {
        Self {
            spans: vec![span],
            size: index.nws(span),
            is_partial: true,
            line_ranges: vec![index.line_span(span)],
        }
    }

    fn absorb(&mut self, other: Self) {
        self.spans.extend(other.spans);
        self.line_ranges.extend(other.line_ranges);
        self.size += other.size;
        self.is_partial |= other.is_partial;
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn flush(current: &mut Window, windows: &mut Vec<Window>) {
    if !current.is_empty() {
        log::trace!("Flushing window: {} nodes, {} nws", current.spans.len(), current.size);
        windows.push(std::mem::take(current));
    }
}

fn children_of<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect();
    children
}

/// NWS characters held by `children`; less than the parent's when some
/// content (a Go string body, for one) is not its own node
fn covered_by(children: &[Node<'_>], index: &NwsIndex<'_>) -> usize {
    children
        .iter()
        .map(|c| index.nws(ByteRange::new(c.start_byte(), c.end_byte())))
        .sum()
}

/// Greedily pack `nodes` into windows of at most `budget` NWS characters.
///
/// Nodes too large on their own are replaced by their children; childless
/// ones, and ones whose children leave text uncovered, are split at line
/// boundaries. The descent keeps its own stack of
/// child lists, and the open window is flushed whenever a list runs out.
pub(crate) fn pack(nodes: Vec<Node<'_>>, index: &NwsIndex<'_>, budget: usize) -> Vec<Window> {
    let mut windows = Vec::new();
    let mut current = Window::default();
    let mut frames = vec![nodes.into_iter()];

    while let Some(frame) = frames.last_mut() {
        let Some(node) = frame.next() else {
            frames.pop();
            flush(&mut current, &mut windows);
            continue;
        };

        let span = ByteRange::new(node.start_byte(), node.end_byte());
        let size = index.nws(span);

        if current.size + size <= budget {
            current.push(span, size, index);
        } else if size > budget {
            flush(&mut current, &mut windows);
            let children = children_of(node);
            if !children.is_empty() && covered_by(&children, index) == size {
                frames.push(children.into_iter());
            } else {
                split_leaf(span, index, budget, &mut windows);
            }
        } else {
            flush(&mut current, &mut windows);
            current.push(span, size, index);
        }
    }

    windows
}

/// Split an oversized leaf at line boundaries into partial windows
fn split_leaf(span: ByteRange, index: &NwsIndex<'_>, budget: usize, windows: &mut Vec<Window>) {
    let mut piece_start = span.start;
    let mut piece_size = 0;
    let mut line_start = span.start;

    let boundaries = index.line_starts_within(span).iter().copied().chain([span.end]);
    for boundary in boundaries {
        let line_size = index.nws(ByteRange::new(line_start, boundary));
        if piece_size > 0 && piece_size + line_size > budget {
            windows.push(Window::partial_piece(ByteRange::new(piece_start, line_start), index));
            piece_start = line_start;
            piece_size = 0;
        }
        piece_size += line_size;
        line_start = boundary;
    }

    windows.push(Window::partial_piece(ByteRange::new(piece_start, span.end), index));
}

/// Join adjacent windows while their combined size fits the budget
pub(crate) fn merge(windows: Vec<Window>, budget: usize) -> Vec<Window> {
    let mut iter = windows.into_iter();
    let Some(mut running) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        if running.size + next.size <= budget {
            running.absorb(next);
        } else {
            merged.push(std::mem::replace(&mut running, next));
        }
    }
    merged.push(running);
    merged
}

/// Source text of a window with its byte and line ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rebuilt {
    pub text: String,
    pub byte_range: ByteRange,
    pub line_range: LineRange,
}

/// Slice the source covered by `window`, dropping trailing newlines
pub(crate) fn rebuild(window: &Window, source: &str, index: &NwsIndex<'_>) -> Rebuilt {
    let start = window.spans.iter().map(|s| s.start).min();
    let end = window.spans.iter().map(|s| s.end).max();
    let (Some(start), Some(end)) = (start, end) else {
        return Rebuilt {
            text: String::new(),
            byte_range: ByteRange::default(),
            line_range: LineRange::default(),
        };
    };

    let range = index.trim_trailing_newlines(ByteRange::new(start, end));
    let text = source.get(range.start..range.end).unwrap_or("").to_string();

    let line_range = match (window.is_partial, window.line_ranges.first(), window.line_ranges.last()) {
        (true, Some(first), Some(last)) => LineRange::new(first.start, last.end),
        _ => index.line_span(range),
    };

    Rebuilt {
        text,
        byte_range: range,
        line_range,
    }
}
