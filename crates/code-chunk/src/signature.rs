//! One-line signature extraction.
//!
//! The structural route cuts the declaration text at the start of its body
//! node. When a grammar exposes no body, a bracket-depth scan finds the first
//! body delimiter outside of parentheses, brackets, generics and literals.

use crate::language::Language;
use crate::types::EntityKind;
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\n]+").expect("Invalid regex"));

/// Node kinds that hold a declaration body
const BODY_NODE_KINDS: &[&str] = &[
    "block",
    "statement_block",
    "class_body",
    "interface_body",
    "enum_body",
];

/// Source text covered by `node`
pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Collapse line breaks and whitespace runs to single spaces and trim
pub fn clean_signature(sig: &str) -> String {
    WHITESPACE_RUN.replace_all(sig, " ").trim().to_string()
}

/// Extract the signature of an entity node
pub(crate) fn extract_signature(
    node: Node<'_>,
    kind: EntityKind,
    language: Language,
    source: &str,
) -> String {
    match kind {
        EntityKind::Function | EntityKind::Method => {
            function_signature(node, language, source)
        }
        EntityKind::Class | EntityKind::Interface | EntityKind::Export => {
            class_signature(node, language, source)
        }
        EntityKind::Type | EntityKind::Enum => type_signature(node, language, source),
        EntityKind::Import => clean_signature(node_text(node, source)),
    }
}

fn function_signature(node: Node<'_>, language: Language, source: &str) -> String {
    if let Some(sig) = signature_before_body(node, language, source) {
        return sig;
    }

    let text = node_text(node, source);
    match find_body_delimiter(text, language.config().body_delimiter, language) {
        Some(pos) => clean_signature(&text[..pos]),
        None => clean_signature(text),
    }
}

fn class_signature(node: Node<'_>, language: Language, source: &str) -> String {
    if let Some(sig) = signature_before_body(node, language, source) {
        return sig;
    }

    let text = node_text(node, source);
    match find_body_delimiter(text, language.config().body_delimiter, language) {
        Some(pos) => clean_signature(&text[..pos]),
        None => clean_signature(first_line(text)),
    }
}

/// Types cut at the earliest of `=`, a top-level `{`, or (Python) `:`
fn type_signature(node: Node<'_>, language: Language, source: &str) -> String {
    let text = node_text(node, source);

    let candidates = [
        text.find('='),
        find_body_delimiter(text, b'{', language),
        if language.config().is_indentation_based() {
            find_body_delimiter(text, b':', language)
        } else {
            None
        },
    ];

    match candidates.into_iter().flatten().min() {
        Some(pos) => clean_signature(&text[..pos]),
        None => clean_signature(first_line(text)),
    }
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

/// Find the declaration's body node: the `body` field, else a known body kind
pub(crate) fn find_body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if let Some(body) = node.child_by_field_name("body") {
        return Some(body);
    }

    let mut cursor = node.walk();
    let body = node
        .children(&mut cursor)
        .find(|child| BODY_NODE_KINDS.contains(&child.kind()));
    body
}

fn signature_before_body(node: Node<'_>, language: Language, source: &str) -> Option<String> {
    let body = find_body(node)?;
    let head = source.get(node.start_byte()..body.start_byte())?;
    let mut sig = head.trim();

    if language.config().is_indentation_based() {
        sig = sig.strip_suffix(':').unwrap_or(sig);
    }
    if let Some(stripped) = sig.strip_suffix("=>") {
        sig = stripped.trim_end();
    }

    let sig = clean_signature(sig);
    (!sig.is_empty()).then_some(sig)
}

/// Byte offset of the first `delimiter` at nesting depth zero.
///
/// `<` only opens a generic when followed by something that can start a type
/// parameter, so comparisons do not swallow the rest of the text.
pub(crate) fn find_body_delimiter(text: &str, delimiter: u8, language: Language) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut paren = 0i32;
    let mut bracket = 0i32;
    let mut angle = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if let Some(open) = quote {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == open {
                quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            b'\'' if language == Language::Rust && !is_char_literal(&bytes[i..]) => {
                // lifetime such as 'a
            }
            b'"' | b'\'' | b'`' => {
                quote = Some(c);
                i += 1;
                continue;
            }
            b'(' => paren += 1,
            b')' => paren -= 1,
            b'[' => bracket += 1,
            b']' => bracket -= 1,
            b'<' => {
                if let Some(&next) = bytes.get(i + 1) {
                    if is_ident_start(next) || matches!(next, b'>' | b' ' | b'<') {
                        angle += 1;
                    }
                }
            }
            b'>' if angle > 0 => angle -= 1,
            _ => {}
        }

        if c == delimiter && paren == 0 && bracket == 0 && angle == 0 {
            return Some(i);
        }
        i += 1;
    }

    None
}

/// `'x'` or `'\n'` style literal starting at `rest[0]`
fn is_char_literal(rest: &[u8]) -> bool {
    match rest {
        [b'\'', b'\\', ..] => true,
        [b'\'', _, b'\'', ..] => true,
        _ => {
            // multi-byte UTF-8 char literal
            let tail = rest.get(1..).unwrap_or_default();
            let width = tail.iter().take_while(|b| **b >= 0x80).count();
            width > 1 && tail.get(width) == Some(&b'\'')
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}
