//! Entity extraction from a syntax tree.
//!
//! The walk uses an explicit stack of `(node, enclosing entity name)` pairs,
//! pushed in reverse child order so entities come out in document order no
//! matter how deep the tree is.

use crate::docstring::extract_docstring;
use crate::error::Result;
use crate::imports::import_symbols;
use crate::language::Language;
use crate::parser::parse;
use crate::signature::{clean_signature, extract_signature, node_text};
use crate::types::{ByteRange, Entity, EntityKind, LineRange};
use std::collections::HashSet;
use tree_sitter::Node;

/// Name given to entities without a discoverable identifier
pub const ANONYMOUS_NAME: &str = "<anonymous>";

/// Child kinds accepted as a fallback name
const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "property_identifier",
    "field_identifier",
    "name",
    "constant",
];

/// Parse `source` and extract its entities in document order
pub fn extract_entities(source: &str, language: Language) -> Result<Vec<Entity>> {
    let parsed = parse(source, language)?;
    Ok(extract_from_tree(parsed.tree.root_node(), language, source))
}

pub(crate) fn extract_from_tree(root: Node<'_>, language: Language, source: &str) -> Vec<Entity> {
    let config = language.config();
    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<(Node<'_>, Option<String>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        if !seen.insert(node.id()) {
            continue;
        }

        let mut child_parent = parent.clone();

        if config.is_entity_node_kind(node.kind()) {
            let kind = EntityKind::from_node_kind(node.kind())
                .or_else(|| EntityKind::infer_from_node_kind(node.kind()));

            match kind {
                Some(EntityKind::Import) => {
                    entities.extend(import_entities(node, language, source, &parent));
                    continue;
                }
                Some(kind) => {
                    let entity = build_entity(node, kind, language, source, parent);
                    if kind.opens_scope() {
                        child_parent = Some(entity.name.clone());
                    }
                    entities.push(entity);
                }
                None => {}
            }
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, child_parent.clone()));
        }
    }

    log::debug!("Extracted {} {language} entities", entities.len());
    entities
}

fn byte_range(node: Node<'_>) -> ByteRange {
    ByteRange::new(node.start_byte(), node.end_byte())
}

fn line_range(node: Node<'_>) -> LineRange {
    LineRange::new(node.start_position().row, node.end_position().row)
}

fn build_entity(
    node: Node<'_>,
    kind: EntityKind,
    language: Language,
    source: &str,
    parent: Option<String>,
) -> Entity {
    let name = resolve_name(node, source).unwrap_or_else(|| ANONYMOUS_NAME.to_string());

    let mut signature = extract_signature(node, kind, language, source);
    if signature.is_empty() {
        signature = name.clone();
    }

    Entity {
        kind,
        name,
        signature,
        docstring: extract_docstring(node, language, source),
        byte_range: byte_range(node),
        line_range: line_range(node),
        parent,
        source: None,
    }
}

fn import_entities(
    node: Node<'_>,
    language: Language,
    source: &str,
    parent: &Option<String>,
) -> Vec<Entity> {
    let signature = clean_signature(node_text(node, source));

    import_symbols(node, language, source)
        .into_iter()
        .map(|symbol| Entity {
            kind: EntityKind::Import,
            name: symbol.name,
            signature: signature.clone(),
            docstring: None,
            byte_range: byte_range(node),
            line_range: line_range(node),
            parent: parent.clone(),
            source: symbol.source,
        })
        .collect()
}

/// Resolve the declared name of an entity node
fn resolve_name(node: Node<'_>, source: &str) -> Option<String> {
    let text = |n: Node<'_>| {
        let name = node_text(n, source).trim();
        (!name.is_empty()).then(|| name.to_string())
    };

    if let Some(name) = node.child_by_field_name("name") {
        return text(name);
    }

    // `export class Foo {}` names the export after its declaration
    if let Some(name) = node
        .child_by_field_name("declaration")
        .and_then(|decl| decl.child_by_field_name("name"))
    {
        return text(name);
    }

    if node.kind() == "impl_item" {
        if let Some(target) = impl_target(node) {
            return text(target);
        }
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    if let Some(ident) = children
        .iter()
        .find(|child| IDENTIFIER_KINDS.contains(&child.kind()))
    {
        return text(*ident);
    }

    // Go wraps the named part of `type X ...` in a type_spec
    children
        .iter()
        .find(|child| child.kind().ends_with("_spec"))
        .and_then(|spec| spec.child_by_field_name("name"))
        .and_then(text)
}

/// The implemented type of a Rust `impl` block: `impl<T> Trait for Foo<T>` is `Foo`
fn impl_target(impl_node: Node<'_>) -> Option<Node<'_>> {
    let ty = impl_node.child_by_field_name("type")?;
    match ty.kind() {
        "type_identifier" => Some(ty),
        "generic_type" => ty
            .child_by_field_name("type")
            .and_then(|inner| match inner.kind() {
                "scoped_type_identifier" => inner.child_by_field_name("name"),
                _ => Some(inner),
            }),
        "scoped_type_identifier" => ty.child_by_field_name("name"),
        _ => None,
    }
}
