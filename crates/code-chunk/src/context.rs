use crate::config::{ChunkOptions, ContextMode, SiblingDetail};
use crate::language::Language;
use crate::scope::ScopeTree;
use crate::types::{
    ByteRange, ChunkContext, ChunkEntityInfo, Entity, EntityInfo, ImportInfo, ParseError,
    SiblingInfo, SiblingPosition,
};

/// Neighbouring entities collected on each side of a chunk
const MAX_SIBLINGS: usize = 3;

/// File-level inputs shared by every chunk of one file
#[derive(Debug, Clone, Copy)]
pub(crate) struct FileContext<'a> {
    pub filepath: Option<&'a str>,
    pub language: Language,
    pub parse_error: Option<&'a ParseError>,
}

/// Resolve the structural context of the chunk covering `range`
pub(crate) fn build_context(
    range: ByteRange,
    tree: &ScopeTree,
    file: FileContext<'_>,
    options: &ChunkOptions,
) -> ChunkContext {
    let mut context = ChunkContext {
        language: Some(file.language),
        parse_error: file.parse_error.cloned(),
        ..ChunkContext::default()
    };

    // No header at all: the path is left out along with the collections
    if options.context_mode == ContextMode::None {
        return context;
    }
    context.filepath = file.filepath.map(str::to_string);

    context.scope = scope_chain(range, tree);
    context.entities = entities_in_range(range, tree.entities());

    if options.context_mode == ContextMode::Minimal {
        return context;
    }

    context.siblings = siblings(range, tree.entities(), options.sibling_detail);
    context.imports = imports(tree, &context.entities, options.filter_imports);
    context
}

fn entity_info(entity: &Entity) -> EntityInfo {
    EntityInfo {
        name: entity.name.clone(),
        kind: entity.kind,
        signature: entity.signature.clone(),
    }
}

/// Innermost scope at the chunk start followed by its ancestors
fn scope_chain(range: ByteRange, tree: &ScopeTree) -> Vec<EntityInfo> {
    let Some(innermost) = tree.scope_at_offset(range.start) else {
        return Vec::new();
    };

    std::iter::once(innermost)
        .chain(tree.ancestor_chain(innermost))
        .map(|id| entity_info(tree.entity(id)))
        .collect()
}

fn entities_in_range(range: ByteRange, entities: &[Entity]) -> Vec<ChunkEntityInfo> {
    entities
        .iter()
        .filter(|e| e.byte_range.overlaps(&range))
        .map(|e| ChunkEntityInfo {
            name: e.name.clone(),
            kind: e.kind,
            signature: e.signature.clone(),
            docstring: e.docstring.clone(),
            line_range: e.line_range,
            is_partial: !range.contains_range(&e.byte_range),
        })
        .collect()
}

/// First entities in document order that end before or start after the
/// chunk, numbered by encounter order on each side
fn siblings(range: ByteRange, entities: &[Entity], detail: SiblingDetail) -> Vec<SiblingInfo> {
    if detail == SiblingDetail::None {
        return Vec::new();
    }

    let mut siblings = Vec::new();
    let mut before = 0;
    let mut after = 0;

    for entity in entities.iter().filter(|e| !e.kind.is_import_or_export()) {
        let tag = |position, distance| SiblingInfo {
            name: entity.name.clone(),
            kind: entity.kind,
            position,
            distance,
            signature: (detail == SiblingDetail::Signatures).then(|| entity.signature.clone()),
        };

        if entity.byte_range.end <= range.start && before < MAX_SIBLINGS {
            before += 1;
            siblings.push(tag(SiblingPosition::Before, before));
        }
        if entity.byte_range.start >= range.end && after < MAX_SIBLINGS {
            after += 1;
            siblings.push(tag(SiblingPosition::After, after));
        }
    }

    siblings
}

/// File imports, optionally narrowed to those the chunk's entities mention
fn imports(tree: &ScopeTree, in_chunk: &[ChunkEntityInfo], filter: bool) -> Vec<ImportInfo> {
    let referenced = |name: &str| {
        in_chunk
            .iter()
            .any(|e| e.name == name || e.signature.contains(name))
    };

    tree.imports()
        .filter(|import| !filter || referenced(&import.name))
        .map(|import| ImportInfo {
            name: import.name.clone(),
            source: import.source.clone().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityKind, LineRange};
    use pretty_assertions::assert_eq;

    fn entity(kind: EntityKind, name: &str, signature: &str, start: usize, end: usize) -> Entity {
        Entity {
            kind,
            name: name.to_string(),
            signature: signature.to_string(),
            docstring: None,
            byte_range: ByteRange::new(start, end),
            line_range: LineRange::default(),
            parent: None,
            source: Some(format!("pkg/{name}")),
        }
    }

    fn sample_tree() -> ScopeTree {
        ScopeTree::build(vec![
            entity(EntityKind::Import, "Reader", "import Reader", 0, 10),
            entity(EntityKind::Import, "Writer", "import Writer", 11, 20),
            entity(EntityKind::Function, "f1", "fn f1()", 30, 40),
            entity(EntityKind::Function, "f2", "fn f2()", 41, 50),
            entity(EntityKind::Class, "C", "class C", 60, 200),
            entity(EntityKind::Method, "read", "fn read(r: Reader)", 70, 120),
            entity(EntityKind::Method, "m2", "fn m2()", 130, 190),
            entity(EntityKind::Function, "g1", "fn g1()", 210, 220),
            entity(EntityKind::Function, "g2", "fn g2()", 230, 240),
            entity(EntityKind::Function, "g3", "fn g3()", 250, 260),
            entity(EntityKind::Function, "g4", "fn g4()", 270, 280),
        ])
    }

    fn file() -> FileContext<'static> {
        FileContext {
            filepath: Some("src/lib.rs"),
            language: Language::Rust,
            parse_error: None,
        }
    }

    #[test]
    fn test_full_context() {
        let tree = sample_tree();
        let context = build_context(ByteRange::new(75, 125), &tree, file(), &ChunkOptions::default());

        let scope: Vec<_> = context.scope.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(scope, vec!["read", "C"]);

        let entities: Vec<_> = context
            .entities
            .iter()
            .map(|e| (e.name.as_str(), e.is_partial))
            .collect();
        assert_eq!(entities, vec![("C", true), ("read", true)]);

        let siblings: Vec<_> = context
            .siblings
            .iter()
            .map(|s| (s.name.as_str(), s.position, s.distance))
            .collect();
        assert_eq!(
            siblings,
            vec![
                ("f1", SiblingPosition::Before, 1),
                ("f2", SiblingPosition::Before, 2),
                ("m2", SiblingPosition::After, 1),
                ("g1", SiblingPosition::After, 2),
                ("g2", SiblingPosition::After, 3),
            ]
        );
        assert_eq!(context.siblings[0].signature.as_deref(), Some("fn f1()"));
        assert_eq!(context.imports.len(), 2);
        assert_eq!(context.filepath.as_deref(), Some("src/lib.rs"));
    }

    #[test]
    fn test_fully_contained_entity_is_not_partial() {
        let tree = sample_tree();
        let context = build_context(ByteRange::new(60, 200), &tree, file(), &ChunkOptions::default());
        assert!(context.entities.iter().all(|e| !e.is_partial));
        assert_eq!(context.entities.len(), 3);
    }

    #[test]
    fn test_filtered_imports() {
        let tree = sample_tree();
        let options = ChunkOptions {
            filter_imports: true,
            ..ChunkOptions::default()
        };
        let context = build_context(ByteRange::new(70, 120), &tree, file(), &options);
        assert_eq!(
            context.imports,
            vec![ImportInfo {
                name: "Reader".to_string(),
                source: "pkg/Reader".to_string(),
            }]
        );
    }

    #[test]
    fn test_imports_inside_chunk_match_themselves() {
        let tree = sample_tree();
        let options = ChunkOptions {
            filter_imports: true,
            ..ChunkOptions::default()
        };
        let context = build_context(ByteRange::new(0, 25), &tree, file(), &options);
        let names: Vec<_> = context.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Reader", "Writer"]);
    }

    #[test]
    fn test_siblings_follow_document_order() {
        let tree = ScopeTree::build(
            (1..=5)
                .map(|i| {
                    let name = format!("f{i}");
                    let start = i * 20;
                    entity(EntityKind::Function, &name, &format!("func {name}()"), start, start + 15)
                })
                .collect(),
        );
        let context = build_context(ByteRange::new(100, 115), &tree, file(), &ChunkOptions::default());

        let before: Vec<_> = context
            .siblings
            .iter()
            .map(|s| (s.name.as_str(), s.position, s.distance))
            .collect();
        assert_eq!(
            before,
            vec![
                ("f1", SiblingPosition::Before, 1),
                ("f2", SiblingPosition::Before, 2),
                ("f3", SiblingPosition::Before, 3),
            ]
        );
    }

    #[test]
    fn test_minimal_and_none_modes() {
        let tree = sample_tree();
        let minimal = ChunkOptions {
            context_mode: ContextMode::Minimal,
            ..ChunkOptions::default()
        };
        let context = build_context(ByteRange::new(75, 125), &tree, file(), &minimal);
        assert!(!context.scope.is_empty());
        assert!(!context.entities.is_empty());
        assert!(context.siblings.is_empty());
        assert!(context.imports.is_empty());

        let none = ChunkOptions {
            context_mode: ContextMode::None,
            ..ChunkOptions::default()
        };
        let parse_error = ParseError::recoverable("parse error in source code");
        let with_error = FileContext {
            parse_error: Some(&parse_error),
            ..file()
        };
        let context = build_context(ByteRange::new(75, 125), &tree, with_error, &none);
        assert!(context.scope.is_empty());
        assert!(context.entities.is_empty());
        assert_eq!(context.filepath, None);
        assert_eq!(context.parse_error, Some(parse_error));
    }

    #[test]
    fn test_sibling_detail_names() {
        let tree = sample_tree();
        let options = ChunkOptions {
            sibling_detail: SiblingDetail::Names,
            ..ChunkOptions::default()
        };
        let context = build_context(ByteRange::new(205, 225), &tree, file(), &options);
        assert!(context.siblings.iter().all(|s| s.signature.is_none()));
        let before: Vec<_> = context
            .siblings
            .iter()
            .filter(|s| s.position == SiblingPosition::Before)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(before, vec!["f1", "f2", "C"]);

        let options = ChunkOptions {
            sibling_detail: SiblingDetail::None,
            ..ChunkOptions::default()
        };
        let context = build_context(ByteRange::new(205, 225), &tree, file(), &options);
        assert!(context.siblings.is_empty());
    }
}
