use code_chunk::{
    chunk, chunk_file, chunk_stream, extract_entities, nws_len, ChunkOptions, ChunkerError,
    ChunkingStats, CodeChunk, ContextMode, EntityKind, Language, ScopeTree,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const GO_SOURCE: &str = r#"package main

import "fmt"

func main() {
	msg := helper()
	fmt.Println(msg)
}

func helper() string {
	return "hello"
}
"#;

const PYTHON_SOURCE: &str = r#"import os
from typing import List


class Inventory:
    """Tracks items on hand."""

    def __init__(self):
        self.items = []

    def add(self, name: str, count: int) -> None:
        """Add stock for an item."""
        for _ in range(count):
            self.items.append(name)
        if len(self.items) > 1000:
            raise ValueError("inventory full")

    def paths(self) -> List[str]:
        return [os.path.join("/tmp", item) for item in self.items]


def summarize(inv):
    total = len(inv.items)
    return f"{total} items"
"#;

const TS_SOURCE: &str = r#"import { a as b } from 'mod';
import { Logger } from './log';

export interface Shape {
  area(): number;
}

export class Circle implements Shape {
  constructor(private radius: number) {}

  area(): number {
    return Math.PI * this.radius * this.radius;
  }
}

function describe(shape: Shape): string {
  const log = new Logger();
  log.info("describing");
  return `area=${shape.area()}`;
}
"#;

fn with_size(max_chunk_size: usize) -> ChunkOptions {
    ChunkOptions::default().with_max_chunk_size(max_chunk_size)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// Chunks tile the source: each text is its byte slice, and only whitespace
/// falls between consecutive chunks
fn assert_round_trip(source: &str, chunks: &[CodeChunk]) {
    let mut cursor = 0;
    for c in chunks {
        assert!(c.byte_range.start >= cursor, "chunk {} overlaps its predecessor", c.index);
        assert!(is_blank(&source[cursor..c.byte_range.start]));
        assert_eq!(&source[c.byte_range.start..c.byte_range.end], c.text);
        cursor = c.byte_range.end;
    }
    assert!(is_blank(&source[cursor..]));
}

#[test]
fn single_chunk_when_file_fits() {
    init_logging();
    let chunks = chunk("cmd/app/main.go", GO_SOURCE, Some(&with_size(1000))).unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].total_chunks, Some(1));
    assert_eq!(chunks[0].text, GO_SOURCE.trim_end());

    let names: Vec<_> = chunks[0]
        .context
        .entities
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["fmt", "main", "helper"]);
    assert!(chunks[0]
        .contextualized_text
        .starts_with("# cmd/app/main.go\n"));
}

#[test]
fn small_budget_gives_ordered_disjoint_chunks() {
    init_logging();
    let chunks = chunk("main.go", GO_SOURCE, Some(&with_size(10))).unwrap();

    assert!(chunks.len() >= 2);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.index, i);
        assert_eq!(c.total_chunks, Some(chunks.len()));
    }
    for pair in chunks.windows(2) {
        assert!(pair[0].byte_range.end <= pair[1].byte_range.start);
        assert!(pair[0].byte_range.start < pair[1].byte_range.start);
    }
    assert_round_trip(GO_SOURCE, &chunks);
}

#[test]
fn python_docstrings() {
    let entities = extract_entities(PYTHON_SOURCE, Language::Python).unwrap();
    let doc = |name: &str| {
        entities
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.docstring.clone())
    };

    assert_eq!(doc("Inventory").as_deref(), Some("Tracks items on hand."));
    assert_eq!(doc("add").as_deref(), Some("Add stock for an item."));
    assert_eq!(doc("__init__"), None);
    assert_eq!(doc("summarize"), None);
}

#[test]
fn aliased_typescript_import() {
    let entities = extract_entities("import { a as b } from 'mod'\n", Language::TypeScript).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].kind, EntityKind::Import);
    assert_eq!(entities[0].name, "b");
    assert_eq!(entities[0].source.as_deref(), Some("mod"));
}

#[test]
fn overlapping_entities_are_listed_with_partial_flags() {
    for (path, source, language) in [
        ("inventory.py", PYTHON_SOURCE, Language::Python),
        ("shapes.ts", TS_SOURCE, Language::TypeScript),
        ("main.go", GO_SOURCE, Language::Go),
    ] {
        let entities = extract_entities(source, language).unwrap();
        let chunks = chunk(path, source, Some(&with_size(60))).unwrap();
        assert!(chunks.len() > 1, "{path} should need several chunks");

        for c in &chunks {
            for e in &entities {
                if !e.byte_range.overlaps(&c.byte_range) {
                    continue;
                }
                let listed = c
                    .context
                    .entities
                    .iter()
                    .find(|info| {
                        info.name == e.name && info.kind == e.kind && info.line_range == e.line_range
                    })
                    .unwrap_or_else(|| panic!("{} missing from chunk {} of {path}", e.name, c.index));
                assert_eq!(listed.is_partial, !c.byte_range.contains_range(&e.byte_range));
            }
        }
    }
}

#[test]
fn chunking_is_deterministic() {
    let options = with_size(80);
    let first = chunk("shapes.ts", TS_SOURCE, Some(&options)).unwrap();
    let second = chunk("shapes.ts", TS_SOURCE, Some(&options)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn chunks_tile_the_source() {
    for size in [5, 20, 60, 200, 5000] {
        let options = with_size(size);
        assert_round_trip(PYTHON_SOURCE, &chunk("inv.py", PYTHON_SOURCE, Some(&options)).unwrap());
        assert_round_trip(TS_SOURCE, &chunk("shapes.ts", TS_SOURCE, Some(&options)).unwrap());
        assert_round_trip(GO_SOURCE, &chunk("main.go", GO_SOURCE, Some(&options)).unwrap());
    }
}

#[test]
fn tiny_budget_terminates_with_a_chunk_per_entity() {
    let entities = extract_entities(PYTHON_SOURCE, Language::Python).unwrap();
    let chunks = chunk("inv.py", PYTHON_SOURCE, Some(&with_size(3))).unwrap();

    for e in entities.iter().filter(|e| e.kind != EntityKind::Import) {
        assert!(
            chunks.iter().any(|c| c.byte_range.overlaps(&e.byte_range)),
            "no chunk covers {}",
            e.name
        );
    }
    assert_round_trip(PYTHON_SOURCE, &chunks);
}

#[test]
fn long_string_is_split_by_lines() {
    let body: String = (0..40).map(|i| format!("    row {i} of generated text\n")).collect();
    let source = format!("TEMPLATE = \"\"\"\n{body}\"\"\"\n");
    let chunks = chunk("template.py", &source, Some(&with_size(50))).unwrap();

    assert!(chunks.len() > 3);
    assert_round_trip(&source, &chunks);
    for c in &chunks {
        let lines = c.text.lines().count();
        assert_eq!(c.line_range.end - c.line_range.start + 1, lines);
    }
}

#[test]
fn ancestor_chains_grow_outward() {
    let entities = extract_entities(PYTHON_SOURCE, Language::Python).unwrap();
    let tree = ScopeTree::build(entities);

    for offset in 0..PYTHON_SOURCE.len() {
        let Some(scope) = tree.scope_at_offset(offset) else {
            continue;
        };
        assert!(tree.entity(scope).byte_range.contains_offset(offset));

        let chain = tree.ancestor_chain(scope);
        let mut previous = tree.entity(scope).byte_range.len();
        for &ancestor in &chain {
            let size = tree.entity(ancestor).byte_range.len();
            assert!(size > previous);
            previous = size;
        }
        if let Some(&outermost) = chain.last() {
            assert_eq!(tree.node(outermost).parent(), None);
        }
    }
}

#[test]
fn method_chunks_carry_their_scope() {
    let chunks = chunk("inv.py", PYTHON_SOURCE, Some(&with_size(40))).unwrap();
    let inside_add = chunks
        .iter()
        .find(|c| c.text.contains("self.items.append(name)"))
        .unwrap();

    let scope: Vec<_> = inside_add
        .context
        .scope
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(scope.last(), Some(&"Inventory"));
    assert!(inside_add
        .contextualized_text
        .contains("# Scope: Inventory > "));
}

#[test]
fn filtered_imports_follow_signatures() {
    let source = "import { Logger } from './log';\nimport { Unused } from './unused';\n\nfunction make(log: Logger): void {\n  log.info(\"made\");\n}\n";
    let imports_per_chunk = |options: &ChunkOptions| {
        chunk("make.ts", source, Some(options))
            .unwrap()
            .iter()
            .map(|c| {
                c.context
                    .imports
                    .iter()
                    .map(|i| i.name.clone())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    let all = imports_per_chunk(&with_size(60));
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|names| names == &["Logger", "Unused"]));

    // The import chunk keeps both statements; the function only mentions Logger
    let filtered = imports_per_chunk(&ChunkOptions {
        filter_imports: true,
        ..with_size(60)
    });
    assert_eq!(
        filtered,
        vec![
            vec!["Logger".to_string(), "Unused".to_string()],
            vec!["Logger".to_string()],
        ]
    );
}

#[test]
fn filtered_imports_keep_imports_in_the_chunk() {
    let source = "import os\nimport json\n\ndef f(): return json.dumps({})\n";
    let options = ChunkOptions {
        filter_imports: true,
        ..with_size(1000)
    };
    let chunks = chunk("util.py", source, Some(&options)).unwrap();
    assert_eq!(chunks.len(), 1);

    let imports: Vec<_> = chunks[0]
        .context
        .imports
        .iter()
        .map(|i| (i.name.as_str(), i.source.as_str()))
        .collect();
    assert_eq!(imports, vec![("os", "os"), ("json", "json")]);
}

#[test]
fn stream_reports_unknown_total() {
    let stream = chunk_stream("inv.py", PYTHON_SOURCE, Some(&with_size(60))).unwrap();
    let streamed: Vec<_> = stream.collect();
    let collected = chunk("inv.py", PYTHON_SOURCE, Some(&with_size(60))).unwrap();

    assert_eq!(streamed.len(), collected.len());
    assert!(streamed.iter().all(|c| c.total_chunks.is_none()));
    for (i, c) in streamed.iter().enumerate() {
        assert_eq!(c.index, i);
    }
}

#[test]
fn context_modes() {
    let none = ChunkOptions {
        context_mode: ContextMode::None,
        overlap_lines: 0,
        ..with_size(60)
    };
    for c in chunk("inv.py", PYTHON_SOURCE, Some(&none)).unwrap() {
        assert_eq!(c.contextualized_text, c.text);
        assert!(c.context.scope.is_empty() && c.context.siblings.is_empty());
    }

    let minimal = ChunkOptions {
        context_mode: ContextMode::Minimal,
        ..with_size(60)
    };
    let chunks = chunk("inv.py", PYTHON_SOURCE, Some(&minimal)).unwrap();
    assert!(chunks.iter().all(|c| c.context.siblings.is_empty() && c.context.imports.is_empty()));
    assert!(chunks.iter().any(|c| !c.context.entities.is_empty()));
}

#[test]
fn chunk_serializes_to_json() {
    let chunks = chunk("main.go", GO_SOURCE, None).unwrap();
    let json = serde_json::to_value(&chunks[0]).unwrap();
    assert_eq!(json["context"]["language"], "go");
    assert_eq!(json["total_chunks"], 1);
}

#[test]
fn chunk_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.py");
    std::fs::write(&path, PYTHON_SOURCE).unwrap();

    let chunks = chunk_file(&path, Some(&with_size(100))).unwrap();
    assert!(!chunks.is_empty());
    assert_round_trip(PYTHON_SOURCE, &chunks);
    assert!(chunks
        .iter()
        .all(|c| c.context.filepath.as_deref() == Some(path.to_string_lossy().as_ref())));

    let missing = chunk_file(dir.path().join("absent.py"), None).unwrap_err();
    assert!(matches!(missing, ChunkerError::Io(_)));
}

#[test]
fn language_override_and_errors() {
    let err = chunk("notes.txt", "plain words", None).unwrap_err();
    assert!(err.is_unsupported_language());

    let forced = ChunkOptions::default().with_language(Language::Python);
    let chunks = chunk("notes.txt", "def f():\n    return 1\n", Some(&forced)).unwrap();
    assert_eq!(chunks[0].context.language, Some(Language::Python));
    assert_eq!(chunks[0].context.entities[0].name, "f");

    let zero = ChunkOptions::default().with_max_chunk_size(0);
    assert!(matches!(
        chunk("a.py", "x = 1\n", Some(&zero)),
        Err(ChunkerError::InvalidConfig(_))
    ));
}

#[test]
fn stats_summarize_chunks() {
    let chunks = chunk("inv.py", PYTHON_SOURCE, Some(&with_size(80))).unwrap();
    let stats = ChunkingStats::from_chunks(&chunks);

    assert_eq!(stats.total_chunks, chunks.len());
    assert_eq!(stats.total_size, nws_len(PYTHON_SOURCE));
    assert!(stats.min_size <= stats.avg_size && stats.avg_size <= stats.max_size);
    assert!(stats.to_string().starts_with(&format!("Chunks: {}", chunks.len())));
}
