//! Expansion of import statements into one symbol per imported name.

use crate::language::{ImportSyntax, Language};
use crate::signature::node_text;
use tree_sitter::Node;

/// A single imported name and the module it comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportSymbol {
    pub name: String,
    pub source: Option<String>,
}

impl ImportSymbol {
    fn new(name: impl Into<String>, source: Option<String>) -> Self {
        Self {
            name: name.into(),
            source: source.filter(|s| !s.is_empty()),
        }
    }
}

/// Expand an import statement node into its symbols.
///
/// Always returns at least one symbol: statements whose shape is not
/// understood yield a single placeholder named after the keyword.
pub(crate) fn import_symbols(node: Node<'_>, language: Language, source: &str) -> Vec<ImportSymbol> {
    let mut symbols = Vec::new();
    match language.config().import_syntax {
        ImportSyntax::EcmaScript => ecmascript_imports(node, source, &mut symbols),
        ImportSyntax::Python => python_imports(node, source, &mut symbols),
        ImportSyntax::Go => go_imports(node, source, &mut symbols),
        ImportSyntax::Rust => {
            if let Some(argument) = node.child_by_field_name("argument") {
                rust_use_clause(argument, None, source, &mut symbols);
            }
        }
        ImportSyntax::Java => java_imports(node, source, &mut symbols),
    }

    if symbols.is_empty() {
        let keyword = if language == Language::Rust { "use" } else { "import" };
        symbols.push(ImportSymbol::new(keyword, None));
    }
    symbols
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '"' | '\'' | '`'))
}

fn children_of<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect();
    children
}

fn first_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children_of(node).into_iter().find(|child| child.kind() == kind)
}

// -- JavaScript / TypeScript ------------------------------------------------

fn ecmascript_imports(node: Node<'_>, source: &str, out: &mut Vec<ImportSymbol>) {
    let module = node
        .child_by_field_name("source")
        .or_else(|| first_child_of_kind(node, "string"))
        .map(|s| strip_quotes(node_text(s, source)).to_string());

    let Some(clause) = first_child_of_kind(node, "import_clause") else {
        // Side-effect import: `import './polyfill'`
        if let Some(module) = module {
            out.push(ImportSymbol::new(module.clone(), Some(module)));
        }
        return;
    };

    for child in children_of(clause) {
        match child.kind() {
            "identifier" => {
                out.push(ImportSymbol::new(node_text(child, source), module.clone()));
            }
            "named_imports" => {
                for spec in children_of(child) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let local = spec
                        .child_by_field_name("alias")
                        .or_else(|| spec.child_by_field_name("name"))
                        .or_else(|| first_child_of_kind(spec, "identifier"));
                    if let Some(local) = local {
                        out.push(ImportSymbol::new(node_text(local, source), module.clone()));
                    }
                }
            }
            "namespace_import" => {
                let local = child
                    .child_by_field_name("alias")
                    .or_else(|| first_child_of_kind(child, "identifier"));
                if let Some(local) = local {
                    out.push(ImportSymbol::new(node_text(local, source), module.clone()));
                }
            }
            _ => {}
        }
    }
}

// -- Python -------------------------------------------------------------------

fn python_imports(node: Node<'_>, source: &str, out: &mut Vec<ImportSymbol>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let module = python_module_path(name, source);
                out.push(ImportSymbol::new(python_local_name(name, source), Some(module)));
            }
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .map(|m| node_text(m, source).to_string());

            if first_child_of_kind(node, "wildcard_import").is_some() {
                out.push(ImportSymbol::new("*", module));
                return;
            }

            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                out.push(ImportSymbol::new(python_local_name(name, source), module.clone()));
            }
        }
        _ => {}
    }
}

/// Name bound in the importing module: the alias when present
fn python_local_name(name: Node<'_>, source: &str) -> String {
    if name.kind() == "aliased_import" {
        if let Some(alias) = name.child_by_field_name("alias") {
            return node_text(alias, source).to_string();
        }
    }
    node_text(name, source).to_string()
}

fn python_module_path(name: Node<'_>, source: &str) -> String {
    let path = if name.kind() == "aliased_import" {
        name.child_by_field_name("name").unwrap_or(name)
    } else {
        name
    };
    node_text(path, source).to_string()
}

// -- Go -------------------------------------------------------------------------

fn go_imports(node: Node<'_>, source: &str, out: &mut Vec<ImportSymbol>) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == "import_spec" {
            go_import_spec(current, source, out);
            continue;
        }
        let mut children = children_of(current);
        children.reverse();
        stack.extend(children);
    }
}

fn go_import_spec(spec: Node<'_>, source: &str, out: &mut Vec<ImportSymbol>) {
    let Some(path) = spec.child_by_field_name("path") else {
        return;
    };
    let path = strip_quotes(node_text(path, source)).to_string();

    let name = match spec.child_by_field_name("name") {
        Some(alias) => node_text(alias, source).to_string(),
        None => path.rsplit('/').next().unwrap_or(&path).to_string(),
    };
    out.push(ImportSymbol::new(name, Some(path)));
}

// -- Rust -----------------------------------------------------------------------

fn join_path(prefix: Option<&str>, tail: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}::{tail}"),
        _ => tail.to_string(),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Walk a `use` clause, carrying the path prefix of enclosing groups.
/// The recorded source is the full path of each imported item.
fn rust_use_clause(clause: Node<'_>, prefix: Option<&str>, source: &str, out: &mut Vec<ImportSymbol>) {
    let text = node_text(clause, source);
    match clause.kind() {
        "use_list" => {
            for item in children_of(clause) {
                if item.is_named() {
                    rust_use_clause(item, prefix, source, out);
                }
            }
        }
        "scoped_use_list" => {
            let nested = clause
                .child_by_field_name("path")
                .map(|p| join_path(prefix, node_text(p, source)));
            let nested = nested.as_deref().or(prefix);
            if let Some(list) = clause.child_by_field_name("list") {
                rust_use_clause(list, nested, source, out);
            }
        }
        "use_as_clause" => {
            let path = clause
                .child_by_field_name("path")
                .map(|p| join_path(prefix, node_text(p, source)));
            if let Some(alias) = clause.child_by_field_name("alias") {
                out.push(ImportSymbol::new(node_text(alias, source), path));
            }
        }
        "use_wildcard" => {
            let path = text.trim_end_matches('*').trim_end_matches("::");
            let full = if path.is_empty() {
                prefix.map(str::to_string)
            } else {
                Some(join_path(prefix, path))
            };
            out.push(ImportSymbol::new("*", full));
        }
        "self" => {
            // `use std::io::{self}` binds the group's own last segment
            let full = prefix.unwrap_or("self");
            out.push(ImportSymbol::new(last_segment(full), Some(full.to_string())));
        }
        "scoped_identifier" | "identifier" | "crate" | "super" => {
            let full = join_path(prefix, text);
            out.push(ImportSymbol::new(last_segment(text), Some(full)));
        }
        _ => {}
    }
}

// -- Java -----------------------------------------------------------------------

fn java_imports(node: Node<'_>, source: &str, out: &mut Vec<ImportSymbol>) {
    let children = children_of(node);
    let Some(path) = children
        .iter()
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
    else {
        return;
    };
    let path = node_text(*path, source).to_string();

    if children.iter().any(|c| c.kind() == "asterisk") {
        out.push(ImportSymbol::new("*", Some(path)));
    } else {
        let name = path.rsplit('.').next().unwrap_or(&path).to_string();
        out.push(ImportSymbol::new(name, Some(path)));
    }
}
