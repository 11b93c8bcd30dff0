use crate::define_parser;
use crate::parser::{ImportExtractor, ParseError};
use std::path::Path;
use tree_sitter::Node;

define_parser!(RUST_PARSER, tree_sitter_rust::LANGUAGE);

/// Extracts `use`, `mod x;` and `extern crate` names from Rust sources.
///
/// Path qualifiers (`crate`, `self`, `super`) are skipped so that
/// `use crate::model::Module` reports `model`, which is the unit the
/// internal-name registry knows about.
pub struct RustExtractor;

impl RustExtractor {
    pub fn new() -> Self {
        Self
    }
}

const QUALIFIERS: &[&str] = &["crate", "self", "super"];

/// Root module names referenced by the argument of a `use` declaration.
fn use_roots(text: &str) -> Vec<String> {
    let mut rest = text.trim().trim_start_matches("::");

    loop {
        let stripped = QUALIFIERS
            .iter()
            .find_map(|q| rest.strip_prefix(q).and_then(|r| r.strip_prefix("::")));
        match stripped {
            Some(r) => rest = r.trim_start(),
            None => break,
        }
    }

    if let Some(inner) = rest.strip_prefix('{') {
        let inner = inner.strip_suffix('}').unwrap_or(inner);
        return split_top_level(inner)
            .into_iter()
            .flat_map(use_roots)
            .collect();
    }

    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let root = &rest[..end];

    if root.is_empty() || QUALIFIERS.contains(&root) {
        Vec::new()
    } else {
        vec![root.to_string()]
    }
}

/// Split a use-list body on commas that are not nested in braces.
fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);

    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

fn field_text<'a>(node: &Node, field: &str, source_bytes: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field)?.utf8_text(source_bytes).ok()
}

impl ImportExtractor for RustExtractor {
    fn extensions(&self) -> &[&str] {
        &["rs"]
    }

    fn extract(&self, _path: &Path, source: &str) -> Result<Vec<String>, ParseError> {
        let tree = RUST_PARSER
            .with(|parser| parser.borrow_mut().parse(source, None))
            .ok_or_else(|| ParseError::Parse("Failed to parse file".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Parse("syntax error".to_string()));
        }

        let source_bytes = source.as_bytes();
        let mut imports = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            match node.kind() {
                "use_declaration" => {
                    if let Some(text) = field_text(&node, "argument", source_bytes) {
                        imports.extend(use_roots(text));
                    }
                }
                "mod_item" if node.child_by_field_name("body").is_none() => {
                    if let Some(name) = field_text(&node, "name", source_bytes) {
                        imports.push(name.to_string());
                    }
                }
                "extern_crate_declaration" => {
                    if let Some(name) = field_text(&node, "name", source_bytes) {
                        imports.push(name.to_string());
                    }
                }
                _ => {
                    let mut cursor = node.walk();
                    let children: Vec<_> = node.named_children(&mut cursor).collect();
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        Ok(imports)
    }
}

impl Default for RustExtractor {
    fn default() -> Self {
        Self::new()
    }
}
