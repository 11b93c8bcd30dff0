use crate::define_parser;
use crate::parser::{ImportExtractor, ParseError, root_segment};
use std::path::Path;
use tree_sitter::Node;

define_parser!(PYTHON_PARSER, tree_sitter_python::LANGUAGE);

/// AST-based extractor for `import x` / `from x import y` statements.
///
/// Imports anywhere in the file count, including ones nested in functions.
pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Self {
        Self
    }

    fn push_dotted(node: Option<Node>, source_bytes: &[u8], imports: &mut Vec<String>) {
        let Some(node) = node else { return };
        if let Ok(name) = node.utf8_text(source_bytes) {
            if let Some(root) = root_segment(name, '.') {
                imports.push(root);
            }
        }
    }

    fn handle_import(node: &Node, source_bytes: &[u8], imports: &mut Vec<String>) {
        // import foo.bar, baz as qux
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "dotted_name" => Self::push_dotted(Some(child), source_bytes, imports),
                "aliased_import" => {
                    Self::push_dotted(child.child_by_field_name("name"), source_bytes, imports)
                }
                _ => {}
            }
        }
    }

    fn handle_import_from(node: &Node, source_bytes: &[u8], imports: &mut Vec<String>) {
        // from foo.bar import baz; from .sibling import x
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };

        if module.kind() == "relative_import" {
            // `from . import x` names no module; `from .pkg import x` names `pkg`
            let mut cursor = module.walk();
            let dotted = module
                .named_children(&mut cursor)
                .find(|c| c.kind() == "dotted_name");
            Self::push_dotted(dotted, source_bytes, imports);
        } else {
            Self::push_dotted(Some(module), source_bytes, imports);
        }
    }
}

impl ImportExtractor for PythonExtractor {
    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn extract(&self, _path: &Path, source: &str) -> Result<Vec<String>, ParseError> {
        let tree = PYTHON_PARSER
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
                "import_statement" => Self::handle_import(&node, source_bytes, &mut imports),
                "import_from_statement" => {
                    Self::handle_import_from(&node, source_bytes, &mut imports)
                }
                "future_import_statement" => imports.push("__future__".to_string()),
                _ => {
                    let mut cursor = node.walk();
                    let children: Vec<_> = node.named_children(&mut cursor).collect();
                    // reversed so the stack pops them in source order
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        Ok(imports)
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<String> {
        PythonExtractor::new()
            .extract(Path::new("test.py"), source)
            .unwrap()
    }

    #[test]
    fn test_extracts_root_segments() {
        let imports = extract(
            r#"
import os
import package.sub.mod
import numpy as np
from app.models import User
from utils import helpers
"#,
        );
        assert_eq!(imports, vec!["os", "package", "numpy", "app", "utils"]);
    }

    #[test]
    fn test_nested_and_relative_imports() {
        let imports = extract(
            r#"
from . import siblings
from .services import billing

def handler():
    import json
    return json.dumps({})
"#,
        );
        assert_eq!(imports, vec!["services", "json"]);
    }

    #[test]
    fn test_multiple_names_in_one_statement() {
        let imports = extract("import a.b, c as d\n");
        assert_eq!(imports, vec!["a", "c"]);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = PythonExtractor::new().extract(Path::new("bad.py"), "def broken(:\n  pass\n");
        assert!(result.is_err());
    }
}
