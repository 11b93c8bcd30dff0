use crate::parser::{ImportExtractor, ParseError, root_segment};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `import ... from "path"` and `require("path")`, one statement per line.
static JS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+.*?\s+from\s+['"]([^'"]+)['"]|require\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .unwrap()
});

/// Regex-based extractor for JavaScript and TypeScript modules.
///
/// Module specifiers are string literals, so the reported name is the first
/// `/`-separated segment (`lodash/fp` -> `lodash`, `./utils` -> `.`).
pub struct JavaScriptExtractor;

impl JavaScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ImportExtractor for JavaScriptExtractor {
    fn extensions(&self) -> &[&str] {
        &["js", "jsx", "ts", "tsx", "mjs", "cjs"]
    }

    fn extract(&self, _path: &Path, source: &str) -> Result<Vec<String>, ParseError> {
        let imports = JS_IMPORT_RE
            .captures_iter(source)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .filter_map(|m| root_segment(m.as_str(), '/'))
            .collect();

        Ok(imports)
    }
}

impl Default for JavaScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<String> {
        JavaScriptExtractor::new()
            .extract(Path::new("index.ts"), source)
            .unwrap()
    }

    #[test]
    fn test_import_from_and_require() {
        let imports = extract(
            r#"
import React from 'react';
import { debounce } from "lodash/fp";
import type { User } from "models/user";
const express = require('express');
const db = require ( "db/client" );
"#,
        );
        assert_eq!(imports, vec!["react", "lodash", "models", "express", "db"]);
    }

    #[test]
    fn test_relative_specifier_keeps_first_segment() {
        let imports = extract("import { helper } from './utils/helper';\n");
        assert_eq!(imports, vec!["."]);
    }

    #[test]
    fn test_side_effect_import_is_ignored() {
        // no `from` clause and no require call
        assert!(extract("import './styles.css';\n").is_empty());
    }
}
