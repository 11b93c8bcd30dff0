use crate::parser::{ImportExtractor, ParseError, root_segment};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static JAVA_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\s+([\w.]+);").unwrap());

/// Line-anchored `import a.b.c;` declarations in Java and Kotlin sources.
pub struct JavaExtractor;

impl JavaExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ImportExtractor for JavaExtractor {
    fn extensions(&self) -> &[&str] {
        &["java", "kt"]
    }

    fn extract(&self, _path: &Path, source: &str) -> Result<Vec<String>, ParseError> {
        Ok(JAVA_IMPORT_RE
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| root_segment(m.as_str(), '.'))
            .collect())
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}
