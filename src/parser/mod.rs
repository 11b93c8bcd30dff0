mod common;
mod java;
mod javascript;
mod python;
mod rust;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub use common::root_segment;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
pub use python::PythonExtractor;
pub use rust::RustExtractor;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse: {0}")]
    Parse(String),
    #[error("Unsupported language for file: {0}")]
    UnsupportedLanguage(String),
}

/// Turns one file's text into the module names it imports.
///
/// Names are reported whether or not they resolve inside the repository;
/// duplicates are allowed and order follows the source.
pub trait ImportExtractor: Send + Sync {
    fn extensions(&self) -> &[&str];
    fn extract(&self, path: &Path, source: &str) -> Result<Vec<String>, ParseError>;
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ImportExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(PythonExtractor::new()),
                Box::new(JavaScriptExtractor::new()),
                Box::new(JavaExtractor::new()),
                Box::new(RustExtractor::new()),
            ],
        }
    }

    pub fn with_languages(languages: &[String]) -> Self {
        let mut extractors: Vec<Box<dyn ImportExtractor>> = Vec::new();

        for lang in languages {
            match lang.to_lowercase().as_str() {
                "python" | "py" => extractors.push(Box::new(PythonExtractor::new())),
                "typescript" | "ts" | "javascript" | "js" => {
                    extractors.push(Box::new(JavaScriptExtractor::new()))
                }
                "java" | "kotlin" | "kt" => extractors.push(Box::new(JavaExtractor::new())),
                "rust" | "rs" => extractors.push(Box::new(RustExtractor::new())),
                _ => {}
            }
        }

        if extractors.is_empty() {
            return Self::new();
        }

        Self { extractors }
    }

    pub fn find_extractor(&self, path: &Path) -> Option<&dyn ImportExtractor> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extractors
            .iter()
            .find(|e| e.extensions().contains(&ext.as_str()))
            .map(|e| e.as_ref())
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.find_extractor(path).is_some()
    }

    pub fn try_extract(&self, path: &Path, source: &str) -> Result<Vec<String>, ParseError> {
        let extractor = self
            .find_extractor(path)
            .ok_or_else(|| ParseError::UnsupportedLanguage(path.display().to_string()))?;
        extractor.extract(path, source)
    }

    /// Run the matching extractor. Files without one, and files that fail to
    /// parse, contribute no imports.
    pub fn extract_imports(&self, path: &Path, source: &str) -> Vec<String> {
        match self.try_extract(path, source) {
            Ok(imports) => imports,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot extract imports");
                Vec::new()
            }
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dispatches_by_extension() {
        let registry = ExtractorRegistry::new();
        assert!(registry.supports(Path::new("app/main.py")));
        assert!(registry.supports(Path::new("web/index.TSX")));
        assert!(registry.supports(Path::new("Main.kt")));
        assert!(!registry.supports(Path::new("README.md")));
        assert!(!registry.supports(Path::new("Makefile")));
    }

    #[test]
    fn test_unregistered_extension_yields_nothing() {
        let registry = ExtractorRegistry::new();
        assert!(registry.extract_imports(Path::new("main.go"), "import \"fmt\"").is_empty());
        assert!(matches!(
            registry.try_extract(Path::new("main.go"), ""),
            Err(ParseError::UnsupportedLanguage(p)) if p == "main.go"
        ));
    }

    #[test]
    fn test_parse_failure_yields_empty_list() {
        let registry = ExtractorRegistry::new();
        let imports = registry.extract_imports(Path::new("broken.py"), "import os\ndef (:\n");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_with_languages_falls_back_to_all() {
        let registry = ExtractorRegistry::with_languages(&["cobol".to_string()]);
        assert!(registry.supports(Path::new("a.py")));

        let registry = ExtractorRegistry::with_languages(&["python".to_string()]);
        assert!(registry.supports(Path::new("a.py")));
        assert!(!registry.supports(Path::new("a.js")));
    }
}
