use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source languages recognized by the tree walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    Rust,
    Go,
    Ruby,
    Php,
    CSharp,
    Scala,
    Swift,
    C,
    Cpp,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_ascii_lowercase().as_str() {
            "py" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "kt" => Language::Kotlin,
            "rs" => Language::Rust,
            "go" => Language::Go,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "cs" => Language::CSharp,
            "scala" => Language::Scala,
            "swift" => Language::Swift,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            _ => return None,
        };
        Some(lang)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Human readable name, used as the key of per-language metrics.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::Kotlin => "Kotlin",
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::CSharp => "C#",
            Language::Scala => "Scala",
            Language::Swift => "Swift",
            Language::C => "C",
            Language::Cpp => "C++",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One file produced by the tree walk.
///
/// `path` is relative to the repository root and is the file's identity.
/// `content` is already bounded by the configured size cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: Language, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language,
            content: content.into(),
        }
    }

    /// Repository-relative path with `/` separators on every platform.
    pub fn id(&self) -> String {
        normalize_path(&self.path)
    }
}

/// Render a relative path with forward slashes.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("TSX"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("md"), None);
    }

    #[test]
    fn test_source_file_identity() {
        let file = SourceFile::new(
            PathBuf::from("pkg").join("models.py"),
            Language::Python,
            "",
        );
        assert_eq!(file.id(), "pkg/models.py");
    }
}
