use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".repoaudit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scan: ScanConfig,
    pub thresholds: Thresholds,
}

/// Limits and filters applied by the tree walker.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub max_files: usize,
    pub max_file_size: u64,
    pub max_depth: usize,
    pub excluded_dirs: Vec<String>,
    /// File names whose content is gathered into the key-files blob.
    pub key_files: Vec<String>,
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Minimum in-degree for a name to be reported as highly coupled.
    pub coupling: usize,
    pub content_scan_max_bytes: usize,
    pub content_scan_max_files: usize,
    pub readme_min_bytes: u64,
    /// Minimum quoted literal length the secret scan reacts to.
    pub secret_min_len: usize,
}

const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    "env",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "dist",
    "build",
    ".eggs",
    ".idea",
    ".vscode",
    "target",
];

const DEFAULT_KEY_FILES: &[&str] = &[
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "package.json",
    "pom.xml",
    "build.gradle",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "README.md",
    "main.py",
    "app.py",
    "manage.py",
    "Makefile",
    ".env.example",
    "tsconfig.json",
    "go.mod",
    "Cargo.toml",
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: 2000,
            max_file_size: 500_000,
            max_depth: 12,
            excluded_dirs: owned(DEFAULT_EXCLUDED_DIRS),
            key_files: owned(DEFAULT_KEY_FILES),
            respect_gitignore: false,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            coupling: 5,
            content_scan_max_bytes: 200_000,
            content_scan_max_files: 2000,
            readme_min_bytes: 100,
            secret_min_len: 8,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    scan: Option<RawScan>,
    thresholds: Option<RawThresholds>,
}

#[derive(Debug, Deserialize)]
struct RawScan {
    max_files: Option<usize>,
    max_file_size: Option<u64>,
    max_depth: Option<usize>,
    excluded_dirs: Option<Vec<String>>,
    /// Added on top of `excluded_dirs` instead of replacing it.
    extra_excluded_dirs: Option<Vec<String>>,
    key_files: Option<Vec<String>>,
    respect_gitignore: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawThresholds {
    coupling: Option<usize>,
    content_scan_max_bytes: Option<usize>,
    content_scan_max_files: Option<usize>,
    readme_min_bytes: Option<u64>,
    secret_min_len: Option<usize>,
}

impl Config {
    /// Load `.repoaudit.toml` from the project root. A missing file yields the
    /// defaults; every key is optional.
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let scan = match raw.scan {
            Some(s) => {
                let mut excluded_dirs = s.excluded_dirs.unwrap_or(defaults.scan.excluded_dirs);
                excluded_dirs.extend(s.extra_excluded_dirs.unwrap_or_default());
                ScanConfig {
                    max_files: s.max_files.unwrap_or(defaults.scan.max_files),
                    max_file_size: s.max_file_size.unwrap_or(defaults.scan.max_file_size),
                    max_depth: s.max_depth.unwrap_or(defaults.scan.max_depth),
                    excluded_dirs,
                    key_files: s.key_files.unwrap_or(defaults.scan.key_files),
                    respect_gitignore: s
                        .respect_gitignore
                        .unwrap_or(defaults.scan.respect_gitignore),
                }
            }
            None => defaults.scan,
        };

        let d = defaults.thresholds;
        let thresholds = match raw.thresholds {
            Some(t) => Thresholds {
                coupling: t.coupling.unwrap_or(d.coupling),
                content_scan_max_bytes: t.content_scan_max_bytes.unwrap_or(d.content_scan_max_bytes),
                content_scan_max_files: t.content_scan_max_files.unwrap_or(d.content_scan_max_files),
                readme_min_bytes: t.readme_min_bytes.unwrap_or(d.readme_min_bytes),
                secret_min_len: t.secret_min_len.unwrap_or(d.secret_min_len),
            },
            None => d,
        };

        Ok(Self { scan, thresholds })
    }

    /// Apply `REPOAUDIT_MAX_FILES` / `REPOAUDIT_COUPLING_THRESHOLD` overrides.
    /// Unparseable values are ignored with a warning.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = parse_override(&lookup, "REPOAUDIT_MAX_FILES") {
            self.scan.max_files = n;
        }
        if let Some(n) = parse_override(&lookup, "REPOAUDIT_COUPLING_THRESHOLD") {
            self.thresholds.coupling = n;
        }
    }
}

fn parse_override<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = %value, "ignoring invalid override");
            None
        }
    }
}

/// Commented starter config written by `repoaudit init`.
pub fn generate_config_template() -> String {
    let s = ScanConfig::default();
    let t = Thresholds::default();
    let quoted = |list: &[String]| {
        list.iter()
            .map(|d| format!("\"{}\"", d))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"# repoaudit configuration. Every key is optional.

[scan]
# Source files walked per scan; the walk stops silently beyond this.
max_files = {max_files}
# Files larger than this (bytes) are skipped.
max_file_size = {max_file_size}
max_depth = {max_depth}
# Replaces the built-in list. Use extra_excluded_dirs to extend it instead.
# excluded_dirs = [{excluded}]
# extra_excluded_dirs = ["generated"]
respect_gitignore = {respect_gitignore}

[thresholds]
# In-degree at which a module is reported as highly coupled.
coupling = {coupling}
content_scan_max_bytes = {max_bytes}
content_scan_max_files = {max_scan_files}
readme_min_bytes = {readme}
secret_min_len = {secret}
"#,
        max_files = s.max_files,
        max_file_size = s.max_file_size,
        max_depth = s.max_depth,
        excluded = quoted(&s.excluded_dirs),
        respect_gitignore = s.respect_gitignore,
        coupling = t.coupling,
        max_bytes = t.content_scan_max_bytes,
        max_scan_files = t.content_scan_max_files,
        readme = t.readme_min_bytes,
        secret = t.secret_min_len,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.max_files, 2000);
        assert_eq!(config.scan.max_file_size, 500_000);
        assert_eq!(config.scan.max_depth, 12);
        assert!(config.scan.excluded_dirs.iter().any(|d| d == "node_modules"));
        assert_eq!(config.thresholds.coupling, 5);
        assert_eq!(config.thresholds.content_scan_max_bytes, 200_000);
        assert_eq!(config.thresholds.content_scan_max_files, 2000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
[scan]
max_files = 50
extra_excluded_dirs = ["generated"]

[thresholds]
coupling = 3
"#,
        )
        .unwrap();

        assert_eq!(config.scan.max_files, 50);
        assert_eq!(config.scan.max_depth, 12);
        assert!(config.scan.excluded_dirs.iter().any(|d| d == ".git"));
        assert!(config.scan.excluded_dirs.iter().any(|d| d == "generated"));
        assert_eq!(config.thresholds.coupling, 3);
        assert_eq!(config.thresholds.readme_min_bytes, 100);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("[scan\nmax_files = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "REPOAUDIT_MAX_FILES" => Some("10".to_string()),
            "REPOAUDIT_COUPLING_THRESHOLD" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.scan.max_files, 10);
        assert_eq!(config.thresholds.coupling, 5);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::from_toml(&generate_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.scan.max_files, defaults.scan.max_files);
        assert_eq!(config.scan.excluded_dirs, defaults.scan.excluded_dirs);
        assert_eq!(config.thresholds.coupling, defaults.thresholds.coupling);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.scan.max_files, 2000);
    }
}
