//! Library API for repoaudit.
//!
//! Unlike the CLI commands, which print and return exit codes, these functions
//! return `Result`s the caller can handle.
//!
//! # Example
//!
//! ```no_run
//! use repoaudit::{analyze, AnalysisOptions};
//! use std::path::Path;
//!
//! let result = analyze(Path::new("."), AnalysisOptions::default())?;
//! println!("maturity: {}/100", result.maturity_score);
//! for cycle in &result.cycles {
//!     println!("cycle: {}", cycle.join(" -> "));
//! }
//! # Ok::<(), repoaudit::RepoAuditError>(())
//! ```

use crate::analysis;
use crate::config::{Config, ConfigError};
use crate::fs::{FileSystem, default_fs};
use crate::model::AnalysisResult;
use crate::parser::ExtractorRegistry;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoAuditError {
    /// The repository root does not exist or cannot be resolved.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-call overrides on top of `.repoaudit.toml` and the environment.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Stack description for rule selection; inferred from key files when
    /// `None`.
    pub stack: Option<String>,

    /// Languages whose imports feed the graph (empty means all supported).
    pub languages: Vec<String>,

    /// Extra directory names to skip.
    pub exclude: Vec<String>,

    pub max_files: Option<usize>,

    pub coupling_threshold: Option<usize>,
}

/// Resolve the repository root, failing on anything that is not a directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf, RepoAuditError> {
    let resolved = path
        .canonicalize()
        .map_err(|_| RepoAuditError::PathNotFound(path.to_path_buf()))?;
    if !resolved.is_dir() {
        return Err(RepoAuditError::NotADirectory(path.to_path_buf()));
    }
    Ok(resolved)
}

/// Load the effective configuration for `root`: file, then environment, then
/// `options`.
pub fn load_config(root: &Path, options: &AnalysisOptions) -> Result<Config, RepoAuditError> {
    Ok(with_overrides(Config::load(root)?, options))
}

/// Layer the environment and then `options` over `config`.
pub fn with_overrides(mut config: Config, options: &AnalysisOptions) -> Config {
    config.apply_env();
    apply_options(&mut config, options);
    config
}

pub fn apply_options(config: &mut Config, options: &AnalysisOptions) {
    if let Some(n) = options.max_files {
        config.scan.max_files = n;
    }
    if let Some(n) = options.coupling_threshold {
        config.thresholds.coupling = n;
    }
    config.scan.excluded_dirs.extend(options.exclude.iter().cloned());
}

/// Analyze the repository at `path`.
///
/// An invalid root is the only failure; unreadable files, rule failures and
/// limit truncation are absorbed into the result.
pub fn analyze(path: &Path, options: AnalysisOptions) -> Result<AnalysisResult, RepoAuditError> {
    let root = resolve_root(path)?;
    let config = load_config(&root, &options)?;
    Ok(analyze_root(&root, &config, &options, default_fs()))
}

/// Extractors for the requested languages, or all of them.
pub fn registry_for(options: &AnalysisOptions) -> ExtractorRegistry {
    if options.languages.is_empty() {
        ExtractorRegistry::new()
    } else {
        ExtractorRegistry::with_languages(&options.languages)
    }
}

/// Analyze an already resolved root with an already layered config.
pub fn analyze_root(
    root: &Path,
    config: &Config,
    options: &AnalysisOptions,
    fs: &dyn FileSystem,
) -> AnalysisResult {
    analysis::analyze(
        root,
        config,
        &registry_for(options),
        options.stack.as_deref(),
        fs,
    )
}
