//! Repository tree walk.
//!
//! One parallel pass over the tree collects every recognized source file (up
//! to a global ceiling shared by all walker threads) and the content of the
//! configured key files.

use crate::config::ScanConfig;
use crate::model::{Language, SourceFile, normalize_path};
use ignore::{DirEntry, WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Source files sorted by relative path.
    pub files: Vec<SourceFile>,
    /// `"\n### FILE: <name>\n<content>"` sections for every key file found.
    pub key_files: String,
    pub key_file_paths: Vec<String>,
    /// Number of source files accepted before the ceiling applied.
    pub discovered: usize,
    /// Source files beyond the ceiling were left out.
    pub truncated: bool,
}

enum Found {
    Source(SourceFile),
    Key(PathBuf, String),
}

fn build_walker(root: &Path, config: &ScanConfig) -> WalkBuilder {
    let excluded = config.excluded_dirs.clone();
    let gitignore = config.respect_gitignore;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(gitignore)
        .git_exclude(gitignore)
        .git_global(gitignore)
        .ignore(gitignore)
        .parents(false)
        // directory depth counts from the root, files sit one level below
        .max_depth(Some(config.max_depth + 1))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && excluded.iter().any(|d| entry.file_name() == d.as_str()))
        });
    builder
}

fn read_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unreadable file skipped");
            None
        }
    }
}

fn within_size(entry: &DirEntry, max: u64) -> bool {
    match entry.metadata() {
        Ok(meta) if meta.len() > max => {
            debug!(path = %entry.path().display(), size = meta.len(), "oversized file skipped");
            false
        }
        Ok(_) => true,
        Err(e) => {
            debug!(path = %entry.path().display(), error = %e, "metadata unavailable");
            false
        }
    }
}

/// Walk `root` according to `config`.
pub fn walk(root: &Path, config: &ScanConfig) -> WalkOutcome {
    let accepted = AtomicUsize::new(0);
    let truncated = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<Found>();

    build_walker(root, config).build_parallel().run(|| {
        let tx = tx.clone();
        let accepted = &accepted;
        let truncated = &truncated;
        Box::new(move |result| {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "walk error");
                    return WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                return WalkState::Continue;
            }

            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            let name = entry.file_name().to_string_lossy();

            if config.key_files.iter().any(|k| *k == name)
                && within_size(&entry, config.max_file_size)
            {
                if let Some(content) = read_lossy(path) {
                    let _ = tx.send(Found::Key(rel.clone(), content));
                }
            }

            let Some(language) = Language::from_path(path) else {
                return WalkState::Continue;
            };
            if !within_size(&entry, config.max_file_size) {
                return WalkState::Continue;
            }

            // past the ceiling only key files are still collected
            if accepted.fetch_add(1, Ordering::SeqCst) >= config.max_files {
                truncated.store(true, Ordering::SeqCst);
                return WalkState::Continue;
            }

            if let Some(content) = read_lossy(path) {
                let _ = tx.send(Found::Source(SourceFile::new(rel, language, content)));
            }
            WalkState::Continue
        })
    });
    drop(tx);

    let mut files = Vec::new();
    let mut keys = Vec::new();
    for found in rx {
        match found {
            Found::Source(file) => files.push(file),
            Found::Key(path, content) => keys.push((path, content)),
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    keys.sort_by(|a, b| a.0.cmp(&b.0));

    let truncated = truncated.load(Ordering::SeqCst);
    if truncated {
        warn!(limit = config.max_files, "max file limit reached, scan truncated");
    }

    let mut key_files = String::new();
    let mut key_file_paths = Vec::with_capacity(keys.len());
    for (path, content) in keys {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        key_files.push_str(&format!("\n### FILE: {}\n{}", name, content));
        key_file_paths.push(normalize_path(&path));
    }

    let discovered = accepted.load(Ordering::SeqCst).min(config.max_files);
    info!(files = files.len(), root = %root.display(), "repository walked");

    WalkOutcome {
        files,
        key_files,
        key_file_paths,
        discovered,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_walk_collects_sources_and_key_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app/main.py", "import os\n");
        write(dir.path(), "lib.js", "const x = 1;\n");
        write(dir.path(), "requirements.txt", "fastapi\n");
        write(dir.path(), "notes.txt", "not source\n");
        write(dir.path(), "node_modules/pkg/index.js", "module.exports = {};\n");

        let outcome = walk(dir.path(), &ScanConfig::default());
        let ids: Vec<String> = outcome.files.iter().map(|f| f.id()).collect();

        assert_eq!(ids, vec!["app/main.py", "lib.js"]);
        assert!(!outcome.truncated);
        assert_eq!(outcome.discovered, 2);
        // key files match at any depth
        assert_eq!(
            outcome.key_files,
            "\n### FILE: main.py\nimport os\n\n### FILE: requirements.txt\nfastapi\n"
        );
        assert_eq!(outcome.key_file_paths, vec!["app/main.py", "requirements.txt"]);
    }

    #[test]
    fn test_ceiling_is_global() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..12 {
            write(dir.path(), &format!("pkg{}/mod{}.py", i % 4, i), "x = 1\n");
        }
        let config = ScanConfig {
            max_files: 5,
            ..ScanConfig::default()
        };

        let outcome = walk(dir.path(), &config);
        assert!(outcome.truncated);
        assert_eq!(outcome.discovered, 5);
        assert!(outcome.files.len() <= 5);
    }

    #[test]
    fn test_key_files_survive_the_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            write(dir.path(), &format!("pkg{}/mod{}.py", i % 3, i), "x = 1\n");
        }
        write(dir.path(), "zz/deploy/requirements.txt", "fastapi\n");
        write(dir.path(), "zz/Dockerfile", "FROM python:3.12\n");
        let config = ScanConfig {
            max_files: 1,
            ..ScanConfig::default()
        };

        for _ in 0..3 {
            let outcome = walk(dir.path(), &config);
            assert!(outcome.truncated);
            assert_eq!(outcome.files.len(), 1);
            assert_eq!(
                outcome.key_file_paths,
                vec!["zz/Dockerfile", "zz/deploy/requirements.txt"]
            );
        }
    }

    #[test]
    fn test_size_and_depth_limits() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "small.py", "x = 1\n");
        write(dir.path(), "big.py", &"x = 1\n".repeat(100));
        write(dir.path(), "a/b/c/deep.py", "x = 1\n");

        let config = ScanConfig {
            max_file_size: 50,
            max_depth: 2,
            ..ScanConfig::default()
        };
        let outcome = walk(dir.path(), &config);
        let ids: Vec<String> = outcome.files.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["small.py"]);
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("latin.py"), b"name = '\xe9'\n").unwrap();

        let outcome = walk(dir.path(), &ScanConfig::default());
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].content.contains('\u{FFFD}'));
    }
}
