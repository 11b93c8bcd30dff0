//! Filesystem access for rule checks.
//!
//! Rules only talk to the disk through the `FileSystem` trait, so their
//! detection logic can run against an in-memory tree in tests.

use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read at most `limit` bytes of a file, replacing invalid UTF-8.
    fn read_prefix(&self, path: &Path, limit: usize) -> io::Result<String>;

    /// Write content to a file, creating it if it doesn't exist.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Every file below `root`, sorted by path, skipping directories whose
    /// name is in `excluded_dirs`.
    fn list_files(&self, root: &Path, excluded_dirs: &[String]) -> Vec<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> io::Result<String> {
        use std::io::Read;

        let mut buf = Vec::new();
        std::fs::File::open(path)?
            .take(limit as u64)
            .read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn list_files(&self, root: &Path, excluded_dirs: &[String]) -> Vec<PathBuf> {
        let excluded = excluded_dirs.to_vec();
        let mut files: Vec<PathBuf> = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && excluded.iter().any(|d| entry.file_name() == d.as_str()))
            })
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }
}

/// Shared real filesystem for callers that don't inject one.
pub fn default_fs() -> &'static RealFs {
    static INSTANCE: RealFs = RealFs;
    &INSTANCE
}
