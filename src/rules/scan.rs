use super::RuleContext;
use crate::model::normalize_path;
use regex::Regex;
use tracing::debug;

/// Extensions scanned when a rule does not name its own.
pub const SOURCE_EXTENSIONS: &[&str] = &["py", "js", "ts", "java"];

/// Relative paths of files whose content matches `pattern`.
///
/// Only files with one of `extensions` are opened, at most
/// `content_scan_max_files` of them, and only the first
/// `content_scan_max_bytes` of each is searched. Hitting the file cap ends the
/// scan with whatever matched so far. Unreadable files are skipped.
pub fn find_matching_files(ctx: &RuleContext, pattern: &Regex, extensions: &[&str]) -> Vec<String> {
    let max_files = ctx.thresholds.content_scan_max_files;
    let max_bytes = ctx.thresholds.content_scan_max_bytes;

    let mut candidates = ctx.files().iter().filter(|path| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    });

    let mut matches = Vec::new();
    for path in candidates.by_ref().take(max_files) {
        let content = match ctx.fs.read_prefix(path, max_bytes) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        if pattern.is_match(&content) {
            let rel = path.strip_prefix(ctx.root).unwrap_or(path);
            matches.push(normalize_path(rel));
        }
    }

    if candidates.next().is_some() {
        debug!(limit = max_files, pattern = pattern.as_str(), "content scan capped");
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::fs::mock::MockFs;
    use std::path::Path;

    #[test]
    fn test_scan_filters_by_extension_and_excluded_dirs() {
        let fs = MockFs::with_files([
            ("/repo/app/views.py", "def test_views(): pass"),
            ("/repo/README.md", "def test_docs(): pass"),
            ("/repo/venv/lib/site.py", "def test_site(): pass"),
            ("/repo/web/App.JS", "describe('app', () => {})"),
        ]);
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(
            Path::new("/repo"),
            "",
            "",
            &fs,
            &["venv".to_string()],
            &thresholds,
        );

        let re = Regex::new(r"(?i)def test_|describe\(").unwrap();
        assert_eq!(
            find_matching_files(&ctx, &re, SOURCE_EXTENSIONS),
            vec!["app/views.py", "web/App.JS"]
        );
    }

    #[test]
    fn test_scan_respects_caps() {
        let fs = MockFs::with_files([
            ("/repo/a.py", "x = 1"),
            ("/repo/b.py", "secret"),
            ("/repo/c.py", format!("{}secret", "x".repeat(64)).as_str()),
        ]);
        let thresholds = Thresholds {
            content_scan_max_files: 2,
            content_scan_max_bytes: 32,
            ..Thresholds::default()
        };
        let ctx = RuleContext::new(Path::new("/repo"), "", "", &fs, &[], &thresholds);

        let re = Regex::new("secret").unwrap();
        // c.py is beyond the file cap; its match is also beyond the byte cap
        assert_eq!(find_matching_files(&ctx, &re, &["py"]), vec!["b.py"]);
    }
}
