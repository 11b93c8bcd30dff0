use crate::model::SourceFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry-point file names, each counted as one deployable service.
const SERVICE_INDICATORS: &[&str] = &[
    "main.py",
    "app.py",
    "server.py",
    "index.js",
    "index.ts",
    "Application.java",
];

/// Share of source files that look like tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCoverage {
    /// More than 30% of files.
    Good,
    /// Between 10% and 30%.
    Moderate,
    /// Some test files, under 10%.
    Low,
    None,
}

impl TestCoverage {
    pub fn from_counts(test_files: usize, total_files: usize) -> Self {
        let ratio = test_files as f64 / total_files.max(1) as f64;
        if ratio > 0.3 {
            TestCoverage::Good
        } else if ratio > 0.1 {
            TestCoverage::Moderate
        } else if test_files > 0 {
            TestCoverage::Low
        } else {
            TestCoverage::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TestCoverage::Good => "good (>30% test files)",
            TestCoverage::Moderate => "moderate (10-30% test files)",
            TestCoverage::Low => "low (<10% test files)",
            TestCoverage::None => "none detected",
        }
    }
}

/// Size and shape figures for the walked source files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMetrics {
    pub total_files: usize,
    /// Non-blank lines.
    pub total_loc: usize,
    /// Language display name -> non-blank lines.
    pub languages: BTreeMap<String, usize>,
    pub service_count: usize,
    pub test_files: usize,
    pub test_coverage: TestCoverage,
}

impl RepoMetrics {
    pub fn compute(files: &[SourceFile]) -> Self {
        let mut languages = BTreeMap::new();
        let mut total_loc = 0;
        let mut test_files = 0;
        let mut service_count = 0;

        for file in files {
            let loc = file
                .content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count();
            total_loc += loc;
            *languages
                .entry(file.language.display_name().to_string())
                .or_insert(0) += loc;

            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            let lower = name.to_lowercase();
            if lower.contains("test") || lower.contains("spec") {
                test_files += 1;
            }
            if SERVICE_INDICATORS.contains(&name.as_ref()) {
                service_count += 1;
            }
        }

        Self {
            total_files: files.len(),
            total_loc,
            languages,
            service_count,
            test_files,
            test_coverage: TestCoverage::from_counts(test_files, files.len()),
        }
    }
}
