mod finding;
mod source;

pub use finding::{Finding, Severity};
pub use source::{Language, SourceFile, normalize_path};

use crate::analysis::{CouplingEntry, Cycle, DependencyGraph, RepoMetrics};
use crate::rules::StackCategory;
use crate::scoring::MaturityLevel;
use serde::Serialize;

/// Everything one analysis run hands to a report consumer.
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub project_name: String,
    /// Stack description the rule selection was based on.
    pub stack: String,
    pub stack_categories: Vec<StackCategory>,
    /// Source files picked up by the walk. Equals the configured ceiling when
    /// `truncated` is set.
    pub files_scanned: usize,
    pub truncated: bool,
    pub graph: DependencyGraph,
    pub cycles: Vec<Cycle>,
    pub cycle_groups: Vec<Vec<String>>,
    pub coupling: Vec<CouplingEntry>,
    pub findings: Vec<Finding>,
    pub maturity_score: u8,
    pub maturity_level: MaturityLevel,
    pub security_issues: Vec<String>,
    pub metrics: RepoMetrics,
}

impl AnalysisResult {
    pub fn failed_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.passed)
    }

    /// True when a failing finding at `Critical` is present.
    pub fn has_critical_failures(&self) -> bool {
        self.failed_findings()
            .any(|f| f.severity == Severity::Critical)
    }
}
