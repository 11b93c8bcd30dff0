mod circular;
mod coupling;
mod graph;
mod metrics;

pub use circular::{Cycle, find_cycle_groups, find_cycles};
pub use coupling::{CouplingEntry, in_degrees, rank_coupling};
pub use graph::DependencyGraph;
pub use metrics::{RepoMetrics, TestCoverage};

use crate::config::Config;
use crate::fs::FileSystem;
use crate::model::AnalysisResult;
use crate::parser::ExtractorRegistry;
use crate::rules::{self, RuleContext, StackCategory};
use crate::scoring::{MaturityLevel, maturity_score};
use crate::walk;
use std::path::Path;
use tracing::info;

/// Run both pipelines over one walk of `path`.
///
/// `stack` describes the technology stack used for rule selection; when absent
/// it is inferred from the key files.
pub fn analyze(
    path: &Path,
    config: &Config,
    registry: &ExtractorRegistry,
    stack: Option<&str>,
    fs: &dyn FileSystem,
) -> AnalysisResult {
    let project_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("project")
        .to_string();

    let outcome = walk::walk(path, &config.scan);
    let stack = match stack {
        Some(s) => s.to_string(),
        None => rules::infer_stack_description(&outcome.key_files),
    };

    let (graph_part, rules_part) = rayon::join(
        || {
            let graph = DependencyGraph::build(&outcome.files, registry, config.scan.max_files);
            let cycles = find_cycles(&graph);
            let cycle_groups = find_cycle_groups(&graph);
            let coupling = rank_coupling(&graph, config.thresholds.coupling);
            (graph, cycles, cycle_groups, coupling)
        },
        || {
            let ctx = RuleContext::new(
                path,
                &outcome.key_files,
                &stack,
                fs,
                &config.scan.excluded_dirs,
                &config.thresholds,
            );
            let findings = rules::evaluate_rules(&rules::rules_for_stack(&stack), &ctx);
            let score = maturity_score(&findings);
            (findings, score)
        },
    );
    let (graph, cycles, cycle_groups, coupling) = graph_part;
    let (findings, maturity_score) = rules_part;

    info!(
        files = outcome.files.len(),
        cycles = cycles.len(),
        findings = findings.len(),
        score = maturity_score,
        "analysis complete"
    );

    AnalysisResult {
        project_name,
        stack_categories: StackCategory::detect(&stack),
        stack,
        files_scanned: outcome.discovered,
        truncated: outcome.truncated || graph.is_truncated(),
        metrics: RepoMetrics::compute(&outcome.files),
        cycles,
        cycle_groups,
        coupling,
        security_issues: rules::security_issues(&findings),
        maturity_level: MaturityLevel::from_score(maturity_score),
        maturity_score,
        findings,
        graph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::default_fs;
    use std::fs;

    #[test]
    fn test_analyze_runs_both_pipelines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "import b\n").unwrap();
        fs::write(dir.path().join("b.py"), "import a\n").unwrap();
        fs::write(dir.path().join("requirements.txt"), "fastapi\n").unwrap();

        let result = analyze(
            dir.path(),
            &Config::default(),
            &ExtractorRegistry::new(),
            None,
            default_fs(),
        );

        assert_eq!(result.files_scanned, 2);
        assert!(!result.truncated);
        assert_eq!(result.graph.len(), 2);
        assert!(!result.cycles.is_empty());
        assert_eq!(result.cycle_groups, vec![vec!["a.py", "b.py"]]);
        assert_eq!(result.stack, "Python, FastAPI");
        assert_eq!(
            result.stack_categories,
            vec![StackCategory::General, StackCategory::FastApi]
        );
        assert_eq!(result.findings.len(), 13);
        assert_eq!(result.metrics.total_files, 2);
    }
}
