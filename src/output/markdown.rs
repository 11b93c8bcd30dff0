use crate::model::{AnalysisResult, Finding};
use crate::output::OutputFormatter;
use crate::scoring::MaturityLevel;
use std::io::Write;

pub struct MarkdownOutput {
    /// Include passing findings in the findings table.
    pub show_passed: bool,
}

impl MarkdownOutput {
    pub fn new(show_passed: bool) -> Self {
        Self { show_passed }
    }
}

impl Default for MarkdownOutput {
    fn default() -> Self {
        Self::new(true)
    }
}

fn level_marker(level: MaturityLevel) -> &'static str {
    match level {
        MaturityLevel::Strong => "🟢",
        MaturityLevel::Fair => "🟡",
        MaturityLevel::Weak => "🟠",
        MaturityLevel::Poor => "🔴",
    }
}

fn finding_row<W: Write>(writer: &mut W, finding: &Finding) -> std::io::Result<()> {
    let status = if finding.passed { "✅" } else { "❌" };
    let evidence = if finding.evidence.is_empty() {
        String::new()
    } else {
        finding
            .evidence
            .iter()
            .map(|e| format!("`{}`", e))
            .collect::<Vec<_>>()
            .join(", ")
    };
    writeln!(
        writer,
        "| {} | `{}` | {} | {} | {} |",
        status,
        finding.rule_name,
        finding.severity,
        finding.description.replace('|', "\\|"),
        evidence
    )
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Repository Audit: {}\n", result.project_name)?;

        writeln!(
            writer,
            "**Maturity score:** {} {}/100 ({})\n",
            level_marker(result.maturity_level),
            result.maturity_score,
            result.maturity_level.label()
        )?;
        writeln!(writer, "- Stack: {}", result.stack)?;
        writeln!(writer, "- Source files scanned: {}", result.files_scanned)?;
        writeln!(
            writer,
            "- Lines of code: {} ({} test files, coverage {})",
            result.metrics.total_loc,
            result.metrics.test_files,
            result.metrics.test_coverage.label()
        )?;
        if result.truncated {
            writeln!(
                writer,
                "\n> ⚠️ File limit reached: results cover a partial scan of the repository."
            )?;
        }

        // Findings, failures first
        writeln!(writer, "\n## Findings\n")?;
        writeln!(writer, "| | Rule | Severity | Description | Evidence |")?;
        writeln!(writer, "|---|---|---|---|---|")?;
        let mut failed: Vec<&Finding> = result.failed_findings().collect();
        failed.sort_by(|a, b| b.severity.cmp(&a.severity));
        for finding in failed {
            finding_row(writer, finding)?;
        }
        if self.show_passed {
            for finding in result.findings.iter().filter(|f| f.passed) {
                finding_row(writer, finding)?;
            }
        }

        let recommendations: Vec<&Finding> = result
            .failed_findings()
            .filter(|f| f.recommendation.is_some())
            .collect();
        if !recommendations.is_empty() {
            writeln!(writer, "\n## Recommendations\n")?;
            for finding in recommendations {
                if let Some(rec) = &finding.recommendation {
                    writeln!(writer, "- **{}** ({}): {}", finding.rule_name, finding.severity, rec)?;
                }
            }
        }

        if !result.security_issues.is_empty() {
            writeln!(writer, "\n## Security Issues\n")?;
            for issue in &result.security_issues {
                writeln!(writer, "- ⚠️ {}", issue)?;
            }
        }

        writeln!(writer, "\n## Dependency Graph\n")?;
        if result.graph.is_empty() {
            writeln!(writer, "No internal dependencies detected.")?;
        } else {
            for (path, names) in result.graph.iter() {
                let names: Vec<_> = names.iter().map(|n| format!("`{}`", n)).collect();
                writeln!(writer, "- `{}` → [{}]", path, names.join(", "))?;
            }
        }

        if !result.cycles.is_empty() {
            writeln!(writer, "\n### 🔴 Circular Dependencies\n")?;
            for group in &result.cycle_groups {
                writeln!(writer, "- {}", group.join(", "))?;
            }
            writeln!(writer, "\nCycles as traversed:\n")?;
            for cycle in &result.cycles {
                writeln!(writer, "- {}", cycle.join(" → "))?;
            }
        }

        if !result.coupling.is_empty() {
            writeln!(writer, "\n### 🟡 Highly Coupled Modules\n")?;
            for entry in &result.coupling {
                writeln!(
                    writer,
                    "- `{}` imported by {} files",
                    entry.name, entry.in_degree
                )?;
            }
        }

        if !result.metrics.languages.is_empty() {
            writeln!(writer, "\n## Languages\n")?;
            for (language, loc) in &result.metrics.languages {
                writeln!(writer, "- {}: {} lines", language, loc)?;
            }
        }

        Ok(())
    }
}
