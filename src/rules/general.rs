//! Repository hygiene rules: docs, tests, containers, linting, CI.

use super::scan::{SOURCE_EXTENSIONS, find_matching_files};
use super::{RuleContext, RuleError, evidence};
use crate::model::{Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

static TEST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(def test_|\bit\(|\bdescribe\(|@Test)").unwrap());

const README_NAMES: &[&str] = &["README.md", "readme.md", "README.rst", "README.txt"];

const TEST_DIRS: &[&str] = &["tests", "test", "__tests__", "spec"];

const CONTAINER_FILES: &[&str] = &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"];

/// Project config that only counts as linting config when it mentions a linter.
const GENERIC_CONFIG: &str = "pyproject.toml";

const LINT_FILES: &[&str] = &[
    ".flake8",
    ".pylintrc",
    GENERIC_CONFIG,
    "setup.cfg",
    "ruff.toml",
    ".ruff.toml",
    ".eslintrc.js",
    ".eslintrc.json",
    ".eslintrc.yml",
    "eslint.config.js",
    "eslint.config.mjs",
    ".prettierrc",
    ".prettierrc.json",
    "biome.json",
    "checkstyle.xml",
    "rustfmt.toml",
    ".rustfmt.toml",
    "clippy.toml",
    ".golangci.yml",
];

const LINT_TOOLS: &[&str] = &["ruff", "flake8", "pylint", "black"];

const CI_MARKERS: &[&str] = &[
    ".github/workflows",
    ".gitlab-ci.yml",
    "Jenkinsfile",
    ".circleci",
    ".travis.yml",
    "azure-pipelines.yml",
    "bitbucket-pipelines.yml",
];

pub(super) fn check_readme(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let Some(readme) = ctx.first_file(README_NAMES) else {
        return Ok(Finding::fail("readme", Severity::High, "No README found").with_recommendation(
            "Add a README with project description, setup, and usage instructions.",
        ));
    };

    let size = ctx.fs.file_size(&ctx.root.join(readme)).unwrap_or(0);
    if size < ctx.thresholds.readme_min_bytes {
        return Ok(
            Finding::fail("readme", Severity::Medium, "README exists but is very short")
                .with_evidence([readme])
                .with_recommendation(
                    "Expand README with setup instructions, architecture overview, and usage examples.",
                ),
        );
    }

    Ok(
        Finding::pass("readme", "README is present and has meaningful content")
            .with_evidence([readme]),
    )
}

pub(super) fn check_tests(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let test_dir = ctx.first_dir(TEST_DIRS);
    let test_files = find_matching_files(ctx, &TEST_PATTERN, SOURCE_EXTENSIONS);

    if test_dir.is_none() && test_files.is_empty() {
        return Ok(Finding::fail(
            "tests",
            Severity::High,
            "No test files or test directory found",
        )
        .with_recommendation(
            "Add unit tests. Consider pytest (Python), Jest (JS), or JUnit (Java).",
        ));
    }

    let found = Finding::pass(
        "tests",
        format!("Tests found ({} file(s) with test patterns)", test_files.len()),
    );
    Ok(match test_dir {
        Some(dir) => found.with_evidence([dir]),
        None => found.with_evidence(evidence(&test_files, 5)),
    })
}

pub(super) fn check_containerization(ctx: &RuleContext) -> Result<Finding, RuleError> {
    Ok(match ctx.first_file(CONTAINER_FILES) {
        Some(file) => {
            Finding::pass("containerization", "Docker configuration found").with_evidence([file])
        }
        None => Finding::fail(
            "containerization",
            Severity::Low,
            "No Dockerfile or docker-compose found",
        )
        .with_recommendation("Consider adding Docker support for consistent deployments."),
    })
}

pub(super) fn check_linting(ctx: &RuleContext) -> Result<Finding, RuleError> {
    for name in LINT_FILES {
        let path = ctx.root.join(name);
        if !ctx.fs.is_file(&path) {
            continue;
        }

        if *name != GENERIC_CONFIG {
            return Ok(Finding::pass("linting", "Linting configuration found").with_evidence([*name]));
        }

        // an unreadable pyproject simply doesn't count
        let content = ctx
            .fs
            .read_prefix(&path, ctx.thresholds.content_scan_max_bytes)
            .unwrap_or_default();
        if LINT_TOOLS.iter().any(|tool| content.contains(tool)) {
            return Ok(
                Finding::pass("linting", "Linting configuration found in pyproject.toml")
                    .with_evidence([*name]),
            );
        }
    }

    Ok(Finding::fail(
        "linting",
        Severity::Medium,
        "No linting / formatting configuration detected",
    )
    .with_recommendation("Add a linter (ruff, eslint) and formatter (black, prettier) for code quality."))
}

pub(super) fn check_ci(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let found = CI_MARKERS
        .iter()
        .find(|marker| ctx.fs.exists(&ctx.root.join(marker)));

    Ok(match found {
        Some(marker) => Finding::pass("ci-cd", "CI/CD configuration found").with_evidence([*marker]),
        None => Finding::fail(
            "ci-cd",
            Severity::High,
            "No CI/CD pipeline configuration found",
        )
        .with_recommendation(
            "Add a CI pipeline (GitHub Actions, GitLab CI) for automated testing and deployment.",
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::fs::mock::MockFs;
    use std::path::Path;

    fn run(fs: &MockFs, check: super::super::CheckFn) -> Finding {
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(Path::new("/repo"), "", "", fs, &[], &thresholds);
        check(&ctx).unwrap()
    }

    #[test]
    fn test_readme_bands() {
        let missing = run(&MockFs::new(), check_readme);
        assert!(!missing.passed);
        assert_eq!(missing.severity, Severity::High);

        let short = run(&MockFs::with_files([("/repo/README.md", "# x")]), check_readme);
        assert_eq!(short.severity, Severity::Medium);
        assert_eq!(short.evidence, vec!["README.md"]);

        let long = "A project description that goes on for long enough. ".repeat(3);
        let full = run(&MockFs::with_files([("/repo/README.md", long)]), check_readme);
        assert!(full.passed);
        assert_eq!(full.severity, Severity::Info);
    }

    #[test]
    fn test_tests_found_by_directory_or_pattern() {
        let by_dir = run(
            &MockFs::with_files([("/repo/tests/conftest.py", "import pytest")]),
            check_tests,
        );
        assert!(by_dir.passed);
        assert_eq!(by_dir.evidence, vec!["tests"]);

        let by_pattern = run(
            &MockFs::with_files([("/repo/src/Calc.java", "@Test\nvoid adds() {}")]),
            check_tests,
        );
        assert!(by_pattern.passed);
        assert_eq!(by_pattern.evidence, vec!["src/Calc.java"]);
    }

    #[test]
    fn test_no_tests_fails_high_with_recommendation() {
        let finding = run(
            &MockFs::with_files([("/repo/app.py", "x = 1\n")]),
            check_tests,
        );
        assert!(!finding.passed);
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.recommendation.is_some_and(|r| !r.is_empty()));
    }

    #[test]
    fn test_call_suffixes_are_not_test_idioms() {
        let fs = MockFs::with_files([
            ("/repo/app.py", "parts = line.split(',')\nsys.exit(1)\n"),
            ("/repo/web/form.js", "form.submit(); app.init(config);\n"),
        ]);
        let finding = run(&fs, check_tests);
        assert!(!finding.passed);
        assert_eq!(finding.severity, Severity::High);

        let jest = MockFs::with_files([(
            "/repo/web/sum.js",
            "describe('sum', () => {\n  it('adds', () => {});\n});\n",
        )]);
        let found = run(&jest, check_tests);
        assert!(found.passed);
        assert_eq!(found.evidence, vec!["web/sum.js"]);
    }

    #[test]
    fn test_non_utf8_pyproject_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            b"# auteur: Ren\xe9\n[tool.ruff]\nline-length = 100\n",
        )
        .unwrap();

        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(
            dir.path(),
            "",
            "",
            crate::fs::default_fs(),
            &[],
            &thresholds,
        );
        assert!(check_linting(&ctx).unwrap().passed);
    }

    #[test]
    fn test_linting_generic_config_needs_a_tool() {
        let bare = run(
            &MockFs::with_files([("/repo/pyproject.toml", "[project]\nname = \"x\"\n")]),
            check_linting,
        );
        assert!(!bare.passed);
        assert_eq!(bare.severity, Severity::Medium);

        let with_ruff = run(
            &MockFs::with_files([("/repo/pyproject.toml", "[tool.ruff]\nline-length = 100\n")]),
            check_linting,
        );
        assert!(with_ruff.passed);

        let alongside = run(
            &MockFs::with_files([
                ("/repo/pyproject.toml", "[project]\n"),
                ("/repo/.eslintrc.json", "{}"),
            ]),
            check_linting,
        );
        assert!(alongside.passed);
        assert_eq!(alongside.evidence, vec![".eslintrc.json"]);
    }

    #[test]
    fn test_ci_and_containers() {
        let fs = MockFs::with_files([
            ("/repo/.github/workflows/ci.yml", "on: push"),
            ("/repo/docker-compose.yml", "services: {}"),
        ]);
        let ci = run(&fs, check_ci);
        assert!(ci.passed);
        assert_eq!(ci.evidence, vec![".github/workflows"]);

        let docker = run(&fs, check_containerization);
        assert!(docker.passed);

        let none = run(&MockFs::new(), check_containerization);
        assert_eq!(none.severity, Severity::Low);
        assert!(!run(&MockFs::new(), check_ci).passed);
    }
}
