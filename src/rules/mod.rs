//! Best-practice rule engine.
//!
//! Every rule inspects the repository through a [`RuleContext`] and produces
//! exactly one [`Finding`]. Which rules run is decided by the detected
//! [`StackCategory`] values, each of which maps to a fixed list of [`RuleId`]s.

mod framework;
mod general;
mod scan;
mod security;
mod stack;

pub use scan::find_matching_files;
pub use stack::{StackCategory, infer_stack_description};

use crate::config::Thresholds;
use crate::fs::FileSystem;
use crate::model::{Finding, Severity};
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Check(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Documentation,
    Testing,
    Devops,
    Quality,
}

/// Identifier of every built-in rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    EnvFiles,
    Readme,
    Tests,
    Containerization,
    Linting,
    CiCd,
    HardcodedSecrets,
    OpenCors,
    InputValidation,
    Authentication,
    RateLimiting,
    FastApiErrorHandling,
    FastApiResponseModels,
    ExpressHelmet,
    SpringExceptionHandling,
    SpringActuator,
}

pub type CheckFn = fn(&RuleContext) -> Result<Finding, RuleError>;

/// A named check with a fixed severity.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: RuleId,
    pub description: &'static str,
    pub severity: Severity,
    pub category: Category,
    /// Stack category that owns the rule.
    pub stack: StackCategory,
    pub check: CheckFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("severity", &self.severity)
            .field("category", &self.category)
            .finish()
    }
}

impl Rule {
    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }

    /// Stack markers restricting when the rule applies; empty for general rules.
    pub fn frameworks(&self) -> &'static [&'static str] {
        self.stack.markers()
    }

    pub fn applies_to(&self, stack: &str) -> bool {
        let lower = stack.to_lowercase();
        let frameworks = self.frameworks();
        frameworks.is_empty() || frameworks.iter().any(|m| lower.contains(m))
    }
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::EnvFiles => "env-files",
            RuleId::Readme => "readme",
            RuleId::Tests => "tests",
            RuleId::Containerization => "containerization",
            RuleId::Linting => "linting",
            RuleId::CiCd => "ci-cd",
            RuleId::HardcodedSecrets => "hardcoded-secrets",
            RuleId::OpenCors => "open-cors",
            RuleId::InputValidation => "input-validation",
            RuleId::Authentication => "authentication",
            RuleId::RateLimiting => "rate-limiting",
            RuleId::FastApiErrorHandling => "fastapi-error-handling",
            RuleId::FastApiResponseModels => "fastapi-response-models",
            RuleId::ExpressHelmet => "express-helmet",
            RuleId::SpringExceptionHandling => "spring-exception-handling",
            RuleId::SpringActuator => "spring-actuator",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        stack::ALL_RULES.iter().copied().find(|id| id.as_str() == name)
    }

    /// Failures of these rules are listed as security issues in reports.
    pub fn is_security_issue(self) -> bool {
        matches!(
            self,
            RuleId::HardcodedSecrets
                | RuleId::OpenCors
                | RuleId::InputValidation
                | RuleId::Authentication
                | RuleId::EnvFiles
        )
    }

    pub fn rule(self) -> Rule {
        use Category::*;
        use Severity::*;

        let (description, severity, category, check): (_, _, _, CheckFn) = match self {
            RuleId::EnvFiles => (
                "Environment file management",
                Critical,
                Security,
                security::check_env_files,
            ),
            RuleId::Readme => (
                "README documentation",
                High,
                Documentation,
                general::check_readme,
            ),
            RuleId::Tests => ("Test coverage", High, Testing, general::check_tests),
            RuleId::Containerization => (
                "Docker support",
                Low,
                Devops,
                general::check_containerization,
            ),
            RuleId::Linting => (
                "Code linting/formatting",
                Medium,
                Quality,
                general::check_linting,
            ),
            RuleId::CiCd => ("CI/CD pipeline", High, Devops, general::check_ci),
            RuleId::HardcodedSecrets => (
                "Hardcoded secrets",
                Critical,
                Security,
                security::check_hardcoded_secrets,
            ),
            RuleId::OpenCors => (
                "CORS configuration",
                High,
                Security,
                security::check_cors,
            ),
            RuleId::InputValidation => (
                "Input validation",
                Medium,
                Security,
                security::check_input_validation,
            ),
            RuleId::Authentication => (
                "Authentication mechanism",
                High,
                Security,
                security::check_authentication,
            ),
            RuleId::RateLimiting => (
                "Rate limiting",
                Medium,
                Security,
                security::check_rate_limiting,
            ),
            RuleId::FastApiErrorHandling => (
                "FastAPI exception handlers",
                Medium,
                Quality,
                framework::check_fastapi_error_handling,
            ),
            RuleId::FastApiResponseModels => (
                "FastAPI response models",
                Medium,
                Quality,
                framework::check_fastapi_response_models,
            ),
            RuleId::ExpressHelmet => (
                "Helmet.js security headers",
                Medium,
                Security,
                framework::check_express_helmet,
            ),
            RuleId::SpringExceptionHandling => (
                "Spring global exception handling",
                Medium,
                Quality,
                framework::check_spring_exception_handling,
            ),
            RuleId::SpringActuator => (
                "Spring Boot Actuator health endpoints",
                Low,
                Devops,
                framework::check_spring_actuator,
            ),
        };

        Rule {
            id: self,
            description,
            severity,
            category,
            stack: StackCategory::owning(self),
            check,
        }
    }
}

/// Everything a rule check may look at.
pub struct RuleContext<'a> {
    pub root: &'a Path,
    /// Concatenated key-file sections gathered by the walk.
    pub key_files: &'a str,
    pub stack: &'a str,
    pub fs: &'a dyn FileSystem,
    pub thresholds: &'a Thresholds,
    /// Files below `root` available to content scans, sorted.
    files: Vec<PathBuf>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        root: &'a Path,
        key_files: &'a str,
        stack: &'a str,
        fs: &'a dyn FileSystem,
        excluded_dirs: &[String],
        thresholds: &'a Thresholds,
    ) -> Self {
        let files = fs.list_files(root, excluded_dirs);
        Self {
            root,
            key_files,
            stack,
            fs,
            thresholds,
            files,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// First of `names` that is a regular file directly under the root.
    pub fn first_file(&self, names: &[&'static str]) -> Option<&'static str> {
        names
            .iter()
            .copied()
            .find(|name| self.fs.is_file(&self.root.join(name)))
    }

    /// First of `names` that is a directory directly under the root.
    pub fn first_dir(&self, names: &[&'static str]) -> Option<&'static str> {
        names
            .iter()
            .copied()
            .find(|name| self.fs.is_dir(&self.root.join(name)))
    }
}

/// Rules applicable to a stack description, general rules first.
pub fn rules_for_stack(stack: &str) -> Vec<Rule> {
    stack::ALL_RULES
        .iter()
        .map(|id| id.rule())
        .filter(|rule| rule.applies_to(stack))
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}

/// Run one rule. A check that errors or panics yields a failing finding at
/// the rule's severity instead of propagating.
pub fn evaluate_rule(rule: &Rule, ctx: &RuleContext) -> Finding {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (rule.check)(ctx)));

    let message = match outcome {
        Ok(Ok(finding)) => {
            debug!(rule = rule.name(), passed = finding.passed, "rule evaluated");
            return finding;
        }
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    warn!(rule = rule.name(), error = %message, "rule failed");
    Finding::fail(
        rule.name(),
        rule.severity,
        format!("Rule evaluation failed: {}", message),
    )
}

/// Evaluate `rules` in parallel. Findings come back in rule order, one per rule.
pub fn evaluate_rules(rules: &[Rule], ctx: &RuleContext) -> Vec<Finding> {
    rules.par_iter().map(|rule| evaluate_rule(rule, ctx)).collect()
}

/// Failed security findings rendered as `"<description> - <recommendation>"`.
pub fn security_issues(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .filter(|f| !f.passed)
        .filter(|f| RuleId::from_name(&f.rule_name).is_some_and(RuleId::is_security_issue))
        .map(|f| match &f.recommendation {
            Some(rec) => format!("{} - {}", f.description, rec),
            None => f.description.clone(),
        })
        .collect()
}

/// Shorthand used by the rule modules: the first `n` entries as evidence.
fn evidence(matches: &[String], n: usize) -> Vec<String> {
    matches.iter().take(n).cloned().collect()
}
