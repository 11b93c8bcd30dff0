//! Rules that only run for a detected framework.

use super::scan::{SOURCE_EXTENSIONS, find_matching_files};
use super::{RuleContext, RuleError, evidence};
use crate::model::{Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

static FASTAPI_HANDLER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@app\.exception_handler|HTTPException").unwrap());

static FASTAPI_RESPONSE_MODEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)response_model\s*=").unwrap());

static HELMET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)require\(['"]helmet['"]\)|import.*helmet"#).unwrap());

static SPRING_ADVICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@(?:Rest)?ControllerAdvice|@ExceptionHandler").unwrap()
});

static ACTUATOR_CONFIG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)management\.endpoints|management:\s*\n\s*endpoints").unwrap());

const SPRING_CONFIG_EXTENSIONS: &[&str] = &["yml", "yaml", "properties"];

pub(super) fn check_fastapi_error_handling(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &FASTAPI_HANDLER_PATTERN, SOURCE_EXTENSIONS);
    if !matches.is_empty() {
        return Ok(
            Finding::pass("fastapi-error-handling", "FastAPI error handling found")
                .with_evidence(evidence(&matches, 3)),
        );
    }
    Ok(Finding::fail(
        "fastapi-error-handling",
        Severity::Medium,
        "No custom exception handlers found",
    )
    .with_recommendation("Add @app.exception_handler for consistent error responses."))
}

pub(super) fn check_fastapi_response_models(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &FASTAPI_RESPONSE_MODEL_PATTERN, SOURCE_EXTENSIONS);
    if !matches.is_empty() {
        return Ok(
            Finding::pass("fastapi-response-models", "Response models used in endpoints")
                .with_evidence(evidence(&matches, 3)),
        );
    }
    Ok(Finding::fail(
        "fastapi-response-models",
        Severity::Medium,
        "No response_model declarations found on endpoints",
    )
    .with_recommendation(
        "Use response_model in route decorators for auto-documentation and serialization.",
    ))
}

pub(super) fn check_express_helmet(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &HELMET_PATTERN, &["js", "ts"]);
    if !matches.is_empty() {
        return Ok(
            Finding::pass("express-helmet", "Helmet.js is used for security headers")
                .with_evidence(evidence(&matches, 3)),
        );
    }
    Ok(
        Finding::fail("express-helmet", Severity::Medium, "Helmet.js not detected")
            .with_recommendation("Add `helmet` middleware for secure HTTP headers."),
    )
}

pub(super) fn check_spring_exception_handling(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &SPRING_ADVICE_PATTERN, &["java", "kt"]);
    if !matches.is_empty() {
        return Ok(
            Finding::pass("spring-exception-handling", "Global exception handling found")
                .with_evidence(evidence(&matches, 3)),
        );
    }
    Ok(Finding::fail(
        "spring-exception-handling",
        Severity::Medium,
        "No @ControllerAdvice or @ExceptionHandler found",
    )
    .with_recommendation(
        "Add a @RestControllerAdvice class to map exceptions to consistent error responses.",
    ))
}

pub(super) fn check_spring_actuator(ctx: &RuleContext) -> Result<Finding, RuleError> {
    if ctx.key_files.contains("spring-boot-starter-actuator") {
        return Ok(
            Finding::pass("spring-actuator", "Spring Boot Actuator dependency declared")
                .with_evidence(["spring-boot-starter-actuator"]),
        );
    }

    let matches = find_matching_files(ctx, &ACTUATOR_CONFIG_PATTERN, SPRING_CONFIG_EXTENSIONS);
    if !matches.is_empty() {
        return Ok(
            Finding::pass("spring-actuator", "Actuator endpoints configured")
                .with_evidence(evidence(&matches, 3)),
        );
    }

    Ok(Finding::fail(
        "spring-actuator",
        Severity::Low,
        "No Spring Boot Actuator health endpoints detected",
    )
    .with_recommendation(
        "Add spring-boot-starter-actuator and expose the health endpoint for monitoring.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::fs::mock::MockFs;
    use std::path::Path;

    fn run_with(fs: &MockFs, key_files: &str, check: super::super::CheckFn) -> Finding {
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(Path::new("/repo"), key_files, "", fs, &[], &thresholds);
        check(&ctx).unwrap()
    }

    #[test]
    fn test_fastapi_rules() {
        let fs = MockFs::with_files([(
            "/repo/app/routes.py",
            "@router.get('/items', response_model=list[Item])\nraise HTTPException(404)\n",
        )]);
        assert!(run_with(&fs, "", check_fastapi_error_handling).passed);
        assert!(run_with(&fs, "", check_fastapi_response_models).passed);

        let bare = MockFs::with_files([("/repo/app/routes.py", "def index(): return {}\n")]);
        let finding = run_with(&bare, "", check_fastapi_response_models);
        assert!(!finding.passed);
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_express_helmet_only_scans_js_and_ts() {
        let fs = MockFs::with_files([("/repo/server.js", "const helmet = require('helmet');\n")]);
        assert!(run_with(&fs, "", check_express_helmet).passed);

        let py = MockFs::with_files([("/repo/server.py", "import helmet\n")]);
        assert!(!run_with(&py, "", check_express_helmet).passed);
    }

    #[test]
    fn test_spring_rules() {
        let fs = MockFs::with_files([
            (
                "/repo/src/main/java/app/Errors.java",
                "@RestControllerAdvice\nclass Errors {}\n",
            ),
            (
                "/repo/src/main/resources/application.properties",
                "management.endpoints.web.exposure.include=health\n",
            ),
        ]);
        assert!(run_with(&fs, "", check_spring_exception_handling).passed);
        assert!(run_with(&fs, "", check_spring_actuator).passed);

        let pom = "\n### FILE: pom.xml\n<artifactId>spring-boot-starter-actuator</artifactId>";
        assert!(run_with(&MockFs::new(), pom, check_spring_actuator).passed);

        let missing = run_with(&MockFs::new(), "", check_spring_actuator);
        assert_eq!(missing.severity, Severity::Low);
        assert!(!missing.passed);
    }
}
