//! Security heuristics: secrets, CORS, validation, auth, rate limiting.

use super::scan::{SOURCE_EXTENSIONS, find_matching_files};
use super::{RuleContext, RuleError, evidence};
use crate::model::{Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

const SECRET_SCAN_EXTENSIONS: &[&str] = &["py", "js", "ts", "java", "yaml", "yml", "json", "env"];

static CORS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:allow_origins\s*=\s*\[?\s*['"]\*['"]\]?|cors\(\s*\{?\s*origin:\s*['"]\*['"])"#,
    )
    .unwrap()
});

static VALIDATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Pydantic|BaseModel|@validator|@field_validator|Joi\.|yup\.|zod\.|@Valid|@NotNull)")
        .unwrap()
});

static AUTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:JWT|OAuth|Bearer|Depends\(.*auth|passport\.use|@PreAuthorize|SecurityContext|bcrypt|argon2)",
    )
    .unwrap()
});

static RATE_LIMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rate.?limit|express-rate-limit|slowapi|throttle").unwrap());

const ENV_TEMPLATES: &[&str] = &[".env.example", ".env.sample", "env.example"];

/// Assignment of a quoted literal of at least `min_len` characters to a
/// secret-looking name.
fn secret_pattern(min_len: usize) -> Result<Regex, RuleError> {
    Regex::new(&format!(
        r#"(?i)(?:password|secret|api_key|apikey|access_token|private_key)\s*[=:]\s*['"][^'"]{{{},}}['"]"#,
        min_len
    ))
    .map_err(|e| RuleError::Check(e.to_string()))
}

pub(super) fn check_env_files(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let gitignore = ctx.root.join(".gitignore");
    let env_ignored = ctx.fs.is_file(&gitignore)
        && ctx
            .fs
            .read_prefix(&gitignore, ctx.thresholds.content_scan_max_bytes)
            .is_ok_and(|content| content.contains(".env"));

    let has_env = ctx.first_file(&[".env"]).is_some();
    let has_template = ctx.first_file(ENV_TEMPLATES).is_some();

    if has_env && !env_ignored {
        return Ok(Finding::fail(
            "env-files",
            Severity::Critical,
            ".env file exists but is not in .gitignore",
        )
        .with_evidence([".env", ".gitignore"])
        .with_recommendation("Add `.env` to .gitignore immediately to prevent secret leaks."));
    }

    if has_env && !has_template {
        return Ok(Finding::fail(
            "env-files",
            Severity::Medium,
            ".env exists but no .env.example template provided",
        )
        .with_evidence([".env"])
        .with_recommendation("Create a `.env.example` so collaborators know required variables."));
    }

    Ok(Finding::pass("env-files", "Environment file handling looks correct"))
}

pub(super) fn check_hardcoded_secrets(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let pattern = secret_pattern(ctx.thresholds.secret_min_len)?;
    let matches = find_matching_files(ctx, &pattern, SECRET_SCAN_EXTENSIONS);

    if matches.is_empty() {
        return Ok(Finding::pass(
            "hardcoded-secrets",
            "No obvious hardcoded secrets detected",
        ));
    }

    Ok(Finding::fail(
        "hardcoded-secrets",
        Severity::Critical,
        format!("Potential hardcoded secrets found in {} file(s)", matches.len()),
    )
    .with_evidence(evidence(&matches, 5))
    .with_recommendation("Move secrets to environment variables or a vault; never commit them."))
}

pub(super) fn check_cors(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &CORS_PATTERN, SOURCE_EXTENSIONS);

    if matches.is_empty() {
        return Ok(Finding::pass(
            "open-cors",
            "No overly permissive CORS configuration detected",
        ));
    }

    Ok(Finding::fail(
        "open-cors",
        Severity::High,
        "CORS configured to allow all origins (*)",
    )
    .with_evidence(evidence(&matches, 3))
    .with_recommendation("Restrict CORS to known frontend domains."))
}

pub(super) fn check_input_validation(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &VALIDATION_PATTERN, SOURCE_EXTENSIONS);

    if !matches.is_empty() {
        return Ok(
            Finding::pass("input-validation", "Input validation patterns detected")
                .with_evidence(evidence(&matches, 5)),
        );
    }

    Ok(Finding::fail(
        "input-validation",
        Severity::Medium,
        "No input validation framework detected",
    )
    .with_recommendation("Add request validation (Pydantic, Joi, Zod) to prevent injection attacks."))
}

pub(super) fn check_authentication(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &AUTH_PATTERN, SOURCE_EXTENSIONS);

    if !matches.is_empty() {
        return Ok(
            Finding::pass("authentication", "Authentication patterns detected")
                .with_evidence(evidence(&matches, 5)),
        );
    }

    Ok(Finding::fail(
        "authentication",
        Severity::High,
        "No authentication/authorization patterns detected",
    )
    .with_recommendation("Implement authentication (JWT, OAuth2) for protected endpoints."))
}

pub(super) fn check_rate_limiting(ctx: &RuleContext) -> Result<Finding, RuleError> {
    let matches = find_matching_files(ctx, &RATE_LIMIT_PATTERN, SOURCE_EXTENSIONS);

    if !matches.is_empty() {
        return Ok(Finding::pass("rate-limiting", "Rate limiting detected")
            .with_evidence(evidence(&matches, 3)));
    }

    Ok(Finding::fail("rate-limiting", Severity::Medium, "No rate limiting detected")
        .with_recommendation(
            "Add rate limiting to protect against abuse (slowapi for FastAPI, express-rate-limit for Express).",
        ))
}
