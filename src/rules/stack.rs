use super::RuleId;
use serde::Serialize;

pub(super) const ALL_RULES: &[RuleId] = &[
    RuleId::EnvFiles,
    RuleId::Readme,
    RuleId::Tests,
    RuleId::Containerization,
    RuleId::Linting,
    RuleId::CiCd,
    RuleId::HardcodedSecrets,
    RuleId::OpenCors,
    RuleId::InputValidation,
    RuleId::Authentication,
    RuleId::RateLimiting,
    RuleId::FastApiErrorHandling,
    RuleId::FastApiResponseModels,
    RuleId::ExpressHelmet,
    RuleId::SpringExceptionHandling,
    RuleId::SpringActuator,
];

const GENERAL_RULES: &[RuleId] = &[
    RuleId::EnvFiles,
    RuleId::Readme,
    RuleId::Tests,
    RuleId::Containerization,
    RuleId::Linting,
    RuleId::CiCd,
    RuleId::HardcodedSecrets,
    RuleId::OpenCors,
    RuleId::InputValidation,
    RuleId::Authentication,
    RuleId::RateLimiting,
];

const FASTAPI_RULES: &[RuleId] = &[RuleId::FastApiErrorHandling, RuleId::FastApiResponseModels];

const EXPRESS_RULES: &[RuleId] = &[RuleId::ExpressHelmet];

const SPRING_RULES: &[RuleId] = &[RuleId::SpringExceptionHandling, RuleId::SpringActuator];

/// Technology stacks with their own rule subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackCategory {
    General,
    FastApi,
    Express,
    SpringBoot,
}

impl StackCategory {
    pub const ALL: [StackCategory; 4] = [
        StackCategory::General,
        StackCategory::FastApi,
        StackCategory::Express,
        StackCategory::SpringBoot,
    ];

    /// Lowercase substrings of a stack description that select this category.
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            StackCategory::General => &[],
            StackCategory::FastApi => &["fastapi"],
            StackCategory::Express => &["express", "node"],
            StackCategory::SpringBoot => &["spring"],
        }
    }

    pub fn rule_ids(self) -> &'static [RuleId] {
        match self {
            StackCategory::General => GENERAL_RULES,
            StackCategory::FastApi => FASTAPI_RULES,
            StackCategory::Express => EXPRESS_RULES,
            StackCategory::SpringBoot => SPRING_RULES,
        }
    }

    /// The category whose rule list contains `id`.
    pub fn owning(id: RuleId) -> StackCategory {
        Self::ALL
            .into_iter()
            .find(|category| category.rule_ids().contains(&id))
            .unwrap_or(StackCategory::General)
    }

    /// Categories matching a free-form stack description. `General` is always
    /// first; matching is case-insensitive.
    pub fn detect(description: &str) -> Vec<StackCategory> {
        let lower = description.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|category| {
                *category == StackCategory::General
                    || category.markers().iter().any(|m| lower.contains(m))
            })
            .collect()
    }
}

/// Split a key-files blob back into `(file name, content)` sections.
fn sections(key_files: &str) -> impl Iterator<Item = (&str, &str)> {
    key_files.split("\n### FILE: ").skip(1).map(|section| {
        section
            .split_once('\n')
            .unwrap_or((section, ""))
    })
}

/// Best-effort stack description from key-file content, used when the caller
/// does not supply one. Returns `"Unknown"` when nothing is recognized.
pub fn infer_stack_description(key_files: &str) -> String {
    let mut parts: Vec<&'static str> = Vec::new();
    let mut add = |part: &'static str| {
        if !parts.contains(&part) {
            parts.push(part);
        }
    };

    for (name, content) in sections(key_files) {
        let content = content.to_lowercase();
        match name {
            "requirements.txt" | "pyproject.toml" | "setup.py" | "setup.cfg" => {
                add("Python");
                if content.contains("fastapi") {
                    add("FastAPI");
                }
                if content.contains("django") {
                    add("Django");
                }
                if content.contains("flask") {
                    add("Flask");
                }
            }
            "manage.py" => add("Django"),
            "package.json" => {
                add("Node.js");
                if content.contains("\"express\"") {
                    add("Express");
                }
                if content.contains("\"react\"") {
                    add("React");
                }
            }
            "tsconfig.json" => add("TypeScript"),
            "pom.xml" | "build.gradle" => {
                add("Java");
                if content.contains("spring-boot") {
                    add("Spring Boot");
                }
            }
            "go.mod" => add("Go"),
            "Cargo.toml" => add("Rust"),
            "Dockerfile" | "docker-compose.yml" | "docker-compose.yaml" => add("Docker"),
            _ => {}
        }
    }

    if parts.is_empty() {
        "Unknown".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(StackCategory::detect(""), vec![StackCategory::General]);
        assert_eq!(
            StackCategory::detect("Python 3.12, FASTAPI, PostgreSQL"),
            vec![StackCategory::General, StackCategory::FastApi]
        );
        assert_eq!(
            StackCategory::detect("Spring Boot + Node tooling"),
            vec![
                StackCategory::General,
                StackCategory::Express,
                StackCategory::SpringBoot
            ]
        );
    }

    #[test]
    fn test_every_rule_belongs_to_one_category() {
        for id in ALL_RULES {
            let owners = StackCategory::ALL
                .iter()
                .filter(|c| c.rule_ids().contains(id))
                .count();
            assert_eq!(owners, 1, "{}", id.as_str());
        }
    }

    #[test]
    fn test_infer_stack_description() {
        let blob = "\n### FILE: requirements.txt\nfastapi==0.110\nuvicorn\n\
                    \n### FILE: package.json\n{\"dependencies\": {\"express\": \"^4\"}}";
        assert_eq!(
            infer_stack_description(blob),
            "Python, FastAPI, Node.js, Express"
        );
        assert_eq!(infer_stack_description(""), "Unknown");
    }
}
