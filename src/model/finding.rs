use serde::{Deserialize, Serialize};

/// Severity attached to a rule and to every finding it produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Outcome of evaluating one rule. Created once per scan and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_name: String,
    pub description: String,
    pub severity: Severity,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Finding {
    /// A passing finding. Passes are always reported at `Info`.
    pub fn pass(rule_name: &str, description: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            description: description.into(),
            severity: Severity::Info,
            passed: true,
            evidence: Vec::new(),
            recommendation: None,
        }
    }

    pub fn fail(rule_name: &str, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            description: description.into(),
            severity,
            passed: false,
            evidence: Vec::new(),
            recommendation: None,
        }
    }

    pub fn with_evidence<I, S>(mut self, evidence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence = evidence.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" | "crit" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low > Severity::Info);
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_finding_builders() {
        let finding = Finding::fail("readme", Severity::High, "No README found")
            .with_recommendation("Add a README");
        assert!(!finding.passed);
        assert_eq!(finding.recommendation.as_deref(), Some("Add a README"));

        let finding = Finding::pass("ci-cd", "CI/CD configuration found")
            .with_evidence([".github/workflows"]);
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.evidence, vec![".github/workflows".to_string()]);
    }
}
