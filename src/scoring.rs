//! Weighted maturity score over a finding list.

use crate::model::{Finding, Severity};
use serde::Serialize;

pub mod weights {
    pub const CRITICAL: u32 = 20;
    pub const HIGH: u32 = 15;
    pub const MEDIUM: u32 = 10;
    pub const LOW: u32 = 5;
    pub const INFO: u32 = 2;
}

pub fn weight(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => weights::CRITICAL,
        Severity::High => weights::HIGH,
        Severity::Medium => weights::MEDIUM,
        Severity::Low => weights::LOW,
        Severity::Info => weights::INFO,
    }
}

/// Share of severity weight carried by passing findings, as 0..=100.
///
/// Each finding contributes the weight of the severity it was reported at.
/// Halves round to even. An empty list scores 0.
pub fn maturity_score(findings: &[Finding]) -> u8 {
    let (earned, total) = findings.iter().fold((0u32, 0u32), |(earned, total), f| {
        let w = weight(f.severity);
        (if f.passed { earned + w } else { earned }, total + w)
    });

    if total == 0 {
        return 0;
    }

    let score = (f64::from(earned) / f64::from(total) * 100.0).round_ties_even();
    score.clamp(0.0, 100.0) as u8
}

/// Coarse band for a score, used by report renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaturityLevel {
    Strong,
    Fair,
    Weak,
    Poor,
}

impl MaturityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => MaturityLevel::Strong,
            60..=79 => MaturityLevel::Fair,
            40..=59 => MaturityLevel::Weak,
            _ => MaturityLevel::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaturityLevel::Strong => "Strong",
            MaturityLevel::Fair => "Fair",
            MaturityLevel::Weak => "Weak",
            MaturityLevel::Poor => "Poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity, passed: bool) -> Finding {
        Finding {
            rule_name: "r".to_string(),
            description: String::new(),
            severity,
            passed,
            evidence: Vec::new(),
            recommendation: None,
        }
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(maturity_score(&[]), 0);
    }

    #[test]
    fn test_all_passed_info_is_100() {
        let findings = vec![finding(Severity::Info, true); 7];
        assert_eq!(maturity_score(&findings), 100);
    }

    #[test]
    fn test_all_failed_critical_is_0() {
        let findings = vec![finding(Severity::Critical, false); 3];
        assert_eq!(maturity_score(&findings), 0);
    }

    #[test]
    fn test_weighted_mix() {
        // earned 2 + 15 = 17 of 2 + 15 + 20 = 37 -> 45.9
        let findings = vec![
            finding(Severity::Info, true),
            finding(Severity::High, true),
            finding(Severity::Critical, false),
        ];
        assert_eq!(maturity_score(&findings), 46);
    }

    #[test]
    fn test_flipping_a_failure_never_lowers_the_score() {
        let base = vec![
            finding(Severity::Critical, false),
            finding(Severity::High, false),
            finding(Severity::Medium, true),
            finding(Severity::Low, false),
            finding(Severity::Info, true),
        ];
        let before = maturity_score(&base);

        for i in 0..base.len() {
            if base[i].passed {
                continue;
            }
            let mut flipped = base.clone();
            flipped[i].passed = true;
            assert!(maturity_score(&flipped) >= before);

            // a pass reported at Info instead of the rule severity
            flipped[i].severity = Severity::Info;
            assert!(maturity_score(&flipped) >= before);
        }
    }

    #[test]
    fn test_half_rounds_to_even() {
        // 5 / 40 = 12.5
        let findings = vec![
            finding(Severity::Low, true),
            finding(Severity::Critical, false),
            finding(Severity::High, false),
        ];
        assert_eq!(maturity_score(&findings), 12);

        // 15 / 40 = 37.5
        let findings = vec![
            finding(Severity::High, true),
            finding(Severity::Critical, false),
            finding(Severity::Low, false),
        ];
        assert_eq!(maturity_score(&findings), 38);
    }

    #[test]
    fn test_levels() {
        assert_eq!(MaturityLevel::from_score(100), MaturityLevel::Strong);
        assert_eq!(MaturityLevel::from_score(80), MaturityLevel::Strong);
        assert_eq!(MaturityLevel::from_score(79), MaturityLevel::Fair);
        assert_eq!(MaturityLevel::from_score(40), MaturityLevel::Weak);
        assert_eq!(MaturityLevel::from_score(39), MaturityLevel::Poor);
    }
}
