// Coverage-based compliance scoring
use shared_types::{ComplianceScoreResult, RiskLevel, TestCase};

/// Points awarded per generated test case
pub const POINTS_PER_TEST_CASE: u32 = 15;

/// Score ceiling
pub const MAX_SCORE: u32 = 100;

/// Scores strictly above this are LOW risk
pub const LOW_RISK_ABOVE: u32 = 80;

/// Scores strictly above this (and not LOW) are MEDIUM risk
pub const MEDIUM_RISK_ABOVE: u32 = 50;

/// Score for a given number of test cases: `min(100, count * 15)`
pub fn score_for_count(count: usize) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count.saturating_mul(POINTS_PER_TEST_CASE).min(MAX_SCORE)
}

/// Bucket a score into a risk level (boundaries are exclusive: 80 is MEDIUM, 50 is HIGH)
pub fn risk_level_for(score: u32) -> RiskLevel {
    if score > LOW_RISK_ABOVE {
        RiskLevel::Low
    } else if score > MEDIUM_RISK_ABOVE {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Compute the compliance score from generated test cases. Only the count matters.
pub fn score(test_cases: &[TestCase]) -> ComplianceScoreResult {
    let compliance_score = score_for_count(test_cases.len());
    let risk_level = risk_level_for(compliance_score);

    tracing::info!(
        compliance_score,
        %risk_level,
        test_cases = test_cases.len(),
        "Calculated compliance score"
    );

    ComplianceScoreResult {
        compliance_score,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cases(n: usize) -> Vec<TestCase> {
        (0..n)
            .map(|i| TestCase::new(format!("TC-{:03}", i), "REQ-001", "case"))
            .collect()
    }

    #[test]
    fn test_risk_boundaries() {
        assert_eq!(risk_level_for(100), RiskLevel::Low);
        assert_eq!(risk_level_for(81), RiskLevel::Low);
        assert_eq!(risk_level_for(80), RiskLevel::Medium);
        assert_eq!(risk_level_for(51), RiskLevel::Medium);
        assert_eq!(risk_level_for(50), RiskLevel::High);
        assert_eq!(risk_level_for(0), RiskLevel::High);
    }

    #[test]
    fn test_score_from_test_cases() {
        assert_eq!(
            score(&cases(6)),
            ComplianceScoreResult {
                compliance_score: 90,
                risk_level: RiskLevel::Low
            }
        );
        assert_eq!(score(&cases(0)).risk_level, RiskLevel::High);
        assert_eq!(score(&cases(4)).compliance_score, 60);
        assert_eq!(score(&cases(4)).risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_score_caps_at_100() {
        assert_eq!(score_for_count(7), 100);
        assert_eq!(score_for_count(usize::MAX), 100);
    }

    proptest! {
        #[test]
        fn score_is_min_of_100_and_15n(n in 0usize..10_000) {
            prop_assert_eq!(score_for_count(n) as usize, (n * 15).min(100));
        }

        #[test]
        fn score_is_monotonic(a in 0usize..1_000, b in 0usize..1_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(score_for_count(lo) <= score_for_count(hi));
        }

        #[test]
        fn risk_never_improves_as_score_drops(s in 0u32..=100) {
            let rank = |r: RiskLevel| match r {
                RiskLevel::Low => 0,
                RiskLevel::Medium => 1,
                RiskLevel::High => 2,
            };
            if s > 0 {
                prop_assert!(rank(risk_level_for(s - 1)) >= rank(risk_level_for(s)));
            }
        }
    }
}
