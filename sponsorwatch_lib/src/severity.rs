//! Severity classification and the conflict scoring formula.
//!
//! `severity_score` turns a conflict type, a financial impact, and a set of
//! context factors into a numeric score; `determine_severity` maps any score
//! to a bucket. The mapping is the single canonical one for the whole
//! engine: risk profiles reuse it for their overall level.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

/// Categorical severity bucket.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Severity {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "critical")]
    Critical,
}

impl Severity {
    /// Numeric rank on a 1-4 scale, used by cluster and trend averaging.
    pub fn rank(&self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Severity::Low => "low",
                Severity::Medium => "medium",
                Severity::High => "high",
                Severity::Critical => "critical",
            }
        )
    }
}

/// Kind of detected conflict.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    FinancialDirect,
    FinancialIndirect,
    Organizational,
    FamilyBusiness,
    VotingPattern,
    TimingSuspicious,
    DisclosureIncomplete,
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ConflictType::FinancialDirect => "financial_direct",
                ConflictType::FinancialIndirect => "financial_indirect",
                ConflictType::Organizational => "organizational",
                ConflictType::FamilyBusiness => "family_business",
                ConflictType::VotingPattern => "voting_pattern",
                ConflictType::TimingSuspicious => "timing_suspicious",
                ConflictType::DisclosureIncomplete => "disclosure_incomplete",
            }
        )
    }
}

/// Context factors that feed the scoring formula alongside the conflict
/// type and financial impact.
#[derive(Debug, Clone, Default)]
pub struct ScoreContext {
    /// Total affiliations held by the sponsor.
    pub related_affiliations: usize,
    /// The triggering affiliation started within the recent-activity window.
    pub recent_activity: bool,
    /// The sponsor holds a leadership role at the organization.
    pub leadership_role: bool,
    /// The sponsor is marked as a direct beneficiary.
    pub direct_beneficiary: bool,
}

fn base_weight(conflict_type: ConflictType) -> u32 {
    match conflict_type {
        ConflictType::TimingSuspicious => 45,
        ConflictType::FinancialDirect => 40,
        ConflictType::FamilyBusiness => 35,
        ConflictType::VotingPattern => 30,
        ConflictType::FinancialIndirect => 25,
        ConflictType::Organizational => 20,
        ConflictType::DisclosureIncomplete => 15,
    }
}

/// Compute the numeric conflict score.
///
/// Base weight per type, plus a tiered bonus for financial impact, plus
/// context bonuses. Monotone in `financial_impact` for a fixed type and
/// context.
pub fn severity_score(
    conflict_type: ConflictType,
    financial_impact: f64,
    ctx: &ScoreContext,
    config: &AnalysisConfig,
) -> u32 {
    let mut score = base_weight(conflict_type);

    score += if financial_impact >= config.impact_critical {
        40
    } else if financial_impact >= config.impact_high {
        25
    } else if financial_impact >= config.impact_medium {
        15
    } else if financial_impact >= config.impact_low {
        5
    } else {
        0
    };

    if ctx.related_affiliations > 5 {
        score += 10;
    }
    if ctx.recent_activity {
        score += 15;
    }
    if ctx.leadership_role {
        score += 12;
    }
    if ctx.direct_beneficiary {
        score += 20;
    }

    score
}

/// Map a numeric score to its severity bucket.
///
/// This is a pure function of the score and the canonical mapping for the
/// engine; risk profiles use it on their 0-100 overall score.
pub fn determine_severity(score: u32) -> Severity {
    if score >= 75 {
        Severity::Critical
    } else if score >= 55 {
        Severity::High
    } else if score >= 35 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(determine_severity(0), Severity::Low);
        assert_eq!(determine_severity(34), Severity::Low);
        assert_eq!(determine_severity(35), Severity::Medium);
        assert_eq!(determine_severity(54), Severity::Medium);
        assert_eq!(determine_severity(55), Severity::High);
        assert_eq!(determine_severity(74), Severity::High);
        assert_eq!(determine_severity(75), Severity::Critical);
        assert_eq!(determine_severity(200), Severity::Critical);
    }

    #[test]
    fn test_determine_severity_is_pure() {
        for score in 0..150 {
            assert_eq!(determine_severity(score), determine_severity(score));
        }
    }

    #[test]
    fn test_score_monotone_in_impact() {
        let config = AnalysisConfig::default();
        let ctx = ScoreContext::default();
        let impacts = [
            0.0, 50_000.0, 100_000.0, 900_000.0, 1_000_000.0, 4_999_999.0, 5_000_000.0,
            9_999_999.0, 10_000_000.0, 50_000_000.0,
        ];
        for window in impacts.windows(2) {
            let lo = severity_score(ConflictType::FinancialDirect, window[0], &ctx, &config);
            let hi = severity_score(ConflictType::FinancialDirect, window[1], &ctx, &config);
            assert!(lo <= hi, "score decreased from {} to {}", window[0], window[1]);
        }
    }

    #[test]
    fn test_impact_tiers() {
        let config = AnalysisConfig::default();
        let ctx = ScoreContext::default();
        let base = severity_score(ConflictType::Organizational, 0.0, &ctx, &config);
        assert_eq!(base, 20);
        assert_eq!(
            severity_score(ConflictType::Organizational, 100_000.0, &ctx, &config),
            base + 5
        );
        assert_eq!(
            severity_score(ConflictType::Organizational, 1_000_000.0, &ctx, &config),
            base + 15
        );
        assert_eq!(
            severity_score(ConflictType::Organizational, 5_000_000.0, &ctx, &config),
            base + 25
        );
        assert_eq!(
            severity_score(ConflictType::Organizational, 10_000_000.0, &ctx, &config),
            base + 40
        );
    }

    #[test]
    fn test_context_bonuses_accumulate() {
        let config = AnalysisConfig::default();
        let ctx = ScoreContext {
            related_affiliations: 6,
            recent_activity: true,
            leadership_role: true,
            direct_beneficiary: true,
        };
        // 40 base + 10 + 15 + 12 + 20
        assert_eq!(
            severity_score(ConflictType::FinancialDirect, 0.0, &ctx, &config),
            97
        );
    }

    #[test]
    fn test_five_affiliations_get_no_bonus() {
        let config = AnalysisConfig::default();
        let ctx = ScoreContext {
            related_affiliations: 5,
            ..ScoreContext::default()
        };
        assert_eq!(
            severity_score(ConflictType::FinancialDirect, 0.0, &ctx, &config),
            40
        );
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&ConflictType::TimingSuspicious).unwrap(),
            "\"timing_suspicious\""
        );
    }
}
