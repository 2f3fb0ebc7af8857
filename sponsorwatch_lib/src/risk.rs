//! Per-sponsor risk aggregation.
//!
//! Four independent dimensions (financial, affiliation, transparency,
//! behavioral) are each scored 0-100, combined into a weighted overall
//! score, and mapped to a level through the engine's canonical
//! score-to-severity function.

use std::sync::Arc;

use serde::Serialize;

use sponsorwatch_data::types::{Affiliation, ConflictMarker, Sponsor, SponsorId};
use sponsorwatch_data::DataProvider;

use crate::config::AnalysisConfig;
use crate::detector::disclosure_completeness;
use crate::error::AnalysisError;
use crate::severity::{determine_severity, Severity};

/// Per-dimension risk scores, each 0-100.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RiskBreakdown {
    pub financial: u32,
    pub affiliation: u32,
    pub transparency: u32,
    pub behavioral: u32,
}

/// Aggregate risk profile for a sponsor. Computed on demand, never
/// persisted by the engine.
#[derive(Serialize, Debug, Clone)]
pub struct RiskProfile {
    pub sponsor_id: SponsorId,
    /// Weighted combination of the four dimensions, 0-100.
    pub overall_score: u32,
    pub level: Severity,
    pub breakdown: RiskBreakdown,
    /// Ordered, rule-derived recommendations.
    pub recommendations: Vec<String>,
}

/// Builds risk profiles from current sponsor state.
#[derive(Clone)]
pub struct RiskProfileBuilder {
    provider: Arc<dyn DataProvider>,
    config: Arc<AnalysisConfig>,
}

impl RiskProfileBuilder {
    pub fn new(provider: Arc<dyn DataProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { provider, config }
    }

    /// Generate the risk profile for a sponsor. Fails with `NotFound` for
    /// unknown ids.
    pub async fn generate_risk_profile(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<RiskProfile, AnalysisError> {
        let sponsor = self
            .provider
            .sponsor(sponsor_id)
            .await?
            .ok_or(AnalysisError::NotFound { sponsor_id })?;

        let (affiliations, transparency) = tokio::join!(
            self.provider.affiliations(sponsor_id),
            self.provider.transparency_records(sponsor_id),
        );
        let affiliations = affiliations?;
        let transparency = transparency?;

        let breakdown = RiskBreakdown {
            financial: self.financial_risk(&sponsor),
            affiliation: affiliation_risk(&affiliations),
            transparency: (
                (1.0 - disclosure_completeness(&affiliations, &transparency)) * 100.0
            )
                .round() as u32,
            behavioral: behavioral_risk(sponsor.voting_alignment),
        };

        let overall_score = weighted_overall(&breakdown);
        let level = determine_severity(overall_score);

        Ok(RiskProfile {
            sponsor_id,
            overall_score,
            level,
            recommendations: recommendations(level, &breakdown),
            breakdown,
        })
    }

    /// Exposure bucketed against the impact tiers on a fixed ladder.
    fn financial_risk(&self, sponsor: &Sponsor) -> u32 {
        let exposure = sponsor.financial_exposure;
        if exposure <= 0.0 {
            0
        } else if exposure < self.config.impact_low {
            10
        } else if exposure < self.config.impact_medium {
            30
        } else if exposure < self.config.impact_high {
            60
        } else if exposure < self.config.impact_critical {
            85
        } else {
            100
        }
    }
}

/// Weighted combination of the four dimensions: financial carries the most
/// weight, behavioral the least.
pub fn weighted_overall(breakdown: &RiskBreakdown) -> u32 {
    (breakdown.financial as f64 * 0.35
        + breakdown.affiliation as f64 * 0.30
        + breakdown.transparency as f64 * 0.20
        + breakdown.behavioral as f64 * 0.15)
        .round() as u32
}

/// Direct and indirect marker counts plus a volume bonus, capped at 100.
fn affiliation_risk(affiliations: &[Affiliation]) -> u32 {
    let direct = affiliations
        .iter()
        .filter(|a| {
            matches!(
                a.conflict_marker,
                Some(ConflictMarker::Ownership)
                    | Some(ConflictMarker::FinancialDirect)
                    | Some(ConflictMarker::FinancialIndirect)
            )
        })
        .count() as u32;
    let indirect = affiliations
        .iter()
        .filter(|a| {
            matches!(
                a.conflict_marker,
                Some(ConflictMarker::Influence) | Some(ConflictMarker::Representation)
            )
        })
        .count() as u32;

    let count_bonus = if affiliations.len() > 10 {
        30
    } else if affiliations.len() > 5 {
        15
    } else {
        0
    };

    (direct * 20 + indirect * 10 + count_bonus).min(100)
}

/// Alignment extremity curve: values near 0 or 100 score highest.
fn behavioral_risk(voting_alignment: Option<f64>) -> u32 {
    let Some(alignment) = voting_alignment else {
        return 10;
    };
    let extremity = (alignment - 50.0).abs();
    if extremity >= 45.0 {
        90
    } else if extremity >= 40.0 {
        70
    } else if extremity >= 35.0 {
        50
    } else if extremity >= 30.0 {
        30
    } else {
        10
    }
}

fn recommendations(level: Severity, breakdown: &RiskBreakdown) -> Vec<String> {
    let mut out = Vec::new();
    if level >= Severity::High {
        out.push("Flag sponsor for manual ethics review.".to_string());
    }
    if breakdown.financial > 70 {
        out.push("Audit declared financial exposure against sponsored legislation.".to_string());
    }
    if breakdown.affiliation > 60 {
        out.push("Review organizational affiliations for undeclared interests.".to_string());
    }
    if breakdown.transparency > 50 {
        out.push("Request verified disclosures for outstanding financial affiliations.".to_string());
    }
    if breakdown.behavioral > 60 {
        out.push("Examine voting record against affiliated organizations' interests.".to_string());
    }
    if out.is_empty() {
        out.push("No immediate action; monitor ongoing activity.".to_string());
    }
    out
}
