//! Time-windowed conflict trend analysis.
//!
//! The engine keeps no conflict history: "historical" conflicts are
//! synthesized by re-running detection against current state and filtering
//! by detection timestamp. Trends therefore reflect the present shape of a
//! sponsor's record, not a persisted timeline. Predictions carry a fixed
//! low-confidence placeholder and must not be read as a calibrated
//! forecast.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::warn;

use sponsorwatch_data::types::{BillId, SponsorId};
use sponsorwatch_data::DataProvider;

use crate::detector::{ConflictDetectionResult, ConflictDetector};
use crate::error::AnalysisError;
use crate::severity::ConflictType;

/// Direction of the severity trend across the analysis window.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    #[serde(rename = "increasing")]
    Increasing,
    #[serde(rename = "decreasing")]
    Decreasing,
    #[serde(rename = "stable")]
    Stable,
}

/// A best-effort conflict forecast for one bill.
#[derive(Serialize, Debug, Clone)]
pub struct ConflictPrediction {
    pub bill_id: BillId,
    pub predicted_type: ConflictType,
    /// Fixed placeholder probability.
    pub probability: f64,
    /// Organization names most frequent among the sponsor's affiliations.
    pub risk_factors: Vec<String>,
}

/// Trend summary for one sponsor over one timeframe.
#[derive(Serialize, Debug, Clone)]
pub struct ConflictTrend {
    pub sponsor_id: SponsorId,
    pub timeframe: String,
    pub conflict_count: usize,
    pub severity_trend: TrendDirection,
    pub risk_score: u32,
    pub predictions: Vec<ConflictPrediction>,
}

/// Wraps the detector with a time filter and trend arithmetic.
#[derive(Clone)]
pub struct TrendAnalyzer {
    detector: ConflictDetector,
    provider: Arc<dyn DataProvider>,
}

impl TrendAnalyzer {
    pub fn new(detector: ConflictDetector, provider: Arc<dyn DataProvider>) -> Self {
        Self { detector, provider }
    }

    /// Analyze conflict trends for a sponsor over the last `months` months.
    /// Returns a single-element list.
    pub async fn analyze_conflict_trends(
        &self,
        sponsor_id: SponsorId,
        months: u32,
    ) -> Result<Vec<ConflictTrend>, AnalysisError> {
        let conflicts = self.detector.detect_conflicts(Some(sponsor_id)).await?;

        let now = Utc::now();
        let window_start = now - Duration::days(months as i64 * 30);
        let midpoint = now - Duration::days(months as i64 * 15);

        let windowed: Vec<&ConflictDetectionResult> = conflicts
            .iter()
            .filter(|c| c.detected_at >= window_start)
            .collect();

        let (recent, older): (Vec<_>, Vec<_>) = windowed
            .iter()
            .copied()
            .partition(|c| c.detected_at >= midpoint);
        let severity_trend = direction_from_means(mean_rank(&recent), mean_rank(&older));
        let risk_score = trend_risk_score(windowed.len(), mean_rank(&windowed));

        let predictions = self.predict(sponsor_id, &windowed).await;

        Ok(vec![ConflictTrend {
            sponsor_id,
            timeframe: format!("{months} months"),
            conflict_count: windowed.len(),
            severity_trend,
            risk_score,
            predictions,
        }])
    }

    /// Uncalibrated stub: affected bills against the sponsor's most frequent
    /// detected type, with the top affiliation organizations as risk
    /// factors.
    async fn predict(
        &self,
        sponsor_id: SponsorId,
        windowed: &[&ConflictDetectionResult],
    ) -> Vec<ConflictPrediction> {
        if windowed.is_empty() {
            return Vec::new();
        }

        let risk_factors = match self.provider.affiliations(sponsor_id).await {
            Ok(affiliations) => top_organizations(
                affiliations.iter().map(|a| a.organization.clone()),
                2,
            ),
            Err(err) => {
                warn!(sponsor_id, error = %err, "affiliation lookup failed, predicting without risk factors");
                Vec::new()
            }
        };

        let mut type_counts: HashMap<ConflictType, usize> = HashMap::new();
        for conflict in windowed {
            *type_counts.entry(conflict.conflict_type).or_default() += 1;
        }
        let predicted_type = type_counts
            .into_iter()
            .max_by_key(|(conflict_type, count)| (*count, std::cmp::Reverse(*conflict_type)))
            .map(|(conflict_type, _)| conflict_type)
            .unwrap_or(ConflictType::FinancialIndirect);

        let mut bill_ids: Vec<BillId> = windowed
            .iter()
            .flat_map(|c| c.affected_bills.iter().copied())
            .collect();
        bill_ids.sort_unstable();
        bill_ids.dedup();

        bill_ids
            .into_iter()
            .take(3)
            .map(|bill_id| ConflictPrediction {
                bill_id,
                predicted_type,
                probability: 0.2,
                risk_factors: risk_factors.clone(),
            })
            .collect()
    }
}

fn mean_rank(conflicts: &[&ConflictDetectionResult]) -> f64 {
    if conflicts.is_empty() {
        return 0.0;
    }
    conflicts
        .iter()
        .map(|c| c.severity.rank() as f64)
        .sum::<f64>()
        / conflicts.len() as f64
}

fn direction_from_means(recent: f64, older: f64) -> TrendDirection {
    if recent - older > 0.5 {
        TrendDirection::Increasing
    } else if older - recent > 0.5 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

fn trend_risk_score(count: usize, mean_rank: f64) -> u32 {
    ((count as f64 * 10.0 + mean_rank * 20.0).min(100.0)).round() as u32
}

fn top_organizations(organizations: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for organization in organizations {
        *counts.entry(organization).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted.into_iter().map(|(organization, _)| organization).collect()
}
