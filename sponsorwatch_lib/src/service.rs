//! The analysis façade consumed by the presentation layer.
//!
//! Wires the detector, risk builder, graph builder, and trend analyzer
//! together and applies the per-endpoint failure policy: detection and risk
//! calls surface errors (`NotFound` as-is, anything else wrapped as an
//! aggregation failure); the graph and trend endpoints degrade to empty,
//! well-formed structures so a dashboard never crashes on partial data.
//! Callers needing to distinguish "no conflicts" from "analysis failed" use
//! the graph's `degraded` flag or the logs.

use std::sync::Arc;

use tracing::error;

use sponsorwatch_data::types::{BillId, SponsorId};
use sponsorwatch_data::DataProvider;

use crate::config::AnalysisConfig;
use crate::detector::{ConflictDetectionResult, ConflictDetector};
use crate::error::AnalysisError;
use crate::graph::{ConflictGraph, ConflictGraphBuilder};
use crate::graph_analysis::analyze;
use crate::risk::{RiskProfile, RiskProfileBuilder};
use crate::trends::{ConflictTrend, TrendAnalyzer};

const DEFAULT_TREND_MONTHS: u32 = 12;

/// In-process entry point for conflict analysis.
pub struct ConflictAnalysisService {
    detector: ConflictDetector,
    risk: RiskProfileBuilder,
    graph_builder: ConflictGraphBuilder,
    trends: TrendAnalyzer,
}

impl ConflictAnalysisService {
    pub fn new(provider: Arc<dyn DataProvider>, config: AnalysisConfig) -> Self {
        let config = Arc::new(config);
        let detector = ConflictDetector::new(Arc::clone(&provider), Arc::clone(&config));
        Self {
            risk: RiskProfileBuilder::new(Arc::clone(&provider), Arc::clone(&config)),
            graph_builder: ConflictGraphBuilder::new(Arc::clone(&provider), config),
            trends: TrendAnalyzer::new(detector.clone(), provider),
            detector,
        }
    }

    /// Detect conflicts for one sponsor, or all active sponsors when `None`.
    pub async fn detect_conflicts(
        &self,
        sponsor_id: Option<SponsorId>,
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        self.detector
            .detect_conflicts(sponsor_id)
            .await
            .map_err(wrap_orchestration)
    }

    /// Generate the aggregate risk profile for a sponsor.
    pub async fn generate_risk_profile(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<RiskProfile, AnalysisError> {
        self.risk
            .generate_risk_profile(sponsor_id)
            .await
            .map_err(wrap_orchestration)
    }

    /// Build the conflict network, optionally restricted to conflicts
    /// touching one bill. Degrades to an empty graph on internal failure.
    pub async fn create_conflict_mapping(&self, bill_id: Option<BillId>) -> ConflictGraph {
        let conflicts = match self.detector.detect_conflicts(None).await {
            Ok(conflicts) => conflicts,
            Err(err) => {
                error!(error = %err, "conflict mapping degraded to empty graph");
                return ConflictGraph::empty(true);
            }
        };

        let conflicts: Vec<ConflictDetectionResult> = match bill_id {
            Some(bill_id) => conflicts
                .into_iter()
                .filter(|c| c.affected_bills.contains(&bill_id))
                .collect(),
            None => conflicts,
        };

        let (nodes, edges) = self.graph_builder.build_graph(&conflicts).await;
        let analysis = analyze(&nodes, &edges);
        ConflictGraph {
            nodes,
            edges,
            clusters: analysis.clusters,
            metrics: analysis.metrics,
            degraded: false,
        }
    }

    /// Analyze conflict trends for a sponsor; `months` defaults to 12.
    /// Degrades to an empty list on internal failure.
    pub async fn analyze_conflict_trends(
        &self,
        sponsor_id: SponsorId,
        months: Option<u32>,
    ) -> Vec<ConflictTrend> {
        let months = months.unwrap_or(DEFAULT_TREND_MONTHS);
        match self.trends.analyze_conflict_trends(sponsor_id, months).await {
            Ok(trends) => trends,
            Err(err) => {
                error!(sponsor_id, error = %err, "trend analysis degraded to empty result");
                Vec::new()
            }
        }
    }
}

/// `NotFound` is reported as-is; anything else is an orchestration failure
/// wrapped with context.
fn wrap_orchestration(err: AnalysisError) -> AnalysisError {
    match err {
        AnalysisError::NotFound { .. } | AnalysisError::Aggregation(_) => err,
        other => AnalysisError::Aggregation(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sponsorwatch_data::types::{
        Affiliation, AffiliationType, Bill, Sponsor, Sponsorship,
    };
    use sponsorwatch_data::MemoryProvider;

    fn service(provider: MemoryProvider) -> ConflictAnalysisService {
        ConflictAnalysisService::new(Arc::new(provider), AnalysisConfig::default())
    }

    fn fixture() -> MemoryProvider {
        let intro = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        MemoryProvider::new()
            .with_sponsors(vec![Sponsor {
                id: 1,
                full_name: "Dana Reyes".to_string(),
                is_active: true,
                financial_exposure: 2_000_000.0,
                voting_alignment: Some(50.0),
            }])
            .with_affiliations(vec![Affiliation {
                id: 10,
                sponsor_id: 1,
                organization: "Acme Corp".to_string(),
                role: "Consultant".to_string(),
                affiliation_type: AffiliationType::Economic,
                conflict_marker: None,
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                end_date: None,
            }])
            .with_sponsorships(vec![
                Sponsorship {
                    sponsor_id: 1,
                    bill_id: 100,
                    sponsored_at: intro,
                },
                Sponsorship {
                    sponsor_id: 1,
                    bill_id: 200,
                    sponsored_at: intro,
                },
            ])
            .with_bills(vec![
                Bill {
                    id: 100,
                    title: "Acme Corp relief act".to_string(),
                    summary: None,
                    introduced_date: intro,
                },
                Bill {
                    id: 200,
                    title: "Rural broadband act".to_string(),
                    summary: None,
                    introduced_date: intro,
                },
            ])
    }

    #[tokio::test]
    async fn test_mapping_filters_by_bill() {
        let service = service(fixture());

        let full = service.create_conflict_mapping(None).await;
        assert!(!full.degraded);
        assert!(full.nodes.iter().any(|n| n.id == "bill:100"));

        let filtered = service.create_conflict_mapping(Some(200)).await;
        assert!(!filtered.degraded);
        assert!(!filtered.nodes.iter().any(|n| n.id == "bill:100"));
    }

    #[tokio::test]
    async fn test_mapping_degrades_on_provider_failure() {
        let service = service(MemoryProvider::failing());
        let graph = service.create_conflict_mapping(None).await;

        assert!(graph.degraded);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.clusters.is_empty());
        assert_eq!(graph.metrics.total_nodes, 0);
        assert_eq!(graph.metrics.density, 0.0);
    }

    #[tokio::test]
    async fn test_empty_mapping_is_not_degraded() {
        let provider = MemoryProvider::new().with_sponsors(vec![Sponsor {
            id: 1,
            full_name: "Dana Reyes".to_string(),
            is_active: true,
            financial_exposure: 0.0,
            voting_alignment: None,
        }]);
        let graph = service(provider).create_conflict_mapping(None).await;
        assert!(!graph.degraded);
        assert!(graph.nodes.is_empty());
    }

    #[tokio::test]
    async fn test_trends_degrade_to_empty() {
        let service = service(MemoryProvider::failing());
        let trends = service.analyze_conflict_trends(1, None).await;
        assert!(trends.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_passes_through() {
        let service = service(MemoryProvider::new());
        let err = service.generate_risk_profile(9).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { sponsor_id: 9 }));

        let err = service.detect_conflicts(Some(9)).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { sponsor_id: 9 }));
    }

    #[tokio::test]
    async fn test_provider_failure_wraps_as_aggregation() {
        let service = service(MemoryProvider::failing());
        let err = service.detect_conflicts(Some(1)).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Aggregation(_)));
    }
}
