//! Conflict graph construction.
//!
//! Turns a flat conflict list into deduplicated nodes (sponsors,
//! organizations, bills) and edges. Name lookups are best-effort: a failed
//! batch fetch falls back to placeholder names rather than failing the
//! graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use sponsorwatch_data::types::{BillId, SponsorId};
use sponsorwatch_data::DataProvider;

use crate::config::AnalysisConfig;
use crate::detector::ConflictDetectionResult;
use crate::graph_analysis::{ConflictCluster, NetworkMetrics};
use crate::severity::{ConflictType, Severity};

/// Node kind in the conflict network.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    #[serde(rename = "sponsor")]
    Sponsor,
    #[serde(rename = "organization")]
    Organization,
    #[serde(rename = "bill")]
    Bill,
}

/// A node in the conflict network. Ids are namespaced: `sponsor:<id>`,
/// `org:<name>`, `bill:<id>`.
#[derive(Serialize, Debug, Clone)]
pub struct ConflictNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    /// Highest severity among conflicts touching this node.
    pub conflict_level: Severity,
    /// Visual diameter in pixels, derived from severity.
    pub size: u32,
    /// Fill color, derived from severity.
    pub color: String,
}

/// An edge in the conflict network, deduplicated by
/// (source, target, conflict type).
#[derive(Serialize, Debug, Clone)]
pub struct ConflictEdge {
    pub source: String,
    pub target: String,
    pub conflict_type: ConflictType,
    /// Severity-derived weight.
    pub weight: u32,
    pub severity: Severity,
    pub label: Option<String>,
}

/// The assembled conflict network with its analytics.
#[derive(Serialize, Debug, Clone)]
pub struct ConflictGraph {
    pub nodes: Vec<ConflictNode>,
    pub edges: Vec<ConflictEdge>,
    pub clusters: Vec<ConflictCluster>,
    pub metrics: NetworkMetrics,
    /// True when an internal failure degraded this mapping to an empty
    /// structure. An empty, non-degraded graph simply has no conflicts.
    pub degraded: bool,
}

impl ConflictGraph {
    /// A well-formed empty graph: zeroed metrics, no nodes or clusters.
    pub fn empty(degraded: bool) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
            metrics: NetworkMetrics::default(),
            degraded,
        }
    }
}

/// Builds nodes and edges from a conflict list.
#[derive(Clone)]
pub struct ConflictGraphBuilder {
    provider: Arc<dyn DataProvider>,
    config: Arc<AnalysisConfig>,
}

impl ConflictGraphBuilder {
    pub fn new(provider: Arc<dyn DataProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { provider, config }
    }

    /// Build deduplicated nodes and edges.
    ///
    /// One node per distinct sponsor, organization, and bill; one edge
    /// sponsor-to-organization and sponsor-to-bill per conflict, keeping
    /// the higher-severity edge on duplicates.
    pub async fn build_graph(
        &self,
        conflicts: &[ConflictDetectionResult],
    ) -> (Vec<ConflictNode>, Vec<ConflictEdge>) {
        let sponsor_names = self.fetch_sponsor_names(conflicts).await;
        let bill_titles = self.fetch_bill_titles(conflicts).await;

        let mut nodes: BTreeMap<String, (NodeKind, String, Severity)> = BTreeMap::new();
        let mut edges: BTreeMap<(String, String, ConflictType), Severity> = BTreeMap::new();

        let upsert_node =
            |map: &mut BTreeMap<String, (NodeKind, String, Severity)>,
             id: String,
             kind: NodeKind,
             name: String,
             severity: Severity| {
                map.entry(id)
                    .and_modify(|(_, _, level)| *level = (*level).max(severity))
                    .or_insert((kind, name, severity));
            };

        for conflict in conflicts {
            let sponsor_node = format!("sponsor:{}", conflict.sponsor_id);
            let sponsor_name = sponsor_names
                .get(&conflict.sponsor_id)
                .cloned()
                .unwrap_or_else(|| format!("Sponsor {}", conflict.sponsor_id));
            upsert_node(
                &mut nodes,
                sponsor_node.clone(),
                NodeKind::Sponsor,
                sponsor_name,
                conflict.severity,
            );

            for organization in conflict
                .evidence
                .iter()
                .filter_map(|e| e.strip_prefix("org:"))
            {
                let org_node = format!("org:{organization}");
                upsert_node(
                    &mut nodes,
                    org_node.clone(),
                    NodeKind::Organization,
                    organization.to_string(),
                    conflict.severity,
                );
                upsert_edge(
                    &mut edges,
                    sponsor_node.clone(),
                    org_node,
                    conflict.conflict_type,
                    conflict.severity,
                );
            }

            for bill_id in &conflict.affected_bills {
                let bill_node = format!("bill:{bill_id}");
                let title = bill_titles
                    .get(bill_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Bill {bill_id}"));
                upsert_node(
                    &mut nodes,
                    bill_node.clone(),
                    NodeKind::Bill,
                    title,
                    conflict.severity,
                );
                upsert_edge(
                    &mut edges,
                    sponsor_node.clone(),
                    bill_node,
                    conflict.conflict_type,
                    conflict.severity,
                );
            }
        }

        let nodes = nodes
            .into_iter()
            .map(|(id, (kind, name, conflict_level))| {
                let style = self.config.style(conflict_level);
                ConflictNode {
                    id,
                    kind,
                    name,
                    conflict_level,
                    size: style.node_size,
                    color: style.color.clone(),
                }
            })
            .collect();

        let edges = edges
            .into_iter()
            .map(|((source, target, conflict_type), severity)| ConflictEdge {
                source,
                target,
                conflict_type,
                weight: self.config.style(severity).edge_weight,
                severity,
                label: Some(conflict_type.to_string()),
            })
            .collect();

        (nodes, edges)
    }

    async fn fetch_sponsor_names(
        &self,
        conflicts: &[ConflictDetectionResult],
    ) -> HashMap<SponsorId, String> {
        let ids: Vec<SponsorId> = conflicts
            .iter()
            .map(|c| c.sponsor_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.provider.sponsors_by_ids(&ids).await {
            Ok(sponsors) => sponsors.into_iter().map(|s| (s.id, s.full_name)).collect(),
            Err(err) => {
                warn!(error = %err, "sponsor name lookup failed, using placeholders");
                HashMap::new()
            }
        }
    }

    async fn fetch_bill_titles(
        &self,
        conflicts: &[ConflictDetectionResult],
    ) -> HashMap<BillId, String> {
        let ids: Vec<BillId> = conflicts
            .iter()
            .flat_map(|c| c.affected_bills.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.provider.bills_by_ids(&ids).await {
            Ok(bills) => bills.into_iter().map(|b| (b.id, b.title)).collect(),
            Err(err) => {
                warn!(error = %err, "bill title lookup failed, using placeholders");
                HashMap::new()
            }
        }
    }
}

fn upsert_edge(
    edges: &mut BTreeMap<(String, String, ConflictType), Severity>,
    source: String,
    target: String,
    conflict_type: ConflictType,
    severity: Severity,
) {
    edges
        .entry((source, target, conflict_type))
        .and_modify(|existing| *existing = (*existing).max(severity))
        .or_insert(severity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sponsorwatch_data::types::Sponsor;
    use sponsorwatch_data::MemoryProvider;

    fn conflict(
        sponsor_id: SponsorId,
        conflict_type: ConflictType,
        severity: Severity,
        orgs: &[&str],
        bills: &[BillId],
    ) -> ConflictDetectionResult {
        let mut evidence = vec!["affiliation:1".to_string()];
        evidence.extend(orgs.iter().map(|o| format!("org:{o}")));
        ConflictDetectionResult {
            conflict_id: format!("{conflict_type}-test"),
            sponsor_id,
            conflict_type,
            severity,
            description: String::new(),
            affected_bills: bills.iter().copied().collect(),
            financial_impact: 0.0,
            detected_at: Utc::now(),
            confidence: 0.8,
            evidence,
            related_affiliation_id: Some(1),
        }
    }

    fn builder(provider: MemoryProvider) -> ConflictGraphBuilder {
        ConflictGraphBuilder::new(Arc::new(provider), Arc::new(AnalysisConfig::default()))
    }

    #[tokio::test]
    async fn test_nodes_and_edges_deduplicate() {
        let conflicts = vec![
            conflict(
                1,
                ConflictType::FinancialDirect,
                Severity::Medium,
                &["Acme Corp"],
                &[100],
            ),
            // Same sponsor, org, bill, and type: must not duplicate.
            conflict(
                1,
                ConflictType::FinancialDirect,
                Severity::High,
                &["Acme Corp"],
                &[100],
            ),
        ];
        let provider = MemoryProvider::new().with_sponsors(vec![Sponsor {
            id: 1,
            full_name: "Dana Reyes".to_string(),
            is_active: true,
            financial_exposure: 0.0,
            voting_alignment: None,
        }]);

        let (nodes, edges) = builder(provider).build_graph(&conflicts).await;
        assert_eq!(nodes.len(), 3);
        assert_eq!(edges.len(), 2);

        // The duplicate kept the higher severity.
        let sponsor = nodes.iter().find(|n| n.id == "sponsor:1").unwrap();
        assert_eq!(sponsor.name, "Dana Reyes");
        assert_eq!(sponsor.conflict_level, Severity::High);
        assert_eq!(sponsor.size, 14);
        let edge = edges.iter().find(|e| e.target == "org:Acme Corp").unwrap();
        assert_eq!(edge.severity, Severity::High);
        assert_eq!(edge.weight, 3);
    }

    #[tokio::test]
    async fn test_distinct_types_keep_parallel_edges() {
        let conflicts = vec![
            conflict(
                1,
                ConflictType::FinancialDirect,
                Severity::Medium,
                &["Acme Corp"],
                &[],
            ),
            conflict(
                1,
                ConflictType::Organizational,
                Severity::Low,
                &["Acme Corp"],
                &[],
            ),
        ];

        let (_, edges) = builder(MemoryProvider::new()).build_graph(&conflicts).await;
        assert_eq!(edges.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_placeholders() {
        let conflicts = vec![conflict(
            7,
            ConflictType::FinancialDirect,
            Severity::Low,
            &["Acme Corp"],
            &[42],
        )];

        let (nodes, _) = builder(MemoryProvider::failing()).build_graph(&conflicts).await;
        let sponsor = nodes.iter().find(|n| n.id == "sponsor:7").unwrap();
        assert_eq!(sponsor.name, "Sponsor 7");
        let bill = nodes.iter().find(|n| n.id == "bill:42").unwrap();
        assert_eq!(bill.name, "Bill 42");
    }

    #[tokio::test]
    async fn test_disclosure_conflict_yields_isolated_sponsor_node() {
        let conflicts = vec![ConflictDetectionResult {
            evidence: vec!["affiliation:1".to_string(), "affiliation:2".to_string()],
            ..conflict(
                3,
                ConflictType::DisclosureIncomplete,
                Severity::High,
                &[],
                &[],
            )
        }];

        let (nodes, edges) = builder(MemoryProvider::new()).build_graph(&conflicts).await;
        assert_eq!(nodes.len(), 1);
        assert!(edges.is_empty());
    }
}
