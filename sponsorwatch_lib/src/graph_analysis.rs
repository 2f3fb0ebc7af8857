//! Structural analytics over the conflict network.
//!
//! All functions here are synchronous and CPU-bound: the graph is already
//! in memory. Component traversal is an explicit stack-based DFS so the
//! stack stays bounded on large networks.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::graph::{ConflictEdge, ConflictNode};
use crate::severity::Severity;

/// A connected cluster of the conflict network.
#[derive(Serialize, Debug, Clone)]
pub struct ConflictCluster {
    pub id: String,
    /// Node ids in this cluster. Clusters partition the node set.
    pub members: Vec<String>,
    /// The member with the highest internal degree.
    pub center_node: String,
    /// Internal edges over possible member pairs, in [0, 1].
    pub conflict_density: f64,
    /// Bucketed mean member severity.
    pub risk_level: Severity,
}

/// Whole-network structural metrics.
#[derive(Serialize, Debug, Clone, Default)]
pub struct NetworkMetrics {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Realized edges over possible pairs, in [0, 1].
    pub density: f64,
    /// Mean local clustering coefficient over nodes with at least two
    /// neighbors, in [0, 1].
    pub clustering: f64,
    /// Degree per node id.
    pub centrality_scores: BTreeMap<String, usize>,
    /// Node counts per severity bucket.
    pub risk_distribution: BTreeMap<Severity, usize>,
}

/// Clusters plus metrics for one network.
#[derive(Serialize, Debug, Clone)]
pub struct GraphAnalysis {
    pub clusters: Vec<ConflictCluster>,
    pub metrics: NetworkMetrics,
}

/// Analyze a conflict network: connected clusters and structural metrics.
pub fn analyze(nodes: &[ConflictNode], edges: &[ConflictEdge]) -> GraphAnalysis {
    let adjacency = build_adjacency(edges);
    let clusters = find_clusters(nodes, edges, &adjacency);
    let metrics = compute_metrics(nodes, edges, &adjacency);
    GraphAnalysis { clusters, metrics }
}

/// Undirected unique-neighbor sets per node id.
fn build_adjacency(edges: &[ConflictEdge]) -> HashMap<&str, BTreeSet<&str>> {
    let mut adjacency: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.as_str());
        adjacency
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }
    adjacency
}

/// Partition the nodes into connected components with an iterative DFS.
fn find_clusters(
    nodes: &[ConflictNode],
    edges: &[ConflictEdge],
    adjacency: &HashMap<&str, BTreeSet<&str>>,
) -> Vec<ConflictCluster> {
    let severity_by_id: HashMap<&str, Severity> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.conflict_level))
        .collect();

    let mut visited: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();

    for node in nodes {
        if visited.contains(node.id.as_str()) {
            continue;
        }

        let mut members: Vec<&str> = Vec::new();
        let mut stack = vec![node.id.as_str()];
        visited.insert(node.id.as_str());
        while let Some(current) = stack.pop() {
            members.push(current);
            if let Some(neighbors) = adjacency.get(current) {
                for &neighbor in neighbors {
                    if visited.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }
        members.sort_unstable();

        let member_set: HashSet<&str> = members.iter().copied().collect();
        // Distinct pairs, so parallel typed edges cannot push density past 1.
        let internal_edges = edges
            .iter()
            .filter(|e| {
                member_set.contains(e.source.as_str()) && member_set.contains(e.target.as_str())
            })
            .map(|e| unordered_pair(&e.source, &e.target))
            .collect::<HashSet<_>>()
            .len();

        let center_node = members
            .iter()
            .max_by_key(|m| internal_degree(m, edges, &member_set))
            .copied()
            .unwrap_or(node.id.as_str());

        let possible_pairs = members.len() * members.len().saturating_sub(1) / 2;
        let conflict_density = if possible_pairs == 0 {
            0.0
        } else {
            internal_edges as f64 / possible_pairs as f64
        };

        let mean_rank = members
            .iter()
            .filter_map(|m| severity_by_id.get(m))
            .map(|s| s.rank() as f64)
            .sum::<f64>()
            / members.len() as f64;

        clusters.push(ConflictCluster {
            id: format!("cluster-{}", clusters.len() + 1),
            members: members.iter().map(|m| m.to_string()).collect(),
            center_node: center_node.to_string(),
            conflict_density,
            risk_level: bucket_mean_rank(mean_rank),
        });
    }
    clusters
}

fn unordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn internal_degree(node: &str, edges: &[ConflictEdge], members: &HashSet<&str>) -> usize {
    edges
        .iter()
        .filter(|e| members.contains(e.source.as_str()) && members.contains(e.target.as_str()))
        .filter(|e| e.source == node || e.target == node)
        .count()
}

fn bucket_mean_rank(mean_rank: f64) -> Severity {
    if mean_rank >= 3.5 {
        Severity::Critical
    } else if mean_rank >= 2.5 {
        Severity::High
    } else if mean_rank >= 1.5 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn compute_metrics(
    nodes: &[ConflictNode],
    edges: &[ConflictEdge],
    adjacency: &HashMap<&str, BTreeSet<&str>>,
) -> NetworkMetrics {
    let connected_pairs = edges
        .iter()
        .map(|e| unordered_pair(&e.source, &e.target))
        .collect::<HashSet<_>>()
        .len();
    let possible_pairs = nodes.len() * nodes.len().saturating_sub(1);
    let density = if possible_pairs == 0 {
        0.0
    } else {
        2.0 * connected_pairs as f64 / possible_pairs as f64
    };

    let mut centrality_scores: BTreeMap<String, usize> =
        nodes.iter().map(|n| (n.id.clone(), 0)).collect();
    for edge in edges {
        if let Some(degree) = centrality_scores.get_mut(&edge.source) {
            *degree += 1;
        }
        if let Some(degree) = centrality_scores.get_mut(&edge.target) {
            *degree += 1;
        }
    }

    let mut risk_distribution: BTreeMap<Severity, usize> = BTreeMap::new();
    for node in nodes {
        *risk_distribution.entry(node.conflict_level).or_default() += 1;
    }

    NetworkMetrics {
        total_nodes: nodes.len(),
        total_edges: edges.len(),
        density,
        clustering: average_clustering(nodes, adjacency),
        centrality_scores,
        risk_distribution,
    }
}

/// Mean local clustering coefficient. Nodes with fewer than two neighbors
/// are excluded from the average, not counted as zero.
fn average_clustering(
    nodes: &[ConflictNode],
    adjacency: &HashMap<&str, BTreeSet<&str>>,
) -> f64 {
    let mut coefficients = Vec::new();
    for node in nodes {
        let Some(neighbors) = adjacency.get(node.id.as_str()) else {
            continue;
        };
        if neighbors.len() < 2 {
            continue;
        }
        let neighbors: Vec<&str> = neighbors.iter().copied().collect();
        let possible = neighbors.len() * (neighbors.len() - 1) / 2;
        let mut connected = 0;
        for i in 0..neighbors.len() {
            for j in (i + 1)..neighbors.len() {
                if adjacency
                    .get(neighbors[i])
                    .is_some_and(|n| n.contains(neighbors[j]))
                {
                    connected += 1;
                }
            }
        }
        coefficients.push(connected as f64 / possible as f64);
    }
    if coefficients.is_empty() {
        0.0
    } else {
        coefficients.iter().sum::<f64>() / coefficients.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::ConflictType;

    fn node(id: &str, level: Severity) -> ConflictNode {
        ConflictNode {
            id: id.to_string(),
            kind: crate::graph::NodeKind::Sponsor,
            name: id.to_string(),
            conflict_level: level,
            size: 6,
            color: "#7cb342".to_string(),
        }
    }

    fn edge(source: &str, target: &str) -> ConflictEdge {
        ConflictEdge {
            source: source.to_string(),
            target: target.to_string(),
            conflict_type: ConflictType::FinancialDirect,
            weight: 1,
            severity: Severity::Low,
            label: None,
        }
    }

    /// Scenario: sponsor S connected to org O and bill B only.
    #[test]
    fn test_single_star_cluster() {
        let nodes = vec![
            node("sponsor:1", Severity::Medium),
            node("org:Acme", Severity::Medium),
            node("bill:9", Severity::Medium),
        ];
        let edges = vec![edge("sponsor:1", "org:Acme"), edge("sponsor:1", "bill:9")];

        let analysis = analyze(&nodes, &edges);

        assert_eq!(analysis.clusters.len(), 1);
        let cluster = &analysis.clusters[0];
        assert_eq!(cluster.members.len(), 3);
        assert_eq!(cluster.center_node, "sponsor:1");
        // 2 edges over 3 possible pairs.
        assert!((cluster.conflict_density - 2.0 / 3.0).abs() < 1e-9);

        assert_eq!(analysis.metrics.centrality_scores["sponsor:1"], 2);
        assert_eq!(analysis.metrics.centrality_scores["org:Acme"], 1);
        assert_eq!(analysis.metrics.centrality_scores["bill:9"], 1);
        // Global density: 2*2 / (3*2).
        assert!((analysis.metrics.density - 2.0 / 3.0).abs() < 1e-9);
        // S's two neighbors are not connected to each other; O and B have
        // one neighbor each and are excluded.
        assert_eq!(analysis.metrics.clustering, 0.0);
    }

    #[test]
    fn test_clusters_partition_nodes() {
        let nodes = vec![
            node("sponsor:1", Severity::Low),
            node("org:A", Severity::Low),
            node("sponsor:2", Severity::High),
            node("org:B", Severity::High),
            node("sponsor:3", Severity::Low),
        ];
        let edges = vec![edge("sponsor:1", "org:A"), edge("sponsor:2", "org:B")];

        let analysis = analyze(&nodes, &edges);

        assert_eq!(analysis.clusters.len(), 3);
        let mut all_members: Vec<&String> = analysis
            .clusters
            .iter()
            .flat_map(|c| c.members.iter())
            .collect();
        all_members.sort();
        assert_eq!(all_members.len(), nodes.len());
        let distinct: HashSet<&String> = all_members.iter().copied().collect();
        assert_eq!(distinct.len(), nodes.len());
    }

    #[test]
    fn test_triangle_clustering_is_one() {
        let nodes = vec![
            node("sponsor:1", Severity::Low),
            node("org:A", Severity::Low),
            node("bill:1", Severity::Low),
        ];
        let edges = vec![
            edge("sponsor:1", "org:A"),
            edge("sponsor:1", "bill:1"),
            edge("org:A", "bill:1"),
        ];

        let analysis = analyze(&nodes, &edges);
        assert!((analysis.metrics.clustering - 1.0).abs() < 1e-9);
        assert!((analysis.metrics.density - 1.0).abs() < 1e-9);
        assert_eq!(analysis.clusters[0].conflict_density, 1.0);
    }

    #[test]
    fn test_cluster_risk_buckets() {
        // Mean rank (4 + 4 + 3) / 3 = 3.67 -> critical.
        let nodes = vec![
            node("sponsor:1", Severity::Critical),
            node("org:A", Severity::Critical),
            node("bill:1", Severity::High),
        ];
        let edges = vec![edge("sponsor:1", "org:A"), edge("sponsor:1", "bill:1")];
        let analysis = analyze(&nodes, &edges);
        assert_eq!(analysis.clusters[0].risk_level, Severity::Critical);

        // A lone low node is its own low cluster.
        let lone = vec![node("sponsor:9", Severity::Low)];
        let analysis = analyze(&lone, &[]);
        assert_eq!(analysis.clusters.len(), 1);
        assert_eq!(analysis.clusters[0].risk_level, Severity::Low);
        assert_eq!(analysis.clusters[0].conflict_density, 0.0);
        assert_eq!(analysis.clusters[0].center_node, "sponsor:9");
    }

    #[test]
    fn test_empty_graph() {
        let analysis = analyze(&[], &[]);
        assert!(analysis.clusters.is_empty());
        assert_eq!(analysis.metrics.total_nodes, 0);
        assert_eq!(analysis.metrics.total_edges, 0);
        assert_eq!(analysis.metrics.density, 0.0);
        assert_eq!(analysis.metrics.clustering, 0.0);
    }

    #[test]
    fn test_bounds_hold_on_denser_graphs() {
        let nodes: Vec<ConflictNode> = (1..=6)
            .map(|i| node(&format!("sponsor:{i}"), Severity::Medium))
            .collect();
        let mut edges = Vec::new();
        for i in 1..=6 {
            for j in (i + 1)..=6 {
                if (i + j) % 2 == 0 {
                    edges.push(edge(&format!("sponsor:{i}"), &format!("sponsor:{j}")));
                }
            }
        }

        let analysis = analyze(&nodes, &edges);
        assert!((0.0..=1.0).contains(&analysis.metrics.density));
        assert!((0.0..=1.0).contains(&analysis.metrics.clustering));
        for cluster in &analysis.clusters {
            assert!((0.0..=1.0).contains(&cluster.conflict_density));
        }
    }

    #[test]
    fn test_parallel_typed_edges_do_not_inflate_density() {
        let nodes = vec![node("sponsor:1", Severity::Low), node("org:A", Severity::Low)];
        let mut second = edge("sponsor:1", "org:A");
        second.conflict_type = ConflictType::Organizational;
        let edges = vec![edge("sponsor:1", "org:A"), second];

        let analysis = analyze(&nodes, &edges);
        assert!((analysis.metrics.density - 1.0).abs() < 1e-9);
        assert!((analysis.clusters[0].conflict_density - 1.0).abs() < 1e-9);
        // Centrality still counts every touching edge.
        assert_eq!(analysis.metrics.centrality_scores["sponsor:1"], 2);
    }

    #[test]
    fn test_risk_distribution_counts() {
        let nodes = vec![
            node("sponsor:1", Severity::High),
            node("org:A", Severity::High),
            node("bill:1", Severity::Low),
        ];
        let analysis = analyze(&nodes, &[]);
        assert_eq!(analysis.metrics.risk_distribution[&Severity::High], 2);
        assert_eq!(analysis.metrics.risk_distribution[&Severity::Low], 1);
    }
}
