//! Conflict-of-interest analysis engine for legislative sponsors.
//!
//! Wraps a `sponsorwatch_data::DataProvider` with conflict detection,
//! severity scoring, risk profiling, conflict-network analytics, and
//! time-windowed trend analysis. Everything here is computed fresh per
//! request from current affiliation, disclosure, and sponsorship state;
//! the engine persists nothing.

pub mod config;
pub mod detector;
pub mod error;
pub mod graph;
pub mod graph_analysis;
pub mod risk;
pub mod service;
pub mod severity;
pub mod trends;

pub use sponsorwatch_data;

pub use config::{AnalysisConfig, SeverityStyle};
pub use detector::{ConflictDetectionResult, ConflictDetector};
pub use error::AnalysisError;
pub use graph::{ConflictEdge, ConflictGraph, ConflictGraphBuilder, ConflictNode, NodeKind};
pub use graph_analysis::{analyze, ConflictCluster, GraphAnalysis, NetworkMetrics};
pub use risk::{RiskBreakdown, RiskProfile, RiskProfileBuilder};
pub use service::ConflictAnalysisService;
pub use severity::{
    determine_severity, severity_score, ConflictType, ScoreContext, Severity,
};
pub use trends::{ConflictPrediction, ConflictTrend, TrendAnalyzer, TrendDirection};
