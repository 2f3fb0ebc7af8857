//! Immutable analysis configuration.
//!
//! Every tunable the engine uses lives here and is injected at construction.
//! The defaults are the production thresholds; services never mutate a
//! config after creation.

use crate::severity::Severity;

/// Visual encoding for one severity bucket, used by graph construction.
#[derive(Debug, Clone)]
pub struct SeverityStyle {
    /// Node fill color as a hex string.
    pub color: String,
    /// Node diameter in pixels.
    pub node_size: u32,
    /// Edge weight.
    pub edge_weight: u32,
}

impl SeverityStyle {
    fn new(color: &str, node_size: u32, edge_weight: u32) -> Self {
        Self {
            color: color.to_string(),
            node_size,
            edge_weight,
        }
    }
}

/// Thresholds, weights, and visual ladders for the analysis engine.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Max day gap between an affiliation start and a bill introduction for
    /// the timing detector to flag the pair.
    pub suspicious_days: i64,

    /// Day gap at or below which a timing flag escalates to high severity.
    pub very_suspicious_days: i64,

    /// Disclosure completeness below this raises a conflict.
    pub disclosure_adequate_threshold: f64,

    /// Completeness below this escalates the conflict to high severity.
    /// Note this bar is looser than the trigger bar, so most triggered
    /// conflicts escalate; kept as-is pending product clarification.
    pub disclosure_complete_threshold: f64,

    /// Affiliations started within this many days count as recent activity
    /// for scoring.
    pub recent_activity_days: i64,

    /// Batch bound when analyzing all active sponsors.
    pub active_sponsor_limit: usize,

    /// Concurrent per-sponsor analyses during the all-sponsor fan-out.
    pub sponsor_concurrency: usize,

    /// Financial impact tier boundaries in dollars, ascending.
    pub impact_low: f64,
    pub impact_medium: f64,
    pub impact_high: f64,
    pub impact_critical: f64,

    /// Role keywords matched case-insensitively as substrings to identify
    /// leadership positions.
    pub leadership_keywords: Vec<String>,

    /// Visual ladders per severity bucket.
    pub style_low: SeverityStyle,
    pub style_medium: SeverityStyle,
    pub style_high: SeverityStyle,
    pub style_critical: SeverityStyle,
}

impl AnalysisConfig {
    /// The visual style for a severity bucket.
    pub fn style(&self, severity: Severity) -> &SeverityStyle {
        match severity {
            Severity::Low => &self.style_low,
            Severity::Medium => &self.style_medium,
            Severity::High => &self.style_high,
            Severity::Critical => &self.style_critical,
        }
    }

    /// Whether a free-text role denotes a leadership position.
    pub fn is_leadership_role(&self, role: &str) -> bool {
        let role = role.to_lowercase();
        self.leadership_keywords.iter().any(|k| role.contains(k))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            suspicious_days: 30,
            very_suspicious_days: 7,
            disclosure_adequate_threshold: 0.7,
            disclosure_complete_threshold: 0.9,
            recent_activity_days: 90,
            active_sponsor_limit: 1000,
            sponsor_concurrency: 8,
            impact_low: 100_000.0,
            impact_medium: 1_000_000.0,
            impact_high: 5_000_000.0,
            impact_critical: 10_000_000.0,
            leadership_keywords: [
                "director",
                "board",
                "executive",
                "chairman",
                "ceo",
                "president",
                "cfo",
                "coo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            style_low: SeverityStyle::new("#7cb342", 6, 1),
            style_medium: SeverityStyle::new("#fbc02d", 10, 2),
            style_high: SeverityStyle::new("#f57c00", 14, 3),
            style_critical: SeverityStyle::new("#d32f2f", 18, 5),
        }
    }
}
