//! Error taxonomy for the analysis engine.
//!
//! Partial fetch failures and per-algorithm failures never surface here;
//! they are logged at their call site and contribute empty branch results.
//! Only sponsor lookups and top-level orchestration produce caller-visible
//! errors.

use sponsorwatch_data::types::SponsorId;
use sponsorwatch_data::ProviderError;

/// Errors produced by the analysis engine.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// The requested sponsor does not exist. Fatal to the call.
    #[error("sponsor {sponsor_id} not found")]
    NotFound { sponsor_id: SponsorId },

    /// A required data fetch failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A spawned analysis task failed to join.
    #[error("analysis task failed: {0}")]
    Join(String),

    /// Top-level orchestration failed; the one caller-visible failure mode.
    #[error("aggregation failed: {0}")]
    Aggregation(String),
}
