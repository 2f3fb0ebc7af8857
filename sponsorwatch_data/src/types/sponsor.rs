//! Sponsor records: legislators and entities that introduce or co-sponsor bills.

use serde::{Deserialize, Serialize};

/// Unique identifier for a sponsor.
pub type SponsorId = i64;

/// A legislator or entity that introduces or co-sponsors bills.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Sponsor {
    /// Unique sponsor identifier.
    pub id: SponsorId,

    /// Display name.
    pub full_name: String,

    /// Whether the sponsor currently holds office.
    pub is_active: bool,

    /// Declared aggregate financial exposure in dollars.
    pub financial_exposure: f64,

    /// Voting alignment figure on a 0-100 scale. `None` when no votes are
    /// on record.
    pub voting_alignment: Option<f64>,
}
