//! Affiliation records: declared relationships between sponsors and
//! organizations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::sponsor::SponsorId;

/// Unique identifier for an affiliation.
pub type AffiliationId = i64;

/// The nature of a sponsor's relationship to an organization.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationType {
    /// Employment, ownership, or other paid relationship.
    #[serde(rename = "economic")]
    Economic,

    /// Professional membership without compensation.
    #[serde(rename = "professional")]
    Professional,

    /// Party or campaign relationship.
    #[serde(rename = "political")]
    Political,

    /// Relationship held through a family member.
    #[serde(rename = "family")]
    Family,

    /// Anything else.
    #[serde(rename = "other")]
    Other,
}

impl std::fmt::Display for AffiliationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AffiliationType::Economic => "economic",
                AffiliationType::Professional => "professional",
                AffiliationType::Political => "political",
                AffiliationType::Family => "family",
                AffiliationType::Other => "other",
            }
        )
    }
}

/// A conflict marker recorded against an affiliation at intake time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMarker {
    /// The sponsor benefits directly (salary, dividends, sale proceeds).
    FinancialDirect,

    /// The sponsor benefits indirectly (spouse income, deferred interests).
    FinancialIndirect,

    /// The sponsor holds an ownership stake.
    Ownership,

    /// The sponsor can influence the organization's decisions.
    Influence,

    /// The sponsor formally represents the organization.
    Representation,
}

/// A declared relationship between a sponsor and an organization.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Affiliation {
    /// Unique affiliation identifier.
    pub id: AffiliationId,

    /// The sponsor holding this affiliation.
    pub sponsor_id: SponsorId,

    /// Organization name as declared.
    pub organization: String,

    /// Free-text role, e.g. "Board Member" or "Senior Advisor".
    pub role: String,

    /// The nature of the relationship.
    pub affiliation_type: AffiliationType,

    /// Conflict marker recorded at intake, if any.
    pub conflict_marker: Option<ConflictMarker>,

    /// When the relationship began.
    pub start_date: NaiveDate,

    /// When the relationship ended. `None` while ongoing.
    pub end_date: Option<NaiveDate>,
}

impl Affiliation {
    /// Whether this affiliation is financial in nature: an economic
    /// relationship, or one marked financial/ownership at intake.
    pub fn is_financial(&self) -> bool {
        self.affiliation_type == AffiliationType::Economic
            || matches!(
                self.conflict_marker,
                Some(ConflictMarker::FinancialDirect)
                    | Some(ConflictMarker::FinancialIndirect)
                    | Some(ConflictMarker::Ownership)
            )
    }

    /// Whether the sponsor is marked as a direct beneficiary of this
    /// relationship.
    pub fn is_directly_marked(&self) -> bool {
        matches!(
            self.conflict_marker,
            Some(ConflictMarker::FinancialDirect) | Some(ConflictMarker::Ownership)
        )
    }
}
