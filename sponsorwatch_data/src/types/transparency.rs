//! Transparency records: declared financial or relational interests.

use serde::{Deserialize, Serialize};

use super::sponsor::SponsorId;

/// Category of a disclosed interest.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureType {
    /// Income, assets, or liabilities.
    #[serde(rename = "financial")]
    Financial,

    /// Organizational or personal relationships.
    #[serde(rename = "relational")]
    Relational,

    /// Gifts above the reporting threshold.
    #[serde(rename = "gift")]
    Gift,

    /// Sponsored travel.
    #[serde(rename = "travel")]
    Travel,
}

/// A sponsor's declared interest, optionally verified by an auditor.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransparencyRecord {
    /// Unique record identifier.
    pub id: i64,

    /// The sponsor who filed the disclosure.
    pub sponsor_id: SponsorId,

    /// Category of the disclosed interest.
    pub disclosure_type: DisclosureType,

    /// Whether the record has passed verification.
    pub verified: bool,

    /// Declared dollar amount, if applicable.
    pub amount: Option<f64>,
}
