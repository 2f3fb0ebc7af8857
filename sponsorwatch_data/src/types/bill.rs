//! Bill and sponsorship records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::sponsor::SponsorId;

/// Unique identifier for a bill.
pub type BillId = i64;

/// A piece of legislation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bill {
    /// Unique bill identifier.
    pub id: BillId,

    /// Bill title.
    pub title: String,

    /// Bill summary text, when available.
    pub summary: Option<String>,

    /// Date the bill was introduced.
    pub introduced_date: NaiveDate,
}

/// A link from a sponsor to a bill they introduced or co-sponsored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Sponsorship {
    /// The sponsoring legislator.
    pub sponsor_id: SponsorId,

    /// The sponsored bill.
    pub bill_id: BillId,

    /// Date the sponsorship was recorded.
    pub sponsored_at: NaiveDate,
}
