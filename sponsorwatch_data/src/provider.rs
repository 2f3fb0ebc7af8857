//! The read-only data access contract consumed by the analysis engine.

use async_trait::async_trait;

use crate::types::{
    Affiliation, Bill, BillId, Sponsor, SponsorId, Sponsorship, TransparencyRecord,
};

/// Errors surfaced by a data provider.
///
/// There is no retry policy at this layer: a failed fetch is terminal for
/// that record and it is up to the caller to degrade or abort.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The backing store could not be reached or refused the query.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// A record was fetched but could not be decoded into its typed shape.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Read access to sponsors, affiliations, transparency records, bill
/// sponsorships, and bills.
///
/// Implementations are expected to be cheap to call concurrently; the
/// analysis engine fans out per-sponsor work without coordination.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetch a single sponsor. `Ok(None)` when the id is unknown.
    async fn sponsor(&self, id: SponsorId) -> Result<Option<Sponsor>, ProviderError>;

    /// Batch-fetch sponsors. Unknown ids are silently omitted.
    async fn sponsors_by_ids(&self, ids: &[SponsorId]) -> Result<Vec<Sponsor>, ProviderError>;

    /// List sponsors currently holding office, up to `limit`.
    async fn active_sponsors(&self, limit: usize) -> Result<Vec<Sponsor>, ProviderError>;

    /// All declared affiliations for a sponsor.
    async fn affiliations(&self, sponsor_id: SponsorId)
        -> Result<Vec<Affiliation>, ProviderError>;

    /// All transparency records filed by a sponsor.
    async fn transparency_records(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<Vec<TransparencyRecord>, ProviderError>;

    /// All bill sponsorships initiated by a sponsor.
    async fn bill_sponsorships(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<Vec<Sponsorship>, ProviderError>;

    /// Bills whose title or summary mentions the organization,
    /// case-insensitively. When `restrict_to` is given, only those bill ids
    /// are searched.
    async fn bills_mentioning_organization(
        &self,
        organization: &str,
        restrict_to: Option<&[BillId]>,
    ) -> Result<Vec<Bill>, ProviderError>;

    /// Fetch a single bill. `Ok(None)` when the id is unknown.
    async fn bill(&self, id: BillId) -> Result<Option<Bill>, ProviderError>;

    /// Batch-fetch bills. Unknown ids are silently omitted.
    async fn bills_by_ids(&self, ids: &[BillId]) -> Result<Vec<Bill>, ProviderError>;
}
