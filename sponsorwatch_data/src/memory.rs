//! In-memory `DataProvider` used by tests and fixtures.

use async_trait::async_trait;

use crate::provider::{DataProvider, ProviderError};
use crate::types::{
    Affiliation, Bill, BillId, Sponsor, SponsorId, Sponsorship, TransparencyRecord,
};

/// A `DataProvider` backed by plain vectors.
///
/// Built up with the `with_*` loaders. The `failing` constructor returns a
/// provider whose every call reports `Unavailable`, which is how degradation
/// paths are exercised without a mock framework.
#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    sponsors: Vec<Sponsor>,
    affiliations: Vec<Affiliation>,
    transparency: Vec<TransparencyRecord>,
    sponsorships: Vec<Sponsorship>,
    bills: Vec<Bill>,
    fail_all: bool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every call fails with `Unavailable`.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn with_sponsors(mut self, sponsors: Vec<Sponsor>) -> Self {
        self.sponsors = sponsors;
        self
    }

    pub fn with_affiliations(mut self, affiliations: Vec<Affiliation>) -> Self {
        self.affiliations = affiliations;
        self
    }

    pub fn with_transparency(mut self, records: Vec<TransparencyRecord>) -> Self {
        self.transparency = records;
        self
    }

    pub fn with_sponsorships(mut self, sponsorships: Vec<Sponsorship>) -> Self {
        self.sponsorships = sponsorships;
        self
    }

    pub fn with_bills(mut self, bills: Vec<Bill>) -> Self {
        self.bills = bills;
        self
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.fail_all {
            Err(ProviderError::Unavailable(
                "in-memory provider configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn sponsor(&self, id: SponsorId) -> Result<Option<Sponsor>, ProviderError> {
        self.check_available()?;
        Ok(self.sponsors.iter().find(|s| s.id == id).cloned())
    }

    async fn sponsors_by_ids(&self, ids: &[SponsorId]) -> Result<Vec<Sponsor>, ProviderError> {
        self.check_available()?;
        Ok(self
            .sponsors
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn active_sponsors(&self, limit: usize) -> Result<Vec<Sponsor>, ProviderError> {
        self.check_available()?;
        Ok(self
            .sponsors
            .iter()
            .filter(|s| s.is_active)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn affiliations(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<Vec<Affiliation>, ProviderError> {
        self.check_available()?;
        Ok(self
            .affiliations
            .iter()
            .filter(|a| a.sponsor_id == sponsor_id)
            .cloned()
            .collect())
    }

    async fn transparency_records(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<Vec<TransparencyRecord>, ProviderError> {
        self.check_available()?;
        Ok(self
            .transparency
            .iter()
            .filter(|t| t.sponsor_id == sponsor_id)
            .cloned()
            .collect())
    }

    async fn bill_sponsorships(
        &self,
        sponsor_id: SponsorId,
    ) -> Result<Vec<Sponsorship>, ProviderError> {
        self.check_available()?;
        Ok(self
            .sponsorships
            .iter()
            .filter(|s| s.sponsor_id == sponsor_id)
            .cloned()
            .collect())
    }

    async fn bills_mentioning_organization(
        &self,
        organization: &str,
        restrict_to: Option<&[BillId]>,
    ) -> Result<Vec<Bill>, ProviderError> {
        self.check_available()?;
        let needle = organization.to_lowercase();
        Ok(self
            .bills
            .iter()
            .filter(|b| match restrict_to {
                Some(ids) => ids.contains(&b.id),
                None => true,
            })
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.summary
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn bill(&self, id: BillId) -> Result<Option<Bill>, ProviderError> {
        self.check_available()?;
        Ok(self.bills.iter().find(|b| b.id == id).cloned())
    }

    async fn bills_by_ids(&self, ids: &[BillId]) -> Result<Vec<Bill>, ProviderError> {
        self.check_available()?;
        Ok(self
            .bills
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bill(id: BillId, title: &str, summary: Option<&str>) -> Bill {
        Bill {
            id,
            title: title.to_string(),
            summary: summary.map(String::from),
            introduced_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_mention_search_is_case_insensitive() {
        let provider = MemoryProvider::new().with_bills(vec![
            bill(1, "Supporting ACME CORP expansion", None),
            bill(2, "Unrelated appropriations", None),
        ]);

        let found = provider
            .bills_mentioning_organization("Acme Corp", None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[tokio::test]
    async fn test_mention_search_checks_summary() {
        let provider = MemoryProvider::new().with_bills(vec![bill(
            1,
            "Energy appropriations",
            Some("Grants for Acme Corp facilities"),
        )]);

        let found = provider
            .bills_mentioning_organization("acme corp", None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_mention_search_honors_restriction() {
        let provider = MemoryProvider::new().with_bills(vec![
            bill(1, "Acme Corp relief act", None),
            bill(2, "Acme Corp oversight act", None),
        ]);

        let found = provider
            .bills_mentioning_organization("Acme Corp", Some(&[2]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[tokio::test]
    async fn test_failing_provider_reports_unavailable() {
        let provider = MemoryProvider::failing();
        let err = provider.sponsor(1).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_active_sponsor_limit() {
        let sponsors = (1..=5)
            .map(|id| Sponsor {
                id,
                full_name: format!("Sponsor {id}"),
                is_active: true,
                financial_exposure: 0.0,
                voting_alignment: None,
            })
            .collect();
        let provider = MemoryProvider::new().with_sponsors(sponsors);

        let active = provider.active_sponsors(3).await.unwrap();
        assert_eq!(active.len(), 3);
    }
}
