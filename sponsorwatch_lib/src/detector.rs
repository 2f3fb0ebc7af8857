//! Conflict detection over sponsor affiliation, disclosure, and
//! sponsorship data.
//!
//! Four independent detection algorithms run concurrently per sponsor:
//! financial, organizational, timing, and disclosure. A failure in one is
//! logged and contributes zero conflicts; it never cancels its siblings.
//! The all-sponsor path fans out with a bounded Semaphore + JoinSet.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;
use uuid::Uuid;

use sponsorwatch_data::types::{
    Affiliation, AffiliationId, AffiliationType, Bill, BillId, ConflictMarker, DisclosureType,
    Sponsor, SponsorId, TransparencyRecord,
};
use sponsorwatch_data::DataProvider;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::severity::{determine_severity, severity_score, ConflictType, ScoreContext, Severity};

/// One detected conflict instance.
///
/// Conflicts are computed values: recomputed from current affiliation,
/// sponsorship, and transparency state on every call, never persisted or
/// mutated. The id and timestamp are fresh per instance; type, severity,
/// and affected bills are deterministic for unchanged inputs.
#[derive(Serialize, Debug, Clone)]
pub struct ConflictDetectionResult {
    /// Unique per instance.
    pub conflict_id: String,
    pub sponsor_id: SponsorId,
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub description: String,
    /// Empty only for disclosure conflicts.
    pub affected_bills: BTreeSet<BillId>,
    /// Estimated dollar impact; 0 for non-financial conflicts.
    pub financial_impact: f64,
    pub detected_at: DateTime<Utc>,
    /// Detector confidence in [0, 1].
    pub confidence: f64,
    /// Opaque reference strings: `affiliation:<id>`, `org:<name>`,
    /// `bill:<id>`.
    pub evidence: Vec<String>,
    pub related_affiliation_id: Option<AffiliationId>,
}

/// Runs the detection algorithms against a `DataProvider`.
#[derive(Clone)]
pub struct ConflictDetector {
    provider: Arc<dyn DataProvider>,
    config: Arc<AnalysisConfig>,
}

impl ConflictDetector {
    pub fn new(provider: Arc<dyn DataProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { provider, config }
    }

    /// Detect conflicts for one sponsor, or for all active sponsors when
    /// `sponsor_id` is `None`.
    ///
    /// The single-sponsor path fails with `NotFound` for unknown ids. The
    /// all-sponsor path skips sponsors whose analysis fails, logging each
    /// skip, and returns the flattened concatenation of the rest.
    pub async fn detect_conflicts(
        &self,
        sponsor_id: Option<SponsorId>,
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        match sponsor_id {
            Some(id) => {
                let sponsor = self
                    .provider
                    .sponsor(id)
                    .await?
                    .ok_or(AnalysisError::NotFound { sponsor_id: id })?;
                self.detect_for_sponsor(&sponsor).await
            }
            None => self.detect_all().await,
        }
    }

    async fn detect_all(&self) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        let sponsors = self
            .provider
            .active_sponsors(self.config.active_sponsor_limit)
            .await?;

        let semaphore = Arc::new(Semaphore::new(self.config.sponsor_concurrency));
        let mut join_set = JoinSet::new();

        for sponsor in sponsors {
            let detector = self.clone();
            let sem = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                let result = detector.detect_for_sponsor(&sponsor).await;
                (sponsor.id, result)
            });
        }

        let mut all = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(mut conflicts))) => all.append(&mut conflicts),
                Ok((sponsor_id, Err(err))) => {
                    warn!(sponsor_id, error = %err, "sponsor analysis failed, skipping");
                }
                Err(err) => {
                    warn!(error = %err, "sponsor analysis task aborted");
                }
            }
        }
        Ok(all)
    }

    /// Fetch the sponsor's related records and run the four detectors
    /// concurrently, settling all branches.
    async fn detect_for_sponsor(
        &self,
        sponsor: &Sponsor,
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        let (affiliations, transparency, sponsorships) = tokio::join!(
            self.provider.affiliations(sponsor.id),
            self.provider.transparency_records(sponsor.id),
            self.provider.bill_sponsorships(sponsor.id),
        );
        let affiliations = affiliations?;
        let transparency = transparency?;
        let sponsorships = sponsorships?;

        let sponsored_bill_ids: Vec<BillId> =
            sponsorships.iter().map(|s| s.bill_id).collect();
        let sponsored_bills = self.provider.bills_by_ids(&sponsored_bill_ids).await?;

        let (financial, organizational, timing, disclosure) = tokio::join!(
            self.detect_financial(sponsor, &affiliations, &sponsored_bill_ids),
            self.detect_organizational(sponsor, &affiliations, &sponsored_bill_ids),
            self.detect_timing(sponsor, &affiliations, &sponsored_bills),
            self.detect_disclosure(sponsor, &affiliations, &transparency),
        );

        let branches = [
            ("financial", financial),
            ("organizational", organizational),
            ("timing", timing),
            ("disclosure", disclosure),
        ];

        let mut conflicts = Vec::new();
        for (algorithm, branch) in branches {
            match branch {
                Ok(mut found) => conflicts.append(&mut found),
                Err(err) => {
                    warn!(
                        sponsor_id = sponsor.id,
                        algorithm,
                        error = %err,
                        "detection algorithm failed, contributing no conflicts"
                    );
                }
            }
        }
        Ok(conflicts)
    }

    /// Financial detector: economic or financially-marked affiliations whose
    /// organization is mentioned in one of the sponsor's own bills.
    async fn detect_financial(
        &self,
        sponsor: &Sponsor,
        affiliations: &[Affiliation],
        sponsored_bill_ids: &[BillId],
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        let mut conflicts = Vec::new();
        if sponsored_bill_ids.is_empty() {
            return Ok(conflicts);
        }

        for affiliation in affiliations.iter().filter(|a| a.is_financial()) {
            let matched = self
                .provider
                .bills_mentioning_organization(
                    &affiliation.organization,
                    Some(sponsored_bill_ids),
                )
                .await?;
            if matched.is_empty() {
                continue;
            }

            let direct = affiliation.affiliation_type == AffiliationType::Economic
                || affiliation.is_directly_marked();
            let conflict_type = if direct {
                ConflictType::FinancialDirect
            } else {
                ConflictType::FinancialIndirect
            };

            let impact = self.estimate_financial_impact(sponsor, affiliation, matched.len());
            let ctx = ScoreContext {
                related_affiliations: affiliations.len(),
                recent_activity: self.started_recently(affiliation),
                leadership_role: self.config.is_leadership_role(&affiliation.role),
                direct_beneficiary: affiliation.is_directly_marked(),
            };
            let severity =
                determine_severity(severity_score(conflict_type, impact, &ctx, &self.config));

            conflicts.push(self.build_conflict(
                sponsor.id,
                conflict_type,
                severity,
                format!(
                    "Financial interest in {} ({}) overlaps {} sponsored bill(s)",
                    affiliation.organization,
                    affiliation.role,
                    matched.len()
                ),
                matched.iter().map(|b| b.id).collect(),
                impact,
                0.85,
                affiliation_evidence(affiliation, &matched),
                Some(affiliation.id),
            ));
        }
        Ok(conflicts)
    }

    /// Organizational detector: leadership roles whose organization is
    /// mentioned in one of the sponsor's own bills.
    async fn detect_organizational(
        &self,
        sponsor: &Sponsor,
        affiliations: &[Affiliation],
        sponsored_bill_ids: &[BillId],
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        let mut conflicts = Vec::new();
        if sponsored_bill_ids.is_empty() {
            return Ok(conflicts);
        }

        for affiliation in affiliations
            .iter()
            .filter(|a| self.config.is_leadership_role(&a.role))
        {
            let matched = self
                .provider
                .bills_mentioning_organization(
                    &affiliation.organization,
                    Some(sponsored_bill_ids),
                )
                .await?;
            if matched.is_empty() {
                continue;
            }

            let ctx = ScoreContext {
                related_affiliations: affiliations.len(),
                recent_activity: self.started_recently(affiliation),
                leadership_role: true,
                direct_beneficiary: affiliation.is_directly_marked(),
            };
            let severity = determine_severity(severity_score(
                ConflictType::Organizational,
                0.0,
                &ctx,
                &self.config,
            ));

            conflicts.push(self.build_conflict(
                sponsor.id,
                ConflictType::Organizational,
                severity,
                format!(
                    "Leadership position at {} ({}) overlaps {} sponsored bill(s)",
                    affiliation.organization,
                    affiliation.role,
                    matched.len()
                ),
                matched.iter().map(|b| b.id).collect(),
                0.0,
                0.7,
                affiliation_evidence(affiliation, &matched),
                Some(affiliation.id),
            ));
        }
        Ok(conflicts)
    }

    /// Timing detector: bills introduced close to an affiliation start date.
    async fn detect_timing(
        &self,
        sponsor: &Sponsor,
        affiliations: &[Affiliation],
        sponsored_bills: &[Bill],
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        let mut conflicts = Vec::new();

        for bill in sponsored_bills {
            let closest = affiliations
                .iter()
                .map(|a| {
                    let gap = (bill.introduced_date - a.start_date).num_days().abs();
                    (gap, a)
                })
                .min_by_key(|(gap, a)| (*gap, a.id));

            let Some((gap, affiliation)) = closest else {
                continue;
            };
            if gap > self.config.suspicious_days {
                continue;
            }

            let (severity, confidence) = if gap <= self.config.very_suspicious_days {
                (Severity::High, 0.8)
            } else {
                (Severity::Medium, 0.6)
            };

            conflicts.push(self.build_conflict(
                sponsor.id,
                ConflictType::TimingSuspicious,
                severity,
                format!(
                    "Affiliation with {} began {} day(s) from introduction of bill {}",
                    affiliation.organization, gap, bill.id
                ),
                BTreeSet::from([bill.id]),
                0.0,
                confidence,
                vec![
                    format!("affiliation:{}", affiliation.id),
                    format!("bill:{}", bill.id),
                ],
                Some(affiliation.id),
            ));
        }
        Ok(conflicts)
    }

    /// Disclosure detector: verified financial disclosures falling short of
    /// the sponsor's financial affiliations.
    async fn detect_disclosure(
        &self,
        sponsor: &Sponsor,
        affiliations: &[Affiliation],
        transparency: &[TransparencyRecord],
    ) -> Result<Vec<ConflictDetectionResult>, AnalysisError> {
        let financial: Vec<&Affiliation> =
            affiliations.iter().filter(|a| a.is_financial()).collect();
        let completeness = disclosure_completeness(affiliations, transparency);
        if completeness >= self.config.disclosure_adequate_threshold {
            return Ok(Vec::new());
        }

        // The high bar is looser than the trigger bar, so most triggered
        // cases escalate; kept as-is pending product clarification.
        let severity = if completeness < self.config.disclosure_complete_threshold {
            Severity::High
        } else {
            Severity::Medium
        };

        let verified = transparency
            .iter()
            .filter(|t| t.verified && t.disclosure_type == DisclosureType::Financial)
            .count();

        Ok(vec![self.build_conflict(
            sponsor.id,
            ConflictType::DisclosureIncomplete,
            severity,
            format!(
                "Only {} of {} financial affiliations have verified disclosures ({:.0}% complete)",
                verified,
                financial.len(),
                completeness * 100.0
            ),
            BTreeSet::new(),
            0.0,
            0.9,
            financial
                .iter()
                .map(|a| format!("affiliation:{}", a.id))
                .collect(),
            None,
        )])
    }

    /// Estimated dollar impact of a financial conflict.
    ///
    /// Base is a tenth of the sponsor's exposure scaled by the matched bill
    /// count, amplified for economic ties, explicit financial markers, and
    /// leadership roles.
    fn estimate_financial_impact(
        &self,
        sponsor: &Sponsor,
        affiliation: &Affiliation,
        matched_bills: usize,
    ) -> f64 {
        let mut impact =
            (sponsor.financial_exposure / 10.0) * (matched_bills.max(1) as f64);
        if affiliation.affiliation_type == AffiliationType::Economic {
            impact *= 2.0;
        }
        if matches!(
            affiliation.conflict_marker,
            Some(ConflictMarker::FinancialDirect) | Some(ConflictMarker::FinancialIndirect)
        ) {
            impact *= 3.0;
        }
        if self.config.is_leadership_role(&affiliation.role) {
            impact *= 1.5;
        }
        impact.round().max(0.0)
    }

    fn started_recently(&self, affiliation: &Affiliation) -> bool {
        let elapsed = (Utc::now().date_naive() - affiliation.start_date).num_days();
        (0..=self.config.recent_activity_days).contains(&elapsed)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_conflict(
        &self,
        sponsor_id: SponsorId,
        conflict_type: ConflictType,
        severity: Severity,
        description: String,
        affected_bills: BTreeSet<BillId>,
        financial_impact: f64,
        confidence: f64,
        evidence: Vec<String>,
        related_affiliation_id: Option<AffiliationId>,
    ) -> ConflictDetectionResult {
        ConflictDetectionResult {
            conflict_id: format!("{}-{}", conflict_type, Uuid::new_v4()),
            sponsor_id,
            conflict_type,
            severity,
            description,
            affected_bills,
            financial_impact,
            detected_at: Utc::now(),
            confidence,
            evidence,
            related_affiliation_id,
        }
    }
}

/// Verified financial disclosures over financial affiliations, 1.0 when
/// nothing is expected. Shared with transparency risk.
pub(crate) fn disclosure_completeness(
    affiliations: &[Affiliation],
    transparency: &[TransparencyRecord],
) -> f64 {
    let expected = affiliations.iter().filter(|a| a.is_financial()).count();
    if expected == 0 {
        return 1.0;
    }
    let actual = transparency
        .iter()
        .filter(|t| t.verified && t.disclosure_type == DisclosureType::Financial)
        .count();
    actual as f64 / expected as f64
}

fn affiliation_evidence(affiliation: &Affiliation, matched: &[Bill]) -> Vec<String> {
    let mut evidence = vec![
        format!("affiliation:{}", affiliation.id),
        format!("org:{}", affiliation.organization),
    ];
    let mut bill_ids: Vec<BillId> = matched.iter().map(|b| b.id).collect();
    bill_ids.sort_unstable();
    evidence.extend(bill_ids.into_iter().map(|id| format!("bill:{id}")));
    evidence
}
