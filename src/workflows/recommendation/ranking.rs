use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicantProfile, BenefitOffer};
use super::eligibility::{evaluate, EligibilityVerdict};
use super::policy::MatchingPolicy;
use super::scoring;

/// Eligible offer paired with its relevance score for one ranking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchResult<'a> {
    pub offer: &'a BenefitOffer,
    pub score: u8,
}

impl MatchResult<'_> {
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.offer.application_window.days_remaining(now)
    }

    pub fn is_urgent(&self, policy: &MatchingPolicy, now: DateTime<Utc>) -> bool {
        scoring::is_urgent(policy, self.offer, now)
    }
}

/// Stateless engine applying a [`MatchingPolicy`] to a catalog snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine {
    policy: MatchingPolicy,
}

impl MatchingEngine {
    pub fn new(policy: MatchingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchingPolicy {
        &self.policy
    }

    /// Eligible offers in catalog order, scored lazily and left unsorted.
    pub fn matches<'a: 'p, 'p>(
        &self,
        offers: &'a [BenefitOffer],
        profile: &'p ApplicantProfile,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = MatchResult<'a>> + 'p {
        let policy = self.policy;
        offers.iter().filter_map(move |offer| {
            let verdict = evaluate(offer, profile, now);
            if !verdict.is_eligible() {
                log_exclusion(offer, &verdict);
                return None;
            }
            let score = scoring::score_with(&policy, offer, &verdict, now);
            Some(MatchResult { offer, score })
        })
    }

    /// Eligible offers ordered by score, then soonest deadline, then offer id.
    pub fn rank<'a>(
        &self,
        offers: &'a [BenefitOffer],
        profile: &ApplicantProfile,
        now: DateTime<Utc>,
    ) -> Vec<MatchResult<'a>> {
        let mut results: Vec<_> = self.matches(offers, profile, now).collect();
        results.sort_by(compare_results);
        results
    }
}

pub fn rank<'a>(
    offers: &'a [BenefitOffer],
    profile: &ApplicantProfile,
    now: DateTime<Utc>,
) -> Vec<MatchResult<'a>> {
    MatchingEngine::default().rank(offers, profile, now)
}

pub fn matches<'a: 'p, 'p>(
    offers: &'a [BenefitOffer],
    profile: &'p ApplicantProfile,
    now: DateTime<Utc>,
) -> impl Iterator<Item = MatchResult<'a>> + 'p {
    MatchingEngine::default().matches(offers, profile, now)
}

fn compare_results(left: &MatchResult<'_>, right: &MatchResult<'_>) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| {
            left.offer
                .application_window
                .ends_at
                .cmp(&right.offer.application_window.ends_at)
        })
        .then_with(|| left.offer.id.cmp(&right.offer.id))
}

fn log_exclusion(offer: &BenefitOffer, verdict: &EligibilityVerdict) {
    let failed: Vec<&str> = verdict
        .failed_dimensions()
        .into_iter()
        .map(|dimension| dimension.label())
        .collect();
    debug!(offer_id = %offer.id, failed = ?failed, "offer excluded");
}
