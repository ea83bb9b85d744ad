use chrono::{DateTime, Utc};

use super::domain::{BenefitOffer, GuardianRequirement, IncomeCondition};
use super::eligibility::EligibilityVerdict;
use super::policy::MatchingPolicy;

pub const PARTIAL_MATCH_SCORE: u8 = 1;
pub const STRONG_MATCH_SCORE: u8 = 2;
pub const URGENCY_BONUS: u8 = 1;

/// Relevance of an eligible offer under the default policy, in `1..=3`.
pub fn score(offer: &BenefitOffer, verdict: &EligibilityVerdict, now: DateTime<Utc>) -> u8 {
    score_with(&MatchingPolicy::default(), offer, verdict, now)
}

pub fn score_with(
    policy: &MatchingPolicy,
    offer: &BenefitOffer,
    verdict: &EligibilityVerdict,
    now: DateTime<Utc>,
) -> u8 {
    let base = if specific_matches(offer, verdict) >= policy.strong_match_threshold {
        STRONG_MATCH_SCORE
    } else {
        PARTIAL_MATCH_SCORE
    };

    if is_urgent(policy, offer, now) {
        base + URGENCY_BONUS
    } else {
        base
    }
}

/// Region, income and guardian checks that both narrowed the audience and passed.
/// Age is structural and never counts.
pub fn specific_matches(offer: &BenefitOffer, verdict: &EligibilityVerdict) -> usize {
    [
        !offer.region.is_nationwide() && verdict.region,
        offer.income_condition != IncomeCondition::None && verdict.income,
        offer.guardian_requirement != GuardianRequirement::Irrelevant && verdict.guardian,
    ]
    .into_iter()
    .filter(|matched| *matched)
    .count()
}

pub(crate) fn is_urgent(
    policy: &MatchingPolicy,
    offer: &BenefitOffer,
    now: DateTime<Utc>,
) -> bool {
    offer
        .application_window
        .days_remaining(now)
        .is_some_and(|days| days <= policy.urgency_window_days)
}
