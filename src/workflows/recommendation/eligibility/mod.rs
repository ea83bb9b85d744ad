mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, BenefitOffer};

/// Rule axes checked for every (offer, profile) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityDimension {
    Age,
    Region,
    Income,
    Guardian,
}

impl EligibilityDimension {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Region => "region",
            Self::Income => "income",
            Self::Guardian => "guardian",
        }
    }
}

/// Independent per-dimension results for one offer and one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub applicant_age: u32,
    pub age: bool,
    pub region: bool,
    pub income: bool,
    pub guardian: bool,
}

impl EligibilityVerdict {
    pub const fn is_eligible(&self) -> bool {
        self.age && self.region && self.income && self.guardian
    }

    pub fn failed_dimensions(&self) -> Vec<EligibilityDimension> {
        [
            (EligibilityDimension::Age, self.age),
            (EligibilityDimension::Region, self.region),
            (EligibilityDimension::Income, self.income),
            (EligibilityDimension::Guardian, self.guardian),
        ]
        .into_iter()
        .filter_map(|(dimension, passed)| (!passed).then_some(dimension))
        .collect()
    }
}

/// Checks every rule dimension of `offer` against `profile` as of `now`.
pub fn evaluate(
    offer: &BenefitOffer,
    profile: &ApplicantProfile,
    now: DateTime<Utc>,
) -> EligibilityVerdict {
    let applicant_age = profile.age_on(now.date_naive());

    EligibilityVerdict {
        applicant_age,
        age: rules::age_matches(applicant_age, offer.target_age_min, offer.target_age_max),
        region: rules::region_matches(&offer.region, profile),
        income: rules::income_matches(offer.income_condition, profile),
        guardian: rules::guardian_matches(offer.guardian_requirement, profile),
    }
}
