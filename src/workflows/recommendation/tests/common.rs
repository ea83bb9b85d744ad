use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::recommendation::catalog::{
    CatalogError, CatalogProvider, FixedClock, InMemoryCatalog, InMemoryProfileStore,
    ProfileStore, ProfileStoreError,
};
use crate::workflows::recommendation::domain::{
    ApplicantProfile, ApplicationWindow, BenefitCategory, BenefitOffer, GuardianRequirement,
    IncomeCondition, OfferId, ProfileId, ProfileRecord, RegionScope,
};
use crate::workflows::recommendation::{MatchingPolicy, RecommendationService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid instant")
}

/// Birth date that makes the applicant exactly `age` on [`now`].
pub(super) fn born_years_ago(age: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025 - age, 3, 1).expect("valid date")
}

pub(super) fn window_closing_in(days: i64) -> ApplicationWindow {
    ApplicationWindow::new(now() - Duration::days(10), now() + Duration::days(days))
}

/// Unrestricted teen offer closing in thirty days.
pub(super) fn offer(id: &str) -> BenefitOffer {
    BenefitOffer {
        id: OfferId(id.to_string()),
        title: format!("Offer {id}"),
        category: BenefitCategory::Scholarship,
        target_age_min: 14,
        target_age_max: 19,
        region: RegionScope::Nationwide,
        income_condition: IncomeCondition::None,
        guardian_requirement: GuardianRequirement::Irrelevant,
        application_window: window_closing_in(30),
        summary: "Support for secondary school students".to_string(),
        required_documents: vec!["Enrollment certificate".to_string()],
        source_url: Some(format!("https://benefits.example.org/{id}")),
    }
}

pub(super) fn seoul_gangnam_low_income_offer(id: &str) -> BenefitOffer {
    BenefitOffer {
        region: RegionScope::ProvinceCity {
            province: "Seoul".to_string(),
            city: Some("Gangnam".to_string()),
        },
        income_condition: IncomeCondition::Low,
        ..offer(id)
    }
}

/// Sixteen-year-old in Seoul with nothing optional disclosed.
pub(super) fn applicant() -> ApplicantProfile {
    ApplicantProfile::new(born_years_ago(16), "Seoul")
}

pub(super) fn applicant_record() -> ProfileRecord {
    ProfileRecord {
        birth_date: Some("2008-11-20".to_string()),
        province: Some("Seoul".to_string()),
        city: Some("Gangnam".to_string()),
        income_bucket: None,
        guardian_status: None,
    }
}

pub(super) type TestService =
    RecommendationService<InMemoryCatalog, InMemoryProfileStore, FixedClock>;

pub(super) fn build_service(offers: Vec<BenefitOffer>) -> TestService {
    let mut records = HashMap::new();
    records.insert(ProfileId("student-1".to_string()), applicant_record());
    records.insert(
        ProfileId("no-birth-date".to_string()),
        ProfileRecord {
            birth_date: None,
            ..applicant_record()
        },
    );

    RecommendationService::new(
        Arc::new(InMemoryCatalog::new(offers)),
        Arc::new(InMemoryProfileStore::new(records)),
        Arc::new(FixedClock(now())),
        MatchingPolicy::default(),
    )
}

pub(super) struct UnavailableCatalog;

impl CatalogProvider for UnavailableCatalog {
    fn offers(&self) -> Result<Vec<BenefitOffer>, CatalogError> {
        Err(CatalogError::Unavailable("document store offline".to_string()))
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileStore for UnavailableProfiles {
    fn profile(&self, _id: &ProfileId) -> Result<Option<ProfileRecord>, ProfileStoreError> {
        Err(ProfileStoreError::Unavailable("document store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
