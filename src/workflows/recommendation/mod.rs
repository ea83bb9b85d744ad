//! Benefit eligibility matching and relevance ranking.
//!
//! The engine is the pure pipeline `evaluate` → `score` → `rank`: it reads an
//! offer snapshot, one applicant profile and an injected instant, and allocates
//! a fresh result list. The catalog, profile store and clock it is fed from are
//! traits so the service and HTTP router can be exercised in isolation.

pub mod catalog;
pub mod domain;
pub mod eligibility;
pub mod import;
pub mod policy;
pub mod ranking;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    CatalogError, CatalogProvider, Clock, FixedClock, InMemoryCatalog, InMemoryProfileStore,
    ProfileStore, ProfileStoreError, SystemClock,
};
pub use domain::{
    ApplicantProfile, ApplicationWindow, BenefitCategory, BenefitOffer, BirthDate,
    GuardianRequirement, GuardianStatus, IncomeBucket, IncomeCondition, OfferId, ProfileError,
    ProfileId, ProfileRecord, RegionScope,
};
pub use eligibility::{evaluate, EligibilityDimension, EligibilityVerdict};
pub use import::{load_catalog, load_profiles, ImportError};
pub use policy::MatchingPolicy;
pub use ranking::{matches, rank, MatchResult, MatchingEngine};
pub use router::{recommendation_router, RecommendationRequest};
pub use scoring::score;
pub use service::{
    RecommendationError, RecommendationService, RecommendationSet, RecommendedOffer,
};
