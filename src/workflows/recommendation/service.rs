use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::catalog::{CatalogError, CatalogProvider, Clock, ProfileStore, ProfileStoreError};
use super::domain::{ApplicantProfile, BenefitOffer, ProfileError, ProfileId};
use super::policy::MatchingPolicy;
use super::ranking::{MatchResult, MatchingEngine};

/// Service composing the catalog, profile store, clock, and matching engine.
pub struct RecommendationService<C, P, K> {
    catalog: Arc<C>,
    profiles: Arc<P>,
    clock: Arc<K>,
    engine: MatchingEngine,
    open_windows_only: bool,
}

impl<C, P, K> RecommendationService<C, P, K>
where
    C: CatalogProvider + 'static,
    P: ProfileStore + 'static,
    K: Clock + 'static,
{
    pub fn new(catalog: Arc<C>, profiles: Arc<P>, clock: Arc<K>, policy: MatchingPolicy) -> Self {
        Self {
            catalog,
            profiles,
            clock,
            engine: MatchingEngine::new(policy),
            open_windows_only: false,
        }
    }

    /// Drop offers whose application window is not open before ranking.
    pub fn with_open_windows_only(mut self, enabled: bool) -> Self {
        self.open_windows_only = enabled;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Rank the catalog for a stored profile as of the injected clock.
    pub fn recommend(
        &self,
        profile_id: &ProfileId,
    ) -> Result<RecommendationSet, RecommendationError> {
        let record = self
            .profiles
            .profile(profile_id)?
            .ok_or_else(|| RecommendationError::ProfileNotFound(profile_id.clone()))?;
        let profile = ApplicantProfile::try_from(record)?;

        let set = self.recommend_for(&profile, self.clock.now())?;
        info!(
            profile_id = %profile_id,
            matched = set.recommendations.len(),
            "recommendations ranked"
        );
        Ok(set)
    }

    /// Rank the catalog for an already validated profile.
    pub fn recommend_for(
        &self,
        profile: &ApplicantProfile,
        now: DateTime<Utc>,
    ) -> Result<RecommendationSet, RecommendationError> {
        let mut offers = self.catalog.offers()?;
        let catalog_size = offers.len();
        if self.open_windows_only {
            offers.retain(|offer| offer.application_window.is_open(now));
        }

        let ranked = self.engine.rank(&offers, profile, now);
        let recommendations = ranked
            .iter()
            .map(|result| RecommendedOffer::from_match(result, self.engine.policy(), now))
            .collect();

        Ok(RecommendationSet {
            evaluated_at: now,
            catalog_size,
            recommendations,
        })
    }
}

/// Owned, presentation-ready view of one ranked offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedOffer {
    pub offer: BenefitOffer,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub urgent: bool,
}

impl RecommendedOffer {
    fn from_match(result: &MatchResult<'_>, policy: &MatchingPolicy, now: DateTime<Utc>) -> Self {
        Self {
            offer: result.offer.clone(),
            score: result.score,
            days_remaining: result.days_remaining(now),
            urgent: result.is_urgent(policy, now),
        }
    }

    /// Short badge for offers closing inside the urgency window.
    pub fn urgency_badge(&self) -> Option<String> {
        match (self.urgent, self.days_remaining) {
            (true, Some(days)) => Some(format!("closing soon ({days}d)")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSet {
    pub evaluated_at: DateTime<Utc>,
    pub catalog_size: usize,
    pub recommendations: Vec<RecommendedOffer>,
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("profile {0} not found")]
    ProfileNotFound(ProfileId),
    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    ProfileStore(#[from] ProfileStoreError),
}
