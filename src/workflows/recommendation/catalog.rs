use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use super::domain::{BenefitOffer, ProfileId, ProfileRecord};

/// Source of the full, unfiltered offer catalog.
pub trait CatalogProvider: Send + Sync {
    fn offers(&self) -> Result<Vec<BenefitOffer>, CatalogError>;
}

/// Lookup for stored applicant profiles.
pub trait ProfileStore: Send + Sync {
    fn profile(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, ProfileStoreError>;
}

/// Injected time source so ranking stays deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Catalog held in memory; every read hands out an independent snapshot.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    offers: Arc<RwLock<Vec<BenefitOffer>>>,
}

impl InMemoryCatalog {
    pub fn new(offers: Vec<BenefitOffer>) -> Self {
        Self {
            offers: Arc::new(RwLock::new(offers)),
        }
    }

    /// Inserts or replaces an offer by id.
    pub fn upsert(&self, offer: BenefitOffer) -> Result<(), CatalogError> {
        let mut guard = self
            .offers
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))?;
        match guard.iter_mut().find(|existing| existing.id == offer.id) {
            Some(existing) => *existing = offer,
            None => guard.push(offer),
        }
        Ok(())
    }

    pub fn len(&self) -> Result<usize, CatalogError> {
        self.offers
            .read()
            .map(|guard| guard.len())
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        self.len().map(|len| len == 0)
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn offers(&self) -> Result<Vec<BenefitOffer>, CatalogError> {
        self.offers
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryProfileStore {
    records: Arc<RwLock<HashMap<ProfileId, ProfileRecord>>>,
}

impl InMemoryProfileStore {
    pub fn new(records: HashMap<ProfileId, ProfileRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn insert(&self, id: ProfileId, record: ProfileRecord) -> Result<(), ProfileStoreError> {
        self.records
            .write()
            .map_err(|_| ProfileStoreError::Unavailable("profile lock poisoned".to_string()))?
            .insert(id, record);
        Ok(())
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn profile(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, ProfileStoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| ProfileStoreError::Unavailable("profile lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }
}
