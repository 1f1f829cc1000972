//! In-memory [`DealRepository`].

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{DealRepository, DealRepositoryError};
use crate::domain::{Deal, DealChanges, DealFilter, DealId, NewDeal};

use super::{ReadGuard, WriteGuard, poisoned};

/// Deal store backed by a vector in insertion order.
pub struct InMemoryDealRepository {
    records: RwLock<Vec<Deal>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDealRepository {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            clock,
        }
    }

    fn read(&self) -> Result<ReadGuard<'_, Vec<Deal>>, DealRepositoryError> {
        self.records
            .read()
            .map_err(|err| DealRepositoryError::query(poisoned(err)))
    }

    fn write(&self) -> Result<WriteGuard<'_, Vec<Deal>>, DealRepositoryError> {
        self.records
            .write()
            .map_err(|err| DealRepositoryError::query(poisoned(err)))
    }
}

#[async_trait]
impl DealRepository for InMemoryDealRepository {
    async fn insert(&self, deal: &NewDeal) -> Result<Deal, DealRepositoryError> {
        let now = self.clock.utc();
        let stored = Deal {
            id: DealId::random(),
            owner: deal.owner,
            title: deal.title.clone(),
            description: deal.description.clone(),
            discount: deal.discount,
            location: deal.location.clone(),
            image: deal.image.clone(),
            start_date: deal.start_date,
            end_date: deal.end_date,
            created_at: now,
            updated_at: now,
        };
        self.write()?.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DealRepositoryError> {
        Ok(self.read()?.iter().find(|deal| deal.id == *id).cloned())
    }

    async fn list(&self, filter: DealFilter) -> Result<Vec<Deal>, DealRepositoryError> {
        let records = self.read()?;
        let deals = records
            .iter()
            .filter(|deal| match filter {
                DealFilter::All => true,
                DealFilter::OwnedBy(owner) => deal.is_owned_by(owner),
            })
            .cloned()
            .collect();
        Ok(deals)
    }

    async fn update(
        &self,
        id: &DealId,
        changes: &DealChanges,
    ) -> Result<Option<Deal>, DealRepositoryError> {
        let now = self.clock.utc();
        let mut records = self.write()?;
        let Some(deal) = records.iter_mut().find(|deal| deal.id == *id) else {
            return Ok(None);
        };
        changes.apply_to(deal);
        deal.updated_at = now;
        Ok(Some(deal.clone()))
    }

    async fn delete(&self, id: &DealId) -> Result<bool, DealRepositoryError> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|deal| deal.id != *id);
        Ok(records.len() < before)
    }
}
