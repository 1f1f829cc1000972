//! Port for deal persistence.
//!
//! Adapters provide single-record atomicity: a reader never observes a
//! half-applied update. Nothing spans records or reaches the asset store.

use async_trait::async_trait;

use crate::domain::{Deal, DealChanges, DealFilter, DealId, NewDeal};

use super::define_port_error;

define_port_error! {
    /// Errors raised by deal repository adapters.
    pub enum DealRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "deal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "deal repository query failed: {message}",
    }
}

/// Port for deal CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealRepository: Send + Sync {
    /// Insert a deal; storage assigns id and timestamps.
    async fn insert(&self, deal: &NewDeal) -> Result<Deal, DealRepositoryError>;

    /// Find a deal by id.
    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DealRepositoryError>;

    /// List deals matching `filter`, oldest first.
    async fn list(&self, filter: DealFilter) -> Result<Vec<Deal>, DealRepositoryError>;

    /// Apply allow-listed changes and bump `updated_at`.
    ///
    /// Returns `None` when the deal no longer exists.
    async fn update(
        &self,
        id: &DealId,
        changes: &DealChanges,
    ) -> Result<Option<Deal>, DealRepositoryError>;

    /// Delete a deal, returning whether a record was removed.
    async fn delete(&self, id: &DealId) -> Result<bool, DealRepositoryError>;
}
