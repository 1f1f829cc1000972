//! Driving ports for the deal lifecycle.
//!
//! Callers have already authenticated the actor; mutating requests have
//! also passed the owner gate. Per-record ownership is checked behind these
//! ports.

use async_trait::async_trait;

use crate::domain::{Account, Deal, DealDraft, DealId, Error, ImageUpload};

/// Request to create a deal.
#[derive(Debug, Clone)]
pub struct CreateDealRequest {
    /// Authenticated owner.
    pub actor: Account,
    /// Complete payload.
    pub draft: DealDraft,
    /// Optional image.
    pub image: Option<ImageUpload>,
}

/// Request to update a deal.
#[derive(Debug, Clone)]
pub struct UpdateDealRequest {
    /// Authenticated owner.
    pub actor: Account,
    /// Target deal.
    pub deal_id: DealId,
    /// Partial payload; omitted fields stay as they are.
    pub draft: DealDraft,
    /// Replacement image, if any.
    pub image: Option<ImageUpload>,
}

/// Request to delete a deal.
#[derive(Debug, Clone)]
pub struct DeleteDealRequest {
    /// Authenticated owner.
    pub actor: Account,
    /// Target deal.
    pub deal_id: DealId,
}

/// Deal mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealCommand: Send + Sync {
    /// Create a deal owned by the actor.
    async fn create(&self, request: CreateDealRequest) -> Result<Deal, Error>;

    /// Update a deal the actor owns.
    async fn update(&self, request: UpdateDealRequest) -> Result<Deal, Error>;

    /// Delete a deal the actor owns, with its stored image.
    async fn delete(&self, request: DeleteDealRequest) -> Result<(), Error>;
}

/// Deal reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealQuery: Send + Sync {
    /// Catalogue view: owners see their own deals, everyone else sees all.
    async fn list(&self, viewer: Option<Account>) -> Result<Vec<Deal>, Error>;

    /// Deals created by `actor`, whatever its role.
    async fn list_mine(&self, actor: Account) -> Result<Vec<Deal>, Error>;

    /// One deal by id.
    async fn get(&self, deal_id: DealId) -> Result<Deal, Error>;
}
