//! Deal lifecycle services.
//!
//! [`DealCommandService`] keeps a deal record and its stored image in step.
//! The database and the content root are separate stores with no shared
//! transaction, so each mutation is a fixed sequence of best-effort steps:
//!
//! - create: validate, accept the image, insert; a failed insert discards
//!   the accepted image.
//! - update: validate, discard the old image, accept the new one, write the
//!   record; a failed accept repairs the record to the placeholder, a failed
//!   write discards the new image.
//! - delete: discard the image (failures logged, never blocking), then
//!   delete the record.
//!
//! Steps that leave the stores out of step are logged at `error` with an
//! `event` field (`asset_orphaned`, `dangling_asset_reference`,
//! `asset_discard_failed`, `record_delete_failed_after_asset_discard`) so an
//! operator can reconcile them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::account::Account;
use super::asset::{AcceptedImage, AssetReference, ImageUpload};
use super::authorization::require_owner;
use super::deal::{Deal, DealChanges, DealFilter, DealId, NewDeal};
use super::deal_validation::{validate_deal_update, validate_new_deal};
use super::ports::{
    AssetStore, AssetStoreError, CreateDealRequest, DealCommand, DealQuery, DealRepository,
    DealRepositoryError, DeleteDealRequest, UpdateDealRequest,
};
use super::{Error, Role};

fn map_repository_error(error: DealRepositoryError) -> Error {
    match error {
        DealRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("deal repository unavailable: {message}"))
        }
        DealRepositoryError::Query { message } => {
            Error::internal(format!("deal repository error: {message}"))
        }
    }
}

fn map_asset_error(error: &AssetStoreError) -> Error {
    Error::internal(format!("asset store error: {error}"))
}

fn deal_not_found() -> Error {
    Error::not_found("Deal not found")
}

fn ensure_owns(actor: &Account, deal: &Deal, action: &str) -> Result<(), Error> {
    if deal.is_owned_by(actor.id()) {
        Ok(())
    } else {
        warn!(
            deal_id = %deal.id,
            account_id = %actor.id(),
            action,
            "ownership check failed"
        );
        Err(Error::forbidden(format!("Not authorized to {action} this deal")))
    }
}

/// Deal service implementing [`DealCommand`].
#[derive(Clone)]
pub struct DealCommandService<D, S> {
    deals: Arc<D>,
    assets: Arc<S>,
}

impl<D, S> DealCommandService<D, S> {
    /// Create a command service over a deal repository and asset store.
    pub fn new(deals: Arc<D>, assets: Arc<S>) -> Self {
        Self { deals, assets }
    }
}

impl<D, S> DealCommandService<D, S>
where
    D: DealRepository,
    S: AssetStore,
{
    async fn load_owned(&self, actor: &Account, deal_id: &DealId, action: &str) -> Result<Deal, Error> {
        let deal = self
            .deals
            .find_by_id(deal_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(deal_not_found)?;
        ensure_owns(actor, &deal, action)?;
        Ok(deal)
    }

    /// Remove an accepted image that never made it onto a record.
    async fn release_unattached(&self, reference: &AssetReference, deal_id: Option<&DealId>) {
        if reference.is_placeholder() {
            return;
        }
        if let Err(err) = self.assets.discard(reference).await {
            error!(
                event = "asset_orphaned",
                asset = %reference,
                deal_id = deal_id.map(tracing::field::display),
                error = %err,
                "stored image is not referenced by any deal and could not be removed"
            );
        }
    }

    /// Point a deal back at the placeholder after its image was discarded
    /// but no replacement could be stored.
    async fn repair_to_placeholder(&self, deal_id: &DealId, discarded: &AssetReference) {
        let changes = DealChanges {
            image: Some(AssetReference::placeholder()),
            ..DealChanges::default()
        };
        match self.deals.update(deal_id, &changes).await {
            Ok(_) => warn!(
                event = "dangling_asset_reference",
                %deal_id,
                asset = %discarded,
                repaired = true,
                "deal image reset to placeholder after failed replacement"
            ),
            Err(err) => error!(
                event = "dangling_asset_reference",
                %deal_id,
                asset = %discarded,
                repaired = false,
                error = %err,
                "deal references a discarded image"
            ),
        }
    }

    async fn replace_image(
        &self,
        existing: &Deal,
        image: AcceptedImage,
    ) -> Result<AssetReference, Error> {
        let previous = &existing.image;
        let mut discarded = false;
        if !previous.is_placeholder() {
            match self.assets.discard(previous).await {
                Ok(()) => discarded = true,
                Err(err) => error!(
                    event = "asset_orphaned",
                    deal_id = %existing.id,
                    asset = %previous,
                    error = %err,
                    "previous image could not be removed during replacement"
                ),
            }
        }

        match self.assets.accept(image).await {
            Ok(reference) => Ok(reference),
            Err(err) => {
                if discarded {
                    self.repair_to_placeholder(&existing.id, previous).await;
                }
                Err(map_asset_error(&err))
            }
        }
    }
}

#[async_trait]
impl<D, S> DealCommand for DealCommandService<D, S>
where
    D: DealRepository,
    S: AssetStore,
{
    async fn create(&self, request: CreateDealRequest) -> Result<Deal, Error> {
        let CreateDealRequest {
            actor,
            draft,
            image,
        } = request;
        require_owner(&actor)?;
        let image = image.map(ImageUpload::validate).transpose()?;
        let fields = validate_new_deal(&draft)?;

        let image = match image {
            Some(accepted) => self
                .assets
                .accept(accepted)
                .await
                .map_err(|err| map_asset_error(&err))?,
            None => AssetReference::placeholder(),
        };

        let new_deal = NewDeal {
            owner: actor.id(),
            title: fields.title,
            description: fields.description,
            discount: fields.discount,
            location: fields.location,
            image,
            start_date: fields.start_date,
            end_date: fields.end_date,
        };

        match self.deals.insert(&new_deal).await {
            Ok(deal) => {
                info!(deal_id = %deal.id, account_id = %actor.id(), image = %deal.image, "deal created");
                Ok(deal)
            }
            Err(err) => {
                self.release_unattached(&new_deal.image, None).await;
                Err(map_repository_error(err))
            }
        }
    }

    async fn update(&self, request: UpdateDealRequest) -> Result<Deal, Error> {
        let UpdateDealRequest {
            actor,
            deal_id,
            draft,
            image,
        } = request;
        require_owner(&actor)?;
        // Existence and ownership are settled before the image is judged.
        let existing = self.load_owned(&actor, &deal_id, "update").await?;
        let image = image.map(ImageUpload::validate).transpose()?;
        let mut changes = validate_deal_update(&draft, &existing)?;

        if let Some(accepted) = image {
            changes.image = Some(self.replace_image(&existing, accepted).await?);
        }

        let outcome = self.deals.update(&deal_id, &changes).await;
        let updated = match outcome {
            Ok(Some(deal)) => deal,
            Ok(None) => {
                if let Some(reference) = &changes.image {
                    self.release_unattached(reference, Some(&deal_id)).await;
                }
                return Err(deal_not_found());
            }
            Err(err) => {
                if let Some(reference) = &changes.image {
                    self.release_unattached(reference, Some(&deal_id)).await;
                    if !existing.image.is_placeholder() {
                        error!(
                            event = "dangling_asset_reference",
                            %deal_id,
                            asset = %existing.image,
                            error = %err,
                            "deal may still reference its discarded image after a failed update"
                        );
                    }
                }
                return Err(map_repository_error(err));
            }
        };

        info!(%deal_id, account_id = %actor.id(), image = %updated.image, "deal updated");
        Ok(updated)
    }

    async fn delete(&self, request: DeleteDealRequest) -> Result<(), Error> {
        let DeleteDealRequest { actor, deal_id } = request;
        require_owner(&actor)?;
        let existing = self.load_owned(&actor, &deal_id, "delete").await?;

        let mut discarded = None;
        if !existing.image.is_placeholder() {
            match self.assets.discard(&existing.image).await {
                Ok(()) => discarded = Some(&existing.image),
                Err(err) => error!(
                    event = "asset_discard_failed",
                    %deal_id,
                    asset = %existing.image,
                    error = %err,
                    "image could not be removed; deleting the deal anyway"
                ),
            }
        }

        match self.deals.delete(&deal_id).await {
            Ok(true) => {
                info!(%deal_id, account_id = %actor.id(), "deal deleted");
                Ok(())
            }
            Ok(false) => Err(deal_not_found()),
            Err(err) => {
                if let Some(asset) = discarded {
                    error!(
                        event = "record_delete_failed_after_asset_discard",
                        %deal_id,
                        %asset,
                        error = %err,
                        "deal survives but its image is gone"
                    );
                }
                Err(map_repository_error(err))
            }
        }
    }
}

/// Deal service implementing [`DealQuery`].
#[derive(Clone)]
pub struct DealQueryService<D> {
    deals: Arc<D>,
}

impl<D> DealQueryService<D> {
    /// Create a query service over a deal repository.
    pub fn new(deals: Arc<D>) -> Self {
        Self { deals }
    }
}

#[async_trait]
impl<D> DealQuery for DealQueryService<D>
where
    D: DealRepository,
{
    async fn list(&self, viewer: Option<Account>) -> Result<Vec<Deal>, Error> {
        let filter = match viewer {
            Some(account) if account.role() == Role::Owner => DealFilter::OwnedBy(account.id()),
            _ => DealFilter::All,
        };
        self.deals.list(filter).await.map_err(map_repository_error)
    }

    async fn list_mine(&self, actor: Account) -> Result<Vec<Deal>, Error> {
        self.deals
            .list(DealFilter::OwnedBy(actor.id()))
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, deal_id: DealId) -> Result<Deal, Error> {
        self.deals
            .find_by_id(&deal_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(deal_not_found)
    }
}

#[cfg(test)]
#[path = "deal_service_tests.rs"]
mod tests;
