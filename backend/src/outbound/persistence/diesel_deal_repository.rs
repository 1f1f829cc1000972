//! PostgreSQL-backed [`DealRepository`] implementation using Diesel ORM.
//!
//! Each operation is a single statement, so readers never see a partial
//! update. `updated_at` is bumped by the update statement itself.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DealRepository, DealRepositoryError};
use crate::domain::{AccountId, AssetReference, Deal, DealChanges, DealFilter, DealId, NewDeal};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DealChangeset, DealRow, NewDealRow};
use super::pool::DbPool;
use super::schema::deals;

/// Diesel-backed implementation of the deal repository port.
#[derive(Clone)]
pub struct DieselDealRepository {
    pool: DbPool,
}

impl DieselDealRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel(error: diesel::result::Error) -> DealRepositoryError {
    map_diesel_error(
        error,
        DealRepositoryError::query,
        DealRepositoryError::connection,
    )
}

fn row_to_deal(row: DealRow) -> Deal {
    Deal {
        id: DealId::from_uuid(row.id),
        owner: AccountId::from_uuid(row.owner_id),
        title: row.title,
        description: row.description,
        discount: row.discount,
        location: row.location,
        image: AssetReference::from(row.image),
        start_date: row.start_date,
        end_date: row.end_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn changeset(changes: &DealChanges) -> DealChangeset<'_> {
    DealChangeset {
        title: changes.title.as_deref(),
        description: changes.description.as_deref(),
        discount: changes.discount,
        location: changes.location.as_deref(),
        image: changes.image.as_ref().map(AssetReference::as_str),
        start_date: changes.start_date,
        end_date: changes.end_date,
    }
}

#[async_trait]
impl DealRepository for DieselDealRepository {
    async fn insert(&self, deal: &NewDeal) -> Result<Deal, DealRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DealRepositoryError::connection))?;

        let row = NewDealRow {
            id: Uuid::new_v4(),
            owner_id: *deal.owner.as_uuid(),
            title: &deal.title,
            description: &deal.description,
            discount: deal.discount,
            location: &deal.location,
            image: deal.image.as_str(),
            start_date: deal.start_date,
            end_date: deal.end_date,
        };

        diesel::insert_into(deals::table)
            .values(&row)
            .returning(DealRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_deal)
            .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DealRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DealRepositoryError::connection))?;

        deals::table
            .find(id.as_uuid())
            .select(DealRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_deal))
            .map_err(map_diesel)
    }

    async fn list(&self, filter: DealFilter) -> Result<Vec<Deal>, DealRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DealRepositoryError::connection))?;

        let mut query = deals::table
            .select(DealRow::as_select())
            .order((deals::created_at.asc(), deals::id.asc()))
            .into_boxed();
        if let DealFilter::OwnedBy(owner) = filter {
            query = query.filter(deals::owner_id.eq(*owner.as_uuid()));
        }

        let rows: Vec<DealRow> = query.load(&mut conn).await.map_err(map_diesel)?;
        Ok(rows.into_iter().map(row_to_deal).collect())
    }

    async fn update(
        &self,
        id: &DealId,
        changes: &DealChanges,
    ) -> Result<Option<Deal>, DealRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DealRepositoryError::connection))?;

        diesel::update(deals::table.find(id.as_uuid()))
            .set((&changeset(changes), deals::updated_at.eq(diesel::dsl::now)))
            .returning(DealRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_deal))
            .map_err(map_diesel)
    }

    async fn delete(&self, id: &DealId) -> Result<bool, DealRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DealRepositoryError::connection))?;

        let removed = diesel::delete(deals::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(removed > 0)
    }
}
