//! PostgreSQL-backed [`AccountRepository`] implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, Email, NewAccount, Role, StoredCredentials};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{AccountRow, NewAccountRow};
use super::pool::DbPool;
use super::schema::accounts;

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel(error: diesel::result::Error) -> AccountRepositoryError {
    map_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let email = Email::new(&row.email).map_err(|err| {
        AccountRepositoryError::query(format!("stored email is invalid: {err}"))
    })?;
    let role: Role = row.role.parse().map_err(|err| {
        AccountRepositoryError::query(format!("stored role is invalid: {err}"))
    })?;
    Ok(Account::new(
        AccountId::from_uuid(row.id),
        row.name,
        email,
        role,
        row.created_at,
    ))
}

fn row_to_credentials(mut row: AccountRow) -> Result<StoredCredentials, AccountRepositoryError> {
    let password_hash = std::mem::take(&mut row.password_hash);
    Ok(StoredCredentials {
        account: row_to_account(row)?,
        password_hash,
    })
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AccountRepositoryError::connection))?;

        let row = NewAccountRow {
            id: Uuid::new_v4(),
            name: &account.name,
            email: account.email.as_ref(),
            password_hash: &account.password_hash,
            role: account.role.as_str(),
        };

        let stored = diesel::insert_into(accounts::table)
            .values(&row)
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AccountRepositoryError::duplicate_email(account.email.as_ref())
                } else {
                    map_diesel(err)
                }
            })?;

        row_to_account(stored)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AccountRepositoryError::connection))?;

        accounts::table
            .find(id.as_uuid())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(row_to_account)
            .transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, AccountRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AccountRepositoryError::connection))?;

        accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(row_to_credentials)
            .transpose()
    }
}
