//! In-memory [`AccountRepository`].

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, NewAccount, StoredCredentials};

use super::{ReadGuard, WriteGuard, poisoned};

/// Account store backed by a vector in insertion order.
pub struct InMemoryAccountRepository {
    records: RwLock<Vec<StoredCredentials>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryAccountRepository {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            clock,
        }
    }

    fn read(&self) -> Result<ReadGuard<'_, Vec<StoredCredentials>>, AccountRepositoryError> {
        self.records
            .read()
            .map_err(|err| AccountRepositoryError::query(poisoned(err)))
    }

    fn write(&self) -> Result<WriteGuard<'_, Vec<StoredCredentials>>, AccountRepositoryError> {
        self.records
            .write()
            .map_err(|err| AccountRepositoryError::query(poisoned(err)))
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut records = self.write()?;
        if records
            .iter()
            .any(|stored| stored.account.email() == &account.email)
        {
            return Err(AccountRepositoryError::duplicate_email(
                account.email.as_ref(),
            ));
        }

        let created = Account::new(
            AccountId::random(),
            account.name.clone(),
            account.email.clone(),
            account.role,
            self.clock.utc(),
        );
        records.push(StoredCredentials {
            account: created.clone(),
            password_hash: account.password_hash.clone(),
        });
        Ok(created)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self
            .read()?
            .iter()
            .find(|stored| stored.account.id() == *id)
            .map(|stored| stored.account.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, AccountRepositoryError> {
        Ok(self
            .read()?
            .iter()
            .find(|stored| stored.account.email().as_ref() == email)
            .cloned())
    }
}
