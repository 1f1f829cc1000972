//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, NewAccount, StoredCredentials};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// Another account already uses this (case-insensitive) email.
        DuplicateEmail { email: String } =>
            "email already registered: {email}",
    }
}

/// Port for storing and resolving accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account and return it with its assigned id and timestamp.
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError>;

    /// Resolve an account by id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Load an account with its password hash by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, AccountRepositoryError>;
}
