//! Account services: registration, login, and profile reads.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::account::{Account, AccountId, NewAccount};
use super::auth::{LoginCredentials, Registration};
use super::ports::{
    AccountCommand, AccountQuery, AccountRepository, AccountRepositoryError, LoginOutcome,
    PasswordHasher, TokenCodec,
};
use super::Error;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn map_repository_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::DuplicateEmail { .. } => {
            Error::conflict("Email already registered")
        }
    }
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<R> {
    accounts: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl<R> AccountService<R> {
    /// Create a new service.
    pub fn new(accounts: Arc<R>, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenCodec>) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
        }
    }
}

#[async_trait]
impl<R> AccountCommand for AccountService<R>
where
    R: AccountRepository,
{
    async fn register(&self, registration: Registration) -> Result<Account, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(|err| Error::internal(err.to_string()))?;

        let account = self
            .accounts
            .insert(&NewAccount {
                name: registration.name().to_owned(),
                email: registration.email().clone(),
                password_hash,
                role: registration.role(),
            })
            .await
            .map_err(map_repository_error)?;

        info!(account_id = %account.id(), role = %account.role(), "account registered");
        Ok(account)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let stored = self
            .accounts
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::invalid_request(INVALID_CREDENTIALS))?;

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(|err| {
                warn!(account_id = %stored.account.id(), error = %err, "stored password hash unusable");
                Error::internal(err.to_string())
            })?;
        if !matches {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        }

        let account = stored.account;
        let token = self
            .tokens
            .issue(account.id(), account.role())
            .map_err(|err| Error::internal(err.to_string()))?;

        Ok(LoginOutcome {
            token,
            role: account.role(),
        })
    }
}

#[async_trait]
impl<R> AccountQuery for AccountService<R>
where
    R: AccountRepository,
{
    async fn profile(&self, id: AccountId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}
