//! Driving ports for account registration, login, and profile reads.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Error, LoginCredentials, Registration, Role};

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub token: String,
    /// Role of the authenticated account.
    pub role: Role,
}

/// Account mutations and credential checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a new account.
    async fn register(&self, registration: Registration) -> Result<Account, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error>;
}

/// Account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Load the profile of `id`.
    async fn profile(&self, id: AccountId) -> Result<Account, Error>;
}
