//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, AccountRepository, AssetStore, Authenticator, DealCommand,
    DealQuery, DealRepository, PasswordHasher, TokenCodec,
};
use crate::domain::{AccountService, AuthenticationService, DealCommandService, DealQueryService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resolves `Authorization` headers to live accounts.
    pub authenticator: Arc<dyn Authenticator>,
    /// Registration and login.
    pub accounts: Arc<dyn AccountCommand>,
    /// Profile reads.
    pub account_query: Arc<dyn AccountQuery>,
    /// Deal mutations.
    pub deals: Arc<dyn DealCommand>,
    /// Deal reads.
    pub deal_query: Arc<dyn DealQuery>,
    /// Stored images served under `/uploads`.
    pub assets: Arc<dyn AssetStore>,
}

/// Parameter object grouping the ports [`HttpState`] is built from.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// See [`HttpState::authenticator`].
    pub authenticator: Arc<dyn Authenticator>,
    /// See [`HttpState::accounts`].
    pub accounts: Arc<dyn AccountCommand>,
    /// See [`HttpState::account_query`].
    pub account_query: Arc<dyn AccountQuery>,
    /// See [`HttpState::deals`].
    pub deals: Arc<dyn DealCommand>,
    /// See [`HttpState::deal_query`].
    pub deal_query: Arc<dyn DealQuery>,
    /// See [`HttpState::assets`].
    pub assets: Arc<dyn AssetStore>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            authenticator,
            accounts,
            account_query,
            deals,
            deal_query,
            assets,
        } = ports;
        Self {
            authenticator,
            accounts,
            account_query,
            deals,
            deal_query,
            assets,
        }
    }
}

/// Driven adapters from which the domain services are assembled.
pub struct Adapters<A, D, S> {
    /// Account storage.
    pub accounts: Arc<A>,
    /// Deal storage.
    pub deals: Arc<D>,
    /// Uploaded image storage.
    pub assets: Arc<S>,
    /// Bearer token codec.
    pub tokens: Arc<dyn TokenCodec>,
    /// Password hasher.
    pub hasher: Arc<dyn PasswordHasher>,
}

impl<A, D, S> From<Adapters<A, D, S>> for HttpStatePorts
where
    A: AccountRepository + 'static,
    D: DealRepository + 'static,
    S: AssetStore + 'static,
{
    fn from(adapters: Adapters<A, D, S>) -> Self {
        let Adapters {
            accounts,
            deals,
            assets,
            tokens,
            hasher,
        } = adapters;

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            hasher,
            Arc::clone(&tokens),
        ));
        Self {
            authenticator: Arc::new(AuthenticationService::new(tokens, accounts)),
            accounts: account_service.clone(),
            account_query: account_service,
            deals: Arc::new(DealCommandService::new(
                Arc::clone(&deals),
                Arc::clone(&assets),
            )),
            deal_query: Arc::new(DealQueryService::new(deals)),
            assets,
        }
    }
}
