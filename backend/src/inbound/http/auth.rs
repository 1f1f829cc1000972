//! Request extractors for the authentication gate and owner gate.
//!
//! Handlers name the guarantee they need in their signature:
//! [`AuthenticatedAccount`] for any live account, [`OwnerAccount`] for an
//! owner, and [`OptionalAccount`] for public reads that personalise results.
//! Extraction failures short-circuit before the handler body runs.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Account, Error, ErrorCode, require_owner};
use crate::inbound::http::state::HttpState;

/// Account resolved from a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub Account);

/// Authenticated account holding the owner role.
#[derive(Debug, Clone)]
pub struct OwnerAccount(pub Account);

/// Account when a usable bearer token was supplied, otherwise anonymous.
#[derive(Debug, Clone)]
pub struct OptionalAccount(pub Option<Account>);

impl AuthenticatedAccount {
    /// Consume the wrapper.
    pub fn into_inner(self) -> Account {
        self.0
    }
}

impl OwnerAccount {
    /// Consume the wrapper.
    pub fn into_inner(self) -> Account {
        self.0
    }
}

impl OptionalAccount {
    /// Consume the wrapper.
    pub fn into_inner(self) -> Option<Account> {
        self.0
    }
}

fn authorization_header(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn state_of(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))
}

async fn authenticate(
    state: Result<web::Data<HttpState>, Error>,
    header: Option<String>,
) -> Result<Account, Error> {
    let state = state?;
    state
        .authenticator
        .authenticate(header.as_deref().unwrap_or_default())
        .await
}

impl FromRequest for AuthenticatedAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = state_of(req);
        let header = authorization_header(req);
        Box::pin(async move { authenticate(state, header).await.map(Self) })
    }
}

impl FromRequest for OwnerAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = state_of(req);
        let header = authorization_header(req);
        Box::pin(async move {
            let account = authenticate(state, header).await?;
            require_owner(&account)?;
            Ok(Self(account))
        })
    }
}

impl FromRequest for OptionalAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = state_of(req);
        let header = authorization_header(req);
        Box::pin(async move {
            if header.is_none() {
                return Ok(Self(None));
            }
            match authenticate(state, header).await {
                Ok(account) => Ok(Self(Some(account))),
                // A stale or forged token on a public route browses anonymously.
                Err(err) if err.code() == ErrorCode::Unauthorized => {
                    debug!(reason = err.message(), "ignoring unusable bearer token");
                    Ok(Self(None))
                }
                Err(err) => Err(err),
            }
        })
    }
}

#[cfg(test)]
mod tests;
