//! Authentication gate: bearer credential to live account.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::Error;
use super::account::{Account, AccountId};
use super::ports::{AccountRepository, AccountRepositoryError, Authenticator, TokenCodec};

const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` value.
///
/// Accepts `Bearer <token>` (scheme matched case-insensitively) and a bare
/// `<token>`. Returns `None` for blank input.
#[must_use]
pub fn extract_token(authorization: &str) -> Option<&str> {
    let trimmed = authorization.trim();
    let token = match trimmed.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        _ if trimmed.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => trimmed,
    };
    (!token.is_empty()).then_some(token)
}

/// Verifies tokens and re-resolves their subject against storage.
///
/// Tokens carry no revocation list; confirming the account still exists is
/// the revocation check.
#[derive(Clone)]
pub struct AuthenticationService<R> {
    tokens: Arc<dyn TokenCodec>,
    accounts: Arc<R>,
}

impl<R> AuthenticationService<R> {
    /// Create the gate over a token codec and account repository.
    pub fn new(tokens: Arc<dyn TokenCodec>, accounts: Arc<R>) -> Self {
        Self { tokens, accounts }
    }
}

fn unauthorized() -> Error {
    Error::unauthorized("Not authorized, token failed")
}

#[async_trait]
impl<R> Authenticator for AuthenticationService<R>
where
    R: AccountRepository,
{
    async fn authenticate(&self, authorization: &str) -> Result<Account, Error> {
        let token = extract_token(authorization)
            .ok_or_else(|| Error::unauthorized("Not authorized, no token"))?;

        let claims = self.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            unauthorized()
        })?;

        let account = self
            .accounts
            .find_by_id(&claims.account_id)
            .await
            .map_err(|err| map_lookup_error(err, claims.account_id))?;

        account.ok_or_else(|| {
            debug!(account_id = %claims.account_id, "token subject no longer exists");
            unauthorized()
        })
    }
}

fn map_lookup_error(error: AccountRepositoryError, account_id: AccountId) -> Error {
    error!(%account_id, error = %error, "account lookup failed during authentication");
    match error {
        AccountRepositoryError::Connection { .. } => {
            Error::service_unavailable("account store unavailable")
        }
        AccountRepositoryError::Query { .. } | AccountRepositoryError::DuplicateEmail { .. } => {
            Error::internal(format!("account lookup failed: {error}"))
        }
    }
}
