//! Driving port for resolving bearer credentials to live accounts.

use async_trait::async_trait;

use crate::domain::{Account, Error};

/// Resolves an `Authorization` header value to the account it identifies.
///
/// Implementations accept `Bearer <token>` and a bare `<token>`, verify the
/// token, and re-resolve the subject against storage. Every failure is
/// reported as `unauthorized`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a raw `Authorization` header value.
    async fn authenticate(&self, authorization: &str) -> Result<Account, Error>;
}
