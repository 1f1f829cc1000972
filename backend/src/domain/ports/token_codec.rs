//! Port for signed, time-limited identity tokens.

use chrono::{DateTime, Utc};

use crate::domain::{AccountId, Role};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenError {
        /// Malformed, unsigned, or tampered token.
        Invalid { message: String } => "token invalid: {message}",
        /// Signature is valid but the expiry has passed.
        Expired => "token expired",
        /// The codec could not sign a token.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject account.
    pub account_id: AccountId,
    /// Role at issuance.
    pub role: Role,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token for `account_id` with a fixed absolute expiry.
    fn issue(&self, account_id: AccountId, role: Role) -> Result<String, TokenError>;

    /// Check signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
