//! HMAC-signed JSON Web Tokens for the [`TokenCodec`] port.
//!
//! Tokens carry `sub`, `role`, `iat`, and `exp`. Expiry is checked against the
//! injected clock instead of the system time so tests can step past it.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenClaims, TokenCodec, TokenError};
use crate::domain::{AccountId, Role};

/// Default token lifetime in minutes (two hours from issuance).
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// HS256 [`TokenCodec`].
pub struct JwtTokenCodec {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// Create a codec signing with `secret`.
    pub fn new(secret: Vec<u8>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation
    }
}

impl fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, account_id: AccountId, role: Role) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: account_id.to_string(),
            role: role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Self::validation(),
        )
        .map_err(|err| TokenError::invalid(err.to_string()))?;
        let claims = data.claims;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::invalid("expiry out of range"))?;
        if self.clock.utc() >= expires_at {
            return Err(TokenError::expired());
        }

        let account_id =
            AccountId::new(&claims.sub).map_err(|err| TokenError::invalid(err.to_string()))?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|err| TokenError::invalid(err.to_string()))?;

        Ok(TokenClaims {
            account_id,
            role,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn ttl() -> Duration {
        Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
    }

    struct Harness {
        clock: Arc<MutableClock>,
        codec: JwtTokenCodec,
    }

    #[fixture]
    fn harness() -> Harness {
        let now = Utc
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid date");
        let clock = Arc::new(MutableClock::new(now));
        let codec = JwtTokenCodec::new(SECRET.to_vec(), ttl(), clock.clone());
        Harness { clock, codec }
    }

    #[rstest]
    fn issued_tokens_verify_within_the_window(harness: Harness) {
        let id = AccountId::random();
        let token = harness.codec.issue(id, Role::Owner).expect("signed");

        harness.clock.advance_seconds(119 * 60);
        let claims = harness.codec.verify(&token).expect("still valid");

        assert_eq!(claims.account_id, id);
        assert_eq!(claims.role, Role::Owner);
    }

    #[rstest]
    fn tokens_expire_two_hours_after_issue(harness: Harness) {
        let token = harness
            .codec
            .issue(AccountId::random(), Role::User)
            .expect("signed");

        harness.clock.advance_seconds(2 * 60 * 60);

        assert_eq!(harness.codec.verify(&token), Err(TokenError::Expired));
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_invalid(harness: Harness) {
        let other = JwtTokenCodec::new(
            b"another-secret-another-secret!!!".to_vec(),
            ttl(),
            harness.clock.clone(),
        );
        let token = other
            .issue(AccountId::random(), Role::User)
            .expect("signed");

        assert!(matches!(
            harness.codec.verify(&token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    fn malformed_tokens_are_invalid(harness: Harness, #[case] token: &str) {
        assert!(matches!(
            harness.codec.verify(token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn tampered_payloads_are_invalid(harness: Harness) {
        let token = harness
            .codec
            .issue(AccountId::random(), Role::User)
            .expect("signed");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = harness
            .codec
            .issue(AccountId::random(), Role::Admin)
            .expect("signed");
        let forged_payload = forged.split('.').nth(1).expect("payload segment");
        parts[1] = forged_payload;

        assert!(matches!(
            harness.codec.verify(&parts.join(".")),
            Err(TokenError::Invalid { .. })
        ));
    }
}
