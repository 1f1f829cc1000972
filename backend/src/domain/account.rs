//! Account data model: identifiers, roles, and normalised email addresses.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised while building account values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    /// The identifier was not a UUID.
    #[error("account id must be a valid UUID")]
    InvalidId,
    /// The email address was blank.
    #[error("Email is required")]
    EmptyEmail,
    /// The email address did not look like `local@domain`.
    #[error("Email is invalid")]
    InvalidEmail,
    /// The role string named no known role.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(Uuid);

impl AccountId {
    /// Parse an identifier from its textual form.
    ///
    /// # Errors
    /// Returns [`AccountValidationError::InvalidId`] for non-UUID input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically one read back from storage.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role attached to an account at registration.
///
/// Roles are fixed for the life of an account. Registration only offers
/// [`Role::User`] and [`Role::Owner`]; [`Role::Admin`] exists for the admin
/// gate and for accounts provisioned directly in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses deals.
    User,
    /// Publishes and manages deals.
    Owner,
    /// Administrative role.
    Admin,
}

impl Role {
    /// Lowercase wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            other => Err(AccountValidationError::UnknownRole(other.to_owned())),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address normalised for case-insensitive uniqueness.
///
/// ## Invariants
/// - Trimmed and lowercased.
/// - Exactly one `@` with non-empty local and domain parts.
///
/// # Examples
/// ```
/// use deals_backend::domain::Email;
///
/// let email = Email::new("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Errors
    /// Returns [`AccountValidationError::EmptyEmail`] or
    /// [`AccountValidationError::InvalidEmail`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered account as seen by the rest of the system.
///
/// The password hash is deliberately absent; it only travels between the
/// repository and the password hasher (see [`StoredCredentials`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    email: Email,
    role: Role,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Assemble an account from already validated parts.
    #[must_use]
    pub const fn new(
        id: AccountId,
        name: String,
        email: Email,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            created_at,
        }
    }

    /// Account identifier.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalised email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Role fixed at registration.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Account record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Display name, trimmed.
    pub name: String,
    /// Normalised email.
    pub email: Email,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Role chosen at registration.
    pub role: Role,
}

/// Account paired with its stored password hash, for login only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// The account the hash belongs to.
    pub account: Account,
    /// PHC-formatted password hash.
    pub password_hash: String,
}
