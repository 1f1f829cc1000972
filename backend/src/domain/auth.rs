//! Authentication inputs: login credentials and registration requests.
//!
//! Inbound adapters hand raw strings to these constructors; services only
//! ever see validated values.

use zeroize::Zeroizing;

use super::account::{Email, Role};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is trimmed, lowercased, and non-empty. It is not checked for
///   shape: an unknown address simply fails to authenticate.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use deals_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Owner@Deals.test ", "hunter22").unwrap();
/// assert_eq!(creds.email(), "owner@deals.test");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] when either part is blank.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration input as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<Zeroizing<String>>,
    /// Requested role, `user` or `owner`.
    pub role: Option<String>,
}

/// Every violation found in a registration draft, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", .0.join(", "))]
pub struct RegistrationValidationError(pub Vec<String>);

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    email: Email,
    password: Zeroizing<String>,
    role: Role,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Registration {
    /// Validate a draft, collecting every violation before failing.
    ///
    /// Only `user` and `owner` may be requested; `admin` is never
    /// self-assigned.
    ///
    /// # Errors
    /// Returns [`RegistrationValidationError`] listing each problem.
    pub fn try_from_draft(draft: RegistrationDraft) -> Result<Self, RegistrationValidationError> {
        let mut violations = Vec::new();

        let name = present(draft.name.as_deref()).map(str::to_owned);
        if name.is_none() {
            violations.push("Name is required".to_owned());
        }

        let email = match Email::new(draft.email.as_deref().unwrap_or_default()) {
            Ok(email) => Some(email),
            Err(err) => {
                violations.push(err.to_string());
                None
            }
        };

        let password = draft.password.filter(|p| !p.is_empty());
        match password.as_ref() {
            None => violations.push("Password is required".to_owned()),
            Some(p) if p.chars().count() < PASSWORD_MIN_LENGTH => violations.push(format!(
                "Password must be at least {PASSWORD_MIN_LENGTH} characters"
            )),
            Some(_) => {}
        }

        let role = match present(draft.role.as_deref()) {
            Some("user") => Some(Role::User),
            Some("owner") => Some(Role::Owner),
            _ => {
                violations.push("Role must be either 'owner' or 'user'".to_owned());
                None
            }
        };

        match (name, email, password, role) {
            (Some(name), Some(email), Some(password), Some(role)) if violations.is_empty() => {
                Ok(Self {
                    name,
                    email,
                    password,
                    role,
                })
            }
            _ => Err(RegistrationValidationError(violations)),
        }
    }

    /// Trimmed display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalised email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password, zeroised on drop.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}
