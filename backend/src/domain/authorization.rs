//! Role gates applied after authentication.
//!
//! These checks know nothing about individual resources; per-record
//! ownership is enforced by the deal services.

use super::{Account, Error, Role};

fn require_role(account: &Account, role: Role, message: &str) -> Result<(), Error> {
    if account.role() == role {
        Ok(())
    } else {
        Err(Error::forbidden(message))
    }
}

/// Pass only accounts with the `owner` role.
///
/// # Errors
/// Returns `forbidden` for any other role.
pub fn require_owner(account: &Account) -> Result<(), Error> {
    require_role(account, Role::Owner, "Access denied: owners only")
}

/// Pass only accounts with the `admin` role.
///
/// Registration never grants `admin`, so this gate only opens for accounts
/// provisioned directly in storage.
///
/// # Errors
/// Returns `forbidden` for any other role.
pub fn require_admin(account: &Account) -> Result<(), Error> {
    require_role(account, Role::Admin, "Access denied: admins only")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Email, ErrorCode};
    use chrono::Utc;
    use rstest::rstest;

    fn account(role: Role) -> Account {
        Account::new(
            AccountId::random(),
            "Gatekeeper".to_owned(),
            Email::new("gate@deals.test").expect("valid email"),
            role,
            Utc::now(),
        )
    }

    #[rstest]
    #[case(Role::Owner, true)]
    #[case(Role::User, false)]
    #[case(Role::Admin, false)]
    fn owner_gate(#[case] role: Role, #[case] allowed: bool) {
        let result = require_owner(&account(role));
        assert_eq!(result.is_ok(), allowed);
        if let Err(err) = result {
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::Owner, false)]
    #[case(Role::User, false)]
    fn admin_gate(#[case] role: Role, #[case] allowed: bool) {
        let result = require_admin(&account(role));
        assert_eq!(result.is_ok(), allowed);
        if let Err(err) = result {
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }
}
