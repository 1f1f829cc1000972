//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use chrono::{TimeZone, Utc};

use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockAssetStore, MockAuthenticator, MockDealCommand,
    MockDealQuery,
};
use crate::domain::{Account, AccountId, Email, Error, Role};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Header value the [`accepting`] authenticator recognises.
pub const TEST_BEARER: &str = "Bearer test-token";

/// Mock ports with no expectations; tests set the ones they exercise.
#[derive(Default)]
pub struct MockPorts {
    pub authenticator: MockAuthenticator,
    pub accounts: MockAccountCommand,
    pub account_query: MockAccountQuery,
    pub deals: MockDealCommand,
    pub deal_query: MockDealQuery,
    pub assets: MockAssetStore,
}

impl MockPorts {
    /// Freeze the mocks into shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            authenticator: Arc::new(self.authenticator),
            accounts: Arc::new(self.accounts),
            account_query: Arc::new(self.account_query),
            deals: Arc::new(self.deals),
            deal_query: Arc::new(self.deal_query),
            assets: Arc::new(self.assets),
        }))
    }
}

/// Account fixture with a fixed creation time.
pub fn account(name: &str, role: Role) -> Account {
    let created = Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date");
    Account::new(
        AccountId::random(),
        name.to_owned(),
        Email::new(format!("{}@deals.test", name.to_lowercase())).expect("valid email"),
        role,
        created,
    )
}

/// Authenticator accepting [`TEST_BEARER`] as `account` and rejecting
/// everything else.
pub fn accepting(account: Account) -> MockAuthenticator {
    let mut authenticator = MockAuthenticator::new();
    authenticator.expect_authenticate().returning(move |header| {
        if header == TEST_BEARER {
            Ok(account.clone())
        } else {
            Err(Error::unauthorized("Not authorized, token failed"))
        }
    });
    authenticator
}
