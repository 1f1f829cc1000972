//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`AssetStore`], [`TokenCodec`],
//! [`PasswordHasher`]) are implemented in `outbound`. Driving ports
//! ([`Authenticator`], [`AccountCommand`], [`AccountQuery`],
//! [`DealCommand`], [`DealQuery`]) are implemented by domain services and
//! called from `inbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod asset_store;
mod authenticator;
mod deal_command;
mod deal_repository;
mod password_hasher;
mod token_codec;

pub use account_command::{AccountCommand, AccountQuery, LoginOutcome};
#[cfg(test)]
pub use account_command::{MockAccountCommand, MockAccountQuery};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use asset_store::MockAssetStore;
pub use asset_store::{AssetStore, AssetStoreError};
#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::Authenticator;
pub use deal_command::{
    CreateDealRequest, DealCommand, DealQuery, DeleteDealRequest, UpdateDealRequest,
};
#[cfg(test)]
pub use deal_command::{MockDealCommand, MockDealQuery};
#[cfg(test)]
pub use deal_repository::MockDealRepository;
pub use deal_repository::{DealRepository, DealRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenClaims, TokenCodec, TokenError};
