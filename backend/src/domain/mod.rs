//! Domain primitives, services, and ports.
//!
//! Purpose: hold the deal lifecycle rules independent of HTTP, Diesel, and
//! the filesystem. Adapters in `inbound` and `outbound` depend on this
//! module, never the other way round.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure taxonomy.
//! - [`Account`], [`Role`], [`Email`]: registered identities.
//! - [`Deal`], [`DealDraft`], [`DealChanges`]: the deal aggregate and its
//!   inputs.
//! - [`ImageUpload`], [`AssetReference`]: uploaded images and stored
//!   references.
//! - Services: [`AuthenticationService`], [`AccountService`],
//!   [`DealCommandService`], [`DealQueryService`].

pub mod account;
pub mod account_service;
pub mod asset;
pub mod auth;
pub mod authentication;
pub mod authorization;
pub mod deal;
pub mod deal_service;
pub mod deal_validation;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::account::{
    Account, AccountId, AccountValidationError, Email, NewAccount, Role, StoredCredentials,
};
pub use self::account_service::AccountService;
pub use self::asset::{
    AcceptedImage, AssetReference, AssetRejection, ImageUpload, MAX_IMAGE_BYTES,
    PLACEHOLDER_IMAGE, UPLOADS_PREFIX, is_safe_file_name,
};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN_LENGTH, Registration, RegistrationDraft,
    RegistrationValidationError,
};
pub use self::authentication::{AuthenticationService, extract_token};
pub use self::authorization::{require_admin, require_owner};
pub use self::deal::{Deal, DealChanges, DealFilter, DealId, InvalidDealId, NewDeal};
pub use self::deal_service::{DealCommandService, DealQueryService};
pub use self::deal_validation::{
    DealDraft, DealFields, parse_date, validate_deal_update, validate_new_deal,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::TraceId;

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
