//! Deal aggregate: a time-bounded discount listing owned by one account.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;
use super::asset::AssetReference;

/// Stable deal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DealId(Uuid);

/// Raised when a path segment is not a deal identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("deal id must be a valid UUID")]
pub struct InvalidDealId;

impl DealId {
    /// Parse an identifier from its textual form.
    ///
    /// # Errors
    /// Returns [`InvalidDealId`] for non-UUID input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidDealId> {
        Uuid::parse_str(raw.as_ref()).map(Self).map_err(|_| InvalidDealId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
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

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DealId> for String {
    fn from(value: DealId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for DealId {
    type Error = InvalidDealId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted deal.
///
/// ## Invariants
/// - `owner` never changes after creation.
/// - `end_date > start_date`.
/// - `title`, `description`, and `location` are non-blank.
/// - `discount` is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Deal {
    /// Identifier assigned at creation.
    pub id: DealId,
    /// Account that created the deal.
    pub owner: AccountId,
    /// Headline.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Discount percentage; unbounded.
    pub discount: f64,
    /// Where the deal applies.
    pub location: String,
    /// Attached image or the placeholder.
    pub image: AssetReference,
    /// First moment the deal applies.
    pub start_date: DateTime<Utc>,
    /// Moment the deal lapses.
    pub end_date: DateTime<Utc>,
    /// Set by storage on insert.
    pub created_at: DateTime<Utc>,
    /// Maintained by storage on every update.
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// True when `account` created this deal.
    #[must_use]
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.owner == account
    }
}

/// Fully validated deal waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeal {
    /// Creating account.
    pub owner: AccountId,
    /// Headline.
    pub title: String,
    /// Description.
    pub description: String,
    /// Discount percentage.
    pub discount: f64,
    /// Location.
    pub location: String,
    /// Image reference.
    pub image: AssetReference,
    /// Start of validity.
    pub start_date: DateTime<Utc>,
    /// End of validity.
    pub end_date: DateTime<Utc>,
}

/// Allow-listed field changes for an update; `None` leaves a field untouched.
///
/// Identifier, owner, and timestamps are not representable here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealChanges {
    /// New headline.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New discount.
    pub discount: Option<f64>,
    /// New location.
    pub location: Option<String>,
    /// New image reference.
    pub image: Option<AssetReference>,
    /// New start date.
    pub start_date: Option<DateTime<Utc>>,
    /// New end date.
    pub end_date: Option<DateTime<Utc>>,
}

impl DealChanges {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the changes to an in-memory copy of a deal.
    pub fn apply_to(&self, deal: &mut Deal) {
        if let Some(title) = &self.title {
            deal.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            deal.description.clone_from(description);
        }
        if let Some(discount) = self.discount {
            deal.discount = discount;
        }
        if let Some(location) = &self.location {
            deal.location.clone_from(location);
        }
        if let Some(image) = &self.image {
            deal.image = image.clone();
        }
        if let Some(start) = self.start_date {
            deal.start_date = start;
        }
        if let Some(end) = self.end_date {
            deal.end_date = end;
        }
    }
}

/// Which deals a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealFilter {
    /// Every deal (public catalogue).
    All,
    /// Only deals created by the given account.
    OwnedBy(AccountId),
}
